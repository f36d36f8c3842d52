#![forbid(unsafe_code)]

//! `requestAnimationFrame` frame clock.
//!
//! Each `start` owns one self-rescheduling rAF loop. The loop's handle flag
//! is checked when the browser invokes the callback, so a frame the browser
//! had already queued when `stop` ran is dropped instead of delivered.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use panelcheck_core::frame_clock::{FrameCallback, FrameClock, FrameHandle, FrameSample};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

struct FrameLoop {
    handle: FrameHandle,
    request_id: Cell<Option<i32>>,
    closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl FrameLoop {
    fn schedule(&self, window: &Window) {
        let slot = self.closure.borrow();
        let Some(closure) = slot.as_ref() else {
            return;
        };
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => self.request_id.set(Some(id)),
            Err(_) => {
                self.handle.cancel();
                self.request_id.set(None);
            }
        }
    }

    fn cancel(&self, window: &Window) {
        self.handle.cancel();
        if let Some(id) = self.request_id.take() {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

/// Browser display-refresh clock.
pub struct AnimationFrameClock {
    window: Window,
    next_id: u64,
    loops: Vec<Rc<FrameLoop>>,
}

impl core::fmt::Debug for AnimationFrameClock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnimationFrameClock")
            .field("next_id", &self.next_id)
            .field("loops", &self.loops.len())
            .finish()
    }
}

impl AnimationFrameClock {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self {
            window,
            next_id: 0,
            loops: Vec::new(),
        }
    }

    /// Loops still scheduling frames.
    #[must_use]
    pub fn active(&self) -> usize {
        self.loops
            .iter()
            .filter(|frame_loop| !frame_loop.handle.is_cancelled())
            .count()
    }
}

impl FrameClock for AnimationFrameClock {
    fn start(&mut self, mut callback: FrameCallback) -> FrameHandle {
        // Cancelled loops have no pending request; their closures can go.
        self.loops.retain(|frame_loop| !frame_loop.handle.is_cancelled());

        self.next_id += 1;
        let handle = FrameHandle::new(self.next_id);
        let frame_loop = Rc::new(FrameLoop {
            handle: handle.clone(),
            request_id: Cell::new(None),
            closure: RefCell::new(None),
        });

        let weak: Weak<FrameLoop> = Rc::downgrade(&frame_loop);
        let window = self.window.clone();
        let closure = Closure::<dyn FnMut(f64)>::new(move |timestamp_ms: f64| {
            let Some(frame_loop) = weak.upgrade() else {
                return;
            };
            frame_loop.request_id.set(None);
            if frame_loop.handle.is_cancelled() {
                return;
            }
            callback(FrameSample::new(timestamp_ms));
            if !frame_loop.handle.is_cancelled() {
                frame_loop.schedule(&window);
            }
        });
        *frame_loop.closure.borrow_mut() = Some(closure);
        frame_loop.schedule(&self.window);
        self.loops.push(frame_loop);
        handle
    }

    fn stop(&mut self, handle: &FrameHandle) {
        handle.cancel();
        if let Some(frame_loop) = self.loops.iter().find(|frame_loop| frame_loop.handle == *handle) {
            frame_loop.cancel(&self.window);
        }
    }
}

impl Drop for AnimationFrameClock {
    fn drop(&mut self) {
        for frame_loop in &self.loops {
            frame_loop.cancel(&self.window);
        }
    }
}
