#![forbid(unsafe_code)]

//! Frame-driven session: fullscreen plus a clock feeding one engine.
//!
//! Start order is fullscreen then clock; stop order is the reverse, so the
//! engine never sees a frame after the display was released. Dropping a
//! running session stops it.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::frame_clock::{FrameClock, FrameConsumer, FrameHandle, attach};
use crate::fullscreen::{DisplayHost, FullscreenController, FullscreenState};

pub struct ContinuousSession<H, C, E>
where
    H: DisplayHost,
    C: FrameClock,
    E: FrameConsumer + 'static,
{
    fullscreen: FullscreenController<H>,
    clock: C,
    engine: Rc<RefCell<E>>,
    handle: Option<FrameHandle>,
}

impl<H, C, E> core::fmt::Debug for ContinuousSession<H, C, E>
where
    H: DisplayHost,
    C: FrameClock,
    E: FrameConsumer + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContinuousSession")
            .field("running", &self.is_running())
            .field("fullscreen", &self.fullscreen.state())
            .finish_non_exhaustive()
    }
}

impl<H, C, E> ContinuousSession<H, C, E>
where
    H: DisplayHost,
    C: FrameClock,
    E: FrameConsumer + 'static,
{
    #[must_use]
    pub fn new(host: H, clock: C, engine: E) -> Self {
        Self {
            fullscreen: FullscreenController::new(host),
            clock,
            engine: Rc::new(RefCell::new(engine)),
            handle: None,
        }
    }

    /// Take the display and start feeding frames. No-op while running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.fullscreen.enter();
        self.handle = Some(attach(&mut self.clock, &self.engine));
        crate::info!(engaged = self.fullscreen.is_engaged(), "continuous session started");
        true
    }

    /// Stop frames, then release the display. No-op when stopped.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.clock.stop(&handle);
            self.fullscreen.exit();
            crate::info!("continuous session stopped");
        }
    }

    /// The host dropped immersive mode; frames keep flowing.
    pub fn revoke_fullscreen(&mut self) -> bool {
        self.fullscreen.revoke()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    #[must_use]
    pub fn fullscreen(&self) -> FullscreenState {
        self.fullscreen.state()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        self.fullscreen.host()
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Shared engine; `None` if a frame callback currently holds it.
    #[must_use]
    pub fn engine(&self) -> Option<Ref<'_, E>> {
        self.engine.try_borrow().ok()
    }

    /// Mutable engine access outside frame delivery.
    pub fn engine_mut(&self) -> Option<RefMut<'_, E>> {
        self.engine.try_borrow_mut().ok()
    }
}

impl<H, C, E> Drop for ContinuousSession<H, C, E>
where
    H: DisplayHost,
    C: FrameClock,
    E: FrameConsumer + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}
