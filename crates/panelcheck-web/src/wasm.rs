#![forbid(unsafe_code)]

//! JavaScript entry point.
//!
//! [`PanelCheckWeb`] owns one mounted tool, a render loop on
//! `requestAnimationFrame` and the document's fullscreen listeners. Leaving
//! fullscreen through the browser (the Escape press the page never sees)
//! stops the test; a late refusal drops back to the normal layout.

use std::cell::RefCell;
use std::rc::Rc;

use panelcheck_core::{Size, Tool};
use panelcheck_core::frame_clock::{FrameClock, FrameConsumer, FrameHandle, FrameSample, attach};
use panelcheck_core::input::ToolEvent;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, EventTarget, HtmlCanvasElement, Window};

use crate::canvas::CanvasSurface;
use crate::clock::AnimationFrameClock;
use crate::host::DocumentHost;
use crate::keys::{fullscreen_event, key_event};
use crate::options::{WebError, mount_config, readout_json};

fn to_js(err: impl core::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

const FULLSCREEN_EVENTS: [&str; 2] = ["fullscreenchange", "fullscreenerror"];

fn now_ms(window: &Window) -> f64 {
    window.performance().map_or(0.0, |performance| performance.now())
}

struct Mounted {
    tool: Tool<DocumentHost, AnimationFrameClock>,
    surface: CanvasSurface,
    painted: bool,
}

impl FrameConsumer for Mounted {
    fn on_frame(&mut self, sample: FrameSample) {
        self.tool.tick(sample.timestamp_ms);
        match self.tool.render(&mut self.surface) {
            Ok(true) => self.painted = true,
            Ok(false) => {
                if self.painted {
                    self.surface.blank();
                    self.painted = false;
                }
            }
            // Zero-sized canvas or a rejected draw call; the next frame retries.
            Err(_) => {}
        }
    }
}

struct FullscreenListener {
    event_type: &'static str,
    closure: Closure<dyn FnMut()>,
}

/// Register the Fullscreen API listeners on `document`.
fn listen_fullscreen(
    document: &Document,
    window: &Window,
    mounted: &Rc<RefCell<Mounted>>,
) -> Result<Vec<FullscreenListener>, JsValue> {
    let target: &EventTarget = document.as_ref();
    let mut listeners = Vec::with_capacity(FULLSCREEN_EVENTS.len());
    for event_type in FULLSCREEN_EVENTS {
        let weak = Rc::downgrade(mounted);
        let document = document.clone();
        let window = window.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let Some(event) = fullscreen_event(event_type, document.fullscreen_element().is_some())
            else {
                return;
            };
            if let Some(mounted) = weak.upgrade()
                && let Ok(mut mounted) = mounted.try_borrow_mut()
            {
                mounted.tool.handle(event, now_ms(&window));
            }
        });
        target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
        listeners.push(FullscreenListener { event_type, closure });
    }
    Ok(listeners)
}

/// One mounted diagnostic tool bound to a canvas.
#[wasm_bindgen]
pub struct PanelCheckWeb {
    window: Window,
    document: Document,
    mounted: Option<Rc<RefCell<Mounted>>>,
    listeners: Vec<FullscreenListener>,
    render_clock: AnimationFrameClock,
    render_handle: Option<FrameHandle>,
}

#[wasm_bindgen]
impl PanelCheckWeb {
    /// Mount `tool` (e.g. `"dead-pixel"`, `"refresh-rate"`) on `canvas`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        tool: &str,
        options_json: Option<String>,
    ) -> Result<PanelCheckWeb, JsValue> {
        let (kind, config) = mount_config(tool, options_json.as_deref()).map_err(to_js)?;
        let window = web_sys::window().ok_or_else(|| to_js(WebError::Unsupported("window")))?;
        let document = window
            .document()
            .ok_or_else(|| to_js(WebError::Unsupported("document")))?;

        let host = DocumentHost::new(document.clone(), Element::from(canvas.clone()));
        let surface = CanvasSurface::new(canvas).map_err(to_js)?;
        let tool = Tool::mount(kind, &config, host, AnimationFrameClock::new(window.clone()));
        let mounted = Rc::new(RefCell::new(Mounted {
            tool,
            surface,
            painted: false,
        }));

        let listeners = listen_fullscreen(&document, &window, &mounted)?;
        let mut render_clock = AnimationFrameClock::new(window.clone());
        let render_handle = attach(&mut render_clock, &mounted);
        Ok(Self {
            window,
            document,
            mounted: Some(mounted),
            listeners,
            render_clock,
            render_handle: Some(render_handle),
        })
    }

    /// Start the test. Call from a user gesture so fullscreen is allowed.
    pub fn start(&mut self) -> bool {
        self.with_mounted(|m| m.tool.start()).unwrap_or(false)
    }

    pub fn stop(&mut self) {
        self.with_mounted(|m| m.tool.stop());
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.with_mounted(|m| m.tool.is_active()).unwrap_or(false)
    }

    /// A click on the canvas: starts an idle tool, otherwise advances.
    pub fn click(&mut self) -> bool {
        let now = self.now_ms();
        self.with_mounted(|m| {
            if m.tool.is_active() {
                m.tool.handle(ToolEvent::Advance, now)
            } else {
                m.tool.start()
            }
        })
        .unwrap_or(false)
    }

    /// Feed a `KeyboardEvent.key`. Returns whether the key was consumed.
    pub fn key(&mut self, name: &str) -> bool {
        match key_event(name) {
            Some(event) => self.dispatch(event),
            None => false,
        }
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(ToolEvent::PointerDown { x, y })
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(ToolEvent::PointerMove { x, y })
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.dispatch(ToolEvent::PointerUp { x, y })
    }

    /// Resize the canvas backing store (device pixels).
    pub fn resize(&mut self, width: u32, height: u32) {
        let now = self.now_ms();
        self.with_mounted(|m| {
            m.surface.resize(width, height);
            m.painted = false;
            m.tool.handle(
                ToolEvent::Resize(Size::new(f64::from(width), f64::from(height))),
                now,
            );
        });
    }

    /// Current readout as JSON.
    pub fn readout(&self) -> Result<String, JsValue> {
        let readout = self
            .with_mounted(|m| m.tool.readout())
            .ok_or_else(|| to_js(WebError::Unsupported("tool destroyed")))?;
        readout_json(&readout).map_err(to_js)
    }

    /// Stop everything and release the display. The instance is inert afterwards.
    pub fn destroy(&mut self) {
        let target: &EventTarget = self.document.as_ref();
        for listener in self.listeners.drain(..) {
            // Only fails for a detached document, which fires nothing anyway.
            let _ = target.remove_event_listener_with_callback(
                listener.event_type,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
        if let Some(handle) = self.render_handle.take() {
            self.render_clock.stop(&handle);
        }
        if let Some(mounted) = self.mounted.take()
            && let Ok(mut mounted) = mounted.try_borrow_mut()
        {
            mounted.tool.stop();
            mounted.surface.blank();
        }
    }
}

impl PanelCheckWeb {
    fn now_ms(&self) -> f64 {
        now_ms(&self.window)
    }

    fn with_mounted<R>(&self, f: impl FnOnce(&mut Mounted) -> R) -> Option<R> {
        let mounted = self.mounted.as_ref()?;
        let mut mounted = mounted.try_borrow_mut().ok()?;
        Some(f(&mut mounted))
    }

    fn dispatch(&self, event: ToolEvent) -> bool {
        let now = self.now_ms();
        self.with_mounted(|m| m.tool.handle(event, now)).unwrap_or(false)
    }
}

impl Drop for PanelCheckWeb {
    fn drop(&mut self) {
        self.destroy();
    }
}
