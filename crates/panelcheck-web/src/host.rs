#![forbid(unsafe_code)]

//! Fullscreen API and page-scroll control.

use panelcheck_core::HostError;
use panelcheck_core::fullscreen::DisplayHost;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, HtmlElement};

/// Message carried by a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Display host backed by the page document.
///
/// Immersive mode is the Fullscreen API on `target` (the canvas). Scroll
/// suppression sets `overflow: hidden` on `<body>` and puts back whatever
/// inline value was there before.
#[derive(Debug)]
pub struct DocumentHost {
    document: Document,
    target: Element,
    saved_overflow: Option<String>,
}

impl DocumentHost {
    #[must_use]
    pub fn new(document: Document, target: Element) -> Self {
        Self {
            document,
            target,
            saved_overflow: None,
        }
    }

    /// Whether some element of the page is fullscreen right now.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.document.fullscreen_element().is_some()
    }

    fn body(&self) -> Result<HtmlElement, HostError> {
        self.document
            .body()
            .ok_or(HostError::Unsupported("document has no body"))
    }
}

impl DisplayHost for DocumentHost {
    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        if !self.document.fullscreen_enabled() {
            return Err(HostError::Denied("fullscreen disabled for this document".into()));
        }
        self.target
            .request_fullscreen()
            .map_err(|err| HostError::Denied(js_message(&err)))
    }

    fn exit_fullscreen(&mut self) -> Result<(), HostError> {
        if self.is_fullscreen() {
            self.document.exit_fullscreen();
        }
        Ok(())
    }

    fn set_scroll_suppressed(&mut self, suppressed: bool) -> Result<(), HostError> {
        let style = self.body()?.style();
        if suppressed {
            if self.saved_overflow.is_none() {
                let previous = style
                    .get_property_value("overflow")
                    .map_err(|err| HostError::Platform(js_message(&err)))?;
                self.saved_overflow = Some(previous);
            }
            style
                .set_property("overflow", "hidden")
                .map_err(|err| HostError::Platform(js_message(&err)))
        } else {
            let previous = self.saved_overflow.take().unwrap_or_default();
            let restored = if previous.is_empty() {
                style.remove_property("overflow").map(drop)
            } else {
                style.set_property("overflow", &previous)
            };
            restored.map_err(|err| HostError::Platform(js_message(&err)))
        }
    }
}
