#![forbid(unsafe_code)]

//! Browser host for panelcheck.
//!
//! The `wasm-bindgen` surface is [`PanelCheckWeb`]: mount a tool on a
//! `<canvas>`, forward clicks, keys, pointer drags and resizes, read the
//! current numbers back as JSON. Underneath it wires the engine to:
//! - `requestAnimationFrame` as the frame clock,
//! - the Fullscreen API plus `body { overflow: hidden }` as the display host,
//! - canvas-2d as the drawing surface.
//!
//! Option parsing, readout encoding and the key map are plain Rust and are
//! tested on native targets.

pub mod keys;
pub mod options;

#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod clock;
#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
#[cfg(target_arch = "wasm32")]
pub use clock::AnimationFrameClock;
#[cfg(target_arch = "wasm32")]
pub use host::DocumentHost;
#[cfg(target_arch = "wasm32")]
pub use wasm::PanelCheckWeb;

pub use options::{WebError, WebOptions};
