#![forbid(unsafe_code)]

//! Core: display diagnostic engine.
//!
//! Everything in this crate is host-agnostic and single-threaded. A host
//! (terminal, browser) supplies a [`fullscreen::DisplayHost`], a
//! [`frame_clock::FrameClock`] and a [`scene::Surface`]; the engine decides
//! what to draw and when to take over or release the display.

pub mod catalog;
pub mod color;
pub mod continuous;
pub mod error;
pub mod flasher;
pub mod frame_clock;
pub mod fullscreen;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod motion;
pub mod pattern;
pub mod raster;
pub mod refresh;
pub mod scene;
pub mod session;
pub mod tool;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, info_span, trace, warn};

pub use color::Rgb;
pub use error::{HostError, ParseError, SurfaceError};
pub use geometry::{Position, Rect, Size};
pub use tool::{Tool, ToolConfig, ToolKind};
