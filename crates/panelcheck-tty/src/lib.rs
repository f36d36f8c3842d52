#![forbid(unsafe_code)]

//! Terminal host for panelcheck.
//!
//! Maps the engine's host seams onto a terminal: immersive mode is the
//! alternate screen with a hidden cursor, scroll suppression is mouse
//! capture, frames are paced by the event loop and scenes are drawn with
//! half-block cells (two vertical pixels per cell).

pub mod app;
pub mod cli;
pub mod clock;
pub mod host;
pub mod input;
pub mod logging;
pub mod surface;

pub use clock::PacedFrameClock;
pub use host::{TerminalGuard, TerminalHost};
pub use surface::TerminalSurface;
