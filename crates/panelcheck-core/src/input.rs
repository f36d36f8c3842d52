#![forbid(unsafe_code)]

//! Host-neutral input vocabulary.

use crate::flasher::FlashSequence;
use crate::geometry::{Position, Size};
use crate::motion::{MotionPattern, MotionSpeed};

/// Something the user did, already translated by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEvent {
    /// Click, space, enter or right arrow.
    Advance,
    /// Escape.
    Cancel,
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    SelectSpeed(MotionSpeed),
    SelectMotionPattern(MotionPattern),
    SelectSequence(FlashSequence),
    /// The drawing surface changed size.
    Resize(Size),
    /// The host left immersive mode on its own (browser UI, window manager).
    FullscreenExited,
    /// The host refused immersive mode after the request had returned.
    FullscreenDenied,
}

impl ToolEvent {
    /// Map a DOM-style key name (`KeyboardEvent.key`) to an event.
    #[must_use]
    pub fn from_key_name(key: &str) -> Option<Self> {
        match key {
            "Escape" | "Esc" => Some(Self::Cancel),
            " " | "Space" | "Spacebar" | "Enter" | "ArrowRight" | "Right" => Some(Self::Advance),
            _ => None,
        }
    }

    /// Pointer position for pointer events.
    #[must_use]
    pub fn pointer(&self) -> Option<Position> {
        match *self {
            Self::PointerDown { x, y } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some(Position::new(x, y))
            }
            _ => None,
        }
    }
}
