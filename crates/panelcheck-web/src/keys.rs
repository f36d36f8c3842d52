#![forbid(unsafe_code)]

//! DOM input to tool events.
//!
//! Navigation keys come from [`ToolEvent::from_key_name`]; the selection
//! shortcuts mirror the terminal host so both front ends behave alike.
//! Fullscreen API events cover the Escape press the browser keeps for itself.

use panelcheck_core::flasher::FlashSequence;
use panelcheck_core::input::ToolEvent;
use panelcheck_core::motion::{MotionPattern, MotionSpeed};

/// Map a DOM key name. Unknown keys return `None` so the page keeps them.
#[must_use]
pub fn key_event(key: &str) -> Option<ToolEvent> {
    if let Some(event) = ToolEvent::from_key_name(key) {
        return Some(event);
    }
    let event = match key {
        "1" => ToolEvent::SelectSpeed(MotionSpeed::Slow),
        "2" => ToolEvent::SelectSpeed(MotionSpeed::Normal),
        "3" => ToolEvent::SelectSpeed(MotionSpeed::Fast),
        "4" => ToolEvent::SelectSpeed(MotionSpeed::Turbo),
        "u" | "U" => ToolEvent::SelectMotionPattern(MotionPattern::Ufo),
        "b" | "B" => ToolEvent::SelectMotionPattern(MotionPattern::ColorBlocks),
        "t" | "T" => ToolEvent::SelectMotionPattern(MotionPattern::ScrollingText),
        "r" | "R" => ToolEvent::SelectSequence(FlashSequence::Rgb),
        "f" | "F" => ToolEvent::SelectSequence(FlashSequence::Full),
        "w" | "W" => ToolEvent::SelectSequence(FlashSequence::BlackWhite),
        _ => return None,
    };
    Some(event)
}

/// Map a document `fullscreenchange`/`fullscreenerror` event.
///
/// `fullscreen` is whether the document has a fullscreen element after the
/// change. Entering is not reported.
#[must_use]
pub fn fullscreen_event(event_type: &str, fullscreen: bool) -> Option<ToolEvent> {
    match event_type {
        "fullscreenchange" if !fullscreen => Some(ToolEvent::FullscreenExited),
        "fullscreenerror" => Some(ToolEvent::FullscreenDenied),
        _ => None,
    }
}
