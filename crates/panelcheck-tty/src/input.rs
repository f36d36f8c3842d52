#![forbid(unsafe_code)]

//! Crossterm events to app actions.
//!
//! | Input                         | Action                                  |
//! |-------------------------------|-----------------------------------------|
//! | `q`, Ctrl+C                   | quit                                    |
//! | Esc                           | cancel (stop the test)                  |
//! | Space, Enter, Right, click    | advance (starts an idle tool)           |
//! | `s`                           | start                                   |
//! | `1`-`4`                       | motion speed slow..turbo                |
//! | `u`, `b`, `t`                 | motion shape ufo, blocks, text          |
//! | `r`, `f`, `w`                 | flash sequence rgb, full, black-white   |
//! | drag (pixel repair)           | move the flashing square                |

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use panelcheck_core::ToolKind;
use panelcheck_core::flasher::FlashSequence;
use panelcheck_core::input::ToolEvent;
use panelcheck_core::motion::{MotionPattern, MotionSpeed};

use crate::surface::cell_center;

/// What the event loop should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Start,
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    Tool(ToolEvent),
}

/// Translate one terminal event for a tool of `kind`.
#[must_use]
pub fn map_event(event: &Event, kind: ToolKind) -> Option<Action> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => map_mouse(mouse, kind),
        Event::Resize(cols, rows) => Some(Action::Resize(*cols, *rows)),
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Action::Quit);
    }
    let event = match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('s') => return Some(Action::Start),
        KeyCode::Esc => ToolEvent::Cancel,
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Right => ToolEvent::Advance,
        KeyCode::Char(c @ '1'..='4') => {
            let index = usize::from(c as u8 - b'1');
            ToolEvent::SelectSpeed(MotionSpeed::ALL[index])
        }
        KeyCode::Char('u') => ToolEvent::SelectMotionPattern(MotionPattern::Ufo),
        KeyCode::Char('b') => ToolEvent::SelectMotionPattern(MotionPattern::ColorBlocks),
        KeyCode::Char('t') => ToolEvent::SelectMotionPattern(MotionPattern::ScrollingText),
        KeyCode::Char('r') => ToolEvent::SelectSequence(FlashSequence::Rgb),
        KeyCode::Char('f') => ToolEvent::SelectSequence(FlashSequence::Full),
        KeyCode::Char('w') => ToolEvent::SelectSequence(FlashSequence::BlackWhite),
        _ => return None,
    };
    Some(Action::Tool(event))
}

fn map_mouse(mouse: &MouseEvent, kind: ToolKind) -> Option<Action> {
    let at = cell_center(mouse.column, mouse.row);
    let (x, y) = (at.x, at.y);
    let draggable = kind == ToolKind::PixelRepair;
    let event = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if draggable => ToolEvent::PointerDown { x, y },
        MouseEventKind::Down(MouseButton::Left) => ToolEvent::Advance,
        MouseEventKind::Drag(MouseButton::Left) if draggable => ToolEvent::PointerMove { x, y },
        MouseEventKind::Up(MouseButton::Left) if draggable => ToolEvent::PointerUp { x, y },
        _ => return None,
    };
    Some(Action::Tool(event))
}
