#![forbid(unsafe_code)]

//! Display lists.
//!
//! Every pattern, motion frame and flasher frame is described as a [`Scene`]:
//! an ordered list of [`DrawCommand`]s in surface pixel coordinates. Scenes
//! are pure data; a host [`Surface`] turns them into pixels.

use crate::color::Rgb;
use crate::error::SurfaceError;
use crate::geometry::{Position, Rect, Size};

/// Direction along which a [`DrawCommand::LinearGradient`] varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientAxis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

/// One color stop; `offset` is in [0, 1] along the gradient axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgb,
}

impl GradientStop {
    #[must_use]
    pub fn new(offset: f32, color: Rgb) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// A single drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface.
    Clear(Rgb),
    FillRect {
        rect: Rect,
        color: Rgb,
    },
    FillEllipse {
        center: Position,
        radius_x: f64,
        radius_y: f64,
        color: Rgb,
    },
    LinearGradient {
        rect: Rect,
        axis: GradientAxis,
        stops: Vec<GradientStop>,
    },
    /// Text anchored at its top-left corner; `size` is the line height in pixels.
    Text {
        origin: Position,
        size: f64,
        color: Rgb,
        text: String,
    },
}

/// An ordered display list for a surface of a given size.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl Scene {
    /// Empty scene for a surface of `size`.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Scene that starts by clearing to `color`.
    #[must_use]
    pub fn cleared(size: Size, color: Rgb) -> Self {
        let mut scene = Self::new(size);
        scene.push(DrawCommand::Clear(color));
        scene
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Color of the last full-surface clear, if any.
    #[must_use]
    pub fn background(&self) -> Option<Rgb> {
        self.commands.iter().rev().find_map(|cmd| match cmd {
            DrawCommand::Clear(color) => Some(*color),
            _ => None,
        })
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    pub fn fill_ellipse(&mut self, center: Position, radius_x: f64, radius_y: f64, color: Rgb) {
        self.push(DrawCommand::FillEllipse {
            center,
            radius_x,
            radius_y,
            color,
        });
    }

    pub fn gradient(&mut self, rect: Rect, axis: GradientAxis, stops: Vec<GradientStop>) {
        self.push(DrawCommand::LinearGradient { rect, axis, stops });
    }

    pub fn text(&mut self, origin: Position, size: f64, color: Rgb, text: impl Into<String>) {
        self.push(DrawCommand::Text {
            origin,
            size,
            color,
            text: text.into(),
        });
    }

    /// All text commands, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = (&Position, f64, Rgb, &str)> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text {
                origin,
                size,
                color,
                text,
            } => Some((origin, *size, *color, text.as_str())),
            _ => None,
        })
    }
}

/// Color of a gradient at parameter `t` in [0, 1].
///
/// Stops are expected in ascending offset order. Outside the first/last stop
/// the end colors are held.
#[must_use]
pub fn gradient_color_at(stops: &[GradientStop], t: f32) -> Rgb {
    let Some(first) = stops.first() else {
        return Rgb::BLACK;
    };
    let t = t.clamp(0.0, 1.0);
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.color;
            }
            return a.color.lerp(b.color, (t - a.offset) / span);
        }
    }
    stops.last().map_or(first.color, |s| s.color)
}

/// A drawing target owned by the host.
pub trait Surface {
    /// Current drawable size in surface pixels.
    fn size(&self) -> Size;

    /// Draw `scene` and make it visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is gone or the backend rejected the
    /// frame. Callers skip the frame; they never retry it.
    fn present(&mut self, scene: &Scene) -> Result<(), SurfaceError>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn size(&self) -> Size {
        (**self).size()
    }

    fn present(&mut self, scene: &Scene) -> Result<(), SurfaceError> {
        (**self).present(scene)
    }
}

/// Surface that keeps the last presented scene, for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct SceneRecorder {
    size: Size,
    available: bool,
    presented: u64,
    last: Option<Scene>,
}

impl SceneRecorder {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            available: true,
            presented: 0,
            last: None,
        }
    }

    /// Simulate losing (or regaining) the underlying surface.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Number of scenes successfully presented.
    #[must_use]
    pub fn presented(&self) -> u64 {
        self.presented
    }

    #[must_use]
    pub fn last(&self) -> Option<&Scene> {
        self.last.as_ref()
    }
}

impl Surface for SceneRecorder {
    fn size(&self) -> Size {
        self.size
    }

    fn present(&mut self, scene: &Scene) -> Result<(), SurfaceError> {
        if !self.available {
            return Err(SurfaceError::Unavailable);
        }
        self.presented += 1;
        self.last = Some(scene.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn background_is_last_clear() {
        let mut scene = Scene::cleared(Size::new(4.0, 4.0), Rgb::RED);
        scene.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgb::BLUE);
        assert_eq!(scene.background(), Some(Rgb::RED));
        scene.push(DrawCommand::Clear(Rgb::GREEN));
        assert_eq!(scene.background(), Some(Rgb::GREEN));
        assert_eq!(Scene::new(Size::default()).background(), None);
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let stops = vec![
            GradientStop::new(0.0, Rgb::BLACK),
            GradientStop::new(1.0, Rgb::WHITE),
        ];
        assert_eq!(gradient_color_at(&stops, 0.0), Rgb::BLACK);
        assert_eq!(gradient_color_at(&stops, 1.0), Rgb::WHITE);
        assert_eq!(gradient_color_at(&stops, 0.5), Rgb::gray(128));
        assert_eq!(gradient_color_at(&[], 0.5), Rgb::BLACK);
    }

    #[test]
    fn gradient_holds_end_colors_outside_stops() {
        let stops = vec![
            GradientStop::new(0.25, Rgb::RED),
            GradientStop::new(0.75, Rgb::BLUE),
        ];
        assert_eq!(gradient_color_at(&stops, 0.1), Rgb::RED);
        assert_eq!(gradient_color_at(&stops, 0.9), Rgb::BLUE);
    }

    #[test]
    fn recorder_rejects_frames_when_unavailable() {
        let mut rec = SceneRecorder::new(Size::new(10.0, 10.0));
        let scene = Scene::cleared(rec.size(), Rgb::WHITE);
        assert!(rec.present(&scene).is_ok());
        rec.set_available(false);
        assert_eq!(rec.present(&scene), Err(SurfaceError::Unavailable));
        assert_eq!(rec.presented(), 1);
        assert_eq!(rec.last(), Some(&scene));
    }
}
