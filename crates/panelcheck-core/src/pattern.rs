#![forbid(unsafe_code)]

//! Test patterns and ordered pattern lists.
//!
//! A [`TestPattern`] is an identifier plus an immutable rendering descriptor
//! ([`PatternFill`]). Rendering is a pure function of the pattern and the
//! surface size.

use crate::color::Rgb;
use crate::geometry::{Position, Rect, Size};
use crate::scene::{GradientAxis, GradientStop, Scene};

/// What a pattern draws.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternFill {
    /// One flat color over the whole surface.
    Solid(Rgb),
    /// Two-color linear ramp.
    Gradient {
        axis: GradientAxis,
        from: Rgb,
        to: Rgb,
    },
    /// Evenly spaced lines on a background.
    Grid {
        background: Rgb,
        line: Rgb,
        spacing: f64,
        line_width: f64,
    },
    /// Alternating squares.
    Checkerboard { even: Rgb, odd: Rgb, cell: f64 },
    /// Equal-width bands, one per color.
    Bars { axis: GradientAxis, colors: Vec<Rgb> },
    /// Static text sample for sharpness and contrast reading.
    Text {
        background: Rgb,
        foreground: Rgb,
        lines: Vec<String>,
    },
}

/// A named, immutable test pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct TestPattern {
    id: String,
    name: String,
    fill: PatternFill,
}

impl TestPattern {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, fill: PatternFill) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fill,
        }
    }

    /// Full-surface solid color.
    #[must_use]
    pub fn solid(id: impl Into<String>, name: impl Into<String>, color: Rgb) -> Self {
        Self::new(id, name, PatternFill::Solid(color))
    }

    /// Stable identifier (`"red"`, `"grid"`, ...).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fill(&self) -> &PatternFill {
        &self.fill
    }

    /// Render for a surface of `size`.
    #[must_use]
    pub fn scene(&self, size: Size) -> Scene {
        let full = Rect::full(size);
        match &self.fill {
            PatternFill::Solid(color) => Scene::cleared(size, *color),
            PatternFill::Gradient { axis, from, to } => {
                let mut scene = Scene::cleared(size, *from);
                scene.gradient(
                    full,
                    *axis,
                    vec![GradientStop::new(0.0, *from), GradientStop::new(1.0, *to)],
                );
                scene
            }
            PatternFill::Grid {
                background,
                line,
                spacing,
                line_width,
            } => grid_scene(size, *background, *line, *spacing, *line_width),
            PatternFill::Checkerboard { even, odd, cell } => {
                checkerboard_scene(size, *even, *odd, *cell)
            }
            PatternFill::Bars { axis, colors } => bars_scene(size, *axis, colors),
            PatternFill::Text {
                background,
                foreground,
                lines,
            } => {
                let mut scene = Scene::cleared(size, *background);
                let line_height = (size.height / 20.0).clamp(12.0, 48.0);
                let margin = line_height;
                for (i, text) in lines.iter().enumerate() {
                    let y = margin + i as f64 * line_height * 1.5;
                    scene.text(Position::new(margin, y), line_height, *foreground, text.as_str());
                }
                scene
            }
        }
    }
}

fn grid_scene(size: Size, background: Rgb, line: Rgb, spacing: f64, line_width: f64) -> Scene {
    let mut scene = Scene::cleared(size, background);
    if spacing <= 0.0 || line_width <= 0.0 {
        return scene;
    }
    let mut x = 0.0;
    while x < size.width {
        scene.fill_rect(Rect::new(x, 0.0, line_width, size.height), line);
        x += spacing;
    }
    let mut y = 0.0;
    while y < size.height {
        scene.fill_rect(Rect::new(0.0, y, size.width, line_width), line);
        y += spacing;
    }
    // Close the right and bottom edges.
    scene.fill_rect(
        Rect::new(size.width - line_width, 0.0, line_width, size.height),
        line,
    );
    scene.fill_rect(
        Rect::new(0.0, size.height - line_width, size.width, line_width),
        line,
    );
    scene
}

fn checkerboard_scene(size: Size, even: Rgb, odd: Rgb, cell: f64) -> Scene {
    let mut scene = Scene::cleared(size, even);
    if cell <= 0.0 {
        return scene;
    }
    let cols = (size.width / cell).ceil() as usize;
    let rows = (size.height / cell).ceil() as usize;
    for row in 0..rows {
        for col in 0..cols {
            if (row + col) % 2 == 1 {
                scene.fill_rect(
                    Rect::new(col as f64 * cell, row as f64 * cell, cell, cell),
                    odd,
                );
            }
        }
    }
    scene
}

fn bars_scene(size: Size, axis: GradientAxis, colors: &[Rgb]) -> Scene {
    let mut scene = Scene::cleared(size, colors.first().copied().unwrap_or(Rgb::BLACK));
    if colors.is_empty() {
        return scene;
    }
    let n = colors.len() as f64;
    for (i, color) in colors.iter().enumerate() {
        let rect = match axis {
            GradientAxis::Horizontal => {
                let w = size.width / n;
                Rect::new(i as f64 * w, 0.0, w, size.height)
            }
            GradientAxis::Vertical => {
                let h = size.height / n;
                Rect::new(0.0, i as f64 * h, size.width, h)
            }
        };
        scene.fill_rect(rect, *color);
    }
    scene
}

/// A fixed, non-empty, ordered list of patterns for one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSequence {
    patterns: Vec<TestPattern>,
}

impl PatternSequence {
    /// Wrap `patterns`; `None` when the list is empty.
    #[must_use]
    pub fn new(patterns: Vec<TestPattern>) -> Option<Self> {
        if patterns.is_empty() {
            None
        } else {
            Some(Self { patterns })
        }
    }

    /// Constructor for built-in lists that are non-empty by construction.
    pub(crate) fn from_literal(patterns: Vec<TestPattern>) -> Self {
        debug_assert!(!patterns.is_empty());
        Self { patterns }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TestPattern> {
        self.patterns.get(index)
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.patterns.len().saturating_sub(1)
    }

    /// Index of the pattern with id `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestPattern> + '_ {
        self.patterns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Framebuffer;
    use pretty_assertions::assert_eq;

    fn raster(pattern: &TestPattern, w: usize, h: usize) -> Framebuffer {
        let mut fb = Framebuffer::new(w, h);
        fb.render(&pattern.scene(Size::new(w as f64, h as f64)));
        fb
    }

    #[test]
    fn solid_fills_surface() {
        let fb = raster(&TestPattern::solid("red", "Red", Rgb::RED), 8, 4);
        assert!((0..4).all(|y| fb.row(y).iter().all(|&p| p == Rgb::RED)));
    }

    #[test]
    fn checkerboard_alternates() {
        let p = TestPattern::new(
            "checker",
            "Checkerboard",
            PatternFill::Checkerboard {
                even: Rgb::BLACK,
                odd: Rgb::WHITE,
                cell: 2.0,
            },
        );
        let fb = raster(&p, 8, 8);
        assert_eq!(fb.get(0, 0), Some(Rgb::BLACK));
        assert_eq!(fb.get(2, 0), Some(Rgb::WHITE));
        assert_eq!(fb.get(2, 2), Some(Rgb::BLACK));
        assert_eq!(fb.get(0, 2), Some(Rgb::WHITE));
    }

    #[test]
    fn grid_draws_lines_on_background() {
        let p = TestPattern::new(
            "grid",
            "Grid",
            PatternFill::Grid {
                background: Rgb::BLACK,
                line: Rgb::WHITE,
                spacing: 5.0,
                line_width: 1.0,
            },
        );
        let fb = raster(&p, 20, 20);
        assert_eq!(fb.get(0, 3), Some(Rgb::WHITE));
        assert_eq!(fb.get(5, 3), Some(Rgb::WHITE));
        assert_eq!(fb.get(2, 2), Some(Rgb::BLACK));
        assert_eq!(fb.get(19, 12), Some(Rgb::WHITE));
    }

    #[test]
    fn bars_split_evenly() {
        let p = TestPattern::new(
            "bars",
            "Bars",
            PatternFill::Bars {
                axis: GradientAxis::Horizontal,
                colors: vec![Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::WHITE],
            },
        );
        let fb = raster(&p, 8, 1);
        assert_eq!(
            fb.row(0),
            &[
                Rgb::RED,
                Rgb::RED,
                Rgb::GREEN,
                Rgb::GREEN,
                Rgb::BLUE,
                Rgb::BLUE,
                Rgb::WHITE,
                Rgb::WHITE
            ]
        );
    }

    #[test]
    fn text_pattern_emits_lines_in_order() {
        let p = TestPattern::new(
            "text",
            "Text",
            PatternFill::Text {
                background: Rgb::WHITE,
                foreground: Rgb::BLACK,
                lines: vec!["one".into(), "two".into()],
            },
        );
        let scene = p.scene(Size::new(800.0, 600.0));
        let texts: Vec<&str> = scene.texts().map(|(_, _, _, t)| t).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(scene.background(), Some(Rgb::WHITE));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(PatternSequence::new(Vec::new()).is_none());
        let seq = PatternSequence::new(vec![
            TestPattern::solid("a", "A", Rgb::BLACK),
            TestPattern::solid("b", "B", Rgb::WHITE),
        ])
        .unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.last_index(), 1);
        assert_eq!(seq.position("b"), Some(1));
        assert_eq!(seq.position("z"), None);
    }
}
