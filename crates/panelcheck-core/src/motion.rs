#![forbid(unsafe_code)]

//! Moving test object for judging motion clarity and ghosting.
//!
//! The object travels left to right by a fixed number of pixels per frame
//! and re-enters from the left once it is fully off the right edge. After
//! `k` frames at speed `s` on a surface `W` wide:
//!
//! ```text
//! position_k = ((k * s) mod (W + 2 * margin)) - margin
//! ```

use core::str::FromStr;

use crate::color::Rgb;
use crate::error::ParseError;
use crate::frame_clock::{FrameConsumer, FrameSample};
use crate::geometry::{Position, Rect, Size};
use crate::scene::Scene;

/// Distance kept off-surface on both sides before wrapping.
pub const DEFAULT_MARGIN: f64 = 120.0;

/// Pixels advanced per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MotionSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
    Turbo,
}

impl MotionSpeed {
    pub const ALL: [Self; 4] = [Self::Slow, Self::Normal, Self::Fast, Self::Turbo];

    #[must_use]
    pub const fn pixels_per_tick(self) -> f64 {
        match self {
            Self::Slow => 2.0,
            Self::Normal => 5.0,
            Self::Fast => 10.0,
            Self::Turbo => 20.0,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
            Self::Turbo => "turbo",
        }
    }

    /// Next preset, wrapping from `Turbo` to `Slow`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Slow => Self::Normal,
            Self::Normal => Self::Fast,
            Self::Fast => Self::Turbo,
            Self::Turbo => Self::Slow,
        }
    }
}

impl FromStr for MotionSpeed {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::new("motion speed", s))
    }
}

impl core::fmt::Display for MotionSpeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Shape drawn by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MotionPattern {
    /// Saucer with a lit window: fine detail on a dark field.
    #[default]
    Ufo,
    /// Stacked saturated blocks: color smearing.
    ColorBlocks,
    /// Large label: text legibility in motion.
    ScrollingText,
}

impl MotionPattern {
    pub const ALL: [Self; 3] = [Self::Ufo, Self::ColorBlocks, Self::ScrollingText];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Ufo => "ufo",
            Self::ColorBlocks => "color-blocks",
            Self::ScrollingText => "scrolling-text",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Ufo => Self::ColorBlocks,
            Self::ColorBlocks => Self::ScrollingText,
            Self::ScrollingText => Self::Ufo,
        }
    }
}

impl FromStr for MotionPattern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ufo" => Ok(Self::Ufo),
            "color-blocks" | "blocks" => Ok(Self::ColorBlocks),
            "scrolling-text" | "text" => Ok(Self::ScrollingText),
            _ => Err(ParseError::new("motion pattern", s)),
        }
    }
}

impl core::fmt::Display for MotionPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    pub speed: MotionSpeed,
    pub pattern: MotionPattern,
    pub margin: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: MotionSpeed::default(),
            pattern: MotionPattern::default(),
            margin: DEFAULT_MARGIN,
        }
    }
}

impl MotionConfig {
    #[must_use]
    pub fn with_speed(mut self, speed: MotionSpeed) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: MotionPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Off-surface distance; negative clamps to zero, non-finite is the default.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = if margin.is_finite() { margin.max(0.0) } else { DEFAULT_MARGIN };
        self
    }
}

const BACKGROUND: Rgb = Rgb::new(10, 10, 16);
const LABEL: &str = "PANELCHECK MOTION TEST";

/// Horizontal mover driven one step per frame.
///
/// Only the x position is state; the drawn scene is a pure function of
/// pattern, position and surface height.
#[derive(Debug, Clone)]
pub struct MotionRenderer {
    config: MotionConfig,
    viewport: Size,
    position: f64,
    ticks: u64,
}

impl MotionRenderer {
    #[must_use]
    pub fn new(config: MotionConfig, viewport: Size) -> Self {
        // Deserialized configs skip the builder.
        let config = config.with_margin(config.margin);
        Self {
            position: -config.margin,
            config,
            viewport,
            ticks: 0,
        }
    }

    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Change speed without moving the object.
    pub fn set_speed(&mut self, speed: MotionSpeed) {
        crate::debug!(speed = speed.slug(), "motion speed changed");
        self.config.speed = speed;
    }

    pub fn set_pattern(&mut self, pattern: MotionPattern) {
        crate::debug!(pattern = pattern.slug(), "motion pattern changed");
        self.config.pattern = pattern;
    }

    /// Track the drawing surface; a narrower surface re-wraps immediately.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.wrap();
    }

    /// Move back to the left edge.
    pub fn reset(&mut self) {
        self.position = -self.config.margin;
        self.ticks = 0;
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        self.ticks += 1;
        self.position += self.config.speed.pixels_per_tick();
        self.wrap();
    }

    fn wrap(&mut self) {
        let margin = self.config.margin;
        let span = self.viewport.width + 2.0 * margin;
        if span <= 0.0 {
            self.position = -margin;
            return;
        }
        // Keep the overshoot so the law above holds exactly.
        if self.position >= self.viewport.width + margin {
            self.position = (self.position + margin).rem_euclid(span) - margin;
        }
    }

    /// Draw the object at its current position on a surface of `size`.
    #[must_use]
    pub fn scene(&self, size: Size) -> Scene {
        render_shape(self.config.pattern, self.position, size)
    }
}

impl FrameConsumer for MotionRenderer {
    fn on_frame(&mut self, _sample: FrameSample) {
        self.step();
    }
}

/// Pure drawing of `pattern` with its horizontal center at `x`.
#[must_use]
pub fn render_shape(pattern: MotionPattern, x: f64, size: Size) -> Scene {
    let mut scene = Scene::cleared(size, BACKGROUND);
    let cy = size.height / 2.0;
    match pattern {
        MotionPattern::Ufo => {
            let hull = Rgb::new(170, 170, 185);
            let dome = Rgb::new(120, 200, 255);
            scene.fill_ellipse(Position::new(x, cy - 14.0), 26.0, 20.0, dome);
            scene.fill_ellipse(Position::new(x, cy), 60.0, 16.0, hull);
            for (i, light) in [Rgb::YELLOW, Rgb::RED, Rgb::GREEN].into_iter().enumerate() {
                let lx = x - 30.0 + 30.0 * i as f64;
                scene.fill_ellipse(Position::new(lx, cy + 2.0), 5.0, 5.0, light);
            }
        }
        MotionPattern::ColorBlocks => {
            let colors = [Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::WHITE];
            let block = 48.0;
            let top = cy - block * colors.len() as f64 / 2.0;
            for (i, color) in colors.into_iter().enumerate() {
                let rect = Rect::new(x - block / 2.0, top + block * i as f64, block, block);
                scene.fill_rect(rect, color);
            }
        }
        MotionPattern::ScrollingText => {
            let text_size = (size.height / 8.0).clamp(12.0, 64.0);
            let half_width = text_size * 0.3 * LABEL.len() as f64;
            scene.text(
                Position::new(x - half_width, cy - text_size / 2.0),
                text_size,
                Rgb::WHITE,
                LABEL,
            );
        }
    }
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawCommand;
    use pretty_assertions::assert_eq;

    fn renderer(speed: MotionSpeed, width: f64) -> MotionRenderer {
        MotionRenderer::new(
            MotionConfig::default().with_speed(speed),
            Size::new(width, 200.0),
        )
    }

    #[test]
    fn starts_off_surface_left() {
        let r = renderer(MotionSpeed::Normal, 800.0);
        assert_eq!(r.position(), -DEFAULT_MARGIN);
    }

    #[test]
    fn unusable_margins_are_sanitized() {
        let negative = MotionConfig {
            margin: -50.0,
            ..MotionConfig::default()
        };
        let mut r = MotionRenderer::new(negative, Size::new(0.0, 200.0));
        assert_eq!(r.config().margin, 0.0);
        r.step();
        assert_eq!(r.position(), 0.0);

        let nan = MotionConfig {
            margin: f64::NAN,
            ..MotionConfig::default()
        };
        let r = MotionRenderer::new(nan, Size::new(800.0, 200.0));
        assert_eq!(r.config().margin, DEFAULT_MARGIN);
        assert_eq!(r.position(), -DEFAULT_MARGIN);
    }

    #[test]
    fn speeds_match_presets() {
        let px: Vec<f64> = MotionSpeed::ALL.iter().map(|s| s.pixels_per_tick()).collect();
        assert_eq!(px, vec![2.0, 5.0, 10.0, 20.0]);
    }

    #[test]
    fn wraps_back_to_left_margin() {
        // span = 100 + 240 = 340 = 17 * 20
        let mut r = renderer(MotionSpeed::Turbo, 100.0);
        for _ in 0..16 {
            r.step();
        }
        assert_eq!(r.position(), 200.0);
        r.step();
        assert_eq!(r.position(), -DEFAULT_MARGIN);
    }

    #[test]
    fn overshoot_is_preserved_on_wrap() {
        // span = 101 + 240 = 341; 18 ticks * 20 = 360 -> 19 past the span
        let mut r = renderer(MotionSpeed::Turbo, 101.0);
        for _ in 0..18 {
            r.step();
        }
        assert_eq!(r.position(), 19.0 - DEFAULT_MARGIN);
    }

    #[test]
    fn speed_switch_keeps_position() {
        let mut r = renderer(MotionSpeed::Slow, 800.0);
        r.step();
        r.set_speed(MotionSpeed::Fast);
        assert_eq!(r.position(), -118.0);
        r.step();
        assert_eq!(r.position(), -108.0);
    }

    #[test]
    fn shrinking_viewport_rewraps() {
        let mut r = renderer(MotionSpeed::Turbo, 2000.0);
        for _ in 0..50 {
            r.step();
        }
        assert_eq!(r.position(), 880.0);
        r.set_viewport(Size::new(500.0, 200.0));
        assert!(r.position() < 500.0 + DEFAULT_MARGIN);
        assert!(r.position() >= -DEFAULT_MARGIN);
    }

    #[test]
    fn frame_consumer_steps() {
        let mut r = renderer(MotionSpeed::Normal, 800.0);
        r.on_frame(FrameSample::new(0.0));
        r.on_frame(FrameSample::new(16.0));
        assert_eq!(r.ticks(), 2);
        assert_eq!(r.position(), -110.0);
    }

    #[test]
    fn scene_is_pure_in_position() {
        let size = Size::new(400.0, 300.0);
        for pattern in MotionPattern::ALL {
            assert_eq!(render_shape(pattern, 50.0, size), render_shape(pattern, 50.0, size));
            assert_ne!(render_shape(pattern, 50.0, size), render_shape(pattern, 60.0, size));
        }
    }

    #[test]
    fn blocks_are_centered_on_position() {
        let scene = render_shape(MotionPattern::ColorBlocks, 100.0, Size::new(400.0, 400.0));
        let rects: Vec<Rect> = scene
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(rects.len(), 4);
        assert!(rects.iter().all(|r| r.x == 76.0 && r.width == 48.0));
    }

    #[test]
    fn parse_slugs() {
        assert_eq!("turbo".parse::<MotionSpeed>(), Ok(MotionSpeed::Turbo));
        assert_eq!("blocks".parse::<MotionPattern>(), Ok(MotionPattern::ColorBlocks));
        assert_eq!(MotionPattern::ScrollingText.to_string(), "scrolling-text");
        let err = "warp".parse::<MotionSpeed>().unwrap_err();
        assert_eq!(err.kind(), "motion speed");
    }
}
