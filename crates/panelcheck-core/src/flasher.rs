#![forbid(unsafe_code)]

//! Pixel-repair flasher: a small draggable square cycling saturated colors.
//!
//! The color on screen is a function of time since the first frame, so a
//! slow or irregular frame rate never slows the cycle down, it only skips
//! colors. The square always stays fully on the viewport.

use core::str::FromStr;

use crate::color::Rgb;
use crate::error::ParseError;
use crate::frame_clock::{FrameConsumer, FrameSample};
use crate::geometry::{Position, Rect, Size};
use crate::scene::Scene;

pub const DEFAULT_REGION: Size = Size {
    width: 100.0,
    height: 100.0,
};
pub const DEFAULT_PERIOD_MS: f64 = 100.0;

const FULL: [Rgb; 5] = [Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::WHITE, Rgb::BLACK];
const PRIMARIES: [Rgb; 3] = [Rgb::RED, Rgb::GREEN, Rgb::BLUE];
const BLACK_WHITE: [Rgb; 2] = [Rgb::BLACK, Rgb::WHITE];

/// Colors the flasher cycles through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FlashSequence {
    Rgb,
    #[default]
    Full,
    BlackWhite,
    Custom(Vec<Rgb>),
}

impl FlashSequence {
    /// The cycle. An empty custom list falls back to the full sequence.
    #[must_use]
    pub fn colors(&self) -> &[Rgb] {
        match self {
            Self::Rgb => &PRIMARIES,
            Self::Full => &FULL,
            Self::BlackWhite => &BLACK_WHITE,
            Self::Custom(colors) if !colors.is_empty() => colors,
            Self::Custom(_) => &FULL,
        }
    }
}

impl FromStr for FlashSequence {
    type Err = ParseError;

    /// `rgb`, `full`, `black-white`, or a comma-separated color list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => return Ok(Self::Rgb),
            "full" => return Ok(Self::Full),
            "black-white" | "bw" => return Ok(Self::BlackWhite),
            _ => {}
        }
        let colors = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Rgb::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseError::new("flash sequence", s))?;
        if colors.is_empty() {
            return Err(ParseError::new("flash sequence", s));
        }
        Ok(Self::Custom(colors))
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlasherConfig {
    pub sequence: FlashSequence,
    pub region: Size,
    pub period_ms: f64,
}

impl Default for FlasherConfig {
    fn default() -> Self {
        Self {
            sequence: FlashSequence::default(),
            region: DEFAULT_REGION,
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

impl FlasherConfig {
    #[must_use]
    pub fn with_sequence(mut self, sequence: FlashSequence) -> Self {
        self.sequence = sequence;
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: Size) -> Self {
        self.region = region;
        self
    }

    /// Color hold time; non-positive values keep the default.
    #[must_use]
    pub fn with_period_ms(mut self, period_ms: f64) -> Self {
        if period_ms.is_finite() && period_ms > 0.0 {
            self.period_ms = period_ms;
        }
        self
    }
}

/// Draggable color-cycling region.
#[derive(Debug, Clone)]
pub struct PixelRepairFlasher {
    config: FlasherConfig,
    viewport: Size,
    origin: Position,
    drag_from: Option<Position>,
    first_ms: Option<f64>,
    now_ms: Option<f64>,
    color_index: usize,
}

impl PixelRepairFlasher {
    /// New flasher centered in `viewport`.
    #[must_use]
    pub fn new(config: FlasherConfig, viewport: Size) -> Self {
        let center = viewport.center();
        let mut flasher = Self {
            origin: center.offset(-config.region.width / 2.0, -config.region.height / 2.0),
            config,
            viewport,
            drag_from: None,
            first_ms: None,
            now_ms: None,
            color_index: 0,
        };
        flasher.clamp();
        flasher
    }

    #[must_use]
    pub fn config(&self) -> &FlasherConfig {
        &self.config
    }

    /// Screen area covered by the square.
    #[must_use]
    pub fn region(&self) -> Rect {
        Rect::from_origin(self.origin, self.config.region)
    }

    #[must_use]
    pub fn current_color(&self) -> Rgb {
        let colors = self.config.sequence.colors();
        colors[self.color_index % colors.len()]
    }

    #[must_use]
    pub fn color_index(&self) -> usize {
        self.color_index
    }

    /// Time since the first frame.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        match (self.first_ms, self.now_ms) {
            (Some(first), Some(now)) if now > first => now - first,
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    /// Switch the cycle; timing continues.
    pub fn set_sequence(&mut self, sequence: FlashSequence) {
        self.config.sequence = sequence;
        self.recompute_index();
    }

    /// Track the viewport, keeping the square on screen. The first
    /// non-empty viewport centers it.
    pub fn set_viewport(&mut self, viewport: Size) {
        if self.viewport.is_empty() {
            let center = viewport.center();
            self.origin = center.offset(
                -self.config.region.width / 2.0,
                -self.config.region.height / 2.0,
            );
        }
        self.viewport = viewport;
        self.clamp();
    }

    /// Begin a drag if `at` is on the square. Returns whether it was.
    pub fn pointer_down(&mut self, at: Position) -> bool {
        if self.region().contains(at) {
            self.drag_from = Some(at);
            true
        } else {
            false
        }
    }

    /// Move the square by the pointer delta while dragging.
    pub fn pointer_move(&mut self, at: Position) -> bool {
        let Some(from) = self.drag_from else {
            return false;
        };
        self.origin = self.origin.offset(at.x - from.x, at.y - from.y);
        self.clamp();
        self.drag_from = Some(at);
        true
    }

    pub fn pointer_up(&mut self) {
        if self.drag_from.take().is_some() {
            crate::debug!(x = self.origin.x, y = self.origin.y, "flasher moved");
        }
    }

    /// Forget timing and any drag in progress; the next frame is time zero.
    pub fn reset_timer(&mut self) {
        self.drag_from = None;
        self.first_ms = None;
        self.now_ms = None;
        self.color_index = 0;
    }

    /// Advance the color cycle to `timestamp_ms`.
    pub fn advance_to(&mut self, timestamp_ms: f64) {
        if !timestamp_ms.is_finite() {
            return;
        }
        if self.first_ms.is_none() {
            self.first_ms = Some(timestamp_ms);
        }
        if self.now_ms.is_none_or(|now| timestamp_ms > now) {
            self.now_ms = Some(timestamp_ms);
        }
        self.recompute_index();
    }

    fn recompute_index(&mut self) {
        let len = self.config.sequence.colors().len();
        let steps = (self.elapsed_ms() / self.config.period_ms).floor();
        // Saturating float-to-int cast; the modulo keeps it in range.
        self.color_index = (steps as usize) % len;
    }

    fn clamp(&mut self) {
        let max_x = (self.viewport.width - self.config.region.width).max(0.0);
        let max_y = (self.viewport.height - self.config.region.height).max(0.0);
        self.origin = Position::new(self.origin.x.clamp(0.0, max_x), self.origin.y.clamp(0.0, max_y));
    }

    /// Black field with the square on top.
    #[must_use]
    pub fn scene(&self, size: Size) -> Scene {
        let mut scene = Scene::cleared(size, Rgb::BLACK);
        scene.fill_rect(self.region(), self.current_color());
        scene
    }
}

impl FrameConsumer for PixelRepairFlasher {
    fn on_frame(&mut self, sample: FrameSample) {
        self.advance_to(sample.timestamp_ms);
    }
}
