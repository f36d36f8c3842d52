#![forbid(unsafe_code)]

//! Refresh-rate estimation from frame timestamps.
//!
//! [`RefreshEstimator`] turns consecutive [`FrameSample`]s into inter-frame
//! deltas, keeps the most recent ones in a bounded [`FrameWindow`], and
//! reports `1000 / mean(delta)` Hz once enough deltas are in.
//!
//! # Timing anomalies
//!
//! - A non-positive delta (duplicate callback in one tick, clock hiccup) is
//!   dropped and never divided by.
//! - A delta above [`RefreshConfig::max_delta_ms`] (background-tab
//!   throttling) is dropped too, but the timestamp is still recorded so the
//!   following delta is measured from it.
//! - Neither case resets the window or the current estimate.

use std::collections::VecDeque;

use crate::color::Rgb;
use crate::frame_clock::{FrameConsumer, FrameSample};
use crate::geometry::{Position, Size};
use crate::scene::Scene;

/// Default number of deltas kept.
pub const DEFAULT_WINDOW_CAPACITY: usize = 60;
/// The window must hold strictly more than this many deltas before an
/// estimate is produced.
pub const DEFAULT_MIN_SAMPLES: usize = 10;
/// Deltas longer than this are treated as throttling, not refresh timing.
pub const DEFAULT_MAX_DELTA_MS: f64 = 1000.0;

/// Estimator tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(default, rename_all = "camelCase", deny_unknown_fields)
)]
pub struct RefreshConfig {
    pub window_capacity: usize,
    pub min_samples: usize,
    pub max_delta_ms: f64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            min_samples: DEFAULT_MIN_SAMPLES,
            max_delta_ms: DEFAULT_MAX_DELTA_MS,
        }
    }
}

impl RefreshConfig {
    /// Bring the tuning into a usable range.
    ///
    /// The window grows to hold at least `min_samples + 1` deltas so an
    /// estimate can appear at all. A zero, negative or non-finite
    /// `max_delta_ms` falls back to [`DEFAULT_MAX_DELTA_MS`].
    #[must_use]
    pub fn sanitized(self) -> Self {
        let min_samples = self.min_samples.min(usize::MAX - 1);
        let max_delta_ms = if self.max_delta_ms.is_finite() && self.max_delta_ms > 0.0 {
            self.max_delta_ms
        } else {
            DEFAULT_MAX_DELTA_MS
        };
        Self {
            window_capacity: self.window_capacity.max(min_samples + 1),
            min_samples,
            max_delta_ms,
        }
    }
}

/// Bounded FIFO of positive inter-frame deltas (milliseconds).
#[derive(Debug, Clone, PartialEq)]
pub struct FrameWindow {
    deltas: VecDeque<f64>,
    capacity: usize,
}

impl FrameWindow {
    /// Create a window. A zero capacity is bumped to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            deltas: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a delta, evicting the oldest when full.
    ///
    /// Returns `false` (and stores nothing) for zero, negative or non-finite
    /// deltas.
    pub fn push(&mut self, delta_ms: f64) -> bool {
        if !delta_ms.is_finite() || delta_ms <= 0.0 {
            return false;
        }
        if self.deltas.len() == self.capacity {
            self.deltas.pop_front();
        }
        self.deltas.push_back(delta_ms);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Arithmetic mean of the stored deltas.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.deltas.is_empty() {
            return None;
        }
        Some(self.deltas.iter().sum::<f64>() / self.deltas.len() as f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.deltas.iter().copied()
    }

    pub fn clear(&mut self) {
        self.deltas.clear();
    }
}

/// Human-facing refresh class, highest threshold first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RefreshTier {
    /// Below 75 Hz.
    Standard,
    /// 75 Hz and up.
    Entry,
    /// 120 Hz and up.
    ConsoleHigh,
    /// 144 Hz and up.
    Competitive,
    /// 165 Hz and up.
    Premium,
    /// 240 Hz and up.
    Pro,
    /// 360 Hz and up.
    Elite,
}

impl RefreshTier {
    /// Classify a rounded refresh rate.
    #[must_use]
    pub const fn classify(hz: u32) -> Self {
        match hz {
            360.. => Self::Elite,
            240.. => Self::Pro,
            165.. => Self::Premium,
            144.. => Self::Competitive,
            120.. => Self::ConsoleHigh,
            75.. => Self::Entry,
            _ => Self::Standard,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Elite => "elite",
            Self::Pro => "pro",
            Self::Premium => "premium",
            Self::Competitive => "competitive",
            Self::ConsoleHigh => "console/high",
            Self::Entry => "entry",
            Self::Standard => "standard/needs configuration",
        }
    }
}

impl core::fmt::Display for RefreshTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A smoothed refresh-rate estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshEstimate {
    hz: f64,
}

impl RefreshEstimate {
    /// Unrounded estimate.
    #[must_use]
    pub fn hz(&self) -> f64 {
        self.hz
    }

    /// Estimate rounded to the nearest integer Hz.
    #[must_use]
    pub fn rounded(&self) -> u32 {
        self.hz.round().clamp(0.0, f64::from(u32::MAX)) as u32
    }

    #[must_use]
    pub fn tier(&self) -> RefreshTier {
        RefreshTier::classify(self.rounded())
    }
}

/// Sliding-window refresh-rate estimator.
#[derive(Debug, Clone)]
pub struct RefreshEstimator {
    config: RefreshConfig,
    window: FrameWindow,
    last_timestamp: Option<f64>,
    estimate: Option<RefreshEstimate>,
}

impl Default for RefreshEstimator {
    fn default() -> Self {
        Self::new(RefreshConfig::default())
    }
}

impl RefreshEstimator {
    /// Build an estimator; `config` is [sanitized](RefreshConfig::sanitized) first.
    #[must_use]
    pub fn new(config: RefreshConfig) -> Self {
        let config = config.sanitized();
        Self {
            window: FrameWindow::new(config.window_capacity),
            config,
            last_timestamp: None,
            estimate: None,
        }
    }

    /// Feed one frame timestamp. Returns the current estimate, if any.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Option<RefreshEstimate> {
        let Some(last) = self.last_timestamp else {
            if timestamp_ms.is_finite() {
                self.last_timestamp = Some(timestamp_ms);
            }
            return self.estimate;
        };

        let delta = timestamp_ms - last;
        if !delta.is_finite() || delta <= 0.0 {
            crate::trace!(delta, "non-positive frame delta discarded");
            return self.estimate;
        }
        self.last_timestamp = Some(timestamp_ms);

        if delta > self.config.max_delta_ms {
            crate::trace!(delta, "oversized frame delta discarded");
            return self.estimate;
        }

        self.window.push(delta);
        if self.window.len() > self.config.min_samples
            && let Some(mean) = self.window.mean()
        {
            self.estimate = Some(RefreshEstimate { hz: 1000.0 / mean });
        }
        self.estimate
    }

    /// Latest estimate; `None` until the window holds enough deltas.
    #[must_use]
    pub fn estimate(&self) -> Option<RefreshEstimate> {
        self.estimate
    }

    #[must_use]
    pub fn window(&self) -> &FrameWindow {
        &self.window
    }

    #[must_use]
    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Forget all samples.
    pub fn reset(&mut self) {
        self.window.clear();
        self.last_timestamp = None;
        self.estimate = None;
    }
}

/// Numbers shown by the refresh-rate tool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefreshReadout {
    /// Rounded estimate in Hz.
    pub hz: Option<u32>,
    /// Unrounded estimate in Hz.
    pub hz_exact: Option<f64>,
    pub tier: Option<RefreshTier>,
    /// Frame callbacks received, including discarded ones.
    pub frame_count: u64,
    /// Seconds since the first frame.
    pub elapsed_secs: f64,
}

/// Estimator plus frame counter and elapsed time: the refresh-rate tool's engine.
#[derive(Debug, Clone, Default)]
pub struct RefreshMeter {
    estimator: RefreshEstimator,
    frames: u64,
    first_ms: Option<f64>,
    latest_ms: Option<f64>,
}

impl RefreshMeter {
    #[must_use]
    pub fn new(config: RefreshConfig) -> Self {
        Self {
            estimator: RefreshEstimator::new(config),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn estimator(&self) -> &RefreshEstimator {
        &self.estimator
    }

    #[must_use]
    pub fn readout(&self) -> RefreshReadout {
        let estimate = self.estimator.estimate();
        let elapsed_ms = match (self.first_ms, self.latest_ms) {
            (Some(first), Some(latest)) if latest > first => latest - first,
            _ => 0.0,
        };
        RefreshReadout {
            hz: estimate.map(|e| e.rounded()),
            hz_exact: estimate.map(|e| e.hz()),
            tier: estimate.map(|e| e.tier()),
            frame_count: self.frames,
            elapsed_secs: elapsed_ms / 1000.0,
        }
    }

    /// Start over (new measurement run).
    pub fn reset(&mut self) {
        self.estimator.reset();
        self.frames = 0;
        self.first_ms = None;
        self.latest_ms = None;
    }

    /// Large centered readout: rate, tier, then frame count and elapsed time.
    #[must_use]
    pub fn scene(&self, size: Size) -> Scene {
        let readout = self.readout();
        let mut scene = Scene::cleared(size, Rgb::BLACK);
        let big = (size.height / 6.0).clamp(8.0, 96.0);
        let small = (big / 3.0).max(8.0);
        let center = size.center();

        let headline = readout
            .hz
            .map_or_else(|| "measuring...".to_owned(), |hz| format!("{hz} Hz"));
        scene.text(
            Position::new(center.x - big * 0.3 * headline.len() as f64, center.y - big),
            big,
            Rgb::WHITE,
            headline,
        );
        if let Some(tier) = readout.tier {
            let label = tier.label();
            scene.text(
                Position::new(center.x - small * 0.3 * label.len() as f64, center.y + small),
                small,
                Rgb::new(120, 200, 255),
                label,
            );
        }
        let stats = format!(
            "{} frames, {:.1} s",
            readout.frame_count, readout.elapsed_secs
        );
        scene.text(
            Position::new(center.x - small * 0.3 * stats.len() as f64, center.y + small * 3.0),
            small,
            Rgb::gray(160),
            stats,
        );
        scene
    }
}

impl FrameConsumer for RefreshMeter {
    fn on_frame(&mut self, sample: FrameSample) {
        let ts = sample.timestamp_ms;
        self.frames += 1;
        if self.first_ms.is_none() && ts.is_finite() {
            self.first_ms = Some(ts);
        }
        if ts.is_finite() && self.latest_ms.is_none_or(|latest| ts > latest) {
            self.latest_ms = Some(ts);
        }
        self.estimator.on_frame(ts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed(est: &mut RefreshEstimator, interval: f64, frames: usize) {
        for i in 0..frames {
            est.on_frame(interval * i as f64);
        }
    }

    #[test]
    fn first_sample_only_records_timestamp() {
        let mut est = RefreshEstimator::default();
        assert_eq!(est.on_frame(100.0), None);
        assert!(est.window().is_empty());
    }

    #[test]
    fn no_estimate_until_more_than_min_samples() {
        let mut est = RefreshEstimator::default();
        // 11 timestamps -> 10 deltas: not yet.
        feed(&mut est, 16.0, 11);
        assert_eq!(est.window().len(), 10);
        assert_eq!(est.estimate(), None);
        // 12th timestamp -> 11 deltas.
        est.on_frame(16.0 * 11.0);
        let e = est.estimate().expect("estimate after 11 deltas");
        assert_eq!(e.rounded(), 63);
    }

    #[test]
    fn duplicate_timestamp_is_dropped() {
        let mut est = RefreshEstimator::default();
        feed(&mut est, 10.0, 20);
        let before = est.estimate();
        let len = est.window().len();
        est.on_frame(190.0);
        assert_eq!(est.estimate(), before);
        assert_eq!(est.window().len(), len);
    }

    #[test]
    fn backwards_timestamp_does_not_move_the_anchor() {
        let mut est = RefreshEstimator::default();
        est.on_frame(100.0);
        est.on_frame(50.0);
        est.on_frame(110.0);
        assert_eq!(est.window().iter().collect::<Vec<_>>(), vec![10.0]);
    }

    #[test]
    fn throttled_gap_is_skipped_without_reset() {
        let mut est = RefreshEstimator::default();
        feed(&mut est, 10.0, 30);
        let hz = est.estimate().unwrap().rounded();
        let len = est.window().len();

        // Tab in background for five seconds.
        est.on_frame(290.0 + 5000.0);
        assert_eq!(est.window().len(), len);
        assert_eq!(est.estimate().unwrap().rounded(), hz);

        // Next delta is measured from the post-gap timestamp.
        est.on_frame(290.0 + 5010.0);
        assert_eq!(est.window().iter().last(), Some(10.0));
    }

    #[test]
    fn unusable_tuning_is_sanitized() {
        let config = RefreshConfig {
            window_capacity: 5,
            min_samples: 10,
            max_delta_ms: -1.0,
        };
        let mut est = RefreshEstimator::new(config);
        assert_eq!(
            *est.config(),
            RefreshConfig {
                window_capacity: 11,
                min_samples: 10,
                max_delta_ms: DEFAULT_MAX_DELTA_MS,
            }
        );

        feed(&mut est, 1000.0 / 60.0, 600);
        assert_eq!(est.estimate().map(|e| e.rounded()), Some(60));

        let nan_gate = RefreshConfig {
            max_delta_ms: f64::NAN,
            ..RefreshConfig::default()
        };
        assert_eq!(nan_gate.sanitized().max_delta_ms, DEFAULT_MAX_DELTA_MS);
    }

    #[test]
    fn window_evicts_oldest() {
        let mut w = FrameWindow::new(3);
        for d in [1.0, 2.0, 3.0, 4.0] {
            assert!(w.push(d));
        }
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert!(!w.push(0.0));
        assert!(!w.push(-1.0));
        assert!(!w.push(f64::NAN));
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn tier_thresholds() {
        let cases = [
            (30, RefreshTier::Standard),
            (74, RefreshTier::Standard),
            (75, RefreshTier::Entry),
            (119, RefreshTier::Entry),
            (120, RefreshTier::ConsoleHigh),
            (144, RefreshTier::Competitive),
            (165, RefreshTier::Premium),
            (239, RefreshTier::Premium),
            (240, RefreshTier::Pro),
            (360, RefreshTier::Elite),
            (500, RefreshTier::Elite),
        ];
        for (hz, tier) in cases {
            assert_eq!(RefreshTier::classify(hz), tier, "hz={hz}");
        }
        assert_eq!(RefreshTier::ConsoleHigh.to_string(), "console/high");
        assert_eq!(
            RefreshTier::Standard.label(),
            "standard/needs configuration"
        );
    }

    #[test]
    fn meter_counts_frames_and_elapsed_time() {
        let mut meter = RefreshMeter::default();
        for i in 0..61 {
            meter.on_frame(FrameSample::new(1000.0 + 1000.0 / 60.0 * i as f64));
        }
        let r = meter.readout();
        assert_eq!(r.frame_count, 61);
        assert!((r.elapsed_secs - 1.0).abs() < 1e-9);
        assert_eq!(r.hz, Some(60));
        assert_eq!(r.tier, Some(RefreshTier::Standard));

        meter.reset();
        assert_eq!(meter.readout(), RefreshReadout::default());
    }

    #[test]
    fn meter_scene_shows_measuring_then_rate() {
        let size = Size::new(640.0, 480.0);
        let mut meter = RefreshMeter::default();
        let first: Vec<String> = meter.scene(size).texts().map(|t| t.3.to_owned()).collect();
        assert_eq!(first[0], "measuring...");

        for i in 0..20 {
            meter.on_frame(FrameSample::new(i as f64 * 1000.0 / 120.0));
        }
        let texts: Vec<String> = meter.scene(size).texts().map(|t| t.3.to_owned()).collect();
        assert_eq!(texts[0], "120 Hz");
        assert_eq!(texts[1], "console/high");
    }
}
