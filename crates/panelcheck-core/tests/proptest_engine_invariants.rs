//! Property-based invariant tests for the diagnostic engines.
//!
//! 1. A constant frame interval converges to `1000 / interval` Hz (within 1 Hz).
//! 2. A duplicate timestamp never changes the estimate or the window.
//! 3. The frame window never exceeds its capacity.
//! 4. `k < N` advances after start land on index `k`; `N` advances end idle.
//! 5. Stopping from any active index releases fullscreen.
//! 6. Motion position follows `((k * s) mod (W + 2m)) - m`.
//! 7. A dragged flasher never leaves a viewport that can hold it.

use panelcheck_core::catalog;
use panelcheck_core::flasher::{FlasherConfig, PixelRepairFlasher};
use panelcheck_core::fullscreen::RecordingHost;
use panelcheck_core::motion::{DEFAULT_MARGIN, MotionConfig, MotionRenderer, MotionSpeed};
use panelcheck_core::pattern::PatternSequence;
use panelcheck_core::refresh::{RefreshConfig, RefreshEstimator};
use panelcheck_core::session::{SessionState, TestSession};
use panelcheck_core::{Position, Size};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn sequence_strategy() -> impl Strategy<Value = PatternSequence> {
    prop_oneof![
        Just(catalog::dead_pixel()),
        Just(catalog::black_white()),
        Just(catalog::color_test()),
        Just(catalog::contrast()),
        Just(catalog::brightness()),
    ]
}

fn speed_strategy() -> impl Strategy<Value = MotionSpeed> {
    prop_oneof![
        Just(MotionSpeed::Slow),
        Just(MotionSpeed::Normal),
        Just(MotionSpeed::Fast),
        Just(MotionSpeed::Turbo),
    ]
}

/// Strictly increasing timestamps with arbitrary positive gaps.
fn timestamps_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.1f64..50.0, 1..200).prop_map(|gaps| {
        gaps.iter()
            .scan(0.0, |t, gap| {
                *t += gap;
                Some(*t)
            })
            .collect()
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Convergence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn constant_interval_converges(interval in 2.5f64..50.0, frames in 12usize..150) {
        let mut est = RefreshEstimator::default();
        for i in 0..frames {
            est.on_frame(i as f64 * interval);
        }
        let hz = est.estimate().map(|e| e.hz());
        prop_assert!(hz.is_some(), "no estimate after {} frames", frames);
        let expected = 1000.0 / interval;
        let hz = hz.unwrap_or_default();
        prop_assert!((hz - expected).abs() < 1.0, "hz={} expected={}", hz, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Duplicate timestamps are inert
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn duplicate_timestamp_is_inert(stamps in timestamps_strategy()) {
        let mut est = RefreshEstimator::default();
        for ts in &stamps {
            est.on_frame(*ts);
        }
        let before = (est.estimate(), est.window().len());
        if let Some(last) = stamps.last() {
            est.on_frame(*last);
        }
        prop_assert_eq!((est.estimate(), est.window().len()), before);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Window bound
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn window_never_exceeds_capacity(stamps in timestamps_strategy(), capacity in 1usize..80) {
        let mut est = RefreshEstimator::new(RefreshConfig {
            window_capacity: capacity,
            ..RefreshConfig::default()
        });
        let bound = capacity.max(est.config().min_samples + 1);
        prop_assert_eq!(est.window().capacity(), bound);
        for ts in stamps {
            est.on_frame(ts);
            prop_assert!(est.window().len() <= bound);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Advancing through a session
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn advances_land_on_index_then_finish(patterns in sequence_strategy(), extra in 0usize..3) {
        let n = patterns.len();
        let mut host = RecordingHost::new();
        {
            let mut session = TestSession::new(patterns, &mut host);
            session.start();
            for k in 1..n {
                prop_assert_eq!(session.advance(), SessionState::Active { index: k });
            }
            prop_assert_eq!(session.advance(), SessionState::Idle);
            prop_assert!(!session.fullscreen().engaged);
            for _ in 0..extra {
                prop_assert_eq!(session.advance(), SessionState::Idle);
            }
        }
        prop_assert_eq!(host.requests(), 1);
        prop_assert!(!host.is_fullscreen());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Stop from any index
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn stop_from_any_index_releases(patterns in sequence_strategy(), at in 0usize..8) {
        let steps = at.min(patterns.last_index());
        let mut host = RecordingHost::new();
        let mut session = TestSession::new(patterns, &mut host);
        session.start();
        for _ in 0..steps {
            session.advance();
        }
        prop_assert_eq!(session.index(), Some(steps));
        prop_assert_eq!(session.stop(), SessionState::Idle);
        prop_assert!(!session.fullscreen().engaged);
        drop(session);
        prop_assert!(!host.is_scroll_suppressed());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Motion wrap law
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn motion_follows_wrap_law(width in 0u32..4000, speed in speed_strategy(), ticks in 0u64..3000) {
        let w = f64::from(width);
        let mut motion = MotionRenderer::new(
            MotionConfig::default().with_speed(speed),
            Size::new(w, 480.0),
        );
        for _ in 0..ticks {
            motion.step();
        }
        let span = w + 2.0 * DEFAULT_MARGIN;
        let expected = (ticks as f64 * speed.pixels_per_tick()) % span - DEFAULT_MARGIN;
        prop_assert_eq!(motion.position(), expected);
        prop_assert!(motion.position() < w + DEFAULT_MARGIN);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Flasher stays visible
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dragged_flasher_stays_inside(
        w in 100.0f64..2000.0,
        h in 100.0f64..2000.0,
        moves in prop::collection::vec((-3000.0f64..3000.0, -3000.0f64..3000.0), 1..20),
    ) {
        let mut flasher = PixelRepairFlasher::new(FlasherConfig::default(), Size::new(w, h));
        let start = flasher.region();
        let mut at = Position::new(start.x + 1.0, start.y + 1.0);
        prop_assert!(flasher.pointer_down(at));
        for (x, y) in moves {
            at = Position::new(x, y);
            flasher.pointer_move(at);
            let r = flasher.region();
            prop_assert!(r.x >= 0.0 && r.y >= 0.0);
            prop_assert!(r.right() <= w && r.bottom() <= h, "{:?} outside {}x{}", r, w, h);
        }
        flasher.pointer_up();
        prop_assert!(!flasher.is_dragging());
    }
}
