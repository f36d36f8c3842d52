#![forbid(unsafe_code)]

//! Frame pacing for the terminal event loop.
//!
//! Terminals have no vsync callback, so the loop asks the clock how long it
//! may block on input and then pumps it with the current monotonic time.
//! Frames are delivered at most once per interval; a loop that falls behind
//! skips ahead instead of bursting to catch up.

use std::time::Duration;

use panelcheck_core::frame_clock::{FrameCallback, FrameClock, FrameHandle, ManualFrameClock};

pub const DEFAULT_FPS: u32 = 60;

/// Idle poll interval when nothing is registered.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// A frame this close to due is delivered now rather than after another poll.
const DUE_SLACK_MS: f64 = 0.25;

/// [`FrameClock`] ticked by the terminal event loop at a fixed rate.
#[derive(Debug, Clone)]
pub struct PacedFrameClock {
    inner: ManualFrameClock,
    interval_ms: f64,
    next_due_ms: Option<f64>,
}

impl Default for PacedFrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl PacedFrameClock {
    /// Clock targeting `fps` frames per second (clamped to 1..=1000).
    #[must_use]
    pub fn new(fps: u32) -> Self {
        Self {
            inner: ManualFrameClock::new(),
            interval_ms: 1000.0 / f64::from(fps.clamp(1, 1000)),
            next_due_ms: None,
        }
    }

    #[must_use]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Whether any consumer is registered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.active() > 0
    }

    /// Frames delivered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.inner.frames()
    }

    /// How long the loop may wait for input before the next frame is due.
    #[must_use]
    pub fn poll_timeout(&self, now_ms: f64) -> Duration {
        if !self.is_running() {
            return IDLE_POLL;
        }
        match self.next_due_ms {
            Some(due) if due > now_ms => Duration::from_secs_f64((due - now_ms) / 1000.0),
            _ => Duration::ZERO,
        }
    }

    /// Deliver a frame if one is due at `now_ms`. Returns whether it did.
    pub fn pump(&mut self, now_ms: f64) -> bool {
        if !self.is_running() {
            self.next_due_ms = None;
            return false;
        }
        if let Some(due) = self.next_due_ms
            && now_ms + DUE_SLACK_MS < due
        {
            return false;
        }
        self.inner.tick(now_ms);
        let next = self.next_due_ms.unwrap_or(now_ms) + self.interval_ms;
        self.next_due_ms = Some(if next <= now_ms {
            tracing::trace!(behind_ms = now_ms - next, "frame pacing fell behind");
            now_ms + self.interval_ms
        } else {
            next
        });
        true
    }
}

impl FrameClock for PacedFrameClock {
    fn start(&mut self, callback: FrameCallback) -> FrameHandle {
        self.inner.start(callback)
    }

    fn stop(&mut self, handle: &FrameHandle) {
        self.inner.stop(handle);
        if !self.is_running() {
            self.next_due_ms = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelcheck_core::frame_clock::{FrameConsumer, FrameSample, attach};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Stamps(Vec<f64>);

    impl FrameConsumer for Stamps {
        fn on_frame(&mut self, sample: FrameSample) {
            self.0.push(sample.timestamp_ms);
        }
    }

    #[test]
    fn idle_clock_never_ticks() {
        let mut clock = PacedFrameClock::new(60);
        assert!(!clock.pump(0.0));
        assert_eq!(clock.poll_timeout(0.0), IDLE_POLL);
    }

    #[test]
    fn paces_at_interval() {
        let mut clock = PacedFrameClock::new(100);
        let stamps = Rc::new(RefCell::new(Stamps::default()));
        let handle = attach(&mut clock, &stamps);

        assert!(clock.pump(0.0));
        assert!(!clock.pump(5.0));
        assert_eq!(clock.poll_timeout(5.0), Duration::from_millis(5));
        assert!(clock.pump(10.0));
        assert!(clock.pump(21.0));
        assert_eq!(stamps.borrow().0, vec![0.0, 10.0, 21.0]);

        clock.stop(&handle);
        assert!(!clock.pump(40.0));
    }

    #[test]
    fn falling_behind_skips_instead_of_bursting() {
        let mut clock = PacedFrameClock::new(100);
        let stamps = Rc::new(RefCell::new(Stamps::default()));
        let _handle = attach(&mut clock, &stamps);
        clock.pump(0.0);
        assert!(clock.pump(500.0));
        assert!(!clock.pump(505.0));
        assert!(clock.pump(510.0));
        assert_eq!(clock.frames(), 3);
    }

    #[test]
    fn fps_is_clamped() {
        assert_eq!(PacedFrameClock::new(0).interval_ms(), 1000.0);
        assert_eq!(PacedFrameClock::new(5000).interval_ms(), 1.0);
    }
}
