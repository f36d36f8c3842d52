#![forbid(unsafe_code)]

//! Stepped test-pattern session.
//!
//! ```text
//! Idle --start--> Active(0) --advance--> Active(1) ... Active(N-1) --advance--> Idle
//!                    |                                   |
//!                    +------------- stop / cancel -------+-----------------> Idle
//! ```
//!
//! Entering `Active` takes the display through a [`FullscreenController`];
//! every way back to `Idle` (stop, cancel, advancing past the end, drop)
//! releases it. Operations that make no sense in the current state are
//! no-ops.

use std::time::Duration;

use crate::fullscreen::{DisplayHost, FullscreenController, FullscreenState};
use crate::geometry::Size;
use crate::pattern::{PatternSequence, TestPattern};
use crate::scene::Scene;

/// Where a [`TestSession`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active {
        index: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct AutoAdvance {
    interval_ms: f64,
    /// Time of the last transition, once a tick has been seen.
    since_ms: Option<f64>,
}

/// One tool instance stepping through an ordered list of patterns.
#[derive(Debug)]
pub struct TestSession<H: DisplayHost> {
    patterns: PatternSequence,
    state: SessionState,
    start_index: usize,
    auto_advance: Option<AutoAdvance>,
    now_ms: Option<f64>,
    fullscreen: FullscreenController<H>,
}

impl<H: DisplayHost> TestSession<H> {
    #[must_use]
    pub fn new(patterns: PatternSequence, host: H) -> Self {
        Self {
            patterns,
            state: SessionState::Idle,
            start_index: 0,
            auto_advance: None,
            now_ms: None,
            fullscreen: FullscreenController::new(host),
        }
    }

    /// Begin at `index` instead of the first pattern (clamped to the list).
    #[must_use]
    pub fn with_start_index(mut self, index: usize) -> Self {
        self.start_index = index.min(self.patterns.last_index());
        self
    }

    /// Begin at the pattern with id `id`; unknown ids keep the current start.
    #[must_use]
    pub fn with_start_pattern(mut self, id: &str) -> Self {
        if let Some(index) = self.patterns.position(id) {
            self.start_index = index;
        } else {
            crate::debug!(pattern = id, "unknown start pattern ignored");
        }
        self
    }

    /// Advance automatically every `interval` (driven by [`Self::tick`]).
    #[must_use]
    pub fn with_auto_advance(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.auto_advance = Some(AutoAdvance {
                interval_ms: interval.as_secs_f64() * 1000.0,
                since_ms: None,
            });
        }
        self
    }

    /// Enter fullscreen and show the start pattern.
    ///
    /// Returns `false` (and changes nothing) if the session is already active.
    pub fn start(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.fullscreen.enter();
        self.state = SessionState::Active {
            index: self.start_index,
        };
        self.restart_timer();
        crate::info!(
            index = self.start_index,
            total = self.patterns.len(),
            engaged = self.fullscreen.is_engaged(),
            "pattern session started"
        );
        true
    }

    /// Show the next pattern; past the last one this is [`Self::stop`].
    pub fn advance(&mut self) -> SessionState {
        self.step();
        self.restart_timer();
        self.state
    }

    /// Return to idle and release the display. No-op when idle.
    pub fn stop(&mut self) -> SessionState {
        if self.is_active() {
            self.state = SessionState::Idle;
            self.fullscreen.exit();
            crate::info!("pattern session stopped");
        }
        self.state
    }

    /// The host dropped immersive mode; keep the current pattern on screen.
    pub fn revoke_fullscreen(&mut self) -> bool {
        self.fullscreen.revoke()
    }

    /// Cancellation key: identical to [`Self::stop`].
    pub fn cancel(&mut self) -> SessionState {
        self.stop()
    }

    /// Drive the auto-advance timer with the current monotonic time.
    pub fn tick(&mut self, now_ms: f64) -> SessionState {
        self.now_ms = Some(now_ms);
        let Some(mut auto) = self.auto_advance else {
            return self.state;
        };
        if !self.is_active() {
            return self.state;
        }
        let mut since = auto.since_ms.unwrap_or(now_ms);
        while self.is_active() && now_ms - since >= auto.interval_ms {
            since += auto.interval_ms;
            self.step();
        }
        auto.since_ms = Some(since);
        self.auto_advance = Some(auto);
        self.state
    }

    fn step(&mut self) {
        let SessionState::Active { index } = self.state else {
            crate::trace!("advance while idle ignored");
            return;
        };
        if index < self.patterns.last_index() {
            self.state = SessionState::Active { index: index + 1 };
            crate::debug!(index = index + 1, "pattern advanced");
        } else {
            self.stop();
        }
    }

    fn restart_timer(&mut self) {
        if let Some(auto) = self.auto_advance.as_mut() {
            auto.since_ms = self.now_ms;
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    /// Index of the pattern on screen.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self.state {
            SessionState::Active { index } => Some(index),
            SessionState::Idle => None,
        }
    }

    /// Pattern on screen.
    #[must_use]
    pub fn current(&self) -> Option<&TestPattern> {
        self.index().and_then(|i| self.patterns.get(i))
    }

    #[must_use]
    pub fn patterns(&self) -> &PatternSequence {
        &self.patterns
    }

    #[must_use]
    pub fn fullscreen(&self) -> FullscreenState {
        self.fullscreen.state()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        self.fullscreen.host()
    }

    /// What to draw now; `None` when idle.
    #[must_use]
    pub fn scene(&self, size: Size) -> Option<Scene> {
        self.current().map(|p| p.scene(size))
    }
}

impl<H: DisplayHost> Drop for TestSession<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
