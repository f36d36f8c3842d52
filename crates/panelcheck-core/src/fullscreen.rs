#![forbid(unsafe_code)]

//! Immersive display lifecycle.
//!
//! [`FullscreenController`] pairs two host side effects, immersive mode and
//! scroll suppression, and guarantees both are released.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Denial is not fatal** - if the host refuses immersive mode,
//!    [`FullscreenState::engaged`] stays `false` and the caller keeps running
//!    in the normal layout.
//! 2. **Paired effects** - scroll suppression is only requested once
//!    immersive mode was granted.
//! 3. **Unconditional exit** - [`FullscreenController::exit`] asks the host to
//!    leave immersive mode and restore scrolling even if neither was granted.
//! 4. **Drop releases** - a controller that entered and was never exited
//!    exits when dropped, covering abrupt teardown.
//! 5. **Host has the last word** - hosts that grant asynchronously report a
//!    late refusal or an external exit through [`FullscreenController::revoke`],
//!    which drops `engaged` and restores scrolling.
//!
//! Release happens in reverse order: scrolling first, then immersive mode.

use crate::error::HostError;

/// Host capabilities needed to take over the display.
pub trait DisplayHost {
    /// Ask for immersive (fullscreen) mode.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Denied`] when the host refuses; the controller
    /// degrades instead of failing.
    fn request_fullscreen(&mut self) -> Result<(), HostError>;

    /// Leave immersive mode. Must tolerate not being in it.
    ///
    /// # Errors
    ///
    /// Platform failures are logged by the controller and otherwise ignored.
    fn exit_fullscreen(&mut self) -> Result<(), HostError>;

    /// Suppress or restore background scrolling.
    ///
    /// # Errors
    ///
    /// Platform failures are logged by the controller and otherwise ignored.
    fn set_scroll_suppressed(&mut self, suppressed: bool) -> Result<(), HostError>;
}

impl<H: DisplayHost + ?Sized> DisplayHost for &mut H {
    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        (**self).request_fullscreen()
    }

    fn exit_fullscreen(&mut self) -> Result<(), HostError> {
        (**self).exit_fullscreen()
    }

    fn set_scroll_suppressed(&mut self, suppressed: bool) -> Result<(), HostError> {
        (**self).set_scroll_suppressed(suppressed)
    }
}

impl<H: DisplayHost + ?Sized> DisplayHost for Box<H> {
    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        (**self).request_fullscreen()
    }

    fn exit_fullscreen(&mut self) -> Result<(), HostError> {
        (**self).exit_fullscreen()
    }

    fn set_scroll_suppressed(&mut self, suppressed: bool) -> Result<(), HostError> {
        (**self).set_scroll_suppressed(suppressed)
    }
}

/// Whether immersive mode is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FullscreenState {
    pub engaged: bool,
}

/// Scoped owner of the host's immersive mode.
#[derive(Debug)]
pub struct FullscreenController<H: DisplayHost> {
    host: H,
    state: FullscreenState,
    /// `enter` ran since the last `exit`, whether or not it was granted.
    acquired: bool,
}

impl<H: DisplayHost> FullscreenController<H> {
    #[must_use]
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: FullscreenState::default(),
            acquired: false,
        }
    }

    /// Request immersive mode and, if granted, suppress scrolling.
    ///
    /// Calling `enter` while already engaged does nothing.
    pub fn enter(&mut self) -> FullscreenState {
        if self.state.engaged {
            return self.state;
        }
        self.acquired = true;

        match self.host.request_fullscreen() {
            Ok(()) => {
                self.state.engaged = true;
                crate::info!("immersive mode engaged");
                if let Err(err) = self.host.set_scroll_suppressed(true) {
                    crate::debug!(error = %err, "scroll suppression failed");
                }
            }
            Err(err) => {
                crate::warn!(error = %err, "immersive mode unavailable, using normal layout");
            }
        }
        self.state
    }

    /// Restore scrolling and leave immersive mode, unconditionally.
    pub fn exit(&mut self) -> FullscreenState {
        if let Err(err) = self.host.set_scroll_suppressed(false) {
            crate::debug!(error = %err, "scroll restore failed");
        }
        if let Err(err) = self.host.exit_fullscreen() {
            crate::debug!(error = %err, "immersive exit failed");
        }
        if self.state.engaged {
            crate::info!("immersive mode released");
        }
        self.state.engaged = false;
        self.acquired = false;
        self.state
    }

    /// The host withdrew immersive mode without being asked.
    ///
    /// Restores scrolling and clears `engaged`. Returns whether anything
    /// changed. A later [`exit`](Self::exit) still runs.
    pub fn revoke(&mut self) -> bool {
        if !self.state.engaged {
            return false;
        }
        if let Err(err) = self.host.set_scroll_suppressed(false) {
            crate::debug!(error = %err, "scroll restore failed");
        }
        self.state.engaged = false;
        crate::warn!("immersive mode withdrawn by host");
        true
    }

    #[must_use]
    pub fn state(&self) -> FullscreenState {
        self.state
    }

    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.state.engaged
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: DisplayHost> Drop for FullscreenController<H> {
    fn drop(&mut self) {
        if self.acquired || self.state.engaged {
            self.exit();
        }
    }
}

/// One call a [`RecordingHost`] received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    RequestFullscreen,
    ExitFullscreen,
    SuppressScroll(bool),
}

/// In-memory host that records calls; optionally refuses immersive mode.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    deny: bool,
    fullscreen: bool,
    scroll_suppressed: bool,
    calls: Vec<HostCall>,
}

impl RecordingHost {
    /// Host that grants immersive mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that refuses immersive mode (e.g. a mobile browser).
    #[must_use]
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[must_use]
    pub fn is_scroll_suppressed(&self) -> bool {
        self.scroll_suppressed
    }

    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Leave immersive mode the way a user does through host UI; no call is
    /// recorded.
    pub fn leave_externally(&mut self) {
        self.fullscreen = false;
    }

    /// Number of `request_fullscreen` calls.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::RequestFullscreen))
            .count()
    }
}

impl DisplayHost for RecordingHost {
    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        self.calls.push(HostCall::RequestFullscreen);
        if self.deny {
            return Err(HostError::Denied("refused by host".into()));
        }
        self.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<(), HostError> {
        self.calls.push(HostCall::ExitFullscreen);
        self.fullscreen = false;
        Ok(())
    }

    fn set_scroll_suppressed(&mut self, suppressed: bool) -> Result<(), HostError> {
        self.calls.push(HostCall::SuppressScroll(suppressed));
        self.scroll_suppressed = suppressed;
        Ok(())
    }
}
