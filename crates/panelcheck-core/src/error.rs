#![forbid(unsafe_code)]

//! Error types.
//!
//! The engine itself never fails an operation: invalid transitions are
//! no-ops and timing anomalies are discarded. These types describe what a
//! *host* can report back (capability denial, a lost drawing surface) and
//! what configuration parsing can reject.

/// Failure reported by a [`DisplayHost`](crate::fullscreen::DisplayHost).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host refused immersive mode (user gesture missing, policy, not a TTY).
    Denied(String),
    /// The host has no such capability at all.
    Unsupported(&'static str),
    /// The platform call itself failed.
    Platform(String),
}

impl core::fmt::Display for HostError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Denied(reason) => write!(f, "immersive mode denied: {reason}"),
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
            Self::Platform(msg) => write!(f, "platform error: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

impl From<std::io::Error> for HostError {
    fn from(err: std::io::Error) -> Self {
        Self::Platform(err.to_string())
    }
}

/// Failure reported by a [`Surface`](crate::scene::Surface).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// No drawing surface is attached right now.
    Unavailable,
    /// The backend rejected a draw call.
    Backend(String),
}

impl core::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => f.write_str("drawing surface unavailable"),
            Self::Backend(msg) => write!(f, "surface backend error: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

impl From<std::io::Error> for SurfaceError {
    fn from(err: std::io::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// A name that does not match any known selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: &'static str,
    input: String,
}

impl ParseError {
    /// Create a parse error for `input` while parsing a `kind` (e.g. `"tool"`).
    #[must_use]
    pub fn new(kind: &'static str, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }

    /// What was being parsed.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.input)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_cause() {
        assert_eq!(
            HostError::Denied("no user gesture".into()).to_string(),
            "immersive mode denied: no user gesture"
        );
        assert_eq!(
            SurfaceError::Unavailable.to_string(),
            "drawing surface unavailable"
        );
        assert_eq!(
            ParseError::new("tool", "dead").to_string(),
            "unknown tool: \"dead\""
        );
    }

    #[test]
    fn io_errors_convert_to_platform() {
        let err: HostError = std::io::Error::other("boom").into();
        assert!(matches!(err, HostError::Platform(ref m) if m == "boom"));
    }
}
