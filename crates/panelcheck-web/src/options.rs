#![forbid(unsafe_code)]

//! JS-facing option and readout encoding.
//!
//! Everything here is plain Rust so it can be unit tested on native targets;
//! the `wasm-bindgen` layer only moves strings across the boundary.

use std::str::FromStr;

use panelcheck_core::flasher::FlashSequence;
use panelcheck_core::motion::{MotionPattern, MotionSpeed};
use panelcheck_core::refresh::RefreshConfig;
use panelcheck_core::tool::{ToolConfig, ToolKind, ToolReadout};
use panelcheck_core::{Rgb, Size};
use serde::Deserialize;

/// Web host error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebError {
    /// `tool` did not name a known tool.
    UnknownTool(String),
    /// `optionsJson` was malformed or held an invalid value.
    InvalidOptions(String),
    /// A browser API this host needs is missing.
    Unsupported(&'static str),
    /// A DOM call threw.
    Js(String),
}

impl core::fmt::Display for WebError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownTool(name) => write!(f, "unknown tool: {name:?}"),
            Self::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
            Self::Js(msg) => write!(f, "javascript error: {msg}"),
        }
    }
}

impl std::error::Error for WebError {}

/// Mount options as passed from JavaScript (camelCase, all optional).
///
/// ```json
/// { "pattern": "white", "autoAdvanceMs": 3000, "speed": "fast",
///   "motion": "color-blocks", "sequence": "#ff0000,#000000" }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct WebOptions {
    pub pattern: Option<String>,
    pub auto_advance_ms: Option<u64>,
    pub speed: Option<MotionSpeed>,
    pub motion: Option<MotionPattern>,
    /// Same syntax as the terminal `--sequence` flag.
    pub sequence: Option<String>,
    pub flash_period_ms: Option<f64>,
    /// Side of the square flasher region, in CSS pixels.
    pub flash_size: Option<f64>,
    pub refresh: Option<RefreshConfig>,
}

impl WebOptions {
    /// Parse `optionsJson`. `None`, empty and whitespace-only input mean defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self, WebError> {
        match json.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => {
                serde_json::from_str(text).map_err(|err| WebError::InvalidOptions(err.to_string()))
            }
        }
    }

    /// Lower into the engine configuration.
    pub fn tool_config(&self) -> Result<ToolConfig, WebError> {
        let mut config = ToolConfig::default();
        if let Some(id) = &self.pattern {
            config = config.with_initial_pattern(id.clone());
        }
        if let Some(ms) = self.auto_advance_ms
            && ms > 0
        {
            config = config.with_auto_advance_ms(ms);
        }
        if let Some(speed) = self.speed {
            config = config.with_motion_speed(speed);
        }
        if let Some(pattern) = self.motion {
            config = config.with_motion_pattern(pattern);
        }
        if let Some(sequence) = &self.sequence {
            let sequence = FlashSequence::from_str(sequence)
                .map_err(|err| WebError::InvalidOptions(err.to_string()))?;
            config = config.with_flash_sequence(sequence);
        }
        if let Some(period) = self.flash_period_ms {
            config.flasher = config.flasher.with_period_ms(period);
        }
        if let Some(side) = self.flash_size
            && side.is_finite()
            && side > 0.0
        {
            config.flasher = config.flasher.with_region(Size::new(side, side));
        }
        if let Some(refresh) = self.refresh {
            config = config.with_refresh(refresh);
        }
        Ok(config)
    }
}

/// Resolve the `tool` constructor argument.
pub fn parse_tool(name: &str) -> Result<ToolKind, WebError> {
    ToolKind::from_str(name).map_err(|_| WebError::UnknownTool(name.to_owned()))
}

/// Tool kind plus engine configuration for a `PanelCheckWeb` mount.
pub fn mount_config(tool: &str, options_json: Option<&str>) -> Result<(ToolKind, ToolConfig), WebError> {
    let kind = parse_tool(tool)?;
    let config = WebOptions::from_json(options_json)?.tool_config()?;
    Ok((kind, config))
}

/// Serialize a readout for `readout()`.
pub fn readout_json(readout: &ToolReadout) -> Result<String, WebError> {
    serde_json::to_string(readout).map_err(|err| WebError::Js(err.to_string()))
}

/// CSS color string for canvas fill styles.
#[must_use]
pub fn css_color(color: Rgb) -> String {
    color.to_hex()
}

/// Canvas font shorthand for a text run `size` pixels tall.
#[must_use]
pub fn css_font(size: f64) -> String {
    format!("{}px monospace", size.max(1.0).round())
}
