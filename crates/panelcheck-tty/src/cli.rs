#![forbid(unsafe_code)]

//! Command-line argument parsing for the `panelcheck` binary.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `PANELCHECK_*` prefix; explicit flags win.

use std::env;
use std::process;

use panelcheck_core::flasher::FlashSequence;
use panelcheck_core::motion::{MotionPattern, MotionSpeed};
use panelcheck_core::{ToolConfig, ToolKind};

use crate::clock::DEFAULT_FPS;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
panelcheck - display diagnostics in the terminal

USAGE:
    panelcheck [OPTIONS]

OPTIONS:
    --tool=TOOL            Tool to run (default: dead-pixel), see --list
    --pattern=ID           Start a pattern tool on pattern ID
    --auto-advance-ms=N    Advance patterns every N milliseconds (0 = off)
    --speed=SPEED          Motion speed: slow, normal, fast, turbo
    --motion=SHAPE         Motion shape: ufo, color-blocks, scrolling-text
    --sequence=SEQ         Flash sequence: rgb, full, black-white, or
                           a comma-separated color list (#ff0000,blue)
    --fps=N                Frame rate for continuous tools (default: 60)
    --exit-after-ms=N      Quit after N milliseconds (0 = never)
    --no-mouse             Do not capture the mouse
    --list                 List tools and exit
    --help, -h             Show this help message
    --version, -V          Show version

KEYS:
    Space / Enter / Right  Start or advance
    Esc                    Stop the test
    1-4                    Motion speed
    u / b / t              Motion shape
    r / f / w              Flash sequence
    q / Ctrl+C             Quit

ENVIRONMENT VARIABLES:
    PANELCHECK_TOOL              Override --tool
    PANELCHECK_PATTERN           Override --pattern
    PANELCHECK_SPEED             Override --speed
    PANELCHECK_SEQUENCE          Override --sequence
    PANELCHECK_FPS               Override --fps
    PANELCHECK_AUTO_ADVANCE_MS   Override --auto-advance-ms
    PANELCHECK_EXIT_AFTER_MS     Override --exit-after-ms
    PANELCHECK_LOG               Write logs to this file
    PANELCHECK_LOG_LEVEL         Log filter (default: info)
    PANELCHECK_LOG_FORMAT        'json' for JSON log lines";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    pub tool: ToolKind,
    pub pattern: Option<String>,
    /// Auto-advance interval (0 = disabled).
    pub auto_advance_ms: u64,
    pub speed: MotionSpeed,
    pub motion: MotionPattern,
    pub sequence: FlashSequence,
    pub fps: u32,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    pub mouse: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            tool: ToolKind::DeadPixel,
            pattern: None,
            auto_advance_ms: 0,
            speed: MotionSpeed::default(),
            motion: MotionPattern::default(),
            sequence: FlashSequence::default(),
            fps: DEFAULT_FPS,
            exit_after_ms: 0,
            mouse: true,
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
    List,
}

/// Bad command-line input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    UnknownArgument(String),
}

impl core::fmt::Display for CliError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn parse_value<T: core::str::FromStr>(flag: &'static str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

impl Opts {
    /// Parse process arguments and environment, printing help/version/list
    /// and exiting where asked.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("panelcheck {VERSION}");
                process::exit(0);
            }
            Ok(Command::List) => {
                for kind in ToolKind::ALL {
                    println!("{:<14} {}", kind.slug(), kind.title());
                }
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with environment lookups through `var`.
    ///
    /// Environment variables take precedence over defaults but are
    /// overridden by explicit command-line flags.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] for unknown flags and unparsable values,
    /// whether they come from a flag or an environment variable.
    pub fn parse_from<I, F>(args: I, var: F) -> Result<Command, CliError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = var("PANELCHECK_TOOL") {
            opts.tool = parse_value("PANELCHECK_TOOL", &val)?;
        }
        if let Some(val) = var("PANELCHECK_PATTERN") {
            opts.pattern = Some(val);
        }
        if let Some(val) = var("PANELCHECK_SPEED") {
            opts.speed = parse_value("PANELCHECK_SPEED", &val)?;
        }
        if let Some(val) = var("PANELCHECK_SEQUENCE") {
            opts.sequence = parse_value("PANELCHECK_SEQUENCE", &val)?;
        }
        if let Some(val) = var("PANELCHECK_FPS") {
            opts.fps = parse_value("PANELCHECK_FPS", &val)?;
        }
        if let Some(val) = var("PANELCHECK_AUTO_ADVANCE_MS") {
            opts.auto_advance_ms = parse_value("PANELCHECK_AUTO_ADVANCE_MS", &val)?;
        }
        if let Some(val) = var("PANELCHECK_EXIT_AFTER_MS") {
            opts.exit_after_ms = parse_value("PANELCHECK_EXIT_AFTER_MS", &val)?;
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--list" => return Ok(Command::List),
                "--no-mouse" => opts.mouse = false,
                other => {
                    if let Some(val) = other.strip_prefix("--tool=") {
                        opts.tool = parse_value("--tool", val)?;
                    } else if let Some(val) = other.strip_prefix("--pattern=") {
                        opts.pattern = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--auto-advance-ms=") {
                        opts.auto_advance_ms = parse_value("--auto-advance-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--speed=") {
                        opts.speed = parse_value("--speed", val)?;
                    } else if let Some(val) = other.strip_prefix("--motion=") {
                        opts.motion = parse_value("--motion", val)?;
                    } else if let Some(val) = other.strip_prefix("--sequence=") {
                        opts.sequence = parse_value("--sequence", val)?;
                    } else if let Some(val) = other.strip_prefix("--fps=") {
                        opts.fps = parse_value("--fps", val)?;
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = parse_value("--exit-after-ms", val)?;
                    } else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    }
                }
            }
        }

        Ok(Command::Run(opts))
    }

    /// Engine configuration for the selected tool.
    #[must_use]
    pub fn tool_config(&self) -> ToolConfig {
        let mut config = ToolConfig::default()
            .with_motion_speed(self.speed)
            .with_motion_pattern(self.motion)
            .with_flash_sequence(self.sequence.clone());
        if let Some(pattern) = &self.pattern {
            config = config.with_initial_pattern(pattern.clone());
        }
        if self.auto_advance_ms > 0 {
            config = config.with_auto_advance_ms(self.auto_advance_ms);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Command, CliError> {
        Opts::parse_from(args.iter().map(|s| s.to_string()), |_| None)
    }

    fn run(args: &[&str]) -> Opts {
        match parse(args) {
            Ok(Command::Run(opts)) => opts,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.tool, ToolKind::DeadPixel);
        assert_eq!(opts.fps, 60);
        assert!(opts.mouse);
        assert_eq!(opts.exit_after_ms, 0);
    }

    #[test]
    fn flags_are_parsed() {
        let opts = run(&[
            "--tool=response-time",
            "--speed=turbo",
            "--motion=text",
            "--fps=120",
            "--no-mouse",
        ]);
        assert_eq!(opts.tool, ToolKind::ResponseTime);
        assert_eq!(opts.speed, MotionSpeed::Turbo);
        assert_eq!(opts.motion, MotionPattern::ScrollingText);
        assert_eq!(opts.fps, 120);
        assert!(!opts.mouse);
    }

    #[test]
    fn info_commands_short_circuit() {
        assert_eq!(parse(&["--help", "--bogus"]), Ok(Command::Help));
        assert_eq!(parse(&["-V"]), Ok(Command::Version));
        assert_eq!(parse(&["--list"]), Ok(Command::List));
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(
            parse(&["--tool=vacuum"]),
            Err(CliError::InvalidValue {
                flag: "--tool",
                value: "vacuum".into()
            })
        );
        assert_eq!(
            parse(&["--frobnicate"]),
            Err(CliError::UnknownArgument("--frobnicate".into()))
        );
        assert_eq!(
            CliError::UnknownArgument("-x".into()).to_string(),
            "Unknown argument: -x"
        );
    }

    #[test]
    fn env_is_overridden_by_flags() {
        let env = |key: &str| match key {
            "PANELCHECK_TOOL" => Some("color".to_string()),
            "PANELCHECK_FPS" => Some("30".to_string()),
            _ => None,
        };
        let cmd = Opts::parse_from(vec!["--fps=90".to_string()], env);
        let Ok(Command::Run(opts)) = cmd else {
            panic!("expected run");
        };
        assert_eq!(opts.tool, ToolKind::Color);
        assert_eq!(opts.fps, 90);
    }

    #[test]
    fn tool_config_carries_options() {
        let opts = run(&["--pattern=white", "--auto-advance-ms=1500", "--sequence=rgb"]);
        let config = opts.tool_config();
        assert_eq!(config.initial_pattern.as_deref(), Some("white"));
        assert_eq!(config.auto_advance_ms, Some(1500));
        assert_eq!(config.flasher.sequence, FlashSequence::Rgb);
    }

    #[test]
    fn help_text_lists_every_flag() {
        for flag in ["--tool", "--pattern", "--speed", "--sequence", "--fps", "--exit-after-ms"] {
            assert!(HELP_TEXT.contains(flag), "{flag}");
        }
    }
}
