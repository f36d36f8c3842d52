#![forbid(unsafe_code)]

//! The terminal event loop.
//!
//! One iteration: advance timers and the frame clock, redraw if anything
//! changed, then wait for input no longer than the next frame is due.
//! While a test runs the scene fills the alternate screen; when idle a
//! single status line is shown in the normal screen.

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use panelcheck_core::input::ToolEvent;
use panelcheck_core::scene::Surface;
use panelcheck_core::tool::ToolReadout;
use panelcheck_core::{Tool, ToolKind};

use crate::cli::Opts;
use crate::clock::PacedFrameClock;
use crate::host::{TerminalGuard, TerminalHost};
use crate::input::{Action, map_event};
use crate::surface::TerminalSurface;

/// Upper bound on input waits so auto-advance and exit timers stay responsive.
const MAX_POLL: Duration = Duration::from_millis(100);

/// Whether the loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Tool plus terminal surface, independent of the real terminal.
pub struct App<W: Write = Stdout> {
    tool: Tool<TerminalHost<W>, PacedFrameClock>,
    surface: TerminalSurface<W>,
    exit_after_ms: u64,
    last_readout: Option<ToolReadout>,
    dirty: bool,
}

impl<W: Write> App<W> {
    pub fn new(opts: &Opts, host: TerminalHost<W>, surface: TerminalSurface<W>) -> Self {
        let mut tool = Tool::mount(opts.tool, &opts.tool_config(), host, PacedFrameClock::new(opts.fps));
        tool.handle(ToolEvent::Resize(surface.size()), 0.0);
        Self {
            tool,
            surface,
            exit_after_ms: opts.exit_after_ms,
            last_readout: None,
            dirty: true,
        }
    }

    #[must_use]
    pub fn tool(&self) -> &Tool<TerminalHost<W>, PacedFrameClock> {
        &self.tool
    }

    #[must_use]
    pub fn surface(&self) -> &TerminalSurface<W> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut TerminalSurface<W> {
        &mut self.surface
    }

    /// Apply one user action.
    pub fn dispatch(&mut self, action: Action, now_ms: f64) -> Flow {
        match action {
            Action::Quit => {
                tracing::info!("quit requested");
                return Flow::Quit;
            }
            Action::Start => {
                self.tool.start();
            }
            Action::Resize(cols, rows) => {
                self.surface.resize(cols, rows);
                self.tool.handle(ToolEvent::Resize(self.surface.size()), now_ms);
            }
            Action::Tool(ToolEvent::Advance) if !self.tool.is_active() => {
                self.tool.start();
            }
            Action::Tool(event) => {
                if !self.tool.handle(event, now_ms) {
                    return Flow::Continue;
                }
            }
        }
        self.dirty = true;
        Flow::Continue
    }

    /// Run timers and the frame clock up to `now_ms`.
    pub fn update(&mut self, now_ms: f64) -> Flow {
        if self.exit_after_ms > 0 && now_ms >= self.exit_after_ms as f64 {
            tracing::info!(after_ms = self.exit_after_ms, "exit timer elapsed");
            return Flow::Quit;
        }
        self.tool.tick(now_ms);
        if self.tool.clock_mut().is_some_and(|clock| clock.pump(now_ms)) {
            self.dirty = true;
        }
        let readout = self.tool.readout();
        if self.last_readout.as_ref() != Some(&readout) {
            self.last_readout = Some(readout);
            self.dirty = true;
        }
        Flow::Continue
    }

    /// Redraw if something changed since the last draw.
    ///
    /// # Errors
    ///
    /// Only inline status output errors are returned; a failed scene
    /// presentation is logged and retried on the next frame.
    pub fn draw(&mut self) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;
        let readout = self.tool.readout();

        if !readout.active {
            return self
                .surface
                .present_line(&format!("{readout}  space: start  q: quit"));
        }

        self.surface
            .set_status(Some(format!("{readout}  {}", hints(readout.tool))));
        if let Err(err) = self.tool.render(&mut self.surface) {
            tracing::warn!(error = %err, "frame skipped");
            self.dirty = true;
        }
        Ok(())
    }

    /// How long to block on input at `now_ms`.
    #[must_use]
    pub fn poll_timeout(&self, now_ms: f64) -> Duration {
        self.tool
            .clock()
            .map_or(MAX_POLL, |clock| clock.poll_timeout(now_ms))
            .min(MAX_POLL)
    }
}

fn hints(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::RefreshRate => "esc: stop",
        ToolKind::ResponseTime => "1-4: speed  u/b/t: shape  esc: stop",
        ToolKind::PixelRepair => "drag: move  r/f/w: colors  esc: stop",
        _ => "space: next  esc: stop",
    }
}

/// Run `opts.tool` on the real terminal until the user quits.
///
/// # Errors
///
/// Fails when stdout is not a terminal or terminal I/O fails.
pub fn run(opts: &Opts) -> io::Result<()> {
    let guard = TerminalGuard::new()?;
    let (cols, rows) = guard.size()?;
    let mut app = App::new(
        opts,
        TerminalHost::stdout(opts.mouse),
        TerminalSurface::stdout(cols, rows),
    );
    tracing::info!(tool = opts.tool.slug(), cols, rows, "panelcheck started");

    let epoch = Instant::now();
    let now = || epoch.elapsed().as_secs_f64() * 1000.0;
    app.dispatch(Action::Start, now());

    loop {
        let now_ms = now();
        if app.update(now_ms) == Flow::Quit {
            break;
        }
        app.draw()?;
        if crossterm::event::poll(app.poll_timeout(now_ms))? {
            let event = crossterm::event::read()?;
            if let Some(action) = map_event(&event, opts.tool)
                && app.dispatch(action, now()) == Flow::Quit
            {
                break;
            }
        }
    }

    // Release the alternate screen before raw mode goes.
    drop(app);
    drop(guard);
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn app(tool: ToolKind) -> App<Vec<u8>> {
        let opts = Opts {
            tool,
            ..Opts::default()
        };
        App::new(
            &opts,
            TerminalHost::new(Vec::new(), true, true),
            TerminalSurface::new(Vec::new(), 40, 12),
        )
    }

    #[test]
    fn advance_starts_an_idle_tool() {
        let mut app = app(ToolKind::BlackWhite);
        assert!(!app.tool().is_active());
        app.dispatch(Action::Tool(ToolEvent::Advance), 0.0);
        assert!(app.tool().is_active());
        assert!(app.tool().host().is_alternate_screen());
    }

    #[test]
    fn walking_off_the_end_leaves_alternate_screen() {
        let mut app = app(ToolKind::BlackWhite);
        app.dispatch(Action::Start, 0.0);
        app.dispatch(Action::Tool(ToolEvent::Advance), 1.0);
        app.dispatch(Action::Tool(ToolEvent::Advance), 2.0);
        assert!(!app.tool().is_active());
        assert!(!app.tool().host().is_alternate_screen());
    }

    #[test]
    fn quit_and_exit_timer() {
        let mut app = app(ToolKind::Color);
        assert_eq!(app.dispatch(Action::Quit, 0.0), Flow::Quit);

        let opts = Opts {
            exit_after_ms: 500,
            ..Opts::default()
        };
        let mut app = App::new(
            &opts,
            TerminalHost::new(Vec::new(), true, true),
            TerminalSurface::new(Vec::new(), 10, 4),
        );
        assert_eq!(app.update(499.0), Flow::Continue);
        assert_eq!(app.update(500.0), Flow::Quit);
    }

    #[test]
    fn continuous_tool_redraws_on_frames() {
        let mut app = app(ToolKind::ResponseTime);
        app.dispatch(Action::Start, 0.0);
        app.update(0.0);
        app.draw().ok();
        let after_first = app.surface().writer().len();
        assert!(after_first > 0);

        app.update(1.0);
        app.draw().ok();
        assert_eq!(app.surface().writer().len(), after_first);

        app.update(20.0);
        app.draw().ok();
        assert!(app.surface().writer().len() > after_first);
    }

    #[test]
    fn idle_draws_a_status_line() {
        let mut app = app(ToolKind::Contrast);
        app.update(0.0);
        app.draw().ok();
        let out = String::from_utf8_lossy(app.surface().writer()).into_owned();
        assert!(out.contains("contrast (idle)"), "{out:?}");
    }

    #[test]
    fn resize_reaches_the_tool() {
        let mut app = app(ToolKind::PixelRepair);
        app.dispatch(Action::Resize(100, 50), 0.0);
        assert_eq!(app.surface().cells(), (100, 50));
        assert_eq!(app.tool().viewport(), app.surface().size());
    }

    #[test]
    fn poll_timeout_is_bounded() {
        let app = app(ToolKind::DeadPixel);
        assert_eq!(app.poll_timeout(0.0), MAX_POLL);
    }
}
