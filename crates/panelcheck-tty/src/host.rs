#![forbid(unsafe_code)]

//! Terminal lifecycle guards.
//!
//! Two layers, each restoring what it changed:
//!
//! - [`TerminalGuard`] owns raw mode for the whole run, installs a panic
//!   hook and (on unix) SIGINT/SIGTERM handling that restore the terminal
//!   before the process goes away.
//! - [`TerminalHost`] is the engine's [`DisplayHost`]: immersive mode is the
//!   alternate screen plus a hidden cursor, and scroll suppression is mouse
//!   capture (wheel events go to the app instead of scrolling the terminal).
//!
//! # Cleanup Order
//!
//! 1. Disable mouse capture (if enabled)
//! 2. Show cursor
//! 3. Leave alternate screen (if entered)
//! 4. Exit raw mode (guard drop, always last)
//! 5. Flush

use std::io::{self, IsTerminal, Stdout, Write};
use std::sync::OnceLock;

use panelcheck_core::HostError;
use panelcheck_core::fullscreen::DisplayHost;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Raw mode for the lifetime of the app.
#[derive(Debug)]
pub struct TerminalGuard {
    raw_mode: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalGuard {
    /// Enter raw mode.
    ///
    /// # Errors
    ///
    /// Fails when stdout is not an interactive terminal or raw mode cannot
    /// be enabled.
    pub fn new() -> io::Result<Self> {
        if !io::stdout().is_terminal() {
            return Err(io::Error::other("panelcheck needs an interactive terminal"));
        }
        install_panic_hook();
        crossterm::terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");
        Ok(Self {
            raw_mode: true,
            #[cfg(unix)]
            signal_guard: Some(SignalGuard::new()?),
        })
    }

    /// Current terminal size in cells (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();
        if self.raw_mode {
            let _ = crossterm::terminal::disable_raw_mode();
            self.raw_mode = false;
            tracing::info!("terminal raw mode disabled");
        }
        let _ = io::stdout().flush();
    }
}

/// [`DisplayHost`] over a terminal writer.
///
/// Generic over the writer so the emitted control sequences can be checked
/// without a terminal.
#[derive(Debug)]
pub struct TerminalHost<W: Write = Stdout> {
    writer: W,
    interactive: bool,
    mouse_capture: bool,
    alternate_screen: bool,
    mouse_enabled: bool,
}

impl TerminalHost<Stdout> {
    /// Host on stdout. Immersive mode is denied when stdout is redirected.
    #[must_use]
    pub fn stdout(mouse_capture: bool) -> Self {
        let interactive = io::stdout().is_terminal();
        Self::new(io::stdout(), interactive, mouse_capture)
    }
}

impl<W: Write> TerminalHost<W> {
    /// `mouse_capture: false` turns scroll suppression into a no-op.
    pub fn new(writer: W, interactive: bool, mouse_capture: bool) -> Self {
        Self {
            writer,
            interactive,
            mouse_capture,
            alternate_screen: false,
            mouse_enabled: false,
        }
    }

    #[must_use]
    pub fn is_alternate_screen(&self) -> bool {
        self.alternate_screen
    }

    #[must_use]
    pub fn is_mouse_enabled(&self) -> bool {
        self.mouse_enabled
    }

    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    fn cleanup(&mut self) {
        if self.mouse_enabled {
            let _ = crossterm::execute!(self.writer, crossterm::event::DisableMouseCapture);
            self.mouse_enabled = false;
            tracing::info!("mouse capture disabled");
        }
        if self.alternate_screen {
            let _ = crossterm::execute!(self.writer, crossterm::cursor::Show);
            let _ = crossterm::execute!(self.writer, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen = false;
            tracing::info!("alternate screen disabled");
        }
        let _ = self.writer.flush();
    }
}

impl<W: Write> DisplayHost for TerminalHost<W> {
    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        if !self.interactive {
            return Err(HostError::Denied("stdout is not a terminal".into()));
        }
        if self.alternate_screen {
            return Ok(());
        }
        crossterm::execute!(
            self.writer,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide,
            crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
        )?;
        self.alternate_screen = true;
        tracing::info!("alternate screen enabled");
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<(), HostError> {
        if self.alternate_screen {
            crossterm::execute!(
                self.writer,
                crossterm::cursor::Show,
                crossterm::terminal::LeaveAlternateScreen
            )?;
            self.alternate_screen = false;
            tracing::info!("alternate screen disabled");
        }
        Ok(())
    }

    fn set_scroll_suppressed(&mut self, suppressed: bool) -> Result<(), HostError> {
        if !self.mouse_capture || suppressed == self.mouse_enabled {
            return Ok(());
        }
        if suppressed {
            crossterm::execute!(self.writer, crossterm::event::EnableMouseCapture)?;
        } else {
            crossterm::execute!(self.writer, crossterm::event::DisableMouseCapture)?;
        }
        self.mouse_enabled = suppressed;
        tracing::info!(enabled = suppressed, "mouse capture toggled");
        Ok(())
    }
}

impl<W: Write> Drop for TerminalHost<W> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::warn!(signal, "termination signal received, cleaning up");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
