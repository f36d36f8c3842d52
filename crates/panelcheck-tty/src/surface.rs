#![forbid(unsafe_code)]

//! Half-block rendering of scenes.
//!
//! Each terminal cell shows two stacked pixels: the foreground color paints
//! the upper half (`▀`) and the background color the lower half. Scenes are
//! laid out in a virtual pixel space of [`CELL_WIDTH`] x [`CELL_HEIGHT`] per
//! cell so shapes keep sensible proportions whatever the terminal size.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{MoveTo, MoveToColumn};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use panelcheck_core::raster::Framebuffer;
use panelcheck_core::scene::{Scene, Surface};
use panelcheck_core::{Position, Rgb, Size, SurfaceError};

/// Virtual pixels per cell, horizontally.
pub const CELL_WIDTH: f64 = 8.0;
/// Virtual pixels per cell, vertically.
pub const CELL_HEIGHT: f64 = 16.0;

const UPPER_HALF: char = '\u{2580}';
const STATUS_FG: Rgb = Rgb::BLACK;
const STATUS_BG: Rgb = Rgb::new(200, 200, 200);

fn color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Scene-space point at the center of cell `(col, row)`.
#[must_use]
pub fn cell_center(col: u16, row: u16) -> Position {
    Position::new(
        (f64::from(col) + 0.5) * CELL_WIDTH,
        (f64::from(row) + 0.5) * CELL_HEIGHT,
    )
}

/// [`Surface`] drawing into a terminal-like writer.
#[derive(Debug)]
pub struct TerminalSurface<W: Write = Stdout> {
    writer: W,
    cols: u16,
    rows: u16,
    framebuffer: Framebuffer,
    status: Option<String>,
}

impl TerminalSurface<Stdout> {
    #[must_use]
    pub fn stdout(cols: u16, rows: u16) -> Self {
        Self::new(io::stdout(), cols, rows)
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(writer: W, cols: u16, rows: u16) -> Self {
        Self {
            writer,
            cols,
            rows,
            framebuffer: Framebuffer::new(usize::from(cols), usize::from(rows) * 2),
            status: None,
        }
    }

    /// Follow a terminal resize.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.framebuffer
            .resize(usize::from(cols), usize::from(rows) * 2);
    }

    #[must_use]
    pub fn cells(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Text for the bottom row, drawn over the scene.
    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
    }

    #[must_use]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Replace the current line with `text` (inline mode, no scene).
    pub fn present_line(&mut self, text: &str) -> io::Result<()> {
        let width = usize::from(self.cols);
        let line: String = text.chars().take(width).collect();
        queue!(
            self.writer,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            ResetColor,
            Print(line)
        )?;
        self.writer.flush()
    }

    fn draw(&mut self) -> io::Result<()> {
        let fb = &self.framebuffer;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..self.rows {
            queue!(self.writer, MoveTo(0, row))?;
            let y = usize::from(row) * 2;
            for col in 0..usize::from(self.cols) {
                let top = fb.get(col, y).unwrap_or(Rgb::BLACK);
                let bottom = fb.get(col, y + 1).unwrap_or(top);
                if fg != Some(top) {
                    queue!(self.writer, SetForegroundColor(color(top)))?;
                    fg = Some(top);
                }
                if bg != Some(bottom) {
                    queue!(self.writer, SetBackgroundColor(color(bottom)))?;
                    bg = Some(bottom);
                }
                queue!(self.writer, Print(UPPER_HALF))?;
            }
        }

        for overlay in fb.overlays() {
            let row = overlay.y / 2;
            let Ok(cell_row) = u16::try_from(row) else {
                continue;
            };
            let Ok(cell_col) = u16::try_from(overlay.x) else {
                continue;
            };
            let room = usize::from(self.cols).saturating_sub(overlay.x);
            let text: String = overlay.text.chars().take(room).collect();
            let behind = fb.get(overlay.x, row * 2 + 1).unwrap_or(Rgb::BLACK);
            queue!(
                self.writer,
                MoveTo(cell_col, cell_row),
                SetForegroundColor(color(overlay.color)),
                SetBackgroundColor(color(behind)),
                Print(text)
            )?;
        }

        if let Some(status) = &self.status
            && self.rows > 0
        {
            let width = usize::from(self.cols);
            let line: String = status.chars().take(width).collect();
            queue!(
                self.writer,
                MoveTo(0, self.rows - 1),
                SetForegroundColor(color(STATUS_FG)),
                SetBackgroundColor(color(STATUS_BG)),
                Print(format!("{line:<width$}"))
            )?;
        }

        queue!(self.writer, ResetColor)?;
        self.writer.flush()
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn size(&self) -> Size {
        Size::new(
            f64::from(self.cols) * CELL_WIDTH,
            f64::from(self.rows) * CELL_HEIGHT,
        )
    }

    fn present(&mut self, scene: &Scene) -> Result<(), SurfaceError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(SurfaceError::Unavailable);
        }
        self.framebuffer.render(scene);
        self.draw()?;
        Ok(())
    }
}
