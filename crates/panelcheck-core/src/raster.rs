#![forbid(unsafe_code)]

//! Software rasterizer for [`Scene`]s.
//!
//! Hosts without a native 2D canvas (the terminal) rasterize into a
//! [`Framebuffer`] and then map pixels onto whatever cells they have. Text is
//! not rasterized; it is reported as [`TextOverlay`]s in framebuffer
//! coordinates for the host to print on top.
//!
//! Coverage uses pixel centers: pixel `(px, py)` is inside a shape when the
//! point `(px + 0.5, py + 0.5)`, mapped back into scene space, is.

use crate::color::Rgb;
use crate::geometry::{Position, Rect};
use crate::scene::{DrawCommand, GradientAxis, GradientStop, Scene, gradient_color_at};

/// Text left for the host to draw, positioned in framebuffer pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOverlay {
    pub x: usize,
    pub y: usize,
    pub color: Rgb,
    pub text: String,
}

/// A row-major RGB pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    overlays: Vec<TextOverlay>,
}

impl Framebuffer {
    /// Create a buffer filled with black.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width.saturating_mul(height)],
            overlays: Vec::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// One row of pixels.
    #[must_use]
    pub fn row(&self, y: usize) -> &[Rgb] {
        if y >= self.height {
            return &[];
        }
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    #[must_use]
    pub fn overlays(&self) -> &[TextOverlay] {
        &self.overlays
    }

    /// Resize, discarding content.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width.saturating_mul(height), Rgb::BLACK);
        self.overlays.clear();
    }

    /// Rasterize `scene`, scaled from scene size to buffer size.
    ///
    /// Previous content is kept unless the scene clears it, matching how a
    /// canvas behaves.
    pub fn render(&mut self, scene: &Scene) {
        self.overlays.clear();
        if self.width == 0 || self.height == 0 {
            return;
        }
        let size = scene.size();
        let sx = if size.width > 0.0 {
            self.width as f64 / size.width
        } else {
            1.0
        };
        let sy = if size.height > 0.0 {
            self.height as f64 / size.height
        } else {
            1.0
        };

        for cmd in scene.commands() {
            match cmd {
                DrawCommand::Clear(color) => self.pixels.fill(*color),
                DrawCommand::FillRect { rect, color } => {
                    self.fill_where(*rect, sx, sy, |_, _| Some(*color));
                }
                DrawCommand::FillEllipse {
                    center,
                    radius_x,
                    radius_y,
                    color,
                } => {
                    let (rx, ry) = (*radius_x, *radius_y);
                    if rx <= 0.0 || ry <= 0.0 {
                        continue;
                    }
                    let bounds = Rect::new(center.x - rx, center.y - ry, rx * 2.0, ry * 2.0);
                    let c = *center;
                    self.fill_where(bounds, sx, sy, |x, y| {
                        let nx = (x - c.x) / rx;
                        let ny = (y - c.y) / ry;
                        (nx * nx + ny * ny <= 1.0).then_some(*color)
                    });
                }
                DrawCommand::LinearGradient { rect, axis, stops } => {
                    self.fill_gradient(*rect, *axis, stops, sx, sy);
                }
                DrawCommand::Text {
                    origin,
                    color,
                    text,
                    ..
                } => self.push_overlay(*origin, *color, text, sx, sy),
            }
        }
    }

    fn fill_gradient(
        &mut self,
        rect: Rect,
        axis: GradientAxis,
        stops: &[GradientStop],
        sx: f64,
        sy: f64,
    ) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        self.fill_where(rect, sx, sy, |x, y| {
            let t = match axis {
                GradientAxis::Horizontal => (x - rect.x) / rect.width,
                GradientAxis::Vertical => (y - rect.y) / rect.height,
            };
            Some(gradient_color_at(stops, t as f32))
        });
    }

    /// Visit every pixel whose center falls in `bounds` (scene space) and
    /// paint it with whatever `shade` returns for that center.
    fn fill_where(
        &mut self,
        bounds: Rect,
        sx: f64,
        sy: f64,
        mut shade: impl FnMut(f64, f64) -> Option<Rgb>,
    ) {
        let x0 = pixel_start(bounds.x * sx, self.width);
        let x1 = pixel_end(bounds.right() * sx, self.width);
        let y0 = pixel_start(bounds.y * sy, self.height);
        let y1 = pixel_end(bounds.bottom() * sy, self.height);

        for py in y0..y1 {
            let cy = (py as f64 + 0.5) / sy;
            if cy < bounds.y || cy >= bounds.bottom() {
                continue;
            }
            for px in x0..x1 {
                let cx = (px as f64 + 0.5) / sx;
                if cx < bounds.x || cx >= bounds.right() {
                    continue;
                }
                if let Some(color) = shade(cx, cy) {
                    self.pixels[py * self.width + px] = color;
                }
            }
        }
    }

    fn push_overlay(&mut self, origin: Position, color: Rgb, text: &str, sx: f64, sy: f64) {
        let x = origin.x * sx;
        let y = origin.y * sy;
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x.floor() as usize, y.floor() as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        self.overlays.push(TextOverlay {
            x,
            y,
            color,
            text: text.to_owned(),
        });
    }
}

fn pixel_start(v: f64, limit: usize) -> usize {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        (v.floor() as usize).min(limit)
    }
}

fn pixel_end(v: f64, limit: usize) -> usize {
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        (v.ceil() as usize).min(limit)
    }
}
