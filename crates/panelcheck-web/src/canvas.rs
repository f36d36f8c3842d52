#![forbid(unsafe_code)]

//! Canvas-2d surface.

use std::f64::consts::TAU;

use panelcheck_core::scene::{DrawCommand, GradientAxis, Scene, Surface};
use panelcheck_core::{Size, SurfaceError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::host::js_message;
use crate::options::{WebError, css_color, css_font};

fn backend(err: JsValue) -> SurfaceError {
    SurfaceError::Backend(js_message(&err))
}

/// Draws scenes into an `HtmlCanvasElement` at its backing-store resolution.
#[derive(Debug)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, WebError> {
        let context = canvas
            .get_context("2d")
            .map_err(|err| WebError::Js(js_message(&err)))?
            .ok_or(WebError::Unsupported("canvas 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| WebError::Unsupported("canvas 2d context"))?;
        Ok(Self { canvas, context })
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Resize the backing store. Clears the canvas, as the DOM does.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    /// Paint the whole canvas black.
    pub fn blank(&mut self) {
        let size = Surface::size(self);
        self.context.set_fill_style_str("#000000");
        self.context.fill_rect(0.0, 0.0, size.width, size.height);
    }

    fn draw(&self, command: &DrawCommand, size: Size) -> Result<(), SurfaceError> {
        let ctx = &self.context;
        match command {
            DrawCommand::Clear(color) => {
                ctx.set_fill_style_str(&css_color(*color));
                ctx.fill_rect(0.0, 0.0, size.width, size.height);
            }
            DrawCommand::FillRect { rect, color } => {
                ctx.set_fill_style_str(&css_color(*color));
                ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
            }
            DrawCommand::FillEllipse {
                center,
                radius_x,
                radius_y,
                color,
            } => {
                ctx.set_fill_style_str(&css_color(*color));
                ctx.begin_path();
                ctx.ellipse(center.x, center.y, *radius_x, *radius_y, 0.0, 0.0, TAU)
                    .map_err(backend)?;
                ctx.fill();
            }
            DrawCommand::LinearGradient { rect, axis, stops } => {
                let (x1, y1) = match axis {
                    GradientAxis::Horizontal => (rect.right(), rect.y),
                    GradientAxis::Vertical => (rect.x, rect.bottom()),
                };
                let gradient = ctx.create_linear_gradient(rect.x, rect.y, x1, y1);
                for stop in stops {
                    gradient
                        .add_color_stop(stop.offset, &css_color(stop.color))
                        .map_err(backend)?;
                }
                ctx.set_fill_style_canvas_gradient(&gradient);
                ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
            }
            DrawCommand::Text {
                origin,
                size: line_height,
                color,
                text,
            } => {
                ctx.set_fill_style_str(&css_color(*color));
                ctx.set_font(&css_font(*line_height));
                ctx.set_text_baseline("top");
                ctx.fill_text(text, origin.x, origin.y).map_err(backend)?;
            }
        }
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn present(&mut self, scene: &Scene) -> Result<(), SurfaceError> {
        let size = Surface::size(self);
        if size.is_empty() {
            return Err(SurfaceError::Unavailable);
        }
        for command in scene.commands() {
            self.draw(command, size)?;
        }
        Ok(())
    }
}
