//! Paint adapter: executes [`DrawCommand`]s on a 2D canvas context.
//!
//! This module and [`crate::engine::Engine`] are the only places that touch
//! [`web_sys::CanvasRenderingContext2d`]. Fallible `Canvas2D` calls propagate
//! their `JsValue` errors; the caller decides how to report them.

#[cfg(test)]
#[path = "paint_test.rs"]
mod paint_test;

use std::f64::consts::PI;

use base64::{Engine as _, engine::general_purpose};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::doc::{Certificate, TextAlign, TextDecoration, TextProps};
use crate::render::{self, DrawCommand};
use crate::text::{EstimatedMeasurer, TextMeasurer};
use crate::viewport::{Point, Rect};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Errors produced while exporting the certificate as a raster image.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// No document, canvas or 2D context could be obtained.
    #[error("canvas unavailable: {0}")]
    Canvas(String),

    /// A draw call failed.
    #[error("paint failed: {0}")]
    Paint(String),

    /// The canvas produced something other than PNG base64 data.
    #[error("png encode failed: {0}")]
    Encode(String),
}

/// Text measurement backed by `CanvasRenderingContext2d::measure_text`.
pub struct CanvasMeasurer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasMeasurer {
    #[must_use]
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasurer for CanvasMeasurer {
    fn measure(&self, text: &TextProps) -> f64 {
        self.ctx.save();
        self.ctx.set_font(&text.css_font());
        let width = match self.ctx.measure_text(&text.content) {
            Ok(metrics) => metrics.width() + text.content.chars().count() as f64 * text.letter_spacing,
            Err(_) => EstimatedMeasurer::default().measure(text),
        };
        self.ctx.restore();
        width
    }
}

/// Execute `commands` in order. `background` is drawn for
/// [`DrawCommand::BackgroundImage`]; without it that command is skipped.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn paint(
    ctx: &CanvasRenderingContext2d,
    commands: &[DrawCommand],
    background: Option<&HtmlImageElement>,
) -> Result<(), JsValue> {
    for command in commands {
        paint_one(ctx, command, background)?;
    }
    Ok(())
}

fn paint_one(
    ctx: &CanvasRenderingContext2d,
    command: &DrawCommand,
    background: Option<&HtmlImageElement>,
) -> Result<(), JsValue> {
    match command {
        DrawCommand::FillBackground { width, height, color } => {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(0.0, 0.0, *width, *height);
        }
        DrawCommand::BackgroundImage { width, height } => {
            if let Some(image) = background {
                ctx.draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, *width, *height)?;
            }
        }
        DrawCommand::Rect { bounds, radius, rotation, fill, stroke, stroke_width } => {
            ctx.save();
            rotate_about(ctx, bounds.center(), *rotation)?;
            rounded_rect_path(ctx, *bounds, *radius)?;
            ctx.set_fill_style_str(fill);
            ctx.fill();
            stroke_path(ctx, stroke, *stroke_width);
            ctx.restore();
        }
        DrawCommand::Circle { center, radius, fill, stroke, stroke_width } => {
            ctx.begin_path();
            ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
            ctx.set_fill_style_str(fill);
            ctx.fill();
            stroke_path(ctx, stroke, *stroke_width);
        }
        DrawCommand::Text {
            anchor,
            bounds,
            content,
            font,
            font_size,
            color,
            align,
            letter_spacing,
            decoration,
            rotation,
        } => {
            ctx.save();
            rotate_about(ctx, bounds.center(), *rotation)?;
            ctx.set_font(font);
            ctx.set_fill_style_str(color);
            ctx.set_text_baseline("middle");
            draw_text_run(ctx, content, *anchor, *bounds, *align, *letter_spacing)?;
            draw_decoration(ctx, *decoration, *bounds, anchor.y, *font_size, color);
            ctx.restore();
        }
        DrawCommand::Outline { bounds, color, line_width, dash } => {
            ctx.save();
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(*line_width);
            if let Some(d) = dash {
                let dash_array = js_sys::Array::new();
                dash_array.push(&(*d).into());
                dash_array.push(&(*d).into());
                ctx.set_line_dash(&dash_array)?;
            }
            ctx.stroke_rect(bounds.x, bounds.y, bounds.width, bounds.height);
            ctx.set_line_dash(&js_sys::Array::new())?;
            ctx.restore();
        }
        DrawCommand::Handle { center, size, color } => {
            let half = size / 2.0;
            ctx.set_fill_style_str("#fff");
            ctx.fill_rect(center.x - half, center.y - half, *size, *size);
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(1.0);
            ctx.stroke_rect(center.x - half, center.y - half, *size, *size);
        }
        DrawCommand::Connector { from, to, color } => {
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(1.0);
            ctx.begin_path();
            ctx.move_to(from.x, from.y);
            ctx.line_to(to.x, to.y);
            ctx.stroke();
        }
        DrawCommand::RotateHandle { center, radius, color } => {
            ctx.begin_path();
            ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
            ctx.set_fill_style_str("#fff");
            ctx.fill();
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(1.0);
            ctx.stroke();
        }
    }
    Ok(())
}

// =============================================================
// Text
// =============================================================

fn draw_text_run(
    ctx: &CanvasRenderingContext2d,
    content: &str,
    anchor: Point,
    bounds: Rect,
    align: TextAlign,
    letter_spacing: f64,
) -> Result<(), JsValue> {
    if letter_spacing == 0.0 {
        ctx.set_text_align(align.as_canvas());
        return ctx.fill_text(content, anchor.x, anchor.y);
    }

    // Canvas has no portable letter-spacing; advance glyph by glyph from the left edge.
    ctx.set_text_align("left");
    let mut x = bounds.x;
    let mut buf = [0u8; 4];
    for ch in content.chars() {
        let glyph: &str = ch.encode_utf8(&mut buf);
        ctx.fill_text(glyph, x, anchor.y)?;
        x += ctx.measure_text(glyph)?.width() + letter_spacing;
    }
    Ok(())
}

fn draw_decoration(
    ctx: &CanvasRenderingContext2d,
    decoration: TextDecoration,
    bounds: Rect,
    baseline_y: f64,
    font_size: f64,
    color: &str,
) {
    let y = match decoration {
        TextDecoration::None => return,
        TextDecoration::Underline => baseline_y + font_size * 0.4,
        TextDecoration::LineThrough => baseline_y,
    };
    ctx.set_stroke_style_str(color);
    ctx.set_line_width((font_size / 16.0).max(1.0));
    ctx.begin_path();
    ctx.move_to(bounds.x, y);
    ctx.line_to(bounds.right(), y);
    ctx.stroke();
}

// =============================================================
// Helpers
// =============================================================

/// Rotate the context by `degrees` around `pivot`.
fn rotate_about(ctx: &CanvasRenderingContext2d, pivot: Point, degrees: f64) -> Result<(), JsValue> {
    if degrees == 0.0 {
        return Ok(());
    }
    ctx.translate(pivot.x, pivot.y)?;
    ctx.rotate(degrees.to_radians())?;
    ctx.translate(-pivot.x, -pivot.y)?;
    Ok(())
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, r: Rect, radius: f64) -> Result<(), JsValue> {
    ctx.begin_path();
    if radius <= 0.0 {
        ctx.rect(r.x, r.y, r.width, r.height);
        return Ok(());
    }
    ctx.move_to(r.x + radius, r.y);
    ctx.arc_to(r.right(), r.y, r.right(), r.bottom(), radius)?;
    ctx.arc_to(r.right(), r.bottom(), r.x, r.bottom(), radius)?;
    ctx.arc_to(r.x, r.bottom(), r.x, r.y, radius)?;
    ctx.arc_to(r.x, r.y, r.right(), r.y, radius)?;
    ctx.close_path();
    Ok(())
}

fn stroke_path(ctx: &CanvasRenderingContext2d, color: &str, width: f64) {
    if width <= 0.0 {
        return;
    }
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.stroke();
}

// =============================================================
// Export
// =============================================================

/// Fetch the 2D context of `canvas`.
///
/// # Errors
///
/// Returns `Err` if the canvas has no 2D context.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("context is not CanvasRenderingContext2d"))
}

/// Render the certificate at its native size into an offscreen canvas and
/// return the PNG bytes. No decorations, scaling or cropping.
///
/// # Errors
///
/// Returns [`ExportError`] if the canvas cannot be created, a draw call fails
/// or the canvas does not produce PNG data.
pub fn export_png(doc: &Certificate, background: Option<&HtmlImageElement>) -> Result<Vec<u8>, ExportError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ExportError::Canvas("no document".to_owned()))?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| ExportError::Canvas(js_message(&e)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| ExportError::Canvas("element is not a canvas".to_owned()))?;
    canvas.set_width(doc.width);
    canvas.set_height(doc.height);
    let ctx = context_2d(&canvas).map_err(|e| ExportError::Canvas(js_message(&e)))?;

    let measurer = CanvasMeasurer::new(ctx.clone());
    let commands = render::render_export(doc, background.is_some(), &measurer);
    paint(&ctx, &commands, background).map_err(|e| ExportError::Paint(js_message(&e)))?;

    let url = canvas.to_data_url().map_err(|e| ExportError::Encode(js_message(&e)))?;
    decode_png_data_url(&url)
}

/// Extract the PNG bytes from a `data:image/png;base64,` URL.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] for any other scheme or invalid base64.
pub fn decode_png_data_url(url: &str) -> Result<Vec<u8>, ExportError> {
    let payload = url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| ExportError::Encode("not a png data url".to_owned()))?;
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ExportError::Encode(e.to_string()))
}

/// Best-effort message for a JS exception value.
#[must_use]
pub fn js_message(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
