//! Rendering: converts the scene into an ordered list of draw commands.
//!
//! This module is pure. It reads the document, UI state and gesture and
//! produces [`DrawCommand`]s in paint order; [`crate::paint`] is the only
//! place that executes them against a `CanvasRenderingContext2d`.
//!
//! Layers:
//! 1. background color, then the background image when loaded
//! 2. elements in z-order, skipping the one open in the text editor
//! 3. dashed hover outline (only when hover differs from selection)
//! 4. selection outline, resize handles, rotate connector and rotate handle

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::config::EditorConfig;
use crate::consts::HOVER_DASH;
use crate::doc::{Certificate, Element, ElementId, ElementKind, TextAlign, TextDecoration};
use crate::hit::{self, Handle};
use crate::input::{Gesture, UiState};
use crate::text::{TextMeasurer, text_bounds};
use crate::viewport::{Point, Rect};

/// Selection outline width in scene units.
const SELECTION_LINE_WIDTH: f64 = 2.0;

/// Hover outline width in scene units.
const HOVER_LINE_WIDTH: f64 = 1.0;

/// One primitive paint operation, in scene coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole canvas with a flat color.
    FillBackground { width: f64, height: f64, color: String },
    /// Draw the loaded background image stretched over the canvas.
    BackgroundImage { width: f64, height: f64 },
    /// Rectangle, optionally rounded, rotated about its center.
    Rect {
        bounds: Rect,
        radius: f64,
        rotation: f64,
        fill: String,
        stroke: String,
        stroke_width: f64,
    },
    /// Circle; rotation has no visible effect so none is carried.
    Circle {
        center: Point,
        radius: f64,
        fill: String,
        stroke: String,
        stroke_width: f64,
    },
    /// Single line of text with a middle baseline at `anchor.y`.
    Text {
        anchor: Point,
        /// Measured box, used for decoration lines and the rotation pivot.
        bounds: Rect,
        content: String,
        font: String,
        font_size: f64,
        color: String,
        align: TextAlign,
        letter_spacing: f64,
        decoration: TextDecoration,
        rotation: f64,
    },
    /// Rectangle outline, dashed when `dash` is set.
    Outline {
        bounds: Rect,
        color: String,
        line_width: f64,
        dash: Option<f64>,
    },
    /// Square resize handle centered on `center`.
    Handle { center: Point, size: f64, color: String },
    /// Line from the top edge to the rotate handle.
    Connector { from: Point, to: Point, color: String },
    /// Circular rotate handle.
    RotateHandle { center: Point, radius: f64, color: String },
}

/// Editor state the renderer needs beyond the document itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    pub ui: UiState,
    pub gesture: &'a Gesture,
    /// Whether the background image is decoded and ready to draw.
    pub background_ready: bool,
    pub config: &'a EditorConfig,
}

/// Draw commands for the interactive canvas.
#[must_use]
pub fn render(doc: &Certificate, view: &RenderView<'_>, measurer: &dyn TextMeasurer) -> Vec<DrawCommand> {
    let mut out = Vec::with_capacity(doc.len() + 16);
    push_scene(&mut out, doc, view.background_ready, view.gesture.editing_id(), measurer);

    let selected = view.ui.selected_id;
    if let Some(hover) = view.ui.hover_id.filter(|h| Some(*h) != selected) {
        if let Some(element) = doc.get(&hover) {
            out.push(DrawCommand::Outline {
                bounds: hit::element_bounds(element, measurer),
                color: view.config.hover_color.clone(),
                line_width: HOVER_LINE_WIDTH,
                dash: Some(HOVER_DASH),
            });
        }
    }

    if let Some(element) = selected.and_then(|id| doc.get(&id)) {
        push_selection(&mut out, element, view.config, measurer);
    }

    out
}

/// Draw commands for raster export: background and elements only.
#[must_use]
pub fn render_export(doc: &Certificate, background_ready: bool, measurer: &dyn TextMeasurer) -> Vec<DrawCommand> {
    let mut out = Vec::with_capacity(doc.len() + 2);
    push_scene(&mut out, doc, background_ready, None, measurer);
    out
}

// =============================================================
// Scene
// =============================================================

fn push_scene(
    out: &mut Vec<DrawCommand>,
    doc: &Certificate,
    background_ready: bool,
    skip: Option<ElementId>,
    measurer: &dyn TextMeasurer,
) {
    let width = f64::from(doc.width);
    let height = f64::from(doc.height);
    out.push(DrawCommand::FillBackground { width, height, color: doc.background_color.clone() });
    if background_ready && doc.background_image.is_some() {
        out.push(DrawCommand::BackgroundImage { width, height });
    }

    for element in &doc.elements {
        if Some(element.id) == skip {
            continue;
        }
        out.push(element_command(element, measurer));
    }
}

fn element_command(element: &Element, measurer: &dyn TextMeasurer) -> DrawCommand {
    match &element.kind {
        ElementKind::Text(text) => DrawCommand::Text {
            anchor: Point::new(element.x, element.y),
            bounds: text_bounds(element.x, element.y, text, measurer.measure(text)),
            content: text.content.clone(),
            font: text.css_font(),
            font_size: text.font_size,
            color: text.color.clone(),
            align: text.text_align,
            letter_spacing: text.letter_spacing,
            decoration: text.text_decoration,
            rotation: element.rotation,
        },
        ElementKind::Rectangle { shape, border_radius } => DrawCommand::Rect {
            bounds: Rect::new(element.x, element.y, shape.width, shape.height),
            radius: border_radius.min(shape.width.min(shape.height) / 2.0),
            rotation: element.rotation,
            fill: shape.fill_color.clone(),
            stroke: shape.stroke_color.clone(),
            stroke_width: shape.stroke_width,
        },
        ElementKind::Circle(shape) => DrawCommand::Circle {
            center: Point::new(element.x + shape.width / 2.0, element.y + shape.height / 2.0),
            radius: shape.width.min(shape.height) / 2.0,
            fill: shape.fill_color.clone(),
            stroke: shape.stroke_color.clone(),
            stroke_width: shape.stroke_width,
        },
    }
}

// =============================================================
// Selection UI
// =============================================================

fn push_selection(out: &mut Vec<DrawCommand>, element: &Element, config: &EditorConfig, measurer: &dyn TextMeasurer) {
    let bounds = hit::element_bounds(element, measurer);
    let accent = &config.accent_color;

    out.push(DrawCommand::Outline {
        bounds,
        color: accent.clone(),
        line_width: SELECTION_LINE_WIDTH,
        dash: None,
    });

    for handle in Handle::ALL {
        out.push(DrawCommand::Handle {
            center: handle.position(bounds),
            size: config.handle_size,
            color: accent.clone(),
        });
    }

    let rotate = hit::rotate_handle_position(bounds, config.rotate_handle_offset);
    out.push(DrawCommand::Connector {
        from: Handle::N.position(bounds),
        to: rotate,
        color: accent.clone(),
    });
    out.push(DrawCommand::RotateHandle {
        center: rotate,
        radius: config.handle_size / 2.0,
        color: accent.clone(),
    });
}
