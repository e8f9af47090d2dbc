//! Document model: the certificate, its elements, and sparse element patches.
//!
//! A [`Certificate`] owns an ordered list of [`Element`]s. The list order is
//! the paint order: index 0 is drawn first (backmost). Each element carries a
//! shared header (id, anchor, rotation) plus an [`ElementKind`] payload, so
//! every consumer (hit-testing, transforms, rendering) matches exhaustively on
//! the variant.
//!
//! Data flows into this layer from the host (JSON via [`Certificate::from_json`])
//! and from the engine (gesture commits, patches, z-order operations).

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    DEFAULT_CANVAS_SIZE, DEFAULT_CIRCLE_SIZE, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_RECT_SIZE,
    DEFAULT_TEXT,
};
use crate::transform::normalize_degrees;

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// Errors produced while loading or encoding a document.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// The JSON payload could not be parsed or produced.
    #[error("document json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The canvas has a zero dimension.
    #[error("invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Two elements share an id.
    #[error("duplicate element id: {0}")]
    DuplicateId(ElementId),
}

/// Horizontal alignment of a text element relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
    /// Canvas text has no justification; laid out like `Left`.
    Justify,
}

impl TextAlign {
    /// The value for `CanvasRenderingContext2d.textAlign`.
    #[must_use]
    pub fn as_canvas(self) -> &'static str {
        match self {
            Self::Left | Self::Justify => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

/// Properties of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    /// Text to draw; may contain `[placeholder]` tokens.
    pub content: String,
    pub font_size: f64,
    pub font_family: String,
    /// CSS color string.
    pub color: String,
    #[serde(default)]
    pub text_align: TextAlign,
    /// CSS font weight (`"normal"`, `"bold"`, `"600"`, ...).
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    #[serde(default)]
    pub font_style: FontStyle,
    /// Extra advance after each character, in scene units.
    #[serde(default)]
    pub letter_spacing: f64,
    #[serde(default)]
    pub text_decoration: TextDecoration,
}

fn default_font_weight() -> String {
    "normal".to_owned()
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: DEFAULT_TEXT.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            color: "#000000".to_owned(),
            text_align: TextAlign::Center,
            font_weight: default_font_weight(),
            font_style: FontStyle::Normal,
            letter_spacing: 0.0,
            text_decoration: TextDecoration::None,
        }
    }
}

impl TextProps {
    /// CSS font shorthand, e.g. `italic bold 24px Arial`.
    #[must_use]
    pub fn css_font(&self) -> String {
        let style = match self.font_style {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        };
        format!("{style} {} {}px {}", self.font_weight, self.font_size, self.font_family)
    }

    /// Placeholder names (without brackets) in order of appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        placeholder_tokens(&self.content)
    }
}

/// Geometry and paint shared by rectangles and circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeProps {
    pub width: f64,
    pub height: f64,
    pub fill_color: String,
    pub stroke_color: String,
    #[serde(default)]
    pub stroke_width: f64,
}

impl ShapeProps {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            fill_color: "#E0E7FF".to_owned(),
            stroke_color: "#4F46E5".to_owned(),
            stroke_width: 2.0,
        }
    }
}

/// Variant payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// Text anchored at (x, y) according to its alignment.
    Text(TextProps),
    /// Box with top-left at (x, y).
    Rectangle {
        #[serde(flatten)]
        shape: ShapeProps,
        #[serde(default)]
        border_radius: f64,
    },
    /// Circle inscribed in the box with top-left at (x, y); radius is half the shorter side.
    Circle(ShapeProps),
}

/// Which shape an "add shape" command creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

/// One placeable object in the certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    /// Clockwise rotation in degrees, kept in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    #[must_use]
    pub fn text(x: f64, y: f64, props: TextProps) -> Self {
        Self { id: Uuid::new_v4(), x, y, rotation: 0.0, kind: ElementKind::Text(props) }
    }

    #[must_use]
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            rotation: 0.0,
            kind: ElementKind::Rectangle { shape: ShapeProps::new(width, height), border_radius: 0.0 },
        }
    }

    #[must_use]
    pub fn circle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id: Uuid::new_v4(), x, y, rotation: 0.0, kind: ElementKind::Circle(ShapeProps::new(width, height)) }
    }

    /// Text properties, if this is a text element.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextProps> {
        match &self.kind {
            ElementKind::Text(props) => Some(props),
            ElementKind::Rectangle { .. } | ElementKind::Circle(_) => None,
        }
    }

    /// Shape properties, if this is a rectangle or circle.
    #[must_use]
    pub fn as_shape(&self) -> Option<&ShapeProps> {
        match &self.kind {
            ElementKind::Text(_) => None,
            ElementKind::Rectangle { shape, .. } | ElementKind::Circle(shape) => Some(shape),
        }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text(_))
    }

    /// Store `degrees` normalized to `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_degrees(degrees);
    }

    /// A copy under a fresh id, moved by `offset` on both axes.
    #[must_use]
    pub fn duplicated(&self, offset: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: self.x + offset,
            y: self.y + offset,
            rotation: self.rotation,
            kind: self.kind.clone(),
        }
    }
}

/// Sparse update for an element. Only present fields are applied, and only
/// when they make sense for the element's variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
}

impl ElementPatch {
    /// Apply the patch to `element`. Shape sizes are clamped to `min_size`.
    pub fn apply_to(&self, element: &mut Element, min_size: f64) {
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(r) = self.rotation {
            element.set_rotation(r);
        }
        match &mut element.kind {
            ElementKind::Text(text) => self.apply_text(text),
            ElementKind::Rectangle { shape, border_radius } => {
                self.apply_shape(shape, min_size);
                if let Some(r) = self.border_radius {
                    *border_radius = r.max(0.0);
                }
            }
            ElementKind::Circle(shape) => self.apply_shape(shape, min_size),
        }
    }

    fn apply_text(&self, text: &mut TextProps) {
        if let Some(ref content) = self.content {
            text.content.clone_from(content);
        }
        if let Some(size) = self.font_size {
            text.font_size = size.max(1.0);
        }
        if let Some(ref family) = self.font_family {
            text.font_family.clone_from(family);
        }
        if let Some(ref color) = self.color {
            text.color.clone_from(color);
        }
        if let Some(align) = self.text_align {
            text.text_align = align;
        }
        if let Some(ref weight) = self.font_weight {
            text.font_weight.clone_from(weight);
        }
        if let Some(style) = self.font_style {
            text.font_style = style;
        }
        if let Some(spacing) = self.letter_spacing {
            text.letter_spacing = spacing;
        }
        if let Some(decoration) = self.text_decoration {
            text.text_decoration = decoration;
        }
    }

    fn apply_shape(&self, shape: &mut ShapeProps, min_size: f64) {
        if let Some(w) = self.width {
            shape.width = w.max(min_size);
        }
        if let Some(h) = self.height {
            shape.height = h.max(min_size);
        }
        if let Some(ref fill) = self.fill_color {
            shape.fill_color.clone_from(fill);
        }
        if let Some(ref stroke) = self.stroke_color {
            shape.stroke_color.clone_from(stroke);
        }
        if let Some(sw) = self.stroke_width {
            shape.stroke_width = sw.max(0.0);
        }
    }
}

/// The design being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// Canvas width; logical units equal backing pixels.
    pub width: u32,
    /// Canvas height; logical units equal backing pixels.
    pub height: u32,
    /// CSS color used when no background image is loaded.
    pub background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    /// Elements in paint order, backmost first.
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Default for Certificate {
    fn default() -> Self {
        Self::blank(DEFAULT_CANVAS_SIZE.0, DEFAULT_CANVAS_SIZE.1)
    }
}

impl Certificate {
    /// An empty white certificate.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background_color: "#FFFFFF".to_owned(),
            background_image: None,
            elements: Vec::new(),
        }
    }

    /// Copy a library template for editing. Element ids are regenerated so the
    /// shared template is never aliased by the working copy.
    #[must_use]
    pub fn from_template(template: &Certificate) -> Self {
        let mut copy = template.clone();
        for element in &mut copy.elements {
            element.id = Uuid::new_v4();
        }
        copy
    }

    /// Parse a document, then validate it and normalize rotations.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Json`] for malformed input, [`DocError::InvalidSize`]
    /// for a zero-sized canvas, and [`DocError::DuplicateId`] when ids collide.
    pub fn from_json(raw: &str) -> Result<Self, DocError> {
        let mut doc: Self = serde_json::from_str(raw)?;
        doc.validate()?;
        doc.normalize();
        Ok(doc)
    }

    /// Encode the document as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, DocError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check canvas size and id uniqueness.
    ///
    /// # Errors
    ///
    /// See [`Certificate::from_json`].
    pub fn validate(&self) -> Result<(), DocError> {
        if self.width == 0 || self.height == 0 {
            return Err(DocError::InvalidSize { width: self.width, height: self.height });
        }
        let mut seen = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !seen.insert(element.id) {
                return Err(DocError::DuplicateId(element.id));
            }
        }
        Ok(())
    }

    /// Bring every rotation into `[0, 360)`.
    pub fn normalize(&mut self) {
        for element in &mut self.elements {
            element.set_rotation(element.rotation);
        }
    }

    /// Canvas center in scene coordinates.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Create a default text element at the canvas center and append it.
    pub fn add_text(&mut self) -> ElementId {
        let (cx, cy) = self.center();
        self.push(Element::text(cx, cy, TextProps::default()))
    }

    /// Create a default shape centered on the canvas and append it.
    pub fn add_shape(&mut self, kind: ShapeKind) -> ElementId {
        let (cx, cy) = self.center();
        let element = match kind {
            ShapeKind::Rectangle => {
                let (w, h) = DEFAULT_RECT_SIZE;
                Element::rectangle(cx - w / 2.0, cy - h / 2.0, w, h)
            }
            ShapeKind::Circle => {
                let (w, h) = DEFAULT_CIRCLE_SIZE;
                Element::circle(cx - w / 2.0, cy - h / 2.0, w, h)
            }
        };
        self.push(element)
    }

    /// Append an element on top of the stack.
    pub fn push(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Z-index of an element.
    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == *id)
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == *id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Apply a patch to an element. Returns false if the element doesn't exist.
    pub fn apply_patch(&mut self, id: &ElementId, patch: &ElementPatch, min_size: f64) -> bool {
        let Some(element) = self.get_mut(id) else {
            return false;
        };
        patch.apply_to(element, min_size);
        true
    }

    /// All distinct placeholder names, in paint order of first appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for text in self.elements.iter().filter_map(Element::as_text) {
            for token in text.placeholders() {
                if seen.insert(token) {
                    out.push(token.to_owned());
                }
            }
        }
        out
    }

    /// A copy with `[name]` tokens replaced from `values`. Tokens without a
    /// value are left as written.
    #[must_use]
    pub fn personalize(&self, values: &HashMap<String, String>) -> Self {
        let mut copy = self.clone();
        for element in &mut copy.elements {
            if let ElementKind::Text(text) = &mut element.kind {
                text.content = fill_placeholders(&text.content, values);
            }
        }
        copy
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Bracketed token names in `text`, e.g. `"Dear [name]"` yields `["name"]`.
/// Empty brackets and unterminated tokens are ignored.
#[must_use]
pub fn placeholder_tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            break;
        };
        let inner = &after[..close];
        if inner.contains('[') {
            // Restart at the inner bracket: "[[a]" yields "a".
            rest = &after[inner.rfind('[').unwrap_or(0)..];
            continue;
        }
        if !inner.is_empty() {
            out.push(inner);
        }
        rest = &after[close + 1..];
    }
    out
}

fn fill_placeholders(text: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let inner = &after[..close];
        match values.get(inner) {
            Some(value) if !inner.contains('[') => out.push_str(value),
            _ => {
                out.push('[');
                rest = after;
                continue;
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}
