//! Hit-testing: which element is under a point, and which part of the
//! selected element's decoration (resize handle, rotate handle, body).
//!
//! All geometry here is axis-aligned. Element rotation is drawn by the
//! renderer but not applied to hit regions, so a rotated element
//! is picked and resized through its unrotated box.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::config::EditorConfig;
use crate::doc::{Certificate, Element, ElementId, ElementKind};
use crate::input::Cursor;
use crate::text::{TextMeasurer, text_bounds};
use crate::viewport::{Point, Rect};

/// Resize handle position on the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl Handle {
    /// Handles in hit priority order: corners first, then edge midpoints.
    pub const ALL: [Handle; 8] =
        [Handle::Nw, Handle::Ne, Handle::Sw, Handle::Se, Handle::N, Handle::S, Handle::W, Handle::E];

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Whether dragging this handle moves the right edge.
    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    /// Whether dragging this handle moves the top edge.
    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    /// Whether dragging this handle moves the bottom edge.
    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Where this handle sits on `bounds`.
    #[must_use]
    pub fn position(self, bounds: Rect) -> Point {
        let c = bounds.center();
        match self {
            Self::Nw => Point::new(bounds.x, bounds.y),
            Self::Ne => Point::new(bounds.right(), bounds.y),
            Self::Sw => Point::new(bounds.x, bounds.bottom()),
            Self::Se => Point::new(bounds.right(), bounds.bottom()),
            Self::N => Point::new(c.x, bounds.y),
            Self::S => Point::new(c.x, bounds.bottom()),
            Self::W => Point::new(bounds.x, c.y),
            Self::E => Point::new(bounds.right(), c.y),
        }
    }
}

/// Which part of the selected element a point is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// Inside the bounding box, away from any handle.
    Move,
    Resize(Handle),
    Rotate,
}

impl HitPart {
    /// Cursor to show while hovering this part.
    #[must_use]
    pub fn cursor(self) -> Cursor {
        match self {
            Self::Move => Cursor::Move,
            Self::Resize(handle) => Cursor::Resize(handle),
            Self::Rotate => Cursor::Grab,
        }
    }
}

/// Axis-aligned bounding box of an element.
#[must_use]
pub fn element_bounds(element: &Element, measurer: &dyn TextMeasurer) -> Rect {
    match &element.kind {
        ElementKind::Text(text) => text_bounds(element.x, element.y, text, measurer.measure(text)),
        ElementKind::Rectangle { shape, .. } | ElementKind::Circle(shape) => {
            Rect::new(element.x, element.y, shape.width, shape.height)
        }
    }
}

/// Whether `pt` lies on the element's body.
#[must_use]
pub fn element_contains(element: &Element, pt: Point, measurer: &dyn TextMeasurer) -> bool {
    match &element.kind {
        ElementKind::Text(_) | ElementKind::Rectangle { .. } => element_bounds(element, measurer).contains(pt),
        ElementKind::Circle(shape) => {
            let center = Point::new(element.x + shape.width / 2.0, element.y + shape.height / 2.0);
            let radius = shape.width.min(shape.height) / 2.0;
            center.distance(pt) <= radius
        }
    }
}

/// Topmost element under `pt`, if any.
#[must_use]
pub fn find_element_at(pt: Point, doc: &Certificate, measurer: &dyn TextMeasurer) -> Option<ElementId> {
    doc.elements
        .iter()
        .rev()
        .find(|e| element_contains(e, pt, measurer))
        .map(|e| e.id)
}

/// Center of the rotate handle for an element with the given bounds.
#[must_use]
pub fn rotate_handle_position(bounds: Rect, offset: f64) -> Point {
    Point::new(bounds.center().x, bounds.y - offset)
}

/// Classify `pt` against the decoration of the selected `element`.
///
/// Priority: rotate handle, corner handles, edge handles, body.
#[must_use]
pub fn classify_handle(
    pt: Point,
    element: &Element,
    measurer: &dyn TextMeasurer,
    config: &EditorConfig,
) -> Option<HitPart> {
    let bounds = element_bounds(element, measurer);

    let rotate = rotate_handle_position(bounds, config.rotate_handle_offset);
    if rotate.distance(pt) <= config.rotate_handle_radius {
        return Some(HitPart::Rotate);
    }

    let t = config.handle_threshold;
    for handle in Handle::ALL {
        let pos = handle.position(bounds);
        if (pt.x - pos.x).abs() <= t && (pt.y - pos.y).abs() <= t {
            return Some(HitPart::Resize(handle));
        }
    }

    bounds.contains(pt).then_some(HitPart::Move)
}
