//! Pure geometry for drag, resize and rotate gestures.
//!
//! Every function mutates a single element in place and performs no I/O. The
//! gesture controller calls them on each pointer move; committing the result
//! to history is the caller's job.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::config::EditorConfig;
use crate::doc::{Element, ElementKind};
use crate::hit::Handle;
use crate::viewport::Point;

/// Bring an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    ((degrees % 360.0) + 360.0) % 360.0
}

/// Angle of `pointer` around `center` in degrees, clockwise from +x in screen space.
#[must_use]
pub fn pointer_angle(center: Point, pointer: Point) -> f64 {
    (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees()
}

/// Move the element so its anchor sits at `pointer - offset`.
pub fn apply_drag(element: &mut Element, pointer: Point, offset: Point) {
    element.x = pointer.x - offset.x;
    element.y = pointer.y - offset.y;
}

/// Resize the element by dragging `handle` to `pointer`.
///
/// Shapes: edges touched by the handle follow the pointer, the opposite edges
/// stay put, and width/height never drop below `config.min_size` (the edge
/// stops short of the pointer instead).
///
/// Text: the box height is the font size, so handles with a vertical
/// component set the font size (at least `config.min_font_size`) while the
/// opposite vertical edge stays put. `E`/`W` leave text unchanged.
pub fn apply_resize(element: &mut Element, handle: Handle, pointer: Point, config: &EditorConfig) {
    match &mut element.kind {
        ElementKind::Rectangle { shape, .. } | ElementKind::Circle(shape) => {
            let min = config.min_size;
            let right = element.x + shape.width;
            let bottom = element.y + shape.height;

            if handle.moves_right() {
                shape.width = (pointer.x - element.x).max(min);
            }
            if handle.moves_left() {
                shape.width = (right - pointer.x).max(min);
                element.x = right - shape.width;
            }
            if handle.moves_bottom() {
                shape.height = (pointer.y - element.y).max(min);
            }
            if handle.moves_top() {
                shape.height = (bottom - pointer.y).max(min);
                element.y = bottom - shape.height;
            }
        }
        ElementKind::Text(text) => {
            let top = element.y - text.font_size / 2.0;
            let bottom = element.y + text.font_size / 2.0;
            if handle.moves_bottom() {
                text.font_size = (pointer.y - top).max(config.min_font_size);
                element.y = top + text.font_size / 2.0;
            } else if handle.moves_top() {
                text.font_size = (bottom - pointer.y).max(config.min_font_size);
                element.y = bottom - text.font_size / 2.0;
            }
        }
    }
}

/// Rotate the element so the pointer's angle around `center`, minus
/// `angle_offset`, becomes its rotation.
pub fn apply_rotate(element: &mut Element, center: Point, angle_offset: f64, pointer: Point) {
    element.set_rotation(pointer_angle(center, pointer) - angle_offset);
}
