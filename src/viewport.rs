//! Screen-to-scene coordinate mapping.
//!
//! The canvas backing store is sized to the certificate, while CSS may
//! display it at any size and page offset. [`Viewport`] records both and
//! converts pointer positions (client pixels) into scene units and back.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or scene space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Where and how large the canvas is displayed, versus its backing resolution.
///
/// The canvas backing store is always the certificate's logical size; CSS may
/// display it larger or smaller. `left`/`top`/`display_*` are in CSS pixels as
/// reported by `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub display_width: f64,
    pub display_height: f64,
    pub backing_width: f64,
    pub backing_height: f64,
}

impl Viewport {
    /// A viewport displayed 1:1 at the page origin.
    #[must_use]
    pub fn unscaled(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            display_width: width,
            display_height: height,
            backing_width: width,
            backing_height: height,
        }
    }

    /// Horizontal backing pixels per CSS pixel. `1.0` when the canvas has no
    /// displayed width yet.
    #[must_use]
    pub fn scale_x(&self) -> f64 {
        if self.display_width > 0.0 { self.backing_width / self.display_width } else { 1.0 }
    }

    /// Vertical backing pixels per CSS pixel.
    #[must_use]
    pub fn scale_y(&self) -> f64 {
        if self.display_height > 0.0 { self.backing_height / self.display_height } else { 1.0 }
    }

    /// Convert a client-space pointer position to scene coordinates.
    #[must_use]
    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.left) * self.scale_x(),
            y: (screen.y - self.top) * self.scale_y(),
        }
    }

    /// Convert a scene point back to client space, e.g. to place the text overlay.
    #[must_use]
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        Point {
            x: scene.x / self.scale_x() + self.left,
            y: scene.y / self.scale_y() + self.top,
        }
    }
}

/// An axis-aligned rectangle in scene space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edge-inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}
