//! Text measurement.
//!
//! Text elements have no stored width; their bounds come from measuring the
//! content in the element's font. In the browser the measurement comes from
//! `CanvasRenderingContext2d::measure_text` (see [`crate::paint::CanvasMeasurer`]);
//! tests and headless export use [`EstimatedMeasurer`].

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

use crate::doc::{TextAlign, TextProps};
use crate::viewport::Rect;

/// Measures the advance width of a text element's content.
pub trait TextMeasurer {
    /// Width of `text.content` in `text`'s font, letter spacing included.
    fn measure(&self, text: &TextProps) -> f64;
}

/// Font-agnostic width estimate: every character advances by a fixed
/// fraction of the font size.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedMeasurer {
    /// Average glyph advance as a fraction of the font size.
    pub advance_ratio: f64,
}

impl Default for EstimatedMeasurer {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextMeasurer for EstimatedMeasurer {
    fn measure(&self, text: &TextProps) -> f64 {
        let chars = text.content.chars().count() as f64;
        let weight = if is_bold(&text.font_weight) { 1.1 } else { 1.0 };
        chars * (text.font_size * self.advance_ratio * weight + text.letter_spacing)
    }
}

fn is_bold(weight: &str) -> bool {
    match weight {
        "bold" | "bolder" => true,
        other => other.parse::<u16>().is_ok_and(|w| w >= 600),
    }
}

/// Bounding box of a text element anchored at (`x`, `y`).
///
/// The box is `width` wide per the alignment and `font_size` tall, centered
/// vertically on `y` (the text is drawn with a middle baseline).
#[must_use]
pub fn text_bounds(x: f64, y: f64, text: &TextProps, width: f64) -> Rect {
    let left = match text.text_align {
        TextAlign::Left | TextAlign::Justify => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    };
    Rect::new(left, y - text.font_size / 2.0, width, text.font_size)
}
