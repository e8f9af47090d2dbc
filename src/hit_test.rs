#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::TextProps;
use crate::text::EstimatedMeasurer;

fn measurer() -> EstimatedMeasurer {
    EstimatedMeasurer::default()
}

fn hello() -> Element {
    let props = TextProps { content: "Hello".to_owned(), ..TextProps::default() };
    Element::text(400.0, 300.0, props)
}

fn doc_with(elements: Vec<Element>) -> Certificate {
    let mut doc = Certificate::default();
    for e in elements {
        doc.push(e);
    }
    doc
}

fn classify(pt: Point, element: &Element) -> Option<HitPart> {
    classify_handle(pt, element, &measurer(), &EditorConfig::default())
}

// =============================================================
// Handle
// =============================================================

#[test]
fn handle_edges_per_variant() {
    assert!(Handle::Nw.moves_left() && Handle::Nw.moves_top());
    assert!(Handle::Se.moves_right() && Handle::Se.moves_bottom());
    assert!(!Handle::N.moves_left() && !Handle::N.moves_right());
    assert!(!Handle::E.moves_top() && !Handle::E.moves_bottom());
}

#[test]
fn handle_all_lists_each_once() {
    for (i, a) in Handle::ALL.iter().enumerate() {
        for (j, b) in Handle::ALL.iter().enumerate() {
            assert_eq!(i == j, a == b);
        }
    }
}

#[test]
fn handle_positions_on_bounds() {
    let b = Rect::new(10.0, 20.0, 100.0, 50.0);
    assert_eq!(Handle::Nw.position(b), Point::new(10.0, 20.0));
    assert_eq!(Handle::Se.position(b), Point::new(110.0, 70.0));
    assert_eq!(Handle::N.position(b), Point::new(60.0, 20.0));
    assert_eq!(Handle::W.position(b), Point::new(10.0, 45.0));
}

#[test]
fn hit_part_cursors() {
    assert_eq!(HitPart::Move.cursor(), Cursor::Move);
    assert_eq!(HitPart::Rotate.cursor(), Cursor::Grab);
    assert_eq!(HitPart::Resize(Handle::Sw).cursor(), Cursor::Resize(Handle::Sw));
}

// =============================================================
// Bounds and containment
// =============================================================

#[test]
fn text_bounds_use_measured_width() {
    // 5 chars * 24 * 0.6 = 72 wide, centered on x
    let b = element_bounds(&hello(), &measurer());
    assert!((b.width - 72.0).abs() < 1e-9);
    assert!((b.x - 364.0).abs() < 1e-9);
    assert_eq!((b.y, b.height), (288.0, 24.0));
}

#[test]
fn shape_bounds_are_stored_box() {
    let e = Element::rectangle(5.0, 6.0, 70.0, 80.0);
    assert_eq!(element_bounds(&e, &measurer()), Rect::new(5.0, 6.0, 70.0, 80.0));
}

#[test]
fn circle_contains_uses_radius() {
    let e = Element::circle(0.0, 0.0, 100.0, 100.0);
    assert!(element_contains(&e, Point::new(50.0, 5.0), &measurer()));
    assert!(!element_contains(&e, Point::new(5.0, 5.0), &measurer()));
}

#[test]
fn circle_radius_uses_shorter_side() {
    let e = Element::circle(0.0, 0.0, 200.0, 100.0);
    assert!(element_contains(&e, Point::new(100.0, 50.0), &measurer()));
    assert!(!element_contains(&e, Point::new(160.0, 50.0), &measurer()));
}

// =============================================================
// find_element_at
// =============================================================

#[test]
fn centered_text_is_hit_at_its_anchor() {
    let e = hello();
    let id = e.id;
    let doc = doc_with(vec![e]);
    assert_eq!(find_element_at(Point::new(400.0, 300.0), &doc, &measurer()), Some(id));
    assert_eq!(find_element_at(Point::new(1000.0, 1000.0), &doc, &measurer()), None);
}

#[test]
fn topmost_element_wins() {
    let back = Element::rectangle(0.0, 0.0, 100.0, 100.0);
    let front = Element::rectangle(50.0, 50.0, 100.0, 100.0);
    let (back_id, front_id) = (back.id, front.id);
    let doc = doc_with(vec![back, front]);
    assert_eq!(find_element_at(Point::new(75.0, 75.0), &doc, &measurer()), Some(front_id));
    assert_eq!(find_element_at(Point::new(25.0, 25.0), &doc, &measurer()), Some(back_id));
}

#[test]
fn empty_doc_hits_nothing() {
    let doc = Certificate::default();
    assert_eq!(find_element_at(Point::new(0.0, 0.0), &doc, &measurer()), None);
}

// =============================================================
// classify_handle
// =============================================================

#[test]
fn rotate_handle_sits_above_top_center() {
    let b = Rect::new(100.0, 100.0, 100.0, 100.0);
    assert_eq!(rotate_handle_position(b, 25.0), Point::new(150.0, 75.0));
}

#[test]
fn classify_rotate_handle() {
    let e = Element::rectangle(100.0, 100.0, 100.0, 100.0);
    assert_eq!(classify(Point::new(150.0, 75.0), &e), Some(HitPart::Rotate));
    assert_eq!(classify(Point::new(150.0, 84.0), &e), Some(HitPart::Rotate));
}

#[test]
fn classify_corner_and_edge_handles() {
    let e = Element::rectangle(100.0, 100.0, 100.0, 100.0);
    assert_eq!(classify(Point::new(105.0, 95.0), &e), Some(HitPart::Resize(Handle::Nw)));
    assert_eq!(classify(Point::new(200.0, 200.0), &e), Some(HitPart::Resize(Handle::Se)));
    assert_eq!(classify(Point::new(150.0, 105.0), &e), Some(HitPart::Resize(Handle::N)));
    assert_eq!(classify(Point::new(208.0, 150.0), &e), Some(HitPart::Resize(Handle::E)));
}

#[test]
fn classify_body_and_outside() {
    let e = Element::rectangle(100.0, 100.0, 100.0, 100.0);
    assert_eq!(classify(Point::new(150.0, 150.0), &e), Some(HitPart::Move));
    assert_eq!(classify(Point::new(250.0, 250.0), &e), None);
    // between rotate handle and top edge
    assert_eq!(classify(Point::new(150.0, 88.0), &e), None);
}

#[test]
fn classify_prefers_corners_on_small_elements() {
    let e = Element::rectangle(0.0, 0.0, 20.0, 20.0);
    assert_eq!(classify(Point::new(8.0, 0.0), &e), Some(HitPart::Resize(Handle::Nw)));
}

#[test]
fn classify_text_uses_measured_bounds() {
    let e = hello();
    assert_eq!(classify(Point::new(364.0, 288.0), &e), Some(HitPart::Resize(Handle::Nw)));
    assert_eq!(classify(Point::new(400.0, 300.0), &e), Some(HitPart::Move));
}

#[test]
fn classify_respects_configured_threshold() {
    let e = Element::rectangle(100.0, 100.0, 100.0, 100.0);
    let tight = EditorConfig { handle_threshold: 2.0, ..EditorConfig::default() };
    assert_eq!(
        classify_handle(Point::new(105.0, 105.0), &e, &measurer(), &tight),
        Some(HitPart::Move)
    );
}
