#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::TextProps;
use crate::text::EstimatedMeasurer;

struct Fixture {
    doc: Certificate,
    config: EditorConfig,
    gesture: Gesture,
    ui: UiState,
    background_ready: bool,
}

impl Fixture {
    fn new() -> Self {
        Self {
            doc: Certificate::default(),
            config: EditorConfig::default(),
            gesture: Gesture::Idle,
            ui: UiState::default(),
            background_ready: false,
        }
    }

    fn draw(&self) -> Vec<DrawCommand> {
        let view = RenderView {
            ui: self.ui,
            gesture: &self.gesture,
            background_ready: self.background_ready,
            config: &self.config,
        };
        render(&self.doc, &view, &EstimatedMeasurer::default())
    }
}

fn count(cmds: &[DrawCommand], pred: impl Fn(&DrawCommand) -> bool) -> usize {
    cmds.iter().filter(|&c| pred(c)).count()
}

fn is_outline(c: &DrawCommand) -> bool {
    matches!(c, DrawCommand::Outline { .. })
}

// =============================================================
// Background
// =============================================================

#[test]
fn empty_scene_is_just_background_fill() {
    let f = Fixture::new();
    let cmds = f.draw();
    assert_eq!(
        cmds,
        vec![DrawCommand::FillBackground { width: 800.0, height: 600.0, color: "#FFFFFF".to_owned() }]
    );
}

#[test]
fn background_image_drawn_only_when_ready() {
    let mut f = Fixture::new();
    f.doc.background_image = Some("bg.png".to_owned());
    assert_eq!(count(&f.draw(), |c| matches!(c, DrawCommand::BackgroundImage { .. })), 0);

    f.background_ready = true;
    let cmds = f.draw();
    assert!(matches!(cmds[0], DrawCommand::FillBackground { .. }));
    assert_eq!(cmds[1], DrawCommand::BackgroundImage { width: 800.0, height: 600.0 });
}

#[test]
fn ready_flag_without_url_draws_no_image() {
    let mut f = Fixture::new();
    f.background_ready = true;
    assert_eq!(f.draw().len(), 1);
}

// =============================================================
// Elements
// =============================================================

#[test]
fn elements_follow_z_order() {
    let mut f = Fixture::new();
    f.doc.push(Element::rectangle(0.0, 0.0, 50.0, 50.0));
    f.doc.push(Element::circle(10.0, 10.0, 40.0, 20.0));
    let cmds = f.draw();
    assert_eq!(cmds.len(), 3);
    assert!(matches!(cmds[1], DrawCommand::Rect { .. }));
    match &cmds[2] {
        DrawCommand::Circle { center, radius, .. } => {
            assert_eq!(*center, Point::new(30.0, 20.0));
            assert_eq!(*radius, 10.0);
        }
        other => panic!("expected circle, got {other:?}"),
    }
}

#[test]
fn rect_radius_capped_at_half_short_side() {
    let mut f = Fixture::new();
    let mut e = Element::rectangle(0.0, 0.0, 100.0, 40.0);
    if let ElementKind::Rectangle { border_radius, .. } = &mut e.kind {
        *border_radius = 50.0;
    }
    e.set_rotation(30.0);
    f.doc.push(e);
    match &f.draw()[1] {
        DrawCommand::Rect { radius, rotation, .. } => {
            assert_eq!(*radius, 20.0);
            assert_eq!(*rotation, 30.0);
        }
        other => panic!("expected rect, got {other:?}"),
    }
}

#[test]
fn text_command_carries_style() {
    let mut f = Fixture::new();
    let props = TextProps {
        content: "Hello".to_owned(),
        text_decoration: TextDecoration::Underline,
        ..TextProps::default()
    };
    f.doc.push(Element::text(400.0, 300.0, props));
    match &f.draw()[1] {
        DrawCommand::Text { anchor, bounds, content, font, align, decoration, .. } => {
            assert_eq!(*anchor, Point::new(400.0, 300.0));
            assert_eq!((bounds.y, bounds.height), (288.0, 24.0));
            assert_eq!(content, "Hello");
            assert_eq!(font, "normal normal 24px Arial");
            assert_eq!(*align, TextAlign::Center);
            assert_eq!(*decoration, TextDecoration::Underline);
        }
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn element_being_edited_is_skipped() {
    let mut f = Fixture::new();
    let id = f.doc.add_text();
    f.doc.push(Element::rectangle(0.0, 0.0, 50.0, 50.0));
    f.gesture = Gesture::EditingText { id, buffer: String::new() };
    let cmds = f.draw();
    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::Text { .. })), 0);
    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::Rect { .. })), 1);
}

// =============================================================
// Decorations
// =============================================================

#[test]
fn selection_draws_outline_handles_and_rotate_handle() {
    let mut f = Fixture::new();
    let id = f.doc.push(Element::rectangle(100.0, 100.0, 100.0, 100.0));
    f.ui.selected_id = Some(id);
    let cmds = f.draw();

    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::Handle { .. })), 8);
    assert!(cmds.contains(&DrawCommand::Outline {
        bounds: Rect::new(100.0, 100.0, 100.0, 100.0),
        color: "#4F46E5".to_owned(),
        line_width: 2.0,
        dash: None,
    }));
    assert!(cmds.contains(&DrawCommand::Connector {
        from: Point::new(150.0, 100.0),
        to: Point::new(150.0, 75.0),
        color: "#4F46E5".to_owned(),
    }));
    assert_eq!(
        cmds.last(),
        Some(&DrawCommand::RotateHandle { center: Point::new(150.0, 75.0), radius: 4.0, color: "#4F46E5".to_owned() })
    );
}

#[test]
fn hover_outline_is_dashed() {
    let mut f = Fixture::new();
    let id = f.doc.push(Element::rectangle(0.0, 0.0, 50.0, 50.0));
    f.ui.hover_id = Some(id);
    let cmds = f.draw();
    assert_eq!(
        cmds.last(),
        Some(&DrawCommand::Outline {
            bounds: Rect::new(0.0, 0.0, 50.0, 50.0),
            color: "#94A3B8".to_owned(),
            line_width: 1.0,
            dash: Some(5.0),
        })
    );
}

#[test]
fn hover_on_selection_draws_single_outline() {
    let mut f = Fixture::new();
    let id = f.doc.push(Element::rectangle(0.0, 0.0, 50.0, 50.0));
    f.ui.selected_id = Some(id);
    f.ui.hover_id = Some(id);
    assert_eq!(count(&f.draw(), is_outline), 1);
}

#[test]
fn hover_and_selection_on_different_elements() {
    let mut f = Fixture::new();
    let a = f.doc.push(Element::rectangle(0.0, 0.0, 50.0, 50.0));
    let b = f.doc.push(Element::rectangle(100.0, 0.0, 50.0, 50.0));
    f.ui.selected_id = Some(a);
    f.ui.hover_id = Some(b);
    let cmds = f.draw();
    assert_eq!(count(&cmds, is_outline), 2);
    // hover outline comes before the selection layer
    let first_outline = cmds.iter().position(is_outline).expect("outline");
    assert!(matches!(cmds[first_outline], DrawCommand::Outline { dash: Some(_), .. }));
}

#[test]
fn dangling_ids_draw_no_decorations() {
    let mut f = Fixture::new();
    f.ui.selected_id = Some(uuid::Uuid::new_v4());
    f.ui.hover_id = Some(uuid::Uuid::new_v4());
    assert_eq!(f.draw().len(), 1);
}

#[test]
fn configured_colors_are_used() {
    let mut f = Fixture::new();
    f.config.accent_color = "red".to_owned();
    let id = f.doc.push(Element::rectangle(0.0, 0.0, 50.0, 50.0));
    f.ui.selected_id = Some(id);
    assert!(
        f.draw()
            .iter()
            .any(|c| matches!(c, DrawCommand::Handle { color, .. } if color == "red"))
    );
}

// =============================================================
// Export
// =============================================================

#[test]
fn export_omits_decorations() {
    let mut doc = Certificate::default();
    doc.background_image = Some("bg.png".to_owned());
    doc.add_text();
    doc.add_shape(crate::doc::ShapeKind::Rectangle);
    let cmds = render_export(&doc, true, &EstimatedMeasurer::default());
    assert_eq!(cmds.len(), 4);
    assert_eq!(count(&cmds, is_outline), 0);
    assert_eq!(count(&cmds, |c| matches!(c, DrawCommand::Handle { .. })), 0);
}
