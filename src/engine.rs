use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::background::{BackgroundLoader, HtmlImageResolver, SyncStep, load_background};
use crate::config::EditorConfig;
use crate::doc::{Certificate, Element, ElementId, ElementPatch, ShapeKind};
use crate::error::EditorError;
use crate::history::History;
use crate::hit::{self, HitPart};
use crate::host::{DocumentStore, StoreError};
use crate::input::{Cursor, Gesture, Key, Modifiers, Shortcut, UiState};
use crate::paint::{self, CanvasMeasurer, ExportError};
use crate::render::{self, DrawCommand, RenderView};
use crate::text::{EstimatedMeasurer, TextMeasurer};
use crate::transform;
use crate::viewport::{Point, Rect, Viewport};
use crate::zorder;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers and commands for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The canvas should be repainted.
    RenderNeeded,
    SelectionChanged(Option<ElementId>),
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// A committed change the host may want to persist.
    DocumentChanged,
    SetCursor(Cursor),
    /// Show the inline text editor over the element. `bounds` are in client
    /// (CSS pixel) coordinates.
    BeginTextEdit { id: ElementId, text: String, bounds: Rect },
    /// Hide the inline text editor.
    EndTextEdit { id: ElementId },
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    doc: Certificate,
    history: History<Certificate>,
    ui: UiState,
    gesture: Gesture,
    /// Element as it was at pointer-down, for change detection and abort.
    gesture_origin: Option<Element>,
    pub viewport: Viewport,
    pub config: EditorConfig,
    measurer: Box<dyn TextMeasurer>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let doc = Certificate::default();
        let viewport = Viewport::unscaled(f64::from(doc.width), f64::from(doc.height));
        Self {
            history: History::new(doc.clone(), config.history_limit),
            doc,
            ui: UiState::default(),
            gesture: Gesture::Idle,
            gesture_origin: None,
            viewport,
            config,
            measurer: Box::new(EstimatedMeasurer::default()),
        }
    }

    /// Replace the text measurer used for hit-testing and rendering.
    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
    }

    // --- Document lifecycle ---

    /// Start editing `doc`. Selection, gesture and history are reset; the
    /// loaded document becomes the undo baseline.
    pub fn load_document(&mut self, doc: Certificate) -> Vec<Action> {
        tracing::debug!(elements = doc.len(), "document loaded");
        self.history.reset(doc.clone());
        self.doc = doc;
        self.gesture = Gesture::Idle;
        self.gesture_origin = None;
        self.ui.hover_id = None;
        let mut actions = self.set_selection(None);
        actions.extend(self.set_cursor(Cursor::Default));
        actions.push(self.history_changed());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Load a document from `store` and start editing it.
    ///
    /// # Errors
    ///
    /// Propagates the store's error; the current document is kept.
    pub async fn open_from<S: DocumentStore>(&mut self, store: &S, id: &str) -> Result<Vec<Action>, StoreError> {
        let doc = store.load_document(id).await?;
        Ok(self.load_document(doc))
    }

    /// Save the current document to `store`. An uncommitted text edit is not
    /// included.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn save_to<S: DocumentStore>(&self, store: &S, id: &str) -> Result<(), StoreError> {
        store.save_document(id, &self.doc).await?;
        tracing::debug!(id, "document saved");
        Ok(())
    }

    // --- Pointer input ---

    /// Pointer pressed at a client-space position.
    pub fn on_pointer_down(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.gesture.is_pointer_gesture() {
            tracing::warn!(err = %EditorError::GestureActive, "pointer down ignored");
            return Vec::new();
        }
        let pt = self.viewport.screen_to_scene(screen_pt);
        let mut actions = self.commit_text_edit();

        let target = hit::find_element_at(pt, &self.doc, self.measurer.as_ref());
        if let Some(selected) = self.selected_element().cloned() {
            let part = hit::classify_handle(pt, &selected, self.measurer.as_ref(), &self.config);
            let start = match part {
                Some(HitPart::Rotate) => {
                    let center = hit::element_bounds(&selected, self.measurer.as_ref()).center();
                    let angle_offset = transform::pointer_angle(center, pt) - selected.rotation;
                    Some((Gesture::Rotating { id: selected.id, center, angle_offset }, Cursor::Grabbing))
                }
                Some(HitPart::Resize(handle)) => {
                    Some((Gesture::Resizing { id: selected.id, handle }, Cursor::Resize(handle)))
                }
                Some(HitPart::Move) if target.is_none() || target == Some(selected.id) => {
                    let pointer_offset = Point::new(pt.x - selected.x, pt.y - selected.y);
                    Some((Gesture::Dragging { id: selected.id, pointer_offset }, Cursor::Move))
                }
                Some(HitPart::Move) | None => None,
            };
            if let Some((gesture, cursor)) = start {
                tracing::debug!(?gesture, "gesture started");
                self.gesture = gesture;
                self.gesture_origin = Some(selected);
                actions.extend(self.set_cursor(cursor));
                return actions;
            }
        }

        actions.extend(self.set_selection(target));
        actions.extend(self.refresh_hover(pt));
        actions
    }

    /// Pointer moved to a client-space position.
    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let pt = self.viewport.screen_to_scene(screen_pt);
        let id = match &self.gesture {
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } | Gesture::Rotating { id, .. } => *id,
            Gesture::Idle | Gesture::EditingText { .. } => return self.refresh_hover(pt),
        };
        let Some(element) = self.doc.get_mut(&id) else {
            return self.abort_stale(id);
        };
        match &self.gesture {
            Gesture::Dragging { pointer_offset, .. } => transform::apply_drag(element, pt, *pointer_offset),
            Gesture::Resizing { handle, .. } => transform::apply_resize(element, *handle, pt, &self.config),
            Gesture::Rotating { center, angle_offset, .. } => {
                transform::apply_rotate(element, *center, *angle_offset, pt);
            }
            Gesture::Idle | Gesture::EditingText { .. } => {}
        }
        vec![Action::RenderNeeded]
    }

    /// Pointer released at a client-space position.
    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Vec<Action> {
        let pt = self.viewport.screen_to_scene(screen_pt);
        let mut actions = self.end_pointer_gesture();
        actions.extend(self.refresh_hover(pt));
        actions
    }

    /// Pointer left the canvas. An active gesture is committed.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let mut actions = self.end_pointer_gesture();
        if self.ui.hover_id.take().is_some() {
            actions.push(Action::RenderNeeded);
        }
        actions.extend(self.set_cursor(Cursor::Default));
        actions
    }

    /// Double-click at a client-space position. Opens the inline editor on a
    /// text element.
    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.gesture.is_pointer_gesture() {
            return Vec::new();
        }
        let pt = self.viewport.screen_to_scene(screen_pt);
        let mut actions = self.commit_text_edit();
        let Some(id) = hit::find_element_at(pt, &self.doc, self.measurer.as_ref()) else {
            return actions;
        };
        match self.begin_text_edit(id) {
            Ok(more) => actions.extend(more),
            Err(err) => tracing::debug!(%err, "double click not on text"),
        }
        actions
    }

    // --- Text editing ---

    /// Open the inline editor on a text element.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`] for an unknown id,
    /// [`EditorError::NotText`] for a shape, and
    /// [`EditorError::GestureActive`] during a drag, resize or rotate.
    pub fn begin_text_edit(&mut self, id: ElementId) -> Result<Vec<Action>, EditorError> {
        let mut actions = self.prepare_command()?;
        let element = self.doc.get(&id).ok_or(EditorError::ElementNotFound(id))?;
        let text = element.as_text().ok_or(EditorError::NotText(id))?.content.clone();
        let scene = hit::element_bounds(element, self.measurer.as_ref());
        let top_left = self.viewport.scene_to_screen(Point::new(scene.x, scene.y));
        let bottom_right = self.viewport.scene_to_screen(Point::new(scene.right(), scene.bottom()));
        let bounds = Rect::new(top_left.x, top_left.y, bottom_right.x - top_left.x, bottom_right.y - top_left.y);

        tracing::debug!(%id, "text edit started");
        self.gesture = Gesture::EditingText { id, buffer: text.clone() };
        actions.extend(self.set_selection(Some(id)));
        actions.push(Action::BeginTextEdit { id, text, bounds });
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// The overlay's content changed.
    pub fn on_text_input(&mut self, text: &str) {
        if let Gesture::EditingText { buffer, .. } = &mut self.gesture {
            text.clone_into(buffer);
        }
    }

    /// Write the overlay's buffer into the element (blur or Enter).
    pub fn commit_text_edit(&mut self) -> Vec<Action> {
        let Gesture::EditingText { id, buffer } = std::mem::take(&mut self.gesture) else {
            return Vec::new();
        };
        let mut actions = vec![Action::EndTextEdit { id }, Action::RenderNeeded];
        let changed = self.doc.get(&id).map(|e| e.as_text().is_some_and(|t| t.content != buffer));
        match changed {
            Some(true) => {
                let patch = ElementPatch { content: Some(buffer), ..ElementPatch::default() };
                self.doc.apply_patch(&id, &patch, self.config.min_size);
                tracing::debug!(%id, "text edit committed");
                actions.extend(self.commit("text edit"));
            }
            Some(false) => tracing::debug!(%id, "text edit unchanged"),
            None => tracing::warn!(err = %EditorError::ElementNotFound(id), "edited element vanished; edit dropped"),
        }
        actions
    }

    /// Close the overlay and discard its buffer (Escape).
    pub fn cancel_text_edit(&mut self) -> Vec<Action> {
        let Gesture::EditingText { id, .. } = std::mem::take(&mut self.gesture) else {
            return Vec::new();
        };
        tracing::debug!(%id, "text edit cancelled");
        vec![Action::EndTextEdit { id }, Action::RenderNeeded]
    }

    // --- Keyboard ---

    /// Key pressed. `text_input_focused` is true while a host input field
    /// (not the inline editor) has focus; shortcuts are suppressed then.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers, text_input_focused: bool) -> Vec<Action> {
        if self.gesture.editing_id().is_some() {
            return match key.0.as_str() {
                "Enter" if !modifiers.shift => self.commit_text_edit(),
                "Escape" => self.cancel_text_edit(),
                _ => Vec::new(),
            };
        }
        if text_input_focused {
            return Vec::new();
        }
        let Some(shortcut) = Shortcut::from_key(key, modifiers) else {
            return Vec::new();
        };
        tracing::debug!(?shortcut, "shortcut");
        let selected = self.ui.selected_id;
        let result = match (shortcut, selected) {
            (Shortcut::Undo, _) => Ok(self.undo()),
            (Shortcut::Redo, _) => Ok(self.redo()),
            (Shortcut::Duplicate, Some(id)) => self.duplicate(&id),
            (Shortcut::Delete, Some(id)) => self.remove(&id),
            (Shortcut::Duplicate | Shortcut::Delete, None) => Ok(Vec::new()),
        };
        result.unwrap_or_else(|err| {
            tracing::warn!(%err, ?shortcut, "shortcut rejected");
            Vec::new()
        })
    }

    // --- Commands ---

    /// Add a default text element at the canvas center and select it.
    ///
    /// # Errors
    ///
    /// [`EditorError::GestureActive`] during a drag, resize or rotate.
    pub fn add_text_element(&mut self) -> Result<Vec<Action>, EditorError> {
        let mut actions = self.prepare_command()?;
        let id = self.doc.add_text();
        tracing::debug!(%id, "text element added");
        actions.extend(self.commit("add text"));
        actions.extend(self.set_selection(Some(id)));
        Ok(actions)
    }

    /// Add a default shape centered on the canvas and select it.
    ///
    /// # Errors
    ///
    /// [`EditorError::GestureActive`] during a drag, resize or rotate.
    pub fn add_shape(&mut self, kind: ShapeKind) -> Result<Vec<Action>, EditorError> {
        let mut actions = self.prepare_command()?;
        let id = self.doc.add_shape(kind);
        tracing::debug!(%id, ?kind, "shape added");
        actions.extend(self.commit("add shape"));
        actions.extend(self.set_selection(Some(id)));
        Ok(actions)
    }

    /// Apply a property-panel patch. Records history only if something changed.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`] or [`EditorError::GestureActive`].
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> Result<Vec<Action>, EditorError> {
        let mut actions = self.prepare_command()?;
        let element = self.doc.get_mut(id).ok_or(EditorError::ElementNotFound(*id))?;
        let before = element.clone();
        patch.apply_to(element, self.config.min_size);
        if *element != before {
            actions.extend(self.commit("update element"));
        }
        Ok(actions)
    }

    /// # Errors
    ///
    /// [`EditorError::GestureActive`] during a drag, resize or rotate.
    pub fn set_background_color(&mut self, color: &str) -> Result<Vec<Action>, EditorError> {
        let mut actions = self.prepare_command()?;
        if self.doc.background_color != color {
            color.clone_into(&mut self.doc.background_color);
            actions.extend(self.commit("background color"));
        }
        Ok(actions)
    }

    /// Set or clear the background image URL. Loading is driven by
    /// [`Engine`]; the renderer uses the flat color until the image is ready.
    ///
    /// # Errors
    ///
    /// [`EditorError::GestureActive`] during a drag, resize or rotate.
    pub fn set_background_image(&mut self, url: Option<String>) -> Result<Vec<Action>, EditorError> {
        let mut actions = self.prepare_command()?;
        if self.doc.background_image != url {
            self.doc.background_image = url;
            actions.extend(self.commit("background image"));
        }
        Ok(actions)
    }

    /// Select an element, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`] or [`EditorError::GestureActive`].
    pub fn select(&mut self, id: Option<ElementId>) -> Result<Vec<Action>, EditorError> {
        if let Some(id) = id
            && !self.doc.contains(&id)
        {
            return Err(EditorError::ElementNotFound(id));
        }
        let mut actions = self.prepare_command()?;
        actions.extend(self.set_selection(id));
        Ok(actions)
    }

    /// Move an element one step toward the front.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`] or [`EditorError::GestureActive`].
    pub fn send_upwards(&mut self, id: &ElementId) -> Result<Vec<Action>, EditorError> {
        let mut actions = self.prepare_command()?;
        if zorder::send_upwards(&mut self.doc, id)? {
            actions.extend(self.commit("send upwards"));
        }
        Ok(actions)
    }

    /// Move an element one step toward the back.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`] or [`EditorError::GestureActive`].
    pub fn send_downwards(&mut self, id: &ElementId) -> Result<Vec<Action>, EditorError> {
        let mut actions = self.prepare_command()?;
        if zorder::send_downwards(&mut self.doc, id)? {
            actions.extend(self.commit("send downwards"));
        }
        Ok(actions)
    }

    /// Copy an element above itself, offset by `config.duplicate_offset`, and
    /// select the copy.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`] or [`EditorError::GestureActive`].
    pub fn duplicate(&mut self, id: &ElementId) -> Result<Vec<Action>, EditorError> {
        let mut actions = self.prepare_command()?;
        let copy = zorder::duplicate(&mut self.doc, id, self.config.duplicate_offset)?;
        tracing::debug!(%id, %copy, "element duplicated");
        actions.extend(self.commit("duplicate"));
        actions.extend(self.set_selection(Some(copy)));
        Ok(actions)
    }

    /// Delete an element, clearing selection and hover that point at it.
    ///
    /// A drag, resize or rotate in progress is abandoned first, so its
    /// partial geometry is never committed.
    ///
    /// # Errors
    ///
    /// [`EditorError::ElementNotFound`].
    pub fn remove(&mut self, id: &ElementId) -> Result<Vec<Action>, EditorError> {
        if !self.doc.contains(id) {
            return Err(EditorError::ElementNotFound(*id));
        }
        let mut actions = if self.gesture.is_pointer_gesture() { self.interrupt() } else { self.prepare_command()? };
        zorder::remove(&mut self.doc, id)?;
        tracing::debug!(%id, "element removed");
        actions.extend(self.commit("remove"));
        actions.extend(self.prune_ui());
        Ok(actions)
    }

    /// Step back one snapshot. Any gesture in progress is abandoned first.
    pub fn undo(&mut self) -> Vec<Action> {
        let mut actions = self.interrupt();
        let Some(snapshot) = self.history.undo().cloned() else {
            tracing::debug!("nothing to undo");
            return actions;
        };
        actions.extend(self.restore(snapshot));
        actions
    }

    /// Step forward one snapshot. Any gesture in progress is abandoned first.
    pub fn redo(&mut self) -> Vec<Action> {
        let mut actions = self.interrupt();
        let Some(snapshot) = self.history.redo().cloned() else {
            tracing::debug!("nothing to redo");
            return actions;
        };
        actions.extend(self.restore(snapshot));
        actions
    }

    // --- Rendering ---

    /// Draw commands for the current state.
    #[must_use]
    pub fn render_commands(&self, background_ready: bool) -> Vec<DrawCommand> {
        let view = RenderView { ui: self.ui, gesture: &self.gesture, background_ready, config: &self.config };
        render::render(&self.doc, &view, self.measurer.as_ref())
    }

    // --- Queries ---

    #[must_use]
    pub fn document(&self) -> &Certificate {
        &self.doc
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.ui.selected_id
    }

    #[must_use]
    pub fn hover(&self) -> Option<ElementId> {
        self.ui.hover_id
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.ui.cursor
    }

    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    #[must_use]
    pub fn history(&self) -> &History<Certificate> {
        &self.history
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Map the canvas's on-page rectangle (client coordinates) onto the
    /// document. The backing store always matches the document size.
    pub fn fit_viewport(&mut self, display: Rect) {
        self.viewport = Viewport {
            left: display.x,
            top: display.y,
            display_width: display.width,
            display_height: display.height,
            backing_width: f64::from(self.doc.width),
            backing_height: f64::from(self.doc.height),
        };
    }

    // --- Internals ---

    fn selected_element(&self) -> Option<&Element> {
        self.ui.selected_id.and_then(|id| self.doc.get(&id))
    }

    /// Gate for host commands: rejected during pointer gestures, and an open
    /// text edit is committed first.
    fn prepare_command(&mut self) -> Result<Vec<Action>, EditorError> {
        if self.gesture.is_pointer_gesture() {
            return Err(EditorError::GestureActive);
        }
        Ok(self.commit_text_edit())
    }

    fn commit(&mut self, reason: &'static str) -> Vec<Action> {
        self.history.commit(self.doc.clone());
        tracing::debug!(reason, snapshots = self.history.len(), "history commit");
        vec![self.history_changed(), Action::DocumentChanged, Action::RenderNeeded]
    }

    fn history_changed(&self) -> Action {
        Action::HistoryChanged { can_undo: self.history.can_undo(), can_redo: self.history.can_redo() }
    }

    fn restore(&mut self, snapshot: Certificate) -> Vec<Action> {
        self.doc = snapshot;
        let mut actions = self.prune_ui();
        actions.push(self.history_changed());
        actions.push(Action::DocumentChanged);
        actions.push(Action::RenderNeeded);
        actions
    }

    fn set_selection(&mut self, id: Option<ElementId>) -> Vec<Action> {
        if self.ui.selected_id == id {
            return Vec::new();
        }
        self.ui.selected_id = id;
        vec![Action::SelectionChanged(id), Action::RenderNeeded]
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Vec<Action> {
        if self.ui.cursor == cursor {
            return Vec::new();
        }
        self.ui.cursor = cursor;
        vec![Action::SetCursor(cursor)]
    }

    /// Drop selection and hover ids that no longer resolve.
    fn prune_ui(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.ui.hover_id.is_some_and(|id| !self.doc.contains(&id)) {
            self.ui.hover_id = None;
        }
        if self.ui.selected_id.is_some_and(|id| !self.doc.contains(&id)) {
            actions.extend(self.set_selection(None));
        }
        actions
    }

    /// Re-run hit testing for hover and cursor feedback.
    fn refresh_hover(&mut self, pt: Point) -> Vec<Action> {
        let hover = hit::find_element_at(pt, &self.doc, self.measurer.as_ref());
        let mut actions = Vec::new();
        if hover != self.ui.hover_id {
            self.ui.hover_id = hover;
            actions.push(Action::RenderNeeded);
        }
        let cursor = self.cursor_at(pt, hover);
        actions.extend(self.set_cursor(cursor));
        actions
    }

    fn cursor_at(&self, pt: Point, hover: Option<ElementId>) -> Cursor {
        if let Some(selected) = self.selected_element() {
            match hit::classify_handle(pt, selected, self.measurer.as_ref(), &self.config) {
                Some(HitPart::Move) if hover.is_some_and(|h| h != selected.id) => return Cursor::Pointer,
                Some(part) => return part.cursor(),
                None => {}
            }
        }
        if hover.is_some() { Cursor::Pointer } else { Cursor::Default }
    }

    /// Finish a drag, resize or rotate, committing if the element changed.
    fn end_pointer_gesture(&mut self) -> Vec<Action> {
        if !self.gesture.is_pointer_gesture() {
            return Vec::new();
        }
        let gesture = std::mem::take(&mut self.gesture);
        let origin = self.gesture_origin.take();
        let Some(id) = gesture.element_id() else {
            return Vec::new();
        };
        let Some(element) = self.doc.get(&id) else {
            tracing::warn!(err = %EditorError::ElementNotFound(id), "gesture element vanished; aborted");
            return vec![Action::RenderNeeded];
        };
        if origin.as_ref() == Some(element) {
            tracing::debug!(?gesture, "gesture ended without change");
            return Vec::new();
        }
        tracing::debug!(?gesture, "gesture committed");
        self.commit("gesture")
    }

    /// The gesture's element no longer exists: return to Idle without committing.
    fn abort_stale(&mut self, id: ElementId) -> Vec<Action> {
        tracing::warn!(err = %EditorError::ElementNotFound(id), "gesture element vanished; aborted");
        self.gesture = Gesture::Idle;
        self.gesture_origin = None;
        let mut actions = self.set_cursor(Cursor::Default);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Abandon any gesture: a pointer gesture's element is put back as it was
    /// at pointer-down, and an open text edit is discarded.
    fn interrupt(&mut self) -> Vec<Action> {
        if self.gesture.editing_id().is_some() {
            return self.cancel_text_edit();
        }
        if !self.gesture.is_pointer_gesture() {
            return Vec::new();
        }
        tracing::debug!(gesture = ?self.gesture, "gesture interrupted");
        self.gesture = Gesture::Idle;
        if let Some(origin) = self.gesture_origin.take()
            && let Some(element) = self.doc.get_mut(&origin.id)
        {
            *element = origin;
        }
        self.set_cursor(Cursor::Default)
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas,
/// its 2D context and the background image loader.
///
/// Every mutation goes through `Engine` so the canvas size, viewport and
/// background image stay in step with the document.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    background: Rc<RefCell<BackgroundLoader<HtmlImageElement>>>,
    on_background_ready: Option<js_sys::Function>,
    core: EngineCore,
}

impl Engine {
    /// Create an engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, config: EditorConfig) -> Result<Self, JsValue> {
        let ctx = paint::context_2d(&canvas)?;
        let mut core = EngineCore::new(config);
        core.set_measurer(Box::new(CanvasMeasurer::new(ctx.clone())));
        Ok(Self {
            canvas,
            ctx,
            background: Rc::new(RefCell::new(BackgroundLoader::new())),
            on_background_ready: None,
            core,
        })
    }

    /// Called with no arguments when a background image finishes loading, so
    /// the host can repaint.
    pub fn set_on_background_ready(&mut self, callback: js_sys::Function) {
        self.on_background_ready = Some(callback);
    }

    /// Read-only access to the engine state and its queries.
    #[must_use]
    pub fn core(&self) -> &EngineCore {
        &self.core
    }

    // --- Document lifecycle ---

    /// Start editing `doc`, sizing the canvas backing store to it.
    pub fn load_document(&mut self, doc: Certificate) -> Vec<Action> {
        self.canvas.set_width(doc.width);
        self.canvas.set_height(doc.height);
        let actions = self.core.load_document(doc);
        self.sync_background();
        actions
    }

    /// Load a document from `store` and start editing it.
    ///
    /// # Errors
    ///
    /// Propagates the store's error; the current document is kept.
    pub async fn open_from<S: DocumentStore>(&mut self, store: &S, id: &str) -> Result<Vec<Action>, StoreError> {
        let doc = store.load_document(id).await?;
        Ok(self.load_document(doc))
    }

    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn save_to<S: DocumentStore>(&self, store: &S, id: &str) -> Result<(), StoreError> {
        self.core.save_to(store, id).await
    }

    // --- Input events (client coordinates) ---

    pub fn on_pointer_down(&mut self, client_pt: Point) -> Vec<Action> {
        self.sync_viewport();
        self.core.on_pointer_down(client_pt)
    }

    pub fn on_pointer_move(&mut self, client_pt: Point) -> Vec<Action> {
        self.sync_viewport();
        self.core.on_pointer_move(client_pt)
    }

    pub fn on_pointer_up(&mut self, client_pt: Point) -> Vec<Action> {
        self.sync_viewport();
        self.core.on_pointer_up(client_pt)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    pub fn on_double_click(&mut self, client_pt: Point) -> Vec<Action> {
        self.sync_viewport();
        self.core.on_double_click(client_pt)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers, text_input_focused: bool) -> Vec<Action> {
        let actions = self.core.on_key_down(key, modifiers, text_input_focused);
        self.sync_background();
        actions
    }

    // --- Text editing ---

    /// # Errors
    ///
    /// See [`EngineCore::begin_text_edit`].
    pub fn begin_text_edit(&mut self, id: ElementId) -> Result<Vec<Action>, EditorError> {
        self.sync_viewport();
        self.core.begin_text_edit(id)
    }

    pub fn on_text_input(&mut self, text: &str) {
        self.core.on_text_input(text);
    }

    pub fn commit_text_edit(&mut self) -> Vec<Action> {
        self.core.commit_text_edit()
    }

    pub fn cancel_text_edit(&mut self) -> Vec<Action> {
        self.core.cancel_text_edit()
    }

    // --- Commands ---

    /// # Errors
    ///
    /// See [`EngineCore::add_text_element`].
    pub fn add_text_element(&mut self) -> Result<Vec<Action>, EditorError> {
        self.core.add_text_element()
    }

    /// # Errors
    ///
    /// See [`EngineCore::add_shape`].
    pub fn add_shape(&mut self, kind: ShapeKind) -> Result<Vec<Action>, EditorError> {
        self.core.add_shape(kind)
    }

    /// # Errors
    ///
    /// See [`EngineCore::update_element`].
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> Result<Vec<Action>, EditorError> {
        self.core.update_element(id, patch)
    }

    /// # Errors
    ///
    /// See [`EngineCore::set_background_color`].
    pub fn set_background_color(&mut self, color: &str) -> Result<Vec<Action>, EditorError> {
        self.core.set_background_color(color)
    }

    /// # Errors
    ///
    /// See [`EngineCore::set_background_image`].
    pub fn set_background_image(&mut self, url: Option<String>) -> Result<Vec<Action>, EditorError> {
        let actions = self.core.set_background_image(url)?;
        self.sync_background();
        Ok(actions)
    }

    /// # Errors
    ///
    /// See [`EngineCore::select`].
    pub fn select(&mut self, id: Option<ElementId>) -> Result<Vec<Action>, EditorError> {
        self.core.select(id)
    }

    /// # Errors
    ///
    /// See [`EngineCore::send_upwards`].
    pub fn send_upwards(&mut self, id: &ElementId) -> Result<Vec<Action>, EditorError> {
        self.core.send_upwards(id)
    }

    /// # Errors
    ///
    /// See [`EngineCore::send_downwards`].
    pub fn send_downwards(&mut self, id: &ElementId) -> Result<Vec<Action>, EditorError> {
        self.core.send_downwards(id)
    }

    /// # Errors
    ///
    /// See [`EngineCore::duplicate`].
    pub fn duplicate(&mut self, id: &ElementId) -> Result<Vec<Action>, EditorError> {
        self.core.duplicate(id)
    }

    /// # Errors
    ///
    /// See [`EngineCore::remove`].
    pub fn remove(&mut self, id: &ElementId) -> Result<Vec<Action>, EditorError> {
        self.core.remove(id)
    }

    pub fn undo(&mut self) -> Vec<Action> {
        let actions = self.core.undo();
        self.sync_background();
        actions
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let actions = self.core.redo();
        self.sync_background();
        actions
    }

    // --- Output ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let loader = self.background.borrow();
        let bitmap = loader.bitmap_for(self.core.document().background_image.as_deref());
        let commands = self.core.render_commands(bitmap.is_some());
        paint::paint(&self.ctx, &commands, bitmap)
    }

    /// PNG bytes of the certificate at its native size, without decorations.
    ///
    /// # Errors
    ///
    /// See [`paint::export_png`].
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        let doc = self.core.document();
        let loader = self.background.borrow();
        paint::export_png(doc, loader.bitmap_for(doc.background_image.as_deref()))
    }

    // --- Internals ---

    fn sync_viewport(&mut self) {
        let rect = self.canvas.get_bounding_client_rect();
        self.core.fit_viewport(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()));
    }

    /// Start or drop the background load so the loader follows the document.
    fn sync_background(&mut self) {
        let step = self.background.borrow().sync_step(self.core.document().background_image.as_deref());
        let url = match step {
            SyncStep::Keep => return,
            SyncStep::Clear => {
                self.background.borrow_mut().clear();
                return;
            }
            SyncStep::Load(url) => url,
        };
        let loader = Rc::clone(&self.background);
        let on_ready = self.on_background_ready.clone();
        spawn_local(async move {
            if !load_background(&loader, &HtmlImageResolver, &url).await {
                return;
            }
            if let Some(callback) = on_ready
                && let Err(err) = callback.call0(&JsValue::NULL)
            {
                tracing::warn!(err = %paint::js_message(&err), "background ready callback failed");
            }
        });
    }
}
