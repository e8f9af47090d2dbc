//! Input model: modifier keys, keyboard shortcuts, cursors, and the gesture
//! state machine.
//!
//! `Gesture` is the active interaction tracked between pointer-down and
//! pointer-up (or between double-click and blur for text editing). It carries
//! everything needed to apply incremental updates and to commit on release.
//! Exactly one variant is active at a time; `Idle` is the resting state.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::ElementId;
use crate::hit::Handle;
use crate::viewport::Point;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on Windows/Linux or Cmd on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key as reported by `KeyboardEvent.key` (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Case-insensitive comparison against a single-character key name.
    #[must_use]
    pub fn is_letter(&self, letter: char) -> bool {
        let mut chars = self.0.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.eq_ignore_ascii_case(&letter))
    }
}

/// Global editor shortcuts. The bindings are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl/Cmd+D
    Duplicate,
    /// Delete or Backspace
    Delete,
    /// Ctrl/Cmd+Z
    Undo,
    /// Ctrl/Cmd+Y or Ctrl/Cmd+Shift+Z
    Redo,
}

impl Shortcut {
    /// Resolve a key press to a shortcut, if it is bound to one.
    #[must_use]
    pub fn from_key(key: &Key, modifiers: Modifiers) -> Option<Self> {
        if modifiers.command() {
            if key.is_letter('d') {
                return Some(Self::Duplicate);
            }
            if key.is_letter('y') {
                return Some(Self::Redo);
            }
            if key.is_letter('z') {
                return Some(if modifiers.shift { Self::Redo } else { Self::Undo });
            }
            return None;
        }
        match key.0.as_str() {
            "Delete" | "Backspace" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Pointer cursor shown over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    /// Over an element that is not selected.
    Pointer,
    /// Over the body of the selected element, or dragging it.
    Move,
    /// Over the rotate handle.
    Grab,
    /// Rotating.
    Grabbing,
    Resize(Handle),
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Move => "move",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Resize(Handle::Nw | Handle::Se) => "nwse-resize",
            Self::Resize(Handle::Ne | Handle::Sw) => "nesw-resize",
            Self::Resize(Handle::N | Handle::S) => "ns-resize",
            Self::Resize(Handle::E | Handle::W) => "ew-resize",
        }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    /// The id of the currently selected element, if any.
    pub selected_id: Option<ElementId>,
    /// The id of the element under the pointer, if any.
    pub hover_id: Option<ElementId>,
    pub cursor: Cursor,
}

/// The gesture state machine.
///
/// Each active variant carries the context needed to apply pointer moves and
/// to commit on release.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving the selected element.
    Dragging {
        id: ElementId,
        /// Pointer position minus element anchor at pointer-down.
        pointer_offset: Point,
    },
    /// Resizing the selected element by one of its eight handles.
    Resizing { id: ElementId, handle: Handle },
    /// Rotating the selected element around its bounding-box center.
    Rotating {
        id: ElementId,
        /// Pivot in scene coordinates.
        center: Point,
        /// Pointer angle at pointer-down minus the element's rotation, in degrees.
        angle_offset: f64,
    },
    /// Editing a text element's content in the host's inline overlay.
    EditingText {
        id: ElementId,
        /// Uncommitted content.
        buffer: String,
    },
}

impl Gesture {
    /// The element the gesture operates on.
    #[must_use]
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. }
            | Self::Resizing { id, .. }
            | Self::Rotating { id, .. }
            | Self::EditingText { id, .. } => Some(*id),
        }
    }

    /// Whether a pointer-driven gesture (drag, resize, rotate) is active.
    #[must_use]
    pub fn is_pointer_gesture(&self) -> bool {
        matches!(self, Self::Dragging { .. } | Self::Resizing { .. } | Self::Rotating { .. })
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Id of the element being text-edited, if any.
    #[must_use]
    pub fn editing_id(&self) -> Option<ElementId> {
        match self {
            Self::EditingText { id, .. } => Some(*id),
            _ => None,
        }
    }
}
