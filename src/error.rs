//! Errors returned by editor commands.

use crate::doc::ElementId;

/// Why an editor command was rejected. A rejected command leaves the
/// document, history and UI state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),

    /// A drag, resize or rotate is in progress.
    #[error("a pointer gesture is already active")]
    GestureActive,

    #[error("element is not text: {0}")]
    NotText(ElementId),
}
