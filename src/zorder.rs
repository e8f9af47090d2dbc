//! Layer operations on the element list.
//!
//! Paint order is list order, so moving an element up or down swaps it with
//! its neighbor. Every function returns `Ok(false)` (or the unchanged value)
//! when the operation is a no-op at a boundary, so the caller knows not to
//! record a history entry.

#[cfg(test)]
#[path = "zorder_test.rs"]
mod zorder_test;

use crate::doc::{Certificate, Element, ElementId};
use crate::error::EditorError;

fn index_of(doc: &Certificate, id: &ElementId) -> Result<usize, EditorError> {
    doc.index_of(id).ok_or(EditorError::ElementNotFound(*id))
}

/// Swap the element with the one above it.
///
/// # Errors
///
/// [`EditorError::ElementNotFound`] if `id` is not in the document.
pub fn send_upwards(doc: &mut Certificate, id: &ElementId) -> Result<bool, EditorError> {
    let idx = index_of(doc, id)?;
    if idx + 1 >= doc.elements.len() {
        return Ok(false);
    }
    doc.elements.swap(idx, idx + 1);
    Ok(true)
}

/// Swap the element with the one below it.
///
/// # Errors
///
/// [`EditorError::ElementNotFound`] if `id` is not in the document.
pub fn send_downwards(doc: &mut Certificate, id: &ElementId) -> Result<bool, EditorError> {
    let idx = index_of(doc, id)?;
    if idx == 0 {
        return Ok(false);
    }
    doc.elements.swap(idx, idx - 1);
    Ok(true)
}

/// Insert a copy directly above the original, moved by `offset`. Returns the
/// copy's id.
///
/// # Errors
///
/// [`EditorError::ElementNotFound`] if `id` is not in the document.
pub fn duplicate(doc: &mut Certificate, id: &ElementId, offset: f64) -> Result<ElementId, EditorError> {
    let idx = index_of(doc, id)?;
    let copy = doc.elements[idx].duplicated(offset);
    let copy_id = copy.id;
    doc.elements.insert(idx + 1, copy);
    Ok(copy_id)
}

/// Remove the element and return it.
///
/// # Errors
///
/// [`EditorError::ElementNotFound`] if `id` is not in the document.
pub fn remove(doc: &mut Certificate, id: &ElementId) -> Result<Element, EditorError> {
    let idx = index_of(doc, id)?;
    Ok(doc.elements.remove(idx))
}
