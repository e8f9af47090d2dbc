//! Contracts the host application implements for the editor.
//!
//! Persistence lives outside the engine: the host loads and saves whole
//! certificates through a [`DocumentStore`], typically backed by a REST API.
//! The engine only calls it on open and on explicit save.

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

use std::future::Future;

use crate::doc::{Certificate, DocError};

/// Why a document could not be loaded or saved.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    /// The storage backend rejected or failed the request.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The stored payload is not a valid certificate.
    #[error("document codec error: {0}")]
    Codec(#[from] DocError),
}

/// Loads and saves certificates by id.
pub trait DocumentStore {
    fn load_document(&self, id: &str) -> impl Future<Output = Result<Certificate, StoreError>>;

    fn save_document(&self, id: &str, doc: &Certificate) -> impl Future<Output = Result<(), StoreError>>;
}
