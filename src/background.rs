//! Background image loading.
//!
//! The certificate may name a background image URL. Fetching and decoding it
//! is the only asynchronous work in the editor: a load runs as a detached
//! future while gestures keep mutating the document synchronously, and the
//! next paint picks up whatever the loader holds.
//!
//! Every `begin` bumps a generation counter and hands out a [`LoadTicket`].
//! A completion is applied only if its ticket is still current, so switching
//! the background twice in quick succession can never leave the first image
//! on screen.

#[cfg(test)]
#[path = "background_test.rs"]
mod background_test;

use std::cell::RefCell;
use std::future::Future;

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use crate::paint::js_message;

/// Why a background image could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageLoadError {
    #[error("image element could not be created: {0}")]
    Create(String),

    #[error("image fetch or decode failed for {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Identifies one call to [`BackgroundLoader::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Where the background image is in its lifecycle.
#[derive(Debug, Clone)]
pub enum LoadState<B> {
    /// No background image requested.
    Idle,
    Loading { url: String },
    Loaded { url: String, bitmap: B },
    /// The last request failed; the flat background color is used.
    Failed { url: String, error: ImageLoadError },
}

/// What a loader must do to follow a document's background URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStep {
    /// The loader already tracks that URL, whatever its outcome.
    Keep,
    /// The document has no background image.
    Clear,
    Load(String),
}

/// Tracks the current background image and discards stale completions.
#[derive(Debug, Clone)]
pub struct BackgroundLoader<B> {
    state: LoadState<B>,
    generation: u64,
}

impl<B> Default for BackgroundLoader<B> {
    fn default() -> Self {
        Self { state: LoadState::Idle, generation: 0 }
    }
}

impl<B> BackgroundLoader<B> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading `url`, superseding any load in flight.
    pub fn begin(&mut self, url: &str) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading { url: url.to_owned() };
        LoadTicket(self.generation)
    }

    /// Drop the background image and invalidate any load in flight.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = LoadState::Idle;
    }

    /// Apply a finished load. Returns false (and changes nothing) if the
    /// ticket has been superseded.
    pub fn finish(&mut self, ticket: LoadTicket, result: Result<B, ImageLoadError>) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        let url = match &mut self.state {
            LoadState::Loading { url } => std::mem::take(url),
            LoadState::Idle | LoadState::Loaded { .. } | LoadState::Failed { .. } => return false,
        };
        self.state = match result {
            Ok(bitmap) => LoadState::Loaded { url, bitmap },
            Err(error) => LoadState::Failed { url, error },
        };
        true
    }

    #[must_use]
    pub fn state(&self) -> &LoadState<B> {
        &self.state
    }

    /// The decoded image, once loaded.
    #[must_use]
    pub fn bitmap(&self) -> Option<&B> {
        match &self.state {
            LoadState::Loaded { bitmap, .. } => Some(bitmap),
            LoadState::Idle | LoadState::Loading { .. } | LoadState::Failed { .. } => None,
        }
    }

    /// The decoded image, only if it was loaded for `url`.
    #[must_use]
    pub fn bitmap_for(&self, url: Option<&str>) -> Option<&B> {
        match &self.state {
            LoadState::Loaded { url: loaded, bitmap } if url == Some(loaded.as_str()) => Some(bitmap),
            LoadState::Idle | LoadState::Loading { .. } | LoadState::Loaded { .. } | LoadState::Failed { .. } => None,
        }
    }

    /// Compare the tracked URL with the one the document wants.
    #[must_use]
    pub fn sync_step(&self, wanted: Option<&str>) -> SyncStep {
        match wanted {
            _ if wanted == self.url() => SyncStep::Keep,
            None => SyncStep::Clear,
            Some(url) => SyncStep::Load(url.to_owned()),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    /// URL of the current request, whatever its outcome.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.state {
            LoadState::Idle => None,
            LoadState::Loading { url } | LoadState::Loaded { url, .. } | LoadState::Failed { url, .. } => Some(url),
        }
    }
}

/// Turns an image URL into a drawable bitmap.
pub trait ImageResolver {
    type Bitmap;

    fn resolve(&self, url: &str) -> impl Future<Output = Result<Self::Bitmap, ImageLoadError>>;
}

/// Drive one background load through `resolver` and record the outcome.
///
/// The loader is not borrowed across the await, so gesture handlers may keep
/// using it while the fetch is in flight. Returns true if the result was
/// applied.
pub async fn load_background<R: ImageResolver>(
    loader: &RefCell<BackgroundLoader<R::Bitmap>>,
    resolver: &R,
    url: &str,
) -> bool {
    let ticket = loader.borrow_mut().begin(url);
    tracing::debug!(url, "background load started");
    let result = resolver.resolve(url).await;
    if let Err(ref error) = result {
        tracing::warn!(url, %error, "background image failed; using flat color");
    }
    let applied = loader.borrow_mut().finish(ticket, result);
    if !applied {
        tracing::debug!(url, "stale background load discarded");
    }
    applied
}

/// Resolves URLs with an `HtmlImageElement` and waits for `decode()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlImageResolver;

impl ImageResolver for HtmlImageResolver {
    type Bitmap = HtmlImageElement;

    async fn resolve(&self, url: &str) -> Result<HtmlImageElement, ImageLoadError> {
        let image = HtmlImageElement::new().map_err(|e| ImageLoadError::Create(js_message(&e)))?;
        image.set_cross_origin(Some("anonymous"));
        image.set_src(url);
        JsFuture::from(image.decode())
            .await
            .map_err(|e: JsValue| ImageLoadError::Decode { url: url.to_owned(), reason: js_message(&e) })?;
        Ok(image)
    }
}
