use std::collections::HashMap;

use futures::executor::block_on;

use super::*;

/// Resolves URLs from a fixed table; unknown URLs fail to decode.
struct TableResolver {
    images: HashMap<&'static str, u32>,
}

impl TableResolver {
    fn new(entries: &[(&'static str, u32)]) -> Self {
        Self { images: entries.iter().copied().collect() }
    }
}

impl ImageResolver for TableResolver {
    type Bitmap = u32;

    async fn resolve(&self, url: &str) -> Result<u32, ImageLoadError> {
        self.images.get(url).copied().ok_or_else(|| ImageLoadError::Decode {
            url: url.to_owned(),
            reason: "404".to_owned(),
        })
    }
}

/// Starts a competing load while its own request is in flight.
struct RacingResolver<'a> {
    loader: &'a RefCell<BackgroundLoader<u32>>,
}

impl ImageResolver for RacingResolver<'_> {
    type Bitmap = u32;

    async fn resolve(&self, _url: &str) -> Result<u32, ImageLoadError> {
        self.loader.borrow_mut().begin("newer.png");
        Ok(1)
    }
}

// =============================================================
// BackgroundLoader
// =============================================================

#[test]
fn new_loader_is_idle() {
    let loader: BackgroundLoader<u32> = BackgroundLoader::new();
    assert!(matches!(loader.state(), LoadState::Idle));
    assert_eq!(loader.bitmap(), None);
    assert_eq!(loader.url(), None);
    assert!(!loader.is_loading());
}

#[test]
fn begin_then_finish_ok_loads() {
    let mut loader = BackgroundLoader::new();
    let ticket = loader.begin("a.png");
    assert!(loader.is_loading());
    assert_eq!(loader.url(), Some("a.png"));
    assert!(loader.finish(ticket, Ok(7)));
    assert_eq!(loader.bitmap(), Some(&7));
    assert_eq!(loader.url(), Some("a.png"));
}

#[test]
fn finish_err_records_failure() {
    let mut loader: BackgroundLoader<u32> = BackgroundLoader::new();
    let ticket = loader.begin("a.png");
    let error = ImageLoadError::Create("no document".to_owned());
    assert!(loader.finish(ticket, Err(error.clone())));
    assert_eq!(loader.bitmap(), None);
    match loader.state() {
        LoadState::Failed { url, error: e } => {
            assert_eq!(url, "a.png");
            assert_eq!(*e, error);
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn stale_ticket_is_ignored() {
    let mut loader = BackgroundLoader::new();
    let old = loader.begin("old.png");
    let new = loader.begin("new.png");
    assert!(!loader.finish(old, Ok(1)));
    assert!(loader.is_loading());
    assert!(loader.finish(new, Ok(2)));
    assert_eq!(loader.bitmap(), Some(&2));
    assert_eq!(loader.url(), Some("new.png"));
}

#[test]
fn clear_invalidates_in_flight_load() {
    let mut loader = BackgroundLoader::new();
    let ticket = loader.begin("a.png");
    loader.clear();
    assert!(!loader.finish(ticket, Ok(1)));
    assert!(matches!(loader.state(), LoadState::Idle));
}

#[test]
fn ticket_cannot_be_applied_twice() {
    let mut loader = BackgroundLoader::new();
    let ticket = loader.begin("a.png");
    assert!(loader.finish(ticket, Ok(1)));
    assert!(!loader.finish(ticket, Ok(2)));
    assert_eq!(loader.bitmap(), Some(&1));
}

#[test]
fn bitmap_for_requires_matching_url() {
    let mut loader = BackgroundLoader::new();
    let ticket = loader.begin("a.png");
    assert!(loader.finish(ticket, Ok(3)));
    assert_eq!(loader.bitmap_for(Some("a.png")), Some(&3));
    assert_eq!(loader.bitmap_for(Some("b.png")), None);
    assert_eq!(loader.bitmap_for(None), None);
}

#[test]
fn bitmap_for_is_none_while_loading() {
    let mut loader: BackgroundLoader<u32> = BackgroundLoader::new();
    loader.begin("a.png");
    assert_eq!(loader.bitmap_for(Some("a.png")), None);
}

#[test]
fn sync_step_follows_document_url() {
    let mut loader: BackgroundLoader<u32> = BackgroundLoader::new();
    assert_eq!(loader.sync_step(None), SyncStep::Keep);
    assert_eq!(loader.sync_step(Some("a.png")), SyncStep::Load("a.png".to_owned()));

    let ticket = loader.begin("a.png");
    assert_eq!(loader.sync_step(Some("a.png")), SyncStep::Keep);
    assert_eq!(loader.sync_step(Some("b.png")), SyncStep::Load("b.png".to_owned()));
    assert_eq!(loader.sync_step(None), SyncStep::Clear);

    let error = ImageLoadError::Create("offline".to_owned());
    assert!(loader.finish(ticket, Err(error)));
    assert_eq!(loader.sync_step(Some("a.png")), SyncStep::Keep);
}

// =============================================================
// load_background
// =============================================================

#[test]
fn load_background_applies_result() {
    let loader = RefCell::new(BackgroundLoader::new());
    let resolver = TableResolver::new(&[("bg.png", 42)]);
    assert!(block_on(load_background(&loader, &resolver, "bg.png")));
    assert_eq!(loader.borrow().bitmap(), Some(&42));
}

#[test]
fn load_background_failure_leaves_no_bitmap() {
    let loader = RefCell::new(BackgroundLoader::new());
    let resolver = TableResolver::new(&[]);
    assert!(block_on(load_background(&loader, &resolver, "missing.png")));
    let loader = loader.borrow();
    assert_eq!(loader.bitmap(), None);
    assert!(matches!(loader.state(), LoadState::Failed { .. }));
}

#[test]
fn load_background_discards_superseded_result() {
    let loader = RefCell::new(BackgroundLoader::new());
    let resolver = RacingResolver { loader: &loader };
    assert!(!block_on(load_background(&loader, &resolver, "older.png")));
    let loader = loader.borrow();
    assert!(loader.is_loading());
    assert_eq!(loader.url(), Some("newer.png"));
}
