//! Gallery controller: the stateful mediator between the content
//! store and the album/photo views.
//!
//! Owns the selected album and the loaded photo list; views only read
//! this state and route activations back through the [`crate::app::App`].
//! Fetches run on background threads and deliver over a channel that
//! the render loop polls each frame. Every photo fetch is keyed by
//! the requesting album id and every album fetch by a generation
//! counter, so a late response for a superseded request is discarded
//! instead of overwriting current state.

use std::sync::mpsc;
use std::sync::Arc;

use crate::store::{Album, ContentStore, Photo, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryState {
    LoadingAlbums,
    AlbumsReady,
    LoadingPhotos,
    PhotosReady,
}

/// Completion events delivered by fetch threads.
#[derive(Debug)]
pub enum LoadEvent {
    Albums {
        generation: u64,
        result: Result<Vec<Album>, StoreError>,
    },
    Photos {
        album_id: String,
        result: Result<Vec<Photo>, StoreError>,
    },
}

pub struct GalleryController {
    state: GalleryState,
    albums: Vec<Album>,
    selected: Option<Album>,
    photos: Vec<Photo>,
    /// Correlation token for album-list fetches.
    generation: u64,
    sender: mpsc::Sender<LoadEvent>,
    receiver: mpsc::Receiver<LoadEvent>,
}

impl GalleryController {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: GalleryState::LoadingAlbums,
            albums: Vec::new(),
            selected: None,
            photos: Vec::new(),
            generation: 0,
            sender: tx,
            receiver: rx,
        }
    }

    pub fn state(&self) -> GalleryState {
        self.state
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn selected_album(&self) -> Option<&Album> {
        self.selected.as_ref()
    }

    /// Request the full album list on a background thread.
    /// Also used to refresh after admin mutations.
    pub fn load_albums(&mut self, store: &Arc<ContentStore>) {
        let generation = self.begin_load_albums();
        let sender = self.sender.clone();
        let store = Arc::clone(store);
        std::thread::spawn(move || {
            let result = store.list_albums();
            let _ = sender.send(LoadEvent::Albums { generation, result });
        });
    }

    /// Select an album and request its photos on a background thread.
    /// Re-selection while a fetch is in flight supersedes it.
    pub fn select_album(&mut self, album: Album, store: &Arc<ContentStore>) {
        let Some(album_id) = self.begin_select(album) else {
            return;
        };
        let sender = self.sender.clone();
        let store = Arc::clone(store);
        std::thread::spawn(move || {
            let result = store.list_photos(&album_id);
            let _ = sender.send(LoadEvent::Photos { album_id, result });
        });
    }

    /// Re-fetch the current album's photos (after admin mutations).
    pub fn reload_photos(&mut self, store: &Arc<ContentStore>) {
        if let Some(album) = self.selected.clone() {
            self.select_album(album, store);
        }
    }

    /// Leave the photo view: clear selection and photos.
    pub fn back_to_albums(&mut self) {
        self.selected = None;
        self.photos.clear();
        self.state = GalleryState::AlbumsReady;
    }

    /// Drain completed fetches and fold them into the state machine.
    pub fn poll(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            match event {
                LoadEvent::Albums { generation, result } => {
                    self.apply_albums(generation, result);
                }
                LoadEvent::Photos { album_id, result } => {
                    self.apply_photos(&album_id, result);
                }
            }
        }
    }

    /// Start an album-list request; returns its correlation token.
    fn begin_load_albums(&mut self) -> u64 {
        self.generation += 1;
        self.state = GalleryState::LoadingAlbums;
        self.generation
    }

    /// Start a photo request for `album`; returns the album id to
    /// fetch, or None when no albums are loaded yet.
    fn begin_select(&mut self, album: Album) -> Option<String> {
        if self.state == GalleryState::LoadingAlbums {
            return None;
        }
        let album_id = album.id.clone();
        self.photos.clear();
        self.selected = Some(album);
        self.state = GalleryState::LoadingPhotos;
        Some(album_id)
    }

    fn apply_albums(&mut self, generation: u64, result: Result<Vec<Album>, StoreError>) {
        if generation != self.generation {
            tracing::debug!(generation, "discarding stale album response");
            return;
        }

        // Load failures surface as an empty collection.
        self.albums = result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "album list fetch failed");
            Vec::new()
        });
        if self.state == GalleryState::LoadingAlbums {
            self.state = GalleryState::AlbumsReady;
        }
    }

    fn apply_photos(&mut self, album_id: &str, result: Result<Vec<Photo>, StoreError>) {
        // The user may have navigated elsewhere while this fetch was
        // in flight; a mismatched id means the response is stale.
        if self.selected.as_ref().map(|a| a.id.as_str()) != Some(album_id) {
            tracing::debug!(album_id, "discarding stale photo response");
            return;
        }

        self.photos = result.unwrap_or_else(|e| {
            tracing::warn!(album_id, error = %e, "photo list fetch failed");
            Vec::new()
        });
        self.state = GalleryState::PhotosReady;
    }
}

impl Default for GalleryController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album(id: &str) -> Album {
        Album {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: None,
            cover_photo: None,
            created_at: "2024-01-15T00:00:00".to_string(),
            photo_count: 1,
        }
    }

    fn photo(id: &str, album_id: &str) -> Photo {
        Photo {
            id: id.to_string(),
            album_id: album_id.to_string(),
            name: id.to_string(),
            source: format!("/library/{}.jpg", id),
            thumbnail: format!("/thumbs/{}.jpg", id),
            added_at: "2024-01-15T00:00:00".to_string(),
            width: 1600,
            height: 1067,
        }
    }

    fn ready_controller(albums: Vec<Album>) -> GalleryController {
        let mut controller = GalleryController::new();
        let generation = controller.begin_load_albums();
        controller.apply_albums(generation, Ok(albums));
        controller
    }

    #[test]
    fn starts_loading_then_becomes_ready() {
        let mut controller = GalleryController::new();
        assert_eq!(controller.state(), GalleryState::LoadingAlbums);

        let generation = controller.begin_load_albums();
        controller.apply_albums(generation, Ok(vec![album("ccr")]));
        assert_eq!(controller.state(), GalleryState::AlbumsReady);
        assert_eq!(controller.albums().len(), 1);
    }

    #[test]
    fn album_load_failure_yields_empty_ready_state() {
        let mut controller = GalleryController::new();
        let generation = controller.begin_load_albums();
        controller.apply_albums(
            generation,
            Err(StoreError::AlbumNotFound("x".to_string())),
        );
        assert_eq!(controller.state(), GalleryState::AlbumsReady);
        assert!(controller.albums().is_empty());
    }

    #[test]
    fn stale_album_generation_is_discarded() {
        let mut controller = GalleryController::new();
        let first = controller.begin_load_albums();
        let second = controller.begin_load_albums();

        controller.apply_albums(second, Ok(vec![album("fresh")]));
        controller.apply_albums(first, Ok(vec![album("stale-1"), album("stale-2")]));

        assert_eq!(controller.albums().len(), 1);
        assert_eq!(controller.albums()[0].id, "fresh");
    }

    #[test]
    fn selection_requests_photos_for_that_album() {
        let mut controller = ready_controller(vec![album("ccr")]);
        let requested = controller.begin_select(album("ccr")).unwrap();
        assert_eq!(requested, "ccr");
        assert_eq!(controller.state(), GalleryState::LoadingPhotos);
        assert!(controller.photos().is_empty());

        controller.apply_photos("ccr", Ok(vec![photo("ccr-1", "ccr")]));
        assert_eq!(controller.state(), GalleryState::PhotosReady);
        assert_eq!(controller.photos().len(), 1);
    }

    #[test]
    fn rapid_reselection_keeps_only_last_selection() {
        let mut controller = ready_controller(vec![album("a"), album("b"), album("c")]);

        // Three selections issued before any fetch resolves.
        controller.begin_select(album("a")).unwrap();
        controller.begin_select(album("b")).unwrap();
        controller.begin_select(album("c")).unwrap();

        // Responses arrive out of order; only c's may apply.
        controller.apply_photos("b", Ok(vec![photo("b-1", "b")]));
        controller.apply_photos("a", Ok(vec![photo("a-1", "a"), photo("a-2", "a")]));
        assert_eq!(controller.state(), GalleryState::LoadingPhotos);
        assert!(controller.photos().is_empty());

        controller.apply_photos("c", Ok(vec![photo("c-1", "c")]));
        assert_eq!(controller.state(), GalleryState::PhotosReady);
        assert_eq!(controller.photos().len(), 1);
        assert_eq!(controller.photos()[0].album_id, "c");
    }

    #[test]
    fn back_clears_selection_and_photos() {
        let mut controller = ready_controller(vec![album("a")]);
        controller.begin_select(album("a")).unwrap();
        controller.apply_photos("a", Ok(vec![photo("a-1", "a")]));

        controller.back_to_albums();
        assert_eq!(controller.state(), GalleryState::AlbumsReady);
        assert!(controller.selected_album().is_none());
        assert!(controller.photos().is_empty());
    }

    #[test]
    fn response_after_back_is_discarded() {
        let mut controller = ready_controller(vec![album("a")]);
        controller.begin_select(album("a")).unwrap();
        controller.back_to_albums();

        controller.apply_photos("a", Ok(vec![photo("a-1", "a")]));
        assert_eq!(controller.state(), GalleryState::AlbumsReady);
        assert!(controller.photos().is_empty());
    }

    #[test]
    fn empty_photo_list_still_reaches_ready() {
        let mut controller = ready_controller(vec![album("a")]);
        controller.begin_select(album("a")).unwrap();
        controller.apply_photos("a", Ok(Vec::new()));
        assert_eq!(controller.state(), GalleryState::PhotosReady);
        assert!(controller.photos().is_empty());
    }

    #[test]
    fn photo_load_failure_yields_empty_ready_state() {
        let mut controller = ready_controller(vec![album("a")]);
        controller.begin_select(album("a")).unwrap();
        controller.apply_photos(
            "a",
            Err(StoreError::AlbumNotFound("a".to_string())),
        );
        assert_eq!(controller.state(), GalleryState::PhotosReady);
        assert!(controller.photos().is_empty());
    }

    #[test]
    fn selection_is_ignored_before_albums_load() {
        let mut controller = GalleryController::new();
        assert!(controller.begin_select(album("a")).is_none());
        assert_eq!(controller.state(), GalleryState::LoadingAlbums);
    }
}
