//! Content store: albums and photos behind a single contract.
//!
//! The store is constructed once in `main` and injected wherever
//! content is read or mutated; there is no module-level instance.
//! Two backings exist: a SQLite-backed library and an ephemeral
//! in-memory showcase. Both satisfy the same operations.

pub mod memory;
pub mod model;
mod schema;
pub mod sqlite;

use thiserror::Error;

use crate::auth::Session;
use crate::config::{StoreBackend, StoreConfig, ThumbnailConfig};
pub use model::{Album, Photo};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("admin privileges required")]
    Forbidden,
    #[error("album not found: {0}")]
    AlbumNotFound(String),
    #[error("unreadable image {name}: {reason}")]
    BadImage { name: String, reason: String },
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Generate a fresh record identifier.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current timestamp in the ISO-8601 form stored in records.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Macro to dispatch a method call to the active backing.
macro_rules! dispatch {
    ($self:expr, $method:ident($($arg:expr),* $(,)?)) => {
        match &$self.inner {
            StoreInner::Sqlite(store) => store.$method($($arg),*),
            StoreInner::Memory(store) => store.$method($($arg),*),
        }
    };
}

enum StoreInner {
    Sqlite(sqlite::SqliteStore),
    Memory(memory::MemoryStore),
}

pub struct ContentStore {
    inner: StoreInner,
}

impl ContentStore {
    /// Open the store backing selected by configuration.
    pub fn open(config: &StoreConfig, thumbnails: &ThumbnailConfig) -> StoreResult<Self> {
        let inner = match config.backend {
            StoreBackend::Library => {
                let store = sqlite::SqliteStore::open(config, thumbnails)?;
                StoreInner::Sqlite(store)
            }
            StoreBackend::Showcase => {
                let store = match &config.showcase_path {
                    Some(path) => memory::MemoryStore::with_showcase(path),
                    None => memory::MemoryStore::new(),
                };
                StoreInner::Memory(store)
            }
        };
        Ok(Self { inner })
    }

    /// All albums, in the order the backing provides them.
    pub fn list_albums(&self) -> StoreResult<Vec<Album>> {
        dispatch!(self, list_albums())
    }

    /// Photos of one album. An unknown album id yields an empty list.
    pub fn list_photos(&self, album_id: &str) -> StoreResult<Vec<Photo>> {
        dispatch!(self, list_photos(album_id))
    }

    pub fn create_album(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Album> {
        require_admin(session)?;
        dispatch!(self, create_album(name, description))
    }

    pub fn upload_photo(
        &self,
        session: &Session,
        album_id: &str,
        data: &[u8],
        file_name: &str,
    ) -> StoreResult<Photo> {
        require_admin(session)?;
        dispatch!(self, upload_photo(album_id, data, file_name))
    }

    pub fn delete_photo(&self, session: &Session, photo_id: &str) -> StoreResult<bool> {
        require_admin(session)?;
        dispatch!(self, delete_photo(photo_id))
    }

    /// Delete an album and all of its photos.
    pub fn delete_album(&self, session: &Session, album_id: &str) -> StoreResult<bool> {
        require_admin(session)?;
        dispatch!(self, delete_album(album_id))
    }
}

/// Authorization happens here, at the store boundary. The UI's admin
/// flag only decides which affordances are drawn.
fn require_admin(session: &Session) -> StoreResult<()> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(StoreError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;

    fn store() -> ContentStore {
        ContentStore {
            inner: StoreInner::Memory(memory::MemoryStore::new()),
        }
    }

    #[test]
    fn anonymous_session_cannot_mutate() {
        let store = store();
        let anon = Session::anonymous();

        let err = store.create_album(&anon, "Test Show", None).unwrap_err();
        assert!(matches!(err, StoreError::Forbidden));

        let err = store.delete_album(&anon, "whatever").unwrap_err();
        assert!(matches!(err, StoreError::Forbidden));
    }

    #[test]
    fn admin_lifecycle_create_upload_delete() {
        let store = store();
        let admin = Session::admin_for_tests();

        assert!(store.list_albums().unwrap().is_empty());

        let album = store.create_album(&admin, "Test Show", None).unwrap();
        assert_eq!(album.photo_count, 0);
        let listed = store.list_albums().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Test Show");

        let photo = store
            .upload_photo(&admin, &album.id, b"not-a-real-jpeg", "a.jpg")
            .unwrap();
        assert_eq!(photo.album_id, album.id);
        assert_eq!(store.list_photos(&album.id).unwrap().len(), 1);
        assert_eq!(store.list_albums().unwrap()[0].photo_count, 1);

        assert!(store.delete_album(&admin, &album.id).unwrap());
        assert!(store.list_photos(&album.id).unwrap().is_empty());
        assert!(store.list_albums().unwrap().is_empty());
    }
}
