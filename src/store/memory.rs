//! Ephemeral in-memory store for showcase mode.
//!
//! Nothing persists across runs. Albums can be seeded from a showcase
//! directory tree (one subdirectory per album, image files as photos)
//! so the gallery has real files to render; admin mutations operate
//! purely on the in-memory collections.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::model::{Album, Photo};
use super::{new_id, now_timestamp, StoreError, StoreResult};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Default)]
struct State {
    albums: Vec<Album>,
    photos: Vec<Photo>,
}

pub struct MemoryStore {
    state: Mutex<State>,
    media_dir: PathBuf,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            media_dir: std::env::temp_dir().join("encore-showcase"),
        }
    }

    /// Build a store seeded from a showcase directory: each
    /// subdirectory becomes an album, its image files the photos.
    pub fn with_showcase(showcase_dir: &Path) -> Self {
        let store = Self::new();
        if let Err(e) = store.seed_from(showcase_dir) {
            tracing::warn!(dir = %showcase_dir.display(), error = %e, "showcase seeding failed");
        }
        store
    }

    fn seed_from(&self, showcase_dir: &Path) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();

        let mut album_dirs: Vec<PathBuf> = std::fs::read_dir(showcase_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.path())
            .collect();
        album_dirs.sort();

        for dir in album_dirs {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let album_id = slug(&name);

            let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| is_image(p))
                .collect();
            files.sort();

            let photos: Vec<Photo> = files
                .iter()
                .map(|path| {
                    let (width, height) = image::image_dimensions(path).unwrap_or((800, 600));
                    let locator = path.to_string_lossy().to_string();
                    Photo {
                        id: new_id(),
                        album_id: album_id.clone(),
                        name: path
                            .file_stem()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default(),
                        source: locator.clone(),
                        thumbnail: locator,
                        added_at: now_timestamp(),
                        width,
                        height,
                    }
                })
                .collect();

            state.albums.push(Album {
                id: album_id,
                name,
                description: None,
                cover_photo: photos.first().map(|p| p.thumbnail.clone()),
                created_at: now_timestamp(),
                photo_count: photos.len() as i64,
            });
            state.photos.extend(photos);
        }

        tracing::info!(
            albums = state.albums.len(),
            photos = state.photos.len(),
            "showcase content loaded"
        );
        Ok(())
    }

    pub fn list_albums(&self) -> StoreResult<Vec<Album>> {
        Ok(self.state.lock().unwrap().albums.clone())
    }

    pub fn list_photos(&self, album_id: &str) -> StoreResult<Vec<Photo>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .photos
            .iter()
            .filter(|p| p.album_id == album_id)
            .cloned()
            .collect())
    }

    pub fn create_album(&self, name: &str, description: Option<&str>) -> StoreResult<Album> {
        let album = Album {
            id: new_id(),
            name: name.to_string(),
            description: description.map(|d| d.to_string()),
            cover_photo: None,
            created_at: now_timestamp(),
            photo_count: 0,
        };
        self.state.lock().unwrap().albums.push(album.clone());
        Ok(album)
    }

    pub fn upload_photo(&self, album_id: &str, data: &[u8], file_name: &str) -> StoreResult<Photo> {
        let mut state = self.state.lock().unwrap();
        if !state.albums.iter().any(|a| a.id == album_id) {
            return Err(StoreError::AlbumNotFound(album_id.to_string()));
        }

        let id = new_id();
        std::fs::create_dir_all(&self.media_dir)?;
        let path = self.media_dir.join(format!("{}-{}", id, file_name));
        std::fs::write(&path, data)?;

        // Non-image payloads keep a nominal size; this backing is a stub.
        let (width, height) = image::load_from_memory(data)
            .map(|img| (img.width(), img.height()))
            .unwrap_or((800, 600));

        let locator = path.to_string_lossy().to_string();
        let photo = Photo {
            id,
            album_id: album_id.to_string(),
            name: file_name.to_string(),
            source: locator.clone(),
            thumbnail: locator,
            added_at: now_timestamp(),
            width,
            height,
        };

        state.photos.push(photo.clone());
        if let Some(album) = state.albums.iter_mut().find(|a| a.id == album_id) {
            album.photo_count += 1;
            if album.cover_photo.is_none() {
                album.cover_photo = Some(photo.thumbnail.clone());
            }
        }
        Ok(photo)
    }

    pub fn delete_photo(&self, photo_id: &str) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state.photos.iter().position(|p| p.id == photo_id) else {
            return Ok(false);
        };
        let photo = state.photos.remove(pos);
        if let Some(album) = state.albums.iter_mut().find(|a| a.id == photo.album_id) {
            album.photo_count = (album.photo_count - 1).max(0);
        }
        Ok(true)
    }

    pub fn delete_album(&self, album_id: &str) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state.albums.iter().position(|a| a.id == album_id) else {
            return Ok(false);
        };
        state.albums.remove(pos);
        state.photos.retain(|p| p.album_id != album_id);
        Ok(true)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Album identifier derived from a directory name.
fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn slug_normalizes_directory_names() {
        assert_eq!(slug("Bruno Rodéo"), "bruno-rod-o");
        assert_eq!(slug("CCR"), "ccr");
        assert_eq!(slug("  spaced  out  "), "spaced-out");
    }

    #[test]
    fn create_and_cascade_delete() {
        let store = MemoryStore::new();
        let album = store.create_album("Test Show", None).unwrap();
        store
            .upload_photo(&album.id, b"bytes", "a.jpg")
            .unwrap();
        store
            .upload_photo(&album.id, b"bytes", "b.jpg")
            .unwrap();

        assert_eq!(store.list_albums().unwrap()[0].photo_count, 2);
        assert!(store.delete_album(&album.id).unwrap());
        assert!(store.list_photos(&album.id).unwrap().is_empty());
        assert!(store.list_albums().unwrap().is_empty());
    }

    #[test]
    fn upload_requires_existing_album() {
        let store = MemoryStore::new();
        let err = store.upload_photo("missing", b"bytes", "a.jpg").unwrap_err();
        assert!(matches!(err, StoreError::AlbumNotFound(_)));
    }

    #[test]
    fn unknown_dimensions_fall_back_to_nominal() {
        let store = MemoryStore::new();
        let album = store.create_album("Test Show", None).unwrap();
        let photo = store.upload_photo(&album.id, b"bytes", "a.jpg").unwrap();
        assert_eq!((photo.width, photo.height), (800, 600));
    }

    #[test]
    fn delete_photo_updates_count() {
        let store = MemoryStore::new();
        let album = store.create_album("Test Show", None).unwrap();
        let photo = store.upload_photo(&album.id, b"bytes", "a.jpg").unwrap();

        assert!(store.delete_photo(&photo.id).unwrap());
        assert!(!store.delete_photo(&photo.id).unwrap());
        assert_eq!(store.list_albums().unwrap()[0].photo_count, 0);
    }

    #[test]
    fn seeds_albums_from_directory_tree() {
        let dir = TempDir::new().unwrap();
        let show = dir.path().join("Night Owls");
        std::fs::create_dir_all(&show).unwrap();
        let img = image::DynamicImage::new_rgb8(12, 9);
        img.save(show.join("one.png")).unwrap();
        img.save(show.join("two.png")).unwrap();
        std::fs::write(show.join("notes.txt"), "ignored").unwrap();

        let store = MemoryStore::with_showcase(dir.path());
        let albums = store.list_albums().unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].id, "night-owls");
        assert_eq!(albums[0].photo_count, 2);
        assert!(albums[0].cover_photo.is_some());

        let photos = store.list_photos("night-owls").unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!((photos[0].width, photos[0].height), (12, 9));
    }
}
