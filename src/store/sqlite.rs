//! SQLite-backed library store.
//!
//! Media bytes are copied into the library directory and thumbnails
//! are rendered next to it in a cache directory; the database holds
//! the records. The connection lives behind a mutex so fetch threads
//! can share the store.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::model::{Album, Photo};
use super::schema::SCHEMA;
use super::{new_id, now_timestamp, StoreError, StoreResult};
use crate::config::{StoreConfig, ThumbnailConfig};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    library_dir: PathBuf,
    thumbnail_dir: PathBuf,
    thumbnail_size: u32,
}

impl SqliteStore {
    pub fn open(config: &StoreConfig, thumbnails: &ThumbnailConfig) -> StoreResult<Self> {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&config.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            library_dir: config.library_path.clone(),
            thumbnail_dir: thumbnails.path.clone(),
            thumbnail_size: thumbnails.size,
        })
    }

    pub fn list_albums(&self) -> StoreResult<Vec<Album>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, description, cover_photo, created_at, photo_count
            FROM albums
            ORDER BY created_at, name
            "#,
        )?;
        let albums = stmt
            .query_map([], |row| {
                Ok(Album {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    cover_photo: row.get(3)?,
                    created_at: row.get(4)?,
                    photo_count: row.get(5)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(albums)
    }

    pub fn list_photos(&self, album_id: &str) -> StoreResult<Vec<Photo>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, album_id, name, source, thumbnail, added_at, width, height
            FROM photos
            WHERE album_id = ?
            ORDER BY added_at, name
            "#,
        )?;
        let photos = stmt
            .query_map([album_id], |row| {
                Ok(Photo {
                    id: row.get(0)?,
                    album_id: row.get(1)?,
                    name: row.get(2)?,
                    source: row.get(3)?,
                    thumbnail: row.get(4)?,
                    added_at: row.get(5)?,
                    width: row.get(6)?,
                    height: row.get(7)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(photos)
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

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO albums (id, name, description, created_at, photo_count) VALUES (?, ?, ?, ?, 0)",
            rusqlite::params![album.id, album.name, album.description, album.created_at],
        )?;
        Ok(album)
    }

    pub fn upload_photo(&self, album_id: &str, data: &[u8], file_name: &str) -> StoreResult<Photo> {
        // Reject orphan uploads before touching the filesystem.
        if !self.album_exists(album_id)? {
            return Err(StoreError::AlbumNotFound(album_id.to_string()));
        }

        let decoded = image::load_from_memory(data).map_err(|e| StoreError::BadImage {
            name: file_name.to_string(),
            reason: e.to_string(),
        })?;

        let id = new_id();
        let source = self.write_original(&id, file_name, data)?;
        let thumbnail = self.write_thumbnail(&id, &decoded)?;

        let photo = Photo {
            id,
            album_id: album_id.to_string(),
            name: file_name.to_string(),
            source: source.to_string_lossy().to_string(),
            thumbnail: thumbnail.to_string_lossy().to_string(),
            added_at: now_timestamp(),
            width: decoded.width(),
            height: decoded.height(),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO photos (id, album_id, name, source, thumbnail, added_at, width, height)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                photo.id,
                photo.album_id,
                photo.name,
                photo.source,
                photo.thumbnail,
                photo.added_at,
                photo.width,
                photo.height
            ],
        )?;
        conn.execute(
            "UPDATE albums SET photo_count = photo_count + 1 WHERE id = ?",
            [album_id],
        )?;
        // First upload becomes the album cover.
        conn.execute(
            "UPDATE albums SET cover_photo = ? WHERE id = ? AND cover_photo IS NULL",
            rusqlite::params![photo.thumbnail, album_id],
        )?;

        Ok(photo)
    }

    pub fn delete_photo(&self, photo_id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, String, String)> = match conn.query_row(
            "SELECT album_id, source, thumbnail FROM photos WHERE id = ?",
            [photo_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        ) {
            Ok(r) => Some(r),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        let Some((album_id, source, thumbnail)) = row else {
            return Ok(false);
        };

        conn.execute("DELETE FROM photos WHERE id = ?", [photo_id])?;
        conn.execute(
            "UPDATE albums SET photo_count = MAX(photo_count - 1, 0) WHERE id = ?",
            [album_id],
        )?;
        drop(conn);

        remove_media(&source);
        remove_media(&thumbnail);
        Ok(true)
    }

    pub fn delete_album(&self, album_id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare("SELECT source, thumbnail FROM photos WHERE album_id = ?")?;
        let media: Vec<(String, String)> = stmt
            .query_map([album_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        // Photo rows go with the album via ON DELETE CASCADE.
        let deleted = conn.execute("DELETE FROM albums WHERE id = ?", [album_id])?;
        drop(conn);

        if deleted == 0 {
            return Ok(false);
        }
        for (source, thumbnail) in media {
            remove_media(&source);
            remove_media(&thumbnail);
        }
        Ok(true)
    }

    fn album_exists(&self, album_id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM albums WHERE id = ?",
            [album_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Copy the original bytes into the library directory.
    fn write_original(&self, id: &str, file_name: &str, data: &[u8]) -> StoreResult<PathBuf> {
        std::fs::create_dir_all(&self.library_dir)?;
        let ext = Path::new(file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "jpg".to_string());
        let path = self.library_dir.join(format!("{}.{}", id, ext));
        std::fs::write(&path, data)?;
        Ok(path)
    }

    /// Render and cache a bounded thumbnail as JPEG.
    fn write_thumbnail(&self, id: &str, img: &image::DynamicImage) -> StoreResult<PathBuf> {
        std::fs::create_dir_all(&self.thumbnail_dir)?;
        let path = self.thumbnail_dir.join(format!("{}.jpg", id));
        let thumb = img.thumbnail(self.thumbnail_size, self.thumbnail_size);
        thumb
            .into_rgb8()
            .save(&path)
            .map_err(|e| StoreError::BadImage {
                name: id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(path)
    }
}

fn remove_media(path: &str) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::debug!(path, error = %e, "could not remove media file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> SqliteStore {
        let store_config = StoreConfig {
            backend: crate::config::StoreBackend::Library,
            db_path: dir.path().join("encore.db"),
            library_path: dir.path().join("library"),
            showcase_path: None,
        };
        let thumb_config = ThumbnailConfig {
            path: dir.path().join("thumbnails"),
            size: 64,
        };
        SqliteStore::open(&store_config, &thumb_config).unwrap()
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn create_album_then_list_includes_it() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let album = store.create_album("Test Show", Some("Live set")).unwrap();
        assert_eq!(album.photo_count, 0);

        let albums = store.list_albums().unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, "Test Show");
        assert_eq!(albums[0].photo_count, 0);
        assert!(albums[0].cover_photo.is_none());
    }

    #[test]
    fn upload_records_photo_and_increments_count() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let album = store.create_album("Test Show", None).unwrap();

        let photo = store
            .upload_photo(&album.id, &png_bytes(40, 30), "stage.png")
            .unwrap();
        assert_eq!(photo.album_id, album.id);
        assert_eq!((photo.width, photo.height), (40, 30));
        assert!(Path::new(&photo.source).exists());
        assert!(Path::new(&photo.thumbnail).exists());

        let photos = store.list_photos(&album.id).unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, photo.id);

        let albums = store.list_albums().unwrap();
        assert_eq!(albums[0].photo_count, 1);
        // First upload set the cover.
        assert_eq!(albums[0].cover_photo.as_deref(), Some(photo.thumbnail.as_str()));
    }

    #[test]
    fn second_upload_keeps_first_cover() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let album = store.create_album("Test Show", None).unwrap();

        let first = store
            .upload_photo(&album.id, &png_bytes(16, 16), "a.png")
            .unwrap();
        store
            .upload_photo(&album.id, &png_bytes(16, 16), "b.png")
            .unwrap();

        let albums = store.list_albums().unwrap();
        assert_eq!(albums[0].photo_count, 2);
        assert_eq!(albums[0].cover_photo.as_deref(), Some(first.thumbnail.as_str()));
    }

    #[test]
    fn upload_to_missing_album_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let err = store
            .upload_photo("no-such-album", &png_bytes(8, 8), "a.png")
            .unwrap_err();
        assert!(matches!(err, StoreError::AlbumNotFound(_)));
    }

    #[test]
    fn undecodable_upload_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let album = store.create_album("Test Show", None).unwrap();

        let err = store
            .upload_photo(&album.id, b"definitely not an image", "a.png")
            .unwrap_err();
        assert!(matches!(err, StoreError::BadImage { .. }));
        assert!(store.list_photos(&album.id).unwrap().is_empty());
    }

    #[test]
    fn delete_photo_decrements_count() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let album = store.create_album("Test Show", None).unwrap();
        let photo = store
            .upload_photo(&album.id, &png_bytes(8, 8), "a.png")
            .unwrap();

        assert!(store.delete_photo(&photo.id).unwrap());
        assert!(!store.delete_photo(&photo.id).unwrap());
        assert!(store.list_photos(&album.id).unwrap().is_empty());
        assert_eq!(store.list_albums().unwrap()[0].photo_count, 0);
        assert!(!Path::new(&photo.source).exists());
    }

    #[test]
    fn delete_album_cascades_to_photos() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let album = store.create_album("Test Show", None).unwrap();
        store
            .upload_photo(&album.id, &png_bytes(8, 8), "a.png")
            .unwrap();
        store
            .upload_photo(&album.id, &png_bytes(8, 8), "b.png")
            .unwrap();

        assert!(store.delete_album(&album.id).unwrap());
        assert!(store.list_photos(&album.id).unwrap().is_empty());
        assert!(store.list_albums().unwrap().is_empty());
        assert!(!store.delete_album(&album.id).unwrap());
    }
}
