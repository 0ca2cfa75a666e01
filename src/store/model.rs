//! Record types shared by the content store backings.

use serde::{Deserialize, Serialize};

/// An album (collection of photos with display metadata)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Locator of the cover image, set on first upload.
    pub cover_photo: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// Denormalized; maintained on upload/delete, may drift.
    pub photo_count: i64,
}

/// A single photo record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub album_id: String,
    pub name: String,
    /// Full-resolution locator (a filesystem path for both backings).
    pub source: String,
    pub thumbnail: String,
    pub added_at: String,
    pub width: u32,
    pub height: u32,
}

impl Photo {
    /// Aspect ratio as height over width, used by the masonry packer.
    /// Falls back to 2:3 portrait when dimensions are unknown.
    pub fn aspect(&self) -> f64 {
        if self.width == 0 {
            1.5
        } else {
            self.height as f64 / self.width as f64
        }
    }
}
