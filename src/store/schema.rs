pub const SCHEMA: &str = r#"
-- Albums table: display metadata plus a denormalized photo count
CREATE TABLE IF NOT EXISTS albums (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    cover_photo TEXT,
    created_at TEXT NOT NULL,
    photo_count INTEGER NOT NULL DEFAULT 0
);

-- Photos table: one row per uploaded photo
CREATE TABLE IF NOT EXISTS photos (
    id TEXT PRIMARY KEY,
    album_id TEXT NOT NULL,
    name TEXT NOT NULL,
    source TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    added_at TEXT NOT NULL,
    width INTEGER NOT NULL,
    height INTEGER NOT NULL,
    FOREIGN KEY (album_id) REFERENCES albums(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_photos_album ON photos(album_id);
CREATE INDEX IF NOT EXISTS idx_photos_added_at ON photos(added_at);
"#;
