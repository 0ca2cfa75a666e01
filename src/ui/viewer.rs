//! Full-screen photo viewer with sequential navigation.
//!
//! Holds the photo sequence of one album. The active position is
//! located by photo id; next/previous clamp at the sequence ends.
//! Full-resolution loads run asynchronously, keyed by photo id, so a
//! superseded load finishing late only warms the cache — it cannot
//! clear the loading indicator for a different photo.

use anyhow::{anyhow, Result};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};
use ratatui_image::{Resize, StatefulImage};
use std::path::{Path, PathBuf};

use super::images::ImageLoader;
use crate::config::ImageProtocol;
use crate::store::Photo;

pub struct PhotoViewer {
    photos: Vec<Photo>,
    current: usize,
    max_size: u32,
    loader: ImageLoader,
}

impl PhotoViewer {
    /// Open the viewer on `photo_id` within its album's sequence.
    /// An id missing from the sequence falls back to the start.
    pub fn new(photos: Vec<Photo>, photo_id: &str, protocol: ImageProtocol, max_size: u32) -> Self {
        let current = photos.iter().position(|p| p.id == photo_id).unwrap_or(0);
        Self {
            photos,
            current,
            max_size,
            loader: ImageLoader::new(protocol),
        }
    }

    pub fn current_photo(&self) -> Option<&Photo> {
        self.photos.get(self.current)
    }

    pub fn position(&self) -> (usize, usize) {
        (self.current + 1, self.photos.len())
    }

    pub fn at_start(&self) -> bool {
        self.current == 0
    }

    pub fn at_end(&self) -> bool {
        self.current + 1 >= self.photos.len()
    }

    /// Advance to the next photo; no wraparound.
    pub fn next(&mut self) {
        if !self.at_end() {
            self.current += 1;
        }
    }

    /// Step back to the previous photo; no wraparound.
    pub fn prev(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }

    pub fn first(&mut self) {
        self.current = 0;
    }

    pub fn last(&mut self) {
        self.current = self.photos.len().saturating_sub(1);
    }

    /// Copy the current photo's full-resolution file into the
    /// downloads directory. Returns the destination path.
    pub fn download(&self) -> Result<PathBuf> {
        let photo = self
            .current_photo()
            .ok_or_else(|| anyhow!("no photo to download"))?;
        let downloads = dirs::download_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow!("no downloads directory"))?;

        let file_name = Path::new(&photo.source)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.jpg", photo.id));
        let target = unique_target(&downloads, &file_name);

        std::fs::copy(&photo.source, &target)
            .map_err(|e| anyhow!("download failed: {}", e))?;
        Ok(target)
    }
}

/// Pick a destination that does not clobber an existing download.
fn unique_target(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    let ext = Path::new(file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    for n in 1.. {
        let candidate = dir.join(format!("{}-{}{}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}

/// Render the viewer over the whole frame.
pub fn render(frame: &mut Frame, viewer: &mut PhotoViewer, area: Rect) {
    viewer.loader.poll();

    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(2)])
        .split(area);

    let Some(photo) = viewer.current_photo().cloned() else {
        let empty = Paragraph::new("Nothing to show")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, chunks[0]);
        return;
    };

    let backdrop = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(backdrop, chunks[0]);

    let max_size = viewer.max_size;
    if let Some(protocol) = viewer.loader.get(&photo.id, &photo.source, max_size) {
        let image = StatefulImage::new(None).resize(Resize::Fit(None));
        frame.render_stateful_widget(image, chunks[0], protocol);
    } else if viewer.loader.is_loading(&photo.id) {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(loading, centered_rect(chunks[0], 20, 1));
    }

    render_info_bar(frame, viewer, &photo, chunks[1]);
}

fn render_info_bar(frame: &mut Frame, viewer: &PhotoViewer, photo: &Photo, area: Rect) {
    let (pos, total) = viewer.position();
    let edges = match (viewer.at_start(), viewer.at_end()) {
        (true, true) => "",
        (true, false) => "› next",
        (false, true) => "‹ prev",
        (false, false) => "‹ › navigate",
    };

    let info = format!(
        " {} | {} | {}/{} {}",
        photo.name,
        photo.added_at.split('T').next().unwrap_or(&photo.added_at),
        pos,
        total,
        edges
    );
    let help = "Left/Right:navigate | d:download | Esc:close";

    let lines = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(info).style(Style::default().fg(Color::Cyan)),
        lines[0],
    );
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        lines[1],
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str) -> Photo {
        Photo {
            id: id.to_string(),
            album_id: "a".to_string(),
            name: id.to_string(),
            source: format!("/library/{}.jpg", id),
            thumbnail: format!("/thumbs/{}.jpg", id),
            added_at: "2024-01-15T00:00:00".to_string(),
            width: 1600,
            height: 1067,
        }
    }

    fn viewer(ids: &[&str], start: &str) -> PhotoViewer {
        let photos = ids.iter().map(|id| photo(id)).collect();
        PhotoViewer::new(photos, start, ImageProtocol::None, 2048)
    }

    #[test]
    fn opens_on_the_requested_photo() {
        let v = viewer(&["p1", "p2", "p3"], "p2");
        assert_eq!(v.current_photo().unwrap().id, "p2");
        assert_eq!(v.position(), (2, 3));
    }

    #[test]
    fn unknown_id_falls_back_to_start() {
        let v = viewer(&["p1", "p2"], "missing");
        assert_eq!(v.current_photo().unwrap().id, "p1");
    }

    #[test]
    fn next_steps_through_and_stops_at_the_end() {
        let mut v = viewer(&["p1", "p2", "p3"], "p1");

        // k presses of next land on index(start)+k while in range.
        v.next();
        assert_eq!(v.current_photo().unwrap().id, "p2");
        v.next();
        assert_eq!(v.current_photo().unwrap().id, "p3");
        assert!(v.at_end());

        // No wraparound past the last photo.
        v.next();
        assert_eq!(v.current_photo().unwrap().id, "p3");
    }

    #[test]
    fn prev_stops_at_the_start() {
        let mut v = viewer(&["p1", "p2"], "p2");
        v.prev();
        assert_eq!(v.current_photo().unwrap().id, "p1");
        assert!(v.at_start());
        v.prev();
        assert_eq!(v.current_photo().unwrap().id, "p1");
    }

    #[test]
    fn first_and_last_jump_to_the_edges() {
        let mut v = viewer(&["p1", "p2", "p3"], "p2");
        v.first();
        assert!(v.at_start());
        v.last();
        assert!(v.at_end());
    }

    #[test]
    fn empty_sequence_has_no_current_photo() {
        let v = PhotoViewer::new(Vec::new(), "x", ImageProtocol::None, 2048);
        assert!(v.current_photo().is_none());
        assert_eq!(v.position(), (1, 0));
    }

    #[test]
    fn unique_target_appends_counter() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("shot.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("shot-1.jpg"), b"x").unwrap();

        let target = unique_target(dir.path(), "shot.jpg");
        assert_eq!(target, dir.path().join("shot-2.jpg"));
    }
}
