//! File browser dialog for picking an image to upload.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use std::fs;
use std::path::PathBuf;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone)]
pub struct BrowserEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// State for the upload file browser.
pub struct UploadDialog {
    /// Album receiving the upload, for the header.
    pub album_name: String,
    pub current_dir: PathBuf,
    pub entries: Vec<BrowserEntry>,
    pub selected_index: usize,
}

impl UploadDialog {
    pub fn new(album_name: String, start_dir: PathBuf) -> Self {
        let mut dialog = Self {
            album_name,
            current_dir: start_dir.clone(),
            entries: Vec::new(),
            selected_index: 0,
        };
        dialog.load_directory(&start_dir);
        dialog
    }

    pub fn load_directory(&mut self, path: &PathBuf) {
        self.current_dir = path.clone();
        self.entries.clear();
        self.selected_index = 0;

        if let Ok(read_dir) = fs::read_dir(path) {
            let mut dirs = Vec::new();
            let mut files = Vec::new();
            for entry in read_dir.filter_map(|e| e.ok()) {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    continue;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if is_dir {
                    dirs.push(BrowserEntry { path, is_dir: true });
                } else if is_image(&path) {
                    files.push(BrowserEntry { path, is_dir: false });
                }
            }
            dirs.sort_by(|a, b| a.path.cmp(&b.path));
            files.sort_by(|a, b| a.path.cmp(&b.path));
            self.entries.extend(dirs);
            self.entries.extend(files);
        }
    }

    pub fn move_down(&mut self) {
        if !self.entries.is_empty() && self.selected_index < self.entries.len() - 1 {
            self.selected_index += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn go_parent(&mut self) {
        if let Some(parent) = self.current_dir.parent() {
            let parent = parent.to_path_buf();
            self.load_directory(&parent);
        }
    }

    /// Descend into the selected directory, or return the selected
    /// image path for upload.
    pub fn activate(&mut self) -> Option<PathBuf> {
        let entry = self.entries.get(self.selected_index)?.clone();
        if entry.is_dir {
            self.load_directory(&entry.path);
            None
        } else {
            Some(entry.path)
        }
    }
}

fn is_image(path: &std::path::Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn render(frame: &mut Frame, dialog: &UploadDialog, area: Rect) {
    let dialog_width = 70.min(area.width.saturating_sub(4));
    let dialog_height = 25.min(area.height.saturating_sub(4));

    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // File listing
            Constraint::Length(2), // Footer
        ])
        .split(dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Upload Photo ")
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(block, dialog_area);

    let header = Paragraph::new(format!("Uploading to: {}", dialog.album_name))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = dialog
        .entries
        .iter()
        .map(|entry| {
            let name = entry
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| entry.path.to_string_lossy().to_string());
            if entry.is_dir {
                ListItem::new(format!("/ {}", name)).style(Style::default().fg(Color::Cyan))
            } else {
                ListItem::new(format!("  {}", name)).style(Style::default().fg(Color::White))
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", dialog.current_dir.display())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(dialog.selected_index));
    frame.render_stateful_widget(list, chunks[1], &mut state);

    let footer = Paragraph::new("j/k: navigate | Enter: open dir / upload file | h: parent | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_directories_then_images_only() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("photo.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join(".hidden.png"), b"x").unwrap();

        let dialog = UploadDialog::new("Test".to_string(), dir.path().to_path_buf());
        assert_eq!(dialog.entries.len(), 2);
        assert!(dialog.entries[0].is_dir);
        assert!(!dialog.entries[1].is_dir);
        assert!(dialog.entries[1].path.ends_with("photo.jpg"));
    }

    #[test]
    fn activate_descends_into_directories() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("inner.png"), b"x").unwrap();

        let mut dialog = UploadDialog::new("Test".to_string(), dir.path().to_path_buf());
        assert!(dialog.activate().is_none());
        assert_eq!(dialog.current_dir, sub);
        assert_eq!(dialog.entries.len(), 1);
    }

    #[test]
    fn activate_returns_selected_image() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("photo.jpg"), b"x").unwrap();

        let mut dialog = UploadDialog::new("Test".to_string(), dir.path().to_path_buf());
        let picked = dialog.activate().unwrap();
        assert!(picked.ends_with("photo.jpg"));
    }
}
