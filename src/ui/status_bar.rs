use ratatui::{
    prelude::*,
    widgets::Paragraph,
};

use crate::app::{App, AppMode};
use crate::gallery::GalleryState;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    // If there's a status message, show it prominently
    if let Some(ref message) = app.status_message {
        let line = Line::from(vec![Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        )]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let context = match app.mode {
        AppMode::Photos | AppMode::Viewer => app
            .gallery
            .selected_album()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Photos".to_string()),
        _ => "Albums".to_string(),
    };

    let position = match app.gallery.state() {
        GalleryState::LoadingAlbums => "loading albums...".to_string(),
        GalleryState::LoadingPhotos => "loading photos...".to_string(),
        GalleryState::AlbumsReady => {
            let count = app.gallery.albums().len();
            if count > 0 {
                format!("{}/{}", app.album_view.selected + 1, count)
            } else {
                "0/0".to_string()
            }
        }
        GalleryState::PhotosReady => {
            let count = app.gallery.photos().len();
            if count > 0 {
                format!("{}/{}", app.photo_view.selected + 1, count)
            } else {
                "0/0".to_string()
            }
        }
    };

    let account = match app.session.username() {
        Some(name) if app.session.is_admin() => format!("{} (admin)", name),
        Some(name) => name.to_string(),
        None => "guest".to_string(),
    };

    // Build running task indicators
    let running_tasks = app.task_manager.running_tasks();
    let task_indicators: String = if running_tasks.is_empty() {
        String::new()
    } else {
        let indicators: Vec<String> = running_tasks
            .iter()
            .map(|task| {
                if let Some(ref progress) = task.progress {
                    format!("[{}:{}%]", task.task_type.short_name(), progress.percent())
                } else {
                    format!("[{}:...]", task.task_type.short_name())
                }
            })
            .collect();
        indicators.join(" ")
    };

    let mut spans = Vec::new();

    spans.push(Span::styled(
        format!(" {} ", context),
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));

    spans.push(Span::styled(
        format!(" {} ", account),
        Style::default().fg(Color::Gray),
    ));

    if !task_indicators.is_empty() {
        spans.push(Span::styled(
            format!(" {} ", task_indicators),
            Style::default().fg(Color::Cyan),
        ));
    }

    // Calculate remaining space and add spacing
    let content_len: usize = spans.iter().map(|s| s.content.len()).sum();
    let help_text = format!(" {} | ?:help q:quit ", position);
    let help_len = help_text.len();

    let available = area.width as usize;
    if available > content_len + help_len {
        let spacing = " ".repeat(available - content_len - help_len);
        spans.push(Span::raw(spacing));
    }

    spans.push(Span::styled(
        help_text,
        Style::default().fg(Color::White).bg(Color::DarkGray),
    ));

    let line = Line::from(spans);
    frame.render_widget(Paragraph::new(line), area);
}
