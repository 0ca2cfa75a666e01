//! Album view: the selectable tile grid.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use ratatui_image::StatefulImage;

use super::images::ImageLoader;
use crate::app::App;
use crate::config::ImageProtocol;
use crate::gallery::GalleryState;
use crate::store::Album;

const TILE_WIDTH: u16 = 36;
const TILE_HEIGHT: u16 = 14;

/// Selection and scroll state for the album grid. The album list
/// itself lives in the gallery controller.
pub struct AlbumView {
    pub selected: usize,
    /// First visible row (for scrolling)
    pub scroll_offset: usize,
    loader: ImageLoader,
}

impl AlbumView {
    pub fn new(protocol: ImageProtocol) -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            loader: ImageLoader::new(protocol),
        }
    }

    pub fn columns(&self, area_width: u16) -> usize {
        (area_width / TILE_WIDTH).max(1) as usize
    }

    pub fn visible_rows(&self, area_height: u16) -> usize {
        (area_height / TILE_HEIGHT).max(1) as usize
    }

    pub fn move_left(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_right(&mut self, count: usize) {
        if self.selected + 1 < count {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self, columns: usize) {
        if self.selected >= columns {
            self.selected -= columns;
        }
    }

    pub fn move_down(&mut self, columns: usize, count: usize) {
        let new_idx = self.selected + columns;
        if new_idx < count {
            self.selected = new_idx;
        }
    }

    /// Clamp selection after the album list changed underneath us.
    pub fn clamp_to(&mut self, count: usize) {
        if count == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }

    pub fn ensure_visible(&mut self, columns: usize, visible_rows: usize) {
        let selected_row = self.selected / columns;
        if selected_row < self.scroll_offset {
            self.scroll_offset = selected_row;
        }
        if selected_row >= self.scroll_offset + visible_rows {
            self.scroll_offset = selected_row - visible_rows + 1;
        }
    }
}

/// Render the album grid with header and footer.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let albums: Vec<Album> = app.gallery.albums().to_vec();
    let loading = app.gallery.state() == GalleryState::LoadingAlbums;
    let view = &mut app.album_view;
    view.loader.poll();
    view.clamp_to(albums.len());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // Grid
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let header = Paragraph::new(format!(" Albums | {} albums", albums.len()))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(header, chunks[0]);

    if loading {
        let indicator = Paragraph::new("Loading albums...")
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center);
        frame.render_widget(indicator, centered_line(chunks[1]));
    } else if albums.is_empty() {
        let hint = Paragraph::new("No albums yet")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(hint, centered_line(chunks[1]));
    } else {
        let columns = view.columns(chunks[1].width);
        let visible_rows = view.visible_rows(chunks[1].height);
        view.ensure_visible(columns, visible_rows);
        render_grid(frame, view, &albums, chunks[1], columns, visible_rows);
    }

    let help = "Arrows:move | Enter:open | m:contact | a:account | ?:help | q:quit";
    let footer = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);
}

fn render_grid(
    frame: &mut Frame,
    view: &mut AlbumView,
    albums: &[Album],
    area: Rect,
    columns: usize,
    visible_rows: usize,
) {
    let col_constraints: Vec<Constraint> =
        (0..columns).map(|_| Constraint::Length(TILE_WIDTH)).collect();
    let row_constraints: Vec<Constraint> =
        (0..visible_rows).map(|_| Constraint::Length(TILE_HEIGHT)).collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let actual_row = view.scroll_offset + row_idx;
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints.clone())
            .split(*row_area);

        for (col_idx, cell_area) in cols.iter().enumerate() {
            let album_idx = actual_row * columns + col_idx;
            if let Some(album) = albums.get(album_idx) {
                let is_selected = album_idx == view.selected;
                render_tile(frame, view, album, *cell_area, is_selected);
            }
        }
    }
}

fn render_tile(frame: &mut Frame, view: &mut AlbumView, album: &Album, area: Rect, is_selected: bool) {
    let border_color = if is_selected { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(truncated(&album.name, area.width.saturating_sub(4) as usize));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 || inner.width < 4 {
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(2)])
        .split(inner);

    // Cover image, when the album has one.
    if let Some(ref cover) = album.cover_photo {
        if let Some(protocol) = view.loader.get(&album.id, cover, 256) {
            let image = StatefulImage::new(None);
            frame.render_stateful_widget(image, parts[0], protocol);
        } else if view.loader.is_loading(&album.id) {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
                .alignment(Alignment::Center);
            frame.render_widget(loading, centered_line(parts[0]));
        }
    } else {
        let placeholder = Paragraph::new("[ no cover ]")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(placeholder, centered_line(parts[0]));
    }

    let description = album.description.as_deref().unwrap_or("");
    let caption = vec![
        Line::from(Span::styled(
            truncated(description, parts[1].width as usize),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            format!("{} photos · {}", album.photo_count, display_date(&album.created_at)),
            Style::default().fg(Color::Yellow),
        )),
    ];
    frame.render_widget(Paragraph::new(caption), parts[1]);
}

fn centered_line(area: Rect) -> Rect {
    if area.height <= 1 {
        return area;
    }
    let y_offset = area.height / 2;
    Rect::new(area.x, area.y + y_offset, area.width, 1)
}

fn truncated(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Date portion of an ISO-8601 timestamp.
fn display_date(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageProtocol;

    fn view() -> AlbumView {
        AlbumView::new(ImageProtocol::None)
    }

    #[test]
    fn navigation_clamps_at_edges() {
        let mut v = view();
        v.move_left();
        assert_eq!(v.selected, 0);

        v.move_right(3);
        v.move_right(3);
        v.move_right(3);
        assert_eq!(v.selected, 2);

        v.move_down(2, 3);
        assert_eq!(v.selected, 2);
        v.move_up(2);
        assert_eq!(v.selected, 0);
    }

    #[test]
    fn clamp_follows_shrinking_list() {
        let mut v = view();
        v.selected = 5;
        v.clamp_to(3);
        assert_eq!(v.selected, 2);
        v.clamp_to(0);
        assert_eq!(v.selected, 0);
    }

    #[test]
    fn ensure_visible_scrolls_to_selection() {
        let mut v = view();
        v.selected = 9; // row 4 with 2 columns
        v.ensure_visible(2, 2);
        assert_eq!(v.scroll_offset, 3);

        v.selected = 0;
        v.ensure_visible(2, 2);
        assert_eq!(v.scroll_offset, 0);
    }

    #[test]
    fn display_date_strips_time() {
        assert_eq!(display_date("2024-01-15T12:30:00"), "2024-01-15");
        assert_eq!(display_date("2024-01-15"), "2024-01-15");
    }
}
