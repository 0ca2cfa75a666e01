//! Photo view: column-balanced (masonry) thumbnail grid for the
//! selected album.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use ratatui_image::StatefulImage;

use super::images::ImageLoader;
use crate::app::App;
use crate::config::ImageProtocol;
use crate::gallery::GalleryState;
use crate::store::Photo;

const COLUMN_WIDTH: u16 = 34;
const MIN_CELL_HEIGHT: u16 = 4;
const MAX_CELL_HEIGHT: u16 = 18;

/// One packed thumbnail: photo index plus its vertical slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasonryCell {
    pub index: usize,
    pub y: u16,
    pub height: u16,
}

/// Number of masonry columns that fit the given width.
pub fn masonry_columns(area_width: u16) -> usize {
    ((area_width / COLUMN_WIDTH).max(1) as usize).min(4)
}

/// Cell height in terminal rows for a photo rendered at column width.
/// Terminal cells are roughly twice as tall as wide.
fn cell_height(photo: &Photo) -> u16 {
    let rows = (photo.aspect() * COLUMN_WIDTH as f64 / 2.0).round() as u16;
    rows.clamp(MIN_CELL_HEIGHT, MAX_CELL_HEIGHT)
}

/// Pack photos into columns greedily: each photo, in sequence order,
/// goes to the currently shortest column.
pub fn pack_columns(photos: &[Photo], columns: usize) -> Vec<Vec<MasonryCell>> {
    let columns = columns.max(1);
    let mut packed: Vec<Vec<MasonryCell>> = vec![Vec::new(); columns];
    let mut heights: Vec<u16> = vec![0; columns];

    for (index, photo) in photos.iter().enumerate() {
        let col = heights
            .iter()
            .enumerate()
            .min_by_key(|(i, h)| (**h, *i))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let height = cell_height(photo);
        packed[col].push(MasonryCell {
            index,
            y: heights[col],
            height,
        });
        heights[col] += height;
    }

    packed
}

fn find_cell(layout: &[Vec<MasonryCell>], index: usize) -> Option<(usize, usize)> {
    for (col, cells) in layout.iter().enumerate() {
        if let Some(pos) = cells.iter().position(|c| c.index == index) {
            return Some((col, pos));
        }
    }
    None
}

/// Selection and scroll state for the photo grid.
pub struct PhotoView {
    pub selected: usize,
    /// Vertical scroll position in terminal rows.
    pub scroll_rows: u16,
    loader: ImageLoader,
}

impl PhotoView {
    pub fn new(protocol: ImageProtocol) -> Self {
        Self {
            selected: 0,
            scroll_rows: 0,
            loader: ImageLoader::new(protocol),
        }
    }

    pub fn reset(&mut self) {
        self.selected = 0;
        self.scroll_rows = 0;
        // Thumbnails from the previous album are no longer needed.
        self.loader.clear();
    }

    pub fn move_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_next(&mut self, count: usize) {
        if self.selected + 1 < count {
            self.selected += 1;
        }
    }

    /// Move selection up or down within the selected photo's column.
    pub fn move_vertical(&mut self, photos: &[Photo], columns: usize, down: bool) {
        let layout = pack_columns(photos, columns);
        let Some((col, pos)) = find_cell(&layout, self.selected) else {
            return;
        };
        let target = if down {
            pos + 1
        } else if pos == 0 {
            return;
        } else {
            pos - 1
        };
        if let Some(cell) = layout[col].get(target) {
            self.selected = cell.index;
        }
    }

    pub fn clamp_to(&mut self, count: usize) {
        if count == 0 {
            self.selected = 0;
            self.scroll_rows = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }

    /// Keep the selected cell fully inside the visible band.
    pub fn ensure_visible(&mut self, photos: &[Photo], columns: usize, view_height: u16) {
        let layout = pack_columns(photos, columns);
        let Some((col, pos)) = find_cell(&layout, self.selected) else {
            return;
        };
        let cell = layout[col][pos];

        if cell.y < self.scroll_rows {
            self.scroll_rows = cell.y;
        }
        let bottom = cell.y + cell.height;
        if bottom > self.scroll_rows + view_height {
            self.scroll_rows = bottom.saturating_sub(view_height);
        }
    }
}

/// Render the photo grid with header and footer.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let album_name = app
        .gallery
        .selected_album()
        .map(|a| a.name.clone())
        .unwrap_or_default();
    let photos: Vec<Photo> = app.gallery.photos().to_vec();
    let loading = app.gallery.state() == GalleryState::LoadingPhotos;
    let admin = app.session.is_admin();

    let view = &mut app.photo_view;
    view.loader.poll();
    view.clamp_to(photos.len());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(8),    // Masonry grid
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let header = Paragraph::new(format!(" {} | {} photos", album_name, photos.len()))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(header, chunks[0]);

    if loading {
        let indicator = Paragraph::new("Loading photos...")
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center);
        frame.render_widget(indicator, centered_line(chunks[1]));
    } else if photos.is_empty() {
        let hint = if admin {
            "No photos in this album — press u to upload"
        } else {
            "No photos in this album"
        };
        let hint = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(hint, centered_line(chunks[1]));
    } else {
        let columns = masonry_columns(chunks[1].width);
        view.ensure_visible(&photos, columns, chunks[1].height);
        render_masonry(frame, view, &photos, chunks[1], columns);
    }

    let help = if admin {
        "Arrows:move | Enter:view | u:upload | d:delete | Esc:albums | ?:help"
    } else {
        "Arrows:move | Enter:view | Esc:albums | ?:help"
    };
    let footer = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);
}

fn render_masonry(frame: &mut Frame, view: &mut PhotoView, photos: &[Photo], area: Rect, columns: usize) {
    let layout = pack_columns(photos, columns);
    let scroll = view.scroll_rows;

    for (col, cells) in layout.iter().enumerate() {
        let x = area.x + col as u16 * COLUMN_WIDTH;
        if x + COLUMN_WIDTH > area.x + area.width {
            break;
        }

        for cell in cells {
            // Skip cells outside the visible band.
            if cell.y < scroll || cell.y + cell.height > scroll + area.height {
                continue;
            }
            let cell_area = Rect::new(x, area.y + (cell.y - scroll), COLUMN_WIDTH, cell.height);
            let photo = &photos[cell.index];
            render_thumbnail_cell(frame, view, photo, cell_area, cell.index == view.selected);
        }
    }
}

fn render_thumbnail_cell(
    frame: &mut Frame,
    view: &mut PhotoView,
    photo: &Photo,
    area: Rect,
    is_selected: bool,
) {
    let border_color = if is_selected { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width < 2 || inner.height < 1 {
        return;
    }

    if let Some(protocol) = view.loader.get(&photo.id, &photo.thumbnail, 256) {
        let image = StatefulImage::new(None);
        frame.render_stateful_widget(image, inner, protocol);
    } else if view.loader.is_loading(&photo.id) {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center);
        frame.render_widget(loading, centered_line(inner));
    } else {
        let placeholder = Paragraph::new("[ ]")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(placeholder, centered_line(inner));
    }
}

fn centered_line(area: Rect) -> Rect {
    if area.height <= 1 {
        return area;
    }
    let y_offset = area.height / 2;
    Rect::new(area.x, area.y + y_offset, area.width, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str, width: u32, height: u32) -> Photo {
        Photo {
            id: id.to_string(),
            album_id: "a".to_string(),
            name: id.to_string(),
            source: format!("/library/{}.jpg", id),
            thumbnail: format!("/thumbs/{}.jpg", id),
            added_at: "2024-01-15T00:00:00".to_string(),
            width,
            height,
        }
    }

    #[test]
    fn packs_into_shortest_column() {
        // Tall portrait first, then landscapes: the landscapes should
        // pile into the other columns before returning to column 0.
        let photos = vec![
            photo("tall", 800, 2400),
            photo("wide-1", 1600, 400),
            photo("wide-2", 1600, 400),
            photo("wide-3", 1600, 400),
        ];
        let layout = pack_columns(&photos, 2);

        assert_eq!(layout[0].len(), 1);
        assert_eq!(layout[0][0].index, 0);
        // All three landscapes stack in column 1 until it outgrows
        // the clamped height of the portrait.
        assert_eq!(layout[1].len(), 3);
        assert_eq!(
            layout[1].iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn cells_stack_without_gaps() {
        let photos: Vec<Photo> = (0..6).map(|i| photo(&format!("p{}", i), 1600, 1067)).collect();
        let layout = pack_columns(&photos, 3);

        for cells in &layout {
            let mut expected_y = 0;
            for cell in cells {
                assert_eq!(cell.y, expected_y);
                expected_y += cell.height;
            }
        }
    }

    #[test]
    fn sequence_order_is_preserved_within_columns() {
        let photos: Vec<Photo> = (0..8).map(|i| photo(&format!("p{}", i), 1600, 1067)).collect();
        let layout = pack_columns(&photos, 3);

        for cells in &layout {
            let indices: Vec<usize> = cells.iter().map(|c| c.index).collect();
            let mut sorted = indices.clone();
            sorted.sort_unstable();
            assert_eq!(indices, sorted);
        }
    }

    #[test]
    fn every_photo_is_placed_exactly_once() {
        let photos: Vec<Photo> = (0..10).map(|i| photo(&format!("p{}", i), 1600, 1067)).collect();
        let layout = pack_columns(&photos, 4);

        let mut indices: Vec<usize> = layout.iter().flatten().map(|c| c.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn vertical_navigation_stays_in_column() {
        let photos: Vec<Photo> = (0..9).map(|i| photo(&format!("p{}", i), 1600, 1067)).collect();
        let columns = 3;
        let layout = pack_columns(&photos, columns);

        let mut view = PhotoView::new(ImageProtocol::None);
        view.selected = layout[1][0].index;
        view.move_vertical(&photos, columns, true);
        assert_eq!(view.selected, layout[1][1].index);

        view.move_vertical(&photos, columns, false);
        assert_eq!(view.selected, layout[1][0].index);
        // At the top of the column, up is a no-op.
        view.move_vertical(&photos, columns, false);
        assert_eq!(view.selected, layout[1][0].index);
    }

    #[test]
    fn horizontal_navigation_clamps() {
        let mut view = PhotoView::new(ImageProtocol::None);
        view.move_prev();
        assert_eq!(view.selected, 0);
        view.move_next(2);
        view.move_next(2);
        assert_eq!(view.selected, 1);
    }

    #[test]
    fn masonry_column_count_is_bounded() {
        assert_eq!(masonry_columns(20), 1);
        assert_eq!(masonry_columns(120), 3);
        assert_eq!(masonry_columns(400), 4);
    }
}
