//! Dialog for creating a new album.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumField {
    Name,
    Description,
}

pub struct CreateAlbumDialog {
    pub name: String,
    pub description: String,
    pub focus: AlbumField,
    pub error: Option<String>,
}

impl CreateAlbumDialog {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            focus: AlbumField::Name,
            error: None,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            AlbumField::Name => AlbumField::Description,
            AlbumField::Description => AlbumField::Name,
        };
    }

    pub fn handle_char(&mut self, c: char) {
        match self.focus {
            AlbumField::Name => self.name.push(c),
            AlbumField::Description => self.description.push(c),
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        match self.focus {
            AlbumField::Name => self.name.pop(),
            AlbumField::Description => self.description.pop(),
        };
    }

    /// The description to store: None when left empty.
    pub fn description_value(&self) -> Option<&str> {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Validate before submitting.
    pub fn validate(&mut self) -> bool {
        if self.name.trim().is_empty() {
            self.error = Some("Album name is required".to_string());
            false
        } else {
            true
        }
    }
}

impl Default for CreateAlbumDialog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render(frame: &mut Frame, dialog: &CreateAlbumDialog, area: Rect) {
    let dialog_width = 52.min(area.width.saturating_sub(4));
    let dialog_height = 12.min(area.height.saturating_sub(4));

    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" New Album ");
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(3), // Description
            Constraint::Length(1), // Error line
            Constraint::Length(1), // Footer
        ])
        .split(dialog_area);

    render_field(frame, chunks[0], "Name", &dialog.name, dialog.focus == AlbumField::Name);
    render_field(
        frame,
        chunks[1],
        "Description (optional)",
        &dialog.description,
        dialog.focus == AlbumField::Description,
    );

    if let Some(ref error) = dialog.error {
        let line = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(line, chunks[2]);
    }

    let footer = Paragraph::new("Tab: switch | Enter: create | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[3]);
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let text = if focused {
        format!("{}_", value)
    } else {
        value.to_string()
    };

    let field = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", label)),
    );
    frame.render_widget(field, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_fails_validation() {
        let mut dialog = CreateAlbumDialog::new();
        dialog.name = "   ".to_string();
        assert!(!dialog.validate());
        assert!(dialog.error.is_some());
    }

    #[test]
    fn blank_description_becomes_none() {
        let mut dialog = CreateAlbumDialog::new();
        dialog.name = "Test Show".to_string();
        dialog.description = "  ".to_string();
        assert!(dialog.validate());
        assert!(dialog.description_value().is_none());

        dialog.description = " Live at the forum ".to_string();
        assert_eq!(dialog.description_value(), Some("Live at the forum"));
    }
}
