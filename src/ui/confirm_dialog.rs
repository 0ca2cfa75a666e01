//! Confirmation dialog for destructive actions.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// The destructive action awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteAlbum { album_id: String, name: String },
    DeletePhoto { photo_id: String, name: String },
}

pub struct ConfirmDialog {
    pub action: ConfirmAction,
    pub message: String,
}

impl ConfirmDialog {
    pub fn new(action: ConfirmAction) -> Self {
        let message = match &action {
            ConfirmAction::DeleteAlbum { name, .. } => format!(
                "Delete album \"{}\" and all of its photos? This cannot be undone.",
                name
            ),
            ConfirmAction::DeletePhoto { name, .. } => {
                format!("Delete photo \"{}\"? This cannot be undone.", name)
            }
        };
        Self { action, message }
    }
}

pub fn render(frame: &mut Frame, dialog: &ConfirmDialog, area: Rect) {
    let dialog_width = 56.min(area.width.saturating_sub(4));
    let dialog_height = 9.min(area.height.saturating_sub(4));

    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(3),    // Message
            Constraint::Length(3), // Buttons
        ])
        .split(dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Confirm Delete ");
    frame.render_widget(block, dialog_area);

    let message = Paragraph::new(dialog.message.as_str())
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);
    frame.render_widget(message, chunks[0]);

    let buttons = Line::from(vec![
        Span::styled(
            "  [Enter/y] ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw("Delete"),
        Span::raw("    "),
        Span::styled(
            "[Esc/n] ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("Keep"),
    ]);
    let button_widget = Paragraph::new(buttons).alignment(Alignment::Center);
    frame.render_widget(button_widget, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_target() {
        let dialog = ConfirmDialog::new(ConfirmAction::DeleteAlbum {
            album_id: "a1".to_string(),
            name: "Test Show".to_string(),
        });
        assert!(dialog.message.contains("Test Show"));
        assert!(dialog.message.contains("all of its photos"));

        let dialog = ConfirmDialog::new(ConfirmAction::DeletePhoto {
            photo_id: "p1".to_string(),
            name: "stage.jpg".to_string(),
        });
        assert!(dialog.message.contains("stage.jpg"));
    }
}
