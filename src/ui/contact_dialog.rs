//! Contact form dialog.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

/// Form submission status shown inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactStatus {
    Idle,
    Submitting,
    Success,
    Error(String),
}

pub struct ContactDialog {
    pub name: String,
    pub email: String,
    pub message: String,
    pub focus: ContactField,
    pub status: ContactStatus,
}

impl ContactDialog {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            message: String::new(),
            focus: ContactField::Name,
            status: ContactStatus::Idle,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            ContactField::Name => ContactField::Email,
            ContactField::Email => ContactField::Message,
            ContactField::Message => ContactField::Name,
        };
    }

    pub fn handle_char(&mut self, c: char) {
        match self.focus {
            ContactField::Name => self.name.push(c),
            ContactField::Email => self.email.push(c),
            ContactField::Message => self.message.push(c),
        }
        // A fresh edit clears the last outcome.
        if matches!(self.status, ContactStatus::Success | ContactStatus::Error(_)) {
            self.status = ContactStatus::Idle;
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            ContactField::Name => self.name.pop(),
            ContactField::Email => self.email.pop(),
            ContactField::Message => self.message.pop(),
        };
    }

    /// Validate before submitting; sets an error status on failure.
    pub fn validate(&mut self) -> bool {
        if self.name.trim().is_empty() || self.message.trim().is_empty() {
            self.status = ContactStatus::Error("Name and message are required".to_string());
            return false;
        }
        if !self.email.contains('@') {
            self.status = ContactStatus::Error("A valid email is required".to_string());
            return false;
        }
        true
    }

    /// Reset the fields after a successful send.
    pub fn clear_fields(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
        self.focus = ContactField::Name;
    }
}

impl Default for ContactDialog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render(frame: &mut Frame, dialog: &ContactDialog, area: Rect) {
    let dialog_width = 60.min(area.width.saturating_sub(4));
    let dialog_height = 18.min(area.height.saturating_sub(4));

    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Contact / Booking ");
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(3), // Email
            Constraint::Min(4),    // Message
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Footer
        ])
        .split(dialog_area);

    render_field(frame, chunks[0], "Name", &dialog.name, dialog.focus == ContactField::Name);
    render_field(frame, chunks[1], "Email", &dialog.email, dialog.focus == ContactField::Email);

    let message_border = if dialog.focus == ContactField::Message {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let message_text = if dialog.focus == ContactField::Message {
        format!("{}_", dialog.message)
    } else {
        dialog.message.clone()
    };
    let message = Paragraph::new(message_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(message_border))
                .title(" Message "),
        );
    frame.render_widget(message, chunks[2]);

    let status_line = match &dialog.status {
        ContactStatus::Idle => Paragraph::new(""),
        ContactStatus::Submitting => Paragraph::new("Sending...")
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)),
        ContactStatus::Success => Paragraph::new("Message sent, thank you!")
            .style(Style::default().fg(Color::Green)),
        ContactStatus::Error(e) => {
            Paragraph::new(e.as_str()).style(Style::default().fg(Color::Red))
        }
    };
    frame.render_widget(status_line.alignment(Alignment::Center), chunks[3]);

    let footer = Paragraph::new("Tab: next field | Enter: send | Esc: close")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[4]);
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
    fn validation_requires_name_message_and_email() {
        let mut dialog = ContactDialog::new();
        assert!(!dialog.validate());

        dialog.name = "Jo".to_string();
        dialog.message = "Booking inquiry".to_string();
        dialog.email = "not-an-email".to_string();
        assert!(!dialog.validate());

        dialog.email = "jo@example.com".to_string();
        assert!(dialog.validate());
    }

    #[test]
    fn editing_resets_a_finished_status() {
        let mut dialog = ContactDialog::new();
        dialog.status = ContactStatus::Success;
        dialog.handle_char('h');
        assert_eq!(dialog.status, ContactStatus::Idle);

        dialog.status = ContactStatus::Submitting;
        dialog.handle_char('i');
        assert_eq!(dialog.status, ContactStatus::Submitting);
    }

    #[test]
    fn clear_fields_empties_the_form() {
        let mut dialog = ContactDialog::new();
        dialog.name = "Jo".to_string();
        dialog.email = "jo@example.com".to_string();
        dialog.message = "hello".to_string();
        dialog.focus = ContactField::Message;

        dialog.clear_fields();
        assert!(dialog.name.is_empty());
        assert!(dialog.email.is_empty());
        assert!(dialog.message.is_empty());
        assert_eq!(dialog.focus, ContactField::Name);
    }
}
