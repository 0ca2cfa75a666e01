//! Admin login dialog.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Which input field has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

pub struct LoginDialog {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    /// Inline failure message from the last attempt.
    pub error: Option<String>,
}

impl LoginDialog {
    pub fn new() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            focus: LoginField::Username,
            error: None,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    pub fn handle_char(&mut self, c: char) {
        match self.focus {
            LoginField::Username => self.username.push(c),
            LoginField::Password => self.password.push(c),
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        match self.focus {
            LoginField::Username => self.username.pop(),
            LoginField::Password => self.password.pop(),
        };
    }
}

impl Default for LoginDialog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render(frame: &mut Frame, dialog: &LoginDialog, area: Rect) {
    let dialog_width = 44.min(area.width.saturating_sub(4));
    let dialog_height = 12.min(area.height.saturating_sub(4));

    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Sign In ");
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Length(1), // Error line
            Constraint::Length(1), // Footer
        ])
        .split(dialog_area);

    render_field(
        frame,
        chunks[0],
        "Username",
        &dialog.username,
        dialog.focus == LoginField::Username,
    );

    let masked: String = "•".repeat(dialog.password.chars().count());
    render_field(
        frame,
        chunks[1],
        "Password",
        &masked,
        dialog.focus == LoginField::Password,
    );

    if let Some(ref error) = dialog.error {
        let line = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        frame.render_widget(line, chunks[2]);
    }

    let footer = Paragraph::new("Tab: switch | Enter: sign in | Esc: cancel")
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
    fn typing_goes_to_the_focused_field() {
        let mut dialog = LoginDialog::new();
        dialog.handle_char('a');
        dialog.toggle_focus();
        dialog.handle_char('p');
        assert_eq!(dialog.username, "a");
        assert_eq!(dialog.password, "p");
    }

    #[test]
    fn typing_clears_previous_error() {
        let mut dialog = LoginDialog::new();
        dialog.error = Some("invalid username or password".to_string());
        dialog.handle_char('x');
        assert!(dialog.error.is_none());
    }

    #[test]
    fn backspace_edits_focused_field() {
        let mut dialog = LoginDialog::new();
        dialog.username = "admin".to_string();
        dialog.backspace();
        assert_eq!(dialog.username, "admi");
    }
}
