use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Render the help overlay.
pub fn render_help(frame: &mut Frame, area: Rect) {
    let dialog_width = 58.min(area.width.saturating_sub(4));
    let dialog_height = 22.min(area.height.saturating_sub(4));

    let x = (area.width - dialog_width) / 2;
    let y = (area.height - dialog_height) / 2;

    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let help_text = vec![
        Line::from(Span::styled(
            "Encore",
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from("  Albums"),
        Line::from("    h/j/k/l, Arrows   Move selection"),
        Line::from("    Enter             Open album"),
        Line::from("    r                 Reload albums"),
        Line::from("    n                 New album (admin)"),
        Line::from("    d                 Delete album (admin)"),
        Line::from(""),
        Line::from("  Photos"),
        Line::from("    h/j/k/l, Arrows   Move selection"),
        Line::from("    Enter/v           View photo"),
        Line::from("    u                 Upload photo (admin)"),
        Line::from("    d                 Delete photo (admin)"),
        Line::from("    Esc/q             Back to albums"),
        Line::from(""),
        Line::from("  Anywhere"),
        Line::from("    m                 Contact / booking form"),
        Line::from("    a                 Sign in / sign out"),
        Line::from("    ?                 Toggle this help"),
        Line::from("    q, Ctrl+C         Quit"),
    ];

    let paragraph = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help "),
    );

    frame.render_widget(paragraph, dialog_area);
}
