pub mod albums;
pub mod confirm_dialog;
pub mod contact_dialog;
pub mod create_album_dialog;
mod dialogs;
mod images;
pub mod login_dialog;
pub mod photos;
mod status_bar;
pub mod upload_dialog;
pub mod viewer;

use ratatui::prelude::*;
use ratatui::widgets::Clear;

use crate::app::{App, AppMode};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if app.clear_on_next_render {
        frame.render_widget(Clear, area);
        app.clear_on_next_render = false;
    }

    // The viewer owns the whole frame, including its own info bar.
    if app.mode == AppMode::Viewer {
        if let Some(ref mut viewer) = app.viewer {
            viewer::render(frame, viewer, area);
        }
        return;
    }

    // Main layout: content area + status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    // The gallery behind any dialog follows the selection state:
    // album grid until an album is selected, photo grid after.
    if app.gallery.selected_album().is_some() {
        photos::render(frame, app, main_chunks[0]);
    } else {
        albums::render(frame, app, main_chunks[0]);
    }

    status_bar::render(frame, app, main_chunks[1]);

    match app.mode {
        AppMode::Login => {
            if let Some(ref dialog) = app.login_dialog {
                login_dialog::render(frame, dialog, area);
            }
        }
        AppMode::CreateAlbum => {
            if let Some(ref dialog) = app.create_album_dialog {
                create_album_dialog::render(frame, dialog, area);
            }
        }
        AppMode::Upload => {
            if let Some(ref dialog) = app.upload_dialog {
                upload_dialog::render(frame, dialog, area);
            }
        }
        AppMode::Contact => {
            if let Some(ref dialog) = app.contact_dialog {
                contact_dialog::render(frame, dialog, area);
            }
        }
        AppMode::Confirming => {
            if let Some(ref dialog) = app.confirm_dialog {
                confirm_dialog::render(frame, dialog, area);
            }
        }
        AppMode::Help => dialogs::render_help(frame, area),
        _ => {}
    }
}
