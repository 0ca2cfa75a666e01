use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Identity, Session};
use crate::config::Config;
use crate::contact::Messenger;
use crate::gallery::GalleryController;
use crate::store::ContentStore;
use crate::tasks::{BackgroundTaskManager, TaskType, TaskUpdate};
use crate::ui;
use crate::ui::albums::AlbumView;
use crate::ui::confirm_dialog::{ConfirmAction, ConfirmDialog};
use crate::ui::contact_dialog::{ContactDialog, ContactStatus};
use crate::ui::create_album_dialog::CreateAlbumDialog;
use crate::ui::login_dialog::LoginDialog;
use crate::ui::photos::{masonry_columns, PhotoView};
use crate::ui::upload_dialog::UploadDialog;
use crate::ui::viewer::PhotoViewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Albums,
    Photos,
    Viewer,
    Help,
    Login,
    CreateAlbum,
    Upload,
    Contact,
    Confirming,
}

pub struct App {
    pub config: Config,
    pub store: Arc<ContentStore>,
    pub identity: Identity,
    pub session: Session,
    pub messenger: Messenger,
    pub gallery: GalleryController,
    pub mode: AppMode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    // Views
    pub album_view: AlbumView,
    pub photo_view: PhotoView,
    pub viewer: Option<PhotoViewer>,
    // Dialog state
    pub login_dialog: Option<LoginDialog>,
    pub create_album_dialog: Option<CreateAlbumDialog>,
    pub upload_dialog: Option<UploadDialog>,
    pub contact_dialog: Option<ContactDialog>,
    pub confirm_dialog: Option<ConfirmDialog>,
    // Background task manager
    pub task_manager: BackgroundTaskManager,
    // Flag to trigger full screen clear on next render
    // Used when leaving views with terminal graphics (viewer)
    pub clear_on_next_render: bool,
}

impl App {
    pub fn new(config: Config, store: ContentStore) -> Result<Self> {
        let store = Arc::new(store);
        let identity = Identity::new(config.auth.users.clone());
        let messenger = Messenger::from_config(&config.contact);
        let protocol = config.preview.protocol;

        let mut gallery = GalleryController::new();
        gallery.load_albums(&store);

        Ok(Self {
            config,
            store,
            identity,
            session: Session::anonymous(),
            messenger,
            gallery,
            mode: AppMode::Albums,
            should_quit: false,
            status_message: None,
            album_view: AlbumView::new(protocol),
            photo_view: PhotoView::new(protocol),
            viewer: None,
            login_dialog: None,
            create_album_dialog: None,
            upload_dialog: None,
            contact_dialog: None,
            confirm_dialog: None,
            task_manager: BackgroundTaskManager::new(),
            clear_on_next_render: false,
        })
    }

    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            // Poll for task updates and handle completions
            let completions = self.task_manager.poll_updates();
            for completion in completions {
                let prefix = completion.task_type.display_name();
                match completion.task_type {
                    TaskType::Upload => {
                        if completion.success {
                            self.status_message = Some(format!("{}: {}", prefix, completion.message));
                            // Fresh photo list and album counts after an upload
                            self.gallery.reload_photos(&self.store);
                            self.gallery.load_albums(&self.store);
                        } else {
                            self.status_message = Some(format!("{} - {}", prefix, completion.message));
                        }
                    }
                    TaskType::SendMessage => {
                        if let Some(dialog) = self.contact_dialog.as_mut() {
                            if completion.success {
                                dialog.status = ContactStatus::Success;
                                dialog.clear_fields();
                            } else {
                                dialog.status = ContactStatus::Error(completion.message.clone());
                            }
                        } else if completion.success {
                            self.status_message = Some(format!("{}: {}", prefix, completion.message));
                        } else {
                            self.status_message = Some(format!("{} - {}", prefix, completion.message));
                        }
                    }
                }
            }

            // Fold completed album/photo fetches into the controller
            self.gallery.poll();

            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key)?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Mode the app falls back to when a dialog closes.
    fn base_mode(&self) -> AppMode {
        if self.gallery.selected_album().is_some() {
            AppMode::Photos
        } else {
            AppMode::Albums
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        match self.mode {
            AppMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.mode = self.base_mode();
                }
                Ok(())
            }
            AppMode::Albums => self.handle_albums_key(key),
            AppMode::Photos => self.handle_photos_key(key),
            AppMode::Viewer => self.handle_viewer_key(key),
            AppMode::Login => self.handle_login_key(key),
            AppMode::CreateAlbum => self.handle_create_album_key(key),
            AppMode::Upload => self.handle_upload_key(key),
            AppMode::Contact => self.handle_contact_key(key),
            AppMode::Confirming => self.handle_confirm_key(key),
        }
    }

    // --- Album view ---

    fn handle_albums_key(&mut self, key: KeyEvent) -> Result<()> {
        let count = self.gallery.albums().len();
        // Approximate terminal width; the renderer re-clamps
        let columns = self.album_view.columns(120);

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::Esc => {
                if self.task_manager.has_running_tasks() {
                    if self.task_manager.cancel_most_recent() {
                        self.status_message = Some("Task cancelled".to_string());
                    }
                } else {
                    self.status_message = None;
                }
            }

            KeyCode::Char('h') | KeyCode::Left => self.album_view.move_left(),
            KeyCode::Char('l') | KeyCode::Right => self.album_view.move_right(count),
            KeyCode::Char('k') | KeyCode::Up => self.album_view.move_up(columns),
            KeyCode::Char('j') | KeyCode::Down => self.album_view.move_down(columns, count),

            KeyCode::Enter | KeyCode::Char(' ') => self.open_selected_album(),

            KeyCode::Char('r') => {
                self.gallery.load_albums(&self.store);
                self.status_message = Some("Reloading albums...".to_string());
            }

            KeyCode::Char('m') => self.open_contact_dialog(),
            KeyCode::Char('a') => self.toggle_account(),

            KeyCode::Char('n') => {
                if self.session.is_admin() {
                    self.create_album_dialog = Some(CreateAlbumDialog::new());
                    self.mode = AppMode::CreateAlbum;
                } else {
                    self.status_message = Some("Sign in as admin to manage albums".to_string());
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if !self.session.is_admin() {
                    self.status_message = Some("Sign in as admin to manage albums".to_string());
                } else if let Some(album) = self.gallery.albums().get(self.album_view.selected) {
                    self.confirm_dialog = Some(ConfirmDialog::new(ConfirmAction::DeleteAlbum {
                        album_id: album.id.clone(),
                        name: album.name.clone(),
                    }));
                    self.mode = AppMode::Confirming;
                }
            }

            _ => {}
        }

        Ok(())
    }

    fn open_selected_album(&mut self) {
        let Some(album) = self.gallery.albums().get(self.album_view.selected).cloned() else {
            return;
        };
        self.photo_view.reset();
        self.gallery.select_album(album, &self.store);
        self.mode = AppMode::Photos;
    }

    // --- Photo view ---

    fn handle_photos_key(&mut self, key: KeyEvent) -> Result<()> {
        let photos = self.gallery.photos().to_vec();
        let columns = masonry_columns(120);

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.gallery.back_to_albums();
                self.photo_view.reset();
                self.mode = AppMode::Albums;
                self.clear_on_next_render = true;
            }
            KeyCode::Char('?') => self.mode = AppMode::Help,

            KeyCode::Char('h') | KeyCode::Left => self.photo_view.move_prev(),
            KeyCode::Char('l') | KeyCode::Right => self.photo_view.move_next(photos.len()),
            KeyCode::Char('k') | KeyCode::Up => {
                self.photo_view.move_vertical(&photos, columns, false)
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.photo_view.move_vertical(&photos, columns, true)
            }
            KeyCode::Char('g') => self.photo_view.selected = 0,
            KeyCode::Char('G') => self.photo_view.selected = photos.len().saturating_sub(1),

            KeyCode::Enter | KeyCode::Char('v') => {
                if let Some(photo) = photos.get(self.photo_view.selected) {
                    self.viewer = Some(PhotoViewer::new(
                        photos.clone(),
                        &photo.id,
                        self.config.preview.protocol,
                        self.config.preview.viewer_size,
                    ));
                    self.mode = AppMode::Viewer;
                }
            }

            KeyCode::Char('r') => {
                self.gallery.reload_photos(&self.store);
                self.status_message = Some("Reloading photos...".to_string());
            }

            KeyCode::Char('m') => self.open_contact_dialog(),
            KeyCode::Char('a') => self.toggle_account(),

            KeyCode::Char('u') => {
                if !self.session.is_admin() {
                    self.status_message = Some("Sign in as admin to upload".to_string());
                } else if let Some(album) = self.gallery.selected_album() {
                    let start_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
                    self.upload_dialog = Some(UploadDialog::new(album.name.clone(), start_dir));
                    self.mode = AppMode::Upload;
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if !self.session.is_admin() {
                    self.status_message = Some("Sign in as admin to manage photos".to_string());
                } else if let Some(photo) = photos.get(self.photo_view.selected) {
                    self.confirm_dialog = Some(ConfirmDialog::new(ConfirmAction::DeletePhoto {
                        photo_id: photo.id.clone(),
                        name: photo.name.clone(),
                    }));
                    self.mode = AppMode::Confirming;
                }
            }

            _ => {}
        }

        Ok(())
    }

    // --- Photo viewer ---

    fn handle_viewer_key(&mut self, key: KeyEvent) -> Result<()> {
        let viewer = match self.viewer.as_mut() {
            Some(v) => v,
            None => {
                self.mode = self.base_mode();
                return Ok(());
            }
        };

        match key.code {
            // Closing drops the viewer and restores the grid behind it
            KeyCode::Esc | KeyCode::Char('q') => {
                self.viewer = None;
                self.mode = AppMode::Photos;
                self.clear_on_next_render = true;
            }

            KeyCode::Char('h') | KeyCode::Left => viewer.prev(),
            KeyCode::Char('l') | KeyCode::Right => viewer.next(),
            KeyCode::Char('g') => viewer.first(),
            KeyCode::Char('G') => viewer.last(),

            KeyCode::Char('d') => match viewer.download() {
                Ok(target) => {
                    self.status_message = Some(format!("Saved to {}", target.display()));
                }
                Err(e) => {
                    self.status_message = Some(format!("Download failed: {}", e));
                }
            },

            _ => {}
        }

        Ok(())
    }

    // --- Account ---

    fn toggle_account(&mut self) {
        if self.session.is_authenticated() {
            let name = self.session.username().unwrap_or("guest").to_string();
            self.session = self.identity.logout();
            self.status_message = Some(format!("Signed out {}", name));
        } else {
            self.login_dialog = Some(LoginDialog::new());
            self.mode = AppMode::Login;
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Result<()> {
        let dialog = match self.login_dialog.as_mut() {
            Some(d) => d,
            None => {
                self.mode = self.base_mode();
                return Ok(());
            }
        };

        match key.code {
            KeyCode::Esc => {
                self.login_dialog = None;
                self.mode = self.base_mode();
            }
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => dialog.toggle_focus(),
            KeyCode::Enter => {
                match self.identity.login(&dialog.username, &dialog.password) {
                    Ok(session) => {
                        let name = session.username().unwrap_or_default().to_string();
                        self.session = session;
                        self.login_dialog = None;
                        self.mode = self.base_mode();
                        self.status_message = Some(format!("Signed in as {}", name));
                    }
                    Err(e) => {
                        dialog.error = Some(e.to_string());
                        dialog.password.clear();
                    }
                }
            }
            KeyCode::Backspace => dialog.backspace(),
            KeyCode::Char(c) if !c.is_control() => dialog.handle_char(c),
            _ => {}
        }

        Ok(())
    }

    // --- Create album ---

    fn handle_create_album_key(&mut self, key: KeyEvent) -> Result<()> {
        let dialog = match self.create_album_dialog.as_mut() {
            Some(d) => d,
            None => {
                self.mode = self.base_mode();
                return Ok(());
            }
        };

        match key.code {
            KeyCode::Esc => {
                self.create_album_dialog = None;
                self.mode = self.base_mode();
            }
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => dialog.toggle_focus(),
            KeyCode::Enter => {
                if !dialog.validate() {
                    return Ok(());
                }
                let name = dialog.name.trim().to_string();
                let description = dialog.description_value().map(|d| d.to_string());
                match self
                    .store
                    .create_album(&self.session, &name, description.as_deref())
                {
                    Ok(album) => {
                        self.create_album_dialog = None;
                        self.mode = self.base_mode();
                        self.status_message = Some(format!("Album \"{}\" created", album.name));
                        self.gallery.load_albums(&self.store);
                    }
                    Err(e) => {
                        dialog.error = Some(e.to_string());
                    }
                }
            }
            KeyCode::Backspace => dialog.backspace(),
            KeyCode::Char(c) if !c.is_control() => dialog.handle_char(c),
            _ => {}
        }

        Ok(())
    }

    // --- Upload ---

    fn handle_upload_key(&mut self, key: KeyEvent) -> Result<()> {
        let dialog = match self.upload_dialog.as_mut() {
            Some(d) => d,
            None => {
                self.mode = self.base_mode();
                return Ok(());
            }
        };

        match key.code {
            KeyCode::Esc => {
                self.upload_dialog = None;
                self.mode = self.base_mode();
                self.status_message = Some("Upload cancelled".to_string());
            }
            KeyCode::Char('j') | KeyCode::Down => dialog.move_down(),
            KeyCode::Char('k') | KeyCode::Up => dialog.move_up(),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => dialog.go_parent(),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                if let Some(path) = dialog.activate() {
                    self.upload_dialog = None;
                    self.mode = self.base_mode();
                    self.start_upload(path);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn start_upload(&mut self, path: PathBuf) {
        let Some(album) = self.gallery.selected_album() else {
            self.status_message = Some("No album selected".to_string());
            return;
        };
        if self.task_manager.is_running(TaskType::Upload) {
            self.status_message = Some("Upload already running".to_string());
            return;
        }

        let album_id = album.id.clone();
        let (_task_id, tx, cancel_flag) = self.task_manager.register_task(TaskType::Upload);
        let store = Arc::clone(&self.store);
        let session = self.session.clone();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "photo.jpg".to_string());
        let status_file_name = file_name.clone();

        // Read and upload off the UI thread
        std::thread::spawn(move || {
            let _ = tx.send(TaskUpdate::Started { total: 1 });

            let data = match std::fs::read(&path) {
                Ok(data) => data,
                Err(e) => {
                    let _ = tx.send(TaskUpdate::Failed {
                        error: format!("Could not read {}: {}", path.display(), e),
                    });
                    return;
                }
            };

            if cancel_flag.load(Ordering::SeqCst) {
                let _ = tx.send(TaskUpdate::Cancelled);
                return;
            }

            match store.upload_photo(&session, &album_id, &data, &file_name) {
                Ok(photo) => {
                    let _ = tx.send(TaskUpdate::Completed {
                        message: format!("{} uploaded", photo.name),
                    });
                }
                Err(e) => {
                    let _ = tx.send(TaskUpdate::Failed { error: e.to_string() });
                }
            }
        });

        self.status_message = Some(format!("Uploading {}...", status_file_name));
    }

    // --- Contact form ---

    fn open_contact_dialog(&mut self) {
        if !self.messenger.is_configured() {
            self.status_message =
                Some("Contact form not configured (set [contact] user_id)".to_string());
            return;
        }
        self.contact_dialog = Some(ContactDialog::new());
        self.mode = AppMode::Contact;
    }

    fn handle_contact_key(&mut self, key: KeyEvent) -> Result<()> {
        let dialog = match self.contact_dialog.as_mut() {
            Some(d) => d,
            None => {
                self.mode = self.base_mode();
                return Ok(());
            }
        };

        match key.code {
            KeyCode::Esc => {
                self.contact_dialog = None;
                self.mode = self.base_mode();
            }
            KeyCode::Tab => dialog.next_field(),
            KeyCode::Enter => {
                if dialog.status == ContactStatus::Submitting {
                    return Ok(());
                }
                if !dialog.validate() {
                    return Ok(());
                }
                dialog.status = ContactStatus::Submitting;
                let name = dialog.name.clone();
                let email = dialog.email.clone();
                let message = dialog.message.clone();
                self.start_send_message(name, email, message);
            }
            KeyCode::Backspace => dialog.backspace(),
            KeyCode::Char(c) if !c.is_control() => dialog.handle_char(c),
            _ => {}
        }

        Ok(())
    }

    fn start_send_message(&mut self, name: String, email: String, message: String) {
        let (_task_id, tx, cancel_flag) = self.task_manager.register_task(TaskType::SendMessage);
        let messenger = self.messenger.clone();

        std::thread::spawn(move || {
            if cancel_flag.load(Ordering::SeqCst) {
                let _ = tx.send(TaskUpdate::Cancelled);
                return;
            }

            match messenger.send(&name, &email, &message) {
                Ok(()) => {
                    let _ = tx.send(TaskUpdate::Completed {
                        message: "Message sent".to_string(),
                    });
                }
                Err(e) => {
                    let _ = tx.send(TaskUpdate::Failed { error: e.to_string() });
                }
            }
        });
    }

    // --- Confirm delete ---

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(dialog) = self.confirm_dialog.take() {
                    self.execute_confirmed_action(dialog.action);
                }
                self.mode = self.base_mode();
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.confirm_dialog = None;
                self.mode = self.base_mode();
            }
            _ => {}
        }
        Ok(())
    }

    fn execute_confirmed_action(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteAlbum { album_id, name } => {
                match self.store.delete_album(&self.session, &album_id) {
                    Ok(true) => {
                        self.status_message = Some(format!("Album \"{}\" deleted", name));
                        // Leaving a deleted album's photo view
                        if self
                            .gallery
                            .selected_album()
                            .map(|a| a.id == album_id)
                            .unwrap_or(false)
                        {
                            self.gallery.back_to_albums();
                            self.photo_view.reset();
                        }
                        self.gallery.load_albums(&self.store);
                    }
                    Ok(false) => {
                        self.status_message = Some(format!("Album \"{}\" was already gone", name));
                        self.gallery.load_albums(&self.store);
                    }
                    Err(e) => {
                        self.status_message = Some(format!("Delete failed: {}", e));
                    }
                }
            }
            ConfirmAction::DeletePhoto { photo_id, name } => {
                match self.store.delete_photo(&self.session, &photo_id) {
                    Ok(true) => {
                        self.status_message = Some(format!("Photo \"{}\" deleted", name));
                        self.gallery.reload_photos(&self.store);
                        self.gallery.load_albums(&self.store);
                    }
                    Ok(false) => {
                        self.status_message = Some(format!("Photo \"{}\" was already gone", name));
                        self.gallery.reload_photos(&self.store);
                    }
                    Err(e) => {
                        self.status_message = Some(format!("Delete failed: {}", e));
                    }
                }
            }
        }
    }
}
