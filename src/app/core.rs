//! Core IgdmApp struct definition and initialization

use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender};

use crate::backend::spawn_http_backend;
use crate::config::{load_settings, save_settings_to, settings_path, Settings};
use crate::protocol::{BackendAction, GuiEvent};
use crate::state::ClientState;
use crate::ui;

pub struct IgdmApp {
    // Everything the window shows
    pub state: ClientState,

    // Persisted settings, written back on exit
    pub settings: Settings,
    settings_file: Option<PathBuf>,

    // Channels for backend communication
    pub action_tx: Sender<BackendAction>,
    pub event_rx: Receiver<GuiEvent>,

    pub theme: ui::IgdmTheme,

    // Last title pushed to the viewport
    pub(super) shown_title: String,
}

impl IgdmApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = load_settings();
        let (action_tx, event_rx) = spawn_http_backend(&settings);

        let mut app = Self::with_backend(settings, action_tx, event_rx);
        app.settings_file = settings_path();
        ui::apply_app_style(&cc.egui_ctx, &app.theme);
        app
    }

    /// Build the app around already running backend channels and create the window.
    ///
    /// Settings are only written back when the app was built by [`IgdmApp::new`].
    pub fn with_backend(
        settings: Settings,
        action_tx: Sender<BackendAction>,
        event_rx: Receiver<GuiEvent>,
    ) -> Self {
        let mut state = ClientState::new();
        state.login.username = settings.last_username.clone();

        let app = Self {
            state,
            theme: ui::IgdmTheme::named(&settings.theme),
            settings,
            settings_file: None,
            action_tx,
            event_rx,
            shown_title: String::new(),
        };
        app.send(BackendAction::OpenWindow);
        app
    }

    pub(super) fn send(&self, action: BackendAction) {
        if self.action_tx.send(action).is_err() {
            tracing::warn!("Backend is gone, dropping action");
        }
    }

    pub(super) fn send_all(&self, actions: impl IntoIterator<Item = BackendAction>) {
        for action in actions {
            self.send(action);
        }
    }

    pub(super) fn toggle_theme(&mut self, ctx: &eframe::egui::Context) {
        self.settings.theme = if self.theme.name == "Light" {
            "dark".to_string()
        } else {
            "light".to_string()
        };
        self.theme = ui::IgdmTheme::named(&self.settings.theme);
        ui::apply_app_style(ctx, &self.theme);
    }

    /// Settings as they should be saved now.
    pub fn current_settings(&self) -> Settings {
        let mut settings = self.settings.clone();
        if let Some(user) = &self.state.user {
            settings.last_username = user.username.clone();
        } else if !self.state.login.username.trim().is_empty() {
            settings.last_username = self.state.login.username.trim().to_string();
        }
        settings
    }
}

impl Drop for IgdmApp {
    fn drop(&mut self) {
        let Some(path) = &self.settings_file else {
            return;
        };
        if let Err(e) = save_settings_to(path, &self.current_settings()) {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }
}
