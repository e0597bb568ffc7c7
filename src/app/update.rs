//! Main update loop

use eframe::egui;
use std::time::Duration;

use super::IgdmApp;
use crate::state::Screen;
use crate::ui;

impl eframe::App for IgdmApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process backend events
        self.process_events();

        let focused = ctx.input(|i| i.focused);
        self.set_focused(focused);

        let title = self.state.window_title();
        if title != self.shown_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.shown_title = title;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.state.show_unfollowers = false;
            self.state.clear_search();
        }

        // Request repaint to keep checking for events
        ctx.request_repaint_after(Duration::from_millis(100));
        // Purge old status messages (toasts) older than 4 seconds
        self.state.purge_old_status_messages(4);

        match self.state.screen {
            Screen::Loading => self.render_loading(ctx),
            Screen::Login => self.render_login(ctx),
            Screen::Chats => {
                self.render_top_bar(ctx);
                self.render_sidebar(ctx);
                self.render_composer(ctx);
                self.render_thread(ctx);
                self.render_unfollowers(ctx);
            }
        }

        ui::render_status_toasts(ctx, &self.state.status_messages, &self.theme);
    }
}
