//! Loading and login screens

use eframe::egui;

use crate::app::IgdmApp;

impl IgdmApp {
    pub(in crate::app) fn render_loading(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(self.theme.surface[0]))
            .show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            });
    }

    pub(in crate::app) fn render_login(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let mut submit = false;

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(theme.surface[0]))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.2);
                    ui.heading(egui::RichText::new("IG:dm").size(32.0).strong());
                    ui.label(
                        egui::RichText::new("Instagram Desktop Messenger").color(theme.text_muted),
                    );
                    ui.add_space(24.0);

                    egui::Frame::new()
                        .fill(theme.surface[1])
                        .stroke(egui::Stroke::new(1.0, theme.border))
                        .corner_radius(8.0)
                        .inner_margin(egui::Margin::same(20))
                        .show(ui, |ui| {
                            ui.set_width(280.0);
                            let enabled = !self.state.login.pending;

                            ui.add_enabled(
                                enabled,
                                egui::TextEdit::singleline(&mut self.state.login.username)
                                    .hint_text("Username")
                                    .desired_width(f32::INFINITY),
                            );
                            let password = ui.add_enabled(
                                enabled,
                                egui::TextEdit::singleline(&mut self.state.login.password)
                                    .password(true)
                                    .hint_text("Password")
                                    .desired_width(f32::INFINITY),
                            );
                            if password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
                            {
                                submit = enabled;
                            }

                            ui.add_space(8.0);
                            let label = if self.state.login.pending {
                                "Logging in..."
                            } else {
                                "Log in"
                            };
                            let button = egui::Button::new(
                                egui::RichText::new(label).color(theme.accent_text),
                            )
                            .fill(theme.accent)
                            .min_size(egui::vec2(280.0, 32.0));
                            if ui.add_enabled(enabled, button).clicked() {
                                submit = true;
                            }

                            if let Some(error) = &self.state.login.error {
                                ui.add_space(8.0);
                                ui.colored_label(theme.error, error);
                            }
                        });
                });
            });

        if submit {
            let action = self.state.submit_login();
            self.send(action);
        }
    }
}
