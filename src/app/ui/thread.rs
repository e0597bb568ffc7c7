//! Open thread view and the message composer

use eframe::egui;

use crate::app::IgdmApp;
use crate::ui;

impl IgdmApp {
    /// Bottom composer. Only shown when there is somewhere to send to.
    pub(in crate::app) fn render_composer(&mut self, ctx: &egui::Context) {
        if self.state.active_thread.is_none() && self.state.new_chat.is_empty() {
            return;
        }
        let theme = self.theme.clone();
        let mut send_text = false;
        let mut send_file = false;

        egui::TopBottomPanel::bottom("composer")
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[1])
                    .inner_margin(egui::Margin::symmetric(12, 10))
                    .stroke(egui::Stroke::new(1.0, theme.border)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.state.compose_text)
                            .desired_rows(1)
                            .desired_width(ui.available_width() - 70.0)
                            .hint_text("Message... (Enter to send)"),
                    );
                    // Shift+Enter keeps the newline
                    if response.has_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift)
                    {
                        send_text = true;
                    }
                    if ui.button("Send").clicked() {
                        send_text = true;
                    }
                });
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.state.attachment_path)
                            .hint_text("Path to a photo")
                            .desired_width(ui.available_width() - 100.0),
                    );
                    if ui.button("📎 Send photo").clicked() {
                        send_file = true;
                    }
                });
            });

        if send_text {
            // The multiline edit already inserted the Enter
            let trimmed = self.state.compose_text.trim_end_matches('\n').to_string();
            self.state.compose_text = trimmed;
            if let Some(action) = self.state.compose_message() {
                self.send(action);
            }
        }
        if send_file {
            if let Some(action) = self.state.compose_upload() {
                self.send(action);
            }
        }
    }

    pub(in crate::app) fn render_thread(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let mut load_older = false;

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[0])
                    .inner_margin(egui::Margin::same(12)),
            )
            .show(ctx, |ui| {
                let Some(thread) = &self.state.thread else {
                    let hint = if !self.state.new_chat.is_empty() {
                        "Say hello 👋"
                    } else if self.state.active_thread.is_some() {
                        "Loading conversation..."
                    } else {
                        "Select a conversation or search for someone to message"
                    };
                    ui.centered_and_justified(|ui| {
                        ui.label(egui::RichText::new(hint).color(theme.text_muted));
                    });
                    return;
                };

                ui.horizontal(|ui| {
                    ui::render_avatar(ui, &thread.title, 28.0);
                    ui.heading(&thread.title);
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if self.state.has_older {
                            ui.vertical_centered(|ui| {
                                if self.state.loading_older {
                                    ui.spinner();
                                } else if ui.button("Load older messages").clicked() {
                                    load_older = true;
                                }
                            });
                        }
                        let own_id = self.state.user.as_ref().map(|u| u.id.as_str());
                        ui::render_messages(
                            ui,
                            &thread.messages,
                            own_id,
                            |user_id| self.state.sender_name(user_id),
                            &theme,
                        );
                    });
            });

        if load_older {
            if let Some(action) = self.state.request_older() {
                self.send(action);
            }
        }
    }
}
