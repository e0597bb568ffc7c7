//! Floating window listing accounts that do not follow back

use eframe::egui;

use crate::app::IgdmApp;
use crate::protocol::BackendAction;
use crate::ui;

impl IgdmApp {
    pub(in crate::app) fn render_unfollowers(&mut self, ctx: &egui::Context) {
        if !self.state.show_unfollowers {
            return;
        }
        let theme = self.theme.clone();
        let mut open = true;
        let mut unfollow = None;

        egui::Window::new("Not following you back")
            .open(&mut open)
            .collapsible(false)
            .default_width(320.0)
            .show(ctx, |ui| {
                if self.state.unfollowers.is_empty() {
                    ui.label(egui::RichText::new("Everyone follows you back.").color(theme.text_muted));
                    return;
                }
                egui::ScrollArea::vertical().max_height(400.0).show(ui, |ui| {
                    for user in &self.state.unfollowers {
                        ui.horizontal(|ui| {
                            ui::render_avatar(ui, &user.username, 24.0);
                            ui.label(&user.username);
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if ui.button("Unfollow").clicked() {
                                    unfollow = Some(user.id.clone());
                                }
                            });
                        });
                    }
                });
            });

        if let Some(user_id) = unfollow {
            self.state.unfollowers.retain(|u| u.id != user_id);
            self.send(BackendAction::Unfollow(user_id));
        }
        if !open {
            self.state.show_unfollowers = false;
        }
    }
}
