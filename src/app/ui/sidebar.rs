//! Top bar, user search and the inbox list

use eframe::egui;

use crate::api::ChatSummary;
use crate::app::IgdmApp;
use crate::protocol::BackendAction;
use crate::ui;

enum SidebarAction {
    Search,
    OpenThread(String),
    StartChat(usize),
}

impl IgdmApp {
    pub(in crate::app) fn render_top_bar(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let mut logout = false;
        let mut unfollowers = false;
        let mut toggle_theme = false;

        egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[1])
                    .inner_margin(egui::Margin::symmetric(12, 8))
                    .stroke(egui::Stroke::new(1.0, theme.border)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("IG:dm").strong().size(16.0));
                    if let Some(user) = &self.state.user {
                        ui.separator();
                        ui::render_avatar(ui, &user.username, 22.0);
                        ui.label(egui::RichText::new(&user.username).color(theme.text_secondary));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Log out").clicked() {
                            logout = true;
                        }
                        if ui.button("Who unfollowed me?").clicked() {
                            unfollowers = true;
                        }
                        let theme_label = if theme.name == "Light" { "🌙" } else { "☀" };
                        if ui.button(theme_label).on_hover_text("Toggle theme").clicked() {
                            toggle_theme = true;
                        }
                    });
                });
            });

        if toggle_theme {
            self.toggle_theme(ctx);
        }
        if unfollowers {
            self.send(BackendAction::GetUnfollowers);
        }
        if logout {
            self.send(BackendAction::Logout);
        }
    }

    pub(in crate::app) fn render_sidebar(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let mut action = None;

        egui::SidePanel::left("inbox")
            .resizable(true)
            .default_width(300.0)
            .min_width(220.0)
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[1])
                    .inner_margin(egui::Margin::same(8)),
            )
            .show(ctx, |ui| {
                let search = ui.add(
                    egui::TextEdit::singleline(&mut self.state.search_query)
                        .hint_text("🔍 Search users to message")
                        .desired_width(f32::INFINITY),
                );
                if search.changed() {
                    action = Some(SidebarAction::Search);
                }

                if !self.state.search_results.is_empty() {
                    ui.add_space(4.0);
                    for (index, user) in self.state.search_results.iter().enumerate() {
                        let clicked = ui
                            .horizontal(|ui| {
                                ui::render_avatar(ui, &user.username, 24.0);
                                ui.selectable_label(false, user_label(user.display_name(), &user.username))
                                    .clicked()
                            })
                            .inner;
                        if clicked {
                            action = Some(SidebarAction::StartChat(index));
                        }
                    }
                    ui.separator();
                }

                if !self.state.new_chat.is_empty() {
                    let names: Vec<&str> =
                        self.state.new_chat.iter().map(|u| u.username.as_str()).collect();
                    ui.label(
                        egui::RichText::new(format!("New message to {}", names.join(", ")))
                            .color(theme.accent),
                    );
                    ui.separator();
                }

                egui::ScrollArea::vertical().show(ui, |ui| {
                    if self.state.chats.is_empty() {
                        ui.label(egui::RichText::new("Loading conversations...").color(theme.text_muted));
                    }
                    for chat in &self.state.chats {
                        let selected = self.state.active_thread.as_deref() == Some(chat.id.as_str());
                        if render_chat_entry(ui, chat, selected, &theme).clicked() {
                            action = Some(SidebarAction::OpenThread(chat.id.clone()));
                        }
                    }
                });
            });

        match action {
            Some(SidebarAction::Search) => {
                self.send(BackendAction::SearchUsers(self.state.search_query.clone()));
            }
            Some(SidebarAction::OpenThread(thread_id)) => {
                let actions = self.state.select_thread(&thread_id);
                self.send_all(actions);
            }
            Some(SidebarAction::StartChat(index)) => {
                if let Some(user) = self.state.search_results.get(index).cloned() {
                    let actions = self.state.start_new_chat(user);
                    self.send_all(actions);
                }
            }
            None => {}
        }
    }
}

fn user_label(display_name: &str, username: &str) -> String {
    if display_name == username {
        username.to_string()
    } else {
        format!("{} (@{})", display_name, username)
    }
}

fn render_chat_entry(
    ui: &mut egui::Ui,
    chat: &ChatSummary,
    selected: bool,
    theme: &ui::IgdmTheme,
) -> egui::Response {
    let fill = if selected {
        theme.surface[4]
    } else {
        theme.surface[1]
    };
    let frame = egui::Frame::new()
        .fill(fill)
        .corner_radius(6.0)
        .inner_margin(egui::Margin::symmetric(8, 6))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui::render_avatar(ui, &chat.title, 36.0);
                ui.vertical(|ui| {
                    let mut title = egui::RichText::new(&chat.title).color(theme.text_primary);
                    if chat.unread {
                        title = title.strong();
                    }
                    ui.horizontal(|ui| {
                        ui.label(title);
                        if chat.unread {
                            ui.label(egui::RichText::new("●").color(theme.unread));
                        }
                    });
                    if let Some(last) = &chat.last_message {
                        let preview: String = last.kind.preview().chars().take(40).collect();
                        ui.label(
                            egui::RichText::new(format!(
                                "{} · {}",
                                preview,
                                ui::format_timestamp(chat.last_activity_at)
                            ))
                            .text_style(egui::TextStyle::Name(ui::theme::PREVIEW_STYLE.into()))
                            .color(theme.text_muted),
                        );
                    }
                });
            });
        });
    ui.interact(frame.response.rect, ui.id().with(&chat.id), egui::Sense::click())
}
