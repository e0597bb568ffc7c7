//! Message area rendering: grouping, timestamps and content kinds.

use chrono::{DateTime, Local, TimeZone};
use eframe::egui::{self, RichText};

use crate::api::{Message, MessageKind};
use crate::ui::theme::{self, IgdmTheme};

/// Consecutive messages from one sender closer than this share a header.
const GROUP_GAP_MICROS: i64 = 5 * 60 * 1_000_000;

/// Format a message timestamp (microseconds) in local time.
pub fn format_timestamp(micros: i64) -> String {
    format_timestamp_at(micros, &Local::now())
}

/// Time of day for messages from `now`'s day, date and time otherwise.
pub fn format_timestamp_at<Tz: TimeZone>(micros: i64, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(utc) = DateTime::from_timestamp_micros(micros) else {
        return String::new();
    };
    let at = utc.with_timezone(&now.timezone());
    if at.date_naive() == now.date_naive() {
        at.format("%H:%M").to_string()
    } else {
        at.format("%b %d, %H:%M").to_string()
    }
}

pub(crate) struct MessageGroup<'a> {
    pub sender_id: &'a str,
    pub messages: Vec<&'a Message>,
}

pub(crate) fn group_messages(messages: &[Message]) -> Vec<MessageGroup<'_>> {
    let mut groups: Vec<MessageGroup<'_>> = Vec::new();
    for msg in messages {
        let continues = groups.last().is_some_and(|last| {
            last.sender_id == msg.user_id
                && last
                    .messages
                    .last()
                    .is_some_and(|prev| msg.timestamp - prev.timestamp <= GROUP_GAP_MICROS)
        });
        match groups.last_mut() {
            Some(last) if continues => last.messages.push(msg),
            _ => groups.push(MessageGroup {
                sender_id: &msg.user_id,
                messages: vec![msg],
            }),
        }
    }
    groups
}

/// Render a thread's messages, oldest first, grouped by sender.
pub fn render_messages(
    ui: &mut egui::Ui,
    messages: &[Message],
    own_id: Option<&str>,
    sender_name: impl Fn(&str) -> String,
    theme: &IgdmTheme,
) {
    for group in group_messages(messages) {
        let own = own_id == Some(group.sender_id);
        let name = sender_name(group.sender_id);
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            theme::render_avatar(ui, &name, 32.0);
            ui.add_space(8.0);
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    let color = if own {
                        theme.accent
                    } else {
                        theme::user_color(&name)
                    };
                    ui.label(RichText::new(&name).strong().color(color));
                    if let Some(first) = group.messages.first() {
                        ui.label(
                            RichText::new(format_timestamp(first.timestamp))
                                .text_style(egui::TextStyle::Name(theme::TIMESTAMP_STYLE.into()))
                                .color(theme.text_muted),
                        );
                    }
                });
                for msg in &group.messages {
                    render_message_content(ui, msg, own, theme)
                        .on_hover_text(format_timestamp(msg.timestamp));
                }
            });
        });
    }
}

fn render_message_content(
    ui: &mut egui::Ui,
    msg: &Message,
    own: bool,
    theme: &IgdmTheme,
) -> egui::Response {
    let fill = if own { theme.accent } else { theme.surface[2] };
    let text_color = if own {
        theme.accent_text
    } else {
        theme.text_primary
    };

    egui::Frame::new()
        .fill(fill)
        .corner_radius(12.0)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| match &msg.kind {
            MessageKind::Text(text) => {
                ui.label(RichText::new(text).color(text_color));
            }
            MessageKind::Like => {
                ui.label(RichText::new("❤").size(24.0).color(theme.unread));
            }
            MessageKind::Media { url } => {
                ui.hyperlink_to(RichText::new("📷 Photo").color(text_color), url);
            }
            MessageKind::Link { text, url } => {
                ui.label(RichText::new(text).color(text_color));
                ui.hyperlink(url);
            }
            MessageKind::Other(kind) => {
                ui.label(
                    RichText::new(format!("Unsupported message ({})", kind))
                        .italics()
                        .color(theme.text_muted),
                );
            }
        })
        .response
}
