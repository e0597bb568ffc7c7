//! Status toast notifications - floating messages in top-right corner.

use eframe::egui;

use crate::ui::theme::IgdmTheme;

/// Render floating status toasts (top-right corner).
pub fn render_status_toasts(
    ctx: &egui::Context,
    status_messages: &[(String, std::time::Instant)],
    theme: &IgdmTheme,
) {
    if status_messages.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("status_toast_area"))
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 50.0])
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_unmultiplied(30, 30, 30, 230))
                .corner_radius(6.0)
                .inner_margin(egui::Margin::symmetric(12, 8))
                .show(ui, |ui| {
                    for (msg, _) in status_messages {
                        let color = if msg.starts_with("Error") {
                            theme.error
                        } else {
                            egui::Color32::LIGHT_GREEN
                        };
                        ui.label(egui::RichText::new(msg).color(color));
                    }
                });
        });
}
