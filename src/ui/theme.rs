//! Color themes and styling utilities for the messenger window.
//!
//! The theme uses a layered surface system for depth:
//!
//! - `surface[0]`: app background
//! - `surface[1]`: sidebar and bars
//! - `surface[2]`: received message bubbles
//! - `surface[3]`: hover state
//! - `surface[4]`: selected inbox entry
//!
//! Accent is the brand color used for own messages, buttons and focus.

use eframe::egui::{self, Color32, FontFamily, FontId, TextStyle};
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct IgdmTheme {
    pub name: String,
    pub surface: [Color32; 5],
    pub accent: Color32,
    pub accent_text: Color32,
    pub error: Color32,
    pub unread: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,
    pub border: Color32,
}

impl IgdmTheme {
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            surface: [
                Color32::from_rgb(10, 10, 15),
                Color32::from_rgb(19, 19, 26),
                Color32::from_rgb(38, 38, 48),
                Color32::from_rgb(45, 45, 58),
                Color32::from_rgb(55, 55, 70),
            ],
            accent: Color32::from_rgb(55, 151, 240),
            accent_text: Color32::WHITE,
            error: Color32::from_rgb(240, 71, 71),
            unread: Color32::from_rgb(225, 48, 108),
            text_primary: Color32::from_rgb(240, 240, 245),
            text_secondary: Color32::from_rgb(185, 187, 190),
            text_muted: Color32::from_rgb(114, 118, 125),
            border: Color32::from_rgb(40, 40, 52),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            surface: [
                Color32::WHITE,
                Color32::from_rgb(250, 250, 250),
                Color32::from_rgb(239, 239, 239),
                Color32::from_rgb(227, 229, 232),
                Color32::from_rgb(212, 215, 220),
            ],
            accent: Color32::from_rgb(0, 149, 246),
            accent_text: Color32::WHITE,
            error: Color32::from_rgb(237, 73, 86),
            unread: Color32::from_rgb(225, 48, 108),
            text_primary: Color32::from_rgb(38, 38, 38),
            text_secondary: Color32::from_rgb(79, 86, 96),
            text_muted: Color32::from_rgb(142, 142, 142),
            border: Color32::from_rgb(219, 219, 219),
        }
    }

    /// Theme for a settings name; anything but "light" is dark.
    pub fn named(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

/// Small muted text next to a sender name
pub const TIMESTAMP_STYLE: &str = "timestamp";
/// Last-message line under an inbox entry
pub const PREVIEW_STYLE: &str = "preview";

fn text_styles() -> BTreeMap<TextStyle, FontId> {
    use FontFamily::Proportional;

    [
        (TextStyle::Small, FontId::new(10.0, Proportional)),
        (TextStyle::Body, FontId::new(14.0, Proportional)),
        (TextStyle::Button, FontId::new(13.0, Proportional)),
        (TextStyle::Heading, FontId::new(18.0, Proportional)),
        (TextStyle::Monospace, FontId::new(13.0, FontFamily::Monospace)),
        (TextStyle::Name(TIMESTAMP_STYLE.into()), FontId::new(11.0, Proportional)),
        (TextStyle::Name(PREVIEW_STYLE.into()), FontId::new(12.0, Proportional)),
    ]
    .into()
}

/// Apply visuals, spacing and text styles for `theme` to the context.
pub fn apply_app_style(ctx: &egui::Context, theme: &IgdmTheme) {
    let mut style = (*ctx.style()).clone();
    style.visuals = if theme.name == "Light" {
        egui::Visuals::light()
    } else {
        egui::Visuals::dark()
    };
    style.text_styles = text_styles();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(12);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);

    for widget in [
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
    ] {
        widget.corner_radius = egui::CornerRadius::same(6);
        widget.bg_stroke = egui::Stroke::NONE;
    }
    style.visuals.widgets.active.bg_fill = theme.accent;
    style.visuals.widgets.active.weak_bg_fill = theme.accent;
    style.visuals.selection.bg_fill = theme.accent.linear_multiply(0.4);
    style.visuals.hyperlink_color = theme.accent;

    ctx.set_style(style);
}

const USER_COLORS: [Color32; 12] = [
    Color32::from_rgb(231, 76, 60),
    Color32::from_rgb(46, 204, 113),
    Color32::from_rgb(52, 152, 219),
    Color32::from_rgb(155, 89, 182),
    Color32::from_rgb(241, 196, 15),
    Color32::from_rgb(230, 126, 34),
    Color32::from_rgb(26, 188, 156),
    Color32::from_rgb(236, 100, 166),
    Color32::from_rgb(41, 128, 185),
    Color32::from_rgb(39, 174, 96),
    Color32::from_rgb(211, 84, 0),
    Color32::from_rgb(102, 178, 255),
];

/// Stable color for a username (FNV-1a over its bytes).
pub fn user_color(username: &str) -> Color32 {
    let mut hash: u64 = 1469598103934665603u64;
    for b in username.as_bytes() {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(1099511628211u64);
    }
    USER_COLORS[(hash as usize) % USER_COLORS.len()]
}

/// Circular avatar with the first letter of `name`.
pub fn render_avatar(ui: &mut egui::Ui, name: &str, size: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
    let painter = ui.painter();
    painter.circle_filled(rect.center(), size / 2.0, user_color(name));

    let initial: String = name.chars().next().unwrap_or('?').to_uppercase().collect();
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        initial,
        FontId::new(size * 0.45, FontFamily::Proportional),
        Color32::WHITE,
    );
    response
}
