//! UI rendering helpers shared by the views.
//!
//! - `theme`: color schemes and styling utilities
//! - `messages`: thread message rendering and timestamp formatting
//! - `toasts`: floating status notifications

pub mod messages;
pub mod theme;
pub mod toasts;

pub use messages::{format_timestamp, render_messages};
pub use theme::{apply_app_style, render_avatar, IgdmTheme};
pub use toasts::render_status_toasts;
