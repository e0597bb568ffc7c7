//! Application module structure for IgdmApp
//!
//! - `core`: IgdmApp struct, initialization and settings persistence
//! - `events`: event processing from the backend
//! - `update`: main update loop
//! - `ui::login`: loading and login screens
//! - `ui::sidebar`: top bar, user search and the inbox
//! - `ui::thread`: open thread and the composer
//! - `ui::unfollowers`: the unfollowers window

pub mod core;
pub mod events;
pub mod ui;
pub mod update;

pub use core::IgdmApp;
