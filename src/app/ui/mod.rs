//! Screen and panel rendering for IgdmApp

mod login;
mod sidebar;
mod thread;
mod unfollowers;
