//! Core application state, separated from UI logic.
//!
//! `ClientState` holds everything the window shows: the current screen, the
//! login form, the inbox, the open thread and the composer. UI components
//! receive it as a parameter and turn user input into `BackendAction`s.

use std::path::PathBuf;
use std::time::Instant;

use crate::api::{ChatSummary, Message, Recipients, Thread, User};
use crate::config::WINDOW_TITLE;
use crate::protocol::{BackendAction, MessagePayload, MessageTarget, UploadPayload};
use crate::validation;

/// What the central panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Waiting for the session check
    #[default]
    Loading,
    Login,
    Chats,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
    /// A login request is in flight.
    pub pending: bool,
}

/// Core application state for the messenger window.
#[derive(Debug, Default)]
pub struct ClientState {
    pub screen: Screen,
    pub login: LoginForm,

    /// Account the session belongs to.
    pub user: Option<User>,

    /// Inbox, newest activity first, as last polled.
    pub chats: Vec<ChatSummary>,

    /// Thread the user selected, if any.
    pub active_thread: Option<String>,
    /// Loaded contents of `active_thread`.
    pub thread: Option<Thread>,
    pub loading_older: bool,
    pub has_older: bool,

    pub search_query: String,
    pub search_results: Vec<User>,
    /// Recipients of a conversation that does not exist yet.
    pub new_chat: Vec<User>,
    /// A message to `new_chat` was sent; the next thread opened by the
    /// backend is the conversation it created.
    pub awaiting_created: bool,

    pub compose_text: String,
    pub attachment_path: String,

    pub unfollowers: Vec<User>,
    pub show_unfollowers: bool,

    pub badge: u32,
    pub focused: bool,

    /// Status toast messages with creation time (auto-expire).
    pub status_messages: Vec<(String, Instant)>,
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            focused: true,
            ..Self::default()
        }
    }

    /// Start over on `screen`, as when the window is recreated.
    ///
    /// The typed username, focus and pending toasts survive.
    pub fn reset(&mut self, screen: Screen) {
        let username = std::mem::take(&mut self.login.username);
        let focused = self.focused;
        let badge = self.badge;
        let status_messages = std::mem::take(&mut self.status_messages);
        *self = Self {
            screen,
            login: LoginForm {
                username,
                ..LoginForm::default()
            },
            focused,
            badge,
            status_messages,
            ..Self::default()
        };
    }

    /// Submit the login form.
    pub fn submit_login(&mut self) -> BackendAction {
        self.login.pending = true;
        self.login.error = None;
        BackendAction::Login {
            username: self.login.username.clone(),
            password: std::mem::take(&mut self.login.password),
        }
    }

    /// Open a thread from the inbox. Marks it seen when it has unread activity.
    pub fn select_thread(&mut self, thread_id: &str) -> Vec<BackendAction> {
        if self.active_thread.as_deref() != Some(thread_id) {
            self.thread = None;
            self.has_older = false;
            self.loading_older = false;
        }
        self.active_thread = Some(thread_id.to_string());
        self.new_chat.clear();
        self.awaiting_created = false;

        let mut actions = vec![BackendAction::GetChat(thread_id.to_string())];
        if let Some(chat) = self.chats.iter_mut().find(|c| c.id == thread_id) {
            if chat.unread {
                chat.unread = false;
                if let Some(marker) = chat.read_marker() {
                    actions.push(BackendAction::MarkAsRead(marker));
                }
            }
        }
        actions
    }

    /// Add a search result to the recipients of a new conversation.
    ///
    /// If an existing one-to-one thread with that user is in the inbox, it is
    /// opened instead. Otherwise a thread that was open stops being polled.
    pub fn start_new_chat(&mut self, user: User) -> Vec<BackendAction> {
        if self.new_chat.is_empty() {
            let existing = self
                .chats
                .iter()
                .find(|c| c.users.len() == 1 && c.users[0].id == user.id)
                .map(|c| c.id.clone());
            if let Some(thread_id) = existing {
                self.clear_search();
                return self.select_thread(&thread_id);
            }
        }

        let mut actions = Vec::new();
        if self.active_thread.take().is_some() {
            actions.push(BackendAction::CloseChat);
        }
        self.thread = None;
        self.has_older = false;
        self.loading_older = false;
        if !self.new_chat.iter().any(|u| u.id == user.id) {
            self.new_chat.push(user);
        }
        self.clear_search();
        actions
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.search_results.clear();
    }

    fn message_target(&self) -> Option<MessageTarget> {
        if let Some(thread_id) = &self.active_thread {
            return Some(MessageTarget::Thread(thread_id.clone()));
        }
        if self.new_chat.is_empty() {
            return None;
        }
        Some(MessageTarget::NewChat(
            self.new_chat.iter().map(|u| u.id.clone()).collect(),
        ))
    }

    /// Turn the composer text into a send request.
    pub fn compose_message(&mut self) -> Option<BackendAction> {
        let target = self.message_target()?;
        if let Err(e) = validation::validate_message(&self.compose_text) {
            self.push_status(e);
            return None;
        }
        let text = std::mem::take(&mut self.compose_text);
        self.awaiting_created = matches!(target, MessageTarget::NewChat(_));
        Some(BackendAction::SendMessage(MessagePayload {
            text: text.trim().to_string(),
            target,
        }))
    }

    /// Turn the attachment path into an upload request.
    pub fn compose_upload(&mut self) -> Option<BackendAction> {
        let recipients = match self.message_target()? {
            MessageTarget::Thread(thread_id) => Recipients::Thread(thread_id),
            MessageTarget::NewChat(user_ids) => Recipients::Users(user_ids),
        };
        let path = self.attachment_path.trim().to_string();
        if let Err(e) = validation::validate_upload_path(&path) {
            self.push_status(e);
            return None;
        }
        self.attachment_path.clear();
        self.awaiting_created = matches!(recipients, Recipients::Users(_));
        Some(BackendAction::Upload(UploadPayload {
            file_path: PathBuf::from(path),
            recipients,
        }))
    }

    /// Ask for the page before the oldest loaded message.
    pub fn request_older(&mut self) -> Option<BackendAction> {
        if self.loading_older || !self.has_older {
            return None;
        }
        let thread_id = self.active_thread.clone()?;
        self.loading_older = true;
        Some(BackendAction::GetOlderMessages(thread_id))
    }

    /// Apply a fresh copy of a thread. Older pages already loaded are kept.
    pub fn apply_thread(&mut self, mut thread: Thread) {
        match self.thread.take() {
            Some(previous) if previous.id == thread.id => {
                let first_new = thread.messages.first().map(|m| m.timestamp);
                let mut merged: Vec<Message> = previous
                    .messages
                    .into_iter()
                    .filter(|m| first_new.is_some_and(|t| m.timestamp < t))
                    .filter(|m| !thread.messages.iter().any(|n| n.id == m.id))
                    .collect();
                merged.append(&mut thread.messages);
                thread.messages = merged;
            }
            _ => {
                self.has_older = thread.has_older;
                self.loading_older = false;
            }
        }
        self.thread = Some(thread);
    }

    /// An older page failed to load. The button stays so the user can retry.
    pub fn older_failed(&mut self, message: String) {
        self.loading_older = false;
        self.push_status(message);
    }

    /// Prepend an older page, skipping messages already shown.
    pub fn prepend_older(&mut self, older: Vec<Message>) {
        self.loading_older = false;
        if older.is_empty() {
            self.has_older = false;
            return;
        }
        if let Some(thread) = self.thread.as_mut() {
            let mut page: Vec<Message> = older
                .into_iter()
                .filter(|m| !thread.messages.iter().any(|existing| existing.id == m.id))
                .collect();
            page.sort_by_key(|m| m.timestamp);
            page.append(&mut thread.messages);
            thread.messages = page;
        }
    }

    /// Name to show for a message sender.
    pub fn sender_name(&self, user_id: &str) -> String {
        if self.user.as_ref().is_some_and(|u| u.id == user_id) {
            return "You".to_string();
        }
        self.thread
            .as_ref()
            .and_then(|t| t.users.iter().find(|u| u.id == user_id))
            .map(|u| u.username.clone())
            .unwrap_or_else(|| user_id.to_string())
    }

    pub fn window_title(&self) -> String {
        if self.badge > 0 {
            format!("({}) {}", self.badge, WINDOW_TITLE)
        } else {
            WINDOW_TITLE.to_string()
        }
    }

    pub fn push_status(&mut self, message: impl Into<String>) {
        self.status_messages.push((message.into(), Instant::now()));
    }

    /// Purge status messages older than the given duration.
    pub fn purge_old_status_messages(&mut self, max_age_secs: u64) {
        self.status_messages
            .retain(|(_, created)| created.elapsed().as_secs() < max_age_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MessageKind, ReadMarker};

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            username: format!("user{}", id),
            full_name: String::new(),
            profile_pic_url: None,
        }
    }

    fn message(id: &str, timestamp: i64) -> Message {
        Message {
            id: id.into(),
            user_id: "2".into(),
            timestamp,
            kind: MessageKind::Text(id.into()),
        }
    }

    fn chat(id: &str, unread: bool, users: Vec<User>) -> ChatSummary {
        ChatSummary {
            id: id.into(),
            title: id.into(),
            users,
            last_activity_at: 10,
            unread,
            last_message: Some(message("last", 10)),
        }
    }

    fn thread(id: &str, messages: Vec<Message>) -> Thread {
        Thread {
            id: id.into(),
            title: id.into(),
            users: vec![user("2")],
            messages,
            older_cursor: Some("c".into()),
            has_older: true,
        }
    }

    #[test]
    fn test_reset_keeps_username_and_drops_the_rest() {
        let mut state = ClientState::new();
        state.login.username = "alice".into();
        state.login.password = "secret".into();
        state.chats.push(chat("a", false, vec![]));
        state.active_thread = Some("a".into());

        state.reset(Screen::Login);

        assert_eq!(state.screen, Screen::Login);
        assert_eq!(state.login.username, "alice");
        assert!(state.login.password.is_empty());
        assert!(state.chats.is_empty());
        assert!(state.active_thread.is_none());
        assert!(state.focused);
    }

    #[test]
    fn test_submit_login_clears_password() {
        let mut state = ClientState::new();
        state.login.username = "alice".into();
        state.login.password = "pw".into();
        let action = state.submit_login();
        assert_eq!(
            action,
            BackendAction::Login {
                username: "alice".into(),
                password: "pw".into()
            }
        );
        assert!(state.login.pending);
        assert!(state.login.password.is_empty());
    }

    #[test]
    fn test_select_unread_thread_marks_seen() {
        let mut state = ClientState::new();
        state.chats.push(chat("a", true, vec![user("2")]));

        let actions = state.select_thread("a");

        assert_eq!(
            actions,
            vec![
                BackendAction::GetChat("a".into()),
                BackendAction::MarkAsRead(ReadMarker {
                    thread_id: "a".into(),
                    item_id: "last".into()
                }),
            ]
        );
        assert!(!state.chats[0].unread);
        assert_eq!(state.select_thread("a"), vec![BackendAction::GetChat("a".into())]);
    }

    #[test]
    fn test_start_new_chat_reuses_direct_thread() {
        let mut state = ClientState::new();
        state.chats.push(chat("a", false, vec![user("2")]));

        let actions = state.start_new_chat(user("2"));
        assert_eq!(actions, vec![BackendAction::GetChat("a".into())]);
        assert!(state.new_chat.is_empty());

        assert_eq!(state.start_new_chat(user("3")), vec![BackendAction::CloseChat]);
        assert!(state.start_new_chat(user("3")).is_empty());
        assert_eq!(state.new_chat.len(), 1);
        assert!(state.active_thread.is_none());
    }

    #[test]
    fn test_created_thread_expected_only_after_new_chat_send() {
        let mut state = ClientState::new();
        state.start_new_chat(user("5"));
        assert!(!state.awaiting_created);

        state.compose_text = "hi".into();
        state.compose_message();
        assert!(state.awaiting_created);

        state.select_thread("a");
        assert!(!state.awaiting_created);
        state.compose_text = "again".into();
        state.compose_message();
        assert!(!state.awaiting_created);
    }

    #[test]
    fn test_compose_message_targets() {
        let mut state = ClientState::new();
        state.compose_text = "hi".into();
        assert_eq!(state.compose_message(), None);

        state.new_chat = vec![user("5"), user("6")];
        assert_eq!(
            state.compose_message(),
            Some(BackendAction::SendMessage(MessagePayload {
                text: "hi".into(),
                target: MessageTarget::NewChat(vec!["5".into(), "6".into()]),
            }))
        );
        assert!(state.compose_text.is_empty());

        state.active_thread = Some("a".into());
        state.compose_text = "   ".into();
        assert_eq!(state.compose_message(), None);
        assert_eq!(state.status_messages.len(), 1);
    }

    #[test]
    fn test_compose_upload_validates_path() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("cat.jpg");
        std::fs::write(&photo, b"jpeg").unwrap();

        let mut state = ClientState::new();
        state.active_thread = Some("a".into());
        state.attachment_path = dir.path().join("missing.jpg").display().to_string();
        assert_eq!(state.compose_upload(), None);

        state.attachment_path = photo.display().to_string();
        assert_eq!(
            state.compose_upload(),
            Some(BackendAction::Upload(UploadPayload {
                file_path: photo,
                recipients: Recipients::Thread("a".into()),
            }))
        );
    }

    #[test]
    fn test_request_older_once_at_a_time() {
        let mut state = ClientState::new();
        state.select_thread("a");
        state.apply_thread(thread("a", vec![message("m3", 30)]));

        assert_eq!(
            state.request_older(),
            Some(BackendAction::GetOlderMessages("a".into()))
        );
        assert_eq!(state.request_older(), None);

        state.prepend_older(Vec::new());
        assert!(!state.has_older);
        assert_eq!(state.request_older(), None);
    }

    #[test]
    fn test_failed_older_page_can_be_retried() {
        let mut state = ClientState::new();
        state.select_thread("a");
        state.apply_thread(thread("a", vec![message("m3", 30)]));
        assert!(state.request_older().is_some());

        state.older_failed("Could not load older messages".into());
        assert!(state.has_older);
        assert!(!state.loading_older);
        assert_eq!(state.status_messages.len(), 1);
        assert_eq!(
            state.request_older(),
            Some(BackendAction::GetOlderMessages("a".into()))
        );
    }

    #[test]
    fn test_poll_keeps_older_pages() {
        let mut state = ClientState::new();
        state.select_thread("a");
        state.apply_thread(thread("a", vec![message("m3", 30)]));
        state.prepend_older(vec![message("m2", 20), message("m3", 30)]);

        state.apply_thread(thread("a", vec![message("m3", 30), message("m4", 40)]));

        let ids: Vec<_> = state
            .thread
            .as_ref()
            .unwrap()
            .messages
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn test_window_title_shows_badge() {
        let mut state = ClientState::new();
        assert_eq!(state.window_title(), WINDOW_TITLE);
        state.badge = 3;
        assert_eq!(state.window_title(), format!("(3) {}", WINDOW_TITLE));
    }

    #[test]
    fn test_purge_old_status_messages() {
        let mut state = ClientState::new();
        state.push_status("sent");
        state.purge_old_status_messages(4);
        assert_eq!(state.status_messages.len(), 1);
        state.purge_old_status_messages(0);
        assert!(state.status_messages.is_empty());
    }
}
