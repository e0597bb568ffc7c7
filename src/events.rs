//! Backend event processing (views, inbox updates, thread contents, toasts).

use std::collections::HashMap;

use crate::api::ChatSummary;
use crate::protocol::{BackendAction, GuiEvent, View};
use crate::state::{ClientState, Screen};

/// Apply one backend event to the state.
///
/// Returns follow-up actions the UI should send to the backend.
pub fn process_single_event(state: &mut ClientState, event: GuiEvent) -> Vec<BackendAction> {
    match event {
        GuiEvent::ShowView(View::Login) => {
            state.reset(Screen::Login);
            Vec::new()
        }
        GuiEvent::ShowView(View::Chats) => {
            state.reset(Screen::Chats);
            vec![BackendAction::GetLoggedInUser, BackendAction::GetChatList]
        }
        GuiEvent::LoginError(message) => {
            state.login.pending = false;
            state.login.error = Some(message);
            Vec::new()
        }
        GuiEvent::LoggedInUser(user) => {
            state.user = Some(user);
            Vec::new()
        }
        GuiEvent::ChatList(chats) => {
            let fresh = newly_unread(&state.chats, &chats);
            state.chats = chats;
            if state.focused {
                Vec::new()
            } else {
                vec![BackendAction::IncreaseBadgeCount; fresh]
            }
        }
        GuiEvent::Chat(thread) => {
            let is_open = state.active_thread.as_deref() == Some(thread.id.as_str());
            // A message to a new conversation created this thread
            let is_created = state.active_thread.is_none()
                && state.awaiting_created
                && !state.new_chat.is_empty();
            if is_open {
                state.apply_thread(thread);
            } else if is_created {
                state.new_chat.clear();
                state.awaiting_created = false;
                state.active_thread = Some(thread.id.clone());
                state.apply_thread(thread);
            } else {
                tracing::debug!(thread_id = %thread.id, "Ignoring thread that is not open");
            }
            Vec::new()
        }
        GuiEvent::OlderMessages(messages) => {
            state.prepend_older(messages);
            Vec::new()
        }
        GuiEvent::OlderMessagesFailed(message) => {
            state.older_failed(message);
            Vec::new()
        }
        GuiEvent::SearchResult(users) => {
            state.search_results = users;
            Vec::new()
        }
        GuiEvent::Unfollowers(users) => {
            state.unfollowers = users;
            state.show_unfollowers = true;
            Vec::new()
        }
        GuiEvent::BadgeCount(count) => {
            state.badge = count;
            Vec::new()
        }
        GuiEvent::Notice(message) => {
            state.push_status(message);
            Vec::new()
        }
        GuiEvent::Error(message) => {
            tracing::error!("Backend error: {}", message);
            state.push_status(format!("Error: {}", message));
            Vec::new()
        }
    }
}

/// Count threads that became unread or got newer unread activity since the last poll.
fn newly_unread(previous: &[ChatSummary], current: &[ChatSummary]) -> usize {
    let seen: HashMap<&str, &ChatSummary> = previous.iter().map(|c| (c.id.as_str(), c)).collect();
    current
        .iter()
        .filter(|c| c.unread)
        .filter(|c| match seen.get(c.id.as_str()) {
            Some(before) => !before.unread || c.last_activity_at > before.last_activity_at,
            None => true,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Message, MessageKind, Thread, User};

    fn chat(id: &str, last_activity_at: i64, unread: bool) -> ChatSummary {
        ChatSummary {
            id: id.into(),
            title: id.into(),
            users: Vec::new(),
            last_activity_at,
            unread,
            last_message: None,
        }
    }

    fn thread(id: &str) -> Thread {
        Thread {
            id: id.into(),
            title: id.into(),
            users: Vec::new(),
            messages: vec![Message {
                id: "m1".into(),
                user_id: "2".into(),
                timestamp: 1,
                kind: MessageKind::Like,
            }],
            older_cursor: None,
            has_older: false,
        }
    }

    #[test]
    fn test_chats_view_requests_user_and_inbox() {
        let mut state = ClientState::new();
        state.chats.push(chat("old", 1, false));
        let actions = process_single_event(&mut state, GuiEvent::ShowView(View::Chats));
        assert_eq!(
            actions,
            vec![BackendAction::GetLoggedInUser, BackendAction::GetChatList]
        );
        assert_eq!(state.screen, Screen::Chats);
        assert!(state.chats.is_empty());
    }

    #[test]
    fn test_login_error_ends_pending_login() {
        let mut state = ClientState::new();
        state.login.pending = true;
        process_single_event(&mut state, GuiEvent::LoginError("nope".into()));
        assert!(!state.login.pending);
        assert_eq!(state.login.error.as_deref(), Some("nope"));
    }

    #[test]
    fn test_badge_grows_only_while_unfocused() {
        let mut state = ClientState::new();
        let focused = process_single_event(
            &mut state,
            GuiEvent::ChatList(vec![chat("a", 5, true)]),
        );
        assert!(focused.is_empty());

        state.focused = false;
        let actions = process_single_event(
            &mut state,
            GuiEvent::ChatList(vec![chat("a", 6, true), chat("b", 1, true), chat("c", 1, false)]),
        );
        assert_eq!(actions, vec![BackendAction::IncreaseBadgeCount; 2]);

        let repeat = process_single_event(
            &mut state,
            GuiEvent::ChatList(vec![chat("a", 6, true), chat("b", 1, true)]),
        );
        assert!(repeat.is_empty());
    }

    #[test]
    fn test_chat_for_other_thread_is_ignored() {
        let mut state = ClientState::new();
        state.active_thread = Some("a".into());
        process_single_event(&mut state, GuiEvent::Chat(thread("b")));
        assert!(state.thread.is_none());

        process_single_event(&mut state, GuiEvent::Chat(thread("a")));
        assert_eq!(state.thread.as_ref().map(|t| t.id.as_str()), Some("a"));
    }

    fn bob() -> User {
        User {
            id: "5".into(),
            username: "bob".into(),
            full_name: String::new(),
            profile_pic_url: None,
        }
    }

    #[test]
    fn test_new_chat_adopts_created_thread() {
        let mut state = ClientState::new();
        state.start_new_chat(bob());
        state.compose_text = "hi".into();
        assert!(state.compose_message().is_some());

        process_single_event(&mut state, GuiEvent::Chat(thread("created")));
        assert_eq!(state.active_thread.as_deref(), Some("created"));
        assert!(state.new_chat.is_empty());
        assert!(!state.awaiting_created);
    }

    #[test]
    fn test_poll_of_previous_thread_does_not_take_over_new_chat() {
        let mut state = ClientState::new();
        state.select_thread("a");
        process_single_event(&mut state, GuiEvent::Chat(thread("a")));
        assert_eq!(state.start_new_chat(bob()), vec![BackendAction::CloseChat]);

        // Poll result that was already on its way
        process_single_event(&mut state, GuiEvent::Chat(thread("a")));
        assert!(state.active_thread.is_none());
        assert!(state.thread.is_none());

        state.compose_text = "hi bob".into();
        assert_eq!(
            state.compose_message(),
            Some(BackendAction::SendMessage(crate::protocol::MessagePayload {
                text: "hi bob".into(),
                target: crate::protocol::MessageTarget::NewChat(vec!["5".into()]),
            }))
        );
    }

    #[test]
    fn test_failed_older_page_keeps_load_button() {
        let mut state = ClientState::new();
        state.select_thread("a");
        let mut open = thread("a");
        open.has_older = true;
        process_single_event(&mut state, GuiEvent::Chat(open));
        assert!(state.request_older().is_some());

        process_single_event(
            &mut state,
            GuiEvent::OlderMessagesFailed("Could not load older messages".into()),
        );
        assert!(state.has_older);
        assert!(!state.loading_older);
        assert_eq!(state.status_messages.len(), 1);
    }

    #[test]
    fn test_notice_and_error_become_toasts() {
        let mut state = ClientState::new();
        process_single_event(&mut state, GuiEvent::Notice("Upload failed".into()));
        process_single_event(&mut state, GuiEvent::Error("boom".into()));
        let toasts: Vec<_> = state.status_messages.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(toasts, vec!["Upload failed", "Error: boom"]);
    }

    #[test]
    fn test_unfollowers_open_dialog() {
        let mut state = ClientState::new();
        process_single_event(&mut state, GuiEvent::Unfollowers(Vec::new()));
        assert!(state.show_unfollowers);
        process_single_event(&mut state, GuiEvent::BadgeCount(4));
        assert_eq!(state.badge, 4);
    }
}
