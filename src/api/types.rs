//! Domain types exchanged between the API client, the backend and the UI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Authentication context returned by a successful login.
///
/// Opaque to everything but the API client: the backend only stores and
/// replaces it, never edits individual cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: BTreeMap<String, String>,
}

impl Session {
    pub fn from_cookies<I, K, V>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cookies: cookies
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Render the bundle as a single `Cookie` request header value.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// A copy of this session with newer cookie values layered on top.
    pub fn refreshed_with(&self, newer: &Session) -> Session {
        let mut cookies = self.cookies.clone();
        cookies.extend(newer.cookies.iter().map(|(k, v)| (k.clone(), v.clone())));
        Session { cookies }
    }
}

/// Result of verifying a session against the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStatus {
    pub is_logged_in: bool,
    /// Session to keep using, if the service refreshed it.
    pub session: Option<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

impl User {
    /// Full name when the account has one, username otherwise.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text(String),
    Like,
    Media { url: String },
    Link { text: String, url: String },
    /// Item type the client does not render.
    Other(String),
}

impl MessageKind {
    /// One-line text used for previews and plain rendering.
    pub fn preview(&self) -> String {
        match self {
            MessageKind::Text(text) => text.clone(),
            MessageKind::Like => "❤".to_string(),
            MessageKind::Media { .. } => "[photo]".to_string(),
            MessageKind::Link { text, .. } => text.clone(),
            MessageKind::Other(kind) => format!("[{}]", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub user_id: String,
    /// Microseconds since the Unix epoch.
    pub timestamp: i64,
    pub kind: MessageKind,
}

/// One entry of the inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    pub users: Vec<User>,
    pub last_activity_at: i64,
    pub unread: bool,
    pub last_message: Option<Message>,
}

impl ChatSummary {
    /// Marker for the newest item, used to flag the thread as seen.
    pub fn read_marker(&self) -> Option<ReadMarker> {
        self.last_message.as_ref().map(|m| ReadMarker {
            thread_id: self.id.clone(),
            item_id: m.id.clone(),
        })
    }
}

/// A thread with its loaded messages, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub users: Vec<User>,
    pub messages: Vec<Message>,
    pub older_cursor: Option<String>,
    pub has_older: bool,
}

/// Pagination position inside one thread's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadCursor {
    pub thread_id: String,
    /// Cursor to request the next older page with, `None` once exhausted.
    pub next: Option<String>,
}

impl ThreadCursor {
    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OlderMessages {
    pub cursor: ThreadCursor,
    pub messages: Vec<Message>,
}

/// Identifies the newest item of a thread the user has seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMarker {
    pub thread_id: String,
    pub item_id: String,
}

/// Where an upload goes: an existing thread or a new conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    Thread(String),
    Users(Vec<String>),
}

impl Recipients {
    pub fn is_new_chat(&self) -> bool {
        matches!(self, Recipients::Users(_))
    }
}
