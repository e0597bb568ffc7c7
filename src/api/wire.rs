//! JSON shapes of the private API and their conversion into domain types.

use serde::Deserialize;

use super::types::{ChatSummary, Message, MessageKind, Thread, User};

/// Numeric fields arrive either as JSON numbers or as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumOrStr {
    Num(i64),
    Str(String),
}

impl NumOrStr {
    pub fn as_i64(&self) -> i64 {
        match self {
            NumOrStr::Num(n) => *n,
            NumOrStr::Str(s) => s.parse().unwrap_or_default(),
        }
    }

    pub fn into_string(self) -> String {
        match self {
            NumOrStr::Num(n) => n.to_string(),
            NumOrStr::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawUser {
    pub pk: NumOrStr,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        User {
            id: raw.pk.into_string(),
            username: raw.username,
            full_name: raw.full_name,
            profile_pic_url: raw.profile_pic_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawImageCandidate {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct RawImageVersions {
    #[serde(default)]
    pub candidates: Vec<RawImageCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct RawMedia {
    #[serde(default)]
    pub image_versions2: Option<RawImageVersions>,
}

#[derive(Debug, Deserialize)]
pub struct RawLinkContext {
    #[serde(default)]
    pub link_url: String,
}

#[derive(Debug, Deserialize)]
pub struct RawLink {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link_context: Option<RawLinkContext>,
}

#[derive(Debug, Deserialize)]
pub struct RawItem {
    pub item_id: String,
    pub user_id: NumOrStr,
    pub timestamp: NumOrStr,
    pub item_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media: Option<RawMedia>,
    #[serde(default)]
    pub link: Option<RawLink>,
}

impl From<RawItem> for Message {
    fn from(raw: RawItem) -> Self {
        let kind = match raw.item_type.as_str() {
            "text" => MessageKind::Text(raw.text.unwrap_or_default()),
            "like" => MessageKind::Like,
            "media" => match raw
                .media
                .and_then(|m| m.image_versions2)
                .and_then(|v| v.candidates.into_iter().next())
            {
                Some(candidate) => MessageKind::Media { url: candidate.url },
                None => MessageKind::Other(raw.item_type),
            },
            "link" => match raw.link {
                Some(link) => MessageKind::Link {
                    url: link.link_context.map(|c| c.link_url).unwrap_or_default(),
                    text: link.text,
                },
                None => MessageKind::Other(raw.item_type),
            },
            _ => MessageKind::Other(raw.item_type),
        };
        Message {
            id: raw.item_id,
            user_id: raw.user_id.into_string(),
            timestamp: raw.timestamp.as_i64(),
            kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawThread {
    pub thread_id: String,
    #[serde(default)]
    pub thread_title: String,
    #[serde(default)]
    pub users: Vec<RawUser>,
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub last_activity_at: Option<NumOrStr>,
    #[serde(default)]
    pub oldest_cursor: Option<String>,
    #[serde(default)]
    pub has_older: bool,
    /// Per-viewer timestamp of the last item seen, keyed by user id.
    #[serde(default)]
    pub last_seen_at: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub viewer_id: Option<NumOrStr>,
}

impl RawThread {
    fn title_or_users(title: String, users: &[User]) -> String {
        if !title.trim().is_empty() {
            return title;
        }
        users
            .iter()
            .map(|u| u.username.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn viewer_seen_at(&self) -> Option<i64> {
        let viewer = self.viewer_id.clone()?.into_string();
        let entry = self.last_seen_at.get(&viewer)?;
        let ts = entry.get("timestamp")?;
        match ts {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Items sorted oldest first.
    fn into_messages(items: Vec<RawItem>) -> Vec<Message> {
        let mut messages: Vec<Message> = items.into_iter().map(Message::from).collect();
        messages.sort_by_key(|m| m.timestamp);
        messages
    }

    pub fn into_summary(self) -> ChatSummary {
        let seen_at = self.viewer_seen_at();
        let users: Vec<User> = self.users.into_iter().map(User::from).collect();
        let last_message = self
            .items
            .into_iter()
            .map(Message::from)
            .max_by_key(|m| m.timestamp);
        let last_activity_at = self
            .last_activity_at
            .map(|t| t.as_i64())
            .or_else(|| last_message.as_ref().map(|m| m.timestamp))
            .unwrap_or_default();
        let unread = match (seen_at, self.viewer_id.as_ref(), last_message.as_ref()) {
            // Our own latest message never counts as unread.
            (_, Some(viewer), Some(m)) if viewer.clone().into_string() == m.user_id => false,
            (Some(seen), _, _) => seen < last_activity_at,
            (None, _, Some(_)) => true,
            (None, _, None) => false,
        };
        ChatSummary {
            title: Self::title_or_users(self.thread_title, &users),
            id: self.thread_id,
            users,
            last_activity_at,
            unread,
            last_message,
        }
    }

    pub fn into_thread(self) -> Thread {
        let users: Vec<User> = self.users.into_iter().map(User::from).collect();
        Thread {
            title: Self::title_or_users(self.thread_title, &users),
            id: self.thread_id,
            users,
            messages: Self::into_messages(self.items),
            older_cursor: self.oldest_cursor,
            has_older: self.has_older,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InboxResponse {
    pub inbox: Inbox,
}

#[derive(Debug, Deserialize)]
pub struct Inbox {
    #[serde(default)]
    pub threads: Vec<RawThread>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadResponse {
    pub thread: RawThread,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastResponse {
    #[serde(default)]
    pub threads: Vec<RawThread>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl BroadcastResponse {
    /// Threads touched by a send, as summaries.
    pub fn into_summaries(self) -> Vec<ChatSummary> {
        if !self.threads.is_empty() {
            return self.threads.into_iter().map(RawThread::into_summary).collect();
        }
        self.thread_id
            .map(|id| {
                vec![ChatSummary {
                    id,
                    title: String::new(),
                    users: Vec::new(),
                    last_activity_at: 0,
                    unread: false,
                    last_message: None,
                }]
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub user: RawUser,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub logged_in_user: RawUser,
}

#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<RawUser>,
    #[serde(default)]
    pub next_max_id: Option<NumOrStr>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thread_json() -> serde_json::Value {
        json!({
            "thread_id": "340282366841710300949128",
            "thread_title": "",
            "viewer_id": 1,
            "users": [{"pk": 2, "username": "bob", "full_name": "Bob"}],
            "last_activity_at": "1700000000000300",
            "oldest_cursor": "cur-1",
            "has_older": true,
            "last_seen_at": {"1": {"timestamp": "1700000000000100", "item_id": "a"}},
            "items": [
                {"item_id": "c", "user_id": 2, "timestamp": "1700000000000300", "item_type": "like"},
                {"item_id": "a", "user_id": 1, "timestamp": 1700000000000100i64, "item_type": "text", "text": "hi"},
                {"item_id": "b", "user_id": 2, "timestamp": "1700000000000200", "item_type": "media",
                 "media": {"image_versions2": {"candidates": [{"url": "https://cdn/x.jpg"}]}}}
            ]
        })
    }

    #[test]
    fn test_thread_messages_sorted_oldest_first() {
        let raw: RawThread = serde_json::from_value(thread_json()).unwrap();
        let thread = raw.into_thread();
        let ids: Vec<_> = thread.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(thread.title, "bob");
        assert_eq!(thread.older_cursor.as_deref(), Some("cur-1"));
        assert!(thread.has_older);
        assert_eq!(
            thread.messages[1].kind,
            MessageKind::Media {
                url: "https://cdn/x.jpg".into()
            }
        );
    }

    #[test]
    fn test_summary_unread_from_last_seen() {
        let raw: RawThread = serde_json::from_value(thread_json()).unwrap();
        let summary = raw.into_summary();
        assert!(summary.unread);
        assert_eq!(summary.last_activity_at, 1_700_000_000_000_300);
        assert_eq!(summary.last_message.map(|m| m.id), Some("c".to_string()));
    }

    #[test]
    fn test_own_last_message_is_not_unread() {
        let raw: RawThread = serde_json::from_value(json!({
            "thread_id": "t",
            "viewer_id": "1",
            "items": [{"item_id": "x", "user_id": "1", "timestamp": 5, "item_type": "text", "text": "yo"}]
        }))
        .unwrap();
        assert!(!raw.into_summary().unread);
    }

    #[test]
    fn test_unknown_item_type_is_kept() {
        let item: RawItem = serde_json::from_value(json!({
            "item_id": "z", "user_id": 3, "timestamp": 1, "item_type": "reel_share"
        }))
        .unwrap();
        assert_eq!(
            Message::from(item).kind,
            MessageKind::Other("reel_share".into())
        );
    }

    #[test]
    fn test_broadcast_falls_back_to_thread_id() {
        let resp: BroadcastResponse =
            serde_json::from_value(json!({"thread_id": "t42", "status": "ok"})).unwrap();
        let summaries = resp.into_summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "t42");
    }
}
