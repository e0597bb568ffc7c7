//! Messenger API client.
//!
//! - `MessengerApi`: the calls the backend makes against the remote service
//! - `http`: `reqwest` implementation of those calls
//! - `types`: domain types shared with the backend and UI
//! - `wire`: JSON shapes of the private API
//! - `error`: `ApiError` and login error messaging

mod error;
mod http;
mod tls;
mod types;
mod wire;

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;

pub use error::{login_error_message, ApiError, TWO_FACTOR_MESSAGE, UNKNOWN_LOGIN_ERROR};
pub use http::HttpApi;
pub use types::{
    AuthStatus, ChatSummary, Message, MessageKind, OlderMessages, ReadMarker, Recipients,
    Session, Thread, ThreadCursor, User,
};

/// Calls the backend makes against the remote service.
#[async_trait]
pub trait MessengerApi: Send + Sync {
    /// Check whether `session` is still accepted. No session means logged out.
    async fn check_auth(&self, session: Option<&Session>) -> Result<AuthStatus, ApiError>;

    async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError>;

    async fn logout(&self, session: &Session) -> Result<(), ApiError>;

    async fn get_logged_in_user(&self, session: &Session) -> Result<User, ApiError>;

    async fn get_chat_list(&self, session: &Session) -> Result<Vec<ChatSummary>, ApiError>;

    async fn get_chat(&self, session: &Session, thread_id: &str) -> Result<Thread, ApiError>;

    /// Fetch the page before `cursor`. Without a cursor for `thread_id`, the
    /// newest page is skipped and the one before it returned.
    async fn get_older_messages(
        &self,
        session: &Session,
        cursor: Option<&ThreadCursor>,
        thread_id: &str,
    ) -> Result<OlderMessages, ApiError>;

    async fn send_message(
        &self,
        session: &Session,
        text: &str,
        thread_id: &str,
    ) -> Result<(), ApiError>;

    /// Start a conversation with `user_ids`; returns the threads created.
    async fn send_new_chat_message(
        &self,
        session: &Session,
        text: &str,
        user_ids: &[String],
    ) -> Result<Vec<ChatSummary>, ApiError>;

    async fn upload_file(
        &self,
        session: &Session,
        path: &Path,
        recipients: &Recipients,
    ) -> Result<Vec<ChatSummary>, ApiError>;

    async fn search_users(&self, session: &Session, query: &str) -> Result<Vec<User>, ApiError>;

    async fn seen(&self, session: &Session, marker: &ReadMarker) -> Result<(), ApiError>;

    /// Accounts the user follows that do not follow back.
    async fn get_unfollowers(&self, session: &Session) -> Result<Vec<User>, ApiError>;

    async fn unfollow(&self, session: &Session, user_id: &str) -> Result<(), ApiError>;
}

/// Accounts in `following` missing from `followers`, in `following` order.
pub fn unfollowers(following: Vec<User>, followers: &[User]) -> Vec<User> {
    let follower_ids: HashSet<&str> = followers.iter().map(|u| u.id.as_str()).collect();
    following
        .into_iter()
        .filter(|u| !follower_ids.contains(u.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: format!("user{}", id),
            full_name: String::new(),
            profile_pic_url: None,
        }
    }

    #[test]
    fn test_unfollowers_keeps_following_order() {
        let following = vec![user("3"), user("1"), user("2"), user("4")];
        let followers = vec![user("1"), user("4"), user("9")];
        let ids: Vec<_> = unfollowers(following, &followers)
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn test_unfollowers_empty_when_all_follow_back() {
        let following = vec![user("1")];
        assert!(unfollowers(following, &[user("1")]).is_empty());
    }
}
