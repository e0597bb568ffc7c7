//! `reqwest` implementation of the messenger API.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::tls;
use super::types::{
    AuthStatus, ChatSummary, OlderMessages, ReadMarker, Recipients, Session, Thread,
    ThreadCursor, User,
};
use super::wire::{
    BroadcastResponse, InboxResponse, LoginResponse, RawThread, ThreadResponse, UserResponse,
    UsersResponse,
};
use super::{unfollowers, MessengerApi};
use crate::config::ApiSettings;

/// Upper bound on follower/following pages walked for one unfollowers lookup.
const MAX_FRIENDSHIP_PAGES: usize = 200;

pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let mut base = settings.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ApiError::Config(format!("invalid API URL {}: {}", base, e)))?;

        let tls = tls::client_config().map_err(ApiError::Config)?;
        let client = reqwest::Client::builder()
            .use_preconfigured_tls(tls)
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Config(format!("invalid endpoint {}: {}", path, e)))
    }

    fn get(&self, session: Option<&Session>, path: &str) -> Result<RequestBuilder, ApiError> {
        debug!(path, "GET");
        Ok(with_session(self.client.get(self.url(path)?), session))
    }

    fn post(&self, session: Option<&Session>, path: &str) -> Result<RequestBuilder, ApiError> {
        debug!(path, "POST");
        Ok(with_session(self.client.post(self.url(path)?), session))
    }

    async fn fetch_friendships(
        &self,
        session: &Session,
        user_id: &str,
        edge: &str,
    ) -> Result<Vec<User>, ApiError> {
        let path = format!("friendships/{}/{}/", user_id, edge);
        let mut users = Vec::new();
        let mut max_id: Option<String> = None;

        for _ in 0..MAX_FRIENDSHIP_PAGES {
            let mut request = self.get(Some(session), &path)?;
            if let Some(id) = &max_id {
                request = request.query(&[("max_id", id.as_str())]);
            }
            let page: UsersResponse = decode(send(request).await?).await?;
            users.extend(page.users.into_iter().map(User::from));

            let next = page.next_max_id.map(|n| n.into_string());
            if next.is_none() || next == max_id {
                return Ok(users);
            }
            max_id = next;
        }

        warn!(edge, pages = MAX_FRIENDSHIP_PAGES, "Stopped paging friendships");
        Ok(users)
    }
}

fn with_session(request: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
    match session {
        Some(session) if !session.is_empty() => request.header(COOKIE, session.cookie_header()),
        _ => request,
    }
}

/// Send a request, turning non-success replies into `ApiError::Rejected`.
async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let payload = serde_json::from_str(&body).unwrap_or(Value::Null);
    Err(ApiError::rejected(status.as_u16(), payload))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Collect `name=value` pairs from the `Set-Cookie` headers of a response.
fn cookies_from(response: &Response) -> Session {
    let pairs = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, value)| !name.is_empty() && !value.is_empty() && *value != "\"\"")
        .map(|(name, value)| (name.to_string(), value.to_string()));
    Session::from_cookies(pairs)
}

fn recipient_users_field(user_ids: &[String]) -> String {
    serde_json::json!([user_ids]).to_string()
}

fn thread_ids_field(thread_id: &str) -> String {
    serde_json::json!([thread_id]).to_string()
}

fn upload_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[async_trait]
impl MessengerApi for HttpApi {
    async fn check_auth(&self, session: Option<&Session>) -> Result<AuthStatus, ApiError> {
        let Some(session) = session.filter(|s| !s.is_empty()) else {
            return Ok(AuthStatus {
                is_logged_in: false,
                session: None,
            });
        };

        match send(self.get(Some(session), "accounts/current_user/")?).await {
            Ok(response) => {
                let fresh = cookies_from(&response);
                let session = (!fresh.is_empty()).then(|| session.refreshed_with(&fresh));
                Ok(AuthStatus {
                    is_logged_in: true,
                    session,
                })
            }
            Err(e) if e.is_unauthorized() => {
                info!("Stored session is no longer valid");
                Ok(AuthStatus {
                    is_logged_in: false,
                    session: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let request = self.post(None, "accounts/login/")?.form(&[
            ("username", username),
            ("password", password),
            ("login_attempt_count", "0"),
        ]);
        let response = send(request).await?;
        let session = cookies_from(&response);
        let body: LoginResponse = decode(response).await?;
        if session.is_empty() {
            return Err(ApiError::Decode("login reply carried no session cookies".into()));
        }
        info!(user = %body.logged_in_user.username, "Logged in");
        Ok(session)
    }

    async fn logout(&self, session: &Session) -> Result<(), ApiError> {
        send(self.post(Some(session), "accounts/logout/")?).await?;
        Ok(())
    }

    async fn get_logged_in_user(&self, session: &Session) -> Result<User, ApiError> {
        let response = send(self.get(Some(session), "accounts/current_user/")?).await?;
        let body: UserResponse = decode(response).await?;
        Ok(body.user.into())
    }

    async fn get_chat_list(&self, session: &Session) -> Result<Vec<ChatSummary>, ApiError> {
        let response = send(self.get(Some(session), "direct_v2/inbox/")?).await?;
        let body: InboxResponse = decode(response).await?;
        Ok(body
            .inbox
            .threads
            .into_iter()
            .map(RawThread::into_summary)
            .collect())
    }

    async fn get_chat(&self, session: &Session, thread_id: &str) -> Result<Thread, ApiError> {
        let path = format!("direct_v2/threads/{}/", thread_id);
        let response = send(self.get(Some(session), &path)?).await?;
        let body: ThreadResponse = decode(response).await?;
        Ok(body.thread.into_thread())
    }

    async fn get_older_messages(
        &self,
        session: &Session,
        cursor: Option<&ThreadCursor>,
        thread_id: &str,
    ) -> Result<OlderMessages, ApiError> {
        let exhausted = || OlderMessages {
            cursor: ThreadCursor {
                thread_id: thread_id.to_string(),
                next: None,
            },
            messages: Vec::new(),
        };

        let start = match cursor.filter(|c| c.thread_id == thread_id) {
            Some(cursor) => match &cursor.next {
                Some(next) => next.clone(),
                None => return Ok(exhausted()),
            },
            None => {
                let thread = self.get_chat(session, thread_id).await?;
                match thread.older_cursor.filter(|_| thread.has_older) {
                    Some(next) => next,
                    None => return Ok(exhausted()),
                }
            }
        };

        let path = format!("direct_v2/threads/{}/", thread_id);
        let request = self
            .get(Some(session), &path)?
            .query(&[("cursor", start.as_str()), ("direction", "older")]);
        let body: ThreadResponse = decode(send(request).await?).await?;

        let next = if body.thread.has_older {
            body.thread.oldest_cursor.clone()
        } else {
            None
        };
        let thread = body.thread.into_thread();
        Ok(OlderMessages {
            cursor: ThreadCursor {
                thread_id: thread_id.to_string(),
                next,
            },
            messages: thread.messages,
        })
    }

    async fn send_message(
        &self,
        session: &Session,
        text: &str,
        thread_id: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .post(Some(session), "direct_v2/threads/broadcast/text/")?
            .form(&[
                ("action", "send_item".to_string()),
                ("thread_ids", thread_ids_field(thread_id)),
                ("text", text.to_string()),
            ]);
        send(request).await?;
        Ok(())
    }

    async fn send_new_chat_message(
        &self,
        session: &Session,
        text: &str,
        user_ids: &[String],
    ) -> Result<Vec<ChatSummary>, ApiError> {
        let request = self
            .post(Some(session), "direct_v2/threads/broadcast/text/")?
            .form(&[
                ("action", "send_item".to_string()),
                ("recipient_users", recipient_users_field(user_ids)),
                ("text", text.to_string()),
            ]);
        let body: BroadcastResponse = decode(send(request).await?).await?;
        Ok(body.into_summaries())
    }

    async fn upload_file(
        &self,
        session: &Session,
        path: &Path,
        recipients: &Recipients,
    ) -> Result<Vec<ChatSummary>, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.jpg")
            .to_string();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(upload_mime(path))?;

        let form = reqwest::multipart::Form::new()
            .text("action", "send_item")
            .part("photo", part);
        let form = match recipients {
            Recipients::Thread(id) => form.text("thread_ids", thread_ids_field(id)),
            Recipients::Users(ids) => form.text("recipient_users", recipient_users_field(ids)),
        };

        let request = self
            .post(Some(session), "direct_v2/threads/broadcast/upload_photo/")?
            .multipart(form);
        let body: BroadcastResponse = decode(send(request).await?).await?;
        Ok(body.into_summaries())
    }

    async fn search_users(&self, session: &Session, query: &str) -> Result<Vec<User>, ApiError> {
        let request = self
            .get(Some(session), "users/search/")?
            .query(&[("q", query)]);
        let body: UsersResponse = decode(send(request).await?).await?;
        Ok(body.users.into_iter().map(User::from).collect())
    }

    async fn seen(&self, session: &Session, marker: &ReadMarker) -> Result<(), ApiError> {
        let path = format!(
            "direct_v2/threads/{}/items/{}/seen/",
            marker.thread_id, marker.item_id
        );
        let request = self
            .post(Some(session), &path)?
            .form(&[("use_unified_inbox", "true")]);
        send(request).await?;
        Ok(())
    }

    async fn get_unfollowers(&self, session: &Session) -> Result<Vec<User>, ApiError> {
        let me = self.get_logged_in_user(session).await?;
        let following = self.fetch_friendships(session, &me.id, "following").await?;
        let followers = self.fetch_friendships(session, &me.id, "followers").await?;
        Ok(unfollowers(following, &followers))
    }

    async fn unfollow(&self, session: &Session, user_id: &str) -> Result<(), ApiError> {
        let path = format!("friendships/destroy/{}/", user_id);
        let request = self
            .post(Some(session), &path)?
            .form(&[("user_id", user_id)]);
        send(request).await?;
        Ok(())
    }
}
