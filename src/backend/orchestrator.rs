//! Session and polling orchestration.
//!
//! `Orchestrator` owns every piece of backend state: the session, the poll
//! interval, the polled thread and its cursor, the badge counter and the poll
//! timers. UI actions and network completions are applied to it one at a
//! time from the backend loop; network calls run as spawned tasks that only
//! own copies of their inputs and report back through the completion channel.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::scheduler::{PollTarget, PollTimers, PollingPolicy};
use super::session::SessionHolder;
use super::thread::ThreadTracker;
use crate::api::{
    login_error_message, ApiError, AuthStatus, ChatSummary, MessengerApi, OlderMessages,
    Session, Thread, User,
};
use crate::config::PollingSettings;
use crate::protocol::{
    BackendAction, GuiEvent, MessagePayload, MessageTarget, UploadPayload, View,
};
use crate::validation;

/// Result of a spawned API call, tagged with the session generation it ran under.
#[derive(Debug)]
pub struct Completion {
    generation: u64,
    outcome: Outcome,
}

#[derive(Debug)]
enum Outcome {
    Auth {
        window: u64,
        result: Result<AuthStatus, ApiError>,
    },
    Login(Result<Session, ApiError>),
    LoggedInUser(Result<User, ApiError>),
    ChatList(Result<Vec<ChatSummary>, ApiError>),
    Chat {
        thread_id: String,
        result: Result<Thread, ApiError>,
    },
    OlderMessages {
        thread_id: String,
        result: Result<OlderMessages, ApiError>,
    },
    /// A message or upload went out; `open_created` opens the thread it created.
    Sent {
        open_created: bool,
        notice: &'static str,
        result: Result<Vec<ChatSummary>, ApiError>,
    },
    SearchResult(Result<Vec<User>, ApiError>),
    Unfollowers(Result<Vec<User>, ApiError>),
    /// Fire-and-forget call with nothing to report on success.
    Done {
        request: &'static str,
        notice: Option<&'static str>,
        result: Result<(), ApiError>,
    },
}

impl Outcome {
    /// Results that must not reach the UI once the session has changed.
    fn needs_current_session(&self) -> bool {
        !matches!(
            self,
            Outcome::Auth { .. } | Outcome::Login(_) | Outcome::Done { .. }
        )
    }
}

pub struct Orchestrator {
    api: Arc<dyn MessengerApi>,
    session: SessionHolder,
    polling: PollingPolicy,
    timers: PollTimers,
    thread: ThreadTracker,
    badge: u32,
    /// Incremented on every window creation; older auth checks are ignored.
    window: u64,
    event_tx: Sender<GuiEvent>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl Orchestrator {
    pub fn new(
        api: Arc<dyn MessengerApi>,
        polling: &PollingSettings,
        event_tx: Sender<GuiEvent>,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            api,
            session: SessionHolder::new(),
            polling: PollingPolicy::new(polling),
            timers: PollTimers::new(),
            thread: ThreadTracker::default(),
            badge: 0,
            window: 0,
            event_tx,
            completion_tx,
            completion_rx,
        }
    }

    pub fn session(&self) -> &SessionHolder {
        &self.session
    }

    pub fn polling(&self) -> &PollingPolicy {
        &self.polling
    }

    pub fn timers(&self) -> &PollTimers {
        &self.timers
    }

    pub fn thread(&self) -> &ThreadTracker {
        &self.thread
    }

    pub fn badge_count(&self) -> u32 {
        self.badge
    }

    /// Wait up to `idle` for one completion or timer and apply it.
    pub async fn step(&mut self, idle: Duration) {
        enum Wake {
            Completion(Completion),
            Timer(PollTarget),
            Idle,
        }

        let wake = tokio::select! {
            Some(completion) = self.completion_rx.recv() => Wake::Completion(completion),
            Some(target) = self.timers.next_expired() => Wake::Timer(target),
            _ = tokio::time::sleep(idle) => Wake::Idle,
        };

        match wake {
            Wake::Completion(completion) => self.handle_completion(completion),
            Wake::Timer(target) => self.fire(target),
            Wake::Idle => {}
        }
    }

    /// Wait for the next completion and apply it.
    pub async fn settle(&mut self) {
        if let Some(completion) = self.completion_rx.recv().await {
            self.handle_completion(completion);
        }
    }

    pub fn handle_action(&mut self, action: BackendAction) {
        match action {
            BackendAction::OpenWindow => self.open_window(),
            BackendAction::Login { username, password } => self.login(username, password),
            BackendAction::Logout => self.logout(),
            BackendAction::GetLoggedInUser => {
                if let Some(session) = self.session_for("logged-in user") {
                    let api = Arc::clone(&self.api);
                    self.spawn(async move {
                        Outcome::LoggedInUser(api.get_logged_in_user(&session).await)
                    });
                }
            }
            BackendAction::GetChatList => self.fetch_chat_list(),
            BackendAction::GetChat(thread_id) => self.open_thread(thread_id),
            BackendAction::CloseChat => {
                debug!("Closing the open thread");
                self.thread.reset();
                self.timers.cancel_threads();
            }
            BackendAction::GetOlderMessages(thread_id) => self.fetch_older_messages(thread_id),
            BackendAction::SendMessage(payload) => self.send_message(payload),
            BackendAction::Upload(payload) => self.upload(payload),
            BackendAction::SearchUsers(query) => self.search_users(&query),
            BackendAction::MarkAsRead(marker) => {
                if let Some(session) = self.session_for("mark as read") {
                    let api = Arc::clone(&self.api);
                    self.spawn(async move {
                        Outcome::Done {
                            request: "mark as read",
                            notice: None,
                            result: api.seen(&session, &marker).await,
                        }
                    });
                }
            }
            BackendAction::IncreaseBadgeCount => {
                self.badge = self.badge.saturating_add(1);
                self.emit(GuiEvent::BadgeCount(self.badge));
            }
            BackendAction::GetUnfollowers => {
                if let Some(session) = self.session_for("unfollowers") {
                    let api = Arc::clone(&self.api);
                    self.spawn(async move {
                        Outcome::Unfollowers(api.get_unfollowers(&session).await)
                    });
                }
            }
            BackendAction::Unfollow(user_id) => {
                if let Some(session) = self.session_for("unfollow") {
                    let api = Arc::clone(&self.api);
                    self.spawn(async move {
                        Outcome::Done {
                            request: "unfollow",
                            notice: Some("Could not unfollow that account"),
                            result: api.unfollow(&session, &user_id).await,
                        }
                    });
                }
            }
            BackendAction::WindowFocused => {
                self.polling.focus_gained();
                self.badge = 0;
                self.emit(GuiEvent::BadgeCount(0));
            }
            BackendAction::WindowBlurred => self.polling.focus_lost(),
        }
    }

    pub fn handle_completion(&mut self, completion: Completion) {
        let Completion {
            generation,
            outcome,
        } = completion;
        if outcome.needs_current_session() && generation != self.session.generation() {
            debug!("Dropping result from a previous session");
            return;
        }

        match outcome {
            Outcome::Auth { window, result } => self.finish_window(window, result),
            Outcome::Login(Ok(session)) => {
                info!("Login succeeded");
                self.session.replace(session);
                self.timers.cancel_all();
                self.thread.reset();
                self.open_window();
            }
            Outcome::Login(Err(e)) => {
                info!(error = %e, "Login failed");
                self.emit(GuiEvent::LoginError(login_error_message(&e)));
            }
            Outcome::LoggedInUser(Ok(user)) => self.emit(GuiEvent::LoggedInUser(user)),
            Outcome::LoggedInUser(Err(e)) => warn!(error = %e, "Failed to load logged-in user"),
            Outcome::ChatList(Ok(chats)) => {
                self.emit(GuiEvent::ChatList(chats));
                self.timers
                    .arm(PollTarget::ChatList, self.polling.interval());
            }
            Outcome::ChatList(Err(e)) => {
                warn!(error = %e, "Chat list fetch failed, backing off");
                self.timers.arm(PollTarget::ChatList, self.polling.backoff());
            }
            Outcome::Chat { thread_id, result } => self.finish_chat(thread_id, result),
            Outcome::OlderMessages { thread_id, result } => {
                if !self.thread.is_current(&thread_id) {
                    debug!(thread_id = %thread_id, "Dropping older messages for a thread no longer open");
                    return;
                }
                match result {
                    Ok(older) => {
                        self.thread.store_cursor(older.cursor);
                        self.emit(GuiEvent::OlderMessages(older.messages));
                    }
                    Err(e) => {
                        warn!(thread_id = %thread_id, error = %e, "Failed to load older messages");
                        self.emit(GuiEvent::OlderMessagesFailed(
                            "Could not load older messages".to_string(),
                        ));
                    }
                }
            }
            Outcome::Sent {
                open_created,
                notice,
                result,
            } => match result {
                Ok(chats) => {
                    if open_created {
                        if let Some(first) = chats.into_iter().next() {
                            self.open_thread(first.id);
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "{}", notice);
                    self.emit(GuiEvent::Notice(notice.to_string()));
                }
            },
            Outcome::SearchResult(Ok(users)) => self.emit(GuiEvent::SearchResult(users)),
            Outcome::SearchResult(Err(e)) => warn!(error = %e, "User search failed"),
            Outcome::Unfollowers(Ok(users)) => self.emit(GuiEvent::Unfollowers(users)),
            Outcome::Unfollowers(Err(e)) => warn!(error = %e, "Failed to load unfollowers"),
            Outcome::Done {
                request,
                notice,
                result,
            } => {
                if let Err(e) = result {
                    warn!(request, error = %e, "Request failed");
                    if let Some(notice) = notice {
                        self.emit(GuiEvent::Notice(notice.to_string()));
                    }
                }
            }
        }
    }

    /// A poll timer fired.
    fn fire(&mut self, target: PollTarget) {
        match target {
            PollTarget::ChatList => self.fetch_chat_list(),
            PollTarget::Thread(thread_id) => {
                if self.thread.is_current(&thread_id) {
                    self.fetch_thread(thread_id);
                }
            }
        }
    }

    fn open_window(&mut self) {
        self.window += 1;
        let window = self.window;

        let Some(session) = self.session.current().cloned() else {
            debug!("No session, showing login");
            self.emit(GuiEvent::ShowView(View::Login));
            return;
        };

        let api = Arc::clone(&self.api);
        self.spawn(async move {
            Outcome::Auth {
                window,
                result: api.check_auth(Some(&session)).await,
            }
        });
    }

    fn finish_window(&mut self, window: u64, result: Result<AuthStatus, ApiError>) {
        if window != self.window {
            debug!(window, "Dropping auth check for a superseded window");
            return;
        }

        let view = match result {
            Ok(status) => {
                if let Some(session) = status.session {
                    self.session.refresh(session);
                }
                if status.is_logged_in {
                    View::Chats
                } else {
                    self.session.clear();
                    self.timers.cancel_all();
                    self.thread.reset();
                    View::Login
                }
            }
            Err(e) => {
                warn!(error = %e, "Session check failed");
                View::Login
            }
        };
        self.emit(GuiEvent::ShowView(view));
    }

    fn login(&mut self, username: String, password: String) {
        if let Err(message) = validation::validate_credentials(&username, &password) {
            self.emit(GuiEvent::LoginError(message));
            return;
        }

        let api = Arc::clone(&self.api);
        let username = username.trim().to_string();
        self.spawn(async move { Outcome::Login(api.login(&username, &password).await) });
    }

    fn logout(&mut self) {
        if let Some(session) = self.session.clear() {
            let api = Arc::clone(&self.api);
            self.spawn(async move {
                Outcome::Done {
                    request: "logout",
                    notice: None,
                    result: api.logout(&session).await,
                }
            });
        }
        self.timers.cancel_all();
        self.thread.reset();
        info!("Logged out");
        self.open_window();
    }

    fn fetch_chat_list(&mut self) {
        let Some(session) = self.session_for("chat list") else {
            return;
        };
        let api = Arc::clone(&self.api);
        self.spawn(async move { Outcome::ChatList(api.get_chat_list(&session).await) });
    }

    fn open_thread(&mut self, thread_id: String) {
        if self.thread.open(&thread_id) {
            debug!(thread_id = %thread_id, "Switched thread");
        }
        self.timers.cancel_threads();
        self.fetch_thread(thread_id);
    }

    fn fetch_thread(&mut self, thread_id: String) {
        let Some(session) = self.session_for("chat") else {
            return;
        };
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api.get_chat(&session, &thread_id).await;
            Outcome::Chat { thread_id, result }
        });
    }

    fn finish_chat(&mut self, thread_id: String, result: Result<Thread, ApiError>) {
        if !self.thread.is_current(&thread_id) {
            debug!(thread_id = %thread_id, "Dropping chat for a thread no longer open");
            return;
        }
        match result {
            Ok(thread) => {
                self.emit(GuiEvent::Chat(thread));
                self.timers
                    .arm(PollTarget::Thread(thread_id), self.polling.interval());
            }
            Err(e) => {
                warn!(thread_id = %thread_id, error = %e, "Chat fetch failed, backing off");
                self.timers
                    .arm(PollTarget::Thread(thread_id), self.polling.backoff());
            }
        }
    }

    fn fetch_older_messages(&mut self, thread_id: String) {
        let cursor = self.thread.cursor_for(&thread_id).cloned();
        if cursor.as_ref().is_some_and(|c| c.is_exhausted()) {
            self.emit(GuiEvent::OlderMessages(Vec::new()));
            return;
        }
        let Some(session) = self.session_for("older messages") else {
            return;
        };
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api
                .get_older_messages(&session, cursor.as_ref(), &thread_id)
                .await;
            Outcome::OlderMessages { thread_id, result }
        });
    }

    fn send_message(&mut self, payload: MessagePayload) {
        if let Err(message) = validation::validate_message(&payload.text) {
            self.emit(GuiEvent::Notice(message));
            return;
        }
        let Some(session) = self.session_for("send message") else {
            return;
        };
        let api = Arc::clone(&self.api);
        let MessagePayload { text, target } = payload;
        match target {
            MessageTarget::Thread(thread_id) => self.spawn(async move {
                Outcome::Sent {
                    open_created: false,
                    notice: "Message could not be sent",
                    result: api
                        .send_message(&session, &text, &thread_id)
                        .await
                        .map(|()| Vec::new()),
                }
            }),
            MessageTarget::NewChat(user_ids) => self.spawn(async move {
                Outcome::Sent {
                    open_created: true,
                    notice: "Message could not be sent",
                    result: api.send_new_chat_message(&session, &text, &user_ids).await,
                }
            }),
        }
    }

    fn upload(&mut self, payload: UploadPayload) {
        let Some(session) = self.session_for("upload") else {
            return;
        };
        let api = Arc::clone(&self.api);
        let UploadPayload {
            file_path,
            recipients,
        } = payload;
        self.spawn(async move {
            Outcome::Sent {
                open_created: recipients.is_new_chat(),
                notice: "Upload failed",
                result: api.upload_file(&session, &file_path, &recipients).await,
            }
        });
    }

    fn search_users(&mut self, query: &str) {
        let Some(query) = validation::normalize_search_query(query) else {
            self.emit(GuiEvent::SearchResult(Vec::new()));
            return;
        };
        let Some(session) = self.session_for("search") else {
            return;
        };
        let api = Arc::clone(&self.api);
        self.spawn(async move { Outcome::SearchResult(api.search_users(&session, &query).await) });
    }

    fn session_for(&self, request: &str) -> Option<Session> {
        let session = self.session.current().cloned();
        if session.is_none() {
            debug!(request, "Ignoring request without a session");
        }
        session
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let tx = self.completion_tx.clone();
        let generation = self.session.generation();
        tokio::spawn(async move {
            let outcome = task.await;
            let _ = tx.send(Completion {
                generation,
                outcome,
            });
        });
    }

    fn emit(&self, event: GuiEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("UI event channel closed");
        }
    }
}
