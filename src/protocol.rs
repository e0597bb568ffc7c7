use std::path::PathBuf;

use crate::api::{ChatSummary, Message, ReadMarker, Recipients, Thread, User};

/// Which screen the window shows after it is (re)created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Chats,
}

/// Target of an outgoing text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    /// An existing thread
    Thread(String),
    /// A new conversation with these user ids
    NewChat(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload {
    pub text: String,
    pub target: MessageTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file_path: PathBuf,
    pub recipients: Recipients,
}

/// Actions sent from the UI to the Backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendAction {
    /// The window was created; check the session and pick a view
    OpenWindow,
    Login { username: String, password: String },
    Logout,
    GetLoggedInUser,
    /// Start (or restart) polling the chat list
    GetChatList,
    /// Open a thread and poll it, replacing any other polled thread
    GetChat(String),
    /// Stop polling the open thread; the user is writing to someone new
    CloseChat,
    GetOlderMessages(String),
    SendMessage(MessagePayload),
    Upload(UploadPayload),
    SearchUsers(String),
    MarkAsRead(ReadMarker),
    IncreaseBadgeCount,
    GetUnfollowers,
    Unfollow(String),
    WindowFocused,
    WindowBlurred,
}

/// Events sent from the Backend to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum GuiEvent {
    /// The window was (re)created and should show this view from a clean state
    ShowView(View),
    LoginError(String),
    LoggedInUser(User),
    ChatList(Vec<ChatSummary>),
    Chat(Thread),
    /// A page of older messages. Empty once the history is exhausted.
    OlderMessages(Vec<Message>),
    /// An older page could not be loaded; the history may still go further back
    OlderMessagesFailed(String),
    SearchResult(Vec<User>),
    Unfollowers(Vec<User>),
    /// Current value of the unread badge
    BadgeCount(u32),
    /// A fire-and-forget request failed
    Notice(String),
    /// The backend could not start
    Error(String),
}
