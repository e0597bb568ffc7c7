//! Integration tests for igdm-client
//!
//! These tests run the real backend thread against an in-memory API and drive
//! it through the app's channels, the same way the window does.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;

use crate::api::TWO_FACTOR_MESSAGE;
use crate::app::IgdmApp;
use crate::backend::{run_backend, spawn_backend};
use crate::backend_tests::{user, FakeApi, LoginOutcome};
use crate::config::{PollingSettings, Settings};
use crate::protocol::{BackendAction, MessagePayload, MessageTarget};
use crate::state::{ClientState, Screen};

fn start_app(api: &Arc<FakeApi>, settings: Settings) -> IgdmApp {
    let (action_tx, event_rx) = spawn_backend(api.clone(), &settings);
    IgdmApp::with_backend(settings, action_tx, event_rx)
}

/// Process events until `done` holds, failing after a few seconds.
fn pump_until(app: &mut IgdmApp, what: &str, done: impl Fn(&ClientState) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        app.process_events();
        if done(&app.state) {
            return;
        }
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(10));
    }
}

fn login(app: &mut IgdmApp, username: &str) {
    pump_until(app, "login screen", |s| s.screen == Screen::Login);
    app.state.login.username = username.to_string();
    app.state.login.password = "hunter2".to_string();
    let action = app.state.submit_login();
    app.action_tx.send(action).unwrap();
}

#[test]
fn test_login_lands_on_inbox() {
    let api = Arc::new(FakeApi::default());
    let mut app = start_app(&api, Settings::default());
    assert_eq!(app.state.screen, Screen::Loading);

    login(&mut app, "alice");
    pump_until(&mut app, "inbox", |s| {
        s.screen == Screen::Chats && s.user.is_some() && s.chats.len() == 2
    });

    assert_eq!(app.state.user, Some(user("1")));
    assert!(app.state.login.password.is_empty());
    assert_eq!(api.calls_to("check_auth"), 1);
}

#[test]
fn test_two_factor_login_shows_form_error() {
    let api = Arc::new(FakeApi::default());
    *api.login_outcome.lock().unwrap() = LoginOutcome::TwoFactor;
    let mut app = start_app(&api, Settings::default());

    login(&mut app, "alice");
    pump_until(&mut app, "login error", |s| s.login.error.is_some());

    assert_eq!(app.state.login.error.as_deref(), Some(TWO_FACTOR_MESSAGE));
    assert!(!app.state.login.pending);
    assert_eq!(app.state.screen, Screen::Login);
}

#[test]
fn test_open_thread_and_page_back() {
    let api = Arc::new(FakeApi::default());
    let mut app = start_app(&api, Settings::default());
    login(&mut app, "alice");
    pump_until(&mut app, "inbox", |s| s.chats.len() == 2);

    for action in app.state.select_thread("a") {
        app.action_tx.send(action).unwrap();
    }
    pump_until(&mut app, "thread", |s| s.thread.is_some());
    assert!(app.state.has_older);

    let older = app.state.request_older().unwrap();
    app.action_tx.send(older).unwrap();
    pump_until(&mut app, "older page", |s| !s.loading_older);

    let ids: Vec<_> = app
        .state
        .thread
        .as_ref()
        .unwrap()
        .messages
        .iter()
        .map(|m| m.id.clone())
        .collect();
    assert_eq!(ids, vec!["m2", "m3"]);
}

#[test]
fn test_message_to_new_chat_opens_it() {
    let api = Arc::new(FakeApi::default());
    let mut app = start_app(&api, Settings::default());
    login(&mut app, "alice");
    pump_until(&mut app, "inbox", |s| s.chats.len() == 2);

    assert!(app.state.start_new_chat(user("9")).is_empty());
    app.state.compose_text = "hello there".into();
    let action = app.state.compose_message().unwrap();
    app.action_tx.send(action).unwrap();

    pump_until(&mut app, "created thread", |s| {
        s.active_thread.as_deref() == Some("created") && s.thread.is_some()
    });
    assert!(app.state.new_chat.is_empty());
    assert_eq!(api.calls_to("send_new_chat_message"), 1);
}

#[test]
fn test_new_chat_from_open_thread_survives_polling() {
    let api = Arc::new(FakeApi::default());
    let settings = Settings {
        polling: PollingSettings {
            active_secs: 1,
            ..PollingSettings::default()
        },
        ..Settings::default()
    };
    let mut app = start_app(&api, settings);
    login(&mut app, "alice");
    pump_until(&mut app, "inbox", |s| s.chats.len() == 2);

    for action in app.state.select_thread("a") {
        app.action_tx.send(action).unwrap();
    }
    pump_until(&mut app, "thread", |s| s.thread.is_some());

    for action in app.state.start_new_chat(user("9")) {
        app.action_tx.send(action).unwrap();
    }
    thread::sleep(Duration::from_millis(100));
    let polls = api.calls_to("get_chat");
    thread::sleep(Duration::from_millis(1500));
    app.process_events();

    assert!(app.state.active_thread.is_none());
    assert_eq!(app.state.new_chat, vec![user("9")]);
    assert_eq!(api.calls_to("get_chat"), polls);

    app.state.compose_text = "hi user9".into();
    assert_eq!(
        app.state.compose_message(),
        Some(BackendAction::SendMessage(MessagePayload {
            text: "hi user9".into(),
            target: MessageTarget::NewChat(vec!["9".into()]),
        }))
    );
}

#[test]
fn test_logout_returns_to_login_with_username() {
    let api = Arc::new(FakeApi::default());
    let mut app = start_app(&api, Settings::default());
    login(&mut app, "alice");
    pump_until(&mut app, "inbox", |s| s.chats.len() == 2);

    app.action_tx.send(BackendAction::Logout).unwrap();
    pump_until(&mut app, "login screen", |s| s.screen == Screen::Login);

    assert_eq!(app.state.login.username, "alice");
    assert!(app.state.chats.is_empty());
    assert!(app.state.user.is_none());
}

#[test]
fn test_blurred_window_counts_new_unread_threads() {
    let api = Arc::new(FakeApi::default());
    let mut app = start_app(&api, Settings::default());
    login(&mut app, "alice");
    pump_until(&mut app, "inbox", |s| s.chats.len() == 2);

    app.set_focused(false);
    api.unread_inbox.store(true, Ordering::SeqCst);
    app.action_tx.send(BackendAction::GetChatList).unwrap();
    pump_until(&mut app, "badge", |s| s.badge == 2);
    assert!(app.state.window_title().starts_with("(2) "));

    app.set_focused(true);
    pump_until(&mut app, "badge cleared", |s| s.badge == 0);
}

#[test]
fn test_remembers_last_username() {
    let api = Arc::new(FakeApi::default());
    let settings = Settings {
        last_username: "bob".into(),
        ..Settings::default()
    };
    let mut app = start_app(&api, settings);
    assert_eq!(app.state.login.username, "bob");

    login(&mut app, "alice");
    pump_until(&mut app, "user", |s| s.user.is_some());
    assert_eq!(app.current_settings().last_username, "user1");
}

#[test]
fn test_backend_stops_when_ui_goes_away() {
    let api = Arc::new(FakeApi::default());
    let (action_tx, action_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();

    let handle = thread::spawn(move || {
        run_backend(api, PollingSettings::default(), action_rx, event_tx)
    });
    action_tx.send(BackendAction::OpenWindow).unwrap();
    assert!(event_rx.recv_timeout(Duration::from_secs(5)).is_ok());

    drop(action_tx);
    handle.join().unwrap();
}
