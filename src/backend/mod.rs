/// Backend submodules for session handling and polling
///
/// This module breaks down the backend into focused components:
/// - `session`: ownership of the authentication session
/// - `scheduler`: interval policy and keyed poll timers
/// - `thread`: the polled thread and its pagination cursor
/// - `orchestrator`: applies UI actions and network results to that state
/// - `main_loop`: the event loop driving the orchestrator
mod main_loop;
mod orchestrator;
mod scheduler;
mod session;
mod thread;

use std::sync::Arc;
use std::thread as std_thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::api::{HttpApi, MessengerApi};
use crate::config::Settings;
use crate::protocol::{BackendAction, GuiEvent};

pub use main_loop::run_backend;
pub use orchestrator::{Completion, Orchestrator};
pub use scheduler::{PollTarget, PollTimers, PollingPolicy};
pub use session::SessionHolder;
pub use thread::ThreadTracker;

/// Start the backend thread with `api` and return the UI ends of its channels.
///
/// If the thread cannot be started, the UI receives a single `GuiEvent::Error`.
pub fn spawn_backend(
    api: Arc<dyn MessengerApi>,
    settings: &Settings,
) -> (Sender<BackendAction>, Receiver<GuiEvent>) {
    let (action_tx, action_rx) = unbounded::<BackendAction>();
    let (event_tx, event_rx) = unbounded::<GuiEvent>();
    let polling = settings.polling.clone();

    let spawned = std_thread::Builder::new()
        .name("igdm-backend".into())
        .spawn(move || run_backend(api, polling, action_rx, event_tx));
    match spawned {
        Ok(_) => (action_tx, event_rx),
        Err(e) => {
            tracing::error!("Failed to spawn backend thread: {}", e);
            unavailable(format!("Cannot start client: {}", e))
        }
    }
}

/// Start the backend against the HTTP API described by `settings`.
///
/// If the client cannot be built, the UI receives a single `GuiEvent::Error`.
pub fn spawn_http_backend(settings: &Settings) -> (Sender<BackendAction>, Receiver<GuiEvent>) {
    match HttpApi::new(&settings.api) {
        Ok(api) => spawn_backend(Arc::new(api), settings),
        Err(e) => {
            tracing::error!("Failed to build API client: {}", e);
            unavailable(format!("Cannot start client: {}", e))
        }
    }
}

/// Channels for a backend that never started: one error, then disconnected.
fn unavailable(message: String) -> (Sender<BackendAction>, Receiver<GuiEvent>) {
    let (action_tx, _action_rx) = unbounded::<BackendAction>();
    let (event_tx, event_rx) = unbounded::<GuiEvent>();
    let _ = event_tx.send(GuiEvent::Error(message));
    (action_tx, event_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_backend_reports_once() {
        let (action_tx, event_rx) = unavailable("Cannot start client: no threads".into());
        assert!(action_tx.send(BackendAction::OpenWindow).is_err());
        assert_eq!(
            event_rx.try_recv(),
            Ok(GuiEvent::Error("Cannot start client: no threads".into()))
        );
        assert!(event_rx.try_recv().is_err());
    }

    #[test]
    fn test_bad_api_url_surfaces_error() {
        let mut settings = Settings::default();
        settings.api.base_url = "not a url".into();
        let (_action_tx, event_rx) = spawn_http_backend(&settings);
        assert!(matches!(event_rx.try_recv(), Ok(GuiEvent::Error(_))));
    }
}
