//! Backend event loop: drains UI actions, then applies completions and timers.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tokio::runtime::Builder;
use tracing::{error, info};

use super::orchestrator::Orchestrator;
use crate::api::MessengerApi;
use crate::config::PollingSettings;
use crate::protocol::{BackendAction, GuiEvent};

/// How long the loop waits for network results before checking the UI again
const ACTION_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the backend event loop on a single-threaded tokio runtime.
///
/// Returns once the UI drops its action sender.
pub fn run_backend(
    api: Arc<dyn MessengerApi>,
    polling: PollingSettings,
    action_rx: Receiver<BackendAction>,
    event_tx: Sender<GuiEvent>,
) {
    let rt = match Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create Tokio runtime: {}", e);
            let _ = event_tx.send(GuiEvent::Error(format!(
                "Failed to create Tokio runtime: {}",
                e
            )));
            return;
        }
    };

    rt.block_on(async move {
        let mut orchestrator = Orchestrator::new(api, &polling, event_tx);
        info!("Backend started");

        loop {
            // Check for actions from the UI (non-blocking)
            loop {
                match action_rx.try_recv() {
                    Ok(action) => orchestrator.handle_action(action),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!("UI closed, stopping backend");
                        return;
                    }
                }
            }

            orchestrator.step(ACTION_POLL_INTERVAL).await;
        }
    });
}
