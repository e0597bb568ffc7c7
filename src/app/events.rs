//! Event processing from backend

use super::IgdmApp;
use crate::events;

impl IgdmApp {
    /// Drain every pending backend event and send the follow-up actions.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            let actions = events::process_single_event(&mut self.state, event);
            self.send_all(actions);
        }
    }

    /// Report a focus change to the backend when it differs from the last one seen.
    pub fn set_focused(&mut self, focused: bool) {
        if self.state.focused == focused {
            return;
        }
        self.state.focused = focused;
        self.send(if focused {
            crate::protocol::BackendAction::WindowFocused
        } else {
            crate::protocol::BackendAction::WindowBlurred
        });
    }
}
