//! Tracks the single thread being polled and its pagination cursor.

use crate::api::ThreadCursor;

#[derive(Debug, Default)]
pub struct ThreadTracker {
    current: Option<String>,
    cursor: Option<ThreadCursor>,
}

impl ThreadTracker {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_current(&self, thread_id: &str) -> bool {
        self.current.as_deref() == Some(thread_id)
    }

    /// Make `thread_id` the polled thread. Returns true when this switched
    /// away from another thread, in which case its cursor is dropped.
    pub fn open(&mut self, thread_id: &str) -> bool {
        if self.is_current(thread_id) {
            return false;
        }
        let switched = self.current.is_some();
        self.current = Some(thread_id.to_string());
        if self
            .cursor
            .as_ref()
            .is_some_and(|c| c.thread_id != thread_id)
        {
            self.cursor = None;
        }
        switched
    }

    pub fn cursor_for(&self, thread_id: &str) -> Option<&ThreadCursor> {
        self.cursor.as_ref().filter(|c| c.thread_id == thread_id)
    }

    /// Remember how far back `cursor.thread_id` has been paged.
    /// Ignored unless that thread is current.
    pub fn store_cursor(&mut self, cursor: ThreadCursor) -> bool {
        if !self.is_current(&cursor.thread_id) {
            return false;
        }
        self.cursor = Some(cursor);
        true
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.cursor = None;
    }
}
