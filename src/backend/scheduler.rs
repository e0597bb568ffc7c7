//! Poll timing: the two-level interval policy and the keyed timer set.

use std::collections::HashMap;
use std::future::poll_fn;
use std::time::Duration;

use tokio_util::time::delay_queue::Key;
use tokio_util::time::DelayQueue;

use crate::config::PollingSettings;

/// What a poll timer refetches when it fires
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PollTarget {
    ChatList,
    Thread(String),
}

/// Chooses the delay before the next poll.
#[derive(Debug, Clone)]
pub struct PollingPolicy {
    active: Duration,
    idle: Duration,
    backoff: Duration,
    current: Duration,
}

impl PollingPolicy {
    pub fn new(settings: &PollingSettings) -> Self {
        Self {
            active: settings.active(),
            idle: settings.idle(),
            backoff: settings.backoff(),
            current: settings.active(),
        }
    }

    /// Delay after a successful poll
    pub fn interval(&self) -> Duration {
        self.current
    }

    /// Delay after a failed poll
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    pub fn focus_gained(&mut self) {
        self.current = self.active;
    }

    pub fn focus_lost(&mut self) {
        self.current = self.idle;
    }
}

#[derive(Debug)]
struct Armed {
    key: Key,
    delay: Duration,
}

/// At most one pending timer per target.
#[derive(Debug, Default)]
pub struct PollTimers {
    queue: DelayQueue<PollTarget>,
    armed: HashMap<PollTarget, Armed>,
}

impl PollTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `target` to fire after `delay`, replacing any pending timer for it.
    pub fn arm(&mut self, target: PollTarget, delay: Duration) {
        self.cancel(&target);
        let key = self.queue.insert(target.clone(), delay);
        self.armed.insert(target, Armed { key, delay });
    }

    pub fn cancel(&mut self, target: &PollTarget) -> bool {
        match self.armed.remove(target) {
            Some(armed) => {
                self.queue.remove(&armed.key);
                true
            }
            None => false,
        }
    }

    /// Drop every pending per-thread timer.
    pub fn cancel_threads(&mut self) {
        let threads: Vec<PollTarget> = self
            .armed
            .keys()
            .filter(|t| matches!(t, PollTarget::Thread(_)))
            .cloned()
            .collect();
        for target in threads {
            self.cancel(&target);
        }
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
        self.armed.clear();
    }

    /// Delay the pending timer for `target` was armed with
    pub fn armed_delay(&self, target: &PollTarget) -> Option<Duration> {
        self.armed.get(target).map(|a| a.delay)
    }

    pub fn is_armed(&self, target: &PollTarget) -> bool {
        self.armed.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    /// Wait for the next timer to fire. Yields `None` right away when nothing is armed.
    pub async fn next_expired(&mut self) -> Option<PollTarget> {
        let expired = poll_fn(|cx| self.queue.poll_expired(cx)).await?;
        let target = expired.into_inner();
        self.armed.remove(&target);
        Some(target)
    }
}
