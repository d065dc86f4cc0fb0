//! In-process change feed.
//!
//! Stands in for a hosted store's realtime channel: subscribers register for
//! one user's row-level changes and receive typed insert/update/delete
//! events. Delivery is push-based and eventually consistent — arrival order
//! only; consumers apply each event idempotently keyed by row id.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use crate::types::events::ChangeEvent;

/// Fan-out of change events to per-user subscribers.
pub struct ChangeFeed {
    subscribers: Mutex<Vec<(String, Sender<ChangeEvent>)>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a subscription filtered by owning user. The returned
    /// receiver yields events until the feed drops the sender (on publish
    /// failure, i.e. the receiver side went away).
    pub fn subscribe(&self, user_id: &str) -> Receiver<ChangeEvent> {
        let (tx, rx) = channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push((user_id.to_string(), tx));
        }
        rx
    }

    /// Delivers an event to every live subscriber of the event's user.
    /// Disconnected subscribers are pruned.
    pub fn publish(&self, event: &ChangeEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|(user, tx)| {
                if user != &event.user_id {
                    return true;
                }
                tx.send(event.clone()).is_ok()
            });
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
