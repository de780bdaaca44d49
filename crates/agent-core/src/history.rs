//! Conversation History Store
//!
//! Process-lifetime map from user identifier to an ordered sequence of
//! role-tagged messages. Each user's history is capped at the most recent
//! N messages and can be cleared explicitly; there is no TTL, so sessions
//! that never clear grow only up to the cap.
//!
//! Overlapping requests for the same user are last-write-wins; no ordering
//! is promised across concurrent calls for one user.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::message::Message;

/// Default number of retained messages per user
pub const DEFAULT_MAX_MESSAGES: usize = 20;

/// In-memory per-user conversation history
pub struct HistoryStore {
    entries: RwLock<HashMap<String, Vec<Message>>>,
    max_messages: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_MESSAGES)
    }

    /// Create with a custom per-user cap
    pub fn with_capacity(max_messages: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_messages,
        }
    }

    /// Most recent `n` messages for a user, oldest first
    pub fn window(&self, user_id: &str, n: usize) -> Vec<Message> {
        let entries = self.entries.read().unwrap();
        entries
            .get(user_id)
            .map(|msgs| {
                let start = msgs.len().saturating_sub(n);
                msgs[start..].to_vec()
            })
            .unwrap_or_default()
    }

    /// Append a completed user/assistant exchange, enforcing the cap.
    ///
    /// Callers must only invoke this after a successful completion so the
    /// history is never partially appended.
    pub fn append_exchange(&self, user_id: &str, user: Message, assistant: Message) {
        let mut entries = self.entries.write().unwrap();
        let history = entries.entry(user_id.to_string()).or_default();
        history.push(user);
        history.push(assistant);

        if history.len() > self.max_messages {
            let excess = history.len() - self.max_messages;
            history.drain(..excess);
        }
    }

    /// Remove all history for a user
    pub fn clear(&self, user_id: &str) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(user_id);
    }

    /// Message count for a user
    pub fn len(&self, user_id: &str) -> usize {
        let entries = self.entries.read().unwrap();
        entries.get(user_id).map_or(0, Vec::len)
    }

    /// Whether a user has any history
    pub fn is_empty(&self, user_id: &str) -> bool {
        self.len(user_id) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_window() {
        let store = HistoryStore::new();
        store.append_exchange("u1", Message::user("hi"), Message::assistant("hello"));

        assert_eq!(store.len("u1"), 2);
        assert_eq!(store.len("u2"), 0);

        let window = store.window("u1", 10);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "hi");
        assert_eq!(window[1].content, "hello");
    }

    #[test]
    fn test_cap_drops_oldest() {
        let store = HistoryStore::with_capacity(4);
        for i in 0..4 {
            store.append_exchange(
                "u1",
                Message::user(format!("q{}", i)),
                Message::assistant(format!("a{}", i)),
            );
        }

        assert_eq!(store.len("u1"), 4);
        let window = store.window("u1", 4);
        // Only the two most recent exchanges survive
        assert_eq!(window[0].content, "q2");
        assert_eq!(window[3].content, "a3");
    }

    #[test]
    fn test_window_smaller_than_history() {
        let store = HistoryStore::new();
        for i in 0..3 {
            store.append_exchange(
                "u1",
                Message::user(format!("q{}", i)),
                Message::assistant(format!("a{}", i)),
            );
        }

        let window = store.window("u1", 2);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "q2");
        assert_eq!(window[1].content, "a2");
    }

    #[test]
    fn test_clear() {
        let store = HistoryStore::new();
        store.append_exchange("u1", Message::user("hi"), Message::assistant("hello"));
        store.clear("u1");
        assert!(store.is_empty("u1"));
    }
}
