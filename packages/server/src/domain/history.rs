//! Bounded chat message history.

use std::collections::VecDeque;

use super::entity::ChatMessage;

/// Default number of messages kept in history
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Insertion-ordered log of the most recent chat messages.
///
/// Holds at most `capacity` entries; appending beyond that evicts the oldest.
#[derive(Debug, Clone)]
pub struct MessageHistory {
    entries: VecDeque<ChatMessage>,
    capacity: usize,
}

impl MessageHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    /// Append a message, evicting the oldest entries beyond capacity
    pub fn push(&mut self, message: ChatMessage) {
        self.entries.push_back(message);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// The last `limit` messages in append order
    pub fn recent(&self, limit: usize) -> Vec<ChatMessage> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
