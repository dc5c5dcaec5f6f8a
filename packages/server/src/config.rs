//! Chat server tuning knobs.

use crate::domain::history::DEFAULT_HISTORY_CAPACITY;

/// Default number of history entries replayed to a newly joined client
pub const DEFAULT_REPLAY_LIMIT: usize = 50;

/// Settings for the session registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatConfig {
    /// Maximum number of chat messages kept in history
    pub history_capacity: usize,
    /// Maximum number of history entries replayed on join
    pub replay_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            replay_limit: DEFAULT_REPLAY_LIMIT,
        }
    }
}
