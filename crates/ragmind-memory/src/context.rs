//! In-process short-term conversation buffer.

use parking_lot::Mutex;
use ragmind_core::Turn;
use std::collections::{HashMap, VecDeque};

/// Recent turns per user, capped at a fixed number of entries.
///
/// Only the most recent `limit` turns survive; older ones are dropped as new
/// exchanges arrive. Nothing here is persisted.
#[derive(Debug)]
pub struct ShortTermContext {
    limit: usize,
    turns: Mutex<HashMap<String, VecDeque<Turn>>>,
}

impl ShortTermContext {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            turns: Mutex::new(HashMap::new()),
        }
    }

    /// Maximum turns kept per user.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Append a user turn followed by an agent turn, trimming to the limit.
    pub fn push_exchange(&self, user_id: &str, user_msg: &str, agent_msg: &str) {
        let mut turns = self.turns.lock();
        let buffer = turns.entry(user_id.to_string()).or_default();
        buffer.push_back(Turn::user(user_msg));
        buffer.push_back(Turn::agent(agent_msg));
        while buffer.len() > self.limit {
            buffer.pop_front();
        }
    }

    /// The last `window` turns rendered one per line, or an empty string.
    pub fn render(&self, user_id: &str, window: usize) -> String {
        let turns = self.turns.lock();
        let Some(buffer) = turns.get(user_id) else {
            return String::new();
        };
        let skip = buffer.len().saturating_sub(window);
        buffer
            .iter()
            .skip(skip)
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Snapshot of every buffered turn for a user, oldest first.
    pub fn turns(&self, user_id: &str) -> Vec<Turn> {
        self.turns
            .lock()
            .get(user_id)
            .map(|buffer| buffer.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of buffered turns for a user.
    pub fn len(&self, user_id: &str) -> usize {
        self.turns.lock().get(user_id).map_or(0, VecDeque::len)
    }

    /// Whether a user has no buffered turns.
    pub fn is_empty(&self, user_id: &str) -> bool {
        self.len(user_id) == 0
    }

    /// Drop a user's buffer.
    pub fn clear(&self, user_id: &str) {
        self.turns.lock().remove(user_id);
    }
}
