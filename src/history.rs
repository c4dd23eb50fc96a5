//! Seen-post history
//!
//! Bounded FIFO of post ids already shown to this browser, persisted so the
//! void doesn't repeat itself right after a reload.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::SEEN_POSTS_HISTORY_LENGTH;
use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::store::PostId;

/// Recently retrieved post ids, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeenPostHistory {
    ids: VecDeque<PostId>,
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    SEEN_POSTS_HISTORY_LENGTH
}

impl Default for SeenPostHistory {
    fn default() -> Self {
        Self::with_capacity(SEEN_POSTS_HISTORY_LENGTH)
    }
}

impl SeenPostHistory {
    /// Storage key
    const STORAGE_KEY: &'static str = "void_seen_posts";

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn contains(&self, id: &PostId) -> bool {
        self.ids.contains(id)
    }

    /// Record `id` as the newest entry, evicting the oldest past capacity
    ///
    /// An id already present moves to the newest end instead of duplicating.
    pub fn remember(&mut self, id: PostId) {
        if let Some(pos) = self.ids.iter().position(|seen| *seen == id) {
            self.ids.remove(pos);
        }
        self.ids.push_back(id);
        while self.ids.len() > self.capacity {
            self.ids.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &PostId> {
        self.ids.iter()
    }

    /// Load from client storage (empty if missing or unreadable)
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        match load_json::<SeenPostHistory>(kv, Self::STORAGE_KEY) {
            Some(mut history) => {
                while history.ids.len() > history.capacity {
                    history.ids.pop_front();
                }
                log::info!("Loaded {} seen post ids", history.len());
                history
            }
            None => Self::default(),
        }
    }

    pub fn save(&self, kv: &dyn KeyValueStore) {
        save_json(kv, Self::STORAGE_KEY, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryKv;

    fn id(s: &str) -> PostId {
        PostId::new(s)
    }

    #[test]
    fn test_fifo_eviction() {
        let mut history = SeenPostHistory::with_capacity(3);
        for s in ["a", "b", "c", "d"] {
            history.remember(id(s));
        }
        assert_eq!(history.len(), 3);
        assert!(!history.contains(&id("a")));
        assert!(history.contains(&id("d")));
    }

    #[test]
    fn test_remember_existing_moves_to_newest() {
        let mut history = SeenPostHistory::with_capacity(3);
        for s in ["a", "b", "c"] {
            history.remember(id(s));
        }
        history.remember(id("a"));
        history.remember(id("d"));
        assert_eq!(history.len(), 3);
        let order: Vec<&str> = history.iter().map(|p| p.as_str()).collect();
        assert_eq!(order, ["c", "a", "d"]);
    }

    #[test]
    fn test_persists_across_loads() {
        let kv = MemoryKv::new();
        let mut history = SeenPostHistory::default();
        history.remember(id("x1"));
        history.remember(id("x2"));
        history.save(&kv);

        let loaded = SeenPostHistory::load(&kv);
        assert_eq!(loaded, history);
        assert_eq!(loaded.capacity(), SEEN_POSTS_HISTORY_LENGTH);
    }

    #[test]
    fn test_missing_entry_loads_empty() {
        let kv = MemoryKv::new();
        assert!(SeenPostHistory::load(&kv).is_empty());
    }
}
