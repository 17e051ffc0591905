use std::collections::VecDeque;

use dashmap::DashMap;

use crate::io::{ItemId, UserId};

pub const DEFAULT_MAX_EVENTS_PER_USER: usize = 10;

/// Per user history of interacted items, most recent first.
///
/// The map is sharded, so writers for different users do not contend on a
/// single lock. Reads for a user racing a write for that same user see either
/// the old or the new sequence.
pub struct RecentEventStore {
    events: DashMap<UserId, VecDeque<ItemId>>,
    max_events_per_user: usize,
}

impl Default for RecentEventStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS_PER_USER)
    }
}

impl RecentEventStore {
    pub fn new(max_events_per_user: usize) -> Self {
        RecentEventStore {
            events: DashMap::new(),
            max_events_per_user,
        }
    }

    /// Prepends `item_id` to the history of `user_id`, dropping the oldest
    /// entries beyond capacity. Repeated items are kept.
    pub fn record(&self, user_id: UserId, item_id: ItemId) {
        let mut user_events = self
            .events
            .entry(user_id)
            .or_insert_with(|| VecDeque::with_capacity(self.max_events_per_user));
        user_events.push_front(item_id);
        user_events.truncate(self.max_events_per_user);
    }

    /// Returns at most `n` of the most recent items for `user_id`.
    pub fn history(&self, user_id: UserId, n: usize) -> Vec<ItemId> {
        match self.events.get(&user_id) {
            Some(user_events) => user_events.iter().take(n).copied().collect(),
            None => Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_events_per_user
    }

    pub fn qty_users(&self) -> usize {
        self.events.len()
    }
}
