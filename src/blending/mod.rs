use std::cmp::Ordering;
use std::sync::Arc;

use hashbrown::HashSet;
use rayon::prelude::*;

use crate::io::{ItemId, UserId};
use crate::stores::events::RecentEventStore;
use crate::stores::offline_ranking::OfflineRankingStore;
use crate::stores::similarity_index::{ScoredItem, SimilarityIndex};

/// Number of most recent events that seed the online recommendations.
pub const RECENT_EVENTS_WINDOW: usize = 3;
/// Neighbors fetched per recent event, as a multiple of `k`, so that enough
/// candidates survive deduplication.
pub const NEIGHBOR_HEADROOM_FACTOR: usize = 2;

/// Merges session based (online) and precomputed (offline) recommendations.
pub struct BlendingEngine {
    events: Arc<RecentEventStore>,
    similarity_index: Arc<SimilarityIndex>,
    offline_rankings: Arc<OfflineRankingStore>,
}

impl BlendingEngine {
    pub fn new(
        events: Arc<RecentEventStore>,
        similarity_index: Arc<SimilarityIndex>,
        offline_rankings: Arc<OfflineRankingStore>,
    ) -> Self {
        BlendingEngine {
            events,
            similarity_index,
            offline_rankings,
        }
    }

    pub fn events(&self) -> &RecentEventStore {
        &self.events
    }

    pub fn similarity_index(&self) -> &SimilarityIndex {
        &self.similarity_index
    }

    pub fn offline_rankings(&self) -> &OfflineRankingStore {
        &self.offline_rankings
    }

    /// Up to `k` items similar to what `user_id` interacted with most recently,
    /// best score first. Empty when the user has no history.
    pub fn derive_online(&self, user_id: UserId, k: usize) -> Vec<ItemId> {
        let recent_items = self.events.history(user_id, RECENT_EVENTS_WINDOW);
        if recent_items.is_empty() {
            return Vec::new();
        }

        // The collected pool keeps history order, so neighbors of the most
        // recent event come first.
        let mut pool: Vec<ScoredItem> = recent_items
            .par_iter()
            .map(|item_id| {
                self.similarity_index
                    .neighbors(*item_id, k.saturating_mul(NEIGHBOR_HEADROOM_FACTOR))
                    .to_vec()
            })
            .collect::<Vec<_>>()
            .concat();

        // Stable, ties keep their pool order.
        pool.sort_by(by_score_descending);

        let mut recs = dedup_ids(pool.iter().map(|scored| scored.id));
        recs.truncate(k);
        recs
    }

    pub fn derive_offline(&self, user_id: UserId, k: usize) -> Vec<ItemId> {
        self.offline_rankings.get(user_id, k).to_vec()
    }

    /// Interleaves online and offline recommendations for `user_id` and returns
    /// at most `k` distinct items.
    pub fn blend(&self, user_id: UserId, k: usize) -> Vec<ItemId> {
        let (offline, online) = rayon::join(
            || self.derive_offline(user_id, k),
            || self.derive_online(user_id, k),
        );

        let mut blended = dedup_ids(interleave(&online, &offline).into_iter());
        blended.truncate(k);
        blended
    }
}

fn by_score_descending(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Positional merge of two candidate lists. Over their common length, even
/// positions take the online item at that position and odd positions the
/// offline item at that position. The remainder of the longer list follows in
/// its own order.
pub fn interleave(online: &[ItemId], offline: &[ItemId]) -> Vec<ItemId> {
    let common_length = online.len().min(offline.len());
    let mut merged = Vec::with_capacity(online.len().max(offline.len()));

    for position in 0..common_length {
        if position % 2 == 0 {
            merged.push(online[position]);
        } else {
            merged.push(offline[position]);
        }
    }

    if offline.len() > common_length {
        merged.extend_from_slice(&offline[common_length..]);
    } else if online.len() > common_length {
        merged.extend_from_slice(&online[common_length..]);
    }

    merged
}

/// Keeps the first occurrence of every id, preserving order.
pub fn dedup_ids<I>(ids: I) -> Vec<ItemId>
where
    I: Iterator<Item = ItemId>,
{
    let mut seen: HashSet<ItemId> = HashSet::new();
    ids.filter(|item_id| seen.insert(*item_id)).collect()
}
