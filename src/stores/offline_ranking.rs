use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use hashbrown::HashMap;
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::io::{read_snapshot, ItemId, SnapshotStats, UserId};

#[derive(Debug, Deserialize)]
struct PersonalRecord {
    user_id: UserId,
    #[serde(alias = "track_id")]
    item_id: ItemId,
    rank: u64,
}

#[derive(Debug, Deserialize)]
struct FallbackRecord {
    #[serde(alias = "track_id")]
    item_id: ItemId,
}

/// How many offline requests were answered from a personalized list and how
/// many from the fallback list.
#[derive(PartialEq, Debug)]
pub struct OfflineRequestStats {
    pub qty_personal: usize,
    pub qty_fallback: usize,
}

/// Precomputed ranked lists: one per user, plus a global fallback for users
/// without one.
pub struct OfflineRankingStore {
    personal: HashMap<UserId, Vec<ItemId>>,
    fallback: Vec<ItemId>,
    personal_stats: SnapshotStats,
    fallback_stats: SnapshotStats,
    qty_personal_requests: AtomicUsize,
    qty_fallback_requests: AtomicUsize,
}

impl OfflineRankingStore {
    /// Builds a store from lists that are already in ranked order. Unlike
    /// [`OfflineRankingStore::load`] this accepts an empty fallback.
    pub fn new(personal: HashMap<UserId, Vec<ItemId>>, fallback: Vec<ItemId>) -> Self {
        let personal_stats = SnapshotStats::in_memory(
            personal.values().map(|items| items.len()).sum(),
            personal.len(),
        );
        let fallback_stats = SnapshotStats::in_memory(fallback.len(), fallback.len());
        OfflineRankingStore {
            personal,
            fallback,
            personal_stats,
            fallback_stats,
            qty_personal_requests: AtomicUsize::new(0),
            qty_fallback_requests: AtomicUsize::new(0),
        }
    }

    /// Loads `user_id,item_id,rank` personalized rows and `item_id` fallback
    /// rows. Personalized lists are ordered by ascending rank, ties in file
    /// order; the fallback keeps file order and must not be empty.
    pub fn load(personal_path: &str, fallback_path: &str) -> Result<Self, LoadError> {
        let start_time = Instant::now();
        info!(path = personal_path, "loading personal recommendations");
        let personal_records: Vec<PersonalRecord> = read_snapshot(personal_path)?;
        let qty_personal_records = personal_records.len();
        let personal: HashMap<UserId, Vec<ItemId>> = personal_records
            .into_iter()
            .map(|record| (record.user_id, (record.rank, record.item_id)))
            .into_group_map()
            .into_iter()
            .map(|(user_id, mut ranked_items)| {
                ranked_items.sort_by_key(|(rank, _)| *rank);
                let items = ranked_items.into_iter().map(|(_, item_id)| item_id).collect();
                (user_id, items)
            })
            .collect();
        let personal_stats = SnapshotStats::new(
            personal_path,
            qty_personal_records,
            personal.len(),
            start_time.elapsed(),
        );
        info!(
            qty_records = qty_personal_records,
            qty_users = personal.len(),
            micros = personal_stats.load_duration.as_micros() as u64,
            "loaded personal recommendations"
        );

        let start_time = Instant::now();
        info!(path = fallback_path, "loading fallback recommendations");
        let fallback: Vec<ItemId> = read_snapshot::<FallbackRecord>(fallback_path)?
            .into_iter()
            .map(|record| record.item_id)
            .collect();
        if fallback.is_empty() {
            return Err(LoadError::EmptyFallback {
                path: fallback_path.to_string(),
            });
        }
        let fallback_stats = SnapshotStats::new(
            fallback_path,
            fallback.len(),
            fallback.iter().unique().count(),
            start_time.elapsed(),
        );
        info!(
            qty_records = fallback.len(),
            micros = fallback_stats.load_duration.as_micros() as u64,
            "loaded fallback recommendations"
        );

        Ok(OfflineRankingStore {
            personal,
            fallback,
            personal_stats,
            fallback_stats,
            qty_personal_requests: AtomicUsize::new(0),
            qty_fallback_requests: AtomicUsize::new(0),
        })
    }

    /// Up to `k` offline recommendations for `user_id`, from the personalized
    /// list if there is one and from the fallback list otherwise.
    pub fn get(&self, user_id: UserId, k: usize) -> &[ItemId] {
        let recs = match self.personal.get(&user_id) {
            Some(recs) => {
                self.qty_personal_requests.fetch_add(1, Ordering::Relaxed);
                recs
            }
            None => {
                debug!(user_id, "no personal recommendations, using fallback");
                self.qty_fallback_requests.fetch_add(1, Ordering::Relaxed);
                &self.fallback
            }
        };
        &recs[..k.min(recs.len())]
    }

    pub fn stats(&self) -> OfflineRequestStats {
        OfflineRequestStats {
            qty_personal: self.qty_personal_requests.load(Ordering::Relaxed),
            qty_fallback: self.qty_fallback_requests.load(Ordering::Relaxed),
        }
    }

    pub fn personal_stats(&self) -> &SnapshotStats {
        &self.personal_stats
    }

    pub fn fallback_stats(&self) -> &SnapshotStats {
        &self.fallback_stats
    }
}
