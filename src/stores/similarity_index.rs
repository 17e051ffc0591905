use std::time::Instant;

use hashbrown::HashMap;
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::io::{read_snapshot, ItemId, Score, SnapshotStats};

#[derive(PartialEq, Clone, Copy, Debug)]
pub struct ScoredItem {
    pub id: ItemId,
    pub score: Score,
}

impl ScoredItem {
    pub fn new(id: ItemId, score: Score) -> Self {
        ScoredItem { id, score }
    }
}

#[derive(Debug, Deserialize)]
struct SimilarityRecord {
    #[serde(alias = "track_id_enc_1", alias = "track_id_1")]
    item_id: ItemId,
    #[serde(alias = "track_id_enc_2", alias = "track_id_2")]
    similar_item_id: ItemId,
    score: Score,
}

/// Precomputed item to item neighbors. Immutable once built.
pub struct SimilarityIndex {
    item_to_neighbors: HashMap<ItemId, Vec<ScoredItem>>,
    stats: SnapshotStats,
}

impl SimilarityIndex {
    /// Loads `item_id,similar_item_id,score` triples. The neighbors of each item
    /// keep the order in which they appear in the snapshot.
    pub fn load(path: &str) -> Result<Self, LoadError> {
        let start_time = Instant::now();
        info!(path, "loading similar items");
        let records: Vec<SimilarityRecord> = read_snapshot(path)?;
        let qty_records = records.len();
        if let Some(record) = records.iter().find(|record| !record.score.is_finite()) {
            return Err(LoadError::NonFiniteScore {
                path: path.to_string(),
                item_id: record.item_id,
                similar_item_id: record.similar_item_id,
            });
        }

        let item_to_neighbors = index_by_item(
            records
                .into_iter()
                .map(|record| (record.item_id, record.similar_item_id, record.score)),
        );
        let stats = SnapshotStats::new(
            path,
            qty_records,
            item_to_neighbors.len(),
            start_time.elapsed(),
        );
        info!(
            qty_records,
            qty_items = stats.qty_unique_keys,
            micros = stats.load_duration.as_micros() as u64,
            "loaded similar items"
        );

        Ok(SimilarityIndex {
            item_to_neighbors,
            stats,
        })
    }

    pub fn from_triples<I>(triples: I) -> Self
    where
        I: IntoIterator<Item = (ItemId, ItemId, Score)>,
    {
        let triples: Vec<_> = triples.into_iter().collect();
        let qty_records = triples.len();
        let item_to_neighbors = index_by_item(triples.into_iter());
        let stats = SnapshotStats::in_memory(qty_records, item_to_neighbors.len());
        SimilarityIndex {
            item_to_neighbors,
            stats,
        }
    }

    /// Up to `k` neighbors of `item_id` in precomputed order. Unknown items have
    /// no neighbors.
    pub fn neighbors(&self, item_id: ItemId, k: usize) -> &[ScoredItem] {
        match self.item_to_neighbors.get(&item_id) {
            Some(neighbors) => &neighbors[..k.min(neighbors.len())],
            None => {
                debug!(item_id, "no similar items found");
                &[]
            }
        }
    }

    pub fn stats(&self) -> &SnapshotStats {
        &self.stats
    }
}

fn index_by_item<I>(triples: I) -> HashMap<ItemId, Vec<ScoredItem>>
where
    I: Iterator<Item = (ItemId, ItemId, Score)>,
{
    triples
        .map(|(item_id, similar_item_id, score)| {
            (item_id, ScoredItem::new(similar_item_id, score))
        })
        .into_group_map()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod similarity_index_test {
    use float_cmp::approx_eq;

    use crate::io::test_files::write_snapshot;

    use super::*;

    fn small_index() -> SimilarityIndex {
        SimilarityIndex::from_triples(vec![
            (1, 11, 0.9),
            (1, 12, 0.7),
            (2, 21, 0.8),
            (1, 13, 0.2),
        ])
    }

    #[test]
    fn should_return_neighbors_in_snapshot_order() {
        let index = small_index();
        let neighbor_ids: Vec<ItemId> = index.neighbors(1, 10).iter().map(|n| n.id).collect();
        assert_eq!(vec![11, 12, 13], neighbor_ids);
        assert_eq!(2, index.stats().qty_unique_keys);
    }

    #[test]
    fn should_cap_neighbors_at_k() {
        let index = small_index();
        let neighbors = index.neighbors(1, 2);
        assert_eq!(2, neighbors.len());
        assert_eq!(11, neighbors[0].id);
        assert!(approx_eq!(f64, 0.7, neighbors[1].score, ulps = 2));
        assert!(index.neighbors(1, 0).is_empty());
    }

    #[test]
    fn should_return_nothing_for_unknown_item() {
        let index = small_index();
        assert!(index.neighbors(404, 10).is_empty());
    }

    #[test]
    fn should_not_resort_snapshot_order() {
        let index = SimilarityIndex::from_triples(vec![(5, 50, 0.1), (5, 51, 0.9)]);
        let neighbor_ids: Vec<ItemId> = index.neighbors(5, 2).iter().map(|n| n.id).collect();
        assert_eq!(vec![50, 51], neighbor_ids);
    }

    #[test]
    fn should_load_snapshot_with_track_column_names() {
        let path = write_snapshot(
            "similar_items_aliases",
            "score,track_id_enc_1,track_id_enc_2\n0.5,100,200\n0.4,100,300\n0.3,7,8\n",
        );
        let index = SimilarityIndex::load(&path).unwrap();
        let neighbor_ids: Vec<ItemId> = index.neighbors(100, 10).iter().map(|n| n.id).collect();
        assert_eq!(vec![200, 300], neighbor_ids);
        assert_eq!(3, index.stats().qty_records);
        assert_eq!(2, index.stats().qty_unique_keys);
    }

    #[test]
    fn should_fail_loading_snapshot_without_scores() {
        let path = write_snapshot("similar_items_no_score", "item_id,similar_item_id\n1,2\n");
        let result = SimilarityIndex::load(&path);
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn should_fail_loading_nan_score() {
        let path = write_snapshot(
            "similar_items_nan_score",
            "item_id,similar_item_id,score\n1,2,0.5\n1,3,NaN\n",
        );
        let result = SimilarityIndex::load(&path);
        assert!(matches!(
            result,
            Err(LoadError::NonFiniteScore {
                item_id: 1,
                similar_item_id: 3,
                ..
            })
        ));
    }

    #[test]
    fn should_fail_loading_unparsable_score() {
        let path = write_snapshot(
            "similar_items_bad_score",
            "item_id,similar_item_id,score\n1,2,0.5\n1,3,high\n",
        );
        assert!(SimilarityIndex::load(&path).is_err());
    }
}
