use std::sync::Arc;

use actix_web::web;

use crate::blending::BlendingEngine;

pub mod events_resource;
pub mod index_resource;
pub mod recommend_resource;
pub mod similar_items_resource;

pub struct SharedHandlesAndConfig {
    pub engine: Arc<BlendingEngine>,
    pub num_items_to_recommend: usize,
    pub num_similar_items: usize,
    pub num_history_events: usize,
    pub qty_workers: usize,
}

/// Registers every resource of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(events_resource::put)
        .service(events_resource::get)
        .service(similar_items_resource::similar_items)
        .service(recommend_resource::recommendations_offline)
        .service(recommend_resource::recommendations_online)
        .service(recommend_resource::recommendations)
        .service(index_resource::internal);
}

#[cfg(test)]
pub(crate) mod test_handles {
    use std::sync::Arc;

    use hashbrown::HashMap;

    use super::SharedHandlesAndConfig;
    use crate::blending::BlendingEngine;
    use crate::stores::events::RecentEventStore;
    use crate::stores::offline_ranking::OfflineRankingStore;
    use crate::stores::similarity_index::SimilarityIndex;

    /// User 1374582 has personal recommendations, everybody else gets `[1, 2, 3]`.
    pub fn shared_handles() -> SharedHandlesAndConfig {
        let similarity_index = SimilarityIndex::from_triples(vec![
            (99262, 10, 0.9),
            (99262, 20, 0.8),
            (99262, 30, 0.7),
            (590262, 40, 0.95),
        ]);
        let mut personal = HashMap::new();
        personal.insert(1374582, vec![500, 600, 700]);
        let engine = BlendingEngine::new(
            Arc::new(RecentEventStore::new(10)),
            Arc::new(similarity_index),
            Arc::new(OfflineRankingStore::new(personal, vec![1, 2, 3])),
        );
        SharedHandlesAndConfig {
            engine: Arc::new(engine),
            num_items_to_recommend: 100,
            num_similar_items: 10,
            num_history_events: 10,
            qty_workers: 1,
        }
    }
}
