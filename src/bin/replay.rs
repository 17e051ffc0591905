use std::sync::Arc;

use anyhow::Context;
use itertools::Itertools;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trackblend::blending::BlendingEngine;
use trackblend::config::AppConfig;
use trackblend::io::{read_snapshot, ItemId, UserId};
use trackblend::stopwatch::Stopwatch;
use trackblend::stores::events::RecentEventStore;
use trackblend::stores::offline_ranking::OfflineRankingStore;
use trackblend::stores::similarity_index::SimilarityIndex;

#[derive(Debug, Deserialize)]
struct EventRecord {
    user_id: UserId,
    #[serde(alias = "track_id")]
    item_id: ItemId,
}

// Replays `user_id,item_id` events through the event store, then reports the
// offline, online and blended recommendations of every user seen.
fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_default();
    let events_path = args
        .next()
        .context("usage: replay <config> <events.csv>")?;
    let config = AppConfig::new(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let similarity_index = SimilarityIndex::load(&config.data.similar_items_path)
        .with_context(|| format!("loading similar items from {}", config.data.similar_items_path))?;
    let offline_rankings = OfflineRankingStore::load(
        &config.data.personal_recs_path,
        &config.data.top_popular_path,
    )
    .context("loading offline recommendations")?;
    let engine = BlendingEngine::new(
        Arc::new(RecentEventStore::new(config.model.max_events_per_user)),
        Arc::new(similarity_index),
        Arc::new(offline_rankings),
    );

    let events: Vec<EventRecord> = read_snapshot(&events_path)
        .with_context(|| format!("reading events from {}", events_path))?;
    for event in events.iter() {
        engine.events().record(event.user_id, event.item_id);
    }
    info!(qty_events = events.len(), "replayed events");

    let k = config.model.num_items_to_recommend;
    let mut stopwatch = Stopwatch::new();
    for user_id in events.iter().map(|event| event.user_id).unique() {
        let offline = engine.derive_offline(user_id, k);
        let online = engine.derive_online(user_id, k);
        stopwatch.start();
        let blended = engine.blend(user_id, k);
        stopwatch.stop();
        info!(user_id, ?offline, ?online, ?blended, "recommendations");
    }

    println!("Qty blend evaluations: {}", stopwatch.get_n());
    println!("Blend latency");
    println!("p50 (microseconds): {}", stopwatch.get_percentile_in_micros(0.50));
    println!("p90 (microseconds): {}", stopwatch.get_percentile_in_micros(0.90));
    println!("p99 (microseconds): {}", stopwatch.get_percentile_in_micros(0.99));
    Ok(())
}
