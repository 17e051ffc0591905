use std::sync::Arc;

use actix_web::http::header;
use actix_web::{http::ContentEncoding, middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use actix_web_prom::PrometheusMetrics;
use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trackblend::blending::BlendingEngine;
use trackblend::config::AppConfig;
use trackblend::endpoints::{configure, SharedHandlesAndConfig};
use trackblend::stores::events::RecentEventStore;
use trackblend::stores::offline_ranking::OfflineRankingStore;
use trackblend::stores::similarity_index::SimilarityIndex;

fn load_engine(config: &AppConfig) -> anyhow::Result<BlendingEngine> {
    let similarity_index = SimilarityIndex::load(&config.data.similar_items_path)
        .with_context(|| format!("loading similar items from {}", config.data.similar_items_path))?;
    let offline_rankings = OfflineRankingStore::load(
        &config.data.personal_recs_path,
        &config.data.top_popular_path,
    )
    .context("loading offline recommendations")?;
    let events = RecentEventStore::new(config.model.max_events_per_user);

    Ok(BlendingEngine::new(
        Arc::new(events),
        Arc::new(similarity_index),
        Arc::new(offline_rankings),
    ))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let num_items_to_recommend = config.model.num_items_to_recommend;
    let num_similar_items = config.model.num_similar_items;
    let num_history_events = config.model.num_history_events;
    let qty_workers = config.server.num_workers;

    // Every store must be loaded before the first request is accepted.
    let engine = match load_engine(&config) {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            error!("failed to load stores: {:#}", err);
            return Err(err);
        }
    };

    info!("start metrics");
    let prometheus = PrometheusMetrics::new("api", Some("/internal/prometheus"), None);

    info!("Done. start httpd at http://{}", &bind_address);
    HttpServer::new(move || {
        let handles_and_config = SharedHandlesAndConfig {
            engine: engine.clone(),
            num_items_to_recommend,
            num_similar_items,
            num_history_events,
            qty_workers,
        };

        App::new()
            .wrap(middleware::Compress::new(ContentEncoding::Identity))
            .wrap(prometheus.clone())
            .wrap(
                middleware::DefaultHeaders::new()
                    .header("Cache-Control", "no-cache, no-store, must-revalidate")
                    .header("Pragma", "no-cache")
                    .header("Expires", "0"),
            )
            .data(handles_and_config)
            .configure(configure)
            .service(web::resource("/").route(web::get().to(|_req: HttpRequest| {
                HttpResponse::Found()
                    .header(header::LOCATION, "/internal")
                    .finish()
            })))
    })
    .workers(qty_workers)
    .bind(&bind_address)
    .with_context(|| format!("could not bind server to address {}", &bind_address))?
    .run()
    .await?;

    Ok(())
}
