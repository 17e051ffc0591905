extern crate sys_info;

use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::endpoints::SharedHandlesAndConfig;
use crate::io::SnapshotStats;
use web::Data;

fn push_snapshot_stats(html: &mut String, title: &str, stats: &SnapshotStats) {
    let age_minutes = (Utc::now().naive_utc() - stats.loaded_at).num_minutes();

    html.push_str("<h3>");
    html.push_str(title);
    html.push_str("</h3>");
    html.push_str("Loaded: ");
    html.push_str(&stats.descriptive_name);
    html.push_str("<br />Qty Records: ");
    html.push_str(&stats.qty_records.to_string());
    html.push_str("<br />Qty Unique Keys: ");
    html.push_str(&stats.qty_unique_keys.to_string());
    html.push_str("<br />Load duration (ms): ");
    html.push_str(&stats.load_duration.as_millis().to_string());
    html.push_str("<br />Loaded at: ");
    html.push_str(&stats.loaded_at.to_string());
    html.push_str("<br />Age (minutes): ");
    html.push_str(&age_minutes.to_string());
}

#[get("/internal")]
pub async fn internal(config: Data<SharedHandlesAndConfig>) -> HttpResponse {
    let engine = config.engine.as_ref();
    let mut html = "<html>trackblend: blended online and offline recommendations.<br />".to_string();

    push_snapshot_stats(&mut html, "Similar items", engine.similarity_index().stats());
    push_snapshot_stats(
        &mut html,
        "Personal recommendations",
        engine.offline_rankings().personal_stats(),
    );
    push_snapshot_stats(
        &mut html,
        "Fallback recommendations",
        engine.offline_rankings().fallback_stats(),
    );

    let request_stats = engine.offline_rankings().stats();
    html.push_str("<h3>Offline requests</h3>");
    html.push_str("Served from personal recommendations: ");
    html.push_str(&request_stats.qty_personal.to_string());
    html.push_str("<br />Served from fallback: ");
    html.push_str(&request_stats.qty_fallback.to_string());

    html.push_str("<h3>Event store</h3>");
    html.push_str("Max events per user: ");
    html.push_str(&engine.events().capacity().to_string());
    html.push_str("<br />Qty users with events: ");
    html.push_str(&engine.events().qty_users().to_string());

    html.push_str("<h3>Model</h3>");
    html.push_str("Qty items to recommend: ");
    html.push_str(&config.num_items_to_recommend.to_string());
    html.push_str("<br />Qty similar items: ");
    html.push_str(&config.num_similar_items.to_string());
    html.push_str("<br />Qty history events: ");
    html.push_str(&config.num_history_events.to_string());

    html.push_str("<h3>Machine instance</h3>");
    html.push_str("Qty CPU's detected: ");
    html.push_str(&sys_info::cpu_num().unwrap_or(0).to_string());
    html.push_str("<br />Qty actix workers set: ");
    html.push_str(&config.qty_workers.to_string());
    html.push_str("<br />CPU speed: ");
    html.push_str(&sys_info::cpu_speed().unwrap_or(0).to_string());
    html.push_str("MHz");
    html.push_str("<br />Active processes on instance: ");
    html.push_str(&sys_info::proc_total().unwrap_or(0).to_string());
    html.push_str("<h3>Metrics</h3>");
    html.push_str("<a href=\"/internal/prometheus\">prometheus</a>");
    html.push_str("</html>");

    HttpResponse::Ok().content_type("text/html").body(html)
}

#[cfg(test)]
mod index_resource_test {
    use actix_web::{test, App};

    use crate::endpoints::configure;
    use crate::endpoints::test_handles::shared_handles;

    #[actix_rt::test]
    async fn should_render_offline_request_counters() {
        let handles = shared_handles();
        handles.engine.derive_offline(830, 5);
        let mut app = test::init_service(App::new().data(handles).configure(configure)).await;

        let req = test::TestRequest::get().uri("/internal").to_request();
        let body = test::read_response(&mut app, req).await;
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Served from fallback: 1"));
        assert!(html.contains("Max events per user: 10"));
    }
}
