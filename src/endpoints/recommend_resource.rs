use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::endpoints::SharedHandlesAndConfig;
use crate::io::{ItemId, UserId};

#[derive(Debug, Deserialize)]
pub struct RecsQueryParams {
    user_id: UserId,
    k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecsResponse {
    pub recs: Vec<ItemId>,
}

#[post("/recommendations_offline")]
pub async fn recommendations_offline(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<RecsQueryParams>,
) -> HttpResponse {
    let k = query.k.unwrap_or(data.num_items_to_recommend);
    let recs = data.engine.derive_offline(query.user_id, k);

    HttpResponse::Ok().json(RecsResponse { recs })
}

#[post("/recommendations_online")]
pub async fn recommendations_online(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<RecsQueryParams>,
) -> HttpResponse {
    let k = query.k.unwrap_or(data.num_items_to_recommend);
    let recs = data.engine.derive_online(query.user_id, k);

    HttpResponse::Ok().json(RecsResponse { recs })
}

// The main endpoint: session based and precomputed recommendations, blended.
#[post("/recommendations")]
pub async fn recommendations(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<RecsQueryParams>,
) -> HttpResponse {
    let k = query.k.unwrap_or(data.num_items_to_recommend);
    let recs = data.engine.blend(query.user_id, k);
    debug!(user_id = query.user_id, k, qty_recs = recs.len(), "blended recommendations");

    HttpResponse::Ok().json(RecsResponse { recs })
}

#[cfg(test)]
mod recommend_resource_test {
    use actix_web::{test, App};

    use super::*;
    use crate::endpoints::configure;
    use crate::endpoints::test_handles::shared_handles;

    #[actix_rt::test]
    async fn should_serve_fallback_to_unknown_user() {
        let mut app = test::init_service(App::new().data(shared_handles()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/recommendations_offline?user_id=830&k=2")
            .to_request();
        let response: RecsResponse = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![1, 2], response.recs);

        let req = test::TestRequest::post()
            .uri("/recommendations_online?user_id=830")
            .to_request();
        let response: RecsResponse = test::read_response_json(&mut app, req).await;
        assert!(response.recs.is_empty());

        let req = test::TestRequest::post()
            .uri("/recommendations?user_id=830")
            .to_request();
        let response: RecsResponse = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![1, 2, 3], response.recs);
    }

    #[actix_rt::test]
    async fn should_blend_after_recording_events() {
        let mut app = test::init_service(App::new().data(shared_handles()).configure(configure)).await;

        for item_id in &[99262, 590262] {
            let req = test::TestRequest::post()
                .uri(&format!("/put?user_id=1374582&item_id={}", item_id))
                .to_request();
            let resp = test::call_service(&mut app, req).await;
            assert!(resp.status().is_success());
        }

        let req = test::TestRequest::post()
            .uri("/recommendations_online?user_id=1374582&k=3")
            .to_request();
        let response: RecsResponse = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![40, 10, 20], response.recs);

        // online [40, 10, 20], offline [500, 600, 700]
        let req = test::TestRequest::post()
            .uri("/recommendations?user_id=1374582&k=3")
            .to_request();
        let response: RecsResponse = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![40, 600, 20], response.recs);
    }
}
