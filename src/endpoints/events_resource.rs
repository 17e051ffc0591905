use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::endpoints::SharedHandlesAndConfig;
use crate::io::{ItemId, UserId};

#[derive(Debug, Deserialize)]
pub struct PutQueryParams {
    user_id: UserId,
    item_id: ItemId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PutResponse {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub struct GetQueryParams {
    user_id: UserId,
    k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<ItemId>,
}

// Records that `user_id` interacted with `item_id`.
#[post("/put")]
pub async fn put(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<PutQueryParams>,
) -> HttpResponse {
    data.engine.events().record(query.user_id, query.item_id);

    HttpResponse::Ok().json(PutResponse {
        result: String::from("ok"),
    })
}

// Most recent events of `user_id`, newest first.
#[post("/get")]
pub async fn get(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<GetQueryParams>,
) -> HttpResponse {
    let k = query.k.unwrap_or(data.num_history_events);
    let events = data.engine.events().history(query.user_id, k);

    HttpResponse::Ok().json(EventsResponse { events })
}

#[cfg(test)]
mod events_resource_test {
    use actix_web::{test, App};

    use super::*;
    use crate::endpoints::configure;
    use crate::endpoints::test_handles::shared_handles;

    #[actix_rt::test]
    async fn should_return_recorded_events_newest_first() {
        let mut app = test::init_service(App::new().data(shared_handles()).configure(configure)).await;

        for item_id in &[99262, 590262] {
            let req = test::TestRequest::post()
                .uri(&format!("/put?user_id=1374582&item_id={}", item_id))
                .to_request();
            let response: PutResponse = test::read_response_json(&mut app, req).await;
            assert_eq!("ok", response.result);
        }

        let req = test::TestRequest::post()
            .uri("/get?user_id=1374582&k=10")
            .to_request();
        let response: EventsResponse = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![590262, 99262], response.events);

        let req = test::TestRequest::post()
            .uri("/get?user_id=1374582&k=1")
            .to_request();
        let response: EventsResponse = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![590262], response.events);
    }

    #[actix_rt::test]
    async fn should_reject_missing_item_id() {
        let mut app = test::init_service(App::new().data(shared_handles()).configure(configure)).await;
        let req = test::TestRequest::post().uri("/put?user_id=1").to_request();
        let resp = test::call_service(&mut app, req).await;
        assert!(resp.status().is_client_error());
    }
}
