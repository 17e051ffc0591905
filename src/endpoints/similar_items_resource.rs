use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::endpoints::SharedHandlesAndConfig;
use crate::io::{ItemId, Score};

#[derive(Debug, Deserialize)]
pub struct SimilarItemsQueryParams {
    item_id: ItemId,
    k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarItemsResponse {
    pub item_ids: Vec<ItemId>,
    pub scores: Vec<Score>,
}

#[post("/similar_items")]
pub async fn similar_items(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<SimilarItemsQueryParams>,
) -> HttpResponse {
    let k = query.k.unwrap_or(data.num_similar_items);
    let neighbors = data.engine.similarity_index().neighbors(query.item_id, k);

    HttpResponse::Ok().json(SimilarItemsResponse {
        item_ids: neighbors.iter().map(|scored| scored.id).collect(),
        scores: neighbors.iter().map(|scored| scored.score).collect(),
    })
}

#[cfg(test)]
mod similar_items_resource_test {
    use actix_web::{test, App};

    use super::*;
    use crate::endpoints::configure;
    use crate::endpoints::test_handles::shared_handles;

    #[actix_rt::test]
    async fn should_return_neighbors_and_scores() {
        let mut app = test::init_service(App::new().data(shared_handles()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/similar_items?item_id=99262&k=2")
            .to_request();
        let response: SimilarItemsResponse = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![10, 20], response.item_ids);
        assert_eq!(2, response.scores.len());
    }

    #[actix_rt::test]
    async fn should_return_empty_lists_for_unknown_item() {
        let mut app = test::init_service(App::new().data(shared_handles()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/similar_items?item_id=1")
            .to_request();
        let response: SimilarItemsResponse = test::read_response_json(&mut app, req).await;
        assert!(response.item_ids.is_empty());
        assert!(response.scores.is_empty());
    }
}
