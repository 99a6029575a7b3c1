mod common;

use std::sync::Arc;

use actix_web::{test, web, App};
use serde_json::json;

use daytrip_api::routes;

use common::{test_config, FakeLocationStore, OfflineLocationStore, TestEngine};

macro_rules! discovery_app {
    ($engine:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new($engine.build(test_config()))))
                .route("/health", web::get().to(|| async { "OK" }))
                .service(
                    web::scope("/api/itineraries")
                        .route("/discover", web::post().to(routes::discovery::discover)),
                ),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_health() {
    let engine = TestEngine::new();
    let app = discovery_app!(engine);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
async fn test_discover_success() {
    let engine = TestEngine::new();
    let app = discovery_app!(engine);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/discover")
        .set_json(json!({ "regionId": 10, "itemCount": 5, "language": "en" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["district"]["name"], "Wanhua");
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
    assert_eq!(body["meta"]["requestedCount"], 5);
    assert_eq!(body["items"][0]["order"], 1);
    assert!(body["items"][0]["timeSlot"].is_string());
    assert!(body["items"][0]["colorTag"].is_string());
}

#[actix_rt::test]
async fn test_discover_defaults_to_traditional_chinese() {
    let engine = TestEngine::new();
    let app = discovery_app!(engine);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/discover")
        .set_json(json!({ "countryId": 1, "itemCount": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
async fn test_discover_without_scope_is_bad_request() {
    let engine = TestEngine::new();
    let app = discovery_app!(engine);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/discover")
        .set_json(json!({ "itemCount": 6 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("regionId"));
}

#[actix_rt::test]
async fn test_discover_item_count_out_of_range_is_bad_request() {
    let engine = TestEngine::new();
    let app = discovery_app!(engine);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/discover")
        .set_json(json!({ "regionId": 10, "itemCount": 20 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_discover_unknown_region_is_not_found() {
    let mut engine = TestEngine::new();
    engine.locations = Arc::new(FakeLocationStore::with(None));
    let app = discovery_app!(engine);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/discover")
        .set_json(json!({ "regionId": 999, "itemCount": 6 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn test_discover_store_outage_is_service_unavailable() {
    let mut engine = TestEngine::new();
    engine.location_override = Some(Arc::new(OfflineLocationStore));
    let app = discovery_app!(engine);

    let req = test::TestRequest::post()
        .uri("/api/itineraries/discover")
        .set_json(json!({ "regionId": 10, "itemCount": 6 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);
}
