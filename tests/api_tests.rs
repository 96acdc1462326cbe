// HTTP handler tests for Resource Navigator

use actix_web::{test, web, App};
use resource_navigator::catalog::CatalogStore;
use resource_navigator::config::CatalogSettings;
use resource_navigator::core::Matcher;
use resource_navigator::routes::{configure_routes, handle_json_payload_error, AppState};
use resource_navigator::services::{ActionPlanService, SourceKind};
use serde_json::{json, Value};
use std::sync::Arc;

const SEED_CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/resources.json");

fn create_state(static_path: &str) -> AppState {
    let settings = CatalogSettings {
        source: SourceKind::File,
        static_path: static_path.to_string(),
        ..CatalogSettings::default()
    };

    AppState {
        catalog: Arc::new(CatalogStore::from_settings(&settings)),
        planner: Arc::new(ActionPlanService::template_only()),
        matcher: Matcher::default(),
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_match_returns_ranked_results_with_plans() {
    let app = init_app!(create_state(SEED_CATALOG));

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({
            "zip": "94601",
            "ageRange": "30-40",
            "incomeBracket": "low",
            "householdSize": 1,
            "primaryNeed": "food",
            "preferredLanguage": "English"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    let results = body["results"].as_array().unwrap();

    assert_eq!(body["count"].as_u64().unwrap() as usize, results.len());
    assert!(!results.is_empty() && results.len() <= 5);
    assert_eq!(results[0]["zip"], "94601");
    assert_eq!(results[0]["distance"], 0);
    assert!(results.iter().all(|r| r["category"] == "food"));
    assert!(results.iter().all(|r| r["actionPlan"].as_array().is_some_and(|p| !p.is_empty())));
}

#[actix_web::test]
async fn test_match_spanish_plan() {
    let app = init_app!(create_state(SEED_CATALOG));

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({
            "zip": "94601",
            "primary_need": "Mental_Health",
            "preferred_language": "Spanish"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let first = &body["results"][0];
    assert_eq!(first["category"], "mental_health");
    assert!(first["actionPlan"][0].as_str().unwrap().starts_with("Llame"));
}

#[actix_web::test]
async fn test_match_missing_zip_is_bad_request() {
    let app = init_app!(create_state(SEED_CATALOG));

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({ "primaryNeed": "food" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_match_unknown_need_is_bad_request() {
    let app = init_app!(create_state(SEED_CATALOG));

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({ "zip": "94601", "primaryNeed": "transportation" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("transportation"));
}

#[actix_web::test]
async fn test_match_malformed_json_is_bad_request() {
    let app = init_app!(create_state(SEED_CATALOG));

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"zip\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_health_reports_catalog() {
    let app = init_app!(create_state(SEED_CATALOG));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["source"], "file");
    assert_eq!(body["fellBack"], false);
    assert!(body["catalogSize"].as_u64().unwrap() > 0);
    assert_eq!(body["cache"]["fresh"], true);
    assert_eq!(body["cache"]["ttlSecs"], 3600);
    assert!(body["cache"]["entries"].is_u64());
}

#[actix_web::test]
async fn test_health_unavailable_without_catalog() {
    let app = init_app!(create_state("/nonexistent/resources.json"));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 503);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unavailable");
    assert!(body["error"].is_string());

    // Matching still answers with an empty list
    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({ "zip": "94601", "primaryNeed": "food" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 0);
}

#[actix_web::test]
async fn test_refresh_reloads_catalog() {
    let app = init_app!(create_state(SEED_CATALOG));

    let req = test::TestRequest::post().uri("/api/v1/catalog/refresh").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "file");
    assert!(body["count"].as_u64().unwrap() > 0);
    assert!(body["loadedAt"].is_string());
}

#[actix_web::test]
async fn test_list_resources_by_category() {
    let app = init_app!(create_state(SEED_CATALOG));

    let req = test::TestRequest::get()
        .uri("/api/v1/resources?category=housing")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let resources = body["resources"].as_array().unwrap();
    assert!(!resources.is_empty());
    assert!(resources.iter().all(|r| r["category"] == "housing"));
}
