use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::catalog::CatalogStore;
use crate::core::Matcher;
use crate::models::{
    CacheFreshness, CatalogQuery, CatalogResponse, ErrorResponse, HealthResponse, MatchRequest,
    MatchResponse, RefreshResponse,
};
use crate::services::ActionPlanService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub planner: Arc<ActionPlanService>,
    pub matcher: Matcher,
}

/// Configure all resource-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/match", web::post().to(match_resources))
        .route("/catalog/refresh", web::post().to(refresh_catalog))
        .route("/resources", web::get().to(list_resources));
}

/// Health check endpoint
///
/// Reports catalog size, configured source and cache freshness. Answers
/// 503 when no catalog could be loaded at all.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.catalog.snapshot().await;
    let ttl = state.catalog.ttl();
    let age = snapshot.age();
    let stats = state.catalog.cache_stats();

    let status = match (&snapshot.load_error, snapshot.fell_back) {
        (Some(_), _) if snapshot.is_empty() => "unavailable",
        (Some(_), _) | (None, true) => "degraded",
        (None, false) => "healthy",
    };

    let body = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        catalog_size: snapshot.len(),
        source: state.catalog.configured_source().to_string(),
        cache: CacheFreshness {
            fresh: snapshot.load_error.is_none() && age < ttl,
            loaded_at: snapshot.loaded_at,
            age_secs: age.as_secs(),
            ttl_secs: ttl.as_secs(),
            entries: stats.entries,
        },
        fell_back: snapshot.fell_back,
        error: snapshot.load_error.clone(),
    };

    if status == "unavailable" {
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}

/// Match resources endpoint
///
/// POST /api/v1/match
///
/// Request body:
/// ```json
/// {
///   "zip": "94601",
///   "ageRange": "30-40",
///   "incomeBracket": "low",
///   "householdSize": 1,
///   "primaryNeed": "food",
///   "preferredLanguage": "English"
/// }
/// ```
async fn match_resources(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let criteria = match req.into_inner().into_criteria() {
        Ok(criteria) => criteria,
        Err(e) => {
            tracing::info!("Rejected match criteria: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Validation failed".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    tracing::info!(
        "Matching {} resources near {} (language: {})",
        criteria.primary_need,
        criteria.zip,
        criteria.language()
    );

    let snapshot = state.catalog.snapshot().await;
    let outcome = state.matcher.find_matches(&snapshot.resources, &criteria);

    tracing::debug!(
        "Pipeline: {} resources, {} in category, {} eligible, language narrowed: {}",
        outcome.total_resources,
        outcome.category_matches,
        outcome.eligible,
        outcome.language_narrowed
    );

    let results = state.planner.attach(outcome.matches, &criteria).await;

    tracing::info!(
        "Returning {} matches for {} near {}",
        results.len(),
        criteria.primary_need,
        criteria.zip
    );

    HttpResponse::Ok().json(MatchResponse {
        count: results.len(),
        results,
    })
}

/// Force a catalog reload
///
/// POST /api/v1/catalog/refresh
async fn refresh_catalog(state: web::Data<AppState>) -> impl Responder {
    tracing::info!("Catalog refresh requested");

    let snapshot = state.catalog.refresh().await;

    if let Some(error) = &snapshot.load_error {
        return HttpResponse::ServiceUnavailable().json(ErrorResponse {
            error: "Catalog unavailable".to_string(),
            message: error.clone(),
            status_code: 503,
        });
    }

    HttpResponse::Ok().json(RefreshResponse {
        success: true,
        count: snapshot.len(),
        source: snapshot.served_by.to_string(),
        loaded_at: snapshot.loaded_at,
    })
}

/// List the canonical catalog
///
/// GET /api/v1/resources?category={category}
async fn list_resources(
    state: web::Data<AppState>,
    query: web::Query<CatalogQuery>,
) -> impl Responder {
    let snapshot = state.catalog.snapshot().await;

    let resources: Vec<_> = match query.category.as_deref().map(str::trim) {
        Some(category) if !category.is_empty() => snapshot
            .resources
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect(),
        _ => snapshot.resources.clone(),
    };

    HttpResponse::Ok().json(CatalogResponse {
        count: resources.len(),
        resources,
    })
}
