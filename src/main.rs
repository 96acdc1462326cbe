use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use resource_navigator::catalog::CatalogStore;
use resource_navigator::config::Settings;
use resource_navigator::core::Matcher;
use resource_navigator::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use resource_navigator::services::ActionPlanService;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Initialize logging (LOG_LEVEL / LOG_FORMAT win over the config file)
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting resource navigator...");

    info!(
        "Configuration loaded (catalog source: {}, static catalog: {})",
        settings.catalog.source, settings.catalog.static_path
    );

    // Catalog store with static-file fallback
    let catalog = Arc::new(CatalogStore::from_settings(&settings.catalog));

    // Warm the cache so the first request is served from memory
    let warm = catalog.snapshot().await;
    if let Some(e) = &warm.load_error {
        error!("Catalog unavailable at startup: {}", e);
    } else {
        info!("Catalog ready with {} resources", warm.len());
    }

    // Action-plan generation (model if configured, templates otherwise)
    let planner = Arc::new(ActionPlanService::from_settings(&settings.action_plan));

    info!("Action plans generated by: {}", planner.generator_name());

    // Build application state
    let app_state = AppState {
        catalog,
        planner,
        matcher: Matcher::default(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
