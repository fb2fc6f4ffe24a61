use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use microloan_scoring_api::config::Config;
use microloan_scoring_api::db::Database;
use microloan_scoring_api::handlers::{self, AppState};
use microloan_scoring_api::scorers::Scorers;

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, connects to the database
/// and starts the Axum server with rate limiting and CORS configured.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microloan_scoring_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Build application state; scorer clients are constructed once here
    let app_state = Arc::new(AppState {
        db: db.pool.clone(),
        config: config.clone(),
        scorers: Scorers::new(&config),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("rate limiter configuration is static and valid"),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        // Profile aggregation and scoring endpoints
        .route("/loan/:loan_id", get(handlers::get_profile))
        .route("/riskband/:loan_id", get(handlers::get_risk_band))
        .route("/needband/:loan_id", get(handlers::get_need_band))
        .route("/fraudband/:loan_id", get(handlers::get_fraud_score))
        // Admin review workflow
        .route(
            "/api/loan-approval/pending",
            get(handlers::pending_applications),
        )
        .route(
            "/api/loan-approval/approved",
            get(handlers::approved_applications),
        )
        .route(
            "/api/loan-approval/rejected",
            get(handlers::rejected_applications),
        )
        .route(
            "/api/loan-approval/approve",
            post(handlers::approve_application),
        )
        .route(
            "/api/loan-approval/reject",
            post(handlers::reject_application),
        )
        .route(
            "/api/loan-approval/manual-review",
            post(handlers::manual_review),
        )
        // Manual loan-history ingestion
        .route(
            "/api/loan-history/manual",
            post(handlers::insert_loan_history),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 5MB max payload
                .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
