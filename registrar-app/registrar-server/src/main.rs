use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderName, HeaderValue, Method};
use mockable::DefaultClock;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{info, warn};

use registrar_api::{create_router, AppState};
use registrar_core::services::{StudentService, StudentUseCases};
use registrar_infrastructure::{
    create_pool, run_migrations, InMemoryIdempotencyRepository, InMemoryStudentRepository,
    PgIdempotencyRepository, PgStudentRepository,
};
use registrar_shared::config::{AppConfig, DatabaseSettings};
use registrar_shared::constants::{IDEMPOTENCY_KEY_HEADER, IDEMPOTENT_REPLAYED_HEADER};
use registrar_shared::AppError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry; the guard flushes buffered logs on exit
    let _telemetry_guard = registrar_shared::telemetry::init_telemetry();

    info!("Registrar server starting...");

    // Load configuration
    let config = AppConfig::load().map_err(AppError::from).context("Failed to load configuration")?;

    // Wire stores and service
    let students = build_student_service(&config.database).await?;
    let state = AppState::new(students);

    let cors_origin = config
        .app
        .cors_origin
        .parse::<HeaderValue>()
        .context("Invalid app.cors_origin")?;

    // Build router
    let app = create_router(state)
        // Add CORS
        .layer(
            CorsLayer::new()
                .allow_origin(cors_origin)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    HeaderName::from_static(IDEMPOTENCY_KEY_HEADER),
                ])
                .expose_headers([HeaderName::from_static(IDEMPOTENT_REPLAYED_HEADER)]),
        )
        // Tracing
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()));

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse().context("Invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    info!(env = %config.app.env, "{} listening on {}", config.app.name, addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Registrar server stopped");
    Ok(())
}

async fn build_student_service(
    database: &DatabaseSettings,
) -> anyhow::Result<Arc<dyn StudentUseCases>> {
    let clock = Arc::new(DefaultClock);

    if database.is_memory() {
        warn!("Using in-memory stores; data is lost on restart");
        return Ok(Arc::new(StudentService::new(
            Arc::new(InMemoryStudentRepository::new()),
            Arc::new(InMemoryIdempotencyRepository::new()),
            clock,
        )));
    }

    if !database.is_postgres() {
        return Err(AppError::UnsupportedBackend(database.backend.clone()).into());
    }

    info!("Connecting to database...");
    let pool = create_pool(database)
        .await
        .context("Failed to connect to database")?;
    info!("Database connection established.");

    if database.run_migrations {
        run_migrations(&pool).await.context("Failed to run migrations")?;
    }

    Ok(Arc::new(StudentService::new(
        Arc::new(PgStudentRepository::new(pool.clone())),
        Arc::new(PgIdempotencyRepository::new(pool)),
        clock,
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
