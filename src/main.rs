use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_hub::api::{self, AppState, AuthManager};
use course_hub::config::AppConfig;
use course_hub::db;
use course_hub::store::SqlStore;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_hub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    if config.database_url.starts_with("sqlite:") && !config.database_url.contains(":memory:") {
        std::fs::create_dir_all(&config.data_dir).expect("Failed to create data directory");
    }

    // Initialize database
    let db = db::init_database(&config.database_url)
        .await
        .expect("Failed to initialize database");
    let store = Arc::new(SqlStore::new(Arc::new(db)));

    let state = Arc::new(AppState::new(
        store,
        AuthManager::with_token_duration(config.token_ttl),
    ));

    // Optional bootstrap account
    if let Some(password) = &config.admin_password {
        state
            .auth
            .ensure_user(state.store.as_ref(), "admin", password)
            .await
            .expect("Failed to create admin user");
    }

    let app = api::router(state);

    tracing::info!("Course hub starting on http://{}", config.bind_addr);
    tracing::info!("API Endpoints:");
    tracing::info!("  POST /api/v1/auth/sign-up      - Register new user");
    tracing::info!("  POST /api/v1/auth/sign-in      - Sign in and get token");
    tracing::info!("  GET  /api/v1/courses           - List courses");
    tracing::info!("  POST /api/v1/courses/:id/enroll - Enroll in a course");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}
