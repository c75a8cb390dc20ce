use std::sync::Arc;

use hrm_api::state::AppState;
use hrm_api::store::PgStore;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = hrm_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting HRM API in {:?} mode", config.environment);

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let store = PgStore::connect(&database_url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect database: {}", e));
    store
        .ensure_schema()
        .await
        .unwrap_or_else(|e| panic!("failed to prepare schema: {}", e));

    let store = Arc::new(store);
    let state = AppState::from_stores(store.clone(), store.clone(), store);
    let app = hrm_api::app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("HRM_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("HRM API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
