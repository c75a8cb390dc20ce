pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod payroll;
pub mod scope;
pub mod services;
pub mod state;
pub mod store;
pub mod types;

use axum::routing::{delete, get, post, put};
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(api_routes(state))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router {
    use handlers::{keys, pages, roles, slips};

    Router::new()
        // Decryption key lifecycle
        .route("/api/keys", get(keys::key_list).post(keys::key_add))
        .route("/api/keys/verify", post(keys::key_verify))
        .route("/api/keys/:id/activate", post(keys::key_activate))
        .route("/api/keys/:id", delete(keys::key_delete))
        // Page permission matrix
        .route("/api/pages", get(pages::page_list).post(pages::page_create))
        .route("/api/pages/role/:role", get(pages::page_role_list))
        .route("/api/pages/:page_id", get(pages::page_get))
        .route("/api/pages/:page_id/:role", put(pages::permission_put))
        // Derived role views
        .route("/api/roles/:role/pages", get(roles::role_pages))
        // Salary slips
        .route("/api/slips", get(slips::slip_list).post(slips::slip_create))
        .route("/api/slips/:id/decrypt", post(slips::slip_decrypt))
        .layer(axum::middleware::from_fn(
            middleware::auth::jwt_auth_middleware,
        ))
        .with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "HRM API",
            "version": version,
            "description": "HR/payroll backend - encrypted compensation data and role/page permissions",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "keys": "/api/keys[/:id[/activate]], /api/keys/verify (protected)",
                "pages": "/api/pages[/:page_id[/:role]], /api/pages/role/:role (protected)",
                "roles": "/api/roles/:role/pages (protected)",
                "slips": "/api/slips[/:id/decrypt] (protected)",
            }
        }
    }))
}

async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now()
        }
    }))
}
