//! Decryption key endpoints: /api/keys/*

use axum::extract::{Path, State};
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::store::models::KeySummary;

#[derive(Debug, Deserialize)]
pub struct AddKeyRequest {
    pub pin: String,
    pub label: Option<String>,
    /// Optional explicit 32-character key material. Omitted in normal
    /// operation; the server generates fresh material.
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub pin: String,
}

/// GET /api/keys - list the caller's keys (never includes hashes or material)
pub async fn key_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<KeySummary>> {
    let owner = user.effective_owner();
    let keys = state.keys.list_keys(owner).await?;
    Ok(ApiResponse::success(keys))
}

/// POST /api/keys - add a key; the owner's first key auto-activates
pub async fn key_add(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AddKeyRequest>,
) -> ApiResult<KeySummary> {
    let owner = user.effective_owner();
    let key = state
        .keys
        .add_key(owner, user.id, &body.pin, body.label, body.key)
        .await?;
    Ok(ApiResponse::created(key))
}

/// POST /api/keys/:id/activate - make one key active, deactivating siblings
pub async fn key_activate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let owner = user.effective_owner();
    state.keys.activate(owner, id).await?;
    Ok(ApiResponse::success(json!({ "activated": id })))
}

/// DELETE /api/keys/:id
pub async fn key_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let owner = user.effective_owner();
    state.keys.delete_key(owner, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}

/// POST /api/keys/verify - check a PIN against the caller's keys
pub async fn key_verify(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<VerifyRequest>,
) -> ApiResult<crate::services::PinVerification> {
    let owner = user.effective_owner();
    let outcome = state.keys.verify(owner, &body.pin).await?;
    Ok(ApiResponse::success(outcome))
}
