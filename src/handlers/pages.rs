//! Page permission matrix endpoints: /api/pages/*

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::store::models::{PageAccess, PagePermissions, PageRecord};
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub name: String,
    pub page_id: String,
    pub permissions: Option<PagePermissions>,
}

#[derive(Debug, Deserialize)]
pub struct SetPermissionRequest {
    pub permission: String,
}

/// GET /api/pages - every page with its full permission matrix row
pub async fn page_list(State(state): State<AppState>) -> ApiResult<Vec<PageRecord>> {
    let pages = state.permissions.all_pages().await?;
    Ok(ApiResponse::success(pages))
}

/// POST /api/pages - register a new page
pub async fn page_create(
    State(state): State<AppState>,
    Json(body): Json<CreatePageRequest>,
) -> ApiResult<PageRecord> {
    if body.page_id.trim().is_empty() || body.name.trim().is_empty() {
        return Err(ApiError::validation_error("name and page_id are required"));
    }
    let page = state
        .permissions
        .create_page(body.page_id, body.name, body.permissions)
        .await?;
    Ok(ApiResponse::created(page))
}

/// GET /api/pages/:page_id - one page across all roles
pub async fn page_get(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> ApiResult<PageRecord> {
    let page = state.permissions.get_page(&page_id).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/pages/role/:role - every page projected to one role's level
pub async fn page_role_list(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Vec<PageAccess>> {
    let role: Role = role
        .parse()
        .map_err(|_| ApiError::validation_error(format!("invalid role: {role}")))?;
    let pages = state.permissions.list_for_role(role).await?;
    Ok(ApiResponse::success(pages))
}

/// PUT /api/pages/:page_id/:role - set one role's level on one page,
/// creating the page row when missing
pub async fn permission_put(
    State(state): State<AppState>,
    Path((page_id, role)): Path<(String, String)>,
    Json(body): Json<SetPermissionRequest>,
) -> ApiResult<Value> {
    state
        .permissions
        .set_permission(&page_id, &role, &body.permission)
        .await?;
    Ok(ApiResponse::success(json!({
        "page_id": page_id,
        "role": role,
        "permission": body.permission
    })))
}
