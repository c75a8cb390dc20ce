//! Role-centric views derived from the page permission matrix.

use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::Role;

/// GET /api/roles/:role/pages - page ids visible to a role.
///
/// Read-only projection of the matrix (level != hidden); there is no
/// separately mutable per-role page list to drift out of sync.
pub async fn role_pages(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Vec<String>> {
    let role: Role = role
        .parse()
        .map_err(|_| ApiError::validation_error(format!("invalid role: {role}")))?;
    let pages = state.permissions.pages_for_role(role).await?;
    Ok(ApiResponse::success(pages))
}
