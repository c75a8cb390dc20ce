//! Salary slip endpoints: /api/slips/*
//!
//! Component amounts are encrypted on write with the owner's active key and
//! only ever decrypted through the PIN-gated decrypt endpoint.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::AuthUser;
use crate::services::DecryptedSlip;
use crate::state::AppState;
use crate::store::models::SalarySlip;

#[derive(Debug, Deserialize)]
pub struct CreateSlipRequest {
    pub employee_id: Uuid,
    /// Component field name -> plaintext numeric string
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct DecryptSlipRequest {
    pub pin: String,
}

/// POST /api/slips - create a slip; fails when the owner has no active key
pub async fn slip_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateSlipRequest>,
) -> ApiResult<SalarySlip> {
    let owner = user.effective_owner();
    let slip = state
        .slips
        .create_slip(owner, body.employee_id, body.fields)
        .await?;
    Ok(ApiResponse::created(slip))
}

/// GET /api/slips - the caller's slips, fields still encrypted
pub async fn slip_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<SalarySlip>> {
    let owner = user.effective_owner();
    let slips = state.slips.list_slips(owner).await?;
    Ok(ApiResponse::success(slips))
}

/// POST /api/slips/:id/decrypt - PIN-gated bulk decrypt with derived totals
pub async fn slip_decrypt(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<DecryptSlipRequest>,
) -> ApiResult<DecryptedSlip> {
    let owner = user.effective_owner();
    let slip = state.slips.decrypt_slip(owner, id, &body.pin).await?;
    Ok(ApiResponse::success(slip))
}
