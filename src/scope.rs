//! Tenant scoping: maps an authenticated principal to the owner id used to
//! partition every owner-scoped collection (employees, salary slips,
//! decryption keys, settings).
//!
//! Admin accounts created by a super-admin are sub-accounts: their data
//! lives under the creator's partition, so the resolver follows the
//! `created_by` back-reference one level. Queries must always filter by the
//! resolved owner, never by the raw principal id, or data leaks across
//! tenants.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Role;

/// The authenticated caller, as established at the auth boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub created_by: Option<Uuid>,
}

/// Resolve the effective owner for a principal.
///
/// Pure function: an `admin` with a `created_by` back-reference resolves to
/// the creator; every other principal resolves to itself.
pub fn effective_owner(principal: &Principal) -> Uuid {
    match (principal.role, principal.created_by) {
        (Role::Admin, Some(creator)) => creator,
        _ => principal.id,
    }
}

impl Principal {
    pub fn effective_owner(&self) -> Uuid {
        effective_owner(self)
    }
}
