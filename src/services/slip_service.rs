//! Salary slip write and PIN-gated decrypt flows.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::payroll::{self, SlipTotals};
use crate::services::encryption_service::{EncryptionError, EncryptionService};
use crate::services::key_service::{KeyError, KeyService};
use crate::store::models::SalarySlip;
use crate::store::{SlipStore, StoreError};

#[derive(Debug, Error)]
pub enum SlipError {
    #[error("{0}")]
    Validation(String),

    #[error("salary slip not found")]
    NotFound,

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A slip with its fields decrypted and totals computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptedSlip {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub fields: BTreeMap<String, String>,
    pub totals: SlipTotals,
}

#[derive(Clone)]
pub struct SlipService {
    store: Arc<dyn SlipStore>,
    encryption: EncryptionService,
    keys: KeyService,
}

impl SlipService {
    pub fn new(store: Arc<dyn SlipStore>, encryption: EncryptionService, keys: KeyService) -> Self {
        Self { store, encryption, keys }
    }

    /// Create a slip, encrypting every component field under the owner's
    /// active key. Fails outright when no key is active - plaintext salary
    /// data is never written.
    pub async fn create_slip(
        &self,
        owner: Uuid,
        employee_id: Uuid,
        fields: BTreeMap<String, String>,
    ) -> Result<SalarySlip, SlipError> {
        if fields.is_empty() {
            return Err(SlipError::Validation("at least one salary field is required".to_string()));
        }
        if let Some(unknown) = fields.keys().find(|k| !payroll::is_component_field(k)) {
            return Err(SlipError::Validation(format!("unknown salary field: {unknown}")));
        }

        let mut encrypted = BTreeMap::new();
        for (name, value) in &fields {
            let token = self.encryption.encrypt_for_owner(owner, value).await?;
            encrypted.insert(name.clone(), token);
        }

        let slip = SalarySlip {
            id: Uuid::new_v4(),
            owner,
            employee_id,
            fields: encrypted,
            created_at: Utc::now(),
        };
        self.store.insert_slip(slip.clone()).await?;
        tracing::info!(owner = %owner, slip_id = %slip.id, "created salary slip");
        Ok(slip)
    }

    /// Slips as stored (fields encrypted).
    pub async fn list_slips(&self, owner: Uuid) -> Result<Vec<SalarySlip>, SlipError> {
        Ok(self.store.slips_for_owner(owner).await?)
    }

    /// PIN-gated bulk decrypt of one slip.
    ///
    /// The gate runs first; on denial no decryption is attempted. A failed
    /// field decryption aborts the whole request - monetary fields are
    /// never silently zeroed.
    pub async fn decrypt_slip(
        &self,
        owner: Uuid,
        slip_id: Uuid,
        pin: &str,
    ) -> Result<DecryptedSlip, SlipError> {
        self.keys.authorize_decryption(owner, pin).await?;

        let slip = self
            .store
            .slip_by_id(owner, slip_id)
            .await?
            .ok_or(SlipError::NotFound)?;

        let mut fields = BTreeMap::new();
        for (name, token) in &slip.fields {
            let value = self.encryption.decrypt_for_owner(owner, token).await?;
            fields.insert(name.clone(), value);
        }

        let totals = payroll::compute_totals(&fields);
        Ok(DecryptedSlip {
            id: slip.id,
            employee_id: slip.employee_id,
            fields,
            totals,
        })
    }
}
