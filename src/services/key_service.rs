//! Decryption key lifecycle and the PIN gate.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::crypto;
use crate::store::models::{KeyRecord, KeySummary};
use crate::store::{KeyStore, StoreError};

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("{0}")]
    Validation(String),

    #[error("key not found")]
    NotFound,

    /// PIN mismatch. The message stays opaque: it must not reveal whether
    /// the owner had keys at all or which check failed.
    #[error("not authorized")]
    Denied,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("hashing failed")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Outcome of a PIN verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinVerification {
    #[serde(rename = "match")]
    pub matched: bool,
    pub key_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct KeyService {
    store: Arc<dyn KeyStore>,
}

impl KeyService {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Register a new decryption key for an owner.
    ///
    /// The PIN is bcrypt-hashed before storage. Explicit key material must
    /// be exactly 32 characters; when omitted, fresh random material is
    /// generated. The owner's first key auto-activates.
    pub async fn add_key(
        &self,
        owner: Uuid,
        created_by: Uuid,
        pin: &str,
        label: Option<String>,
        material: Option<String>,
    ) -> Result<KeySummary, KeyError> {
        if pin.trim().is_empty() {
            return Err(KeyError::Validation("PIN is required".to_string()));
        }
        let material = match material {
            Some(m) => {
                crypto::KeyMaterial::from_exact(&m).map_err(|_| {
                    KeyError::Validation("key must be exactly 32 characters".to_string())
                })?;
                m
            }
            None => crypto::generate_key(),
        };

        let hash = bcrypt::hash(pin, config::config().security.bcrypt_cost)?;
        let is_first = self.store.count_keys(owner).await? == 0;

        let record = KeyRecord {
            id: Uuid::new_v4(),
            owner,
            hash,
            label,
            active: is_first,
            created_by,
            created_at: Utc::now(),
        };
        let summary = record.summary();
        self.store.insert_key(record, material).await?;

        tracing::info!(owner = %owner, key_id = %summary.id, active = summary.active, "added decryption key");
        Ok(summary)
    }

    /// All keys for an owner, newest first. Hashes and key material never
    /// leave the store.
    pub async fn list_keys(&self, owner: Uuid) -> Result<Vec<KeySummary>, KeyError> {
        let keys = self.store.keys_for_owner(owner).await?;
        Ok(keys.iter().map(KeyRecord::summary).collect())
    }

    /// Make `key_id` the owner's single active key.
    pub async fn activate(&self, owner: Uuid, key_id: Uuid) -> Result<(), KeyError> {
        self.store.activate_key(owner, key_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => KeyError::NotFound,
            other => KeyError::Store(other),
        })?;
        tracing::info!(owner = %owner, key_id = %key_id, "activated decryption key");
        Ok(())
    }

    /// Remove a key. Deleting the active key is allowed and leaves the
    /// owner unable to encrypt until another key is activated.
    pub async fn delete_key(&self, owner: Uuid, key_id: Uuid) -> Result<(), KeyError> {
        if self.store.delete_key(owner, key_id).await? {
            tracing::info!(owner = %owner, key_id = %key_id, "deleted decryption key");
            Ok(())
        } else {
            Err(KeyError::NotFound)
        }
    }

    /// Compare a candidate PIN against every key of the owner; first match
    /// wins.
    pub async fn verify(&self, owner: Uuid, pin: &str) -> Result<PinVerification, KeyError> {
        for key in self.store.keys_for_owner(owner).await? {
            if bcrypt::verify(pin, &key.hash)? {
                return Ok(PinVerification { matched: true, key_id: Some(key.id) });
            }
        }
        Ok(PinVerification { matched: false, key_id: None })
    }

    /// Decryption gate: a valid PIN yields the matching key id, anything
    /// else is an opaque denial. Callers must not attempt decryption after
    /// a denial.
    pub async fn authorize_decryption(&self, owner: Uuid, pin: &str) -> Result<Uuid, KeyError> {
        match self.verify(owner, pin).await? {
            PinVerification { matched: true, key_id: Some(id) } => Ok(id),
            _ => Err(KeyError::Denied),
        }
    }
}
