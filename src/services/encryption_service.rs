//! Owner-scoped field encryption.
//!
//! The active key is read from the store on every operation. There is
//! deliberately no in-process cache: a cached key goes stale the moment
//! another request activates a sibling, and encrypting with a stale key
//! while decrypting with the fresh one corrupts data invisibly.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::crypto::{self, CryptoError, KeyMaterial};
use crate::store::{KeyStore, StoreError};

#[derive(Debug, Error)]
pub enum EncryptionError {
    /// Encryption was requested but the owner has no active key. The write
    /// must fail; plaintext is never stored as a fallback.
    #[error("no active encryption key")]
    NoActiveKey,

    /// A key record exists but its material is missing from the store.
    #[error("key material unavailable")]
    MaterialMissing,

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct EncryptionService {
    store: Arc<dyn KeyStore>,
}

impl EncryptionService {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Encrypt a scalar value under the owner's active key, tagging the
    /// output with the key id so rotation never orphans it.
    pub async fn encrypt_for_owner(
        &self,
        owner: Uuid,
        value: &str,
    ) -> Result<String, EncryptionError> {
        let active = self
            .store
            .active_key(owner)
            .await?
            .ok_or(EncryptionError::NoActiveKey)?;
        let key = self.load_material(owner, active.id).await?;
        Ok(crypto::tag_key(active.id, &crypto::encrypt_field(value, &key)))
    }

    /// Decrypt an encoded field for an owner.
    ///
    /// Key-id-tagged fields resolve the exact key that produced them, so
    /// data written before a rotation stays readable. Untagged legacy
    /// fields fall back to the currently active key.
    pub async fn decrypt_for_owner(
        &self,
        owner: Uuid,
        field: &str,
    ) -> Result<String, EncryptionError> {
        let (tag, token) = crypto::split_tag(field);
        let key_id = match tag {
            Some(id) => id,
            None => {
                self.store
                    .active_key(owner)
                    .await?
                    .ok_or(EncryptionError::NoActiveKey)?
                    .id
            }
        };
        // a tag pointing at a foreign or deleted key reads as a decryption
        // failure, not as a hint that the key exists elsewhere
        let key = match self.store.key_material(owner, key_id).await? {
            Some(material) => {
                KeyMaterial::from_exact(&material).map_err(|_| CryptoError::Decrypt)?
            }
            None => return Err(CryptoError::Decrypt.into()),
        };
        Ok(crypto::decrypt_field(token, &key)?)
    }

    async fn load_material(
        &self,
        owner: Uuid,
        key_id: Uuid,
    ) -> Result<KeyMaterial, EncryptionError> {
        let material = self
            .store
            .key_material(owner, key_id)
            .await?
            .ok_or(EncryptionError::MaterialMissing)?;
        KeyMaterial::from_exact(&material).map_err(|_| EncryptionError::MaterialMissing)
    }
}
