//! Document storage boundary.
//!
//! The service layer talks to these traits only. Production wiring uses the
//! Postgres implementation; the test suite uses the in-memory one. Both
//! must uphold the same contracts, most importantly that `activate_key`
//! leaves exactly one active key per owner.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::{KeyRecord, PageAccess, PagePermissions, PageRecord, SalarySlip};
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for decryption key records and their (separately held)
/// symmetric key material.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Insert a key record together with its key material. The two writes
    /// are a single logical operation.
    async fn insert_key(&self, record: KeyRecord, material: String) -> Result<(), StoreError>;

    /// All key records for an owner, newest first.
    async fn keys_for_owner(&self, owner: Uuid) -> Result<Vec<KeyRecord>, StoreError>;

    async fn count_keys(&self, owner: Uuid) -> Result<u64, StoreError>;

    /// Atomically deactivate every key of `owner` and activate `key_id`.
    /// Fails with `NotFound` when the key does not exist under that owner;
    /// there is no intermediate state with zero or two active keys.
    async fn activate_key(&self, owner: Uuid, key_id: Uuid) -> Result<(), StoreError>;

    /// Remove a key record and its material. Returns false when absent.
    /// Does not special-case the active key: deleting it orphans nothing in
    /// the store but leaves the owner unable to encrypt until another key
    /// is activated.
    async fn delete_key(&self, owner: Uuid, key_id: Uuid) -> Result<bool, StoreError>;

    /// The owner's currently active key record, if any.
    async fn active_key(&self, owner: Uuid) -> Result<Option<KeyRecord>, StoreError>;

    /// Symmetric key material for one of the owner's keys. Only the
    /// encryption paths call this; it is never serialized to clients.
    async fn key_material(&self, owner: Uuid, key_id: Uuid) -> Result<Option<String>, StoreError>;
}

/// Persistence for the per-page permission matrix.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn all_pages(&self) -> Result<Vec<PageRecord>, StoreError>;

    async fn page_by_id(&self, page_id: &str) -> Result<Option<PageRecord>, StoreError>;

    /// Insert a new page. Fails with `Conflict` when the page id is taken.
    async fn insert_page(&self, page: PageRecord) -> Result<(), StoreError>;

    /// Upsert one role's level on a page. A missing page is created with
    /// every other role hidden.
    async fn upsert_permission(
        &self,
        page_id: &str,
        role: crate::types::Role,
        level: crate::types::AccessLevel,
    ) -> Result<(), StoreError>;
}

/// Persistence for salary slip documents, partitioned by owner.
#[async_trait]
pub trait SlipStore: Send + Sync {
    async fn insert_slip(&self, slip: SalarySlip) -> Result<(), StoreError>;

    async fn slips_for_owner(&self, owner: Uuid) -> Result<Vec<SalarySlip>, StoreError>;

    async fn slip_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<SalarySlip>, StoreError>;
}
