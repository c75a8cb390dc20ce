use std::sync::Arc;

use crate::services::{EncryptionService, KeyService, PermissionService, SlipService};
use crate::store::{KeyStore, PageStore, SlipStore};

/// Shared handler state: the service layer over whichever store backs the
/// process (Postgres in production, in-memory in tests).
#[derive(Clone)]
pub struct AppState {
    pub keys: KeyService,
    pub encryption: EncryptionService,
    pub permissions: PermissionService,
    pub slips: SlipService,
}

impl AppState {
    pub fn from_stores(
        key_store: Arc<dyn KeyStore>,
        page_store: Arc<dyn PageStore>,
        slip_store: Arc<dyn SlipStore>,
    ) -> Self {
        let keys = KeyService::new(key_store.clone());
        let encryption = EncryptionService::new(key_store);
        let permissions = PermissionService::new(page_store);
        let slips = SlipService::new(slip_store, encryption.clone(), keys.clone());
        Self {
            keys,
            encryption,
            permissions,
            slips,
        }
    }
}
