//! In-memory store used by the test suite and local experimentation.
//!
//! A single `RwLock` over all collections makes every mutation trivially
//! atomic, which is exactly the guarantee `activate_key` needs.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::models::{KeyRecord, PageRecord, SalarySlip};
use crate::store::{KeyStore, PageStore, SlipStore, StoreError};
use crate::types::{AccessLevel, Role};

#[derive(Default)]
struct Collections {
    keys: HashMap<Uuid, KeyRecord>,
    key_material: HashMap<Uuid, String>,
    pages: BTreeMap<String, PageRecord>,
    slips: HashMap<Uuid, SalarySlip>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn insert_key(&self, record: KeyRecord, material: String) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.key_material.insert(record.id, material);
        inner.keys.insert(record.id, record);
        Ok(())
    }

    async fn keys_for_owner(&self, owner: Uuid) -> Result<Vec<KeyRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut keys: Vec<KeyRecord> = inner
            .keys
            .values()
            .filter(|k| k.owner == owner)
            .cloned()
            .collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    async fn count_keys(&self, owner: Uuid) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.keys.values().filter(|k| k.owner == owner).count() as u64)
    }

    async fn activate_key(&self, owner: Uuid, key_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.keys.get(&key_id) {
            Some(k) if k.owner == owner => {}
            _ => return Err(StoreError::NotFound(format!("key {key_id}"))),
        }
        for key in inner.keys.values_mut().filter(|k| k.owner == owner) {
            key.active = key.id == key_id;
        }
        Ok(())
    }

    async fn delete_key(&self, owner: Uuid, key_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.keys.get(&key_id) {
            Some(k) if k.owner == owner => {
                inner.keys.remove(&key_id);
                inner.key_material.remove(&key_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn active_key(&self, owner: Uuid) -> Result<Option<KeyRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .keys
            .values()
            .find(|k| k.owner == owner && k.active)
            .cloned())
    }

    async fn key_material(&self, owner: Uuid, key_id: Uuid) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().await;
        match inner.keys.get(&key_id) {
            Some(k) if k.owner == owner => Ok(inner.key_material.get(&key_id).cloned()),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn all_pages(&self) -> Result<Vec<PageRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.pages.values().cloned().collect())
    }

    async fn page_by_id(&self, page_id: &str) -> Result<Option<PageRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.pages.get(page_id).cloned())
    }

    async fn insert_page(&self, page: PageRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.pages.contains_key(&page.page_id) {
            return Err(StoreError::Conflict(format!("page {}", page.page_id)));
        }
        inner.pages.insert(page.page_id.clone(), page);
        Ok(())
    }

    async fn upsert_permission(
        &self,
        page_id: &str,
        role: Role,
        level: AccessLevel,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let page = inner.pages.entry(page_id.to_string()).or_insert_with(|| PageRecord {
            page_id: page_id.to_string(),
            name: page_id.to_string(),
            permissions: Default::default(),
        });
        page.permissions.set(role, level);
        Ok(())
    }
}

#[async_trait]
impl SlipStore for MemoryStore {
    async fn insert_slip(&self, slip: SalarySlip) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.slips.insert(slip.id, slip);
        Ok(())
    }

    async fn slips_for_owner(&self, owner: Uuid) -> Result<Vec<SalarySlip>, StoreError> {
        let inner = self.inner.read().await;
        let mut slips: Vec<SalarySlip> = inner
            .slips
            .values()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect();
        slips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(slips)
    }

    async fn slip_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<SalarySlip>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.slips.get(&id).filter(|s| s.owner == owner).cloned())
    }
}
