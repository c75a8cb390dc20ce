//! Page permission matrix.
//!
//! The per-page matrix is the canonical representation; the per-role page
//! list is derived from it on read. This component only stores and
//! retrieves levels - enforcement (including the super-admin bypass) is the
//! caller's concern.

use std::sync::Arc;

use thiserror::Error;

use crate::store::models::{PageAccess, PagePermissions, PageRecord};
use crate::store::{PageStore, StoreError};
use crate::types::{AccessLevel, Role};

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("invalid permission level: {0}")]
    InvalidLevel(String),

    #[error("page not found")]
    NotFound,

    #[error("page already exists: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn PageStore>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn PageStore>) -> Self {
        Self { store }
    }

    /// Level for one role on one page. Unknown pages and unset roles read
    /// as hidden (fail closed).
    pub async fn get_permission(
        &self,
        page_id: &str,
        role: Role,
    ) -> Result<AccessLevel, PermissionError> {
        Ok(self
            .store
            .page_by_id(page_id)
            .await?
            .map(|p| p.permissions.level(role))
            .unwrap_or_default())
    }

    /// Set one role's level on a page, creating the page row when missing.
    /// Role and level arrive as strings from the API surface and are
    /// validated here.
    pub async fn set_permission(
        &self,
        page_id: &str,
        role: &str,
        level: &str,
    ) -> Result<(), PermissionError> {
        let role: Role = role
            .parse()
            .map_err(|_| PermissionError::InvalidRole(role.to_string()))?;
        let level: AccessLevel = level
            .parse()
            .map_err(|_| PermissionError::InvalidLevel(level.to_string()))?;
        self.store.upsert_permission(page_id, role, level).await?;
        Ok(())
    }

    /// Every known page projected to the given role's level.
    pub async fn list_for_role(&self, role: Role) -> Result<Vec<PageAccess>, PermissionError> {
        let pages = self.store.all_pages().await?;
        Ok(pages
            .into_iter()
            .map(|p| PageAccess {
                level: p.permissions.level(role),
                page_id: p.page_id,
                name: p.name,
            })
            .collect())
    }

    /// Derived read-only view: the page ids a role may see at all.
    pub async fn pages_for_role(&self, role: Role) -> Result<Vec<String>, PermissionError> {
        let pages = self.store.all_pages().await?;
        Ok(pages
            .into_iter()
            .filter(|p| p.permissions.level(role) != AccessLevel::Hidden)
            .map(|p| p.page_id)
            .collect())
    }

    pub async fn all_pages(&self) -> Result<Vec<PageRecord>, PermissionError> {
        Ok(self.store.all_pages().await?)
    }

    pub async fn get_page(&self, page_id: &str) -> Result<PageRecord, PermissionError> {
        self.store
            .page_by_id(page_id)
            .await?
            .ok_or(PermissionError::NotFound)
    }

    pub async fn create_page(
        &self,
        page_id: String,
        name: String,
        permissions: Option<PagePermissions>,
    ) -> Result<PageRecord, PermissionError> {
        let page = PageRecord {
            page_id,
            name,
            permissions: permissions.unwrap_or_default(),
        };
        self.store.insert_page(page.clone()).await.map_err(|e| match e {
            StoreError::Conflict(_) => PermissionError::Conflict(page.page_id.clone()),
            other => PermissionError::Store(other),
        })?;
        Ok(page)
    }
}
