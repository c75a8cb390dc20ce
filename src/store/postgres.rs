//! Postgres-backed store.
//!
//! Key material lives in its own table (`key_material`) keyed by the record
//! id, so listing keys never selects it. Activation runs as a single UPDATE
//! inside a transaction: no window with zero or two active keys per owner.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config;
use crate::store::models::{KeyRecord, PagePermissions, PageRecord, SalarySlip};
use crate::store::{KeyStore, PageStore, SlipStore, StoreError};
use crate::types::{AccessLevel, Role};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect using pool settings from the application config.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let db = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(Duration::from_secs(db.connection_timeout))
            .connect(database_url)
            .await?;
        info!("connected database pool");
        Ok(Self { pool })
    }

    /// Create tables on first boot. All writes elsewhere assume these exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS decryption_keys (
                id UUID PRIMARY KEY,
                owner UUID NOT NULL,
                hash TEXT NOT NULL,
                label TEXT,
                active BOOLEAN NOT NULL DEFAULT FALSE,
                created_by UUID NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS decryption_keys_owner_idx ON decryption_keys (owner)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS key_material (
                key_id UUID PRIMARY KEY REFERENCES decryption_keys(id) ON DELETE CASCADE,
                material TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pages (
                page_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                permissions JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS salary_slips (
                id UUID PRIMARY KEY,
                owner UUID NOT NULL,
                employee_id UUID NOT NULL,
                fields JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS salary_slips_owner_idx ON salary_slips (owner)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn page_from_row(row: &sqlx::postgres::PgRow) -> Result<PageRecord, StoreError> {
        let permissions: serde_json::Value = row.try_get("permissions")?;
        let permissions: PagePermissions = serde_json::from_value(permissions)
            .map_err(|e| StoreError::QueryError(format!("bad permissions document: {e}")))?;
        Ok(PageRecord {
            page_id: row.try_get("page_id")?,
            name: row.try_get("name")?,
            permissions,
        })
    }
}

#[async_trait]
impl KeyStore for PgStore {
    async fn insert_key(&self, record: KeyRecord, material: String) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO decryption_keys (id, owner, hash, label, active, created_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.id)
        .bind(record.owner)
        .bind(&record.hash)
        .bind(&record.label)
        .bind(record.active)
        .bind(record.created_by)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query("INSERT INTO key_material (key_id, material) VALUES ($1, $2)")
            .bind(record.id)
            .bind(&material)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn keys_for_owner(&self, owner: Uuid) -> Result<Vec<KeyRecord>, StoreError> {
        let keys = sqlx::query_as::<_, KeyRecord>(
            "SELECT id, owner, hash, label, active, created_by, created_at
             FROM decryption_keys
             WHERE owner = $1
             ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }

    async fn count_keys(&self, owner: Uuid) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM decryption_keys WHERE owner = $1")
                .bind(owner)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn activate_key(&self, owner: Uuid, key_id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM decryption_keys WHERE owner = $1 AND id = $2",
        )
        .bind(owner)
        .bind(key_id)
        .fetch_one(&mut *tx)
        .await?;
        if exists == 0 {
            return Err(StoreError::NotFound(format!("key {key_id}")));
        }
        sqlx::query("UPDATE decryption_keys SET active = (id = $2) WHERE owner = $1")
            .bind(owner)
            .bind(key_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_key(&self, owner: Uuid, key_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM decryption_keys WHERE owner = $1 AND id = $2")
            .bind(owner)
            .bind(key_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn active_key(&self, owner: Uuid) -> Result<Option<KeyRecord>, StoreError> {
        let key = sqlx::query_as::<_, KeyRecord>(
            "SELECT id, owner, hash, label, active, created_by, created_at
             FROM decryption_keys
             WHERE owner = $1 AND active",
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(key)
    }

    async fn key_material(&self, owner: Uuid, key_id: Uuid) -> Result<Option<String>, StoreError> {
        let material: Option<String> = sqlx::query_scalar(
            "SELECT m.material
             FROM key_material m
             JOIN decryption_keys k ON k.id = m.key_id
             WHERE k.owner = $1 AND k.id = $2",
        )
        .bind(owner)
        .bind(key_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(material)
    }
}

#[async_trait]
impl PageStore for PgStore {
    async fn all_pages(&self) -> Result<Vec<PageRecord>, StoreError> {
        let rows = sqlx::query("SELECT page_id, name, permissions FROM pages ORDER BY page_id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::page_from_row).collect()
    }

    async fn page_by_id(&self, page_id: &str) -> Result<Option<PageRecord>, StoreError> {
        let row = sqlx::query("SELECT page_id, name, permissions FROM pages WHERE page_id = $1")
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::page_from_row).transpose()
    }

    async fn insert_page(&self, page: PageRecord) -> Result<(), StoreError> {
        let permissions = serde_json::to_value(&page.permissions)
            .map_err(|e| StoreError::QueryError(e.to_string()))?;
        let result = sqlx::query(
            "INSERT INTO pages (page_id, name, permissions) VALUES ($1, $2, $3)
             ON CONFLICT (page_id) DO NOTHING",
        )
        .bind(&page.page_id)
        .bind(&page.name)
        .bind(permissions)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!("page {}", page.page_id)));
        }
        Ok(())
    }

    async fn upsert_permission(
        &self,
        page_id: &str,
        role: Role,
        level: AccessLevel,
    ) -> Result<(), StoreError> {
        // single-statement upsert keeps concurrent role updates from losing
        // each other's writes
        sqlx::query(
            "INSERT INTO pages (page_id, name, permissions)
             VALUES ($1, $1, jsonb_build_object($2::text, $3::text))
             ON CONFLICT (page_id)
             DO UPDATE SET permissions = pages.permissions || jsonb_build_object($2::text, $3::text)",
        )
        .bind(page_id)
        .bind(role.as_str())
        .bind(level.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SlipStore for PgStore {
    async fn insert_slip(&self, slip: SalarySlip) -> Result<(), StoreError> {
        let fields = serde_json::to_value(&slip.fields)
            .map_err(|e| StoreError::QueryError(e.to_string()))?;
        sqlx::query(
            "INSERT INTO salary_slips (id, owner, employee_id, fields, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(slip.id)
        .bind(slip.owner)
        .bind(slip.employee_id)
        .bind(fields)
        .bind(slip.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn slips_for_owner(&self, owner: Uuid) -> Result<Vec<SalarySlip>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, owner, employee_id, fields, created_at
             FROM salary_slips
             WHERE owner = $1
             ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(slip_from_row).collect()
    }

    async fn slip_by_id(&self, owner: Uuid, id: Uuid) -> Result<Option<SalarySlip>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner, employee_id, fields, created_at
             FROM salary_slips
             WHERE owner = $1 AND id = $2",
        )
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(slip_from_row).transpose()
    }
}

fn slip_from_row(row: &sqlx::postgres::PgRow) -> Result<SalarySlip, StoreError> {
    let fields: serde_json::Value = row.try_get("fields")?;
    let fields = serde_json::from_value(fields)
        .map_err(|e| StoreError::QueryError(format!("bad slip document: {e}")))?;
    Ok(SalarySlip {
        id: row.try_get("id")?,
        owner: row.try_get("owner")?,
        employee_id: row.try_get("employee_id")?,
        fields,
        created_at: row.try_get("created_at")?,
    })
}
