use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored decryption key record.
///
/// Holds the bcrypt hash of the gating PIN, never the symmetric key itself.
/// Key material lives in a separate store reachable only through the
/// encryption paths.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KeyRecord {
    pub id: Uuid,
    pub owner: Uuid,
    #[serde(skip_serializing)]
    pub hash: String,
    pub label: Option<String>,
    pub active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Client-facing projection of a key record: no hash, no key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySummary {
    pub id: Uuid,
    pub label: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl KeyRecord {
    pub fn summary(&self) -> KeySummary {
        KeySummary {
            id: self.id,
            label: self.label.clone(),
            active: self.active,
            created_at: self.created_at,
        }
    }
}
