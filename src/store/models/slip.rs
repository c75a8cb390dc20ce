use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A salary slip document. Every component field value is stored encrypted
/// (`<key-id>:<b64 iv>:<b64 ct>`); only the decrypt endpoint ever sees
/// plaintext amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalarySlip {
    pub id: Uuid,
    pub owner: Uuid,
    pub employee_id: Uuid,
    pub fields: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}
