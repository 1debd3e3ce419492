//! Data models for the persistence layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted application row.
///
/// Rows are written exactly once by the allocation transaction and never
/// updated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredApplication {
    /// Allocation sequence id
    pub id: i64,
    /// Unique application number, the record's permanent reference
    pub application_number: String,
    /// Applicant full name
    pub name: String,
    /// Postal address
    pub address: Option<String>,
    /// Educational qualifications
    pub qualifications: String,
    /// Course applied for
    pub course: String,
    /// Intended start year
    pub start_year: i32,
    /// Intended start month
    pub start_month: i32,
    /// Client-supplied identifier, logging/traceability only
    pub client_id: Option<String>,
    /// UTC submission timestamp
    pub submitted_at: DateTime<Utc>,
}
