//! Application storage and number allocation
//!
//! All application rows are written through [`ApplicationStore::allocate_and_store`];
//! no other component writes to the applications table. Allocation and
//! persistence are one logically atomic unit: a number is never reported
//! unless its row committed.

use crate::error::{PersistenceError, Result};
use crate::models::StoredApplication;
use admit_protocol::ApplicationRecord;
use chrono::Utc;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{debug, warn};

/// Initial insert plus three retries with fresh randomness
const TEMPORAL_ATTEMPTS: usize = 4;

/// How application numbers are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingStrategy {
    /// `PREFIX-<start_year>-<start_month>-<seq>` where seq is the store's
    /// autoincrement id; the sequence itself proves uniqueness
    Sequence,
    /// `PREFIX-<YYYYMMDD-HHMMSS>-<rand>` at UTC second granularity; the
    /// UNIQUE constraint plus bounded retry covers the collision window
    Temporal,
}

/// Repository for application rows
pub struct ApplicationStore {
    pool: SqlitePool,
    prefix: String,
    strategy: NumberingStrategy,
}

impl ApplicationStore {
    /// Create a new application store
    pub fn new(pool: SqlitePool, prefix: impl Into<String>, strategy: NumberingStrategy) -> Self {
        Self {
            pool,
            prefix: prefix.into(),
            strategy,
        }
    }

    /// Allocate a unique application number and persist the record under it.
    ///
    /// Atomic with respect to concurrent callers: no two calls ever observe
    /// or produce the same number, and a failure after number derivation
    /// rolls the row back rather than leaking the number.
    pub async fn allocate_and_store(
        &self,
        record: &ApplicationRecord,
        client_id: Option<&str>,
    ) -> Result<String> {
        let number = match self.strategy {
            NumberingStrategy::Sequence => self.insert_sequence(record, client_id).await?,
            NumberingStrategy::Temporal => self.insert_temporal(record, client_id).await?,
        };

        debug!(application_number = %number, "application stored");
        Ok(number)
    }

    /// Sequence strategy: insert a row without a number, derive the number
    /// from the autoincrement id, and fill it in, all in one transaction.
    async fn insert_sequence(
        &self,
        record: &ApplicationRecord,
        client_id: Option<&str>,
    ) -> Result<String> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO applications
                (application_number, name, address, qualifications, course,
                 start_year, start_month, client_id, submitted_at)
            VALUES (NULL, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.name)
        .bind(&record.address)
        .bind(&record.qualifications)
        .bind(&record.course)
        .bind(record.start_year)
        .bind(i32::from(record.start_month))
        .bind(client_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let seq = result.last_insert_rowid();
        let number = format!(
            "{}-{:04}-{:02}-{:06}",
            self.prefix, record.start_year, record.start_month, seq
        );

        sqlx::query("UPDATE applications SET application_number = ? WHERE id = ?")
            .bind(&number)
            .bind(seq)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(number)
    }

    /// Temporal strategy: derive from timestamp + random suffix and lean on
    /// the UNIQUE constraint, retrying with fresh randomness on collision.
    async fn insert_temporal(
        &self,
        record: &ApplicationRecord,
        client_id: Option<&str>,
    ) -> Result<String> {
        for attempt in 1..=TEMPORAL_ATTEMPTS {
            let number = self.temporal_number();
            match self.insert_with_number(&number, record, client_id).await {
                Ok(()) => return Ok(number),
                Err(PersistenceError::Database(e)) if is_unique_violation(&e) => {
                    warn!(
                        application_number = %number,
                        attempt,
                        "application number collision, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(PersistenceError::Allocation(format!(
            "no unique application number after {TEMPORAL_ATTEMPTS} attempts"
        )))
    }

    fn temporal_number(&self) -> String {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
        format!("{}-{}-{:04}", self.prefix, stamp, suffix)
    }

    pub(crate) async fn insert_with_number(
        &self,
        number: &str,
        record: &ApplicationRecord,
        client_id: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO applications
                (application_number, name, address, qualifications, course,
                 start_year, start_month, client_id, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(number)
        .bind(&record.name)
        .bind(&record.address)
        .bind(&record.qualifications)
        .bind(&record.course)
        .bind(record.start_year)
        .bind(i32::from(record.start_month))
        .bind(client_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a stored application by its number
    pub async fn find_by_number(&self, number: &str) -> Result<Option<StoredApplication>> {
        Ok(sqlx::query_as::<_, StoredApplication>(
            "SELECT * FROM applications WHERE application_number = ?",
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Count stored applications
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM applications")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
