//! PostgreSQL-backed reprocessing store
//!
//! The facility-level run lock uses `pg_try_advisory_lock` keyed on a
//! hash of the facility ID, held for the duration of one scheduled
//! pass — this is the `SKIP` overlap policy: a duplicate scheduled
//! firing that can't acquire the lock simply returns without doing
//! anything. The per-order requeue additionally takes a
//! transaction-scoped `pg_advisory_xact_lock` keyed on the order ID so a
//! concurrent manual DLQ resolution for the same order can't race it.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::store::{EligiblePage, ReprocessingError, ReprocessingStore};

#[derive(Clone)]
pub struct PostgresReprocessingStore {
    pool: PgPool,
}

impl PostgresReprocessingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn lock_key(key: &str) -> i64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish() as i64
    }
}

#[async_trait]
impl ReprocessingStore for PostgresReprocessingStore {
    #[instrument(skip(self))]
    async fn fetch_eligible_page(&self, facility_id: &str, page: u32, page_size: u32) -> Result<EligiblePage, ReprocessingError> {
        let offset = (page * page_size) as i64;
        let limit = page_size as i64;

        let rows = sqlx::query(
            r#"
            SELECT order_id FROM retry_metadata
            WHERE facility_id = $1
              AND failure_code = ANY($2)
              AND attempt_count < max_attempts
            ORDER BY order_id
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(facility_id)
        .bind(crate::store::ELIGIBLE_FAILURE_CLASSES)
        .bind(offset)
        .bind(limit + 1)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReprocessingError::Database(e.to_string()))?;

        let has_more = rows.len() as i64 > limit;
        let order_ids = rows
            .into_iter()
            .take(limit as usize)
            .map(|row| row.get::<String, _>("order_id"))
            .collect();

        Ok(EligiblePage { order_ids, has_more })
    }

    #[instrument(skip(self))]
    async fn try_acquire_run_lock(&self, facility_id: &str, run_id: Uuid) -> Result<bool, ReprocessingError> {
        let key = Self::lock_key(facility_id);
        let row = sqlx::query("SELECT pg_try_advisory_lock($1)")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ReprocessingError::Database(e.to_string()))?;

        let acquired: bool = row.get(0);
        if acquired {
            info!(%facility_id, %run_id, "acquired reprocessing run lock");
        } else {
            warn!(%facility_id, %run_id, "reprocessing run already in progress, skipping (SKIP overlap policy)");
        }
        Ok(acquired)
    }

    #[instrument(skip(self))]
    async fn release_run_lock(&self, facility_id: &str, _run_id: Uuid) -> Result<(), ReprocessingError> {
        let key = Self::lock_key(facility_id);
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| ReprocessingError::Database(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn requeue_order(&self, order_id: &str) -> Result<(), ReprocessingError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ReprocessingError::Database(e.to_string()))?;

        let key = Self::lock_key(order_id);
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(key)
            .execute(&mut *tx)
            .await
            .map_err(|e| ReprocessingError::Database(e.to_string()))?;

        let exists = sqlx::query("SELECT 1 FROM orders WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| ReprocessingError::Database(e.to_string()))?;

        if exists.is_none() {
            return Err(ReprocessingError::OrderNotFound(order_id.to_string()));
        }

        sqlx::query("UPDATE orders SET status = 'received', wave_id = NULL WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ReprocessingError::Database(e.to_string()))?;

        sqlx::query("UPDATE retry_metadata SET attempt_count = attempt_count + 1 WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ReprocessingError::Database(e.to_string()))?;

        tx.commit().await.map_err(|e| ReprocessingError::Database(e.to_string()))?;

        info!(%order_id, "reset order aggregate for requeue");
        Ok(())
    }
}
