//! postgres-adapter — PostgreSQL implementation of the VisitStore port.
//!
//! Purpose
//! - Back the visit counter with a real database; implements the
//!   `VisitStore` trait from the `domain` crate.
//! - Reproduces the page's SQL surface in effect: create-table-if-absent,
//!   transactional insert, scalar count.
//!
//! Notes
//! - Uses `sqlx::PgPool` with a lazily created pool, so a missing or
//!   unreachable database surfaces as an error on the first request rather
//!   than at startup.
//! - No retry or fallback on any path; errors map into `CoreError::Store`.

use async_trait::async_trait;
use domain::{CoreError, VisitId, VisitStore};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// PostgreSQL-backed visit store.
#[derive(Debug)]
pub struct PgVisitStore {
    pool: PgPool,
}

impl PgVisitStore {
    /// Create a store over a lazily connected pool. Fails only on an
    /// unparsable URL; connectivity problems show up on first use.
    pub fn connect_lazy(database_url: &str) -> Result<Self, CoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)
            .map_err(map_pgerr)?;
        Ok(Self { pool })
    }
}

fn map_pgerr<E: std::fmt::Display>(e: E) -> CoreError {
    CoreError::Store(format!("postgres error: {e}"))
}

#[async_trait]
impl VisitStore for PgVisitStore {
    async fn ensure_schema(&self) -> Result<(), CoreError> {
        sqlx::query("CREATE TABLE IF NOT EXISTS test (id integer)")
            .execute(&self.pool)
            .await
            .map_err(map_pgerr)?;
        Ok(())
    }

    async fn record_visit(&self, id: VisitId) -> Result<(), CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_pgerr)?;
        sqlx::query("INSERT INTO test(id) VALUES ($1)")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(map_pgerr)?;
        tx.commit().await.map_err(map_pgerr)?;
        Ok(())
    }

    async fn count_visits(&self) -> Result<u64, CoreError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM test")
            .fetch_one(&self.pool)
            .await
            .map_err(map_pgerr)?;
        Ok(count.max(0) as u64)
    }
}
