//! Domain library for the visit counter.
//!
//! This crate holds the domain types, ports (traits), and error definitions.
//! Keep concrete storage backends and HTTP concerns out of this crate; the
//! only adapter here is the in-memory store used for tests and local demos.

use async_trait::async_trait;
use thiserror::Error;

/// The integer recorded for one page visit.
///
/// The original page draws uniformly from a small fixed range; the newtype
/// enforces that range at construction so stores never see an out-of-range
/// value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisitId(i32);

impl VisitId {
    /// Smallest valid visit id.
    pub const MIN: i32 = 1;
    /// Largest valid visit id.
    pub const MAX: i32 = 50;

    pub fn new(value: i32) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::OutOfRange(value))
        }
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// Storage port for the `test` table.
///
/// Implementations back onto PostgreSQL in production and an in-memory map in
/// tests. All three operations mirror the SQL the page issues; none of them
/// retries or recovers — errors propagate to the caller.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Create the `test` table if it does not exist yet. Idempotent; the
    /// result of the statement is not consumed.
    async fn ensure_schema(&self) -> Result<(), CoreError>;

    /// Insert one row inside a transaction and commit. No isolation
    /// guarantees beyond the backend's default; concurrent writers may
    /// interleave arbitrarily.
    async fn record_visit(&self, id: VisitId) -> Result<(), CoreError>;

    /// Scalar `count(*)` over the table.
    async fn count_visits(&self) -> Result<u64, CoreError>;
}

/// Source of visit ids; uniform-random in production, fixed in tests.
pub trait VisitIdSource: Send + Sync {
    fn next_id(&self) -> VisitId;
}

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("visit id {0} outside [{min}, {max}]", min = VisitId::MIN, max = VisitId::MAX)]
    OutOfRange(i32),
    #[error("store error: {0}")]
    Store(String),
}

pub mod adapters;
pub mod page;
pub mod random;
pub mod service;
