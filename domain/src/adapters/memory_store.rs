use std::sync::Mutex;

use async_trait::async_trait;

use crate::{CoreError, VisitId, VisitStore};

/// Simple in-memory store for tests. Models the lazy schema of the real
/// backend: until `ensure_schema` has run, the "table" does not exist and
/// reads/writes fail the way PostgreSQL reports a missing relation.
pub struct InMemoryStore {
    // None until ensure_schema creates the table.
    inner: Mutex<Option<Vec<VisitId>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Snapshot of all recorded visit ids, for test assertions.
    pub fn visits(&self) -> Result<Vec<VisitId>, CoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        guard
            .clone()
            .ok_or_else(|| CoreError::Store("relation \"test\" does not exist".into()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisitStore for InMemoryStore {
    async fn ensure_schema(&self) -> Result<(), CoreError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        if guard.is_none() {
            *guard = Some(Vec::new());
        }
        Ok(())
    }

    async fn record_visit(&self, id: VisitId) -> Result<(), CoreError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        match guard.as_mut() {
            Some(rows) => {
                rows.push(id);
                Ok(())
            }
            None => Err(CoreError::Store("relation \"test\" does not exist".into())),
        }
    }

    async fn count_visits(&self) -> Result<u64, CoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        match guard.as_ref() {
            Some(rows) => Ok(rows.len() as u64),
            None => Err(CoreError::Store("relation \"test\" does not exist".into())),
        }
    }
}
