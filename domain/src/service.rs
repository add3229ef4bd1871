//! Application service behind the page.

use crate::{CoreError, VisitIdSource, VisitStore};

/// Orchestrates one page view against the store.
///
/// Generic over store and id source so the HTTP layer can run against
/// PostgreSQL in production and the in-memory store in tests. The flow is a
/// straight line — ensure schema, insert, count — with no branching, retries,
/// or recovery; any store error propagates to the caller.
pub struct VisitService<S: VisitStore, G: VisitIdSource> {
    store: S,
    ids: G,
}

impl<S: VisitStore, G: VisitIdSource> VisitService<S, G> {
    pub fn new(store: S, ids: G) -> Self {
        Self { store, ids }
    }

    /// Handle one page view: lazily create the table, record a fresh random
    /// visit row, and return the total row count afterwards.
    pub async fn record_and_count(&self) -> Result<u64, CoreError> {
        self.store.ensure_schema().await?;
        self.store.record_visit(self.ids.next_id()).await?;
        self.store.count_visits().await
    }

    /// Current row count without recording a visit.
    pub async fn count(&self) -> Result<u64, CoreError> {
        self.store.count_visits().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::InMemoryStore;
    use crate::random::SequentialVisitIdSource;
    use crate::VisitId;

    fn svc() -> VisitService<InMemoryStore, SequentialVisitIdSource> {
        VisitService::new(InMemoryStore::new(), SequentialVisitIdSource::new())
    }

    #[tokio::test]
    async fn first_view_creates_table_and_counts_one() {
        let svc = svc();
        let count = svc.record_and_count().await.expect("first view");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn each_view_grows_count_by_one() {
        let svc = svc();
        for expected in 1..=10u64 {
            let before = if expected == 1 {
                0
            } else {
                svc.count().await.expect("count")
            };
            let after = svc.record_and_count().await.expect("view");
            assert_eq!(after, before + 1);
        }
    }

    #[tokio::test]
    async fn tenth_view_counts_ten() {
        let svc = svc();
        let mut last = 0;
        for _ in 0..10 {
            last = svc.record_and_count().await.expect("view");
        }
        assert_eq!(last, 10);
    }

    #[tokio::test]
    async fn recorded_ids_stay_in_range() {
        let store = InMemoryStore::new();
        let svc = VisitService::new(store, crate::random::RandomVisitIdSource::new());
        for _ in 0..100 {
            svc.record_and_count().await.expect("view");
        }
        // Reach into the store the tests own
        let ids = svc.store.visits().expect("visits");
        assert_eq!(ids.len(), 100);
        assert!(ids
            .iter()
            .all(|id| (VisitId::MIN..=VisitId::MAX).contains(&id.get())));
    }

    #[tokio::test]
    async fn count_before_schema_fails() {
        let svc = svc();
        let err = svc.count().await.unwrap_err();
        assert!(matches!(err, CoreError::Store(_)));
    }
}
