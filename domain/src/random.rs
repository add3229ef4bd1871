//! Visit id generation strategies.

use rand::Rng;

use crate::VisitId;
use crate::VisitIdSource;

/// Uniform-random generator over the full valid range [1, 50].
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomVisitIdSource;

impl RandomVisitIdSource {
    pub fn new() -> Self {
        Self
    }
}

impl VisitIdSource for RandomVisitIdSource {
    fn next_id(&self) -> VisitId {
        let value = rand::rng().random_range(VisitId::MIN..=VisitId::MAX);
        // In range by construction
        VisitId::new(value).unwrap_or_else(|_| VisitId::new(VisitId::MIN).expect("MIN is valid"))
    }
}

/// Deterministic generator cycling MIN..=MAX; used by tests.
#[derive(Debug, Default)]
pub struct SequentialVisitIdSource {
    next: std::sync::atomic::AtomicI32,
}

impl SequentialVisitIdSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisitIdSource for SequentialVisitIdSource {
    fn next_id(&self) -> VisitId {
        let n = self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let span = VisitId::MAX - VisitId::MIN + 1;
        let value = VisitId::MIN + n.rem_euclid(span);
        VisitId::new(value).unwrap_or_else(|_| VisitId::new(VisitId::MIN).expect("MIN is valid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_stay_in_range() {
        let g = RandomVisitIdSource::new();
        for _ in 0..1000 {
            let id = g.next_id().get();
            assert!((VisitId::MIN..=VisitId::MAX).contains(&id));
        }
    }

    #[test]
    fn sequential_cycles_through_range() {
        let g = SequentialVisitIdSource::new();
        assert_eq!(g.next_id().get(), 1);
        assert_eq!(g.next_id().get(), 2);
        for _ in 0..47 {
            g.next_id();
        }
        assert_eq!(g.next_id().get(), 50);
        assert_eq!(g.next_id().get(), 1);
    }
}
