//! Per-creator generation tracking for cache-keyed reception (§4.3).
//!
//! Each input port remembers, per upstream creator, the `(executionCounter,
//! iteration)` pair of the last object it admitted — [`Metadata::generation`]
//! supplies that same ordering key.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ProtocolError;

/// What a module should do with a just-admitted object.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Admission {
    /// Process the object; no cached derivation from this creator survives
    /// it, so any per-creator cache entries should be evicted first.
    AdmitAndEvict,
    /// Process the object; nothing from this creator is stale.
    Admit,
}

/// Tracks, per `(creator)`, the newest generation seen on one input port.
#[derive(Default)]
pub struct GenerationTracker {
    last_seen: Mutex<HashMap<i32, (i32, i32)>>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        GenerationTracker::default()
    }

    /// Decides whether an object with `generation` from `creator` should be
    /// admitted, and whether admitting it implies evicting stale cached
    /// derivations from that creator (§4.3 cache-keyed reception).
    pub fn admit(&self, creator: i32, generation: (i32, i32)) -> Result<Admission, ProtocolError> {
        let mut last_seen = self.last_seen.lock().unwrap();
        match last_seen.get(&creator).copied() {
            None => {
                last_seen.insert(creator, generation);
                Ok(Admission::Admit)
            }
            Some(prev) if generation > prev => {
                last_seen.insert(creator, generation);
                debug!("generation advanced for creator {creator}: {prev:?} -> {generation:?}, evicting stale cache");
                Ok(Admission::AdmitAndEvict)
            }
            Some(prev) if generation == prev => Ok(Admission::Admit),
            Some(prev) => {
                warn!("dropping outdated object from creator {creator}: {generation:?} <= {prev:?}");
                Err(ProtocolError::OutdatedObject { creator, generation, last_seen: prev })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_object_from_a_creator_is_admitted_without_eviction() {
        let tracker = GenerationTracker::new();
        assert_eq!(tracker.admit(1, (0, 0)).unwrap(), Admission::Admit);
    }

    #[test]
    fn higher_execution_counter_admits_and_evicts() {
        let tracker = GenerationTracker::new();
        tracker.admit(1, (0, 0)).unwrap();
        assert_eq!(tracker.admit(1, (1, 0)).unwrap(), Admission::AdmitAndEvict);
    }

    #[test]
    fn higher_iteration_within_same_counter_admits_and_evicts() {
        let tracker = GenerationTracker::new();
        tracker.admit(1, (3, 0)).unwrap();
        assert_eq!(tracker.admit(1, (3, 1)).unwrap(), Admission::AdmitAndEvict);
    }

    #[test]
    fn same_generation_admits_without_eviction() {
        let tracker = GenerationTracker::new();
        tracker.admit(1, (3, 1)).unwrap();
        assert_eq!(tracker.admit(1, (3, 1)).unwrap(), Admission::Admit);
    }

    #[test]
    fn regressed_generation_is_rejected() {
        let tracker = GenerationTracker::new();
        tracker.admit(1, (3, 1)).unwrap();
        let err = tracker.admit(1, (3, 0)).unwrap_err();
        assert!(matches!(err, ProtocolError::OutdatedObject { creator: 1, .. }));
    }

    #[test]
    fn creators_are_tracked_independently() {
        let tracker = GenerationTracker::new();
        tracker.admit(1, (5, 0)).unwrap();
        assert_eq!(tracker.admit(2, (0, 0)).unwrap(), Admission::Admit);
    }
}
