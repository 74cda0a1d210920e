//! Test id source — deterministic `EventIdSource` implementation for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use drillsim_core::ids::EventIdSource;
use uuid::Uuid;

/// An id source that yields a reproducible monotonic sequence. The `n`-th id
/// is always the same for a given seed, so event batches produced during a
/// test run can be compared against a replay byte for byte.
#[derive(Debug)]
pub struct SequenceEventIds {
    seed: u64,
    counter: AtomicU64,
}

impl SequenceEventIds {
    /// Create a new sequence starting from the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            counter: AtomicU64::new(0),
        }
    }

    /// Returns the id that position `n` in the sequence produces, without
    /// advancing the counter. Lets assertions name expected ids directly.
    #[must_use]
    pub fn id_at(&self, n: u64) -> Uuid {
        Uuid::from_u64_pair(self.seed, n)
    }
}

impl Default for SequenceEventIds {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EventIdSource for SequenceEventIds {
    fn next_id(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Uuid::from_u64_pair(self.seed, n)
    }
}
