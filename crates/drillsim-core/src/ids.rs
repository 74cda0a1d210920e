//! Event-id source abstraction for determinism.
//!
//! Event ids are assigned once, when an event is created, and never
//! regenerated afterwards — a retried delivery of the same batch carries the
//! same ids, which is what lets the surrounding store deduplicate appends.
//! The source is injected so tests and replay tooling can produce
//! reproducible id sequences.

use uuid::Uuid;

/// Abstraction over event-id generation.
pub trait EventIdSource: Send + Sync {
    /// Returns the id for the next event to be created.
    fn next_id(&self) -> Uuid;
}

/// Production id source backed by random UUIDv4 values.
#[derive(Debug, Clone, Copy)]
pub struct RandomEventIds;

impl EventIdSource for RandomEventIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
