//! Shared test doubles for the drillsim scenario engine.

mod clock;
mod ids;

pub use clock::FixedClock;
pub use ids::SequenceEventIds;
