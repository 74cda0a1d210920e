//! Drillsim Core — shared abstractions.
//!
//! This crate defines the injected determinism hooks (clock, event-id
//! source) and the durable event record that all drillsim crates depend on.
//! It contains no engine logic.

pub mod clock;
pub mod event;
pub mod ids;
