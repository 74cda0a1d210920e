//! Drillsim — scenario execution engine.
//!
//! A deterministic state machine that runs a trainee through a branching
//! safety-drill scenario, tracks a five-dimension competency score, detects
//! rule-based critical failures, and emits an auditable event batch at every
//! state transition. Pure and synchronous: no I/O, no persistence, no
//! locking — the surrounding system owns those concerns and serializes
//! steps per session.

pub mod domain;
pub mod error;
pub mod runtime;
