//! Runtime layer: the state machine that drives sessions.

pub mod runner;
