//! Domain layer: the scenario document, its integrity checks, scoring, and
//! the session state and event vocabulary.

pub mod events;
pub mod integrity;
pub mod scenario;
pub mod scoring;
pub mod state;
