//! Durable event record.
//!
//! The engine hands each step's events to the surrounding system as
//! append-ready records in this shape. The store is expected to deduplicate
//! by `event_id`, so re-sending a batch after a failed delivery is safe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serialized form of a session event — the JSON row the surrounding system
/// appends to its event store.
///
/// Wire shape: `{"eventId", "ts", "type", "payload"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Unique event identifier, assigned at event creation.
    pub event_id: Uuid,
    /// Timestamp of event creation.
    pub ts: DateTime<Utc>,
    /// Event type name, e.g. `SESSION_STARTED`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event-specific payload.
    pub payload: serde_json::Value,
}
