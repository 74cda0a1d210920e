//! Engine events.
//!
//! Every step produces an ordered batch of [`EngineEvent`]s — the sole
//! externally durable trace of a session. Events are append-only and never
//! mutated after creation; [`EngineEvent::to_record`] yields the wire row
//! the surrounding system appends to its event store, deduplicated by
//! event id.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use drillsim_core::event::EventRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::scenario::Dimension;
use crate::domain::state::{CriticalFailRecord, SessionStatus};

/// Payload of `SESSION_STARTED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStartedPayload {
    /// Scenario the session runs against.
    pub scenario_id: String,
    /// Scenario content version.
    pub scenario_version: String,
    /// Session start time.
    pub started_at: DateTime<Utc>,
}

/// Payload of `NODE_VIEWED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeViewedPayload {
    /// The node now in view.
    pub node_id: String,
}

/// Payload of `CHOICE_SELECTED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceSelectedPayload {
    /// The decision node.
    pub node_id: String,
    /// The selected choice.
    pub choice_id: String,
}

/// A node-to-node move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMove {
    /// Node moved away from.
    pub from: String,
    /// Node moved to.
    pub to: String,
}

/// `STATE_UPDATED` payload for an info advance: `{"move": {from, to}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveUpdatePayload {
    /// The move performed.
    #[serde(rename = "move")]
    pub moved: NodeMove,
}

/// `STATE_UPDATED` payload for a choice's effects. Emitted even when the
/// delta and flags are empty, so the audit trail covers every choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectsUpdatePayload {
    /// The applied score delta (may be empty).
    pub score_delta: BTreeMap<Dimension, i32>,
    /// The choice's declared flags, as declared (state-side accumulation is
    /// deduplicated separately).
    pub flags_added: Vec<String>,
    /// The decision node.
    pub at_node_id: String,
    /// The selected choice.
    pub choice_id: String,
}

/// Payload of `STATE_UPDATED`, which has two wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateUpdatedPayload {
    /// An info-node move.
    Moved(MoveUpdatePayload),
    /// A choice's effects.
    Effects(EffectsUpdatePayload),
}

/// Payload of `RULE_TRIGGERED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTriggeredPayload {
    /// The critical-fail rule that fired.
    pub rule_id: String,
    /// Reason text from the rule.
    pub reason: String,
    /// Decision node where it fired.
    pub at_node_id: String,
    /// Triggering choice.
    pub choice_id: String,
}

/// Final score snapshot carried by `SESSION_COMPLETED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalSnapshot {
    /// Per-dimension scores at completion.
    pub dimension_scores: BTreeMap<Dimension, i32>,
    /// Weighted overall score.
    pub overall_score: i32,
    /// Maturity tier id for the overall score.
    pub maturity_level: String,
    /// Every critical-fail rule firing of the session.
    pub critical_fails: Vec<CriticalFailRecord>,
}

/// Payload of `SESSION_COMPLETED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCompletedPayload {
    /// Terminal session status.
    pub status: SessionStatus,
    /// Final score snapshot.
    #[serde(rename = "final")]
    pub final_snapshot: FinalSnapshot,
}

/// Payload of `SESSION_ABORTED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAbortedPayload {
    /// Node the session sat at when aborted.
    pub at_node_id: String,
    /// Caller-supplied reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEventKind {
    /// A session started.
    SessionStarted(SessionStartedPayload),
    /// A node came into view.
    NodeViewed(NodeViewedPayload),
    /// A choice was selected on a decision node.
    ChoiceSelected(ChoiceSelectedPayload),
    /// Session state changed (move or choice effects).
    StateUpdated(StateUpdatedPayload),
    /// A critical-fail rule fired.
    RuleTriggered(RuleTriggeredPayload),
    /// The session reached a terminal outcome and was scored.
    SessionCompleted(SessionCompletedPayload),
    /// The caller aborted the session.
    SessionAborted(SessionAbortedPayload),
}

/// An immutable engine event: id, timestamp, and typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    /// Event id from the injected id source; stable per logical event so
    /// the store can deduplicate retried appends.
    pub event_id: Uuid,
    /// Event creation time.
    pub ts: DateTime<Utc>,
    /// Typed payload.
    pub kind: EngineEventKind,
}

impl EngineEvent {
    /// Returns the wire event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match &self.kind {
            EngineEventKind::SessionStarted(_) => "SESSION_STARTED",
            EngineEventKind::NodeViewed(_) => "NODE_VIEWED",
            EngineEventKind::ChoiceSelected(_) => "CHOICE_SELECTED",
            EngineEventKind::StateUpdated(_) => "STATE_UPDATED",
            EngineEventKind::RuleTriggered(_) => "RULE_TRIGGERED",
            EngineEventKind::SessionCompleted(_) => "SESSION_COMPLETED",
            EngineEventKind::SessionAborted(_) => "SESSION_ABORTED",
        }
    }

    /// Serializes the payload to its JSON wire shape.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        let payload = match &self.kind {
            EngineEventKind::SessionStarted(p) => serde_json::to_value(p),
            EngineEventKind::NodeViewed(p) => serde_json::to_value(p),
            EngineEventKind::ChoiceSelected(p) => serde_json::to_value(p),
            EngineEventKind::StateUpdated(p) => serde_json::to_value(p),
            EngineEventKind::RuleTriggered(p) => serde_json::to_value(p),
            EngineEventKind::SessionCompleted(p) => serde_json::to_value(p),
            EngineEventKind::SessionAborted(p) => serde_json::to_value(p),
        };
        payload.expect("engine event payload serialization is infallible")
    }

    /// Converts to the append-ready store row.
    #[must_use]
    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            event_id: self.event_id,
            ts: self.ts,
            event_type: self.event_type().to_owned(),
            payload: self.to_payload(),
        }
    }
}
