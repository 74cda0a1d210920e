//! Session state.
//!
//! One [`SessionState`] per run of a trainee through a scenario. The caller
//! owns it; the runner mutates it through an exclusive borrow during a step
//! and freezes it once the status leaves `IN_PROGRESS`. Snapshots serialize
//! as camelCase JSON for the surrounding persistence layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::scenario::Dimension;

/// Lifecycle status of a session. `InProgress` is the only non-terminal
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// The session is active and accepting steps.
    InProgress,
    /// The session reached a completed outcome.
    Completed,
    /// The session failed, by critical-fail rule or failed outcome node.
    Failed,
    /// The caller aborted the session before a terminal outcome.
    Aborted,
}

impl SessionStatus {
    /// Returns `true` once the session can no longer accept steps.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != Self::InProgress
    }
}

/// A critical-fail rule firing, recorded in order of occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalFailRecord {
    /// The rule that fired.
    pub rule_id: String,
    /// Reason text from the rule.
    pub reason: String,
    /// Decision node where the rule fired.
    pub at_node_id: String,
    /// Choice that triggered it.
    pub at_choice_id: String,
}

/// One selected choice, recorded in order of selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedChoice {
    /// The decision node the choice belonged to.
    pub node_id: String,
    /// The selected choice id.
    pub choice_id: String,
}

/// Mutable state of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Scenario the session runs against.
    pub scenario_id: String,
    /// Scenario content version.
    pub scenario_version: String,
    /// Id of the node the session currently sits at.
    pub current_node_id: String,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session reached a terminal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Current score per dimension, all five always present.
    pub dimension_scores: BTreeMap<Dimension, i32>,
    /// Accumulated flags, deduplicated, insertion order preserved.
    pub flags: Vec<String>,
    /// Critical-fail rule firings, in order.
    pub critical_fails: Vec<CriticalFailRecord>,
    /// Every node visited, in order, starting with the start node.
    pub visited_node_ids: Vec<String>,
    /// Every choice selected, in order.
    pub selected_choices: Vec<SelectedChoice>,
}
