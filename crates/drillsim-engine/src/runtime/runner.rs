//! The scenario runtime: the state machine driving a session.
//!
//! A [`Runtime`] is constructed once per scenario from a validated document
//! plus injected clock and event-id hooks, then drives any number of
//! sessions through steps. Every step consumes the caller-owned
//! [`SessionState`] through an exclusive borrow and returns an ordered event
//! batch; the runtime itself is immutable and holds no per-session state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use drillsim_core::clock::Clock;
use drillsim_core::ids::EventIdSource;

use crate::domain::events::{
    ChoiceSelectedPayload, EffectsUpdatePayload, EngineEvent, EngineEventKind, FinalSnapshot,
    MoveUpdatePayload, NodeMove, NodeViewedPayload, RuleTriggeredPayload, SessionAbortedPayload,
    SessionCompletedPayload, SessionStartedPayload, StateUpdatedPayload,
};
use crate::domain::integrity::{NodeIndex, build_node_index, validate_with_index};
use crate::domain::scenario::{OutcomeStatus, Scenario, ScenarioNode, Severity};
use crate::domain::scoring::{apply_delta, initial_scores, maturity_level, overall_score};
use crate::domain::state::{CriticalFailRecord, SelectedChoice, SessionState, SessionStatus};
use crate::error::{IntegrityError, StepError};

/// Engine tuning knobs, supplied at runtime construction.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Clamp dimension scores to `[0, 100]` after each delta.
    pub clamp_scores: bool,
    /// Seed value for every dimension at session start.
    pub initial_score: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clamp_scores: true,
            initial_score: 50,
        }
    }
}

/// Result of `start_session`: the fresh state and its opening events.
#[derive(Debug)]
pub struct SessionStart {
    /// The new session state, positioned at the start node.
    pub state: SessionState,
    /// `SESSION_STARTED` followed by `NODE_VIEWED` for the start node.
    pub events: Vec<EngineEvent>,
}

/// Result of a step: where the session now sits and what it emitted.
#[derive(Debug)]
pub struct StepOutcome {
    /// The session's current node after the step.
    pub next_node_id: String,
    /// Feedback text from the selected choice, if any.
    pub feedback: Option<String>,
    /// `CriticalFail` when the session is failed, else `None`.
    pub severity: Severity,
    /// Ordered event batch for the step.
    pub events: Vec<EngineEvent>,
}

/// An immutable scenario runtime.
pub struct Runtime {
    scenario: Scenario,
    node_index: NodeIndex,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    event_ids: Arc<dyn EventIdSource>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("scenario_id", &self.scenario.scenario_id)
            .field("version", &self.scenario.version)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Validates the scenario and builds the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError`] if the document fails any structural
    /// check; no session can ever start against an invalid scenario.
    pub fn new(
        scenario: Scenario,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        event_ids: Arc<dyn EventIdSource>,
    ) -> Result<Self, IntegrityError> {
        let node_index = build_node_index(&scenario)?;
        validate_with_index(&scenario, &node_index)?;
        Ok(Self {
            scenario,
            node_index,
            config,
            clock,
            event_ids,
        })
    }

    /// Returns the scenario this runtime executes.
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    fn node(&self, node_id: &str) -> Option<&ScenarioNode> {
        self.node_index
            .get(node_id)
            .map(|position| &self.scenario.nodes[*position])
    }

    fn new_event(&self, ts: DateTime<Utc>, kind: EngineEventKind) -> EngineEvent {
        EngineEvent {
            event_id: self.event_ids.next_id(),
            ts,
            kind,
        }
    }

    /// Starts a new session at the scenario's start node.
    ///
    /// Seeds all dimension scores, records the start node as visited, and
    /// emits `SESSION_STARTED` then `NODE_VIEWED`.
    #[must_use]
    pub fn start_session(&self) -> SessionStart {
        let ts = self.clock.now();
        let mut state = SessionState {
            scenario_id: self.scenario.scenario_id.clone(),
            scenario_version: self.scenario.version.clone(),
            current_node_id: self.scenario.start_node_id.clone(),
            status: SessionStatus::InProgress,
            started_at: ts,
            ended_at: None,
            dimension_scores: initial_scores(self.config.initial_score),
            flags: Vec::new(),
            critical_fails: Vec::new(),
            visited_node_ids: Vec::new(),
            selected_choices: Vec::new(),
        };

        let events = vec![
            self.new_event(
                ts,
                EngineEventKind::SessionStarted(SessionStartedPayload {
                    scenario_id: state.scenario_id.clone(),
                    scenario_version: state.scenario_version.clone(),
                    started_at: ts,
                }),
            ),
            self.new_event(
                ts,
                EngineEventKind::NodeViewed(NodeViewedPayload {
                    node_id: state.current_node_id.clone(),
                }),
            ),
        ];
        state.visited_node_ids.push(state.current_node_id.clone());

        tracing::debug!(
            scenario = %state.scenario_id,
            start_node = %state.current_node_id,
            "session started"
        );
        SessionStart { state, events }
    }

    /// Advances past the current info node to its successor.
    ///
    /// If the successor is an outcome node the session is finalized within
    /// the same call and the finalization outcome is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::StateNotActive`] on a terminal session,
    /// [`StepError::NodeNotFound`] if the current node id dangles, or
    /// [`StepError::NodeNotInfo`] if the current node is not an info node.
    pub fn advance_info(&self, state: &mut SessionState) -> Result<StepOutcome, StepError> {
        if state.status.is_terminal() {
            return Err(StepError::StateNotActive {
                status: state.status,
            });
        }
        let node = self.node(&state.current_node_id).ok_or_else(|| {
            StepError::NodeNotFound {
                node_id: state.current_node_id.clone(),
            }
        })?;
        let ScenarioNode::Info(info) = node else {
            return Err(StepError::NodeNotInfo {
                node_id: state.current_node_id.clone(),
            });
        };

        let ts = self.clock.now();
        let next_node_id = info.next.clone();
        state.current_node_id = next_node_id.clone();

        let mut events = vec![
            self.new_event(
                ts,
                EngineEventKind::StateUpdated(StateUpdatedPayload::Moved(MoveUpdatePayload {
                    moved: NodeMove {
                        from: info.id.clone(),
                        to: next_node_id.clone(),
                    },
                })),
            ),
            self.new_event(
                ts,
                EngineEventKind::NodeViewed(NodeViewedPayload {
                    node_id: next_node_id.clone(),
                }),
            ),
        ];
        state.visited_node_ids.push(next_node_id.clone());

        tracing::debug!(from = %info.id, to = %next_node_id, "info advance");

        if let Some(ScenarioNode::Outcome(outcome)) = self.node(&next_node_id) {
            Self::reconcile_outcome_status(state, outcome.outcome.status);
            state.ended_at = Some(ts);
            return Ok(self.complete_session(state, events, None));
        }

        Ok(StepOutcome {
            next_node_id,
            feedback: None,
            severity: Severity::None,
            events,
        })
    }

    /// Selects a choice on the current decision node.
    ///
    /// Applies the choice's score delta and flags, fires its critical-fail
    /// rule if declared, moves to the mapped successor, and finalizes the
    /// session if the successor is an outcome node.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::StateNotActive`] on a terminal session,
    /// [`StepError::NodeNotFound`] if the current node id dangles,
    /// [`StepError::NodeNotDecision`] if the current node is not a decision
    /// node, [`StepError::ChoiceNotFound`] if the choice id is not declared
    /// on it, or [`StepError::BadNext`] if the successor mapping is missing
    /// an entry (validator/runtime divergence, unreachable after
    /// validation).
    pub fn select_choice(
        &self,
        state: &mut SessionState,
        choice_id: &str,
    ) -> Result<StepOutcome, StepError> {
        if state.status.is_terminal() {
            return Err(StepError::StateNotActive {
                status: state.status,
            });
        }
        let node = self.node(&state.current_node_id).ok_or_else(|| {
            StepError::NodeNotFound {
                node_id: state.current_node_id.clone(),
            }
        })?;
        let ScenarioNode::Decision(decision) = node else {
            return Err(StepError::NodeNotDecision {
                node_id: state.current_node_id.clone(),
            });
        };
        let choice = decision
            .choices
            .iter()
            .find(|candidate| candidate.id == choice_id)
            .ok_or_else(|| StepError::ChoiceNotFound {
                node_id: decision.id.clone(),
                choice_id: choice_id.to_owned(),
            })?;

        let ts = self.clock.now();
        let mut events = Vec::new();

        events.push(self.new_event(
            ts,
            EngineEventKind::ChoiceSelected(ChoiceSelectedPayload {
                node_id: decision.id.clone(),
                choice_id: choice.id.clone(),
            }),
        ));
        state.selected_choices.push(SelectedChoice {
            node_id: decision.id.clone(),
            choice_id: choice.id.clone(),
        });

        let score_delta = choice
            .effects
            .as_ref()
            .and_then(|effects| effects.score_delta.clone())
            .unwrap_or_default();
        let flags_added = choice
            .effects
            .as_ref()
            .and_then(|effects| effects.flags.clone())
            .unwrap_or_default();
        if !score_delta.is_empty() {
            apply_delta(&mut state.dimension_scores, &score_delta, self.config.clamp_scores);
        }
        for flag in &flags_added {
            if !state.flags.contains(flag) {
                state.flags.push(flag.clone());
            }
        }

        // Emitted even when delta/flags are empty: the audit trail records
        // every choice's effect, or lack of one.
        events.push(self.new_event(
            ts,
            EngineEventKind::StateUpdated(StateUpdatedPayload::Effects(EffectsUpdatePayload {
                score_delta,
                flags_added,
                at_node_id: decision.id.clone(),
                choice_id: choice.id.clone(),
            })),
        ));

        if let Some(rule_id) = choice.effects.as_ref().and_then(|e| e.critical_fail.as_deref()) {
            let reason = self
                .scenario
                .maturity_model
                .critical_fail_rules
                .iter()
                .find(|rule| rule.id == rule_id)
                .map_or_else(|| "Critical failure.".to_owned(), |rule| rule.reason.clone());
            state.critical_fails.push(CriticalFailRecord {
                rule_id: rule_id.to_owned(),
                reason: reason.clone(),
                at_node_id: decision.id.clone(),
                at_choice_id: choice.id.clone(),
            });
            state.status = SessionStatus::Failed;
            state.ended_at = Some(ts);

            tracing::warn!(
                rule = %rule_id,
                node = %decision.id,
                choice = %choice.id,
                "critical-fail rule triggered"
            );
            events.push(self.new_event(
                ts,
                EngineEventKind::RuleTriggered(RuleTriggeredPayload {
                    rule_id: rule_id.to_owned(),
                    reason,
                    at_node_id: decision.id.clone(),
                    choice_id: choice.id.clone(),
                }),
            ));
        }

        let next_node_id = decision.next_by_choice.get(choice_id).cloned().ok_or_else(|| {
            StepError::BadNext {
                node_id: decision.id.clone(),
                choice_id: choice_id.to_owned(),
            }
        })?;

        state.current_node_id = next_node_id.clone();
        events.push(self.new_event(
            ts,
            EngineEventKind::NodeViewed(NodeViewedPayload {
                node_id: next_node_id.clone(),
            }),
        ));
        state.visited_node_ids.push(next_node_id.clone());

        let feedback = choice.feedback.clone();
        tracing::debug!(node = %decision.id, choice = %choice_id, to = %next_node_id, "decision step");

        if let Some(ScenarioNode::Outcome(outcome)) = self.node(&next_node_id) {
            Self::reconcile_outcome_status(state, outcome.outcome.status);
            state.ended_at = Some(ts);
            return Ok(self.complete_session(state, events, feedback));
        }

        Ok(StepOutcome {
            next_node_id,
            feedback,
            severity: Self::session_severity(state),
            events,
        })
    }

    /// Finalizes a session: the single point where the terminal score
    /// snapshot is computed.
    ///
    /// A session still `IN_PROGRESS` becomes `COMPLETED`; an earlier
    /// `FAILED` or `ABORTED` is preserved, never downgraded. Idempotent:
    /// re-invoking on a terminal state recomputes the identical payload and
    /// emits another `SESSION_COMPLETED` (fresh event id), which the
    /// store's id-based dedup renders harmless.
    pub fn complete_session(
        &self,
        state: &mut SessionState,
        prior_events: Vec<EngineEvent>,
        feedback: Option<String>,
    ) -> StepOutcome {
        let ts = self.clock.now();
        if state.status == SessionStatus::InProgress {
            state.status = SessionStatus::Completed;
        }
        if state.ended_at.is_none() {
            state.ended_at = Some(ts);
        }

        let overall = overall_score(&state.dimension_scores, &self.scenario.maturity_model);
        let final_snapshot = FinalSnapshot {
            dimension_scores: state.dimension_scores.clone(),
            overall_score: overall,
            maturity_level: maturity_level(overall, &self.scenario.maturity_model),
            critical_fails: state.critical_fails.clone(),
        };

        tracing::debug!(
            scenario = %state.scenario_id,
            status = ?state.status,
            overall,
            "session finalized"
        );

        let mut events = prior_events;
        events.push(self.new_event(
            ts,
            EngineEventKind::SessionCompleted(SessionCompletedPayload {
                status: state.status,
                final_snapshot,
            }),
        ));

        StepOutcome {
            next_node_id: state.current_node_id.clone(),
            feedback,
            severity: Self::session_severity(state),
            events,
        }
    }

    /// Aborts an active session at the caller's request.
    ///
    /// Aborted sessions are not scored: no final snapshot, no
    /// `SESSION_COMPLETED`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::StateNotActive`] if the session is already
    /// terminal.
    pub fn abort_session(
        &self,
        state: &mut SessionState,
        reason: Option<String>,
    ) -> Result<StepOutcome, StepError> {
        if state.status.is_terminal() {
            return Err(StepError::StateNotActive {
                status: state.status,
            });
        }

        let ts = self.clock.now();
        state.status = SessionStatus::Aborted;
        state.ended_at = Some(ts);

        tracing::debug!(
            scenario = %state.scenario_id,
            node = %state.current_node_id,
            "session aborted"
        );
        let events = vec![self.new_event(
            ts,
            EngineEventKind::SessionAborted(SessionAbortedPayload {
                at_node_id: state.current_node_id.clone(),
                reason,
            }),
        )];

        Ok(StepOutcome {
            next_node_id: state.current_node_id.clone(),
            feedback: None,
            severity: Severity::None,
            events,
        })
    }

    /// An outcome node's declared `FAILED` always wins; its `COMPLETED`
    /// never overwrites an earlier failure.
    fn reconcile_outcome_status(state: &mut SessionState, declared: OutcomeStatus) {
        match declared {
            OutcomeStatus::Failed => state.status = SessionStatus::Failed,
            OutcomeStatus::Completed => {
                if state.status == SessionStatus::InProgress {
                    state.status = SessionStatus::Completed;
                }
            }
        }
    }

    fn session_severity(state: &SessionState) -> Severity {
        if state.status == SessionStatus::Failed {
            Severity::CriticalFail
        } else {
            Severity::None
        }
    }
}
