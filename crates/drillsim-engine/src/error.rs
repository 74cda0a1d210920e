//! Engine error types.
//!
//! Two taxonomies: [`IntegrityError`] for scenario document defects caught at
//! load time, and [`StepError`] for step misuse at runtime. Every variant
//! carries the offending ids and exposes a stable machine code via `code()`;
//! the engine never retries or swallows errors.

use thiserror::Error;

use crate::domain::state::SessionStatus;

/// A structural defect in a scenario document, detected before any session
/// may run against it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrityError {
    /// Two nodes declare the same id.
    #[error("duplicate node id: {node_id}")]
    DuplicateNode {
        /// The duplicated node id.
        node_id: String,
    },

    /// `startNodeId` does not reference an existing node.
    #[error("startNodeId does not exist in nodes: {start_node_id}")]
    BadStartNode {
        /// The dangling start node id.
        start_node_id: String,
    },

    /// An info node or a decision successor points at a nonexistent node.
    #[error("node {from} points at nonexistent node {to}")]
    DanglingEdge {
        /// The node declaring the edge.
        from: String,
        /// The missing target node id.
        to: String,
    },

    /// A decision node declares the same choice id twice.
    #[error("duplicate choice id {choice_id} in node {node_id}")]
    DuplicateChoice {
        /// The decision node.
        node_id: String,
        /// The duplicated choice id.
        choice_id: String,
    },

    /// A declared choice has no entry in `nextByChoice`.
    #[error("choice {choice_id} in node {node_id} has no nextByChoice entry")]
    MissingChoiceTarget {
        /// The decision node.
        node_id: String,
        /// The unmapped choice id.
        choice_id: String,
    },

    /// `nextByChoice` contains an entry for an undeclared choice.
    #[error("nextByChoice in node {node_id} references undeclared choice {choice_id}")]
    UnknownChoiceInNext {
        /// The decision node.
        node_id: String,
        /// The undeclared choice id.
        choice_id: String,
    },

    /// A critical-fail rule references a choice that exists nowhere in the
    /// scenario's decision nodes.
    #[error("critical-fail rule {rule_id} references nonexistent choice {choice_id}")]
    BadCriticalFailRule {
        /// The offending rule id.
        rule_id: String,
        /// The missing choice id.
        choice_id: String,
    },

    /// Dimension weights do not sum to ~1.0.
    #[error("dimension weights must sum to ~1.0, got {sum}")]
    BadWeightSum {
        /// The actual weight sum.
        sum: f64,
    },
}

impl IntegrityError {
    /// Returns the stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateNode { .. } => "SCENARIO_DUP_NODE",
            Self::BadStartNode { .. } => "SCENARIO_BAD_START",
            Self::DanglingEdge { .. } => "SCENARIO_BAD_EDGE",
            Self::DuplicateChoice { .. } => "SCENARIO_DUP_CHOICE",
            Self::MissingChoiceTarget { .. } => "SCENARIO_MISSING_NEXT",
            Self::UnknownChoiceInNext { .. } => "SCENARIO_NEXT_UNKNOWN_CHOICE",
            Self::BadCriticalFailRule { .. } => "SCENARIO_BAD_CRITICAL_FAIL_RULE",
            Self::BadWeightSum { .. } => "SCENARIO_BAD_WEIGHTS",
        }
    }
}

/// A step invoked against a session or node that cannot accept it. All
/// variants are caller-recoverable; none mutate session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// The session is no longer `IN_PROGRESS`.
    #[error("session is not active (status: {status:?})")]
    StateNotActive {
        /// The session's terminal status.
        status: SessionStatus,
    },

    /// The session's current node id resolves to nothing. Unreachable after
    /// validation; indicates a corrupted state snapshot.
    #[error("current node not found: {node_id}")]
    NodeNotFound {
        /// The dangling current node id.
        node_id: String,
    },

    /// `advance_info` called while the current node is not an info node.
    #[error("current node {node_id} is not an info node")]
    NodeNotInfo {
        /// The current node id.
        node_id: String,
    },

    /// `select_choice` called while the current node is not a decision node.
    #[error("current node {node_id} is not a decision node")]
    NodeNotDecision {
        /// The current node id.
        node_id: String,
    },

    /// The supplied choice id does not belong to the current decision node.
    #[error("choice {choice_id} does not belong to node {node_id}")]
    ChoiceNotFound {
        /// The current decision node.
        node_id: String,
        /// The unknown choice id.
        choice_id: String,
    },

    /// A validated scenario's `nextByChoice` is missing an entry at runtime.
    /// Unreachable after validation; indicates validator/runtime divergence
    /// and should be treated as a defect, not a user error.
    #[error("nextByChoice has no entry for choice {choice_id} in node {node_id}")]
    BadNext {
        /// The decision node.
        node_id: String,
        /// The unmapped choice id.
        choice_id: String,
    },
}

impl StepError {
    /// Returns the stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StateNotActive { .. } => "STATE_NOT_ACTIVE",
            Self::NodeNotFound { .. } => "NODE_NOT_FOUND",
            Self::NodeNotInfo { .. } => "NODE_NOT_INFO",
            Self::NodeNotDecision { .. } => "NODE_NOT_DECISION",
            Self::ChoiceNotFound { .. } => "CHOICE_NOT_FOUND",
            Self::BadNext { .. } => "SCENARIO_BAD_NEXT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_error_codes_are_stable() {
        let cases: Vec<(IntegrityError, &str)> = vec![
            (
                IntegrityError::DuplicateNode {
                    node_id: "n1".to_owned(),
                },
                "SCENARIO_DUP_NODE",
            ),
            (
                IntegrityError::BadStartNode {
                    start_node_id: "n0".to_owned(),
                },
                "SCENARIO_BAD_START",
            ),
            (
                IntegrityError::DanglingEdge {
                    from: "n1".to_owned(),
                    to: "nx".to_owned(),
                },
                "SCENARIO_BAD_EDGE",
            ),
            (
                IntegrityError::DuplicateChoice {
                    node_id: "n2".to_owned(),
                    choice_id: "a".to_owned(),
                },
                "SCENARIO_DUP_CHOICE",
            ),
            (
                IntegrityError::MissingChoiceTarget {
                    node_id: "n2".to_owned(),
                    choice_id: "a".to_owned(),
                },
                "SCENARIO_MISSING_NEXT",
            ),
            (
                IntegrityError::UnknownChoiceInNext {
                    node_id: "n2".to_owned(),
                    choice_id: "z".to_owned(),
                },
                "SCENARIO_NEXT_UNKNOWN_CHOICE",
            ),
            (
                IntegrityError::BadCriticalFailRule {
                    rule_id: "cf1".to_owned(),
                    choice_id: "z".to_owned(),
                },
                "SCENARIO_BAD_CRITICAL_FAIL_RULE",
            ),
            (IntegrityError::BadWeightSum { sum: 0.5 }, "SCENARIO_BAD_WEIGHTS"),
        ];
        for (error, code) in cases {
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn test_step_error_codes_are_stable() {
        let cases: Vec<(StepError, &str)> = vec![
            (
                StepError::StateNotActive {
                    status: SessionStatus::Completed,
                },
                "STATE_NOT_ACTIVE",
            ),
            (
                StepError::NodeNotFound {
                    node_id: "n1".to_owned(),
                },
                "NODE_NOT_FOUND",
            ),
            (
                StepError::NodeNotInfo {
                    node_id: "n2".to_owned(),
                },
                "NODE_NOT_INFO",
            ),
            (
                StepError::NodeNotDecision {
                    node_id: "n1".to_owned(),
                },
                "NODE_NOT_DECISION",
            ),
            (
                StepError::ChoiceNotFound {
                    node_id: "n2".to_owned(),
                    choice_id: "z".to_owned(),
                },
                "CHOICE_NOT_FOUND",
            ),
            (
                StepError::BadNext {
                    node_id: "n2".to_owned(),
                    choice_id: "a".to_owned(),
                },
                "SCENARIO_BAD_NEXT",
            ),
        ];
        for (error, code) in cases {
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn test_display_includes_offending_ids() {
        let error = StepError::ChoiceNotFound {
            node_id: "n2".to_owned(),
            choice_id: "z".to_owned(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("n2"));
        assert!(rendered.contains('z'));
    }
}
