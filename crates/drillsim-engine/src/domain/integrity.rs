//! Scenario integrity validation.
//!
//! A scenario is static content loaded once; any graph defect must be caught
//! before a trainee can get stuck in a dead session, so validation is
//! exhaustive and upfront. Checks run in a fixed order and the first failure
//! is reported.

use std::collections::{HashMap, HashSet};

use crate::domain::scenario::{RuleTrigger, Scenario, ScenarioNode};
use crate::error::IntegrityError;

/// Immutable node arena: node id to position in the scenario's node vector.
///
/// Built once at runtime construction; session state holds only ids and
/// resolves them through this index.
pub type NodeIndex = HashMap<String, usize>;

/// Builds the node arena, rejecting duplicate node ids.
///
/// # Errors
///
/// Returns [`IntegrityError::DuplicateNode`] if two nodes share an id.
pub fn build_node_index(scenario: &Scenario) -> Result<NodeIndex, IntegrityError> {
    let mut index = NodeIndex::with_capacity(scenario.nodes.len());
    for (position, node) in scenario.nodes.iter().enumerate() {
        if index.insert(node.id().to_owned(), position).is_some() {
            return Err(IntegrityError::DuplicateNode {
                node_id: node.id().to_owned(),
            });
        }
    }
    Ok(index)
}

/// Validates a scenario's structural integrity.
///
/// Convenience wrapper that builds the node index and discards it; the
/// runtime constructor uses [`validate_with_index`] to keep the index.
///
/// # Errors
///
/// Returns the first [`IntegrityError`] found, in check order.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), IntegrityError> {
    let index = build_node_index(scenario)?;
    validate_with_index(scenario, &index)
}

/// Runs every integrity check beyond duplicate node ids, given a prebuilt
/// node index.
///
/// Check order: start node, then per-node edge and choice checks in document
/// order, then critical-fail rule references, then the weight sum.
///
/// # Errors
///
/// Returns the first [`IntegrityError`] found.
pub fn validate_with_index(scenario: &Scenario, index: &NodeIndex) -> Result<(), IntegrityError> {
    if !index.contains_key(&scenario.start_node_id) {
        return Err(IntegrityError::BadStartNode {
            start_node_id: scenario.start_node_id.clone(),
        });
    }

    for node in &scenario.nodes {
        match node {
            ScenarioNode::Info(info) => {
                if !index.contains_key(&info.next) {
                    return Err(IntegrityError::DanglingEdge {
                        from: info.id.clone(),
                        to: info.next.clone(),
                    });
                }
            }
            ScenarioNode::Decision(decision) => {
                let mut choice_ids = HashSet::with_capacity(decision.choices.len());
                for choice in &decision.choices {
                    if !choice_ids.insert(choice.id.as_str()) {
                        return Err(IntegrityError::DuplicateChoice {
                            node_id: decision.id.clone(),
                            choice_id: choice.id.clone(),
                        });
                    }
                    if !decision.next_by_choice.contains_key(&choice.id) {
                        return Err(IntegrityError::MissingChoiceTarget {
                            node_id: decision.id.clone(),
                            choice_id: choice.id.clone(),
                        });
                    }
                }
                for (choice_id, next_id) in &decision.next_by_choice {
                    if !choice_ids.contains(choice_id.as_str()) {
                        return Err(IntegrityError::UnknownChoiceInNext {
                            node_id: decision.id.clone(),
                            choice_id: choice_id.clone(),
                        });
                    }
                    if !index.contains_key(next_id) {
                        return Err(IntegrityError::DanglingEdge {
                            from: decision.id.clone(),
                            to: next_id.clone(),
                        });
                    }
                }
            }
            ScenarioNode::Outcome(_) => {}
        }
    }

    let all_choice_ids: HashSet<&str> = scenario
        .nodes
        .iter()
        .filter_map(|node| match node {
            ScenarioNode::Decision(decision) => Some(&decision.choices),
            _ => None,
        })
        .flatten()
        .map(|choice| choice.id.as_str())
        .collect();

    for rule in &scenario.maturity_model.critical_fail_rules {
        if rule.when == RuleTrigger::Choice && !all_choice_ids.contains(rule.choice_id.as_str()) {
            return Err(IntegrityError::BadCriticalFailRule {
                rule_id: rule.id.clone(),
                choice_id: rule.choice_id.clone(),
            });
        }
    }

    let sum: f64 = scenario
        .maturity_model
        .dimensions
        .iter()
        .map(|dimension| dimension.weight)
        .sum();
    if !(0.99..=1.01).contains(&sum) {
        return Err(IntegrityError::BadWeightSum { sum });
    }

    Ok(())
}
