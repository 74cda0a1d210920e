//! Scenario document model.
//!
//! The immutable input document: a directed graph of info, decision, and
//! outcome nodes plus the maturity model that governs scoring. Documents are
//! camelCase JSON on the wire and are validated by
//! [`crate::domain::integrity`] before any session may run against them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One of the five fixed competency dimensions scored 0–100.
///
/// The set is engine-defined; scenarios weight these axes but cannot add
/// their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Physical isolation of every energy source.
    PositiveIsolation,
    /// Verification that no energy remains before work starts.
    ZeroEnergyVerification,
    /// Handling of residual/stored energy (capacitors, pressure, gravity).
    StoredEnergy,
    /// Coordination across the crew and affected parties.
    CrewCoordination,
    /// Communication discipline and record keeping.
    CommunicationRecords,
}

impl Dimension {
    /// All five dimensions, in canonical order.
    pub const ALL: [Dimension; 5] = [
        Dimension::PositiveIsolation,
        Dimension::ZeroEnergyVerification,
        Dimension::StoredEnergy,
        Dimension::CrewCoordination,
        Dimension::CommunicationRecords,
    ];
}

/// Severity attached to a step outcome or an outcome node.
///
/// The engine itself only produces `None` and `CriticalFail`; `NearMiss` and
/// `Warning` exist for outcome-node authoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// No adverse outcome.
    None,
    /// A critical-fail rule fired or the session failed.
    CriticalFail,
    /// A near miss.
    NearMiss,
    /// A warning-level outcome.
    Warning,
}

/// Terminal status declared by an outcome node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    /// The drill ended in failure.
    Failed,
    /// The drill was completed.
    Completed,
}

/// A maturity tier: a named inclusive score bracket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityLevel {
    /// Tier id, scenario-defined (e.g. `"novice"`).
    pub id: String,
    /// Inclusive lower bound of the bracket.
    pub min_score: i32,
    /// Inclusive upper bound of the bracket.
    pub max_score: i32,
}

/// Weight assigned to one dimension in the overall score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionWeight {
    /// The weighted dimension.
    pub id: Dimension,
    /// Positive weight; all weights must sum to 1.0 ± 0.01.
    pub weight: f64,
}

/// What triggers a critical-fail rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTrigger {
    /// The rule fires when a specific choice is selected.
    Choice,
}

/// A rule that forces session failure when a specific choice is selected,
/// regardless of score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalFailRule {
    /// Rule id, referenced by choice effects.
    pub id: String,
    /// Trigger kind.
    pub when: RuleTrigger,
    /// The choice that fires the rule; must exist in some decision node.
    pub choice_id: String,
    /// Human-readable reason recorded and emitted when the rule fires.
    pub reason: String,
}

/// Scoring model: tiers, dimension weights, and critical-fail rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityModel {
    /// Ordered, non-empty score-range tiers.
    pub levels: Vec<MaturityLevel>,
    /// Non-empty dimension weights.
    pub dimensions: Vec<DimensionWeight>,
    /// Rules that force failure on specific choices.
    #[serde(default)]
    pub critical_fail_rules: Vec<CriticalFailRule>,
}

/// Optional situational framing for a scenario. Informational only; the
/// engine carries it but never interprets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioContext {
    /// Site name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    /// Asset under maintenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    /// Voltage level, free-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
    /// Pressure level, free-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<String>,
    /// Roles involved in the drill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

/// Side effects of selecting a choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceEffects {
    /// Partial per-dimension score delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_delta: Option<BTreeMap<Dimension, i32>>,
    /// Flags accumulated onto the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<String>>,
    /// Id of a critical-fail rule fired by this choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_fail: Option<String>,
}

/// One selectable option on a decision node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Choice id, unique within its node.
    pub id: String,
    /// Label shown to the trainee.
    pub label: String,
    /// Effects applied when the choice is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<ChoiceEffects>,
    /// Feedback text surfaced after selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// A linear content node with one unconditional successor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoNode {
    /// Node id.
    pub id: String,
    /// Heading shown to the trainee.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Successor node id.
    pub next: String,
}

/// A branching node offering choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionNode {
    /// Node id.
    pub id: String,
    /// Heading shown to the trainee.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Declared choices, non-empty and ordered.
    pub choices: Vec<Choice>,
    /// Successor node id per choice id; must cover every declared choice
    /// exactly once. Ordered so validation reports failures deterministically.
    pub next_by_choice: BTreeMap<String, String>,
}

/// Declared terminal result of an outcome node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSpec {
    /// Terminal status the session takes on reaching this node.
    pub status: OutcomeStatus,
    /// Severity flag for the outcome.
    pub severity: Severity,
}

/// A terminal node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeNode {
    /// Node id.
    pub id: String,
    /// Heading shown to the trainee.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Declared terminal result.
    pub outcome: OutcomeSpec,
}

/// A scenario node, polymorphic over the wire `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioNode {
    /// Linear content node.
    Info(InfoNode),
    /// Branching node.
    Decision(DecisionNode),
    /// Terminal node.
    Outcome(OutcomeNode),
}

impl ScenarioNode {
    /// Returns the node's id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Info(n) => &n.id,
            Self::Decision(n) => &n.id,
            Self::Outcome(n) => &n.id,
        }
    }
}

/// The immutable scenario document, versioned by `(scenarioId, version)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Stable scenario identifier.
    pub scenario_id: String,
    /// Content version string.
    pub version: String,
    /// Scenario title.
    pub title: String,
    /// Domain tag (e.g. `"energy-isolation"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Focus tags for catalog filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<Vec<String>>,
    /// Estimated duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    /// Scoring model.
    pub maturity_model: MaturityModel,
    /// Optional situational framing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ScenarioContext>,
    /// Id of the node a session starts at.
    pub start_node_id: String,
    /// Ordered node collection; ids must be unique.
    pub nodes: Vec<ScenarioNode>,
}

impl Scenario {
    /// Parses a scenario document from its JSON wire form.
    ///
    /// Parsing checks shape only; structural integrity is checked separately
    /// at [`crate::runtime::runner::Runtime`] construction.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the document is not well-formed JSON
    /// or does not match the documented shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "scenarioId": "drill-breaker-room",
        "version": "1.2.0",
        "title": "Breaker room isolation drill",
        "domain": "energy-isolation",
        "focus": ["lockout", "verification"],
        "estimatedMinutes": 15,
        "maturityModel": {
            "levels": [
                {"id": "novice", "minScore": 0, "maxScore": 49},
                {"id": "proficient", "minScore": 50, "maxScore": 79},
                {"id": "systemic", "minScore": 80, "maxScore": 100}
            ],
            "dimensions": [
                {"id": "positive_isolation", "weight": 0.3},
                {"id": "zero_energy_verification", "weight": 0.3},
                {"id": "stored_energy", "weight": 0.2},
                {"id": "crew_coordination", "weight": 0.1},
                {"id": "communication_records", "weight": 0.1}
            ],
            "criticalFailRules": [
                {"id": "cf-live-touch", "when": "choice", "choiceId": "touch", "reason": "Touched a live conductor"}
            ]
        },
        "context": {"site": "Plant 7", "voltage": "13.8kV"},
        "startNodeId": "n1",
        "nodes": [
            {"type": "info", "id": "n1", "title": "Briefing", "body": "Read the permit.", "next": "n2"},
            {
                "type": "decision", "id": "n2", "title": "First move", "body": "What do you do?",
                "choices": [
                    {"id": "touch", "label": "Touch to check", "effects": {"criticalFail": "cf-live-touch"}},
                    {"id": "test", "label": "Use the tester", "effects": {"scoreDelta": {"zero_energy_verification": 10}, "flags": ["used_tester"]}, "feedback": "Correct."}
                ],
                "nextByChoice": {"touch": "n4", "test": "n3"}
            },
            {"type": "outcome", "id": "n3", "title": "Done", "body": "Drill complete.", "outcome": {"status": "COMPLETED", "severity": "NONE"}},
            {"type": "outcome", "id": "n4", "title": "Incident", "body": "Drill failed.", "outcome": {"status": "FAILED", "severity": "CRITICAL_FAIL"}}
        ]
    }"#;

    #[test]
    fn test_scenario_parses_from_documented_wire_shape() {
        let scenario = Scenario::from_json(DOC).unwrap();
        assert_eq!(scenario.scenario_id, "drill-breaker-room");
        assert_eq!(scenario.start_node_id, "n1");
        assert_eq!(scenario.nodes.len(), 4);
        assert_eq!(scenario.maturity_model.levels.len(), 3);
        assert_eq!(scenario.maturity_model.critical_fail_rules.len(), 1);
        assert_eq!(
            scenario.context.as_ref().unwrap().voltage.as_deref(),
            Some("13.8kV")
        );
    }

    #[test]
    fn test_node_variants_parse_by_type_tag() {
        let scenario = Scenario::from_json(DOC).unwrap();
        assert!(matches!(scenario.nodes[0], ScenarioNode::Info(_)));
        assert!(matches!(scenario.nodes[1], ScenarioNode::Decision(_)));
        assert!(matches!(scenario.nodes[2], ScenarioNode::Outcome(_)));

        let ScenarioNode::Decision(decision) = &scenario.nodes[1] else {
            panic!("expected decision node");
        };
        assert_eq!(decision.choices.len(), 2);
        assert_eq!(decision.next_by_choice["test"], "n3");
        let effects = decision.choices[1].effects.as_ref().unwrap();
        assert_eq!(
            effects.score_delta.as_ref().unwrap()[&Dimension::ZeroEnergyVerification],
            10
        );
    }

    #[test]
    fn test_outcome_status_uses_upper_snake_wire_spelling() {
        let scenario = Scenario::from_json(DOC).unwrap();
        let ScenarioNode::Outcome(outcome) = &scenario.nodes[3] else {
            panic!("expected outcome node");
        };
        assert_eq!(outcome.outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.outcome.severity, Severity::CriticalFail);

        let json = serde_json::to_value(&scenario.nodes[3]).unwrap();
        assert_eq!(json["type"], "outcome");
        assert_eq!(json["outcome"]["status"], "FAILED");
        assert_eq!(json["outcome"]["severity"], "CRITICAL_FAIL");
    }

    #[test]
    fn test_scenario_round_trips_through_serde() {
        let scenario = Scenario::from_json(DOC).unwrap();
        let json = serde_json::to_string(&scenario).unwrap();
        let reparsed = Scenario::from_json(&json).unwrap();
        assert_eq!(reparsed.nodes.len(), scenario.nodes.len());
        assert_eq!(reparsed.start_node_id, scenario.start_node_id);
    }

    #[test]
    fn test_dimension_wire_spelling_is_snake_case() {
        let json = serde_json::to_value(Dimension::ZeroEnergyVerification).unwrap();
        assert_eq!(json, "zero_energy_verification");
    }

    #[test]
    fn test_missing_optional_fields_default_to_none() {
        let minimal = r#"{
            "scenarioId": "s", "version": "1", "title": "t",
            "maturityModel": {"levels": [], "dimensions": []},
            "startNodeId": "n1",
            "nodes": [{"type": "outcome", "id": "n1", "title": "t", "body": "b", "outcome": {"status": "COMPLETED", "severity": "NONE"}}]
        }"#;
        let scenario = Scenario::from_json(minimal).unwrap();
        assert!(scenario.domain.is_none());
        assert!(scenario.context.is_none());
        assert!(scenario.maturity_model.critical_fail_rules.is_empty());
    }
}
