//! Shared helpers for engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use drillsim_core::clock::Clock;
use drillsim_engine::domain::events::EngineEvent;
use drillsim_engine::domain::scenario::Scenario;
use drillsim_engine::runtime::runner::{EngineConfig, Runtime};
use drillsim_test_support::{FixedClock, SequenceEventIds};

/// Minimal four-node drill used across the integration tests:
/// `n1` (info) -> `n2` (decision: `a` -> `n3` COMPLETED, `b` -> `n4` FAILED).
pub const DRILL_DOC: &str = r#"{
    "scenarioId": "drill-breaker-room",
    "version": "1.0.0",
    "title": "Breaker room isolation drill",
    "domain": "energy-isolation",
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
            {"id": "cf-no-lock", "when": "choice", "choiceId": "b", "reason": "Worked without applying a lock"}
        ]
    },
    "startNodeId": "n1",
    "nodes": [
        {"type": "info", "id": "n1", "title": "Briefing", "body": "Review the isolation permit.", "next": "n2"},
        {
            "type": "decision", "id": "n2", "title": "Lock application", "body": "The breaker is open. Next?",
            "choices": [
                {"id": "a", "label": "Apply your lock and tag", "feedback": "Locked out correctly."},
                {"id": "b", "label": "Start work, the breaker is already open", "effects": {"criticalFail": "cf-no-lock"}}
            ],
            "nextByChoice": {"a": "n3", "b": "n4"}
        },
        {"type": "outcome", "id": "n3", "title": "Drill complete", "body": "Isolation held.", "outcome": {"status": "COMPLETED", "severity": "NONE"}},
        {"type": "outcome", "id": "n4", "title": "Incident", "body": "Energized work.", "outcome": {"status": "FAILED", "severity": "CRITICAL_FAIL"}}
    ]
}"#;

/// Fixed timestamp used across all integration tests.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    ))
}

/// Builds a runtime over [`DRILL_DOC`] with a fixed clock and a seeded
/// deterministic id sequence.
pub fn build_runtime(seed: u64) -> Runtime {
    let scenario = Scenario::from_json(DRILL_DOC).expect("fixture document parses");
    Runtime::new(
        scenario,
        EngineConfig::default(),
        fixed_clock(),
        Arc::new(SequenceEventIds::new(seed)),
    )
    .expect("fixture document validates")
}

/// Event type names of a batch, in order.
pub fn event_types(events: &[EngineEvent]) -> Vec<&'static str> {
    events.iter().map(EngineEvent::event_type).collect()
}
