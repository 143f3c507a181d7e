use chrono::{TimeZone, Utc};
use committee_runtime::{
    replay, verify_run_hash, Aggregator, FixedClock, FixedRunId, Orchestrator, ParsedInputs,
    RunInputs,
};
use committee_types::{AgentResult, AgentScope, ConfigHashes, Manifest, RunOutcome};
use serde_json::{json, Value};

fn orchestrator() -> Orchestrator {
    Orchestrator::new()
        .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap()))
        .with_run_ids(FixedRunId("run-fixed".into()))
}

fn holding(id: &str) -> Value {
    json!({
        "identity": {"holding_id": id, "ticker": format!("{id}.N")},
        "weight": 0.3,
        "currency": "USD",
        "metrics": {
            "price": {"value": 42.5, "source_ref": {"origin": "exchange", "as_of_date": "2024-01-31"}},
            "market_cap": {"value": 1200000000.0, "source_ref": {"origin": "filing"}},
            "dividend_yield": {"not_applicable": true}
        }
    })
}

fn three_holdings() -> Value {
    json!([holding("HOLDING-001"), holding("HOLDING-002"), holding("HOLDING-003")])
}

struct Scenario {
    holdings: Value,
    portfolio_config: Value,
    run_config: Value,
    fixtures: Value,
}

impl Scenario {
    fn new() -> Self {
        Self {
            holdings: three_holdings(),
            portfolio_config: json!({"base_currency": "USD"}),
            run_config: json!({"run_mode": "DEEP", "partial_failure_veto_threshold_pct": 30.0}),
            fixtures: json!({}),
        }
    }

    fn inputs(&self) -> RunInputs {
        RunInputs::new(
            json!({
                "portfolio_id": "PORT-1",
                "as_of_date": "2024-01-31T00:00:00Z",
                "holdings": self.holdings,
                "cash_pct": 5.0
            }),
            self.portfolio_config.clone(),
            self.run_config.clone(),
            json!({
                "rubric_version": "2024.1",
                "registries": {"agent_fixtures": self.fixtures}
            }),
        )
    }
}

fn outcome_of(result: &committee_runtime::OrchestrationResult, id: &str) -> RunOutcome {
    result.packet.committee().unwrap().per_holding_outcomes[id]
}

#[test]
fn happy_path_completes_with_hashes() {
    let result = orchestrator().run(&Scenario::new().inputs());
    assert_eq!(result.outcome, RunOutcome::Completed);

    let packet = result.packet.committee().unwrap();
    assert!(packet.reasons.is_empty());
    assert_eq!(packet.holdings.len(), 3);
    let ids: Vec<_> = packet.holdings.iter().map(|h| h.holding_id.as_str()).collect();
    assert_eq!(ids, vec!["HOLDING-001", "HOLDING-002", "HOLDING-003"]);
    for holding in &packet.holdings {
        let scorecard = holding.scorecard.as_ref().expect("scorecard");
        let final_score = scorecard.final_score.unwrap();
        assert!((0.0..=100.0).contains(&final_score));
    }

    assert!(packet.hashes.is_complete());
    let run_hash = result.run_hash().unwrap();
    assert_eq!(run_hash.len(), 64);
    assert!(run_hash.chars().all(|c| c.is_ascii_hexdigit()));

    assert_eq!(result.run_log.outcome, RunOutcome::Completed);
    assert_eq!(result.run_log.run_id, "run-fixed");
    assert!(result.run_log.events.iter().any(|e| e.code == "agent_phase_completed"));
}

#[test]
fn malformed_snapshot_fails_schema_validation() {
    let mut inputs = Scenario::new().inputs();
    inputs.portfolio_snapshot = json!({"as_of_date": "2024-01-31T00:00:00Z", "holdings": []});

    let result = orchestrator().run(&inputs);
    assert_eq!(result.outcome, RunOutcome::Failed);
    let failed = result.packet.failed().unwrap();
    assert_eq!(failed.failure_reason, "schema_validation_failed");
    assert_eq!(failed.reasons.len(), 1);
    assert!(failed.reasons[0].starts_with("portfolio_snapshot:"));
    assert!(result.guard_results.is_empty());
    assert_eq!(result.run_log.outcome, RunOutcome::Failed);
    assert!(result.run_hash().is_none());
}

#[test]
fn semantic_errors_fail_through_input_guard() {
    let mut scenario = Scenario::new();
    scenario.holdings[0]["weight"] = json!(-0.5);
    let result = orchestrator().run(&scenario.inputs());
    assert_eq!(result.outcome, RunOutcome::Failed);
    let failed = result.packet.failed().unwrap();
    assert_eq!(failed.failure_reason, "schema_validation_failed");
    assert_eq!(failed.reasons, vec!["holdings.HOLDING-001.weight:invalid_weight"]);
    assert_eq!(failed.portfolio_id.as_deref(), Some("PORT-1"));
}

#[test]
fn manifest_mismatch_fails() {
    let inputs = Scenario::new().inputs().with_manifest(
        Manifest {
            run_config_hash: Some("aaa".into()),
            config_snapshot_hash: Some("bbb".into()),
        },
        ConfigHashes {
            run_config_hash: Some("aaa".into()),
            config_snapshot_hash: Some("ccc".into()),
        },
    );
    let result = orchestrator().run(&inputs);
    assert_eq!(result.outcome, RunOutcome::Failed);
    assert_eq!(result.reasons(), ["config_snapshot_hash_mismatch"]);
}

#[test]
fn missing_base_currency_vetoes() {
    let mut scenario = Scenario::new();
    scenario.portfolio_config = json!({"base_currency": "  "});
    let result = orchestrator().run(&scenario.inputs());

    assert_eq!(result.outcome, RunOutcome::Vetoed);
    let packet = result.packet.committee().unwrap();
    assert_eq!(packet.reasons, vec!["missing_base_currency"]);
    assert!(packet.holdings.is_empty());
    assert!(packet.hashes.is_empty());
    assert!(result.agent_results.is_empty());
}

#[test]
fn unsourced_metric_vetoes() {
    let mut scenario = Scenario::new();
    scenario.holdings[1]["metrics"]["eps"] = json!({"value": 3.1});
    let result = orchestrator().run(&scenario.inputs());

    assert_eq!(result.outcome, RunOutcome::Vetoed);
    assert_eq!(result.reasons(), ["unsourced_numeric_metric"]);
    assert!(result.packet.committee().unwrap().hashes.is_empty());
}

fn one_of_two_failed(threshold: f64) -> committee_runtime::OrchestrationResult {
    let mut scenario = Scenario::new();
    scenario.holdings = json!([holding("A"), holding("B")]);
    scenario.run_config = json!({"partial_failure_veto_threshold_pct": threshold});
    scenario.fixtures = json!({"Fundamentals": {"holdings": {"A": {"status": "failed"}}}});
    orchestrator().run(&scenario.inputs())
}

#[test]
fn partial_failure_at_threshold_completes() {
    let result = one_of_two_failed(50.0);
    assert_eq!(result.outcome, RunOutcome::Completed);
    assert_eq!(outcome_of(&result, "A"), RunOutcome::Failed);
    assert_eq!(outcome_of(&result, "B"), RunOutcome::Completed);

    let packet = result.packet.committee().unwrap();
    let failed = packet.holdings.iter().find(|h| h.holding_id == "A").unwrap();
    assert!(failed.scorecard.is_none());
    assert_eq!(failed.limitations, vec!["error_classification:agent_status_failed"]);
}

#[test]
fn partial_failure_above_threshold_vetoes() {
    let result = one_of_two_failed(49.0);
    assert_eq!(result.outcome, RunOutcome::Vetoed);
    assert_eq!(result.reasons(), ["partial_failure_threshold_exceeded"]);
}

#[test]
fn macro_regime_do_not_trade_short_circuits() {
    let mut scenario = Scenario::new();
    scenario.fixtures = json!({
        "GRRA": {"portfolio": {"key_findings": {"regime_label": "crisis", "do_not_trade_flag": true}}}
    });
    let result = orchestrator().run(&scenario.inputs());

    assert_eq!(result.outcome, RunOutcome::ShortCircuited);
    let packet = result.packet.committee().unwrap();
    assert_eq!(packet.reasons, vec!["grra_do_not_trade"]);
    assert_eq!(packet.holdings.len(), 3);
    for holding in &packet.holdings {
        assert_eq!(holding.holding_run_outcome, RunOutcome::ShortCircuited);
        assert!(holding.scorecard.is_none());
    }
    assert!(packet.hashes.is_empty());
    assert!(!result.agent_results.iter().any(|r| r.agent_name == "LEFO"));
}

#[test]
fn run_config_do_not_trade_short_circuits() {
    let mut scenario = Scenario::new();
    scenario.run_config = json!({"do_not_trade_flag": true});
    let result = orchestrator().run(&scenario.inputs());
    assert_eq!(result.outcome, RunOutcome::ShortCircuited);
    assert_eq!(result.reasons(), ["grra_do_not_trade", "run_config_do_not_trade"]);
}

#[test]
fn integrity_veto_on_one_holding() {
    let mut scenario = Scenario::new();
    scenario.run_config = json!({"partial_failure_veto_threshold_pct": 50.0});
    scenario.fixtures = json!({
        "DIO": {"holdings": {"HOLDING-002": {"key_findings": {"integrity_veto_triggered": true}}}}
    });
    let result = orchestrator().run(&scenario.inputs());

    assert_eq!(result.outcome, RunOutcome::Completed);
    assert_eq!(outcome_of(&result, "HOLDING-002"), RunOutcome::Vetoed);
    let packet = result.packet.committee().unwrap();
    let vetoed = packet.holdings.iter().find(|h| h.holding_id == "HOLDING-002").unwrap();
    assert!(vetoed.scorecard.is_none());
    assert_eq!(vetoed.limitations, vec!["dio_integrity_veto"]);
    assert!(!result
        .agent_results
        .iter()
        .any(|r| r.agent_name == "LEFO" && r.holding() == Some("HOLDING-002")));
}

#[test]
fn integrity_portfolio_hard_stop_vetoes_run() {
    let mut scenario = Scenario::new();
    scenario.fixtures = json!({
        "DIO": {"portfolio": {"key_findings": {"unsourced_numbers_detected": true}}}
    });
    let result = orchestrator().run(&scenario.inputs());
    assert_eq!(result.outcome, RunOutcome::Vetoed);
    assert_eq!(result.reasons(), ["dio_portfolio_veto"]);
    assert!(result.guard_results[5..].iter().all(|g| g.is_skip()));
}

#[test]
fn risk_officer_veto_on_one_holding() {
    let mut scenario = Scenario::new();
    scenario.run_config = json!({"partial_failure_veto_threshold_pct": 50.0});
    scenario.fixtures = json!({
        "RiskOfficer": {"holdings": {"HOLDING-003": {"veto_flags": ["position_limit_breach"]}}}
    });
    let result = orchestrator().run(&scenario.inputs());

    assert_eq!(result.outcome, RunOutcome::Completed);
    assert_eq!(outcome_of(&result, "HOLDING-003"), RunOutcome::Vetoed);
    assert_eq!(outcome_of(&result, "HOLDING-001"), RunOutcome::Completed);
}

#[test]
fn liquidity_and_concentration_caps_lower_base() {
    let mut scenario = Scenario::new();
    scenario.fixtures = json!({
        "LEFO": {"holdings": {"HOLDING-001": {"key_findings": {"score_cap": 60}}}},
        "PSCC": {"portfolio": {"key_findings": {"position_caps_applied": {"HOLDING-001": 70}}}}
    });
    let result = orchestrator().run(&scenario.inputs());
    assert_eq!(result.outcome, RunOutcome::Completed);

    let packet = result.packet.committee().unwrap();
    let capped = packet.holdings[0].scorecard.as_ref().unwrap();
    assert_eq!(capped.base_score, Some(60.0));
    assert_eq!(capped.applied_caps.len(), 1);
    assert_eq!(capped.applied_caps[0].source, "LEFO");
    assert!(capped.final_score.unwrap() <= 60.0);

    let uncapped = packet.holdings[1].scorecard.as_ref().unwrap();
    assert_eq!(uncapped.base_score, Some(100.0));
    assert!(uncapped.applied_caps.is_empty());
}

#[test]
fn integrity_hard_stop_preempts_penalties() {
    let scenario = Scenario::new();
    let parsed = ParsedInputs::parse(&scenario.inputs()).unwrap();
    let results = vec![AgentResult::completed("DIO", AgentScope::Holding)
        .for_holding("HOLDING-001")
        .with_finding("unsourced_numbers_detected", json!(true))
        .with_finding("missing_penalty_critical_fields", json!(["cash", "price"]))
        .with_finding("contradictions", json!([{"unresolved": true}]))];

    let scorecard =
        Aggregator::new().scorecard(&parsed.snapshot.holdings[0], "HOLDING-001", &parsed, &results);
    assert_eq!(scorecard.penalty_breakdown.total_penalties, 0.0);
    assert!(scorecard.penalty_breakdown.details.is_empty());
}

#[test]
fn shuffled_inputs_hash_identically() {
    let baseline = orchestrator().run(&Scenario::new().inputs());

    let mut shuffled = Scenario::new();
    shuffled.holdings = json!([holding("HOLDING-003"), holding("HOLDING-001"), holding("HOLDING-002")]);
    let reordered = Orchestrator::new().run(&shuffled.inputs());

    assert_eq!(baseline.outcome, RunOutcome::Completed);
    assert_ne!(baseline.run_log.run_id, reordered.run_log.run_id);
    assert_eq!(baseline.decision_hash(), reordered.decision_hash());
    assert_eq!(baseline.run_hash(), reordered.run_hash());
}

#[test]
fn injected_results_hash_independently_of_order() {
    let results = vec![
        AgentResult::completed("Technical", AgentScope::Holding).for_holding("HOLDING-002"),
        AgentResult::completed("DIO", AgentScope::Portfolio),
        AgentResult::completed("Technical", AgentScope::Holding).for_holding("HOLDING-001"),
        AgentResult::completed("GRRA", AgentScope::Portfolio),
    ];
    let mut reversed = results.clone();
    reversed.reverse();

    let first = orchestrator().run(&Scenario::new().inputs().with_agent_results(results));
    let second = orchestrator().run(&Scenario::new().inputs().with_agent_results(reversed));
    assert_eq!(first.outcome, RunOutcome::Completed);
    assert_eq!(first.run_hash(), second.run_hash());
}

#[test]
fn conflicting_injected_results_for_one_holding_hash_identically() {
    let clean = AgentResult::completed("DIO", AgentScope::Holding).for_holding("HOLDING-001");
    let flagged = clean
        .clone()
        .with_finding("contradictions", json!([{"unresolved": true}]));

    let first = orchestrator().run(
        &Scenario::new()
            .inputs()
            .with_agent_results(vec![flagged.clone(), clean.clone()]),
    );
    let second = orchestrator().run(&Scenario::new().inputs().with_agent_results(vec![clean, flagged]));

    assert_eq!(first.outcome, RunOutcome::Completed);
    let score = |result: &committee_runtime::OrchestrationResult| {
        result.packet.committee().unwrap().holdings[0]
            .scorecard
            .as_ref()
            .and_then(|s| s.final_score)
    };
    assert_eq!(score(&first), score(&second));
    assert_eq!(first.decision_hash(), second.decision_hash());
    assert_eq!(first.run_hash(), second.run_hash());
}

#[test]
fn replay_is_deterministic_and_verifiable() {
    let orchestrator = Orchestrator::new();
    let inputs = Scenario::new().inputs();
    let report = replay(&orchestrator, &inputs, 3).unwrap();
    assert_eq!(report.runs(), 3);
    assert!(report.is_deterministic());

    let expected = report.run_hash().unwrap().to_owned();
    let result = orchestrator.run(&inputs);
    assert!(verify_run_hash(&result, &expected));
    assert!(!verify_run_hash(&result, "0000"));
}

#[test]
fn replay_of_failed_run_is_deterministic() {
    let mut inputs = Scenario::new().inputs();
    inputs.run_config = json!({"run_mode": 7});
    let report = replay(&Orchestrator::new(), &inputs, 2).unwrap();
    assert!(report.is_deterministic());
    assert_eq!(report.outcomes, vec![RunOutcome::Failed; 2]);
    assert_eq!(report.run_hash(), None);
}
