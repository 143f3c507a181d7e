use committee_runtime::{Orchestrator, RunInputs};
use committee_types::RunOutcome;
use proptest::prelude::*;
use serde_json::{json, Value};

fn holding(id: &str, price: f64) -> Value {
    json!({
        "identity": {"holding_id": id, "ticker": format!("{id}.X")},
        "weight": 0.2,
        "metrics": {
            "price": {"value": price, "source_ref": {"origin": "exchange"}},
            "volume": {"missing_reason": "not_reported"}
        }
    })
}

fn inputs(holdings: Vec<Value>, fixtures: Value) -> RunInputs {
    RunInputs::new(
        json!({"portfolio_id": "PORT-P", "as_of_date": "2024-03-29T00:00:00Z", "holdings": holdings}),
        json!({"base_currency": "USD"}),
        json!({"run_mode": "FAST", "partial_failure_veto_threshold_pct": 60.0}),
        json!({"rubric_version": "v2", "registries": {"agent_fixtures": fixtures}}),
    )
}

fn base_holdings() -> Vec<Value> {
    vec![
        holding("H-01", 10.0),
        holding("H-02", 20.5),
        holding("H-03", 7.25),
        holding("H-04", 99.0),
        holding("H-05", 0.5),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn holding_order_never_changes_hashes(shuffled in Just(base_holdings()).prop_shuffle()) {
        let orchestrator = Orchestrator::new();
        let fixtures = json!({
            "DIO": {"holdings": {"H-03": {"key_findings": {"integrity_veto_triggered": true}}}},
            "LEFO": {"holdings": {"H-02": {"key_findings": {"score_cap": 55}}}}
        });
        let baseline = orchestrator.run(&inputs(base_holdings(), fixtures.clone()));
        let candidate = orchestrator.run(&inputs(shuffled, fixtures));

        prop_assert_eq!(baseline.outcome, RunOutcome::Completed);
        prop_assert_eq!(candidate.outcome, baseline.outcome);
        prop_assert_eq!(candidate.decision_hash(), baseline.decision_hash());
        prop_assert_eq!(candidate.run_hash(), baseline.run_hash());
        prop_assert_eq!(
            &candidate.packet.committee().unwrap().per_holding_outcomes,
            &baseline.packet.committee().unwrap().per_holding_outcomes
        );
    }

    #[test]
    fn holding_id_padding_never_changes_hashes(pad in "[ ]{0,3}") {
        let orchestrator = Orchestrator::new();
        let mut padded = base_holdings();
        padded[0]["identity"]["holding_id"] = json!(format!("{pad}H-01{pad}"));

        let baseline = orchestrator.run(&inputs(base_holdings(), json!({})));
        let candidate = orchestrator.run(&inputs(padded, json!({})));
        prop_assert_eq!(candidate.run_hash(), baseline.run_hash());
    }
}
