//! Property tests: canonical form is a fixpoint and the encoding is stable
//! under incidental ordering and excluded metadata.

use committee_canonical::*;
use proptest::prelude::*;
use serde_json::json;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}",
        Just("holdings".to_string()),
        Just("agent_outputs".to_string()),
        Just("governance_trail".to_string()),
        Just("holding_id".to_string()),
        Just("agent_name".to_string()),
        Just("notes".to_string()),
        Just("run_id".to_string()),
    ]
}

fn arb_leaf() -> impl Strategy<Value = CanonicalValue> {
    prop_oneof![
        Just(CanonicalValue::Null),
        any::<bool>().prop_map(CanonicalValue::Bool),
        any::<i64>().prop_map(CanonicalValue::Int),
        any::<f64>().prop_map(CanonicalValue::Float),
        "[a-zA-Z0-9 \"\\\\]{0,8}".prop_map(CanonicalValue::String),
    ]
}

fn arb_value() -> impl Strategy<Value = CanonicalValue> {
    arb_leaf().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(CanonicalValue::Array),
            prop::collection::btree_map(arb_key(), inner, 0..5).prop_map(CanonicalValue::Object),
        ]
    })
}

fn arb_holding_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("H-[0-9]{3}", 1..8).prop_map(|ids| ids.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn canonicalize_is_idempotent(value in arb_value()) {
        let once = canonicalize(&value);
        let twice = canonicalize(&once);
        prop_assert_eq!(encode(&once), encode(&twice));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn finite_numbers_never_use_exponent(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let text = format_number(x);
        prop_assert!(!text.contains('e') && !text.contains('E'), "{}", text);
        let parsed: f64 = text.parse().unwrap();
        prop_assert_eq!(parsed, x);
    }

    #[test]
    fn excluded_fields_never_affect_encoding(
        value in arb_value(),
        noise in arb_leaf(),
        other in arb_leaf(),
    ) {
        let base = match value {
            CanonicalValue::Object(map) => map,
            other => [("payload".to_string(), other)].into_iter().collect(),
        };
        let mut noisy = base.clone();
        noisy.insert("run_id".into(), noise);
        noisy.insert("decision_hash".into(), other);
        noisy.insert("generated_at".into(), CanonicalValue::from("2025-01-01T00:00:00Z"));

        let plain = encode(&canonicalize(&CanonicalValue::Object(base.clone())));
        let with_noise = encode(&canonicalize(&CanonicalValue::Object(noisy)));
        prop_assert_eq!(plain, with_noise);
    }

    #[test]
    fn holdings_order_never_affects_hash(ids in arb_holding_ids(), seed in any::<u64>()) {
        let holdings: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| json!({"identity": {"holding_id": id}, "weight": i as f64 / 10.0}))
            .collect();
        let mut shuffled = holdings.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();

        let a = hash_value(&CanonicalValue::from(json!({"portfolio_id": "P", "holdings": holdings})));
        let b = hash_value(&CanonicalValue::from(json!({"portfolio_id": "P", "holdings": shuffled})));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn canonical_output_has_no_ordering_violations(value in arb_value()) {
        prop_assert!(ordering_violations(&canonicalize(&value)).is_empty());
    }
}
