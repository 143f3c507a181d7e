//! Field exclusion and list-ordering rules.

use crate::encode::encode;
use crate::value::CanonicalValue;

/// Keys dropped wherever they appear as object keys.
///
/// Run-specific metadata, free text, wall-clock timestamps, and every
/// precomputed hash field.
pub const EXCLUDED_KEYS: &[&str] = &[
    "run_id",
    "generated_at",
    "retrieval_timestamp",
    "notes",
    "disclaimers",
    "limitations",
    "recovery_suggestions",
    "start_time",
    "end_time",
    "duration_seconds",
    "started_at_utc",
    "ended_at_utc",
    "snapshot_hash",
    "config_hash",
    "run_config_hash",
    "config_snapshot_hash",
    "committee_packet_hash",
    "decision_hash",
    "run_hash",
    "content_hash",
];

/// Keys whose string values are trimmed.
pub const IDENTIFIER_KEYS: &[&str] = &["holding_id", "agent_name"];

pub fn is_excluded(key: &str) -> bool {
    EXCLUDED_KEYS.contains(&key)
}

pub fn is_identifier(key: &str) -> bool {
    IDENTIFIER_KEYS.contains(&key)
}

/// Sort order for a list under a known parent key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderingRule {
    /// `identity.holding_id`, falling back to a top-level `holding_id`.
    Holdings,
    /// `agent_name`.
    AgentOutputs,
    /// `(category, reason, source_agent)`.
    PenaltyItems,
    /// `holding_id`.
    ConcentrationBreaches,
    /// `guard_id`.
    GuardEvents,
    /// `(sequence_number, agent_name, rule_id)`.
    VetoLogs,
}

impl OrderingRule {
    pub fn for_parent(key: &str) -> Option<Self> {
        match key {
            "holdings" => Some(OrderingRule::Holdings),
            "agent_outputs" | "agent_results" => Some(OrderingRule::AgentOutputs),
            "penalty_items" => Some(OrderingRule::PenaltyItems),
            "concentration_breaches" => Some(OrderingRule::ConcentrationBreaches),
            "governance_trail" | "guard_results" => Some(OrderingRule::GuardEvents),
            "veto_logs" => Some(OrderingRule::VetoLogs),
            _ => None,
        }
    }

    /// Primary sort key of one (already canonical) list element.
    pub fn key_of(self, item: &CanonicalValue) -> Vec<String> {
        let field = |name: &str| key_text(item.get(name));
        match self {
            OrderingRule::Holdings => {
                let nested = item.get("identity").and_then(|i| i.get("holding_id"));
                let id = key_text(nested);
                if id.is_empty() {
                    vec![field("holding_id")]
                } else {
                    vec![id]
                }
            }
            OrderingRule::AgentOutputs => vec![field("agent_name")],
            OrderingRule::PenaltyItems => {
                vec![field("category"), field("reason"), field("source_agent")]
            }
            OrderingRule::ConcentrationBreaches => vec![field("holding_id")],
            OrderingRule::GuardEvents => vec![field("guard_id")],
            OrderingRule::VetoLogs => {
                vec![field("sequence_number"), field("agent_name"), field("rule_id")]
            }
        }
    }

    /// Full ordering key: the primary key, then the element's own encoding.
    ///
    /// The encoding tie-break makes the order total, so elements sharing a
    /// primary key (for example one integrity result per holding) still land
    /// in the same place whatever order they arrived in.
    pub fn full_key(self, item: &CanonicalValue) -> (Vec<String>, String) {
        (self.key_of(item), encode(item))
    }
}

fn key_text(value: Option<&CanonicalValue>) -> String {
    match value {
        None | Some(CanonicalValue::Null) => String::new(),
        Some(CanonicalValue::String(s)) => s.clone(),
        Some(CanonicalValue::Int(i)) => format!("{i:020}"),
        Some(other) => encode(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_parents_map_to_rules() {
        assert_eq!(OrderingRule::for_parent("agent_results"), Some(OrderingRule::AgentOutputs));
        assert_eq!(OrderingRule::for_parent("guard_results"), Some(OrderingRule::GuardEvents));
        assert_eq!(OrderingRule::for_parent("tags"), None);
    }

    #[test]
    fn holdings_key_prefers_identity() {
        let item = CanonicalValue::from(json!({"identity": {"holding_id": "H2"}, "holding_id": "H9"}));
        assert_eq!(OrderingRule::Holdings.key_of(&item), vec!["H2"]);
        let flat = CanonicalValue::from(json!({"holding_id": "H9"}));
        assert_eq!(OrderingRule::Holdings.key_of(&flat), vec!["H9"]);
        let none = CanonicalValue::from(json!({"weight": 1}));
        assert_eq!(OrderingRule::Holdings.key_of(&none), vec![""]);
    }

    #[test]
    fn excluded_keys_cover_hash_fields() {
        for key in ["run_hash", "decision_hash", "run_id", "notes"] {
            assert!(is_excluded(key));
        }
        assert!(!is_excluded("holding_id"));
    }
}
