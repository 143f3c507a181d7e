//! Score ceilings supplied by the liquidity and concentration agents.

use committee_types::{agent_names, AgentResult, AgentScope, CapOverride};
use serde_json::Value;

pub const LIQUIDITY_CAP_REASON: &str = "lefo_liquidity_cap";
pub const CONCENTRATION_CAP_REASON: &str = "pscc_position_cap";

/// Caps that apply to `holding_id`, liquidity first.
pub fn score_caps(results: &[AgentResult], holding_id: &str) -> Vec<CapOverride> {
    let mut caps = Vec::new();
    if let Some(cap) = liquidity_cap(results, holding_id) {
        caps.push(cap);
    }
    if let Some(cap) = concentration_cap(results, holding_id) {
        caps.push(cap);
    }
    caps
}

/// LEFO `score_cap` (or `max_score`) for the holding.
pub fn liquidity_cap(results: &[AgentResult], holding_id: &str) -> Option<CapOverride> {
    results
        .iter()
        .filter(|r| {
            r.is(agent_names::LIQUIDITY)
                && !r.is_failed()
                && r.scope == AgentScope::Holding
                && r.holding() == Some(holding_id)
        })
        .find_map(|r| r.finding_f64("score_cap").or_else(|| r.finding_f64("max_score")))
        .map(|cap_value| CapOverride {
            source: agent_names::LIQUIDITY.into(),
            cap_value,
            reason: LIQUIDITY_CAP_REASON.into(),
        })
}

/// PSCC `position_caps_applied` entry for the holding.
///
/// Accepts a map of holding id to cap (a number or an object carrying one)
/// or a list of objects with their own `holding_id`.
pub fn concentration_cap(results: &[AgentResult], holding_id: &str) -> Option<CapOverride> {
    results
        .iter()
        .filter(|r| {
            r.is(agent_names::CONCENTRATION) && !r.is_failed() && r.scope == AgentScope::Portfolio
        })
        .find_map(|r| position_cap(r.finding("position_caps_applied")?, holding_id))
        .map(|cap_value| CapOverride {
            source: agent_names::CONCENTRATION.into(),
            cap_value,
            reason: CONCENTRATION_CAP_REASON.into(),
        })
}

fn position_cap(caps: &Value, holding_id: &str) -> Option<f64> {
    match caps {
        Value::Object(map) => map.get(holding_id).and_then(cap_value),
        Value::Array(items) => items
            .iter()
            .filter(|item| {
                item.get("holding_id")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    == Some(holding_id)
            })
            .find_map(cap_value),
        _ => None,
    }
}

fn cap_value(entry: &Value) -> Option<f64> {
    if let Some(number) = entry.as_f64() {
        return Some(number);
    }
    ["score_cap", "max_score", "cap_score"]
        .iter()
        .find_map(|key| entry.get(key).and_then(Value::as_f64))
}

/// Lower `base` to each cap in turn, keeping the caps that took effect.
pub fn apply_score_caps(base: Option<f64>, caps: Vec<CapOverride>) -> (Option<f64>, Vec<CapOverride>) {
    let mut score = base;
    let mut applied = Vec::new();
    for cap in caps {
        if score.map_or(true, |s| s > cap.cap_value) {
            score = Some(cap.cap_value);
            applied.push(cap);
        }
    }
    (score, applied)
}
