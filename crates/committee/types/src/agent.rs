use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::holding::MetricValue;
use crate::penalty::PenaltyItem;

/// Names of the standard agents, as they appear in results and fixtures.
pub mod agent_names {
    /// Data integrity officer: identity, provenance and staleness findings.
    pub const INTEGRITY: &str = "DIO";
    /// Global regime risk analyst: macro regime and the do-not-trade signal.
    pub const MACRO_REGIME: &str = "GRRA";
    /// Liquidity and exit feasibility officer.
    pub const LIQUIDITY: &str = "LEFO";
    /// Portfolio structure and concentration checker, including FX exposure.
    pub const CONCENTRATION: &str = "PSCC";
    pub const RISK_OFFICER: &str = "RiskOfficer";
    pub const FUNDAMENTALS: &str = "Fundamentals";
    pub const TECHNICAL: &str = "Technical";
    pub const DEVILS_ADVOCATE: &str = "DevilsAdvocate";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentScope {
    Portfolio,
    Holding,
}

impl fmt::Display for AgentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentScope::Portfolio => f.write_str("portfolio"),
            AgentScope::Holding => f.write_str("holding"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Completed,
    Failed,
    Skipped,
}

/// The structured record one agent invocation returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_version: Option<String>,
    pub scope: AgentScope,
    pub status: AgentStatus,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_id: Option<String>,
    #[serde(default)]
    pub key_findings: BTreeMap<String, Value>,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricValue>,
    #[serde(default)]
    pub suggested_penalties: Vec<PenaltyItem>,
    #[serde(default)]
    pub veto_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AgentResult {
    /// A completed result with full confidence and no findings.
    pub fn completed(agent_name: impl Into<String>, scope: AgentScope) -> Self {
        Self {
            agent_name: agent_name.into(),
            agent_version: None,
            scope,
            status: AgentStatus::Completed,
            confidence: 1.0,
            holding_id: None,
            key_findings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            suggested_penalties: Vec::new(),
            veto_flags: Vec::new(),
            counter_case: None,
            notes: None,
        }
    }

    /// A failed result carrying the fault in its findings.
    pub fn failed(
        agent_name: impl Into<String>,
        scope: AgentScope,
        holding_id: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut result = Self::completed(agent_name, scope);
        result.status = AgentStatus::Failed;
        result.confidence = 0.0;
        result.holding_id = holding_id;
        result
            .key_findings
            .insert("conformance_error".into(), Value::Bool(true));
        result
            .key_findings
            .insert("error".into(), Value::String(error.into()));
        result
    }

    pub fn for_holding(mut self, holding_id: impl Into<String>) -> Self {
        self.holding_id = Some(holding_id.into());
        self
    }

    pub fn with_finding(mut self, key: impl Into<String>, value: Value) -> Self {
        self.key_findings.insert(key.into(), value);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_veto_flag(mut self, flag: impl Into<String>) -> Self {
        self.veto_flags.push(flag.into());
        self
    }

    pub fn is(&self, agent_name: &str) -> bool {
        self.agent_name.trim() == agent_name
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, AgentStatus::Failed)
    }

    /// Trimmed holding id, if any.
    pub fn holding(&self) -> Option<&str> {
        self.holding_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn finding(&self, key: &str) -> Option<&Value> {
        self.key_findings.get(key)
    }

    /// A finding interpreted as a flag; anything but `true` is false.
    pub fn finding_flag(&self, key: &str) -> bool {
        matches!(self.key_findings.get(key), Some(Value::Bool(true)))
    }

    pub fn finding_f64(&self, key: &str) -> Option<f64> {
        self.key_findings.get(key).and_then(Value::as_f64)
    }

    /// Sort key used when emitting agent outputs.
    pub fn order_key(&self) -> (&str, &str) {
        (self.agent_name.trim(), self.holding().unwrap_or(""))
    }
}
