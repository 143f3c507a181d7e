use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentResult;
use crate::config::ConfigHashes;
use crate::guard::GuardResult;
use crate::holding::HoldingIdentity;
use crate::outcome::{RunMode, RunOutcome};
use crate::penalty::PenaltyBreakdown;

/// A score ceiling imposed by another agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapOverride {
    pub source: String,
    pub cap_value: f64,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub base_score: Option<f64>,
    pub penalty_breakdown: PenaltyBreakdown,
    pub final_score: Option<f64>,
    #[serde(default)]
    pub applied_caps: Vec<CapOverride>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoldingPacket {
    pub holding_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<HoldingIdentity>,
    pub holding_run_outcome: RunOutcome,
    pub scorecard: Option<Scorecard>,
    #[serde(default)]
    pub limitations: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PacketSummary {
    pub counts_by_outcome: BTreeMap<RunOutcome, usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub veto_reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_circuit_reasons: Vec<String>,
}

/// The five audit component digests and the composed run digest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditHashes {
    pub snapshot_hash: Option<String>,
    pub config_hash: Option<String>,
    pub run_config_hash: Option<String>,
    pub committee_packet_hash: Option<String>,
    pub decision_hash: Option<String>,
    pub run_hash: Option<String>,
}

impl AuditHashes {
    pub fn is_complete(&self) -> bool {
        [
            &self.snapshot_hash,
            &self.config_hash,
            &self.run_config_hash,
            &self.committee_packet_hash,
            &self.decision_hash,
            &self.run_hash,
        ]
        .iter()
        .all(|h| h.is_some())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Decision packet for COMPLETED, VETOED and SHORT_CIRCUITED runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCommitteePacket {
    pub run_id: String,
    pub portfolio_id: String,
    pub as_of_date: DateTime<Utc>,
    pub base_currency: Option<String>,
    pub run_mode: RunMode,
    pub portfolio_run_outcome: RunOutcome,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub holdings: Vec<HoldingPacket>,
    #[serde(default)]
    pub per_holding_outcomes: BTreeMap<String, RunOutcome>,
    #[serde(default)]
    pub summary: PacketSummary,
    #[serde(default)]
    pub governance_trail: Vec<GuardResult>,
    #[serde(default)]
    pub agent_outputs: Vec<AgentResult>,
    #[serde(flatten)]
    pub hashes: AuditHashes,
}

/// Packet for FAILED runs. Never carries holdings or audit hashes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailedRunPacket {
    pub run_id: String,
    pub portfolio_run_outcome: RunOutcome,
    pub failure_reason: String,
    pub reasons: Vec<String>,
    pub portfolio_id: Option<String>,
    pub as_of_date: Option<DateTime<Utc>>,
    pub base_currency: Option<String>,
    pub run_mode: Option<RunMode>,
    #[serde(default)]
    pub config_hashes: ConfigHashes,
}

/// Either packet shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunPacket {
    Committee(Box<PortfolioCommitteePacket>),
    Failed(FailedRunPacket),
}

impl RunPacket {
    pub fn outcome(&self) -> RunOutcome {
        match self {
            RunPacket::Committee(packet) => packet.portfolio_run_outcome,
            RunPacket::Failed(packet) => packet.portfolio_run_outcome,
        }
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            RunPacket::Committee(packet) => &packet.reasons,
            RunPacket::Failed(packet) => &packet.reasons,
        }
    }

    pub fn committee(&self) -> Option<&PortfolioCommitteePacket> {
        match self {
            RunPacket::Committee(packet) => Some(packet),
            RunPacket::Failed(_) => None,
        }
    }

    pub fn failed(&self) -> Option<&FailedRunPacket> {
        match self {
            RunPacket::Failed(packet) => Some(packet),
            RunPacket::Committee(_) => None,
        }
    }
}
