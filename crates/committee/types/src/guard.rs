use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outcome::RunOutcome;

/// The eleven guards, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GuardId {
    G0,
    G1,
    G2,
    G3,
    G4,
    G5,
    G6,
    G7,
    G8,
    G9,
    G10,
}

impl GuardId {
    pub const ALL: [GuardId; 11] = [
        GuardId::G0,
        GuardId::G1,
        GuardId::G2,
        GuardId::G3,
        GuardId::G4,
        GuardId::G5,
        GuardId::G6,
        GuardId::G7,
        GuardId::G8,
        GuardId::G9,
        GuardId::G10,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Short descriptive name of the check.
    pub fn name(self) -> &'static str {
        match self {
            GuardId::G0 => "input_schema",
            GuardId::G1 => "identity",
            GuardId::G2 => "provenance",
            GuardId::G3 => "freshness",
            GuardId::G4 => "registries",
            GuardId::G5 => "agent_conformance",
            GuardId::G6 => "governance_precedence",
            GuardId::G7 => "determinism",
            GuardId::G8 => "emission_eligibility",
            GuardId::G9 => "partial_failure",
            GuardId::G10 => "artifact_completeness",
        }
    }
}

impl fmt::Display for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.number())
    }
}

/// A guard's verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GuardVerdict {
    Pass,
    /// The guard found violations; `outcome` is the worst one it raised.
    Fail { outcome: RunOutcome },
    /// Not evaluated because the run had already terminated.
    Skip,
}

/// A holding addressed by arena index, with its id as a fallback.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingRef {
    #[serde(skip)]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_id: Option<String>,
}

impl HoldingRef {
    pub fn indexed(index: usize, holding_id: Option<&str>) -> Self {
        Self {
            index: Some(index),
            holding_id: holding_id.map(str::to_owned),
        }
    }

    pub fn by_id(holding_id: impl Into<String>) -> Self {
        Self {
            index: None,
            holding_id: Some(holding_id.into()),
        }
    }
}

/// Target of a violation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ViolationTarget {
    Portfolio,
    Holding(HoldingRef),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardViolation {
    pub guard_id: GuardId,
    #[serde(flatten)]
    pub target: ViolationTarget,
    pub outcome: RunOutcome,
    pub reason: String,
}

impl GuardViolation {
    pub fn portfolio(guard_id: GuardId, outcome: RunOutcome, reason: impl Into<String>) -> Self {
        Self {
            guard_id,
            target: ViolationTarget::Portfolio,
            outcome,
            reason: reason.into(),
        }
    }

    pub fn holding(
        guard_id: GuardId,
        holding: HoldingRef,
        outcome: RunOutcome,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            guard_id,
            target: ViolationTarget::Holding(holding),
            outcome,
            reason: reason.into(),
        }
    }

    pub fn is_portfolio(&self) -> bool {
        matches!(self.target, ViolationTarget::Portfolio)
    }
}

/// Outcome of evaluating one guard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardResult {
    pub guard_id: GuardId,
    #[serde(flatten)]
    pub verdict: GuardVerdict,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub violations: Vec<GuardViolation>,
}

impl GuardResult {
    pub fn pass(guard_id: GuardId) -> Self {
        Self {
            guard_id,
            verdict: GuardVerdict::Pass,
            reasons: Vec::new(),
            violations: Vec::new(),
        }
    }

    pub fn skip(guard_id: GuardId, reason: impl Into<String>) -> Self {
        Self {
            guard_id,
            verdict: GuardVerdict::Skip,
            reasons: vec![reason.into()],
            violations: Vec::new(),
        }
    }

    /// Pass when `violations` is empty, otherwise fail with the worst outcome raised.
    pub fn from_violations(guard_id: GuardId, violations: Vec<GuardViolation>) -> Self {
        let worst = violations
            .iter()
            .map(|v| v.outcome)
            .max_by_key(|o| o.severity());
        match worst {
            None => Self::pass(guard_id),
            Some(outcome) => {
                let mut reasons: Vec<String> = violations.iter().map(|v| v.reason.clone()).collect();
                reasons.sort();
                reasons.dedup();
                Self {
                    guard_id,
                    verdict: GuardVerdict::Fail { outcome },
                    reasons,
                    violations,
                }
            }
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.verdict, GuardVerdict::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self.verdict, GuardVerdict::Fail { .. })
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.verdict, GuardVerdict::Skip)
    }

    pub fn portfolio_violations(&self) -> impl Iterator<Item = &GuardViolation> {
        self.violations.iter().filter(|v| v.is_portfolio())
    }
}
