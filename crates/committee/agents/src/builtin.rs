//! Fixture-driven implementations of the eight standard agents.
//!
//! A fixture may put findings under `key_findings` or directly at its top
//! level; both are merged, `key_findings` winning on conflicts. Each agent
//! then fills in the findings it always reports.

use std::collections::BTreeMap;

use committee_types::{
    agent_names, AgentResult, AgentScope, AgentStatus, IntegrityFindings, MetricValue, PenaltyItem,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AgentContext;
use crate::error::AgentError;
use crate::traits::Agent;

type Findings = BTreeMap<String, Value>;
type Shape = fn(&AgentContext<'_>, &mut Findings) -> Result<(), AgentError>;

const DEFAULT_VERSION: &str = "0.1";
const PORTFOLIO: &[AgentScope] = &[AgentScope::Portfolio];
const HOLDING: &[AgentScope] = &[AgentScope::Holding];
const BOTH: &[AgentScope] = &[AgentScope::Portfolio, AgentScope::Holding];

#[derive(Debug, Default, Deserialize)]
struct Seed {
    #[serde(default)]
    key_findings: Findings,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    status: Option<AgentStatus>,
    #[serde(default)]
    veto_flags: Vec<String>,
    #[serde(default)]
    counter_case: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    metrics: BTreeMap<String, MetricValue>,
    #[serde(default)]
    suggested_penalties: Vec<PenaltyItem>,
    #[serde(flatten)]
    extra: Findings,
}

/// A standard agent that reports what its fixture says.
pub struct FixtureAgent {
    name: &'static str,
    version: String,
    scopes: &'static [AgentScope],
    shape: Shape,
}

impl FixtureAgent {
    fn new(name: &'static str, scopes: &'static [AgentScope], shape: Shape) -> Self {
        Self {
            name,
            version: DEFAULT_VERSION.to_owned(),
            scopes,
            shape,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// DIO: data integrity findings, validated against the integrity schema.
    pub fn integrity() -> Self {
        Self::new(agent_names::INTEGRITY, BOTH, |_, findings| {
            defaults(
                findings,
                [
                    ("staleness_flags", json!([])),
                    ("missing_hard_stop_fields", json!([])),
                    ("missing_penalty_critical_fields", json!([])),
                    ("contradictions", json!([])),
                    ("unsourced_numbers_detected", json!(false)),
                    ("corporate_action_risk", Value::Null),
                    ("low_source_reliability", json!(false)),
                    ("integrity_veto_triggered", json!(false)),
                ],
            );
            IntegrityFindings::from_findings(findings).map_err(|source| {
                AgentError::InvalidFindings {
                    agent: agent_names::INTEGRITY.to_owned(),
                    source,
                }
            })?;
            Ok(())
        })
    }

    /// GRRA: macro regime, including the do-not-trade flag.
    pub fn macro_regime() -> Self {
        Self::new(agent_names::MACRO_REGIME, PORTFOLIO, |context, findings| {
            if findings.get("regime_label").map_or(true, Value::is_null) {
                findings.insert("regime_label".into(), json!("unknown"));
                findings.insert("missing_reason".into(), json!("macro_regime_input_missing"));
            }
            defaults(
                findings,
                [
                    ("regime_confidence", Value::Null),
                    ("do_not_trade_flag", json!(false)),
                ],
            );
            if context.inputs.run_config.do_not_trade_flag {
                findings.insert("do_not_trade_flag".into(), json!(true));
            }
            Ok(())
        })
    }

    /// LEFO: per-holding liquidity, optionally capping the score.
    pub fn liquidity() -> Self {
        Self::new(agent_names::LIQUIDITY, HOLDING, |_, findings| {
            defaults(
                findings,
                [
                    ("liquidity_grade", json!("unknown")),
                    ("exit_risk_warnings", json!([])),
                    ("hard_override_triggered", json!(false)),
                ],
            );
            Ok(())
        })
    }

    /// PSCC: portfolio concentration, position caps and FX exposure.
    pub fn concentration() -> Self {
        Self::new(agent_names::CONCENTRATION, PORTFOLIO, |_, findings| {
            defaults(
                findings,
                [
                    ("concentration_breaches", json!([])),
                    ("position_caps_applied", json!([])),
                    ("fx_exposure_by_currency", json!({})),
                    ("portfolio_liquidity_risk", json!([])),
                ],
            );
            Ok(())
        })
    }

    pub fn risk_officer() -> Self {
        Self::new(agent_names::RISK_OFFICER, HOLDING, |_, findings| {
            defaults(findings, [("risk_summary", json!("neutral"))]);
            Ok(())
        })
    }

    pub fn fundamentals() -> Self {
        Self::new(agent_names::FUNDAMENTALS, HOLDING, |_, _| Ok(()))
    }

    pub fn technical() -> Self {
        Self::new(agent_names::TECHNICAL, HOLDING, |_, findings| {
            defaults(findings, [("technical_signals", json!({}))]);
            Ok(())
        })
    }

    pub fn devils_advocate() -> Self {
        Self::new(agent_names::DEVILS_ADVOCATE, HOLDING, |_, findings| {
            defaults(
                findings,
                [
                    ("unresolved_fatal_risk", json!(false)),
                    ("risk_flags", json!([])),
                    ("narrative_limitations", json!("")),
                ],
            );
            Ok(())
        })
    }

    /// All eight standard agents.
    pub fn standard() -> Vec<FixtureAgent> {
        vec![
            Self::integrity(),
            Self::macro_regime(),
            Self::liquidity(),
            Self::concentration(),
            Self::risk_officer(),
            Self::fundamentals(),
            Self::technical(),
            Self::devils_advocate(),
        ]
    }
}

fn defaults<const N: usize>(findings: &mut Findings, entries: [(&str, Value); N]) {
    for (key, value) in entries {
        findings.entry(key.to_owned()).or_insert(value);
    }
}

impl Agent for FixtureAgent {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn scopes(&self) -> &[AgentScope] {
        self.scopes
    }

    fn evaluate(&self, context: &AgentContext<'_>) -> Result<AgentResult, AgentError> {
        let seed = match context.fixture(self.name) {
            Some(fixture) => Seed::deserialize(fixture).map_err(|source| {
                AgentError::InvalidFixture {
                    agent: self.name.to_owned(),
                    source,
                }
            })?,
            None => Seed::default(),
        };

        let mut findings = seed.extra;
        findings.extend(seed.key_findings);
        (self.shape)(context, &mut findings)?;

        let mut result = AgentResult::completed(self.name, context.scope);
        result.agent_version = Some(self.version.clone());
        result.holding_id = context.holding_id().map(str::to_owned);
        result.status = seed.status.unwrap_or(AgentStatus::Completed);
        result.confidence = seed.confidence.unwrap_or(1.0);
        result.key_findings = findings;
        result.metrics = seed.metrics;
        result.suggested_penalties = seed.suggested_penalties;
        result.veto_flags = seed.veto_flags;
        result.counter_case = seed.counter_case;
        result.notes = seed.notes;
        Ok(result)
    }
}
