use committee_types::{
    agent_names, AgentResult, AgentScope, GuardId, GuardResult, GuardViolation,
    IntegrityFindings, RunOutcome,
};
use tracing::debug;

use crate::context::GuardContext;
use crate::traits::Guard;

/// G5: Agent Conformance
///
/// Checks every agent result accumulated so far. Problems with a
/// holding-scoped result fail only that holding. Problems with a
/// portfolio-scoped result, or a holding-scoped result that cannot be tied
/// to a known holding, fail the run.
#[derive(Clone, Copy, Debug, Default)]
pub struct AgentConformanceGuard;

impl AgentConformanceGuard {
    pub fn new() -> Self {
        Self
    }
}

/// Reason codes for everything wrong with `result`, regardless of scope.
fn defects(result: &AgentResult) -> Vec<&'static str> {
    let mut defects = Vec::new();
    if result.agent_name.trim().is_empty() {
        defects.push("agent_name_missing");
    }
    if !result.confidence.is_finite() || !(0.0..=1.0).contains(&result.confidence) {
        defects.push("agent_confidence_out_of_range");
    }
    if result.is_failed() {
        defects.push("agent_status_failed");
    }
    if result
        .suggested_penalties
        .iter()
        .any(|p| !p.amount.is_finite() || p.amount >= 0.0)
    {
        defects.push("agent_penalty_amount_invalid");
    }
    if result.scope == AgentScope::Portfolio && result.holding().is_some() {
        defects.push("agent_scope_invalid");
    }
    if result.is(agent_names::INTEGRITY)
        && IntegrityFindings::from_findings(&result.key_findings).is_err()
    {
        defects.push("agent_findings_invalid");
    }
    defects
}

impl Guard for AgentConformanceGuard {
    fn id(&self) -> GuardId {
        GuardId::G5
    }

    fn evaluate(&self, context: &GuardContext<'_>) -> GuardResult {
        let fail_portfolio =
            |reason: &str| GuardViolation::portfolio(GuardId::G5, RunOutcome::Failed, reason);
        let mut violations = Vec::new();

        for result in context.agent_results {
            let defects = defects(result);
            match result.scope {
                AgentScope::Portfolio => {
                    violations.extend(defects.into_iter().map(fail_portfolio));
                }
                AgentScope::Holding => match result.holding() {
                    None => {
                        violations.push(fail_portfolio("agent_missing_holding_id"));
                        violations.extend(defects.into_iter().map(fail_portfolio));
                    }
                    Some(id) => match context.ledger.index_of(id) {
                        None => {
                            debug!(agent = %result.agent_name, holding = id, "agent result for unknown holding");
                            violations.push(fail_portfolio("agent_unknown_holding_id"));
                        }
                        Some(index) => {
                            violations.extend(defects.into_iter().map(|reason| {
                                GuardViolation::holding(
                                    GuardId::G5,
                                    context.holding_ref(index),
                                    RunOutcome::Failed,
                                    reason,
                                )
                            }));
                        }
                    },
                },
            }
        }

        GuardResult::from_violations(GuardId::G5, violations)
    }
}
