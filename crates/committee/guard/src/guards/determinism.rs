use committee_canonical::{canonicalize, encode, ordering_violations, CanonicalError, CanonicalValue};
use committee_types::{AgentResult, GuardId, GuardResult, GuardViolation, Holding, RunOutcome};
use serde::Serialize;
use tracing::warn;

use crate::context::GuardContext;
use crate::traits::Guard;

/// G7: Determinism
///
/// Self-check of the audit guarantee. The holdings and the agent results,
/// exactly as the run holds them, must already satisfy the canonical list
/// orderings, and canonicalizing each input document a second time must not
/// change its encoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeterminismGuard;

impl DeterminismGuard {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct EmissionOrder<'a> {
    holdings: &'a [Holding],
    agent_outputs: &'a [AgentResult],
}

fn idempotent<T: Serialize + ?Sized>(value: &T) -> Result<bool, CanonicalError> {
    let once = canonicalize(&CanonicalValue::from_serialize(value)?);
    let twice = canonicalize(&once);
    Ok(encode(&once) == encode(&twice))
}

fn check(context: &GuardContext<'_>) -> Result<Vec<&'static str>, CanonicalError> {
    let mut reasons = Vec::new();

    let emitted = EmissionOrder {
        holdings: context.holdings(),
        agent_outputs: context.agent_results,
    };
    let violations = ordering_violations(&CanonicalValue::from_serialize(&emitted)?);
    if !violations.is_empty() {
        warn!(paths = ?violations, "canonical ordering violated");
        reasons.push("determinism_order_violation");
    }

    let stable = idempotent(context.snapshot)?
        && idempotent(context.portfolio_config)?
        && idempotent(context.run_config)?;
    if !stable {
        reasons.push("determinism_hash_idempotence_violation");
    }
    Ok(reasons)
}

impl Guard for DeterminismGuard {
    fn id(&self) -> GuardId {
        GuardId::G7
    }

    fn evaluate(&self, context: &GuardContext<'_>) -> GuardResult {
        let reasons = check(context).unwrap_or_else(|e| {
            warn!(error = %e, "determinism check could not serialize its inputs");
            vec!["determinism_serialization_failed"]
        });
        let violations = reasons
            .into_iter()
            .map(|reason| GuardViolation::portfolio(GuardId::G7, RunOutcome::Failed, reason))
            .collect();
        GuardResult::from_violations(GuardId::G7, violations)
    }
}
