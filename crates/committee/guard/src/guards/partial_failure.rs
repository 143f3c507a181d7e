use committee_types::{GuardId, GuardResult, GuardViolation, RunOutcome};
use tracing::debug;

use crate::context::GuardContext;
use crate::traits::Guard;

/// G9: Partial Failure
///
/// Vetoes the portfolio when the share of FAILED or VETOED holdings is
/// strictly greater than `partial_failure_veto_threshold_pct`. An empty
/// portfolio fails outright.
#[derive(Clone, Copy, Debug, Default)]
pub struct PartialFailureGuard;

impl PartialFailureGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Guard for PartialFailureGuard {
    fn id(&self) -> GuardId {
        GuardId::G9
    }

    fn evaluate(&self, context: &GuardContext<'_>) -> GuardResult {
        let total = context.ledger.len();
        if total == 0 {
            return GuardResult::from_violations(
                GuardId::G9,
                vec![GuardViolation::portfolio(
                    GuardId::G9,
                    RunOutcome::Failed,
                    "no_holdings_provided",
                )],
            );
        }

        let failed = context.ledger.failed_or_vetoed();
        let failure_pct = failed as f64 / total as f64 * 100.0;
        let threshold = context.run_config.partial_failure_veto_threshold_pct;
        debug!(failed, total, failure_pct, threshold, "partial failure rate");

        let violations = if failure_pct > threshold {
            vec![GuardViolation::portfolio(
                GuardId::G9,
                RunOutcome::Vetoed,
                "partial_failure_threshold_exceeded",
            )]
        } else {
            Vec::new()
        };
        GuardResult::from_violations(GuardId::G9, violations)
    }
}
