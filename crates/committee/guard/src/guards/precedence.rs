use committee_types::{GuardId, GuardResult, GuardViolation, RunOutcome};

use crate::context::GuardContext;
use crate::governance::do_not_trade_signals;
use crate::traits::Guard;

/// G6: Governance Precedence
///
/// A do-not-trade signal, from the macro-regime agent or the run config,
/// short-circuits the portfolio. A run that has already FAILED or been
/// VETOED keeps that outcome and this guard is skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct GovernancePrecedenceGuard;

impl GovernancePrecedenceGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Guard for GovernancePrecedenceGuard {
    fn id(&self) -> GuardId {
        GuardId::G6
    }

    fn evaluate(&self, context: &GuardContext<'_>) -> GuardResult {
        if context.portfolio_terminated() {
            return GuardResult::skip(GuardId::G6, "portfolio_already_terminal");
        }
        let violations = do_not_trade_signals(context.agent_results, context.run_config)
            .into_iter()
            .map(|reason| {
                GuardViolation::portfolio(GuardId::G6, RunOutcome::ShortCircuited, reason)
            })
            .collect();
        GuardResult::from_violations(GuardId::G6, violations)
    }
}
