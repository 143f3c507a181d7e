use committee_types::{GuardId, GuardResult, GuardViolation, RunOutcome};

use crate::context::GuardContext;
use crate::traits::Guard;

/// G1: Identity
///
/// The portfolio needs a base currency; without one nothing downstream can
/// be priced, so the whole run is vetoed. Each holding needs an id and a
/// ticker or other market identifier; a holding without them fails on its
/// own while the rest of the run continues.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityGuard;

impl IdentityGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Guard for IdentityGuard {
    fn id(&self) -> GuardId {
        GuardId::G1
    }

    fn evaluate(&self, context: &GuardContext<'_>) -> GuardResult {
        if context.portfolio_config.base_currency().is_none() {
            return GuardResult::from_violations(
                GuardId::G1,
                vec![GuardViolation::portfolio(
                    GuardId::G1,
                    RunOutcome::Vetoed,
                    "missing_base_currency",
                )],
            );
        }

        let violations = context
            .holdings()
            .iter()
            .enumerate()
            .filter(|(_, holding)| {
                let identified = holding
                    .identity
                    .as_ref()
                    .is_some_and(|identity| identity.has_market_identifier());
                holding.holding_id().is_none() || !identified
            })
            .map(|(index, _)| {
                GuardViolation::holding(
                    GuardId::G1,
                    context.holding_ref(index),
                    RunOutcome::Failed,
                    "holding_identity_missing",
                )
            })
            .collect();

        GuardResult::from_violations(GuardId::G1, violations)
    }
}
