use committee_types::{GuardId, GuardResult, GuardViolation, RunOutcome};

use crate::context::GuardContext;
use crate::traits::Guard;

/// G4: Registries
///
/// The config snapshot must carry its registries block.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegistriesGuard;

impl RegistriesGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Guard for RegistriesGuard {
    fn id(&self) -> GuardId {
        GuardId::G4
    }

    fn evaluate(&self, context: &GuardContext<'_>) -> GuardResult {
        let violations = match context.config_snapshot.registries {
            Some(_) => Vec::new(),
            None => vec![GuardViolation::portfolio(
                GuardId::G4,
                RunOutcome::Failed,
                "missing_registries",
            )],
        };
        GuardResult::from_violations(GuardId::G4, violations)
    }
}
