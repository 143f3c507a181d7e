//! Guards that hold a slot in the chain but currently always pass.

use committee_types::{GuardId, GuardResult};

use crate::context::GuardContext;
use crate::traits::Guard;

macro_rules! reserved_guard {
    ($(#[$doc:meta])* $name:ident, $id:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl $name {
            pub fn new() -> Self {
                Self
            }
        }

        impl Guard for $name {
            fn id(&self) -> GuardId {
                $id
            }

            fn evaluate(&self, _context: &GuardContext<'_>) -> GuardResult {
                GuardResult::pass($id)
            }
        }
    };
}

reserved_guard!(
    /// G3: Freshness. Staleness is scored by the penalty engine instead.
    FreshnessGuard,
    GuardId::G3
);

reserved_guard!(
    /// G8: Emission eligibility. The aggregator decides what is emitted.
    EmissionEligibilityGuard,
    GuardId::G8
);

reserved_guard!(
    /// G10: Artifact completeness.
    ArtifactCompletenessGuard,
    GuardId::G10
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn reserved_guards_pass_even_on_empty_portfolios() {
        let fixture = Fixture::new(&[]);
        let context = fixture.context();
        assert!(FreshnessGuard::new().evaluate(&context).is_pass());
        assert!(EmissionEligibilityGuard::new().evaluate(&context).is_pass());
        assert!(ArtifactCompletenessGuard::new().evaluate(&context).is_pass());
        assert_eq!(ArtifactCompletenessGuard::new().name(), "artifact_completeness");
    }
}
