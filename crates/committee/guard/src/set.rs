use committee_types::{GuardId, GuardResult};
use tracing::{debug, warn};

use crate::context::GuardContext;
use crate::guards::{
    AgentConformanceGuard, ArtifactCompletenessGuard, DeterminismGuard, EmissionEligibilityGuard,
    FreshnessGuard, GovernancePrecedenceGuard, IdentityGuard, InputSchemaGuard,
    PartialFailureGuard, ProvenanceGuard, RegistriesGuard,
};
use crate::traits::Guard;

/// The eleven guards, indexed by [`GuardId`].
pub struct GuardSet {
    guards: [Box<dyn Guard>; 11],
}

impl GuardSet {
    /// The standard chain, G0 through G10.
    pub fn standard() -> Self {
        Self {
            guards: [
                Box::new(InputSchemaGuard::new()),
                Box::new(IdentityGuard::new()),
                Box::new(ProvenanceGuard::new()),
                Box::new(FreshnessGuard::new()),
                Box::new(RegistriesGuard::new()),
                Box::new(AgentConformanceGuard::new()),
                Box::new(GovernancePrecedenceGuard::new()),
                Box::new(DeterminismGuard::new()),
                Box::new(EmissionEligibilityGuard::new()),
                Box::new(PartialFailureGuard::new()),
                Box::new(ArtifactCompletenessGuard::new()),
            ],
        }
    }

    pub fn get(&self, id: GuardId) -> &dyn Guard {
        &*self.guards[id.number() as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Guard> {
        self.guards.iter().map(|g| &**g)
    }

    /// Evaluate one guard against `context`.
    pub fn evaluate(&self, id: GuardId, context: &GuardContext<'_>) -> GuardResult {
        let guard = self.get(id);
        let result = guard.evaluate(context);
        if result.is_fail() {
            warn!(guard = %id, name = guard.name(), reasons = ?result.reasons, "guard failed");
        } else {
            debug!(guard = %id, name = guard.name(), verdict = ?result.verdict, "guard evaluated");
        }
        result
    }
}

impl Default for GuardSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn guards_are_stored_in_id_order() {
        let set = GuardSet::standard();
        let ids: Vec<GuardId> = set.iter().map(|g| g.id()).collect();
        assert_eq!(ids, GuardId::ALL.to_vec());
        assert_eq!(set.get(GuardId::G7).name(), "determinism");
    }

    #[test]
    fn clean_fixture_passes_every_guard() {
        let fixture = Fixture::new(&["H1", "H2"]);
        let set = GuardSet::standard();
        for id in GuardId::ALL {
            assert!(set.evaluate(id, &fixture.context()).is_pass(), "{id} failed");
        }
    }
}
