pub mod conformance;
pub mod determinism;
pub mod identity;
pub mod input;
pub mod partial_failure;
pub mod precedence;
pub mod provenance;
pub mod registries;
pub mod reserved;

pub use conformance::AgentConformanceGuard;
pub use determinism::DeterminismGuard;
pub use identity::IdentityGuard;
pub use input::InputSchemaGuard;
pub use partial_failure::PartialFailureGuard;
pub use precedence::GovernancePrecedenceGuard;
pub use provenance::ProvenanceGuard;
pub use registries::RegistriesGuard;
pub use reserved::{ArtifactCompletenessGuard, EmissionEligibilityGuard, FreshnessGuard};
