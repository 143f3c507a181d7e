use committee_agents::RegistryError;
use committee_canonical::CanonicalError;
use thiserror::Error;

/// Errors outside the run outcome model.
///
/// Problems with the inputs themselves never surface here; they become
/// FAILED, VETOED or SHORT_CIRCUITED outcomes.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("canonical encoding failed: {0}")]
    Canonical(#[from] CanonicalError),

    #[error("agent registry: {0}")]
    Registry(#[from] RegistryError),
}
