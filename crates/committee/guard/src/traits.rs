use committee_types::{GuardId, GuardResult};

use crate::context::GuardContext;

/// One independent policy check.
///
/// Guards are pure: the same context always yields the same result, and a
/// guard never mutates shared state. Bookkeeping of the violations it
/// raises is the [`GovernanceEngine`](crate::GovernanceEngine)'s job.
pub trait Guard: Send + Sync {
    /// Position in the chain.
    fn id(&self) -> GuardId;

    /// Human-readable name.
    fn name(&self) -> &str {
        self.id().name()
    }

    /// Evaluate against the current context.
    fn evaluate(&self, context: &GuardContext<'_>) -> GuardResult;
}
