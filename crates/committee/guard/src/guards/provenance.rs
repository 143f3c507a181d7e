use committee_types::{GuardId, GuardResult, GuardViolation, RunOutcome};
use tracing::warn;

use crate::context::GuardContext;
use crate::traits::Guard;

/// G2: Provenance
///
/// Every numeric metric that is present and applicable must carry a
/// `source_ref`. An unsourced number anywhere vetoes the whole portfolio.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProvenanceGuard;

impl ProvenanceGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Guard for ProvenanceGuard {
    fn id(&self) -> GuardId {
        GuardId::G2
    }

    fn evaluate(&self, context: &GuardContext<'_>) -> GuardResult {
        let mut unsourced = 0usize;
        for holding in context.holdings() {
            for (metric, value) in &holding.metrics {
                if value.is_unsourced() {
                    warn!(
                        holding = holding.sort_key(),
                        metric = %metric,
                        "numeric metric has no source_ref"
                    );
                    unsourced += 1;
                }
            }
        }

        let violations = if unsourced > 0 {
            vec![GuardViolation::portfolio(
                GuardId::G2,
                RunOutcome::Vetoed,
                "unsourced_numeric_metric",
            )]
        } else {
            Vec::new()
        };
        GuardResult::from_violations(GuardId::G2, violations)
    }
}
