use committee_types::{
    AgentResult, ConfigHashes, ConfigSnapshot, Holding, HoldingRef, Manifest, PortfolioConfig,
    PortfolioSnapshot, RunConfig, RunOutcome,
};

use crate::ledger::HoldingLedger;

/// Everything a guard may inspect.
///
/// `snapshot.holdings` is already in canonical order; positions in it are
/// the arena indices used by `ledger`.
#[derive(Clone, Copy)]
pub struct GuardContext<'a> {
    pub snapshot: &'a PortfolioSnapshot,
    pub portfolio_config: &'a PortfolioConfig,
    pub run_config: &'a RunConfig,
    pub config_snapshot: &'a ConfigSnapshot,
    pub manifest: Option<&'a Manifest>,
    pub config_hashes: &'a ConfigHashes,
    /// Validation errors that did not prevent parsing.
    pub schema_errors: &'a [String],
    /// Agent results accumulated so far, in invocation order.
    pub agent_results: &'a [AgentResult],
    pub ledger: &'a HoldingLedger,
    /// Portfolio outcome implied by everything recorded so far.
    pub portfolio_outcome: RunOutcome,
}

impl<'a> GuardContext<'a> {
    pub fn holdings(&self) -> &'a [Holding] {
        &self.snapshot.holdings
    }

    /// Reference to the holding at `index`.
    pub fn holding_ref(&self, index: usize) -> HoldingRef {
        HoldingRef::indexed(
            index,
            self.snapshot.holdings.get(index).and_then(Holding::holding_id),
        )
    }

    /// Portfolio already FAILED or VETOED.
    pub fn portfolio_terminated(&self) -> bool {
        self.portfolio_outcome.is_failed_or_vetoed()
    }
}
