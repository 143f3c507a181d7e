use std::collections::BTreeMap;

use committee_types::{HoldingRef, PortfolioSnapshot, RunOutcome};
use serde::Serialize;
use tracing::debug;

/// Outcome bookkeeping for one holding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HoldingState {
    /// Holding id, or `holding_index_{i}` when the holding has none.
    pub label: String,
    pub outcome: RunOutcome,
    pub reasons: Vec<String>,
}

/// Per-holding outcomes, indexed by canonical position.
#[derive(Clone, Debug, Default)]
pub struct HoldingLedger {
    entries: Vec<HoldingState>,
    by_id: BTreeMap<String, usize>,
}

impl HoldingLedger {
    /// One COMPLETED entry per holding of an already-sorted snapshot.
    pub fn from_snapshot(snapshot: &PortfolioSnapshot) -> Self {
        let mut ledger = Self::default();
        for (index, holding) in snapshot.holdings.iter().enumerate() {
            let label = match holding.holding_id() {
                Some(id) => {
                    ledger.by_id.entry(id.to_owned()).or_insert(index);
                    id.to_owned()
                }
                None => format!("holding_index_{index}"),
            };
            ledger.entries.push(HoldingState {
                label,
                outcome: RunOutcome::Completed,
                reasons: Vec::new(),
            });
        }
        ledger
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HoldingState> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[HoldingState] {
        &self.entries
    }

    pub fn outcome(&self, index: usize) -> Option<RunOutcome> {
        self.entries.get(index).map(|e| e.outcome)
    }

    /// Index of the first holding with `holding_id`.
    pub fn index_of(&self, holding_id: &str) -> Option<usize> {
        self.by_id.get(holding_id.trim()).copied()
    }

    /// Arena index when present, id lookup otherwise.
    pub fn resolve(&self, holding: &HoldingRef) -> Option<usize> {
        holding
            .index
            .filter(|i| *i < self.entries.len())
            .or_else(|| holding.holding_id.as_deref().and_then(|id| self.index_of(id)))
    }

    /// Degrade a holding's outcome.
    ///
    /// A COMPLETED holding takes `outcome`. A holding already at `outcome`
    /// gains `reason`. Any other holding is left unchanged. Returns whether
    /// the outcome changed.
    pub fn degrade(&mut self, index: usize, outcome: RunOutcome, reason: &str) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        if outcome.is_completed() {
            return false;
        }
        if entry.outcome.is_completed() {
            debug!(holding = %entry.label, %outcome, reason, "holding outcome degraded");
            entry.outcome = outcome;
            entry.reasons.push(reason.to_owned());
            return true;
        }
        if entry.outcome == outcome && !entry.reasons.iter().any(|r| r == reason) {
            entry.reasons.push(reason.to_owned());
        }
        false
    }

    /// Holdings counted against the partial-failure threshold.
    pub fn failed_or_vetoed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_failed_or_vetoed())
            .count()
    }

    pub fn into_entries(self) -> Vec<HoldingState> {
        self.entries
    }
}
