//! Cap enforcement by dropping whole penalty items.

use std::cmp::Ordering;

use committee_types::{PenaltyCategory, PenaltyItem, RunConfig};

use crate::rules::{default_category_cap, default_total_cap};

/// Which tie-break rule picks the next item to drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOrder {
    /// Smallest magnitude first, then `reason` descending.
    Category,
    /// Smallest magnitude first, then category rank descending, then `reason` descending.
    Total,
}

impl DropOrder {
    /// `Less` means `a` is dropped before `b`.
    pub fn compare(self, a: &PenaltyItem, b: &PenaltyItem) -> Ordering {
        let by_magnitude = a.magnitude().total_cmp(&b.magnitude());
        let by_rank = match self {
            DropOrder::Category => Ordering::Equal,
            DropOrder::Total => b.category.rank().cmp(&a.category.rank()),
        };
        by_magnitude
            .then(by_rank)
            .then_with(|| b.reason.cmp(&a.reason))
            .then_with(|| b.source_agent.cmp(&a.source_agent))
    }
}

/// Items that survived a cap and the ones removed to meet it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapOutcome {
    pub kept: Vec<PenaltyItem>,
    pub dropped: Vec<PenaltyItem>,
}

impl CapOutcome {
    pub fn cap_applied(&self) -> bool {
        !self.dropped.is_empty()
    }

    pub fn kept_total(&self) -> f64 {
        self.kept.iter().map(|i| i.amount).sum()
    }
}

/// Drop items in `order` until the remaining total is no more negative than `cap`.
///
/// Stops at the first point the total reaches the cap, so no more items are
/// removed than necessary. Kept items preserve their input order.
pub fn drop_to_cap(items: Vec<PenaltyItem>, cap: f64, order: DropOrder) -> CapOutcome {
    let mut total: f64 = items.iter().map(|i| i.amount).sum();
    if total >= cap {
        return CapOutcome {
            kept: items,
            dropped: Vec::new(),
        };
    }

    let mut candidates: Vec<usize> = (0..items.len()).collect();
    candidates.sort_by(|&a, &b| order.compare(&items[a], &items[b]));

    let mut drop = vec![false; items.len()];
    for index in candidates {
        if total >= cap {
            break;
        }
        total -= items[index].amount;
        drop[index] = true;
    }

    let mut outcome = CapOutcome::default();
    for (item, dropped) in items.into_iter().zip(drop) {
        if dropped {
            outcome.dropped.push(item);
        } else {
            outcome.kept.push(item);
        }
    }
    outcome
}

/// Resolved category and total caps for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct PenaltyCaps {
    category: [f64; 6],
    total: f64,
}

impl PenaltyCaps {
    pub fn new(category: [f64; 6], total: f64) -> Self {
        Self { category, total }
    }

    /// Built-in caps with the run config's overrides applied.
    pub fn resolve(run_config: &RunConfig) -> Self {
        let overrides = &run_config.penalty_caps;
        let category = PenaltyCategory::ALL
            .map(|c| overrides.category(c).unwrap_or_else(|| default_category_cap(c)));
        let total = overrides
            .total
            .unwrap_or_else(|| default_total_cap(run_config.run_mode));
        Self { category, total }
    }

    pub fn category(&self, category: PenaltyCategory) -> f64 {
        self.category[category.rank() as usize]
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

/// Category caps, then the total cap.
pub fn apply_caps(items: Vec<PenaltyItem>, caps: &PenaltyCaps) -> CapOutcome {
    let mut after_categories = CapOutcome::default();
    let mut remaining = items;
    for category in PenaltyCategory::ALL {
        let (in_category, rest): (Vec<_>, Vec<_>) =
            remaining.into_iter().partition(|i| i.category == category);
        remaining = rest;
        let outcome = drop_to_cap(in_category, caps.category(category), DropOrder::Category);
        after_categories.kept.extend(outcome.kept);
        after_categories.dropped.extend(outcome.dropped);
    }

    let total = drop_to_cap(after_categories.kept, caps.total(), DropOrder::Total);
    let mut dropped = after_categories.dropped;
    dropped.extend(total.dropped);
    CapOutcome {
        kept: total.kept,
        dropped,
    }
}
