//! Penalty engine.
//!
//! Converts one holding's integrity findings, FX exposure report and peer
//! agent results into a [`PenaltyBreakdown`](committee_types::PenaltyBreakdown).
//!
//! ## Pipeline
//!
//! 1. Integrity hard stop ⇒ all-zero breakdown.
//! 2. Candidate items for categories A–F.
//! 3. Deduplicate on `(category, reason, source_agent)`, first wins.
//! 4. Category caps, dropping the smallest-magnitude items first.
//! 5. Total cap, same drop rule with category rank as an extra tie-break.
//! 6. Sort details and total per category.
//!
//! The cap routine lives in [`caps`] and is usable on its own.

pub mod caps;
pub mod engine;
pub mod rules;

pub use caps::{apply_caps, drop_to_cap, CapOutcome, DropOrder, PenaltyCaps};
pub use engine::{PenaltyEngine, PenaltyOutcome};
