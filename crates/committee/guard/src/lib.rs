//! Guard chain and governance precedence.
//!
//! Eleven guards, G0 through G10, each inspect the portfolio-wide
//! [`GuardContext`] and return a [`GuardResult`](committee_types::GuardResult):
//! a pass/fail/skip verdict plus violations scoped to the portfolio or to a
//! single holding. The [`GovernanceEngine`] folds those violations, together
//! with the integrity and risk-officer agent signals, into one outcome per
//! holding and one for the portfolio.
//!
//! ## Guards
//!
//! | Guard | Check | Failure |
//! |---|---|---|
//! | G0 | schema errors, manifest hash pins | FAILED |
//! | G1 | base currency; holding identity | VETOED / holding FAILED |
//! | G2 | every numeric metric is sourced | VETOED |
//! | G3 | freshness (reserved) | - |
//! | G4 | registries present | FAILED |
//! | G5 | agent result conformance | FAILED (holding or portfolio) |
//! | G6 | do-not-trade precedence | SHORT_CIRCUITED |
//! | G7 | ordering and canonical idempotence | FAILED |
//! | G8 | emission eligibility (reserved) | - |
//! | G9 | partial-failure threshold | VETOED / FAILED |
//! | G10 | artifact completeness (reserved) | - |
//!
//! ## Precedence
//!
//! Portfolio outcome, first match wins: FAILED > hard-stop VETOED >
//! SHORT_CIRCUITED > partial-failure VETOED > COMPLETED. Holding outcomes
//! only ever degrade; the first non-COMPLETED outcome sticks.

#![deny(unsafe_code)]

pub mod context;
pub mod governance;
pub mod guards;
pub mod ledger;
pub mod set;
pub mod traits;

#[cfg(test)]
mod testing;

pub use context::GuardContext;
pub use governance::{do_not_trade_signals, GovernanceDecision, GovernanceEngine};
pub use guards::{
    AgentConformanceGuard, ArtifactCompletenessGuard, DeterminismGuard, EmissionEligibilityGuard,
    FreshnessGuard, GovernancePrecedenceGuard, IdentityGuard, InputSchemaGuard,
    PartialFailureGuard, ProvenanceGuard, RegistriesGuard,
};
pub use ledger::{HoldingLedger, HoldingState};
pub use set::GuardSet;
pub use traits::Guard;
