//! Committee run orchestration.
//!
//! The [`Orchestrator`] is the end-to-end driver: it validates and orders
//! the raw input documents, runs the guard chain and the agent phases in a
//! fixed interleaving, lets the
//! [`GovernanceEngine`](committee_guard::GovernanceEngine) settle every
//! outcome, and hands the result to the [`Aggregator`] for packet
//! construction and audit hashing.
//!
//! ```text
//! parse + sort ─▶ G0..G4 ─▶ agent phases ─▶ G5..G10 ─▶ governance ─▶ packets + hashes
//! ```
//!
//! A run is a pure function of its inputs apart from the run id and the
//! wall-clock timestamps in the [`RunLog`](committee_types::RunLog), both of
//! which are excluded from every hash and both of which can be injected.
//!
//! ## Replay
//!
//! [`replay`] runs the same inputs several times and reports whether the
//! packets and hashes agree; [`verify_run_hash`] checks a recorded run hash.

#![deny(unsafe_code)]

pub mod aggregator;
pub mod caps;
pub mod clock;
pub mod error;
pub mod orchestrator;
pub mod replay;
pub mod runlog;
pub mod scoring;
pub mod validation;

pub use aggregator::Aggregator;
pub use clock::{Clock, FixedClock, FixedRunId, RunIdSource, SystemClock, UuidRunIds};
pub use error::RuntimeError;
pub use orchestrator::{OrchestrationResult, Orchestrator};
pub use replay::{replay, verify_run_hash, ReplayReport};
pub use runlog::RunLogBuilder;
pub use scoring::{MissingPolicy, RubricDimension, ScoringRubric, DEFAULT_BASE_SCORE};
pub use validation::{ParsedInputs, RunInputs};
