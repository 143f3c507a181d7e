//! Data model for the investment committee governance pipeline.
//!
//! Every record here is plain data: parsed once from the four input
//! documents (portfolio snapshot, portfolio config, run config, config
//! snapshot) or appended once during orchestration (agent results, guard
//! results) and never mutated afterwards.
//!
//! ## Outcomes
//!
//! [`RunOutcome`] applies both per holding and per portfolio. Severity is
//! totally ordered (`COMPLETED < SHORT_CIRCUITED < VETOED < FAILED`) and an
//! outcome can only move away from `COMPLETED`, never back.
//!
//! ## Scopes
//!
//! Agent results and guard violations are scoped either to the whole
//! portfolio or to a single holding. Both are sum types so every decision
//! point matches them exhaustively.

pub mod agent;
pub mod config;
pub mod findings;
pub mod guard;
pub mod holding;
pub mod outcome;
pub mod packet;
pub mod penalty;
pub mod runlog;

pub use agent::{agent_names, AgentResult, AgentScope, AgentStatus};
pub use config::{
    ConfigHashes, ConfigSnapshot, Manifest, PenaltyCapOverrides, PortfolioConfig, RunConfig,
    StalenessOverrides, StalenessThresholds,
};
pub use findings::{
    Contradiction, CorporateActionRisk, FxExposureReport, IntegrityFindings, MissingField,
    StalenessFlag, StalenessKind,
};
pub use guard::{GuardId, GuardResult, GuardVerdict, GuardViolation, HoldingRef, ViolationTarget};
pub use holding::{Holding, HoldingIdentity, MetricValue, PortfolioSnapshot, SourceRef};
pub use outcome::{RunMode, RunOutcome};
pub use packet::{
    AuditHashes, CapOverride, FailedRunPacket, HoldingPacket, PacketSummary,
    PortfolioCommitteePacket, RunPacket, Scorecard,
};
pub use penalty::{PenaltyBreakdown, PenaltyCategory, PenaltyItem};
pub use runlog::{RunLog, RunLogEvent, RunStatus};
