//! Committee agents.
//!
//! An [`Agent`] turns an [`AgentContext`] into one
//! [`AgentResult`](committee_types::AgentResult). Agents are grouped into
//! fixed [`AgentPhase`]s; the [`AgentRegistry`] decides which agents run in
//! each phase and in what order, and the [`executor`] invokes them so that
//! a misbehaving agent yields a `status=failed` result instead of an error.
//!
//! ## Phases
//!
//! | Phase | Agents | Scope |
//! |---|---|---|
//! | Integrity | DIO | portfolio, holding |
//! | MacroRegime | GRRA | portfolio |
//! | LiquidityConcentration | LEFO, PSCC | holding, portfolio |
//! | RiskOfficer | RiskOfficer | holding |
//! | Analytical | Fundamentals, Technical, DevilsAdvocate | holding |
//!
//! The built-in agents are lookups: they read their output from
//! `registries.agent_fixtures` in the config snapshot.

#![deny(unsafe_code)]

pub mod builtin;
pub mod context;
pub mod error;
pub mod executor;
pub mod phase;
pub mod registry;
pub mod traits;

pub use builtin::FixtureAgent;
pub use context::{AgentContext, AgentInputs};
pub use error::{AgentError, RegistryError};
pub use executor::{execute, AgentExecutor};
pub use phase::AgentPhase;
pub use registry::{AgentRegistry, AgentRegistryConfig, AgentSpec};
pub use traits::Agent;
