use thiserror::Error;

use crate::phase::AgentPhase;

/// Faults raised while an agent evaluates.
///
/// The executor never propagates these; they become failed results.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid fixture for {agent}: {source}")]
    InvalidFixture {
        agent: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid findings for {agent}: {source}")]
    InvalidFindings {
        agent: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

/// Registry construction errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("phase {phase} lists unknown agent {agent}")]
    UnknownAgent { phase: AgentPhase, agent: String },

    #[error("invalid agent registry config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
