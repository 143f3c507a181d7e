//! Loading run inputs from disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use committee_agents::AgentRegistryConfig;
use committee_canonical::hash_text;
use committee_runtime::{Orchestrator, RunInputs};
use committee_types::{AgentResult, ConfigHashes, Manifest};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Input files shared by every run-like command.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Portfolio snapshot JSON
    #[arg(long, env = "COMMITTEE_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Portfolio config JSON
    #[arg(long, env = "COMMITTEE_PORTFOLIO_CONFIG")]
    pub portfolio_config: PathBuf,

    /// Run config JSON
    #[arg(long, env = "COMMITTEE_RUN_CONFIG")]
    pub run_config: PathBuf,

    /// Config snapshot JSON (registries, rubric, agent fixtures)
    #[arg(long, env = "COMMITTEE_CONFIG_SNAPSHOT")]
    pub config_snapshot: PathBuf,

    /// Release manifest pinning the config hashes
    #[arg(long, env = "COMMITTEE_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Precomputed agent results; skips agent invocation
    #[arg(long)]
    pub agent_results: Option<PathBuf>,

    /// Agent registry configuration
    #[arg(long, env = "COMMITTEE_AGENT_REGISTRY")]
    pub agent_registry: Option<PathBuf>,
}

impl InputArgs {
    /// Read every input file.
    ///
    /// Input documents are only checked for JSON syntax here; their shape is
    /// validated by the run itself so that schema problems become a FAILED
    /// packet rather than a CLI error.
    pub fn load(&self) -> anyhow::Result<RunInputs> {
        let run_config_text = read_text(&self.run_config)?;
        let config_snapshot_text = read_text(&self.config_snapshot)?;

        let mut inputs = RunInputs::new(
            read_json(&self.snapshot)?,
            read_json(&self.portfolio_config)?,
            parse_json(&self.run_config, &run_config_text)?,
            parse_json(&self.config_snapshot, &config_snapshot_text)?,
        );
        inputs.config_hashes = ConfigHashes {
            run_config_hash: Some(hash_text(&run_config_text)),
            config_snapshot_hash: Some(hash_text(&config_snapshot_text)),
        };
        debug!(hashes = ?inputs.config_hashes, "config files hashed");

        if let Some(path) = &self.manifest {
            inputs.manifest = Some(read_typed::<Manifest>(path)?);
        }
        if let Some(path) = &self.agent_results {
            inputs.agent_results = Some(read_typed::<Vec<AgentResult>>(path)?);
        }
        Ok(inputs)
    }

    pub fn orchestrator(&self) -> anyhow::Result<Orchestrator> {
        match &self.agent_registry {
            None => Ok(Orchestrator::new()),
            Some(path) => {
                let config = AgentRegistryConfig::from_value(&read_json(path)?)
                    .with_context(|| format!("invalid agent registry {}", path.display()))?;
                Ok(Orchestrator::from_registry_config(&config)?)
            }
        }
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_json(path: &Path, text: &str) -> anyhow::Result<Value> {
    serde_json::from_str(text).with_context(|| format!("{} is not valid JSON", path.display()))
}

pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    parse_json(path, &read_text(path)?)
}

fn read_typed<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
