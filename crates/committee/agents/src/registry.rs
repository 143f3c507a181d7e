use std::collections::BTreeMap;

use committee_types::AgentScope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::builtin::FixtureAgent;
use crate::error::RegistryError;
use crate::phase::AgentPhase;
use crate::traits::Agent;

/// Per-agent registry settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

/// Agent registry configuration.
///
/// Agents without an entry are enabled at their built-in version. Phases
/// without an entry use [`AgentPhase::default_agents`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRegistryConfig {
    #[serde(default)]
    pub agents: BTreeMap<String, AgentSpec>,
    #[serde(default)]
    pub phases: BTreeMap<AgentPhase, Vec<String>>,
}

impl AgentRegistryConfig {
    pub fn from_value(value: &Value) -> Result<Self, RegistryError> {
        Ok(Self::deserialize(value)?)
    }
}

/// Which agents run in each phase, and in what order.
pub struct AgentRegistry {
    agents: BTreeMap<String, Box<dyn Agent>>,
    phases: BTreeMap<AgentPhase, Vec<String>>,
}

impl AgentRegistry {
    /// No agents; every phase is empty.
    pub fn empty() -> Self {
        Self {
            agents: BTreeMap::new(),
            phases: BTreeMap::new(),
        }
    }

    /// The eight built-in agents in their standard phases.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for agent in FixtureAgent::standard() {
            registry.register(agent);
        }
        for phase in AgentPhase::ALL {
            let names = phase.default_agents().iter().map(|n| n.to_string()).collect();
            registry.phases.insert(phase, names);
        }
        registry
    }

    /// The built-in agents arranged by `config`.
    pub fn from_config(config: &AgentRegistryConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::empty();
        for agent in FixtureAgent::standard() {
            let spec = config.agents.get(agent.name());
            if spec.is_some_and(|s| !s.enabled) {
                debug!(agent = agent.name(), "agent disabled by registry config");
                continue;
            }
            match spec.and_then(|s| s.version.clone()) {
                Some(version) => registry.register(agent.with_version(version)),
                None => registry.register(agent),
            }
        }

        for phase in AgentPhase::ALL {
            let names: Vec<String> = match config.phases.get(&phase) {
                Some(names) => names.clone(),
                None => phase.default_agents().iter().map(|n| n.to_string()).collect(),
            };
            let mut enabled = Vec::with_capacity(names.len());
            for name in names {
                let disabled = config.agents.get(&name).is_some_and(|s| !s.enabled);
                if disabled {
                    continue;
                }
                if !registry.agents.contains_key(&name) {
                    return Err(RegistryError::UnknownAgent { phase, agent: name });
                }
                enabled.push(name);
            }
            registry.phases.insert(phase, enabled);
        }
        Ok(registry)
    }

    /// Add or replace an agent. It runs only once a phase lists it.
    pub fn register<A: Agent + 'static>(&mut self, agent: A) {
        self.agents.insert(agent.name().to_owned(), Box::new(agent));
    }

    /// Set the ordered agent list of `phase`.
    pub fn set_phase<I, S>(&mut self, phase: AgentPhase, names: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(unknown) = names.iter().find(|n| !self.agents.contains_key(*n)) {
            return Err(RegistryError::UnknownAgent {
                phase,
                agent: unknown.clone(),
            });
        }
        self.phases.insert(phase, names);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Agent> {
        self.agents.get(name).map(|a| &**a)
    }

    /// Agents of `phase` that support `scope`, in phase order.
    pub fn agents_for(&self, phase: AgentPhase, scope: AgentScope) -> Vec<&dyn Agent> {
        self.phases
            .get(&phase)
            .into_iter()
            .flatten()
            .filter_map(|name| self.get(name))
            .filter(|agent| agent.supports(scope))
            .collect()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
