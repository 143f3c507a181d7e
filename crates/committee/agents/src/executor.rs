use committee_types::{AgentResult, AgentScope, Holding};
use tracing::{debug, warn};

use crate::context::{AgentContext, AgentInputs};
use crate::phase::AgentPhase;
use crate::registry::AgentRegistry;
use crate::traits::Agent;

/// Invoke `agent`, converting any fault into a failed result.
///
/// An error becomes `agent_exception:<message>`. A result whose scope or
/// holding differs from the invocation becomes `agent_scope_mismatch`.
pub fn execute(agent: &dyn Agent, context: &AgentContext<'_>) -> AgentResult {
    let holding_id = context.holding_id().map(str::to_owned);
    let failed = |error: String| {
        let mut result =
            AgentResult::failed(agent.name(), context.scope, holding_id.clone(), error);
        result.agent_version = Some(agent.version().to_owned());
        result
    };

    match agent.evaluate(context) {
        Err(e) => {
            warn!(agent = agent.name(), holding_id = ?context.holding_id(), error = %e, "agent raised an error");
            failed(format!("agent_exception:{e}"))
        }
        Ok(result) if result.scope != context.scope || result.holding() != context.holding_id() => {
            warn!(
                agent = agent.name(),
                expected = ?context.holding_id(),
                actual = ?result.holding(),
                "agent result does not match its invocation"
            );
            failed("agent_scope_mismatch".to_owned())
        }
        Ok(mut result) => {
            if result.agent_version.is_none() {
                result.agent_version = Some(agent.version().to_owned());
            }
            result
        }
    }
}

/// Runs registry phases against fixed run inputs.
pub struct AgentExecutor<'r> {
    registry: &'r AgentRegistry,
}

impl<'r> AgentExecutor<'r> {
    pub fn new(registry: &'r AgentRegistry) -> Self {
        Self { registry }
    }

    /// Portfolio-scoped agents of `phase`.
    pub fn run_portfolio(
        &self,
        phase: AgentPhase,
        inputs: AgentInputs<'_>,
        prior_results: &[AgentResult],
    ) -> Vec<AgentResult> {
        let context = AgentContext::portfolio(inputs, prior_results);
        self.run(phase, AgentScope::Portfolio, &context)
    }

    /// Holding-scoped agents of `phase` for one holding.
    pub fn run_holding(
        &self,
        phase: AgentPhase,
        inputs: AgentInputs<'_>,
        holding: &Holding,
        prior_results: &[AgentResult],
    ) -> Vec<AgentResult> {
        let context = AgentContext::for_holding(inputs, holding, prior_results);
        self.run(phase, AgentScope::Holding, &context)
    }

    fn run(&self, phase: AgentPhase, scope: AgentScope, context: &AgentContext<'_>) -> Vec<AgentResult> {
        self.registry
            .agents_for(phase, scope)
            .into_iter()
            .map(|agent| {
                debug!(%phase, agent = agent.name(), holding_id = ?context.holding_id(), "invoking agent");
                execute(agent, context)
            })
            .collect()
    }
}
