use committee_types::{AgentResult, AgentScope};

use crate::context::AgentContext;
use crate::error::AgentError;

/// A committee agent.
pub trait Agent: Send + Sync {
    /// Registry name, also stamped on every result.
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Scopes this agent can be invoked at.
    fn scopes(&self) -> &[AgentScope];

    /// Evaluate in `context`. The result must carry this agent's name and
    /// the context's scope and holding.
    fn evaluate(&self, context: &AgentContext<'_>) -> Result<AgentResult, AgentError>;

    fn supports(&self, scope: AgentScope) -> bool {
        self.scopes().contains(&scope)
    }
}
