use committee_types::{
    AgentResult, AgentScope, ConfigSnapshot, Holding, PortfolioConfig, PortfolioSnapshot,
    RunConfig,
};
use serde_json::Value;

/// The run inputs every agent may read.
#[derive(Clone, Copy)]
pub struct AgentInputs<'a> {
    pub snapshot: &'a PortfolioSnapshot,
    pub portfolio_config: &'a PortfolioConfig,
    pub run_config: &'a RunConfig,
    pub config_snapshot: &'a ConfigSnapshot,
}

/// One agent invocation: inputs plus the scope being evaluated.
#[derive(Clone, Copy)]
pub struct AgentContext<'a> {
    pub inputs: AgentInputs<'a>,
    pub scope: AgentScope,
    /// Set for holding-scoped invocations.
    pub holding: Option<&'a Holding>,
    /// Results of earlier phases, in invocation order.
    pub prior_results: &'a [AgentResult],
}

impl<'a> AgentContext<'a> {
    pub fn portfolio(inputs: AgentInputs<'a>, prior_results: &'a [AgentResult]) -> Self {
        Self {
            inputs,
            scope: AgentScope::Portfolio,
            holding: None,
            prior_results,
        }
    }

    pub fn for_holding(
        inputs: AgentInputs<'a>,
        holding: &'a Holding,
        prior_results: &'a [AgentResult],
    ) -> Self {
        Self {
            inputs,
            scope: AgentScope::Holding,
            holding: Some(holding),
            prior_results,
        }
    }

    pub fn holding_id(&self) -> Option<&'a str> {
        self.holding.and_then(Holding::holding_id)
    }

    /// The fixture for `agent` at this context's scope.
    ///
    /// Portfolio fixtures live at `agent_fixtures.<agent>.portfolio`,
    /// holding fixtures at `agent_fixtures.<agent>.holdings.<holding_id>`.
    pub fn fixture(&self, agent: &str) -> Option<&'a Value> {
        let fixtures = self
            .inputs
            .config_snapshot
            .registry("agent_fixtures")?
            .get(agent)?;
        match self.scope {
            AgentScope::Portfolio => fixtures.get("portfolio"),
            AgentScope::Holding => fixtures.get("holdings")?.get(self.holding_id()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn fixture_lookup_by_scope() {
        let snapshot = PortfolioSnapshot {
            portfolio_id: "P".into(),
            as_of_date: Utc::now(),
            holdings: vec![Holding::new("H1", "AAA")],
            cash_pct: None,
        };
        let mut registries = BTreeMap::new();
        registries.insert(
            "agent_fixtures".to_string(),
            json!({"LEFO": {"portfolio": {"x": 1}, "holdings": {"H1": {"y": 2}}}}),
        );
        let config_snapshot = ConfigSnapshot {
            rubric_version: "v1".into(),
            registries: Some(registries),
            content_hash: None,
        };
        let inputs = AgentInputs {
            snapshot: &snapshot,
            portfolio_config: &PortfolioConfig::new("USD"),
            run_config: &RunConfig::default(),
            config_snapshot: &config_snapshot,
        };

        let portfolio = AgentContext::portfolio(inputs, &[]);
        assert_eq!(portfolio.fixture("LEFO"), Some(&json!({"x": 1})));
        assert_eq!(portfolio.fixture("PSCC"), None);

        let holding = AgentContext::for_holding(inputs, &snapshot.holdings[0], &[]);
        assert_eq!(holding.holding_id(), Some("H1"));
        assert_eq!(holding.fixture("LEFO"), Some(&json!({"y": 2})));
    }
}
