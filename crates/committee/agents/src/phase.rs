use std::fmt;

use committee_types::agent_names;
use serde::{Deserialize, Serialize};

/// Agent phases, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentPhase {
    #[serde(alias = "DIO")]
    Integrity,
    #[serde(alias = "GRRA")]
    MacroRegime,
    #[serde(alias = "LEFO_PSCC")]
    LiquidityConcentration,
    RiskOfficer,
    Analytical,
}

impl AgentPhase {
    pub const ALL: [AgentPhase; 5] = [
        AgentPhase::Integrity,
        AgentPhase::MacroRegime,
        AgentPhase::LiquidityConcentration,
        AgentPhase::RiskOfficer,
        AgentPhase::Analytical,
    ];

    /// Standard agents for this phase, in invocation order.
    pub fn default_agents(self) -> &'static [&'static str] {
        match self {
            AgentPhase::Integrity => &[agent_names::INTEGRITY],
            AgentPhase::MacroRegime => &[agent_names::MACRO_REGIME],
            AgentPhase::LiquidityConcentration => {
                &[agent_names::LIQUIDITY, agent_names::CONCENTRATION]
            }
            AgentPhase::RiskOfficer => &[agent_names::RISK_OFFICER],
            AgentPhase::Analytical => &[
                agent_names::FUNDAMENTALS,
                agent_names::TECHNICAL,
                agent_names::DEVILS_ADVOCATE,
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentPhase::Integrity => "INTEGRITY",
            AgentPhase::MacroRegime => "MACRO_REGIME",
            AgentPhase::LiquidityConcentration => "LIQUIDITY_CONCENTRATION",
            AgentPhase::RiskOfficer => "RISK_OFFICER",
            AgentPhase::Analytical => "ANALYTICAL",
        }
    }
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
