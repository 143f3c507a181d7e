//! Owned inputs for building a [`GuardContext`] in tests.

use chrono::{TimeZone, Utc};
use committee_types::{
    AgentResult, ConfigHashes, ConfigSnapshot, Holding, Manifest, MetricValue, PortfolioConfig,
    PortfolioSnapshot, RunConfig, RunOutcome,
};
use serde_json::json;

use crate::context::GuardContext;
use crate::ledger::HoldingLedger;

pub(crate) struct Fixture {
    pub snapshot: PortfolioSnapshot,
    pub portfolio_config: PortfolioConfig,
    pub run_config: RunConfig,
    pub config_snapshot: ConfigSnapshot,
    pub manifest: Option<Manifest>,
    pub config_hashes: ConfigHashes,
    pub schema_errors: Vec<String>,
    pub agent_results: Vec<AgentResult>,
    pub ledger: HoldingLedger,
    pub portfolio_outcome: RunOutcome,
}

pub(crate) fn holding(id: &str) -> Holding {
    let mut holding = Holding::new(id, format!("{id}.TICK"));
    holding.weight = 0.1;
    holding.currency = Some("USD".into());
    holding
        .metrics
        .insert("price".into(), MetricValue::sourced(10.0, "exchange_feed"));
    holding
}

impl Fixture {
    pub fn new(ids: &[&str]) -> Self {
        let snapshot = PortfolioSnapshot {
            portfolio_id: "PORT-1".into(),
            as_of_date: Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap(),
            holdings: ids.iter().map(|id| holding(id)).collect(),
            cash_pct: Some(5.0),
        };
        let mut registries = std::collections::BTreeMap::new();
        registries.insert("agent_fixtures".to_string(), json!({}));
        let ledger = HoldingLedger::from_snapshot(&snapshot);
        Self {
            snapshot,
            portfolio_config: PortfolioConfig::new("USD"),
            run_config: RunConfig::default(),
            config_snapshot: ConfigSnapshot {
                rubric_version: "v1".into(),
                registries: Some(registries),
                content_hash: None,
            },
            manifest: None,
            config_hashes: ConfigHashes {
                run_config_hash: Some("rc-hash".into()),
                config_snapshot_hash: Some("cs-hash".into()),
            },
            schema_errors: Vec::new(),
            agent_results: Vec::new(),
            ledger,
            portfolio_outcome: RunOutcome::Completed,
        }
    }

    /// Rebuild the ledger after editing `snapshot`.
    pub fn reindex(&mut self) {
        self.ledger = HoldingLedger::from_snapshot(&self.snapshot);
    }

    pub fn context(&self) -> GuardContext<'_> {
        GuardContext {
            snapshot: &self.snapshot,
            portfolio_config: &self.portfolio_config,
            run_config: &self.run_config,
            config_snapshot: &self.config_snapshot,
            manifest: self.manifest.as_ref(),
            config_hashes: &self.config_hashes,
            schema_errors: &self.schema_errors,
            agent_results: &self.agent_results,
            ledger: &self.ledger,
            portfolio_outcome: self.portfolio_outcome,
        }
    }
}
