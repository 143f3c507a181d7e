//! Parsing and semantic validation of the raw input documents.

use committee_types::{
    AgentResult, ConfigHashes, ConfigSnapshot, Holding, Manifest, PortfolioConfig,
    PortfolioSnapshot, RunConfig,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::scoring::ScoringRubric;

/// The raw material of one run.
///
/// The four documents stay untyped until [`ParsedInputs::parse`] so that a
/// malformed document becomes a FAILED run rather than a load error.
#[derive(Clone, Debug, Default)]
pub struct RunInputs {
    pub portfolio_snapshot: Value,
    pub portfolio_config: Value,
    pub run_config: Value,
    pub config_snapshot: Value,
    pub manifest: Option<Manifest>,
    pub config_hashes: ConfigHashes,
    /// Precomputed agent results. When present the agent registry is not invoked.
    pub agent_results: Option<Vec<AgentResult>>,
}

impl RunInputs {
    pub fn new(
        portfolio_snapshot: Value,
        portfolio_config: Value,
        run_config: Value,
        config_snapshot: Value,
    ) -> Self {
        Self {
            portfolio_snapshot,
            portfolio_config,
            run_config,
            config_snapshot,
            ..Self::default()
        }
    }

    pub fn with_manifest(mut self, manifest: Manifest, config_hashes: ConfigHashes) -> Self {
        self.manifest = Some(manifest);
        self.config_hashes = config_hashes;
        self
    }

    pub fn with_agent_results(mut self, results: Vec<AgentResult>) -> Self {
        self.agent_results = Some(results);
        self
    }
}

/// Typed inputs with holdings in canonical order.
#[derive(Clone, Debug)]
pub struct ParsedInputs {
    pub snapshot: PortfolioSnapshot,
    pub portfolio_config: PortfolioConfig,
    pub run_config: RunConfig,
    pub config_snapshot: ConfigSnapshot,
    pub rubric: Option<ScoringRubric>,
    /// Problems found after parsing succeeded; reported by G0.
    pub schema_errors: Vec<String>,
}

impl ParsedInputs {
    /// Deserialize all four documents.
    ///
    /// Any document that does not deserialize yields a `"<document>:<message>"`
    /// reason; all such reasons are returned together, sorted.
    pub fn parse(inputs: &RunInputs) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();
        let snapshot = parse_document::<PortfolioSnapshot>(
            "portfolio_snapshot",
            &inputs.portfolio_snapshot,
            &mut errors,
        );
        let portfolio_config = parse_document::<PortfolioConfig>(
            "portfolio_config",
            &inputs.portfolio_config,
            &mut errors,
        );
        let run_config = parse_document::<RunConfig>("run_config", &inputs.run_config, &mut errors);
        let config_snapshot = parse_document::<ConfigSnapshot>(
            "config_snapshot",
            &inputs.config_snapshot,
            &mut errors,
        );

        let (Some(mut snapshot), Some(portfolio_config), Some(run_config), Some(config_snapshot)) =
            (snapshot, portfolio_config, run_config, config_snapshot)
        else {
            errors.sort();
            return Err(errors);
        };

        normalize_holdings(&mut snapshot);

        let mut schema_errors = semantic_errors(&snapshot, &run_config);
        let rubric = match config_snapshot.registry("scoring_rubric") {
            None => None,
            Some(raw) => match serde_json::from_value::<ScoringRubric>(raw.clone()) {
                Ok(rubric) => Some(rubric),
                Err(e) => {
                    schema_errors.push(format!("config_snapshot.registries.scoring_rubric:{e}"));
                    None
                }
            },
        };
        schema_errors.sort();
        schema_errors.dedup();
        if !schema_errors.is_empty() {
            debug!(errors = ?schema_errors, "semantic validation errors");
        }

        Ok(Self {
            snapshot,
            portfolio_config,
            run_config,
            config_snapshot,
            rubric,
            schema_errors,
        })
    }
}

fn parse_document<T: DeserializeOwned>(name: &str, raw: &Value, errors: &mut Vec<String>) -> Option<T> {
    match serde_json::from_value(raw.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(format!("{name}:{e}"));
            None
        }
    }
}

/// Trim holding ids in place, then sort.
fn normalize_holdings(snapshot: &mut PortfolioSnapshot) {
    for identity in snapshot.holdings.iter_mut().filter_map(|h| h.identity.as_mut()) {
        let trimmed = identity.holding_id.trim();
        if trimmed.len() != identity.holding_id.len() {
            identity.holding_id = trimmed.to_owned();
        }
    }
    snapshot.sort_holdings();
}

fn semantic_errors(snapshot: &PortfolioSnapshot, run_config: &RunConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let threshold = run_config.partial_failure_veto_threshold_pct;
    if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
        errors.push("run_config.partial_failure_veto_threshold_pct:out_of_range".to_owned());
    }

    for (index, holding) in snapshot.holdings.iter().enumerate() {
        let label = holding_label(holding, index);
        if !holding.weight.is_finite() || holding.weight < 0.0 {
            errors.push(format!("holdings.{label}.weight:invalid_weight"));
        }
        for (key, metric) in &holding.metrics {
            if metric.is_unexplained_gap() {
                errors.push(format!("holdings.{label}.metrics.{key}:missing_reason_required"));
            }
        }
    }
    errors
}

fn holding_label(holding: &Holding, index: usize) -> String {
    holding
        .holding_id()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("holding_index_{index}"))
}
