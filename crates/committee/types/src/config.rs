use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::findings::StalenessKind;
use crate::outcome::RunMode;
use crate::penalty::PenaltyCategory;

/// Portfolio-wide configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_currency: Option<String>,
    /// Concentration and compliance metadata, passed through to agents.
    #[serde(flatten)]
    pub metadata: BTreeMap<String, Value>,
}

impl PortfolioConfig {
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: Some(base_currency.into()),
            metadata: BTreeMap::new(),
        }
    }

    /// Trimmed, non-empty base currency.
    pub fn base_currency(&self) -> Option<&str> {
        self.base_currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Staleness thresholds in days, one optional override per staleness kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StalenessThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_financials: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_price_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_company_updates: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_macro_regime: Option<f64>,
}

impl StalenessThresholds {
    pub fn get(&self, kind: StalenessKind) -> Option<f64> {
        match kind {
            StalenessKind::Financials => self.stale_financials,
            StalenessKind::PriceVolume => self.stale_price_volume,
            StalenessKind::CompanyUpdates => self.stale_company_updates,
            StalenessKind::MacroRegime => self.stale_macro_regime,
        }
    }
}

/// Staleness overrides, either global or nested under a run mode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StalenessOverrides {
    #[serde(flatten)]
    pub common: StalenessThresholds,
    #[serde(rename = "FAST", default, skip_serializing_if = "Option::is_none")]
    pub fast: Option<StalenessThresholds>,
    #[serde(rename = "DEEP", default, skip_serializing_if = "Option::is_none")]
    pub deep: Option<StalenessThresholds>,
}

impl StalenessOverrides {
    /// Mode-specific override first, then the global one.
    pub fn threshold(&self, mode: RunMode, kind: StalenessKind) -> Option<f64> {
        let scoped = match mode {
            RunMode::Fast => self.fast.as_ref(),
            RunMode::Deep => self.deep.as_ref(),
        };
        scoped
            .and_then(|t| t.get(kind))
            .or_else(|| self.common.get(kind))
    }
}

/// Overrides for the per-category and total penalty caps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyCapOverrides {
    #[serde(rename = "A", default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
    #[serde(rename = "B", default, skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
    #[serde(rename = "C", default, skip_serializing_if = "Option::is_none")]
    pub c: Option<f64>,
    #[serde(rename = "D", default, skip_serializing_if = "Option::is_none")]
    pub d: Option<f64>,
    #[serde(rename = "E", default, skip_serializing_if = "Option::is_none")]
    pub e: Option<f64>,
    #[serde(rename = "F", default, skip_serializing_if = "Option::is_none")]
    pub f: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl PenaltyCapOverrides {
    pub fn category(&self, category: PenaltyCategory) -> Option<f64> {
        match category {
            PenaltyCategory::A => self.a,
            PenaltyCategory::B => self.b,
            PenaltyCategory::C => self.c,
            PenaltyCategory::D => self.d,
            PenaltyCategory::E => self.e,
            PenaltyCategory::F => self.f,
        }
    }
}

fn default_partial_failure_threshold() -> f64 {
    30.0
}

/// Per-run configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub run_mode: RunMode,
    #[serde(default = "default_partial_failure_threshold")]
    pub partial_failure_veto_threshold_pct: f64,
    #[serde(default)]
    pub do_not_trade_flag: bool,
    /// holding_id -> whether the company is classified as burning cash.
    #[serde(default)]
    pub burn_rate_classification: BTreeMap<String, bool>,
    #[serde(default)]
    pub staleness_thresholds: StalenessOverrides,
    #[serde(default)]
    pub penalty_caps: PenaltyCapOverrides,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Fast,
            partial_failure_veto_threshold_pct: default_partial_failure_threshold(),
            do_not_trade_flag: false,
            burn_rate_classification: BTreeMap::new(),
            staleness_thresholds: StalenessOverrides::default(),
            penalty_caps: PenaltyCapOverrides::default(),
        }
    }
}

impl RunConfig {
    pub fn is_burn_rate_company(&self, holding_id: &str) -> bool {
        self.burn_rate_classification
            .get(holding_id)
            .copied()
            .unwrap_or(false)
    }
}

/// Versioned registries consumed by agents and the scoring rubric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub rubric_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registries: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl ConfigSnapshot {
    pub fn registry(&self, name: &str) -> Option<&Value> {
        self.registries.as_ref().and_then(|r| r.get(name))
    }
}

/// Release manifest pinning the expected config hashes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_config_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_snapshot_hash: Option<String>,
}

/// Hashes actually computed over the loaded config documents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigHashes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_config_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_snapshot_hash: Option<String>,
}
