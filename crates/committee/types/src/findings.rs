//! Structured findings read out of agent `key_findings` maps.
//!
//! Agents report findings as opaque JSON. The integrity agent and the
//! concentration agent have records the core depends on; those are typed
//! here and parsed leniently (absent fields take their defaults).

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Staleness families with their own thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalenessKind {
    Financials,
    PriceVolume,
    CompanyUpdates,
    MacroRegime,
}

impl StalenessKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "financials" => Some(StalenessKind::Financials),
            "price_volume" => Some(StalenessKind::PriceVolume),
            "company_updates" => Some(StalenessKind::CompanyUpdates),
            "macro_regime" => Some(StalenessKind::MacroRegime),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StalenessFlag {
    #[serde(default)]
    pub staleness_type: String,
    #[serde(default)]
    pub age_days: f64,
    #[serde(default)]
    pub hard_stop_triggered: bool,
}

impl StalenessFlag {
    pub fn kind(&self) -> Option<StalenessKind> {
        StalenessKind::parse(&self.staleness_type)
    }
}

/// A missing penalty-critical field, either bare or with a not-applicable marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MissingField {
    Name(String),
    Detailed {
        field_name: String,
        #[serde(default)]
        not_applicable: bool,
    },
}

impl MissingField {
    pub fn field_name(&self) -> &str {
        match self {
            MissingField::Name(name) => name,
            MissingField::Detailed { field_name, .. } => field_name,
        }
    }

    pub fn not_applicable(&self) -> bool {
        matches!(self, MissingField::Detailed { not_applicable: true, .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    #[serde(default)]
    pub unresolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Days since recent corporate actions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CorporateActionRisk {
    #[serde(default)]
    pub split_days_ago: Option<f64>,
    #[serde(default)]
    pub dividend_days_ago: Option<f64>,
    #[serde(default)]
    pub spinoff_or_merger_days_ago: Option<f64>,
}

/// Findings of the data-integrity agent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrityFindings {
    #[serde(default)]
    pub staleness_flags: Vec<StalenessFlag>,
    #[serde(default)]
    pub missing_hard_stop_fields: Vec<String>,
    #[serde(default)]
    pub missing_penalty_critical_fields: Vec<MissingField>,
    #[serde(default)]
    pub contradictions: Vec<Contradiction>,
    #[serde(default)]
    pub unsourced_numbers_detected: bool,
    #[serde(default)]
    pub corporate_action_risk: Option<CorporateActionRisk>,
    #[serde(default)]
    pub low_source_reliability: bool,
    #[serde(default)]
    pub integrity_veto_triggered: bool,
}

impl IntegrityFindings {
    pub fn from_findings(findings: &BTreeMap<String, Value>) -> Result<Self, serde_json::Error> {
        parse_findings(findings)
    }

    /// Any condition that vetoes the scope outright.
    pub fn hard_stop(&self) -> bool {
        self.integrity_veto_triggered
            || self.unsourced_numbers_detected
            || !self.missing_hard_stop_fields.is_empty()
            || self.staleness_flags.iter().any(|f| f.hard_stop_triggered)
    }
}

/// FX exposure of one holding, as reported by the concentration agent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FxExposureReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_currency: Option<String>,
    #[serde(default)]
    pub fx_rate_missing: bool,
    #[serde(default)]
    pub fx_rate_stale: bool,
    /// Fraction of the holding exposed, 0.0..=1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx_exposure_pct: Option<f64>,
    #[serde(default)]
    pub hedge_data_missing: bool,
    #[serde(default)]
    pub fx_hard_stop_triggered: bool,
}

impl FxExposureReport {
    /// Locate the report for `holding_id` in concentration findings.
    ///
    /// `fx_exposure_reports` may be a map keyed by holding id or a list of
    /// reports carrying their own `holding_id`.
    pub fn for_holding(findings: &BTreeMap<String, Value>, holding_id: &str) -> Option<Self> {
        match findings.get("fx_exposure_reports")? {
            Value::Object(map) => map
                .get(holding_id)
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            Value::Array(items) => items
                .iter()
                .filter_map(|v| serde_json::from_value::<FxExposureReport>(v.clone()).ok())
                .find(|r| r.holding_id.as_deref().map(str::trim) == Some(holding_id)),
            _ => None,
        }
    }
}

fn parse_findings<T: DeserializeOwned>(
    findings: &BTreeMap<String, Value>,
) -> Result<T, serde_json::Error> {
    let object: serde_json::Map<String, Value> = findings
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    serde_json::from_value(Value::Object(object))
}
