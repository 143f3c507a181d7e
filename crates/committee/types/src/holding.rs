use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a numeric fact came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_timestamp: Option<DateTime<Utc>>,
}

/// A single metric observation on a holding.
///
/// A present `value` must be sourced; an absent one must either be
/// `not_applicable` or explain itself through `missing_reason`. The first
/// rule is enforced by the provenance guard, the second by input validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<SourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_reason: Option<String>,
    #[serde(default)]
    pub not_applicable: bool,
}

impl MetricValue {
    /// A sourced numeric observation.
    pub fn sourced(value: f64, origin: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            source_ref: Some(SourceRef {
                origin: origin.into(),
                as_of_date: None,
                retrieval_timestamp: None,
            }),
            missing_reason: None,
            not_applicable: false,
        }
    }

    /// An explained gap.
    pub fn missing(reason: impl Into<String>) -> Self {
        Self {
            missing_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Numeric value present, applicable, and without provenance.
    pub fn is_unsourced(&self) -> bool {
        self.value.is_some() && !self.not_applicable && self.source_ref.is_none()
    }

    /// No value, not marked not-applicable, and no stated reason.
    pub fn is_unexplained_gap(&self) -> bool {
        self.value.is_none()
            && !self.not_applicable
            && self
                .missing_reason
                .as_deref()
                .map_or(true, |r| r.trim().is_empty())
    }
}

/// Identity of a position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingIdentity {
    #[serde(default)]
    pub holding_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_identifier: Option<String>,
}

impl HoldingIdentity {
    /// At least one non-blank market identifier.
    pub fn has_market_identifier(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.ticker) || present(&self.other_identifier)
    }
}

/// One position within a portfolio.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    #[serde(default)]
    pub identity: Option<HoldingIdentity>,
    #[serde(default)]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricValue>,
}

impl Holding {
    pub fn new(holding_id: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            identity: Some(HoldingIdentity {
                holding_id: holding_id.into(),
                ticker: Some(ticker.into()),
                other_identifier: None,
            }),
            weight: 0.0,
            currency: None,
            metrics: BTreeMap::new(),
        }
    }

    /// Trimmed, non-empty holding id.
    pub fn holding_id(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .map(|i| i.holding_id.trim())
            .filter(|id| !id.is_empty())
    }

    /// Sort key used for canonical processing order.
    pub fn sort_key(&self) -> &str {
        self.holding_id().unwrap_or("")
    }
}

/// Portfolio state as of a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub portfolio_id: String,
    pub as_of_date: DateTime<Utc>,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_pct: Option<f64>,
}

impl PortfolioSnapshot {
    /// Reorder holdings by trimmed `holding_id`.
    ///
    /// The sort is stable, so holdings sharing an id keep their input order.
    /// The resulting positions are the arena indices used for all per-holding
    /// bookkeeping downstream.
    pub fn sort_holdings(&mut self) {
        self.holdings.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
    }
}
