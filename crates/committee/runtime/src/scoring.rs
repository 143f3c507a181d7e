//! Base score from the configured scoring rubric.

use committee_types::Holding;
use serde::{Deserialize, Serialize};

/// Base score when no rubric is configured.
pub const DEFAULT_BASE_SCORE: f64 = 100.0;

/// What to do when a dimension's metric is unavailable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// The base score becomes unavailable.
    #[default]
    Require,
    /// The dimension is left out of the weighted mean.
    Omit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RubricDimension {
    pub metric_key: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub scale_min: Option<f64>,
    #[serde(default)]
    pub scale_max: Option<f64>,
    #[serde(default = "higher_is_better")]
    pub higher_is_better: bool,
    #[serde(default)]
    pub missing_policy: MissingPolicy,
}

fn higher_is_better() -> bool {
    true
}

impl RubricDimension {
    /// Metric value mapped into `[0, 1]`, or `None` when the scale is degenerate.
    fn normalize(&self, value: f64) -> Option<f64> {
        let min = self.scale_min.unwrap_or(0.0);
        let max = self.scale_max.unwrap_or(100.0);
        let span = max - min;
        if span == 0.0 || !span.is_finite() {
            return None;
        }
        let position = ((value - min) / span).clamp(0.0, 1.0);
        Some(if self.higher_is_better {
            position
        } else {
            1.0 - position
        })
    }
}

/// `registries.scoring_rubric` of the config snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringRubric {
    #[serde(default)]
    pub dimensions: Vec<RubricDimension>,
}

impl ScoringRubric {
    /// Weighted base score for `holding`, in `[0, 100]`.
    ///
    /// Dimensions with a non-positive weight are ignored. `None` when a
    /// required metric is missing or no weight remains.
    pub fn base_score(&self, holding: &Holding) -> Option<f64> {
        if self.dimensions.is_empty() {
            return Some(DEFAULT_BASE_SCORE);
        }

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for dimension in self.dimensions.iter().filter(|d| d.weight > 0.0) {
            let value = holding
                .metrics
                .get(&dimension.metric_key)
                .filter(|m| !m.not_applicable)
                .and_then(|m| m.value);
            let normalized = value.and_then(|v| dimension.normalize(v));
            match (normalized, dimension.missing_policy) {
                (Some(n), _) => {
                    weighted += n * dimension.weight;
                    total_weight += dimension.weight;
                }
                (None, MissingPolicy::Omit) => continue,
                (None, MissingPolicy::Require) => return None,
            }
        }

        if total_weight <= 0.0 {
            return None;
        }
        Some((weighted / total_weight * 100.0).clamp(0.0, 100.0))
    }
}

/// Base score under an optional rubric.
pub fn base_score(holding: &Holding, rubric: Option<&ScoringRubric>) -> Option<f64> {
    match rubric {
        Some(rubric) => rubric.base_score(holding),
        None => Some(DEFAULT_BASE_SCORE),
    }
}
