use std::fmt;

use serde::{Deserialize, Serialize};

/// Penalty category. Declaration order is the category rank (A lowest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PenaltyCategory {
    /// Missing critical fields
    A,
    /// Staleness
    B,
    /// Contradictions and integrity
    C,
    /// Confidence
    D,
    /// FX exposure
    E,
    /// Data validity
    F,
}

impl PenaltyCategory {
    pub const ALL: [PenaltyCategory; 6] = [
        PenaltyCategory::A,
        PenaltyCategory::B,
        PenaltyCategory::C,
        PenaltyCategory::D,
        PenaltyCategory::E,
        PenaltyCategory::F,
    ];

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PenaltyCategory::A => "A",
            PenaltyCategory::B => "B",
            PenaltyCategory::C => "C",
            PenaltyCategory::D => "D",
            PenaltyCategory::E => "E",
            PenaltyCategory::F => "F",
        }
    }
}

impl fmt::Display for PenaltyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One deduction from a holding's base score. `amount` is strictly negative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PenaltyItem {
    pub category: PenaltyCategory,
    pub reason: String,
    pub amount: f64,
    pub source_agent: String,
}

impl PenaltyItem {
    pub fn new(
        category: PenaltyCategory,
        reason: impl Into<String>,
        amount: f64,
        source_agent: impl Into<String>,
    ) -> Self {
        Self {
            category,
            reason: reason.into(),
            amount,
            source_agent: source_agent.into(),
        }
    }

    /// Identity used for deduplication and detail ordering.
    pub fn key(&self) -> (PenaltyCategory, &str, &str) {
        (self.category, &self.reason, &self.source_agent)
    }

    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }
}

/// Per-category totals plus the surviving items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyBreakdown {
    #[serde(rename = "category_A_missing_critical")]
    pub category_a_missing_critical: f64,
    #[serde(rename = "category_B_staleness")]
    pub category_b_staleness: f64,
    #[serde(rename = "category_C_contradictions_integrity")]
    pub category_c_contradictions_integrity: f64,
    #[serde(rename = "category_D_confidence")]
    pub category_d_confidence: f64,
    #[serde(rename = "category_E_fx_exposure_risk")]
    pub category_e_fx_exposure_risk: f64,
    #[serde(rename = "category_F_data_validity")]
    pub category_f_data_validity: f64,
    pub total_penalties: f64,
    #[serde(default)]
    pub details: Vec<PenaltyItem>,
}

impl PenaltyBreakdown {
    /// All-zero breakdown with no details.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build from already-capped, already-sorted items.
    pub fn from_items(details: Vec<PenaltyItem>) -> Self {
        let mut breakdown = Self::default();
        for item in &details {
            *breakdown.category_total_mut(item.category) += item.amount;
        }
        breakdown.total_penalties = PenaltyCategory::ALL
            .iter()
            .map(|c| breakdown.category_total(*c))
            .sum();
        breakdown.details = details;
        breakdown
    }

    pub fn category_total(&self, category: PenaltyCategory) -> f64 {
        match category {
            PenaltyCategory::A => self.category_a_missing_critical,
            PenaltyCategory::B => self.category_b_staleness,
            PenaltyCategory::C => self.category_c_contradictions_integrity,
            PenaltyCategory::D => self.category_d_confidence,
            PenaltyCategory::E => self.category_e_fx_exposure_risk,
            PenaltyCategory::F => self.category_f_data_validity,
        }
    }

    fn category_total_mut(&mut self, category: PenaltyCategory) -> &mut f64 {
        match category {
            PenaltyCategory::A => &mut self.category_a_missing_critical,
            PenaltyCategory::B => &mut self.category_b_staleness,
            PenaltyCategory::C => &mut self.category_c_contradictions_integrity,
            PenaltyCategory::D => &mut self.category_d_confidence,
            PenaltyCategory::E => &mut self.category_e_fx_exposure_risk,
            PenaltyCategory::F => &mut self.category_f_data_validity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_follows_declaration_order() {
        assert_eq!(PenaltyCategory::A.rank(), 0);
        assert_eq!(PenaltyCategory::F.rank(), 5);
        assert!(PenaltyCategory::F > PenaltyCategory::E);
    }

    #[test]
    fn breakdown_sums_per_category() {
        let breakdown = PenaltyBreakdown::from_items(vec![
            PenaltyItem::new(PenaltyCategory::A, "missing_price_or_volume", -4.0, "DIO"),
            PenaltyItem::new(PenaltyCategory::A, "missing_liquidity_measure", -5.0, "DIO"),
            PenaltyItem::new(PenaltyCategory::F, "low_source_reliability", -5.0, "DIO"),
        ]);
        assert_eq!(breakdown.category_a_missing_critical, -9.0);
        assert_eq!(breakdown.category_f_data_validity, -5.0);
        assert_eq!(breakdown.total_penalties, -14.0);
        assert_eq!(breakdown.details.len(), 3);
    }

    #[test]
    fn breakdown_field_names_are_stable() {
        let json = serde_json::to_value(PenaltyBreakdown::zero()).unwrap();
        assert!(json.get("category_A_missing_critical").is_some());
        assert!(json.get("category_E_fx_exposure_risk").is_some());
        assert_eq!(json["total_penalties"], 0.0);
    }
}
