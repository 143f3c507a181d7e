//! Penalty reasons, amounts and thresholds.

use committee_types::{PenaltyCategory, RunMode, StalenessKind};

pub const SOURCE_INTEGRITY: &str = "DIO";
pub const SOURCE_CONCENTRATION: &str = "PSCC";
pub const SOURCE_ENGINE: &str = "PenaltyEngine";
pub const SOURCE_DEVILS_ADVOCATE: &str = "DevilsAdvocate";

/// Confidence below which a holding-scoped agent counts as unsure.
pub const LOW_CONFIDENCE: f64 = 0.5;
/// Number of unsure agents that triggers the multi-agent penalty.
pub const LOW_CONFIDENCE_AGENT_COUNT: usize = 3;
/// FX exposure fraction above which missing hedge data is penalized.
pub const FX_EXPOSURE_HIGH: f64 = 0.2;

pub const SPLIT_WINDOW_DAYS: f64 = 90.0;
pub const DIVIDEND_WINDOW_DAYS: f64 = 90.0;
pub const SPINOFF_WINDOW_DAYS: f64 = 180.0;

/// Fields treated as not critical for companies classified as burning cash.
pub const BURN_RATE_FIELDS: &[&str] = &["cash", "runway_months", "burn_rate"];

/// Category A reason and amount for a missing critical field.
pub fn missing_field_penalty(field_name: &str) -> Option<(&'static str, f64)> {
    match field_name.trim() {
        "cash" | "runway_months" | "burn_rate" => Some(("missing_cash_or_runway", -6.0)),
        "shares_outstanding" | "market_cap" => Some(("missing_shares_or_market_cap", -5.0)),
        "fully_diluted_shares" => Some(("missing_fully_diluted_shares", -4.0)),
        "adv_usd" | "liquidity_measure" => Some(("missing_liquidity_measure", -5.0)),
        "price" | "volume" => Some(("missing_price_or_volume", -4.0)),
        "macro_regime_input" | "vix" | "macro_regime" => Some(("missing_macro_regime_input", -4.0)),
        _ => None,
    }
}

/// Category B reason and amount for a stale data family.
pub fn staleness_penalty(kind: StalenessKind) -> (&'static str, f64) {
    match kind {
        StalenessKind::Financials => ("stale_financials", -5.0),
        StalenessKind::PriceVolume => ("stale_price_volume", -3.0),
        StalenessKind::CompanyUpdates => ("stale_company_updates", -2.0),
        StalenessKind::MacroRegime => ("stale_macro_regime", -4.0),
    }
}

/// Built-in staleness limit in days.
pub fn default_staleness_days(mode: RunMode, kind: StalenessKind) -> f64 {
    match (mode, kind) {
        (RunMode::Fast, StalenessKind::Financials) => 120.0,
        (RunMode::Fast, StalenessKind::PriceVolume) => 3.0,
        (RunMode::Fast, StalenessKind::CompanyUpdates) => 90.0,
        (RunMode::Fast, StalenessKind::MacroRegime) => 14.0,
        (RunMode::Deep, StalenessKind::Financials) => 90.0,
        (RunMode::Deep, StalenessKind::PriceVolume) => 1.0,
        (RunMode::Deep, StalenessKind::CompanyUpdates) => 60.0,
        (RunMode::Deep, StalenessKind::MacroRegime) => 7.0,
    }
}

pub fn default_category_cap(category: PenaltyCategory) -> f64 {
    match category {
        PenaltyCategory::A => -20.0,
        PenaltyCategory::B => -10.0,
        PenaltyCategory::C => -20.0,
        PenaltyCategory::D => -10.0,
        PenaltyCategory::E => -10.0,
        PenaltyCategory::F => -10.0,
    }
}

pub fn default_total_cap(mode: RunMode) -> f64 {
    match mode {
        RunMode::Deep => -35.0,
        RunMode::Fast => -40.0,
    }
}
