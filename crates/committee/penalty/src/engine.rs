use std::collections::HashSet;

use committee_types::{
    AgentResult, AgentScope, FxExposureReport, IntegrityFindings, PenaltyBreakdown,
    PenaltyCategory, PenaltyItem, PortfolioConfig, RunConfig,
};
use tracing::debug;

use crate::caps::{apply_caps, PenaltyCaps};
use crate::rules::{self, *};

/// A holding's breakdown and whether any cap removed items.
#[derive(Clone, Debug, PartialEq)]
pub struct PenaltyOutcome {
    pub breakdown: PenaltyBreakdown,
    pub cap_applied: bool,
}

impl PenaltyOutcome {
    fn zero() -> Self {
        Self {
            breakdown: PenaltyBreakdown::zero(),
            cap_applied: false,
        }
    }
}

/// Computes capped penalty breakdowns.
#[derive(Clone, Copy, Debug, Default)]
pub struct PenaltyEngine;

impl PenaltyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Penalty breakdown for one holding.
    ///
    /// `integrity` is the integrity agent's findings for the holding, if it
    /// reported any; `fx_report` is the concentration agent's FX report for it.
    pub fn compute(
        &self,
        holding_id: &str,
        run_config: &RunConfig,
        integrity: Option<&IntegrityFindings>,
        agent_results: &[AgentResult],
        portfolio_config: &PortfolioConfig,
        fx_report: Option<&FxExposureReport>,
    ) -> PenaltyOutcome {
        let default_findings = IntegrityFindings::default();
        let findings = integrity.unwrap_or(&default_findings);

        if findings.hard_stop() {
            debug!(holding_id, "integrity hard stop, penalties skipped");
            return PenaltyOutcome::zero();
        }

        let mut items = Vec::new();
        items.extend(missing_field_items(holding_id, run_config, findings));
        items.extend(staleness_items(run_config, findings));
        items.extend(integrity_items(findings));
        items.extend(confidence_items(holding_id, agent_results));
        items.extend(fx_items(portfolio_config, fx_report));
        items.extend(data_validity_items(findings));

        let items = dedupe(items);
        let capped = apply_caps(items, &PenaltyCaps::resolve(run_config));
        let cap_applied = capped.cap_applied();
        if cap_applied {
            debug!(
                holding_id,
                dropped = capped.dropped.len(),
                "penalty cap applied"
            );
        }

        let mut details = capped.kept;
        details.sort_by(|a, b| a.key().cmp(&b.key()));
        PenaltyOutcome {
            breakdown: PenaltyBreakdown::from_items(details),
            cap_applied,
        }
    }
}

fn missing_field_items(
    holding_id: &str,
    run_config: &RunConfig,
    findings: &IntegrityFindings,
) -> Vec<PenaltyItem> {
    let burn_rate_company = run_config.is_burn_rate_company(holding_id);
    findings
        .missing_penalty_critical_fields
        .iter()
        .filter(|field| !field.not_applicable())
        .filter(|field| !(burn_rate_company && BURN_RATE_FIELDS.contains(&field.field_name().trim())))
        .filter_map(|field| missing_field_penalty(field.field_name()))
        .map(|(reason, amount)| PenaltyItem::new(PenaltyCategory::A, reason, amount, SOURCE_INTEGRITY))
        .collect()
}

fn staleness_items(run_config: &RunConfig, findings: &IntegrityFindings) -> Vec<PenaltyItem> {
    let mode = run_config.run_mode;
    findings
        .staleness_flags
        .iter()
        .filter(|flag| !flag.hard_stop_triggered)
        .filter_map(|flag| {
            let kind = flag.kind()?;
            let limit = run_config
                .staleness_thresholds
                .threshold(mode, kind)
                .unwrap_or_else(|| rules::default_staleness_days(mode, kind));
            (flag.age_days > limit).then(|| {
                let (reason, amount) = staleness_penalty(kind);
                PenaltyItem::new(PenaltyCategory::B, reason, amount, SOURCE_INTEGRITY)
            })
        })
        .collect()
}

fn integrity_items(findings: &IntegrityFindings) -> Vec<PenaltyItem> {
    let mut items = Vec::new();
    if !findings.contradictions.is_empty() {
        items.push(PenaltyItem::new(
            PenaltyCategory::C,
            "contradiction_detected",
            -10.0,
            SOURCE_INTEGRITY,
        ));
        if findings.contradictions.iter().any(|c| c.unresolved) {
            items.push(PenaltyItem::new(
                PenaltyCategory::C,
                "conflict_unresolved",
                -6.0,
                SOURCE_INTEGRITY,
            ));
        }
    }
    if findings.unsourced_numbers_detected {
        items.push(PenaltyItem::new(
            PenaltyCategory::C,
            "unsourced_numbers_detected",
            -10.0,
            SOURCE_INTEGRITY,
        ));
    }
    items
}

fn confidence_items(holding_id: &str, agent_results: &[AgentResult]) -> Vec<PenaltyItem> {
    let for_holding: Vec<&AgentResult> = agent_results
        .iter()
        .filter(|r| r.scope == AgentScope::Holding && r.holding() == Some(holding_id))
        .collect();

    let mut items = Vec::new();
    let unsure = for_holding
        .iter()
        .filter(|r| r.confidence < LOW_CONFIDENCE)
        .count();
    if unsure >= LOW_CONFIDENCE_AGENT_COUNT {
        items.push(PenaltyItem::new(
            PenaltyCategory::D,
            "low_confidence_multi_agent",
            -5.0,
            SOURCE_ENGINE,
        ));
    }

    let fatal_risk = for_holding.iter().any(|r| {
        r.agent_name.to_lowercase().contains("devil")
            && (r.finding_flag("unresolved_fatal_risk") || r.finding_flag("fatal_risk_unresolved"))
    });
    if fatal_risk {
        items.push(PenaltyItem::new(
            PenaltyCategory::D,
            "devils_advocate_unresolved_fatal_risk",
            -5.0,
            SOURCE_DEVILS_ADVOCATE,
        ));
    }
    items
}

fn fx_items(portfolio_config: &PortfolioConfig, report: Option<&FxExposureReport>) -> Vec<PenaltyItem> {
    let Some(report) = report else {
        return Vec::new();
    };
    if report.fx_hard_stop_triggered {
        return Vec::new();
    }
    let (Some(base), Some(currency)) = (
        portfolio_config.base_currency(),
        report.holding_currency.as_deref().map(str::trim),
    ) else {
        return Vec::new();
    };
    if currency.is_empty() || currency == base {
        return Vec::new();
    }

    let mut items = Vec::new();
    if report.fx_rate_missing {
        items.push(PenaltyItem::new(PenaltyCategory::E, "fx_rate_missing", -5.0, SOURCE_CONCENTRATION));
    }
    if report.fx_rate_stale {
        items.push(PenaltyItem::new(PenaltyCategory::E, "fx_rate_stale", -3.0, SOURCE_CONCENTRATION));
    }
    let high_exposure = report.fx_exposure_pct.is_some_and(|pct| pct > FX_EXPOSURE_HIGH);
    if high_exposure && report.hedge_data_missing {
        items.push(PenaltyItem::new(
            PenaltyCategory::E,
            "fx_exposure_high_no_hedge_data",
            -5.0,
            SOURCE_CONCENTRATION,
        ));
    }
    items
}

fn data_validity_items(findings: &IntegrityFindings) -> Vec<PenaltyItem> {
    let within = |days: Option<f64>, window: f64| days.is_some_and(|d| d <= window);
    let mut items = Vec::new();
    if let Some(risk) = &findings.corporate_action_risk {
        if within(risk.split_days_ago, SPLIT_WINDOW_DAYS) {
            items.push(PenaltyItem::new(
                PenaltyCategory::F,
                "recent_split_or_reverse_split",
                -6.0,
                SOURCE_INTEGRITY,
            ));
        }
        if within(risk.dividend_days_ago, DIVIDEND_WINDOW_DAYS) {
            items.push(PenaltyItem::new(
                PenaltyCategory::F,
                "recent_dividend_or_distribution",
                -3.0,
                SOURCE_INTEGRITY,
            ));
        }
        if within(risk.spinoff_or_merger_days_ago, SPINOFF_WINDOW_DAYS) {
            items.push(PenaltyItem::new(
                PenaltyCategory::F,
                "recent_spinoff_or_merger",
                -8.0,
                SOURCE_INTEGRITY,
            ));
        }
    }
    if findings.low_source_reliability {
        items.push(PenaltyItem::new(
            PenaltyCategory::F,
            "low_source_reliability",
            -5.0,
            SOURCE_INTEGRITY,
        ));
    }
    items
}

/// First occurrence of each `(category, reason, source_agent)` wins.
fn dedupe(items: Vec<PenaltyItem>) -> Vec<PenaltyItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            seen.insert((
                item.category,
                item.reason.clone(),
                item.source_agent.clone(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use committee_types::{
        agent_names, Contradiction, CorporateActionRisk, MissingField, RunMode, StalenessFlag,
    };
    use serde_json::json;

    fn engine() -> PenaltyEngine {
        PenaltyEngine::new()
    }

    fn usd() -> PortfolioConfig {
        PortfolioConfig::new("USD")
    }

    fn missing(names: &[&str]) -> IntegrityFindings {
        IntegrityFindings {
            missing_penalty_critical_fields: names
                .iter()
                .map(|n| MissingField::Name((*n).to_string()))
                .collect(),
            ..IntegrityFindings::default()
        }
    }

    fn stale(kind: &str, age_days: f64) -> StalenessFlag {
        StalenessFlag {
            staleness_type: kind.into(),
            age_days,
            hard_stop_triggered: false,
        }
    }

    fn reasons(outcome: &PenaltyOutcome) -> Vec<&str> {
        outcome
            .breakdown
            .details
            .iter()
            .map(|i| i.reason.as_str())
            .collect()
    }

    #[test]
    fn hard_stop_zeroes_everything() {
        let findings = IntegrityFindings {
            unsourced_numbers_detected: true,
            low_source_reliability: true,
            contradictions: vec![Contradiction::default()],
            ..missing(&["cash", "price"])
        };
        let outcome = engine().compute("H1", &RunConfig::default(), Some(&findings), &[], &usd(), None);
        assert_eq!(outcome.breakdown.total_penalties, 0.0);
        assert!(outcome.breakdown.details.is_empty());
        assert!(!outcome.cap_applied);
    }

    #[test]
    fn no_findings_no_penalties() {
        let outcome = engine().compute("H1", &RunConfig::default(), None, &[], &usd(), None);
        assert_eq!(outcome.breakdown, PenaltyBreakdown::zero());
    }

    #[test]
    fn missing_fields_map_to_category_a() {
        let findings = missing(&["cash", "market_cap", "adv_usd", "unknown_field"]);
        let outcome = engine().compute("H1", &RunConfig::default(), Some(&findings), &[], &usd(), None);
        assert_eq!(outcome.breakdown.category_a_missing_critical, -16.0);
        assert_eq!(
            reasons(&outcome),
            vec![
                "missing_cash_or_runway",
                "missing_liquidity_measure",
                "missing_shares_or_market_cap"
            ]
        );
    }

    #[test]
    fn duplicate_missing_fields_deduplicate() {
        let findings = missing(&["price", "volume"]);
        let outcome = engine().compute("H1", &RunConfig::default(), Some(&findings), &[], &usd(), None);
        assert_eq!(outcome.breakdown.category_a_missing_critical, -4.0);
    }

    #[test]
    fn burn_rate_company_skips_cash_fields() {
        let mut config = RunConfig::default();
        config.burn_rate_classification.insert("H1".into(), true);
        let findings = missing(&["cash", "runway_months", "price"]);
        let outcome = engine().compute("H1", &config, Some(&findings), &[], &usd(), None);
        assert_eq!(reasons(&outcome), vec!["missing_price_or_volume"]);
    }

    #[test]
    fn not_applicable_fields_skipped() {
        let findings = IntegrityFindings {
            missing_penalty_critical_fields: vec![MissingField::Detailed {
                field_name: "price".into(),
                not_applicable: true,
            }],
            ..IntegrityFindings::default()
        };
        let outcome = engine().compute("H1", &RunConfig::default(), Some(&findings), &[], &usd(), None);
        assert!(outcome.breakdown.details.is_empty());
    }

    #[test]
    fn category_a_cap_with_note() {
        let findings = missing(&[
            "cash",
            "shares_outstanding",
            "fully_diluted_shares",
            "liquidity_measure",
            "price",
            "macro_regime",
        ]);
        let outcome = engine().compute("H1", &RunConfig::default(), Some(&findings), &[], &usd(), None);
        assert_eq!(outcome.breakdown.category_a_missing_critical, -20.0);
        assert!(outcome.cap_applied);
    }

    #[test]
    fn staleness_uses_mode_thresholds() {
        let findings = IntegrityFindings {
            staleness_flags: vec![stale("financials", 100.0), stale("price_volume", 2.0)],
            ..IntegrityFindings::default()
        };
        let fast = engine().compute("H1", &RunConfig::default(), Some(&findings), &[], &usd(), None);
        assert!(fast.breakdown.details.is_empty());

        let deep_config = RunConfig {
            run_mode: RunMode::Deep,
            ..RunConfig::default()
        };
        let deep = engine().compute("H1", &deep_config, Some(&findings), &[], &usd(), None);
        assert_eq!(reasons(&deep), vec!["stale_financials", "stale_price_volume"]);
        assert_eq!(deep.breakdown.category_b_staleness, -8.0);
    }

    #[test]
    fn staleness_override_from_run_config() {
        let config: RunConfig = serde_json::from_value(json!({
            "staleness_thresholds": {"stale_company_updates": 10}
        }))
        .unwrap();
        let findings = IntegrityFindings {
            staleness_flags: vec![stale("company_updates", 11.0)],
            ..IntegrityFindings::default()
        };
        let outcome = engine().compute("H1", &config, Some(&findings), &[], &usd(), None);
        assert_eq!(reasons(&outcome), vec!["stale_company_updates"]);
    }

    #[test]
    fn contradictions_and_unresolved_conflict() {
        let findings = IntegrityFindings {
            contradictions: vec![
                Contradiction::default(),
                Contradiction {
                    unresolved: true,
                    description: None,
                },
            ],
            ..IntegrityFindings::default()
        };
        let outcome = engine().compute("H1", &RunConfig::default(), Some(&findings), &[], &usd(), None);
        assert_eq!(outcome.breakdown.category_c_contradictions_integrity, -16.0);
    }

    #[test]
    fn low_confidence_needs_three_holding_agents() {
        let unsure = |name: &str, holding: &str| {
            AgentResult::completed(name, AgentScope::Holding)
                .for_holding(holding)
                .with_confidence(0.3)
        };
        let mut results = vec![
            unsure(agent_names::FUNDAMENTALS, "H1"),
            unsure(agent_names::TECHNICAL, "H1"),
            unsure(agent_names::LIQUIDITY, "H2"),
        ];
        let two = engine().compute("H1", &RunConfig::default(), None, &results, &usd(), None);
        assert!(two.breakdown.details.is_empty());

        results.push(unsure(agent_names::RISK_OFFICER, "H1"));
        let three = engine().compute("H1", &RunConfig::default(), None, &results, &usd(), None);
        assert_eq!(reasons(&three), vec!["low_confidence_multi_agent"]);
        assert_eq!(three.breakdown.details[0].source_agent, "PenaltyEngine");
    }

    #[test]
    fn devils_advocate_fatal_risk() {
        let results = vec![AgentResult::completed(agent_names::DEVILS_ADVOCATE, AgentScope::Holding)
            .for_holding("H1")
            .with_finding("unresolved_fatal_risk", json!(true))];
        let outcome = engine().compute("H1", &RunConfig::default(), None, &results, &usd(), None);
        assert_eq!(reasons(&outcome), vec!["devils_advocate_unresolved_fatal_risk"]);
        assert_eq!(outcome.breakdown.category_d_confidence, -5.0);
    }

    #[test]
    fn fx_items_only_for_foreign_currency() {
        let report = FxExposureReport {
            holding_currency: Some("EUR".into()),
            fx_rate_missing: true,
            fx_rate_stale: true,
            fx_exposure_pct: Some(0.35),
            hedge_data_missing: true,
            ..FxExposureReport::default()
        };
        let foreign = engine().compute("H1", &RunConfig::default(), None, &[], &usd(), Some(&report));
        // -13 against the default E cap of -10 drops the -3 stale-rate item.
        assert_eq!(
            reasons(&foreign),
            vec!["fx_exposure_high_no_hedge_data", "fx_rate_missing"]
        );
        assert_eq!(foreign.breakdown.category_e_fx_exposure_risk, -10.0);
        assert!(foreign.cap_applied);

        let domestic = FxExposureReport {
            holding_currency: Some("USD".into()),
            ..report.clone()
        };
        let outcome = engine().compute("H1", &RunConfig::default(), None, &[], &usd(), Some(&domestic));
        assert!(outcome.breakdown.details.is_empty());

        let stopped = FxExposureReport {
            fx_hard_stop_triggered: true,
            ..report
        };
        let outcome = engine().compute("H1", &RunConfig::default(), None, &[], &usd(), Some(&stopped));
        assert!(outcome.breakdown.details.is_empty());
    }

    #[test]
    fn corporate_action_windows() {
        let findings = IntegrityFindings {
            corporate_action_risk: Some(CorporateActionRisk {
                split_days_ago: Some(90.0),
                dividend_days_ago: Some(91.0),
                spinoff_or_merger_days_ago: Some(180.0),
            }),
            ..IntegrityFindings::default()
        };
        let outcome = engine().compute("H1", &RunConfig::default(), Some(&findings), &[], &usd(), None);
        assert_eq!(reasons(&outcome), vec!["recent_spinoff_or_merger"]);
        // -14 against the default F cap of -10 drops the -6 split item.
        assert_eq!(outcome.breakdown.category_f_data_validity, -8.0);
    }

    #[test]
    fn total_cap_drops_across_categories() {
        let findings = IntegrityFindings {
            staleness_flags: vec![stale("financials", 500.0), stale("price_volume", 10.0)],
            low_source_reliability: true,
            corporate_action_risk: Some(CorporateActionRisk {
                dividend_days_ago: Some(5.0),
                ..CorporateActionRisk::default()
            }),
            ..IntegrityFindings::default()
        };
        let config: RunConfig = serde_json::from_value(json!({"penalty_caps": {"total": -12}})).unwrap();
        let outcome = engine().compute("H1", &config, Some(&findings), &[], &usd(), None);
        // B -8, F -8 (=-16): drop the -3 from F first (rank F > B), then -3 from B.
        assert_eq!(outcome.breakdown.total_penalties, -10.0);
        assert_eq!(reasons(&outcome), vec!["stale_financials", "low_source_reliability"]);
        assert!(outcome.cap_applied);
    }

    #[test]
    fn details_sorted_by_category_reason_source() {
        let findings = IntegrityFindings {
            low_source_reliability: true,
            contradictions: vec![Contradiction::default()],
            ..missing(&["price"])
        };
        let outcome = engine().compute("H1", &RunConfig::default(), Some(&findings), &[], &usd(), None);
        let categories: Vec<_> = outcome.breakdown.details.iter().map(|i| i.category).collect();
        assert_eq!(
            categories,
            vec![PenaltyCategory::A, PenaltyCategory::C, PenaltyCategory::F]
        );
        assert_eq!(outcome.breakdown.total_penalties, -19.0);
    }
}
