use committee_types::{
    agent_names, AgentResult, AgentScope, GuardId, GuardResult, IntegrityFindings, RunConfig,
    RunOutcome, ViolationTarget,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ledger::{HoldingLedger, HoldingState};

/// Do-not-trade reason codes raised by the macro-regime agent or the run config.
pub fn do_not_trade_signals(results: &[AgentResult], run_config: &RunConfig) -> Vec<&'static str> {
    let mut signals = Vec::new();
    if results
        .iter()
        .any(|r| r.is(agent_names::MACRO_REGIME) && r.finding_flag("do_not_trade_flag"))
    {
        signals.push("grra_do_not_trade");
    }
    if run_config.do_not_trade_flag {
        signals.push("run_config_do_not_trade");
    }
    signals
}

/// Final outcomes of a governed run.
#[derive(Clone, Debug, Serialize)]
pub struct GovernanceDecision {
    pub portfolio_outcome: RunOutcome,
    /// Sorted and deduplicated.
    pub portfolio_reasons: Vec<String>,
    /// Reasons of the precedence tier that set `portfolio_outcome`, sorted.
    pub deciding_reasons: Vec<String>,
    /// One entry per holding, in canonical order.
    pub holdings: Vec<HoldingState>,
    /// Every guard result recorded, in evaluation order.
    pub trail: Vec<GuardResult>,
}

/// Folds guard results and agent signals into holding and portfolio outcomes.
///
/// Portfolio-level signals are kept in one bucket per precedence tier so
/// the outcome can be read off at any point of the run:
///
/// 1. FAILED (schema, guard or conformance failures)
/// 2. hard-stop VETOED (G1/G2 vetoes, integrity agent)
/// 3. SHORT_CIRCUITED (do-not-trade)
/// 4. partial-failure VETOED (G9)
/// 5. COMPLETED
#[derive(Clone, Debug)]
pub struct GovernanceEngine {
    ledger: HoldingLedger,
    trail: Vec<GuardResult>,
    failed: Vec<String>,
    hard_stop: Vec<String>,
    short_circuit: Vec<String>,
    partial_failure: Vec<String>,
}

impl GovernanceEngine {
    pub fn new(ledger: HoldingLedger) -> Self {
        Self {
            ledger,
            trail: Vec::new(),
            failed: Vec::new(),
            hard_stop: Vec::new(),
            short_circuit: Vec::new(),
            partial_failure: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &HoldingLedger {
        &self.ledger
    }

    pub fn trail(&self) -> &[GuardResult] {
        &self.trail
    }

    /// Append a guard result to the trail and apply its violations.
    pub fn record_guard(&mut self, result: GuardResult) {
        for violation in &result.violations {
            match &violation.target {
                ViolationTarget::Portfolio => {
                    let bucket = match violation.outcome {
                        RunOutcome::Failed => &mut self.failed,
                        RunOutcome::Vetoed if violation.guard_id == GuardId::G9 => {
                            &mut self.partial_failure
                        }
                        RunOutcome::Vetoed => &mut self.hard_stop,
                        RunOutcome::ShortCircuited => &mut self.short_circuit,
                        RunOutcome::Completed => continue,
                    };
                    bucket.push(violation.reason.clone());
                }
                ViolationTarget::Holding(holding) => match self.ledger.resolve(holding) {
                    Some(index) => {
                        self.ledger
                            .degrade(index, violation.outcome, &violation.reason);
                    }
                    None => warn!(
                        guard = %violation.guard_id,
                        holding = ?holding.holding_id,
                        "violation targets an unknown holding"
                    ),
                },
            }
        }
        self.trail.push(result);
    }

    /// Apply integrity-agent hard stops found in `results`.
    ///
    /// Findings that do not parse are ignored here; G5 reports them.
    pub fn apply_integrity_signals(&mut self, results: &[AgentResult]) {
        for result in results.iter().filter(|r| r.is(agent_names::INTEGRITY)) {
            let hard_stop = IntegrityFindings::from_findings(&result.key_findings)
                .map(|findings| findings.hard_stop())
                .unwrap_or(false);
            if !hard_stop {
                continue;
            }
            match (result.scope, result.holding()) {
                (AgentScope::Portfolio, _) => {
                    info!("integrity agent raised a portfolio hard stop");
                    self.hard_stop.push("dio_portfolio_veto".into());
                }
                (AgentScope::Holding, Some(id)) => {
                    if let Some(index) = self.ledger.index_of(id) {
                        self.ledger
                            .degrade(index, RunOutcome::Vetoed, "dio_integrity_veto");
                    }
                }
                (AgentScope::Holding, None) => {}
            }
        }
    }

    /// Veto every holding a holding-scoped risk officer result flagged.
    pub fn apply_risk_officer_vetoes(&mut self, results: &[AgentResult]) {
        for result in results.iter().filter(|r| {
            r.is(agent_names::RISK_OFFICER) && r.scope == AgentScope::Holding && !r.veto_flags.is_empty()
        }) {
            if let Some(index) = result.holding().and_then(|id| self.ledger.index_of(id)) {
                debug!(holding = ?result.holding(), flags = ?result.veto_flags, "risk officer veto");
                self.ledger
                    .degrade(index, RunOutcome::Vetoed, "risk_officer_veto");
            }
        }
    }

    /// Portfolio outcome implied by everything recorded so far.
    pub fn provisional_outcome(&self) -> RunOutcome {
        if !self.failed.is_empty() {
            RunOutcome::Failed
        } else if !self.hard_stop.is_empty() {
            RunOutcome::Vetoed
        } else if !self.short_circuit.is_empty() {
            RunOutcome::ShortCircuited
        } else if !self.partial_failure.is_empty() {
            RunOutcome::Vetoed
        } else {
            RunOutcome::Completed
        }
    }

    /// The first non-empty bucket in precedence order.
    fn deciding_tier(&self) -> &[String] {
        [
            &self.failed,
            &self.hard_stop,
            &self.short_circuit,
            &self.partial_failure,
        ]
        .into_iter()
        .find(|bucket| !bucket.is_empty())
        .map(|bucket| bucket.as_slice())
        .unwrap_or_default()
    }

    /// The portfolio is FAILED or hard-stop VETOED; nothing later can change that.
    pub fn is_terminal(&self) -> bool {
        !self.failed.is_empty() || !self.hard_stop.is_empty()
    }

    /// Do-not-trade has been recorded.
    pub fn is_short_circuited(&self) -> bool {
        !self.short_circuit.is_empty()
    }

    /// Resolve precedence and produce the final decision.
    ///
    /// A SHORT_CIRCUITED portfolio moves every holding still COMPLETED to
    /// SHORT_CIRCUITED.
    pub fn finalize(mut self) -> GovernanceDecision {
        let portfolio_outcome = self.provisional_outcome();
        let mut deciding_reasons = self.deciding_tier().to_vec();
        deciding_reasons.sort();
        deciding_reasons.dedup();
        if portfolio_outcome == RunOutcome::ShortCircuited {
            for index in 0..self.ledger.len() {
                for reason in &self.short_circuit {
                    self.ledger
                        .degrade(index, RunOutcome::ShortCircuited, reason);
                }
            }
        }

        let mut portfolio_reasons: Vec<String> = [
            self.failed,
            self.hard_stop,
            self.short_circuit,
            self.partial_failure,
        ]
        .concat();
        portfolio_reasons.sort();
        portfolio_reasons.dedup();

        info!(outcome = %portfolio_outcome, reasons = ?portfolio_reasons, "governance finalized");
        GovernanceDecision {
            portfolio_outcome,
            portfolio_reasons,
            deciding_reasons,
            holdings: self.ledger.into_entries(),
            trail: self.trail,
        }
    }
}
