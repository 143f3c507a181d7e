//! Holding packets, the committee packet and its audit hashes.

use std::collections::BTreeMap;

use committee_canonical::{hash_serialize, sort_canonically, OrderingRule, RunHashComponents};
use committee_guard::{GovernanceDecision, HoldingState};
use committee_penalty::PenaltyEngine;
use committee_types::{
    agent_names, AgentResult, AgentScope, AuditHashes, FailedRunPacket, FxExposureReport, Holding,
    HoldingPacket, IntegrityFindings, PacketSummary, PortfolioCommitteePacket, RunMode, RunOutcome,
    RunPacket, Scorecard,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::caps::{apply_score_caps, score_caps};
use crate::error::RuntimeError;
use crate::scoring::base_score;
use crate::validation::{ParsedInputs, RunInputs};

pub const SCHEMA_VALIDATION_FAILED: &str = "schema_validation_failed";
pub const NOTE_PENALTY_CAP_APPLIED: &str = "penalty_cap_applied";
pub const NOTE_BASE_SCORE_UNAVAILABLE: &str = "base_score_unavailable";

/// Payload hashed into `decision_hash`.
#[derive(Serialize)]
struct DecisionPayload<'a> {
    portfolio_committee_packet: &'a PortfolioCommitteePacket,
    holding_packets: &'a [HoldingPacket],
}

/// Turns a governance decision into the emitted packet.
#[derive(Clone, Copy, Debug, Default)]
pub struct Aggregator {
    penalty_engine: PenaltyEngine,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            penalty_engine: PenaltyEngine::new(),
        }
    }

    /// Packet for a run that got past parsing.
    pub fn build(
        &self,
        run_id: &str,
        inputs: &RunInputs,
        parsed: &ParsedInputs,
        decision: &GovernanceDecision,
        agent_results: &[AgentResult],
    ) -> Result<RunPacket, RuntimeError> {
        if decision.portfolio_outcome == RunOutcome::Failed {
            let failure_reason = if decision
                .portfolio_reasons
                .iter()
                .any(|r| parsed.schema_errors.contains(r))
            {
                SCHEMA_VALIDATION_FAILED.to_owned()
            } else {
                decision
                    .portfolio_reasons
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "run_failed".to_owned())
            };
            return Ok(RunPacket::Failed(FailedRunPacket {
                run_id: run_id.to_owned(),
                portfolio_run_outcome: RunOutcome::Failed,
                failure_reason,
                reasons: decision.portfolio_reasons.clone(),
                portfolio_id: Some(parsed.snapshot.portfolio_id.clone()),
                as_of_date: Some(parsed.snapshot.as_of_date),
                base_currency: parsed.portfolio_config.base_currency().map(str::to_owned),
                run_mode: Some(parsed.run_config.run_mode),
                config_hashes: inputs.config_hashes.clone(),
            }));
        }

        let packet = self.committee_packet(run_id, parsed, decision, agent_results)?;
        Ok(RunPacket::Committee(Box::new(packet)))
    }

    /// Packet for a run whose documents did not parse.
    pub fn schema_failure(&self, run_id: &str, inputs: &RunInputs, reasons: Vec<String>) -> FailedRunPacket {
        let text = |doc: &Value, key: &str| doc.get(key).and_then(Value::as_str).map(str::to_owned);
        FailedRunPacket {
            run_id: run_id.to_owned(),
            portfolio_run_outcome: RunOutcome::Failed,
            failure_reason: SCHEMA_VALIDATION_FAILED.to_owned(),
            reasons,
            portfolio_id: text(&inputs.portfolio_snapshot, "portfolio_id"),
            as_of_date: inputs
                .portfolio_snapshot
                .get("as_of_date")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            base_currency: text(&inputs.portfolio_config, "base_currency"),
            run_mode: inputs
                .run_config
                .get("run_mode")
                .and_then(|v| serde_json::from_value::<RunMode>(v.clone()).ok()),
            config_hashes: inputs.config_hashes.clone(),
        }
    }

    /// Committee packet for a COMPLETED, VETOED or SHORT_CIRCUITED run.
    ///
    /// Audit hashes are attached only when the portfolio COMPLETED.
    pub fn committee_packet(
        &self,
        run_id: &str,
        parsed: &ParsedInputs,
        decision: &GovernanceDecision,
        agent_results: &[AgentResult],
    ) -> Result<PortfolioCommitteePacket, RuntimeError> {
        let outcome = decision.portfolio_outcome;

        let holdings = if outcome == RunOutcome::Vetoed {
            Vec::new()
        } else {
            let packets: Vec<HoldingPacket> = parsed
                .snapshot
                .holdings
                .iter()
                .zip(&decision.holdings)
                .map(|(holding, state)| self.holding_packet(holding, state, outcome, parsed, agent_results))
                .collect();
            sort_canonically(packets, OrderingRule::Holdings)?
        };

        let per_holding_outcomes: BTreeMap<String, RunOutcome> = decision
            .holdings
            .iter()
            .map(|state| (state.label.clone(), state.outcome))
            .collect();

        let mut packet = PortfolioCommitteePacket {
            run_id: run_id.to_owned(),
            portfolio_id: parsed.snapshot.portfolio_id.clone(),
            as_of_date: parsed.snapshot.as_of_date,
            base_currency: parsed.portfolio_config.base_currency().map(str::to_owned),
            run_mode: parsed.run_config.run_mode,
            portfolio_run_outcome: outcome,
            reasons: decision.portfolio_reasons.clone(),
            holdings,
            per_holding_outcomes,
            summary: summary(decision),
            governance_trail: sort_canonically(decision.trail.clone(), OrderingRule::GuardEvents)?,
            agent_outputs: sort_canonically(agent_results.to_vec(), OrderingRule::AgentOutputs)?,
            hashes: AuditHashes::default(),
        };

        if outcome == RunOutcome::Completed {
            packet.hashes = audit_hashes(parsed, &packet)?;
            debug!(run_hash = ?packet.hashes.run_hash, "audit hashes attached");
        }
        Ok(packet)
    }

    fn holding_packet(
        &self,
        holding: &Holding,
        state: &HoldingState,
        portfolio_outcome: RunOutcome,
        parsed: &ParsedInputs,
        agent_results: &[AgentResult],
    ) -> HoldingPacket {
        let scorecard = match (portfolio_outcome, state.outcome, holding.holding_id()) {
            (RunOutcome::Completed, RunOutcome::Completed, Some(id)) => {
                Some(self.scorecard(holding, id, parsed, agent_results))
            }
            _ => None,
        };
        HoldingPacket {
            holding_id: state.label.clone(),
            identity: holding.identity.clone(),
            holding_run_outcome: state.outcome,
            scorecard,
            limitations: limitations(state),
        }
    }

    /// Base score, caps and penalties for a COMPLETED holding.
    pub fn scorecard(
        &self,
        holding: &Holding,
        holding_id: &str,
        parsed: &ParsedInputs,
        agent_results: &[AgentResult],
    ) -> Scorecard {
        let integrity = agent_results
            .iter()
            .find(|r| {
                r.is(agent_names::INTEGRITY)
                    && !r.is_failed()
                    && r.scope == AgentScope::Holding
                    && r.holding() == Some(holding_id)
            })
            .and_then(|r| IntegrityFindings::from_findings(&r.key_findings).ok());

        let fx_report = agent_results
            .iter()
            .filter(|r| r.is(agent_names::CONCENTRATION) && !r.is_failed())
            .find_map(|r| FxExposureReport::for_holding(&r.key_findings, holding_id))
            .map(|mut report| {
                if report.holding_currency.is_none() {
                    report.holding_currency = holding.currency.clone();
                }
                report
            });

        let penalty = self.penalty_engine.compute(
            holding_id,
            &parsed.run_config,
            integrity.as_ref(),
            agent_results,
            &parsed.portfolio_config,
            fx_report.as_ref(),
        );

        let (base, applied_caps) = apply_score_caps(
            base_score(holding, parsed.rubric.as_ref()),
            score_caps(agent_results, holding_id),
        );
        let final_score = base.map(|b| (b + penalty.breakdown.total_penalties).clamp(0.0, 100.0));

        let mut notes = Vec::new();
        if penalty.cap_applied {
            notes.push(NOTE_PENALTY_CAP_APPLIED.to_owned());
        }
        if base.is_none() {
            notes.push(NOTE_BASE_SCORE_UNAVAILABLE.to_owned());
        }

        Scorecard {
            base_score: base,
            penalty_breakdown: penalty.breakdown,
            final_score,
            applied_caps,
            notes,
        }
    }
}

fn limitations(state: &HoldingState) -> Vec<String> {
    match state.outcome {
        RunOutcome::Failed => state
            .reasons
            .iter()
            .map(|r| format!("error_classification:{r}"))
            .collect(),
        _ => state.reasons.clone(),
    }
}

fn summary(decision: &GovernanceDecision) -> PacketSummary {
    let mut counts_by_outcome: BTreeMap<RunOutcome, usize> = [
        RunOutcome::Completed,
        RunOutcome::Vetoed,
        RunOutcome::ShortCircuited,
        RunOutcome::Failed,
    ]
    .into_iter()
    .map(|o| (o, 0))
    .collect();
    for state in &decision.holdings {
        *counts_by_outcome.entry(state.outcome).or_default() += 1;
    }

    let reasons_if = |outcome: RunOutcome| {
        if decision.portfolio_outcome == outcome {
            decision.deciding_reasons.clone()
        } else {
            Vec::new()
        }
    };
    PacketSummary {
        counts_by_outcome,
        veto_reasons: reasons_if(RunOutcome::Vetoed),
        short_circuit_reasons: reasons_if(RunOutcome::ShortCircuited),
    }
}

/// The five component digests and the run hash composed from them.
///
/// Hash fields are excluded from canonical form, so `packet` may already
/// carry hashes without changing the result.
pub fn audit_hashes(parsed: &ParsedInputs, packet: &PortfolioCommitteePacket) -> Result<AuditHashes, RuntimeError> {
    let components = RunHashComponents {
        snapshot_hash: hash_serialize(&parsed.snapshot)?,
        config_hash: hash_serialize(&parsed.portfolio_config)?,
        run_config_hash: hash_serialize(&parsed.run_config)?,
        committee_packet_hash: hash_serialize(packet)?,
        decision_hash: hash_serialize(&DecisionPayload {
            portfolio_committee_packet: packet,
            holding_packets: &packet.holdings,
        })?,
    };
    let run_hash = components.run_hash();
    Ok(AuditHashes {
        snapshot_hash: Some(components.snapshot_hash),
        config_hash: Some(components.config_hash),
        run_config_hash: Some(components.run_config_hash),
        committee_packet_hash: Some(components.committee_packet_hash),
        decision_hash: Some(components.decision_hash),
        run_hash: Some(run_hash),
    })
}
