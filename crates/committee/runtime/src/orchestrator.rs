use committee_agents::{AgentExecutor, AgentInputs, AgentPhase, AgentRegistry, AgentRegistryConfig};
use committee_canonical::{sort_canonically, OrderingRule};
use committee_guard::{do_not_trade_signals, GovernanceEngine, GuardContext, GuardSet, HoldingLedger};
use committee_types::{
    AgentResult, FailedRunPacket, GuardId, GuardResult, RunLog, RunOutcome, RunPacket,
};
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::clock::{Clock, RunIdSource, SystemClock, UuidRunIds};
use crate::error::RuntimeError;
use crate::runlog::RunLogBuilder;
use crate::validation::{ParsedInputs, RunInputs};

/// Guards evaluated before any agent runs.
const PRE_AGENT_GUARDS: [GuardId; 5] = [GuardId::G0, GuardId::G1, GuardId::G2, GuardId::G3, GuardId::G4];

/// Guards evaluated after the agent phases.
const POST_AGENT_GUARDS: [GuardId; 6] = [
    GuardId::G5,
    GuardId::G6,
    GuardId::G7,
    GuardId::G8,
    GuardId::G9,
    GuardId::G10,
];

const SKIP_TERMINAL: &str = "portfolio_already_terminal";

/// Everything a run produces.
#[derive(Clone, Debug)]
pub struct OrchestrationResult {
    pub packet: RunPacket,
    pub run_log: RunLog,
    pub outcome: RunOutcome,
    /// Guard results in evaluation order.
    pub guard_results: Vec<GuardResult>,
    /// Agent results in emitted order.
    pub agent_results: Vec<AgentResult>,
}

impl OrchestrationResult {
    pub fn run_hash(&self) -> Option<&str> {
        self.packet.committee()?.hashes.run_hash.as_deref()
    }

    pub fn decision_hash(&self) -> Option<&str> {
        self.packet.committee()?.hashes.decision_hash.as_deref()
    }

    pub fn reasons(&self) -> &[String] {
        self.packet.reasons()
    }
}

/// Drives one committee run end to end.
///
/// Order of work:
///
/// 1. parse and validate the documents, sort holdings
/// 2. G0 to G4; a FAILED or hard-stop VETOED portfolio skips everything after
/// 3. agent phases, applying integrity and risk officer signals after each,
///    then the results put in emitted order
/// 4. G5 to G10
/// 5. governance precedence, packet aggregation, run log
pub struct Orchestrator {
    guards: GuardSet,
    registry: AgentRegistry,
    aggregator: Aggregator,
    clock: Box<dyn Clock>,
    run_ids: Box<dyn RunIdSource>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            guards: GuardSet::standard(),
            registry: AgentRegistry::standard(),
            aggregator: Aggregator::new(),
            clock: Box::new(SystemClock),
            run_ids: Box::new(UuidRunIds),
        }
    }

    pub fn from_registry_config(config: &AgentRegistryConfig) -> Result<Self, RuntimeError> {
        Ok(Self::new().with_registry(AgentRegistry::from_config(config)?))
    }

    pub fn with_registry(mut self, registry: AgentRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_run_ids(mut self, run_ids: impl RunIdSource + 'static) -> Self {
        self.run_ids = Box::new(run_ids);
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Execute one run. Never fails: every problem becomes an outcome.
    pub fn run(&self, inputs: &RunInputs) -> OrchestrationResult {
        let run_id = self.run_ids.next_id();
        let mut log = RunLogBuilder::new(&run_id, self.clock.now(), inputs.config_hashes.clone());
        info!(run_id = %run_id, "committee run started");

        let parsed = match ParsedInputs::parse(inputs) {
            Ok(parsed) => parsed,
            Err(reasons) => {
                warn!(run_id = %run_id, reasons = ?reasons, "input documents failed to parse");
                log.event("schema_validation_failed", "portfolio", reasons.join(","));
                let packet = self.aggregator.schema_failure(&run_id, inputs, reasons);
                return self.failed(packet, log, Vec::new(), Vec::new());
            }
        };

        let mut engine = GovernanceEngine::new(HoldingLedger::from_snapshot(&parsed.snapshot));
        let mut agent_results: Vec<AgentResult> = Vec::new();

        self.run_guards(&PRE_AGENT_GUARDS, inputs, &parsed, &mut engine, &agent_results, &mut log);

        if !engine.is_terminal() {
            match &inputs.agent_results {
                Some(injected) => {
                    agent_results = emission_order(injected.clone());
                    engine.apply_integrity_signals(&agent_results);
                    engine.apply_risk_officer_vetoes(&agent_results);
                    log.event("agent_results_injected", "portfolio", format!("{} results", agent_results.len()));
                }
                None => {
                    self.run_agent_phases(&parsed, &mut engine, &mut agent_results, &mut log);
                    agent_results = emission_order(agent_results);
                }
            }
        }

        self.run_guards(&POST_AGENT_GUARDS, inputs, &parsed, &mut engine, &agent_results, &mut log);

        let guard_results = engine.trail().to_vec();
        let decision = engine.finalize();
        let packet = match self
            .aggregator
            .build(&run_id, inputs, &parsed, &decision, &agent_results)
        {
            Ok(packet) => packet,
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "packet aggregation failed");
                let mut reasons = decision.portfolio_reasons.clone();
                reasons.push("packet_serialization_failed".to_owned());
                reasons.sort();
                RunPacket::Failed(FailedRunPacket {
                    run_id: run_id.clone(),
                    portfolio_run_outcome: RunOutcome::Failed,
                    failure_reason: "packet_serialization_failed".to_owned(),
                    reasons,
                    portfolio_id: Some(parsed.snapshot.portfolio_id.clone()),
                    as_of_date: Some(parsed.snapshot.as_of_date),
                    base_currency: parsed.portfolio_config.base_currency().map(str::to_owned),
                    run_mode: Some(parsed.run_config.run_mode),
                    config_hashes: inputs.config_hashes.clone(),
                })
            }
        };

        let outcome = packet.outcome();
        log.event("run_finalized", "portfolio", outcome.as_str());
        let run_log = log.finish(self.clock.now(), outcome, packet.reasons().to_vec());
        info!(run_id = %run_id, outcome = %outcome, "committee run finished");
        OrchestrationResult {
            packet,
            run_log,
            outcome,
            guard_results,
            agent_results,
        }
    }

    fn failed(
        &self,
        packet: FailedRunPacket,
        log: RunLogBuilder,
        guard_results: Vec<GuardResult>,
        agent_results: Vec<AgentResult>,
    ) -> OrchestrationResult {
        let run_log = log.finish(self.clock.now(), RunOutcome::Failed, packet.reasons.clone());
        OrchestrationResult {
            packet: RunPacket::Failed(packet),
            run_log,
            outcome: RunOutcome::Failed,
            guard_results,
            agent_results,
        }
    }

    /// Evaluate `ids` in order, recording skips once the portfolio is terminal.
    fn run_guards(
        &self,
        ids: &[GuardId],
        inputs: &RunInputs,
        parsed: &ParsedInputs,
        engine: &mut GovernanceEngine,
        agent_results: &[AgentResult],
        log: &mut RunLogBuilder,
    ) {
        for &id in ids {
            let result = if engine.is_terminal() {
                GuardResult::skip(id, SKIP_TERMINAL)
            } else {
                let context = GuardContext {
                    snapshot: &parsed.snapshot,
                    portfolio_config: &parsed.portfolio_config,
                    run_config: &parsed.run_config,
                    config_snapshot: &parsed.config_snapshot,
                    manifest: inputs.manifest.as_ref(),
                    config_hashes: &inputs.config_hashes,
                    schema_errors: &parsed.schema_errors,
                    agent_results,
                    ledger: engine.ledger(),
                    portfolio_outcome: engine.provisional_outcome(),
                };
                self.guards.evaluate(id, &context)
            };
            log.guard(&result);
            engine.record_guard(result);
        }
    }

    fn run_agent_phases(
        &self,
        parsed: &ParsedInputs,
        engine: &mut GovernanceEngine,
        agent_results: &mut Vec<AgentResult>,
        log: &mut RunLogBuilder,
    ) {
        let executor = AgentExecutor::new(&self.registry);
        let inputs = AgentInputs {
            snapshot: &parsed.snapshot,
            portfolio_config: &parsed.portfolio_config,
            run_config: &parsed.run_config,
            config_snapshot: &parsed.config_snapshot,
        };

        for phase in AgentPhase::ALL {
            if engine.is_terminal() {
                log.event("agent_phases_skipped", phase.as_str(), SKIP_TERMINAL);
                break;
            }

            let first_new = agent_results.len();
            let portfolio = executor.run_portfolio(phase, inputs, agent_results);
            agent_results.extend(portfolio);

            for (index, holding) in parsed.snapshot.holdings.iter().enumerate() {
                if !eligible(engine.ledger(), index, holding.holding_id(), agent_results) {
                    continue;
                }
                let results = executor.run_holding(phase, inputs, holding, agent_results);
                agent_results.extend(results);
            }

            let produced = &agent_results[first_new..];
            engine.apply_integrity_signals(produced);
            engine.apply_risk_officer_vetoes(produced);
            debug!(%phase, results = produced.len(), "agent phase completed");
            log.event("agent_phase_completed", phase.as_str(), format!("{} results", produced.len()));

            if phase == AgentPhase::MacroRegime {
                let signals = do_not_trade_signals(agent_results, &parsed.run_config);
                if !signals.is_empty() {
                    info!(signals = ?signals, "do-not-trade raised, remaining agent phases skipped");
                    log.event("agent_phases_skipped", phase.as_str(), signals.join(","));
                    break;
                }
            }
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Agent results in the order they are emitted, ties broken on the full encoding.
///
/// Scorecard lookups take the first match per agent and holding, so results
/// sharing that key must not depend on input order. When a result cannot be
/// canonicalized G7 fails the run; until then the primary key orders the list.
fn emission_order(results: Vec<AgentResult>) -> Vec<AgentResult> {
    let mut fallback = results.clone();
    sort_canonically(results, OrderingRule::AgentOutputs).unwrap_or_else(|e| {
        warn!(error = %e, "agent results could not be canonicalized");
        fallback.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        fallback
    })
}

/// Holding still COMPLETED, addressed by its first occurrence, and without a failed result.
fn eligible(ledger: &HoldingLedger, index: usize, holding_id: Option<&str>, results: &[AgentResult]) -> bool {
    let Some(id) = holding_id else {
        return false;
    };
    ledger.outcome(index) == Some(RunOutcome::Completed)
        && ledger.index_of(id) == Some(index)
        && !results.iter().any(|r| r.is_failed() && r.holding() == Some(id))
}
