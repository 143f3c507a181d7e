//! Replay verification: identical inputs must give identical decisions.

use committee_canonical::hash_serialize;
use committee_types::RunOutcome;
use tracing::{info, warn};

use crate::error::RuntimeError;
use crate::orchestrator::{OrchestrationResult, Orchestrator};
use crate::validation::RunInputs;

/// Per-run digests of a replay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub outcomes: Vec<RunOutcome>,
    /// Canonical digest of each emitted packet. Run ids are excluded, so
    /// these agree for every outcome, not only COMPLETED.
    pub packet_digests: Vec<String>,
    pub decision_hashes: Vec<Option<String>>,
    pub run_hashes: Vec<Option<String>>,
}

impl ReplayReport {
    pub fn runs(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_deterministic(&self) -> bool {
        all_equal(&self.outcomes)
            && all_equal(&self.packet_digests)
            && all_equal(&self.decision_hashes)
            && all_equal(&self.run_hashes)
    }

    /// The run hash every run agreed on.
    pub fn run_hash(&self) -> Option<&str> {
        if !self.is_deterministic() {
            return None;
        }
        self.run_hashes.first()?.as_deref()
    }
}

fn all_equal<T: PartialEq>(items: &[T]) -> bool {
    items.windows(2).all(|w| w[0] == w[1])
}

/// Run `inputs` `times` times.
pub fn replay(orchestrator: &Orchestrator, inputs: &RunInputs, times: usize) -> Result<ReplayReport, RuntimeError> {
    let mut report = ReplayReport::default();
    for _ in 0..times {
        let result = orchestrator.run(inputs);
        report.packet_digests.push(hash_serialize(&result.packet)?);
        report.decision_hashes.push(result.decision_hash().map(str::to_owned));
        report.run_hashes.push(result.run_hash().map(str::to_owned));
        report.outcomes.push(result.outcome);
    }
    if report.is_deterministic() {
        info!(runs = report.runs(), run_hash = ?report.run_hash(), "replay deterministic");
    } else {
        warn!(runs = report.runs(), "replay diverged");
    }
    Ok(report)
}

/// Whether `result` carries exactly the `expected` run hash.
pub fn verify_run_hash(result: &OrchestrationResult, expected: &str) -> bool {
    result.run_hash() == Some(expected.trim())
}
