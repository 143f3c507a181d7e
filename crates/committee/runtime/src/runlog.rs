use chrono::{DateTime, Utc};
use committee_types::{ConfigHashes, GuardResult, GuardVerdict, RunLog, RunLogEvent, RunOutcome, RunStatus};

/// Accumulates [`RunLogEvent`]s while a run progresses.
#[derive(Clone, Debug)]
pub struct RunLogBuilder {
    run_id: String,
    started_at_utc: DateTime<Utc>,
    config_hashes: ConfigHashes,
    events: Vec<RunLogEvent>,
}

impl RunLogBuilder {
    pub fn new(run_id: impl Into<String>, started_at_utc: DateTime<Utc>, config_hashes: ConfigHashes) -> Self {
        Self {
            run_id: run_id.into(),
            started_at_utc,
            config_hashes,
            events: Vec::new(),
        }
    }

    pub fn event(&mut self, code: impl Into<String>, scope: impl Into<String>, message: impl Into<String>) {
        self.events.push(RunLogEvent {
            code: code.into(),
            scope: scope.into(),
            message: message.into(),
        });
    }

    /// Log failed and skipped guards. Passing guards leave no event.
    pub fn guard(&mut self, result: &GuardResult) {
        let code = match result.verdict {
            GuardVerdict::Pass => return,
            GuardVerdict::Fail { .. } => "guard_failed",
            GuardVerdict::Skip => "guard_skipped",
        };
        self.event(code, result.guard_id.to_string(), result.reasons.join(","));
    }

    pub fn finish(self, ended_at_utc: DateTime<Utc>, outcome: RunOutcome, reasons: Vec<String>) -> RunLog {
        RunLog {
            run_id: self.run_id,
            started_at_utc: self.started_at_utc,
            ended_at_utc,
            status: RunStatus::Terminal,
            outcome,
            reasons,
            config_hashes: self.config_hashes,
            events: self.events,
        }
    }
}
