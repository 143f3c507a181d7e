use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigHashes;
use crate::outcome::RunOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Terminal,
}

/// One notable step of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEvent {
    pub code: String,
    pub scope: String,
    pub message: String,
}

/// Operational record that accompanies every run, whatever its outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub run_id: String,
    pub started_at_utc: DateTime<Utc>,
    pub ended_at_utc: DateTime<Utc>,
    pub status: RunStatus,
    pub outcome: RunOutcome,
    pub reasons: Vec<String>,
    pub config_hashes: ConfigHashes,
    #[serde(default)]
    pub events: Vec<RunLogEvent>,
}
