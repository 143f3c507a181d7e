use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal outcome of a run, at portfolio or holding granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    Completed,
    Vetoed,
    ShortCircuited,
    Failed,
}

impl RunOutcome {
    /// Severity rank: higher is worse.
    pub fn severity(self) -> u8 {
        match self {
            RunOutcome::Completed => 0,
            RunOutcome::ShortCircuited => 1,
            RunOutcome::Vetoed => 2,
            RunOutcome::Failed => 3,
        }
    }

    pub fn is_completed(self) -> bool {
        matches!(self, RunOutcome::Completed)
    }

    /// FAILED or VETOED: the outcomes counted against the partial-failure threshold.
    pub fn is_failed_or_vetoed(self) -> bool {
        matches!(self, RunOutcome::Failed | RunOutcome::Vetoed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Completed => "COMPLETED",
            RunOutcome::Vetoed => "VETOED",
            RunOutcome::ShortCircuited => "SHORT_CIRCUITED",
            RunOutcome::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation depth. Selects staleness thresholds and the default total penalty cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunMode {
    #[default]
    Fast,
    Deep,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Fast => "FAST",
            RunMode::Deep => "DEEP",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
