use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of run-log timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of run ids.
pub trait RunIdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidRunIds;

impl RunIdSource for UuidRunIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Clone, Debug)]
pub struct FixedRunId(pub String);

impl RunIdSource for FixedRunId {
    fn next_id(&self) -> String {
        self.0.clone()
    }
}
