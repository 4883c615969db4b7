// Dashboard snapshot domain model
use super::calendar::ReferenceDate;
use super::chart::ChartSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Refresh tick identifier. Equal ticks share one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TickId(pub u64);

impl TickId {
    /// Tick containing `unix_secs` for a refresh cadence of `interval_secs`.
    pub fn from_unix_secs(unix_secs: i64, interval_secs: u64) -> Self {
        let secs = unix_secs.max(0) as u64;
        Self(secs / interval_secs.max(1))
    }
}

/// All charts of one section at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub section: SectionId,
    pub tick: TickId,
    pub generated_at: DateTime<Utc>,
    pub reference_date: ReferenceDate,
    pub charts: Vec<ChartSeries>,
}

impl Snapshot {
    pub fn new(
        section: SectionId,
        tick: TickId,
        generated_at: DateTime<Utc>,
        reference_date: ReferenceDate,
        charts: Vec<ChartSeries>,
    ) -> Self {
        Self {
            section,
            tick,
            generated_at,
            reference_date,
            charts,
        }
    }
}
