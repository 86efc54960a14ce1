//! Per-phase counters and the aggregate run report.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Counters accumulated while one reconciliation phase runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseStats {
    /// Local inputs considered.
    pub seen: usize,
    /// Inputs whose persisted state already matched.
    pub unchanged: usize,
    /// Fresh rows inserted.
    pub created: usize,
    /// Rows (assets) or items with at least one field rewritten.
    pub updated: usize,
    /// Individual field-level writes (item phase only).
    pub field_updates: usize,
    /// Store inconsistencies repaired by delete-and-reinsert.
    pub conflicts: usize,
    /// Non-fatal anomalies logged and skipped (unmapped category codes).
    pub anomalies: usize,
    /// Store write statements issued.
    pub writes: usize,
}

/// Timing and counters for one named phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: &'static str,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub stats: PhaseStats,
}

impl PhaseReport {
    #[must_use]
    pub fn new(phase: &'static str, elapsed: Duration, stats: PhaseStats) -> Self {
        Self {
            phase,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            stats,
        }
    }
}

/// Aggregate report for a full reconciliation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub phases: Vec<PhaseReport>,
}

impl RunReport {
    /// Total store writes across all phases. Zero means the run was a no-op,
    /// which is the expected second-run outcome for unchanged inputs.
    #[must_use]
    pub fn total_writes(&self) -> usize {
        self.phases.iter().map(|phase| phase.stats.writes).sum()
    }

    /// Total repaired store inconsistencies.
    #[must_use]
    pub fn total_conflicts(&self) -> usize {
        self.phases.iter().map(|phase| phase.stats.conflicts).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for phase in &self.phases {
            writeln!(
                f,
                "{:<10} {:>5}ms  seen={} unchanged={} created={} updated={} \
                 conflicts={} anomalies={} writes={}",
                phase.phase,
                phase.duration_ms,
                phase.stats.seen,
                phase.stats.unchanged,
                phase.stats.created,
                phase.stats.updated,
                phase.stats.conflicts,
                phase.stats.anomalies,
                phase.stats.writes,
            )?;
        }
        write!(f, "total writes: {}", self.total_writes())
    }
}

#[cfg(test)]
mod tests {
    use super::{PhaseReport, PhaseStats, RunReport};
    use std::time::Duration;

    #[test]
    fn totals_sum_across_phases() {
        let mut report = RunReport::default();
        report.phases.push(PhaseReport::new(
            "textures",
            Duration::from_millis(5),
            PhaseStats {
                seen: 3,
                created: 2,
                conflicts: 1,
                writes: 3,
                ..PhaseStats::default()
            },
        ));
        report.phases.push(PhaseReport::new(
            "items",
            Duration::from_millis(2),
            PhaseStats {
                seen: 4,
                field_updates: 5,
                writes: 5,
                ..PhaseStats::default()
            },
        ));

        assert_eq!(report.total_writes(), 8);
        assert_eq!(report.total_conflicts(), 1);
    }

    #[test]
    fn display_includes_every_phase() {
        let mut report = RunReport::default();
        report.phases.push(PhaseReport::new(
            "weather",
            Duration::from_millis(1),
            PhaseStats::default(),
        ));
        let text = report.to_string();
        assert!(text.contains("weather"));
        assert!(text.contains("total writes: 0"));
    }
}
