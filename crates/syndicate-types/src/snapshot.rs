//! Read-only views of simulation state.
//!
//! Snapshots are produced by the engine and consumed by the dashboard.
//! They may be stale by the time they are read; nothing in this module
//! refers back to live state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crime::CrimeType;
use crate::ids::GangId;

/// Global mission counters kept on the shared blackboard.
///
/// All three values only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationCounters {
    /// Missions that succeeded.
    pub successful: u32,
    /// Missions that failed or were stopped by police.
    pub thwarted: u32,
    /// Secret agents uncovered and executed by gangs.
    pub executed: u32,
}

/// Why the simulation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Successful missions reached the configured maximum.
    MaxSuccessful,
    /// Thwarted missions reached the configured maximum.
    MaxThwarted,
    /// Executed agents reached the configured maximum.
    MaxExecuted,
    /// The process received an interrupt or terminate signal.
    Signal,
}

impl core::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::MaxSuccessful => "too many successful missions",
            Self::MaxThwarted => "too many thwarted missions",
            Self::MaxExecuted => "too many executed agents",
            Self::Signal => "termination signal",
        };
        f.write_str(text)
    }
}

/// Per-gang status line for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GangSnapshot {
    /// Gang identifier.
    pub id: GangId,
    /// Whether the gang is currently serving prison time.
    pub in_prison: bool,
    /// Prison ticks left, zero when free.
    pub prison_time_remaining: u32,
    /// Average member preparation as a percentage of the required level.
    pub preparation_pct: u32,
    /// Crime currently targeted.
    pub target: CrimeType,
    /// Number of members.
    pub member_count: u32,
    /// Missions planned so far.
    pub mission: u32,
    /// Whether the gang's control loop is still running.
    pub active: bool,
}

/// Point-in-time view of the whole simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// One entry per gang, ordered by id.
    pub gangs: Vec<GangSnapshot>,
    /// Global counters at snapshot time.
    pub counters: SimulationCounters,
    /// When the snapshot was assembled.
    pub taken_at: DateTime<Utc>,
}

impl SimulationSnapshot {
    /// An empty snapshot with zeroed counters.
    pub fn empty() -> Self {
        Self {
            gangs: Vec::new(),
            counters: SimulationCounters::default(),
            taken_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = SimulationSnapshot {
            gangs: vec![GangSnapshot {
                id: GangId::new(0),
                in_prison: true,
                prison_time_remaining: 4,
                preparation_pct: 55,
                target: CrimeType::Kidnapping,
                member_count: 6,
                mission: 3,
                active: true,
            }],
            counters: SimulationCounters {
                successful: 1,
                thwarted: 2,
                executed: 0,
            },
            taken_at: Utc::now(),
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["gangs"][0]["target"], "Kidnapping");
        assert_eq!(value["counters"]["thwarted"], 2);
    }

    #[test]
    fn termination_reason_display() {
        assert_eq!(
            TerminationReason::MaxExecuted.to_string(),
            "too many executed agents"
        );
    }
}
