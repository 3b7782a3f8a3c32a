//! Read-only presentation of simulation state.
//!
//! The dashboard never touches gang or police state directly. It reads
//! each gang's status feed and progress channel plus the blackboard
//! counters, assembles a [`SimulationSnapshot`], and stores it in a
//! [`SnapshotBoard`]. Updates are lossy: a snapshot is skipped rather than
//! waiting on a busy reader.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use syndicate_core::mailbox::ProgressReceiver;
use syndicate_types::{GangId, GangSnapshot, SimulationCounters, SimulationSnapshot};
use tokio::sync::{RwLock, watch};

/// Latest snapshot, shared with any number of readers.
#[derive(Debug, Clone)]
pub struct SnapshotBoard {
    inner: Arc<RwLock<SimulationSnapshot>>,
}

impl Default for SnapshotBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotBoard {
    /// Create a board holding an empty snapshot.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SimulationSnapshot::empty())),
        }
    }

    /// Replace the stored snapshot unless a reader holds it.
    ///
    /// Returns `false` when the update was skipped.
    pub fn publish(&self, snapshot: SimulationSnapshot) -> bool {
        match self.inner.try_write() {
            Ok(mut guard) => {
                *guard = snapshot;
                true
            }
            Err(_busy) => false,
        }
    }

    /// Copy of the stored snapshot.
    pub async fn latest(&self) -> SimulationSnapshot {
        self.inner.read().await.clone()
    }
}

/// Dashboard's view of one gang.
#[derive(Debug)]
pub struct GangFeed {
    /// Gang this feed belongs to.
    pub gang_id: GangId,
    /// Status published by the gang every tick.
    pub status: watch::Receiver<GangSnapshot>,
    /// Preparation progress published every second preparation tick.
    pub progress: ProgressReceiver,
}

impl GangFeed {
    /// Current view of the gang.
    ///
    /// The status feed is authoritative. A progress update only raises the
    /// preparation figure, and only when it belongs to the mission the
    /// status shows and the gang is free. Preparation never drops within a
    /// mission, so the higher figure is the fresher one.
    pub fn read(&mut self) -> GangSnapshot {
        let mut snapshot = *self.status.borrow_and_update();
        let progress = self
            .progress
            .latest()
            .filter(|p| p.mission == snapshot.mission && !snapshot.in_prison);
        if let Some(progress) = progress {
            snapshot.preparation_pct = snapshot.preparation_pct.max(progress.preparation_pct);
        }
        snapshot
    }
}

/// Build a snapshot from every gang feed and the current counters.
pub fn collect(feeds: &mut [GangFeed], counters: SimulationCounters) -> SimulationSnapshot {
    SimulationSnapshot {
        gangs: feeds.iter_mut().map(GangFeed::read).collect(),
        counters,
        taken_at: Utc::now(),
    }
}

/// Render a snapshot as a plain-text status table.
pub fn render_text(snapshot: &SimulationSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Syndicate status @ {} ===", snapshot.taken_at.format("%H:%M:%S"));
    for gang in &snapshot.gangs {
        let state = if !gang.active {
            String::from("stopped")
        } else if gang.in_prison {
            format!("in prison ({} left)", gang.prison_time_remaining)
        } else {
            format!("preparing {}%", gang.preparation_pct)
        };
        let _ = writeln!(
            out,
            "Gang {:>3} | {:<16} | {:>2} members | {}",
            gang.id.into_inner(),
            gang.target.label(),
            gang.member_count,
            state
        );
    }
    let counters = snapshot.counters;
    let _ = write!(
        out,
        "Successful: {} | Thwarted: {} | Executed agents: {}",
        counters.successful, counters.thwarted, counters.executed
    );
    out
}
