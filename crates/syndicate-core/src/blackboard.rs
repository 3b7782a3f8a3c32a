//! Shared simulation state: global counters and the arrest table.
//!
//! The blackboard is the only mutable state shared across gang boundaries.
//! Every read and write goes through one mutex. The police write arrests,
//! each gang polls and acknowledges its own entry, and everyone bumps the
//! counters.
//!
//! # Arrest handshake
//!
//! An arrest sets `arrested`, the sentence, and clears `notification_seen`.
//! The owning gang observes the entry exactly once: [`Blackboard::poll_arrest`]
//! returns the sentence and sets `notification_seen` back. Further polls
//! return nothing until a new arrest is written. Release clears `arrested`
//! without telling the police, unless a newer arrest is still unacknowledged.

use syndicate_types::{GangId, SimulationCounters, TerminationReason};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::TerminationLimits;

/// Errors raised by blackboard operations.
#[derive(Debug, thiserror::Error)]
pub enum BlackboardError {
    /// The gang id has no slot in the arrest table.
    #[error("gang {gang_id} is outside the arrest table (capacity {capacity})")]
    UnknownGang {
        /// The gang that was addressed.
        gang_id: GangId,
        /// Number of slots in the table.
        capacity: usize,
    },
}

/// One gang's slot in the arrest table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GangArrestEntry {
    /// Whether the gang is under arrest.
    pub arrested: bool,
    /// Sentence length written by the police.
    pub prison_time_remaining: u32,
    /// Whether the gang has already handled the current arrest.
    pub notification_seen: bool,
}

impl Default for GangArrestEntry {
    fn default() -> Self {
        Self {
            arrested: false,
            prison_time_remaining: 0,
            notification_seen: true,
        }
    }
}

#[derive(Debug)]
struct BoardState {
    counters: SimulationCounters,
    arrests: Vec<GangArrestEntry>,
}

/// Counters plus arrest table behind a single mutex.
#[derive(Debug)]
pub struct Blackboard {
    state: Mutex<BoardState>,
    capacity: usize,
}

impl Blackboard {
    /// Create a blackboard with room for `capacity` gangs.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(BoardState {
                counters: SimulationCounters::default(),
                arrests: vec![GangArrestEntry::default(); capacity],
            }),
            capacity,
        }
    }

    /// Number of slots in the arrest table.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    fn unknown(&self, gang_id: GangId) -> BlackboardError {
        BlackboardError::UnknownGang {
            gang_id,
            capacity: self.capacity,
        }
    }

    // -----------------------------------------------------------------------
    // Arrest table
    // -----------------------------------------------------------------------

    /// Write an arrest for `gang_id`.
    ///
    /// Re-arresting a gang that is already imprisoned is allowed and raises
    /// a fresh notification.
    pub async fn arrest(&self, gang_id: GangId, prison_time: u32) -> Result<(), BlackboardError> {
        let mut state = self.state.lock().await;
        let entry = gang_id
            .index()
            .and_then(|i| state.arrests.get_mut(i))
            .ok_or_else(|| self.unknown(gang_id))?;
        entry.arrested = true;
        entry.prison_time_remaining = prison_time;
        entry.notification_seen = false;
        debug!(gang_id = %gang_id, prison_time, "Arrest written to blackboard");
        Ok(())
    }

    /// Acknowledge a pending arrest for `gang_id`.
    ///
    /// Returns the sentence the first time a new arrest is observed and
    /// `None` on every other call.
    pub async fn poll_arrest(&self, gang_id: GangId) -> Result<Option<u32>, BlackboardError> {
        let mut state = self.state.lock().await;
        let entry = gang_id
            .index()
            .and_then(|i| state.arrests.get_mut(i))
            .ok_or_else(|| self.unknown(gang_id))?;
        if entry.arrested && !entry.notification_seen {
            entry.notification_seen = true;
            Ok(Some(entry.prison_time_remaining))
        } else {
            Ok(None)
        }
    }

    /// Clear the arrest flag once the gang has served its sentence.
    ///
    /// An arrest the gang has not acknowledged yet is left in place so the
    /// next poll still observes it. Returns whether the entry was cleared.
    pub async fn release(&self, gang_id: GangId) -> Result<bool, BlackboardError> {
        let mut state = self.state.lock().await;
        let entry = gang_id
            .index()
            .and_then(|i| state.arrests.get_mut(i))
            .ok_or_else(|| self.unknown(gang_id))?;
        if !entry.notification_seen {
            debug!(gang_id = %gang_id, "Release skipped, new arrest pending");
            return Ok(false);
        }
        entry.arrested = false;
        entry.prison_time_remaining = 0;
        debug!(gang_id = %gang_id, "Arrest cleared");
        Ok(true)
    }

    /// Copy of one gang's arrest entry.
    pub async fn arrest_entry(&self, gang_id: GangId) -> Result<GangArrestEntry, BlackboardError> {
        let state = self.state.lock().await;
        gang_id
            .index()
            .and_then(|i| state.arrests.get(i))
            .copied()
            .ok_or_else(|| self.unknown(gang_id))
    }

    // -----------------------------------------------------------------------
    // Counters
    // -----------------------------------------------------------------------

    /// Add `n` successful missions.
    pub async fn record_successful(&self, n: u32) {
        let mut state = self.state.lock().await;
        state.counters.successful = state.counters.successful.saturating_add(n);
    }

    /// Add `n` thwarted missions.
    pub async fn record_thwarted(&self, n: u32) {
        let mut state = self.state.lock().await;
        state.counters.thwarted = state.counters.thwarted.saturating_add(n);
    }

    /// Add `n` executed agents.
    pub async fn record_executed(&self, n: u32) {
        let mut state = self.state.lock().await;
        state.counters.executed = state.counters.executed.saturating_add(n);
    }

    /// Snapshot of the counters.
    pub async fn counters(&self) -> SimulationCounters {
        self.state.lock().await.counters
    }

    /// Check the counters against the termination limits.
    pub async fn termination(&self, limits: &TerminationLimits) -> Option<TerminationReason> {
        check_limits(&self.counters().await, limits)
    }
}

/// Which limit, if any, the counters have reached.
///
/// Checked in the order successful, thwarted, executed.
pub const fn check_limits(
    counters: &SimulationCounters,
    limits: &TerminationLimits,
) -> Option<TerminationReason> {
    if counters.successful >= limits.max_successful {
        Some(TerminationReason::MaxSuccessful)
    } else if counters.thwarted >= limits.max_thwarted {
        Some(TerminationReason::MaxThwarted)
    } else if counters.executed >= limits.max_executed {
        Some(TerminationReason::MaxExecuted)
    } else {
        None
    }
}
