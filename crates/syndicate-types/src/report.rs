//! Messages that cross agent boundaries.
//!
//! Both message types are ephemeral: they travel through lossy channels
//! and are consumed at most once.

use serde::{Deserialize, Serialize};

use crate::crime::CrimeType;
use crate::ids::{GangId, MemberId};

/// Intelligence sent by a secret agent inside a gang to the police.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelligenceReport {
    /// Gang the report is about.
    pub gang_id: GangId,
    /// The secret agent who sent it.
    pub agent_id: MemberId,
    /// Crime the agent believes the gang is preparing.
    pub suspected_target: CrimeType,
    /// Agent's confidence, 0 to 100.
    pub suspicion_level: u32,
    /// Whether the sender ranks above half of the gang's rank count.
    pub reliable: bool,
}

/// Preparation progress a gang publishes for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepProgress {
    /// Gang publishing the progress.
    pub gang_id: GangId,
    /// Average member preparation as a percentage of the required level.
    pub preparation_pct: u32,
    /// Crime being prepared.
    pub target: CrimeType,
    /// Number of members in the gang.
    pub member_count: u32,
    /// Missions planned so far, identifying the mission these figures belong to.
    pub mission: u32,
}
