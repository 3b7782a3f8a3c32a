//! Gang, member, investigation, and police logic for the Syndicate simulation.
//!
//! This crate holds every rule of the simulation and nothing else: no
//! tasks, no channels, no locks. Functions take plain state plus an
//! injected random number generator so the engine can drive them from
//! concurrent tasks and tests can drive them from a seeded one.
//!
//! # Modules
//!
//! - [`chance`] -- Percentage rolls shared by every rule
//! - [`config`] -- Tunable parameters ([`GangRules`], [`PoliceRules`])
//! - [`error`] -- Error types ([`InvestigationError`], [`PoliceError`])
//! - [`gang`] -- Gang state, lifecycle phases, mission planning and execution
//! - [`knowledge`] -- Member preparation and pairwise truth exchange
//! - [`investigation`] -- Counter-intelligence sweep run after repeated failures
//! - [`police`] -- Report buffer, suspicion aggregation, and arrest decisions

pub mod chance;
pub mod config;
pub mod error;
pub mod gang;
pub mod investigation;
pub mod knowledge;
pub mod police;

pub use config::{GangRules, PoliceRules};
pub use error::{InvestigationError, PoliceError};
pub use gang::{Gang, GangMember, GangPhase, MissionOutcome};
pub use police::{Assessment, PoliceState, ReportBuffer, ScanAction, ScanOutcome};
