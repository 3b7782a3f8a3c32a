//! Shared type definitions for the Syndicate simulation.
//!
//! This crate is the common vocabulary between the agent logic, the
//! coordination substrate, and the engine binary. It contains no behavior
//! beyond small accessors and display helpers.
//!
//! # Modules
//!
//! - [`ids`] -- Integer identifier newtypes ([`GangId`], [`MemberId`])
//! - [`crime`] -- The fixed crime enumeration ([`CrimeType`])
//! - [`report`] -- Messages exchanged between agents ([`IntelligenceReport`], [`PrepProgress`])
//! - [`snapshot`] -- Read-only views for the presentation layer and termination checks

pub mod crime;
pub mod ids;
pub mod report;
pub mod snapshot;

pub use crime::CrimeType;
pub use ids::{GangId, MemberId};
pub use report::{IntelligenceReport, PrepProgress};
pub use snapshot::{GangSnapshot, SimulationCounters, SimulationSnapshot, TerminationReason};
