//! Engine for the Syndicate gang-versus-police simulation.
//!
//! Wires the agent logic from `syndicate-agents` to the coordination
//! substrate from `syndicate-core` as a set of Tokio tasks: one control
//! loop per gang, one worker per gang member, and one police task. A
//! supervisor renders the dashboard and stops everything once a
//! termination limit is hit or a signal arrives.
//!
//! # Modules
//!
//! - [`dashboard`] -- Read-only snapshots and the text renderer
//! - [`error`] -- Top-level error type ([`EngineError`])
//! - [`gang_agent`] -- Gang control loop and member workers
//! - [`police_agent`] -- Mailbox processing, scans, and arrests
//! - [`shutdown`] -- Signal handling
//! - [`spawner`] -- Gang creation and per-task generators
//! - [`supervisor`] -- Launch, monitoring, and shutdown ([`Simulation`])

pub mod dashboard;
pub mod error;
pub mod gang_agent;
pub mod police_agent;
pub mod shutdown;
pub mod spawner;
pub mod supervisor;

pub use error::EngineError;
pub use supervisor::{Simulation, SimulationResult, log_simulation_end};
