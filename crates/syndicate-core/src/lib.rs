//! Coordination substrate for the Syndicate simulation.
//!
//! Gangs and police never call each other. Everything they share lives
//! here: the configuration they were started with, the blackboard of
//! counters and arrests, the lossy mailboxes, and the signals used to
//! pause and stop tasks.
//!
//! # Modules
//!
//! - [`config`](self::config) -- `KEY=value` configuration loading ([`SimulationConfig`])
//! - [`blackboard`] -- Global counters and the arrest handshake ([`Blackboard`])
//! - [`mailbox`] -- Report mailbox and per-gang progress channels
//! - [`control`] -- Stop flag and prison gate ([`StopSignal`], [`PrisonGate`])

pub mod blackboard;
pub mod config;
pub mod control;
pub mod mailbox;

pub use self::blackboard::{Blackboard, BlackboardError, GangArrestEntry};
pub use self::config::{ConfigError, ConfigFile, SimulationConfig, TerminationLimits};
pub use self::control::{PrisonGate, StopSignal};
pub use self::mailbox::{MailboxError, ReportInbox, ReportSender};
