//! Configuration loading for the Syndicate simulation.
//!
//! The configuration is a flat text file of `KEY=value` lines read with the
//! `config` crate's INI format. Lines starting with `#` are comments,
//! unknown keys are ignored, and every recognized key has a default so an
//! empty file is a valid configuration. See `config/simulation_config.txt`
//! for the full list.
//!
//! The file is deserialized into [`ConfigFile`], which mirrors the keys one
//! to one, and then projected into the rule structs the agents use.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use syndicate_agents::{GangRules, PoliceRules};

/// Largest number of gangs the shared arrest table can hold.
pub const MAX_GANG_CAPACITY: u32 = 100;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The file is not valid `KEY=value` text or a value has the wrong type.
    #[error("failed to parse config: {source}")]
    Parse {
        /// The underlying config crate error.
        #[from]
        source: ::config::ConfigError,
    },

    /// The values parsed but do not describe a runnable simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

/// Limits on the global counters that end the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationLimits {
    /// Stop once this many missions have succeeded.
    pub max_successful: u32,
    /// Stop once this many missions have been thwarted.
    pub max_thwarted: u32,
    /// Stop once this many agents have been executed.
    pub max_executed: u32,
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Fewest gangs to spawn.
    pub min_gangs: u32,
    /// Most gangs to spawn.
    pub max_gangs: u32,
    /// Fewest members per gang.
    pub min_members_per_gang: u32,
    /// Most members per gang.
    pub max_members_per_gang: u32,
    /// Gang and member behavior.
    pub gang: GangRules,
    /// Police behavior.
    pub police: PoliceRules,
    /// Counter limits that end the run.
    pub limits: TerminationLimits,
    /// Milliseconds between dashboard refreshes and termination checks.
    pub refresh_interval_ms: u64,
    /// Milliseconds between gang control-loop ticks.
    pub gang_tick_ms: u64,
    /// Milliseconds between member worker ticks.
    pub member_tick_ms: u64,
    /// Milliseconds between police mailbox polls.
    pub police_tick_ms: u64,
    /// Milliseconds between police background scans.
    pub police_scan_interval_ms: u64,
    /// Reports the mailbox holds before dropping new ones.
    pub mailbox_capacity: usize,
    /// Seed for reproducible runs. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_gangs: 3,
            max_gangs: 5,
            min_members_per_gang: 5,
            max_members_per_gang: 10,
            gang: GangRules::default(),
            police: PoliceRules::default(),
            limits: TerminationLimits {
                max_successful: 15,
                max_thwarted: 10,
                max_executed: 5,
            },
            refresh_interval_ms: 1000,
            gang_tick_ms: 1000,
            member_tick_ms: 500,
            police_tick_ms: 100,
            police_scan_interval_ms: 2000,
            mailbox_capacity: 256,
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// On-disk layout
// ---------------------------------------------------------------------------

/// The configuration file as written: one field per recognized key.
///
/// Field names are the lowercased keys; the uppercase spelling used in the
/// shipped file is accepted as an alias. Missing keys take the value from
/// [`SimulationConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// `MIN_GANGS`
    #[serde(alias = "MIN_GANGS")]
    pub min_gangs: u32,
    /// `MAX_GANGS`
    #[serde(alias = "MAX_GANGS")]
    pub max_gangs: u32,
    /// `MIN_MEMBERS_PER_GANG`
    #[serde(alias = "MIN_MEMBERS_PER_GANG")]
    pub min_members_per_gang: u32,
    /// `MAX_MEMBERS_PER_GANG`
    #[serde(alias = "MAX_MEMBERS_PER_GANG")]
    pub max_members_per_gang: u32,
    /// `GANG_RANKS`
    #[serde(alias = "GANG_RANKS")]
    pub gang_ranks: u32,
    /// `PREPARATION_TIME_MIN`
    #[serde(alias = "PREPARATION_TIME_MIN")]
    pub preparation_time_min: u32,
    /// `PREPARATION_TIME_MAX`
    #[serde(alias = "PREPARATION_TIME_MAX")]
    pub preparation_time_max: u32,
    /// `MIN_PREPARATION_LEVEL`
    #[serde(alias = "MIN_PREPARATION_LEVEL")]
    pub min_preparation_level: u32,
    /// `MAX_PREPARATION_LEVEL`
    #[serde(alias = "MAX_PREPARATION_LEVEL")]
    pub max_preparation_level: u32,
    /// `FALSE_INFO_PROBABILITY`
    #[serde(alias = "FALSE_INFO_PROBABILITY")]
    pub false_info_probability: u32,
    /// `AGENT_INFILTRATION_SUCCESS_RATE`
    #[serde(alias = "AGENT_INFILTRATION_SUCCESS_RATE")]
    pub agent_infiltration_success_rate: u32,
    /// `TRUTH_GAIN`
    #[serde(alias = "TRUTH_GAIN")]
    pub truth_gain: u32,
    /// `FALSE_PENALTY`
    #[serde(alias = "FALSE_PENALTY")]
    pub false_penalty: u32,
    /// `MISSION_SUCCESS_RATE_BASE`
    #[serde(alias = "MISSION_SUCCESS_RATE_BASE")]
    pub mission_success_rate_base: u32,
    /// `MEMBER_DEATH_PROBABILITY`
    #[serde(alias = "MEMBER_DEATH_PROBABILITY")]
    pub member_death_probability: u32,
    /// `AGENT_SUSPICION_THRESHOLD`
    #[serde(alias = "AGENT_SUSPICION_THRESHOLD")]
    pub agent_suspicion_threshold: u32,
    /// `POLICE_ACTION_THRESHOLD`
    #[serde(alias = "POLICE_ACTION_THRESHOLD")]
    pub police_action_threshold: u32,
    /// `PRISON_TIME_MIN`
    #[serde(alias = "PRISON_TIME_MIN")]
    pub prison_time_min: u32,
    /// `PRISON_TIME_MAX`
    #[serde(alias = "PRISON_TIME_MAX")]
    pub prison_time_max: u32,
    /// `MAX_SUCCESSFUL_PLANS`
    #[serde(alias = "MAX_SUCCESSFUL_PLANS")]
    pub max_successful_plans: u32,
    /// `MAX_THWARTED_PLANS`
    #[serde(alias = "MAX_THWARTED_PLANS")]
    pub max_thwarted_plans: u32,
    /// `MAX_EXECUTED_AGENTS`
    #[serde(alias = "MAX_EXECUTED_AGENTS")]
    pub max_executed_agents: u32,
    /// `VISUALIZATION_REFRESH_RATE`, in milliseconds.
    #[serde(alias = "VISUALIZATION_REFRESH_RATE")]
    pub visualization_refresh_rate: u64,
    /// `GANG_TICK_MS`
    #[serde(alias = "GANG_TICK_MS")]
    pub gang_tick_ms: u64,
    /// `MEMBER_TICK_MS`
    #[serde(alias = "MEMBER_TICK_MS")]
    pub member_tick_ms: u64,
    /// `POLICE_TICK_MS`
    #[serde(alias = "POLICE_TICK_MS")]
    pub police_tick_ms: u64,
    /// `POLICE_SCAN_INTERVAL_MS`
    #[serde(alias = "POLICE_SCAN_INTERVAL_MS")]
    pub police_scan_interval_ms: u64,
    /// `MAILBOX_CAPACITY`
    #[serde(alias = "MAILBOX_CAPACITY")]
    pub mailbox_capacity: usize,
    /// `SEED`
    #[serde(alias = "SEED")]
    pub seed: Option<u64>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for ConfigFile {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            min_gangs: config.min_gangs,
            max_gangs: config.max_gangs,
            min_members_per_gang: config.min_members_per_gang,
            max_members_per_gang: config.max_members_per_gang,
            gang_ranks: config.gang.num_ranks,
            preparation_time_min: config.gang.prep_time_min,
            preparation_time_max: config.gang.prep_time_max,
            min_preparation_level: config.gang.prep_level_min,
            max_preparation_level: config.gang.prep_level_max,
            false_info_probability: config.gang.false_info_probability,
            agent_infiltration_success_rate: config.gang.infiltration_rate,
            truth_gain: config.gang.truth_gain,
            false_penalty: config.gang.false_penalty,
            mission_success_rate_base: config.gang.success_rate_base,
            member_death_probability: config.gang.death_probability,
            agent_suspicion_threshold: config.police.suspicion_threshold,
            police_action_threshold: config.police.action_threshold,
            prison_time_min: config.police.prison_time_min,
            prison_time_max: config.police.prison_time_max,
            max_successful_plans: config.limits.max_successful,
            max_thwarted_plans: config.limits.max_thwarted,
            max_executed_agents: config.limits.max_executed,
            visualization_refresh_rate: config.refresh_interval_ms,
            gang_tick_ms: config.gang_tick_ms,
            member_tick_ms: config.member_tick_ms,
            police_tick_ms: config.police_tick_ms,
            police_scan_interval_ms: config.police_scan_interval_ms,
            mailbox_capacity: config.mailbox_capacity,
            seed: config.seed,
        }
    }
}

impl From<ConfigFile> for SimulationConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            min_gangs: file.min_gangs,
            max_gangs: file.max_gangs,
            min_members_per_gang: file.min_members_per_gang,
            max_members_per_gang: file.max_members_per_gang,
            gang: GangRules {
                num_ranks: file.gang_ranks,
                prep_time_min: file.preparation_time_min,
                prep_time_max: file.preparation_time_max,
                prep_level_min: file.min_preparation_level,
                prep_level_max: file.max_preparation_level,
                false_info_probability: file.false_info_probability,
                infiltration_rate: file.agent_infiltration_success_rate,
                truth_gain: file.truth_gain,
                false_penalty: file.false_penalty,
                success_rate_base: file.mission_success_rate_base,
                death_probability: file.member_death_probability,
            },
            police: PoliceRules {
                action_threshold: file.police_action_threshold,
                suspicion_threshold: file.agent_suspicion_threshold,
                prison_time_min: file.prison_time_min,
                prison_time_max: file.prison_time_max,
                ..PoliceRules::default()
            },
            limits: TerminationLimits {
                max_successful: file.max_successful_plans,
                max_thwarted: file.max_thwarted_plans,
                max_executed: file.max_executed_agents,
            },
            refresh_interval_ms: file.visualization_refresh_rate,
            gang_tick_ms: file.gang_tick_ms,
            member_tick_ms: file.member_tick_ms,
            police_tick_ms: file.police_tick_ms,
            police_scan_interval_ms: file.police_scan_interval_ms,
            mailbox_capacity: file.mailbox_capacity,
            seed: file.seed,
        }
    }
}

impl SimulationConfig {
    /// Load and validate configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if its content is malformed, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse `KEY=value` text on top of the defaults.
    ///
    /// Does not validate; call [`validate`](Self::validate) afterwards.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = ::config::Config::builder()
            .add_source(::config::File::from_str(contents, ::config::FileFormat::Ini))
            .build()?
            .try_deserialize()?;
        Ok(file.into())
    }

    /// Check that the values describe a runnable simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("MIN_GANGS", self.min_gangs, "MAX_GANGS", self.max_gangs),
            (
                "MIN_MEMBERS_PER_GANG",
                self.min_members_per_gang,
                "MAX_MEMBERS_PER_GANG",
                self.max_members_per_gang,
            ),
            (
                "PREPARATION_TIME_MIN",
                self.gang.prep_time_min,
                "PREPARATION_TIME_MAX",
                self.gang.prep_time_max,
            ),
            (
                "MIN_PREPARATION_LEVEL",
                self.gang.prep_level_min,
                "MAX_PREPARATION_LEVEL",
                self.gang.prep_level_max,
            ),
            (
                "PRISON_TIME_MIN",
                self.police.prison_time_min,
                "PRISON_TIME_MAX",
                self.police.prison_time_max,
            ),
        ];
        for (min_key, min, max_key, max) in ranges {
            if min > max {
                return Err(invalid(format!("{min_key} ({min}) exceeds {max_key} ({max})")));
            }
        }

        let percentages = [
            ("FALSE_INFO_PROBABILITY", self.gang.false_info_probability),
            ("AGENT_INFILTRATION_SUCCESS_RATE", self.gang.infiltration_rate),
            ("MISSION_SUCCESS_RATE_BASE", self.gang.success_rate_base),
            ("MEMBER_DEATH_PROBABILITY", self.gang.death_probability),
            ("AGENT_SUSPICION_THRESHOLD", self.police.suspicion_threshold),
            ("POLICE_ACTION_THRESHOLD", self.police.action_threshold),
        ];
        for (key, value) in percentages {
            if value > 100 {
                return Err(invalid(format!("{key} must be a percentage, got {value}")));
            }
        }

        if self.gang.num_ranks == 0 {
            return Err(invalid("GANG_RANKS must be at least 1".to_owned()));
        }
        if self.min_gangs == 0 || self.min_members_per_gang == 0 {
            return Err(invalid("every run needs at least one gang with one member".to_owned()));
        }
        if self.max_gangs > MAX_GANG_CAPACITY {
            return Err(invalid(format!(
                "MAX_GANGS ({}) exceeds arrest table capacity ({MAX_GANG_CAPACITY})",
                self.max_gangs
            )));
        }
        if self.gang.prep_level_min == 0 {
            return Err(invalid("MIN_PREPARATION_LEVEL must be at least 1".to_owned()));
        }
        if self.mailbox_capacity == 0 {
            return Err(invalid("MAILBOX_CAPACITY must be at least 1".to_owned()));
        }
        let intervals = [
            ("VISUALIZATION_REFRESH_RATE", self.refresh_interval_ms),
            ("GANG_TICK_MS", self.gang_tick_ms),
            ("MEMBER_TICK_MS", self.member_tick_ms),
            ("POLICE_TICK_MS", self.police_tick_ms),
            ("POLICE_SCAN_INTERVAL_MS", self.police_scan_interval_ms),
        ];
        for (key, value) in intervals {
            if value == 0 {
                return Err(invalid(format!("{key} must be greater than zero")));
            }
        }
        Ok(())
    }

    /// Dashboard refresh and termination-check interval.
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Gang control-loop tick interval.
    pub const fn gang_tick(&self) -> Duration {
        Duration::from_millis(self.gang_tick_ms)
    }

    /// Member worker tick interval.
    pub const fn member_tick(&self) -> Duration {
        Duration::from_millis(self.member_tick_ms)
    }

    /// Police mailbox poll interval.
    pub const fn police_tick(&self) -> Duration {
        Duration::from_millis(self.police_tick_ms)
    }

    /// Police background scan interval.
    pub const fn police_scan_interval(&self) -> Duration {
        Duration::from_millis(self.police_scan_interval_ms)
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}
