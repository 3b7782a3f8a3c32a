//! Tunable parameters for gang and police behavior.
//!
//! The engine builds these from the simulation configuration file at
//! startup and hands each agent its own copy. Defaults match the values
//! shipped in `config/simulation_config.txt`.

/// Parameters that drive gang planning, member behavior, and missions.
///
/// Probabilities and rates are whole percentages (0--100).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GangRules {
    /// Number of ranks in every gang (default: 5).
    pub num_ranks: u32,

    /// Shortest preparation budget in ticks (default: 5).
    pub prep_time_min: u32,

    /// Longest preparation budget in ticks (default: 20).
    pub prep_time_max: u32,

    /// Lowest required preparation level for a mission (default: 70).
    pub prep_level_min: u32,

    /// Highest required preparation level for a mission (default: 100).
    pub prep_level_max: u32,

    /// Weight of deliberate misinformation in member exchanges (default: 30).
    pub false_info_probability: u32,

    /// Chance that a new member is a police agent (default: 60).
    pub infiltration_rate: u32,

    /// Knowledge a secret agent gains from truthful information (default: 10).
    pub truth_gain: u32,

    /// Knowledge a secret agent loses to false information (default: 5).
    pub false_penalty: u32,

    /// Base mission success chance before preparation bonus (default: 50).
    pub success_rate_base: u32,

    /// Chance that each member dies during a successful mission (default: 10).
    pub death_probability: u32,
}

impl Default for GangRules {
    fn default() -> Self {
        Self {
            num_ranks: 5,
            prep_time_min: 5,
            prep_time_max: 20,
            prep_level_min: 70,
            prep_level_max: 100,
            false_info_probability: 30,
            infiltration_rate: 60,
            truth_gain: 10,
            false_penalty: 5,
            success_rate_base: 50,
            death_probability: 10,
        }
    }
}

/// Parameters that drive police aggregation and arrests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoliceRules {
    /// Average suspicion needed to act on a gang with a reliable report (default: 80).
    pub action_threshold: u32,

    /// Suspicion above which a reliable report on a high-risk crime is escalated (default: 75).
    pub suspicion_threshold: u32,

    /// Shortest prison sentence in gang ticks (default: 5).
    pub prison_time_min: u32,

    /// Longest prison sentence in gang ticks (default: 15).
    pub prison_time_max: u32,

    /// Reports on one gang needed before a background scan evaluates it (default: 3).
    pub scan_min_reports: usize,

    /// Reports on one gang after which an inconclusive scan discards them (default: 5).
    pub stale_report_count: usize,

    /// Scan cycles between full buffer sweeps (default: 30).
    pub cleanup_every: u32,

    /// Buffer length above which a full sweep clears everything (default: 10).
    pub cleanup_min_reports: usize,
}

impl Default for PoliceRules {
    fn default() -> Self {
        Self {
            action_threshold: 80,
            suspicion_threshold: 75,
            prison_time_min: 5,
            prison_time_max: 15,
            scan_min_reports: 3,
            stale_report_count: 5,
            cleanup_every: 30,
            cleanup_min_reports: 10,
        }
    }
}
