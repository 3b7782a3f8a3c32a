//! Gang state and the mission lifecycle.
//!
//! A [`Gang`] is owned by exactly one control loop in the engine. Its
//! members are advanced by per-member workers (see [`crate::knowledge`])
//! that share the gang behind a private lock, so every field here is
//! mutated either by the control loop or by a member worker holding that
//! lock.
//!
//! # Lifecycle
//!
//! ```text
//! Planning -> Preparing -> Executing -> Planning
//!                                    -> Investigating -> Planning
//! ```
//!
//! [`GangPhase::Imprisoned`] can interrupt any of these. On release the
//! gang starts over at `Planning`.

use rand::Rng;
use rand::seq::IndexedRandom;
use syndicate_types::{CrimeType, GangId, GangSnapshot, MemberId};

use crate::chance::{between, random_event};
use crate::config::GangRules;

/// Upper bound on the mission success chance, in percent.
pub const MAX_SUCCESS_CHANCE: u32 = 95;

/// Upper bound on a member's knowledge score.
pub const MAX_KNOWLEDGE: u32 = 100;

/// Where a gang is in its mission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GangPhase {
    /// Choosing the next target.
    Planning,
    /// Members are raising their preparation.
    Preparing {
        /// Ticks spent preparing so far.
        elapsed: u32,
    },
    /// The mission is carried out on the next tick.
    Executing,
    /// The gang hunts for informants on the next tick.
    Investigating,
    /// Serving a prison sentence. Member workers are paused.
    Imprisoned {
        /// Ticks left to serve.
        remaining: u32,
    },
}

/// A single gang member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GangMember {
    /// Member identifier, unique within the gang.
    pub id: MemberId,
    /// Rank from `0` (lowest) to `num_ranks - 1`.
    pub rank: u32,
    /// Preparation level, never above the gang's required level.
    pub preparation: u32,
    /// Knowledge score, 0 to 100.
    pub knowledge: u32,
    /// Whether this member secretly works for the police.
    pub is_agent: bool,
}

/// Result of carrying out a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionOutcome {
    /// The crime went through.
    Success {
        /// Members who died and were replaced.
        deaths: u32,
    },
    /// The crime failed.
    Failure {
        /// Whether this failure triggers an internal investigation.
        investigate: bool,
    },
}

/// A gang and everything it knows about itself.
#[derive(Debug, Clone)]
pub struct Gang {
    /// Gang identifier.
    pub id: GangId,
    /// Members in a stable order. Replacement happens in place.
    pub members: Vec<GangMember>,
    /// Current mission target.
    pub target: CrimeType,
    /// Preparation level each member needs for the current mission.
    pub required_level: u32,
    /// Preparation ticks allowed before execution.
    pub prep_budget: u32,
    /// Current lifecycle phase.
    pub phase: GangPhase,
    /// Successful missions over the gang's lifetime.
    pub successes: u32,
    /// Failed missions over the gang's lifetime.
    pub thwarts: u32,
    /// Informants uncovered and executed over the gang's lifetime.
    pub executed_agents: u32,
    /// Missions planned over the gang's lifetime.
    pub missions_planned: u32,
    /// Serial used for the next member id.
    next_member_serial: u32,
}

impl Gang {
    /// Create a gang of `member_count` members in the `Planning` phase.
    ///
    /// Member `i` gets rank `i % num_ranks`; each member is independently
    /// a secret agent with the configured infiltration rate.
    pub fn new<R: Rng + ?Sized>(
        id: GangId,
        member_count: u32,
        rules: &GangRules,
        rng: &mut R,
    ) -> Self {
        let ranks = rules.num_ranks.max(1);
        let members = (0..member_count)
            .map(|i| GangMember {
                id: MemberId::new(i),
                rank: i.checked_rem(ranks).unwrap_or(0),
                preparation: 0,
                knowledge: 0,
                is_agent: random_event(rng, rules.infiltration_rate),
            })
            .collect();

        Self {
            id,
            members,
            target: CrimeType::BankRobbery,
            required_level: rules.prep_level_min,
            prep_budget: rules.prep_time_min,
            phase: GangPhase::Planning,
            successes: 0,
            thwarts: 0,
            executed_agents: 0,
            missions_planned: 0,
            next_member_serial: member_count,
        }
    }

    /// Whether the gang is serving a prison sentence.
    pub const fn in_prison(&self) -> bool {
        matches!(self.phase, GangPhase::Imprisoned { .. })
    }

    /// Prison ticks left, zero when free.
    pub const fn prison_time_remaining(&self) -> u32 {
        match self.phase {
            GangPhase::Imprisoned { remaining } => remaining,
            _ => 0,
        }
    }

    /// Number of members as a `u32`.
    pub fn member_count(&self) -> u32 {
        u32::try_from(self.members.len()).unwrap_or(u32::MAX)
    }

    /// Number of secret agents still inside the gang.
    pub fn agent_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_agent).count()
    }

    /// Average member preparation as a percentage of the required level.
    pub fn preparation_pct(&self) -> u32 {
        let total: u64 = self.members.iter().map(|m| u64::from(m.preparation)).sum();
        let denominator = u64::from(self.member_count()).saturating_mul(u64::from(self.required_level));
        total
            .saturating_mul(100)
            .checked_div(denominator)
            .and_then(|pct| u32::try_from(pct).ok())
            .unwrap_or(0)
    }

    /// Pick a new target and budget, reset preparation, and start preparing.
    pub fn plan_mission<R: Rng + ?Sized>(&mut self, rules: &GangRules, rng: &mut R) {
        if let Some(target) = CrimeType::ALL.choose(rng) {
            self.target = *target;
        }
        self.prep_budget = between(rng, rules.prep_time_min, rules.prep_time_max);
        self.required_level = between(rng, rules.prep_level_min, rules.prep_level_max);
        for member in &mut self.members {
            member.preparation = 0;
        }
        self.missions_planned = self.missions_planned.saturating_add(1);
        self.phase = GangPhase::Preparing { elapsed: 0 };
    }

    /// Count one preparation tick.
    ///
    /// Returns the elapsed tick count, or `None` if the gang was not
    /// preparing. Moves to `Executing` once the budget is spent.
    pub fn advance_preparation(&mut self) -> Option<u32> {
        let GangPhase::Preparing { elapsed } = self.phase else {
            return None;
        };
        let elapsed = elapsed.saturating_add(1);
        self.phase = if elapsed >= self.prep_budget {
            GangPhase::Executing
        } else {
            GangPhase::Preparing { elapsed }
        };
        Some(elapsed)
    }

    /// Chance of success for the current mission, in percent.
    ///
    /// `base + preparation_pct * budget / 100`, capped at
    /// [`MAX_SUCCESS_CHANCE`].
    pub fn success_chance(&self, rules: &GangRules) -> u32 {
        let bonus = self
            .preparation_pct()
            .saturating_mul(self.prep_budget)
            .checked_div(100)
            .unwrap_or(0);
        rules
            .success_rate_base
            .saturating_add(bonus)
            .min(MAX_SUCCESS_CHANCE)
    }

    /// Carry out the current mission.
    ///
    /// On success every member independently risks death and the dead are
    /// replaced. On failure every second cumulative failure schedules an
    /// investigation. The gang leaves `Executing` either way.
    pub fn execute_mission<R: Rng + ?Sized>(
        &mut self,
        rules: &GangRules,
        rng: &mut R,
    ) -> MissionOutcome {
        let chance = self.success_chance(rules);
        if random_event(rng, chance) {
            self.successes = self.successes.saturating_add(1);
            let mut deaths = 0_u32;
            for index in 0..self.members.len() {
                if random_event(rng, rules.death_probability) {
                    self.replace_member(index, rules, rng);
                    deaths = deaths.saturating_add(1);
                }
            }
            self.phase = GangPhase::Planning;
            MissionOutcome::Success { deaths }
        } else {
            self.thwarts = self.thwarts.saturating_add(1);
            let investigate = self.thwarts.checked_rem(2) == Some(0);
            self.phase = if investigate {
                GangPhase::Investigating
            } else {
                GangPhase::Planning
            };
            MissionOutcome::Failure { investigate }
        }
    }

    /// Replace the member at `index` with a fresh recruit.
    ///
    /// The recruit starts at rank 0 with no preparation or knowledge and a
    /// freshly rolled agent flag. Returns `false` if `index` is out of range.
    pub fn replace_member<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        rules: &GangRules,
        rng: &mut R,
    ) -> bool {
        let id = MemberId::new(self.next_member_serial);
        let Some(member) = self.members.get_mut(index) else {
            return false;
        };
        *member = GangMember {
            id,
            rank: 0,
            preparation: 0,
            knowledge: 0,
            is_agent: random_event(rng, rules.infiltration_rate),
        };
        self.next_member_serial = self.next_member_serial.saturating_add(1);
        true
    }

    /// Status line for the presentation layer.
    pub fn snapshot(&self, active: bool) -> GangSnapshot {
        GangSnapshot {
            id: self.id,
            in_prison: self.in_prison(),
            prison_time_remaining: self.prison_time_remaining(),
            preparation_pct: self.preparation_pct(),
            target: self.target,
            member_count: self.member_count(),
            mission: self.missions_planned,
            active,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rules() -> GangRules {
        GangRules::default()
    }

    #[test]
    fn new_assigns_ranks_round_robin() {
        let mut rng = StdRng::seed_from_u64(7);
        let gang = Gang::new(GangId::new(0), 7, &rules(), &mut rng);
        let ranks: Vec<u32> = gang.members.iter().map(|m| m.rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 0, 1]);
        assert_eq!(gang.phase, GangPhase::Planning);
    }

    #[test]
    fn plan_mission_draws_within_ranges_and_resets_preparation() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut gang = Gang::new(GangId::new(1), 5, &rules(), &mut rng);
        for member in &mut gang.members {
            member.preparation = 40;
        }
        gang.plan_mission(&rules(), &mut rng);
        assert!((5..=20).contains(&gang.prep_budget));
        assert!((70..=100).contains(&gang.required_level));
        assert!(gang.members.iter().all(|m| m.preparation == 0));
        assert_eq!(gang.phase, GangPhase::Preparing { elapsed: 0 });
    }

    #[test]
    fn each_plan_starts_a_new_mission_number() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut gang = Gang::new(GangId::new(1), 3, &rules(), &mut rng);
        assert_eq!(gang.snapshot(true).mission, 0);
        gang.plan_mission(&rules(), &mut rng);
        gang.plan_mission(&rules(), &mut rng);
        assert_eq!(gang.missions_planned, 2);
        assert_eq!(gang.snapshot(true).mission, 2);
    }

    #[test]
    fn preparation_moves_to_executing_when_budget_spent() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut gang = Gang::new(GangId::new(0), 3, &rules(), &mut rng);
        gang.plan_mission(&rules(), &mut rng);
        gang.prep_budget = 3;
        assert_eq!(gang.advance_preparation(), Some(1));
        assert_eq!(gang.advance_preparation(), Some(2));
        assert_eq!(gang.advance_preparation(), Some(3));
        assert_eq!(gang.phase, GangPhase::Executing);
        assert_eq!(gang.advance_preparation(), None);
    }

    #[test]
    fn preparation_pct_averages_over_required_level() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut gang = Gang::new(GangId::new(0), 2, &rules(), &mut rng);
        gang.required_level = 80;
        gang.members[0].preparation = 80;
        gang.members[1].preparation = 40;
        assert_eq!(gang.preparation_pct(), 75);
    }

    #[test]
    fn success_chance_is_capped() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut gang = Gang::new(GangId::new(0), 2, &rules(), &mut rng);
        gang.required_level = 70;
        gang.prep_budget = 20;
        for member in &mut gang.members {
            member.preparation = 70;
        }
        // 50 + 100 * 20 / 100 = 70
        assert_eq!(gang.success_chance(&rules()), 70);

        let generous = GangRules {
            success_rate_base: 90,
            ..rules()
        };
        assert_eq!(gang.success_chance(&generous), MAX_SUCCESS_CHANCE);
    }

    #[test]
    fn every_second_failure_triggers_investigation() {
        let mut rng = StdRng::seed_from_u64(9);
        let hopeless = GangRules {
            success_rate_base: 0,
            ..rules()
        };
        let mut gang = Gang::new(GangId::new(0), 4, &hopeless, &mut rng);
        gang.required_level = 70;

        let first = gang.execute_mission(&hopeless, &mut rng);
        assert_eq!(first, MissionOutcome::Failure { investigate: false });
        assert_eq!(gang.phase, GangPhase::Planning);

        let second = gang.execute_mission(&hopeless, &mut rng);
        assert_eq!(second, MissionOutcome::Failure { investigate: true });
        assert_eq!(gang.phase, GangPhase::Investigating);
        assert_eq!(gang.thwarts, 2);
    }

    #[test]
    fn certain_death_replaces_every_member() {
        let mut rng = StdRng::seed_from_u64(13);
        let deadly = GangRules {
            success_rate_base: 100,
            death_probability: 100,
            ..rules()
        };
        let mut gang = Gang::new(GangId::new(0), 4, &deadly, &mut rng);
        for member in &mut gang.members {
            member.rank = 3;
            member.knowledge = 90;
        }
        // Success is capped below certainty, so retry until one lands.
        let outcome = (0..200)
            .map(|_| gang.execute_mission(&deadly, &mut rng))
            .find(|o| matches!(o, MissionOutcome::Success { .. }))
            .unwrap();
        assert_eq!(outcome, MissionOutcome::Success { deaths: 4 });
        assert!(gang.members.iter().all(|m| m.rank == 0 && m.knowledge == 0));
        assert!(gang.members.iter().all(|m| m.id.into_inner() >= 4));
        assert_eq!(gang.successes, 1);
    }

    #[test]
    fn replace_out_of_range_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut gang = Gang::new(GangId::new(0), 2, &rules(), &mut rng);
        assert!(!gang.replace_member(5, &rules(), &mut rng));
    }
}
