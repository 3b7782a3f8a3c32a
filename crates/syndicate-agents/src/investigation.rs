//! Counter-intelligence sweep.
//!
//! A gang that keeps failing starts looking for informants. The sweep
//! works in three steps so the scoring never runs while the gang lock is
//! held:
//!
//! 1. [`snapshot`] copies member state (caller holds the lock).
//! 2. [`rank_suspects`] and [`interrogate`] work on the copy (lock released).
//! 3. [`apply`] writes verdicts back (caller holds the lock again).

use rand::Rng;
use syndicate_types::MemberId;
use tracing::debug;

use crate::chance::random_event;
use crate::config::GangRules;
use crate::error::InvestigationError;
use crate::gang::Gang;

/// Score a member must exceed to be treated as a suspect.
pub const SUSPECT_THRESHOLD: u32 = 30;

/// Number of top suspects interrogated per sweep.
pub const MAX_INTERROGATIONS: usize = 3;

/// Upper bound on the chance of unmasking an agent, in percent.
pub const MAX_DISCOVERY_CHANCE: u32 = 90;

/// Chance, in percent, that an innocent suspect is punished anyway.
pub const INNOCENT_PENALTY_CHANCE: u32 = 40;

/// Copy of one member's state taken at the start of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRecord {
    /// Position in the gang's member list.
    pub index: usize,
    /// Member identifier at snapshot time.
    pub member_id: MemberId,
    /// Rank at snapshot time.
    pub rank: u32,
    /// Preparation at snapshot time.
    pub preparation: u32,
    /// Knowledge at snapshot time.
    pub knowledge: u32,
    /// Whether the member really is an agent.
    pub is_agent: bool,
}

/// A member whose score crossed [`SUSPECT_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suspect {
    /// The member's snapshot.
    pub record: MemberRecord,
    /// Suspicion score.
    pub score: u32,
}

/// What happens to an interrogated suspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// An agent was unmasked. The member is executed and replaced.
    Execute {
        /// Position in the member list.
        index: usize,
        /// Member being executed.
        member_id: MemberId,
    },
    /// An innocent member is punished. Preparation drops to 75%.
    Penalize {
        /// Position in the member list.
        index: usize,
        /// Member being punished.
        member_id: MemberId,
    },
    /// The suspect walks free.
    Cleared {
        /// Member who was cleared.
        member_id: MemberId,
    },
}

/// Effect of applying a sweep's verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Agents executed and replaced.
    pub executed: u32,
    /// Innocent members punished.
    pub penalized: u32,
    /// Agents still hidden in the gang afterwards.
    pub agents_remaining: usize,
}

/// Copy every member's state into a fresh buffer.
///
/// Fails only if the buffer cannot be allocated, in which case the caller
/// skips this sweep.
pub fn snapshot(gang: &Gang) -> Result<Vec<MemberRecord>, InvestigationError> {
    let mut records = Vec::new();
    records
        .try_reserve_exact(gang.members.len())
        .map_err(|source| InvestigationError::Allocation {
            members: gang.members.len(),
            source,
        })?;
    records.extend(gang.members.iter().enumerate().map(|(index, m)| MemberRecord {
        index,
        member_id: m.id,
        rank: m.rank,
        preparation: m.preparation,
        knowledge: m.knowledge,
        is_agent: m.is_agent,
    }));
    Ok(records)
}

/// Suspicion score for one member.
///
/// - 20 if preparation is below half the required level
/// - `(num_ranks - rank) * 5`
/// - 25 if knowledge is above 80 and rank is below 2
pub fn suspicion_score(record: &MemberRecord, required_level: u32, num_ranks: u32) -> u32 {
    let mut score = 0_u32;
    if record.preparation < required_level.checked_div(2).unwrap_or(0) {
        score = score.saturating_add(20);
    }
    score = score.saturating_add(num_ranks.saturating_sub(record.rank).saturating_mul(5));
    if record.knowledge > 80 && record.rank < 2 {
        score = score.saturating_add(25);
    }
    score
}

/// Score every record and keep those above [`SUSPECT_THRESHOLD`],
/// highest score first. Ties keep member order.
pub fn rank_suspects(records: &[MemberRecord], required_level: u32, num_ranks: u32) -> Vec<Suspect> {
    let mut suspects: Vec<Suspect> = records
        .iter()
        .map(|record| Suspect {
            record: *record,
            score: suspicion_score(record, required_level, num_ranks),
        })
        .filter(|s| s.score > SUSPECT_THRESHOLD)
        .collect();
    suspects.sort_by(|a, b| b.score.cmp(&a.score));
    suspects
}

/// Chance, in percent, that interrogation unmasks an agent.
pub fn discovery_chance(rank: u32, score: u32) -> u32 {
    rank.saturating_mul(10)
        .saturating_add(20)
        .saturating_add(score.checked_div(5).unwrap_or(0))
        .min(MAX_DISCOVERY_CHANCE)
}

/// Interrogate the top suspects in score order.
pub fn interrogate<R: Rng + ?Sized>(suspects: &[Suspect], rng: &mut R) -> Vec<Verdict> {
    suspects
        .iter()
        .take(MAX_INTERROGATIONS)
        .map(|suspect| {
            let record = suspect.record;
            if record.is_agent {
                if random_event(rng, discovery_chance(record.rank, suspect.score)) {
                    return Verdict::Execute {
                        index: record.index,
                        member_id: record.member_id,
                    };
                }
            } else if random_event(rng, INNOCENT_PENALTY_CHANCE) {
                return Verdict::Penalize {
                    index: record.index,
                    member_id: record.member_id,
                };
            }
            Verdict::Cleared {
                member_id: record.member_id,
            }
        })
        .collect()
}

/// Write verdicts back into the live gang.
///
/// A verdict whose member has been replaced since the snapshot is skipped.
pub fn apply<R: Rng + ?Sized>(
    gang: &mut Gang,
    verdicts: &[Verdict],
    rules: &GangRules,
    rng: &mut R,
) -> SweepSummary {
    let mut summary = SweepSummary::default();
    for verdict in verdicts {
        match *verdict {
            Verdict::Execute { index, member_id } => {
                if gang.members.get(index).is_some_and(|m| m.id == member_id)
                    && gang.replace_member(index, rules, rng)
                {
                    debug!(gang_id = %gang.id, member_id = %member_id, "Informant executed");
                    gang.executed_agents = gang.executed_agents.saturating_add(1);
                    summary.executed = summary.executed.saturating_add(1);
                }
            }
            Verdict::Penalize { index, member_id } => {
                if let Some(member) = gang.members.get_mut(index).filter(|m| m.id == member_id) {
                    member.preparation = member.preparation.saturating_mul(3).checked_div(4).unwrap_or(0);
                    summary.penalized = summary.penalized.saturating_add(1);
                }
            }
            Verdict::Cleared { .. } => {}
        }
    }
    summary.agents_remaining = gang.agent_count();
    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use syndicate_types::GangId;

    use super::*;

    fn record(index: usize, rank: u32, preparation: u32, knowledge: u32, is_agent: bool) -> MemberRecord {
        MemberRecord {
            index,
            member_id: MemberId::new(u32::try_from(index).unwrap()),
            rank,
            preparation,
            knowledge,
            is_agent,
        }
    }

    #[test]
    fn score_components() {
        // Low preparation, rank 0 of 5, well informed: 20 + 25 + 25
        assert_eq!(suspicion_score(&record(0, 0, 10, 90, false), 80, 5), 70);
        // Prepared senior member: (5 - 4) * 5
        assert_eq!(suspicion_score(&record(1, 4, 80, 90, false), 80, 5), 5);
        // Rank 1, knowledge exactly 80 gets no knowledge bonus
        assert_eq!(suspicion_score(&record(2, 1, 80, 80, false), 80, 5), 20);
    }

    #[test]
    fn suspects_sorted_descending_and_filtered() {
        let records = [
            record(0, 4, 80, 0, false),  // 5
            record(1, 1, 10, 0, false),  // 20 + 20 = 40
            record(2, 0, 10, 90, false), // 20 + 25 + 25 = 70
            record(3, 2, 10, 0, false),  // 20 + 15 = 35
            record(4, 1, 10, 0, true),   // 40, ties with index 1
        ];
        let suspects = rank_suspects(&records, 80, 5);
        let order: Vec<usize> = suspects.iter().map(|s| s.record.index).collect();
        assert_eq!(order, vec![2, 1, 4, 3]);
    }

    #[test]
    fn discovery_chance_is_capped() {
        assert_eq!(discovery_chance(0, 35), 27);
        assert_eq!(discovery_chance(4, 70), 74);
        assert_eq!(discovery_chance(9, 100), MAX_DISCOVERY_CHANCE);
    }

    #[test]
    fn at_most_three_interrogations() {
        let records: Vec<MemberRecord> = (0..6).map(|i| record(i, 0, 0, 90, false)).collect();
        let suspects = rank_suspects(&records, 80, 5);
        assert_eq!(suspects.len(), 6);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(interrogate(&suspects, &mut rng).len(), MAX_INTERROGATIONS);
    }

    fn verdict_member(verdict: &Verdict) -> MemberId {
        match *verdict {
            Verdict::Execute { member_id, .. }
            | Verdict::Penalize { member_id, .. }
            | Verdict::Cleared { member_id } => member_id,
        }
    }

    #[test]
    fn interrogation_only_executes_agents_and_only_penalizes_innocents() {
        let records = [
            record(0, 0, 10, 90, true),  // 70, agent
            record(1, 0, 10, 90, false), // 70, innocent
            record(2, 1, 10, 0, true),   // 40, agent
        ];
        let suspects = rank_suspects(&records, 80, 5);
        let expected: Vec<MemberId> = suspects.iter().map(|s| s.record.member_id).collect();
        assert_eq!(expected, vec![MemberId::new(0), MemberId::new(1), MemberId::new(2)]);

        let mut rng = StdRng::seed_from_u64(21);
        let rounds = 2000;
        let mut top_agent_executed = 0_u32;
        let mut innocent_penalized = 0_u32;
        for _ in 0..rounds {
            let verdicts = interrogate(&suspects, &mut rng);
            let order: Vec<MemberId> = verdicts.iter().map(verdict_member).collect();
            assert_eq!(order, expected);
            for (verdict, suspect) in verdicts.iter().zip(&suspects) {
                match verdict {
                    Verdict::Execute { index, .. } => {
                        assert!(suspect.record.is_agent, "innocent executed");
                        if *index == 0 {
                            top_agent_executed += 1;
                        }
                    }
                    Verdict::Penalize { .. } => {
                        assert!(!suspect.record.is_agent, "agent penalized");
                        innocent_penalized += 1;
                    }
                    Verdict::Cleared { .. } => {}
                }
            }
        }

        // discovery_chance(0, 70) = 34%, innocent penalty = 40%.
        assert_eq!(discovery_chance(0, 70), 34);
        assert!((580..=780).contains(&top_agent_executed), "executed {top_agent_executed}");
        assert!((700..=900).contains(&innocent_penalized), "penalized {innocent_penalized}");
    }

    #[test]
    fn apply_executes_and_penalizes() {
        let rules = GangRules::default();
        let mut rng = StdRng::seed_from_u64(12);
        let mut gang = Gang::new(GangId::new(0), 3, &rules, &mut rng);
        gang.members[0].is_agent = true;
        gang.members[1].is_agent = false;
        gang.members[1].preparation = 80;
        gang.members[2].is_agent = false;
        let verdicts = [
            Verdict::Execute {
                index: 0,
                member_id: gang.members[0].id,
            },
            Verdict::Penalize {
                index: 1,
                member_id: gang.members[1].id,
            },
        ];
        let old_id = gang.members[0].id;
        let summary = apply(&mut gang, &verdicts, &rules, &mut rng);
        assert_eq!(summary.executed, 1);
        assert_eq!(summary.penalized, 1);
        assert_ne!(gang.members[0].id, old_id);
        assert_eq!(gang.members[1].preparation, 60);
        assert_eq!(gang.executed_agents, 1);
    }

    #[test]
    fn apply_skips_replaced_members() {
        let rules = GangRules::default();
        let mut rng = StdRng::seed_from_u64(12);
        let mut gang = Gang::new(GangId::new(0), 2, &rules, &mut rng);
        let stale = Verdict::Execute {
            index: 0,
            member_id: MemberId::new(99),
        };
        let summary = apply(&mut gang, &[stale], &rules, &mut rng);
        assert_eq!(summary.executed, 0);
    }

    #[test]
    fn snapshot_copies_every_member() {
        let rules = GangRules::default();
        let mut rng = StdRng::seed_from_u64(1);
        let gang = Gang::new(GangId::new(0), 6, &rules, &mut rng);
        let records = snapshot(&gang).unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[5].rank, 0);
    }
}
