//! Member preparation and pairwise truth exchange.
//!
//! Every preparation tick a member raises its own preparation and then
//! hears from every other member of its gang. Whether a peer tells the
//! truth depends on the rank gap between them. Secret agents accumulate
//! knowledge from what they hear and report to the police once they know
//! enough.

use rand::Rng;
use syndicate_types::IntelligenceReport;

use crate::chance::random_event;
use crate::config::GangRules;
use crate::gang::{Gang, GangMember, GangPhase, MAX_KNOWLEDGE};

/// Knowledge a regular member gains from truthful information.
pub const MEMBER_TRUTH_GAIN: u32 = 5;

/// Knowledge a regular member loses to false information.
pub const MEMBER_FALSE_PENALTY: u32 = 3;

/// Chance, in percent, that `sender` tells `receiver` the truth.
///
/// Equal ranks always share the truth. Superiors are more honest with
/// subordinates than the other way round, and both drop with the rank
/// gap and the gang's misinformation weight:
///
/// - sender above receiver: `max(30, 90 - 10d - fip/10)`
/// - sender below receiver: `max(20, 70 - 15d - fip/10)`
pub fn truth_probability(sender_rank: u32, receiver_rank: u32, false_info_probability: u32) -> u32 {
    let distance = sender_rank.abs_diff(receiver_rank);
    if distance == 0 {
        return 100;
    }
    let misinformation = false_info_probability.checked_div(10).unwrap_or(0);
    if sender_rank > receiver_rank {
        90_u32
            .saturating_sub(distance.saturating_mul(10))
            .saturating_sub(misinformation)
            .max(30)
    } else {
        70_u32
            .saturating_sub(distance.saturating_mul(15))
            .saturating_sub(misinformation)
            .max(20)
    }
}

/// Decide whether one exchange between two ranks is truthful.
pub fn deliver_truth<R: Rng + ?Sized>(
    rng: &mut R,
    sender_rank: u32,
    receiver_rank: u32,
    false_info_probability: u32,
) -> bool {
    let probability = truth_probability(sender_rank, receiver_rank, false_info_probability);
    probability >= 100 || random_event(rng, probability)
}

/// Update a receiver's knowledge after one exchange.
pub fn absorb(member: &mut GangMember, truthful: bool, rules: &GangRules) {
    let (gain, penalty) = if member.is_agent {
        (rules.truth_gain, rules.false_penalty)
    } else {
        (MEMBER_TRUTH_GAIN, MEMBER_FALSE_PENALTY)
    };
    member.knowledge = if truthful {
        member.knowledge.saturating_add(gain).min(MAX_KNOWLEDGE)
    } else {
        member.knowledge.saturating_sub(penalty)
    };
}

/// Run one preparation tick for the member at `index`.
///
/// Does nothing unless the gang is preparing. Returns the report the
/// member wants to send, if it is a secret agent that has learned at
/// least half the required preparation level.
pub fn member_tick<R: Rng + ?Sized>(
    gang: &mut Gang,
    index: usize,
    rules: &GangRules,
    rng: &mut R,
) -> Option<IntelligenceReport> {
    if !matches!(gang.phase, GangPhase::Preparing { .. }) {
        return None;
    }

    let peer_ranks: Vec<u32> = gang
        .members
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, m)| m.rank)
        .collect();
    let required = gang.required_level;
    let gang_id = gang.id;
    let target = gang.target;

    let member = gang.members.get_mut(index)?;
    let step = member.rank.saturating_mul(2).saturating_add(5);
    member.preparation = member.preparation.saturating_add(step).min(required);

    for sender_rank in peer_ranks {
        let truthful = deliver_truth(rng, sender_rank, member.rank, rules.false_info_probability);
        absorb(member, truthful, rules);
    }

    let threshold = required.checked_div(2).unwrap_or(0);
    if member.is_agent && member.knowledge >= threshold {
        Some(IntelligenceReport {
            gang_id,
            agent_id: member.id,
            suspected_target: target,
            suspicion_level: member.knowledge,
            reliable: member.rank > rules.num_ranks.checked_div(2).unwrap_or(0),
        })
    } else {
        None
    }
}
