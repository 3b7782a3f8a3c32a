//! Gang creation and per-task random number generators.
//!
//! At startup the spawner draws how many gangs to run and how large each
//! one is, then builds the [`Gang`] values the agents will own. Every task
//! gets its own generator so no generator is shared across tasks.

use rand::SeedableRng;
use rand::rngs::StdRng;
use syndicate_agents::Gang;
use syndicate_agents::chance::between;
use syndicate_core::SimulationConfig;
use syndicate_types::GangId;
use tracing::info;

use crate::error::EngineError;

/// Stream offset reserved for the spawner's own generator.
pub const SPAWNER_STREAM: u64 = 0;

/// Stream offset reserved for the police task.
pub const POLICE_STREAM: u64 = 1;

/// Build a generator for one task.
///
/// With a configured seed each stream is reproducible; without one every
/// stream draws fresh OS entropy.
pub fn task_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))),
        None => StdRng::from_os_rng(),
    }
}

/// Stream offset for a gang's control loop.
pub fn gang_stream(gang: GangId) -> u64 {
    u64::from(gang.into_inner()).wrapping_mul(1024).wrapping_add(16)
}

/// Stream offset for one member worker of a gang.
pub fn member_stream(gang: GangId, index: usize) -> u64 {
    gang_stream(gang)
        .wrapping_add(1)
        .wrapping_add(u64::try_from(index).unwrap_or(0))
}

/// Create the initial gangs.
///
/// The gang count is drawn from `[min_gangs, max_gangs]` and each gang's
/// size from `[min_members_per_gang, max_members_per_gang]`.
pub fn spawn_gangs(config: &SimulationConfig, capacity: usize) -> Result<Vec<Gang>, EngineError> {
    let mut rng = task_rng(config.seed, SPAWNER_STREAM);
    let count = between(&mut rng, config.min_gangs, config.max_gangs);
    let requested = usize::try_from(count).unwrap_or(usize::MAX);
    if requested > capacity {
        return Err(EngineError::Capacity {
            requested,
            capacity,
        });
    }

    let gangs: Vec<Gang> = (0..count)
        .map(|raw| {
            let size = between(&mut rng, config.min_members_per_gang, config.max_members_per_gang);
            let gang = Gang::new(GangId::new(raw), size, &config.gang, &mut rng);
            info!(
                gang_id = raw,
                members = size,
                agents = gang.agent_count(),
                "Gang formed"
            );
            gang
        })
        .collect();

    Ok(gangs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn spawned_gangs_respect_ranges() {
        let config = SimulationConfig {
            seed: Some(99),
            ..SimulationConfig::default()
        };
        let gangs = spawn_gangs(&config, 100).unwrap();
        assert!((3..=5).contains(&gangs.len()));
        for (i, gang) in gangs.iter().enumerate() {
            assert_eq!(gang.id.index(), Some(i));
            assert!((5..=10).contains(&gang.members.len()));
        }
    }

    #[test]
    fn capacity_is_enforced() {
        let config = SimulationConfig {
            min_gangs: 4,
            max_gangs: 4,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            spawn_gangs(&config, 3),
            Err(EngineError::Capacity { requested: 4, capacity: 3 })
        ));
    }

    #[test]
    fn seeded_streams_are_reproducible_and_distinct() {
        let a: u64 = task_rng(Some(5), 3).random();
        let b: u64 = task_rng(Some(5), 3).random();
        let c: u64 = task_rng(Some(5), 4).random();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn member_streams_do_not_collide_with_gang_streams() {
        let gang = GangId::new(2);
        assert_ne!(member_stream(gang, 0), gang_stream(gang));
        assert_ne!(member_stream(gang, 0), member_stream(gang, 1));
    }
}
