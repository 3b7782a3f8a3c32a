//! Percentage rolls.

use rand::Rng;

/// Roll an event that happens `percent` times out of a hundred.
///
/// Values above 100 are treated as certain.
pub fn random_event<R: Rng + ?Sized>(rng: &mut R, percent: u32) -> bool {
    rng.random_range(0..100_u32) < percent
}

/// Draw uniformly from an inclusive range, tolerating `min > max` by
/// returning `min`.
pub fn between<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if min >= max {
        return min;
    }
    rng.random_range(min..=max)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn zero_and_hundred_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert!(!random_event(&mut rng, 0));
            assert!(random_event(&mut rng, 100));
        }
    }

    #[test]
    fn between_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let v = between(&mut rng, 5, 15);
            assert!((5..=15).contains(&v));
        }
        assert_eq!(between(&mut rng, 9, 3), 9);
    }
}
