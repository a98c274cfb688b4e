use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Seed == 0 means OS-seeded randomness; any other value is a reproducible
/// seed.
pub fn create_rng(seed: u64) -> SmallRng {
    if seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(seed)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seeded_rng_reproducible() {
        use rand::Rng;
        let mut a = create_rng(42);
        let mut b = create_rng(42);
        let xs: Vec<f64> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }
}
