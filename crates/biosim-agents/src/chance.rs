//! Bernoulli draws against the shared simulation generator.
//!
//! Every stochastic decision in the model goes through [`roll`]. A
//! probability at or below 0 is a certain "no" and one at or above 1 a
//! certain "yes"; neither consumes randomness. Only probabilities strictly
//! inside `(0, 1)` draw from the generator, so the draw sequence depends
//! only on the model state and never on clamping details.

use rand::Rng;

/// Draw `true` with probability `p`.
///
/// `NaN` is treated as 0.
pub fn roll(rng: &mut impl Rng, p: f64) -> bool {
    if p.is_nan() || p <= 0.0 {
        return false;
    }
    if p >= 1.0 {
        return true;
    }
    rng.random_bool(p)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn certain_outcomes_do_not_draw() {
        let mut a = SmallRng::seed_from_u64(9);
        let mut b = SmallRng::seed_from_u64(9);
        assert!(!roll(&mut a, 0.0));
        assert!(!roll(&mut a, -3.0));
        assert!(!roll(&mut a, f64::NAN));
        assert!(roll(&mut a, 1.0));
        assert!(roll(&mut a, 7.5));
        // The generator state is untouched by certain outcomes.
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }

    #[test]
    fn fractional_probability_is_reproducible() {
        let mut a = SmallRng::seed_from_u64(1);
        let mut b = SmallRng::seed_from_u64(1);
        let xs: Vec<bool> = (0..64).map(|_| roll(&mut a, 0.3)).collect();
        let ys: Vec<bool> = (0..64).map(|_| roll(&mut b, 0.3)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().any(|x| *x));
        assert!(xs.iter().any(|x| !*x));
    }
}
