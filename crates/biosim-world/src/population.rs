//! Island-wide population counters.
//!
//! The counters are only moved through the two hooks [`PopulationCounter::count`]
//! and [`PopulationCounter::remove`]: placing the initial population and
//! births count animals in, predation and death remove them. Migration moves
//! animals between cells and leaves the counters alone.

use biosim_types::{Species, SpeciesCounts};

use crate::error::WorldError;

/// Running totals of living animals per species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationCounter {
    /// Current totals.
    counts: SpeciesCounts,
}

impl PopulationCounter {
    /// Create a counter at zero.
    pub const fn new() -> Self {
        Self {
            counts: SpeciesCounts {
                herbivores: 0,
                carnivores: 0,
            },
        }
    }

    /// Count `n` new animals of `species`.
    pub fn count(&mut self, species: Species, n: usize) {
        self.counts.add(species, n);
    }

    /// Remove `n` animals of `species` from the count.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CounterUnderflow`] if fewer than `n` are
    /// counted; the counter is unchanged in that case.
    pub fn remove(&mut self, species: Species, n: usize) -> Result<(), WorldError> {
        let available = self.counts.get(species);
        let remaining = available
            .checked_sub(n)
            .ok_or(WorldError::CounterUnderflow {
                species,
                requested: n,
                available,
            })?;
        *self.counts.get_mut(species) = remaining;
        Ok(())
    }

    /// Current count for one species.
    pub const fn get(&self, species: Species) -> usize {
        self.counts.get(species)
    }

    /// Current counts for both species.
    pub const fn counts(&self) -> SpeciesCounts {
        self.counts
    }

    /// Sum over both species.
    pub const fn total(&self) -> usize {
        self.counts.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_and_remove() {
        let mut c = PopulationCounter::new();
        c.count(Species::Herbivore, 10);
        c.count(Species::Carnivore, 3);
        assert!(c.remove(Species::Herbivore, 4).is_ok());
        assert_eq!(c.get(Species::Herbivore), 6);
        assert_eq!(c.total(), 9);
    }

    #[test]
    fn underflow_is_rejected() {
        let mut c = PopulationCounter::new();
        c.count(Species::Carnivore, 2);
        let result = c.remove(Species::Carnivore, 3);
        assert!(matches!(
            result,
            Err(WorldError::CounterUnderflow {
                requested: 3,
                available: 2,
                ..
            })
        ));
        assert_eq!(c.get(Species::Carnivore), 2);
    }
}
