//! Island cells and the per-cell yearly phases.
//!
//! A [`Cell`] is either water (impassable, never holds animals) or a
//! [`LandCell`] that owns its fodder and two resident lists, one per
//! species. Residents are kept in arrival order; that order drives the
//! per-cell phases wherever the model does not shuffle explicitly.
//!
//! Each phase method here evaluates one cell only. Scheduling across cells
//! and keeping the island-level counters in step is the caller's job.

use std::collections::BTreeSet;

use biosim_agents::{Animal, ParameterSet, PreyCandidate, hunt};
use biosim_types::{AnimalId, AnimalIdSequence, Coord, Species, SpeciesCounts, Terrain};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One position on the island map.
#[derive(Debug, Clone)]
pub enum Cell {
    /// Open water. Never holds animals and is never a migration target.
    Water {
        /// Position on the map.
        coord: Coord,
    },
    /// Lowland, Highland, or Desert.
    Land(Box<LandCell>),
}

impl Cell {
    /// Position on the map.
    pub fn coord(&self) -> Coord {
        match self {
            Self::Water { coord } => *coord,
            Self::Land(land) => land.coord,
        }
    }

    /// Terrain of the cell.
    pub fn terrain(&self) -> Terrain {
        match self {
            Self::Water { .. } => Terrain::Water,
            Self::Land(land) => land.terrain,
        }
    }

    /// The land view, or `None` for water.
    pub fn as_land(&self) -> Option<&LandCell> {
        match self {
            Self::Water { .. } => None,
            Self::Land(land) => Some(land),
        }
    }

    /// Mutable land view, or `None` for water.
    pub fn as_land_mut(&mut self) -> Option<&mut LandCell> {
        match self {
            Self::Water { .. } => None,
            Self::Land(land) => Some(land),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase outcomes
// ---------------------------------------------------------------------------

/// What happened in one cell during the feeding phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedingOutcome {
    /// Fodder grazed by herbivores.
    pub fodder_eaten: f64,
    /// Prey weight eaten by carnivores, after each one's appetite cap.
    pub prey_eaten: f64,
    /// Herbivores killed by carnivores.
    pub kills: usize,
}

/// A planned move out of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// The mover.
    pub animal: AnimalId,
    /// Its species list.
    pub species: Species,
    /// The destination land cell.
    pub to: Coord,
}

// ---------------------------------------------------------------------------
// LandCell
// ---------------------------------------------------------------------------

/// A habitable cell: fodder plus the herbivores and carnivores living in it.
#[derive(Debug, Clone)]
pub struct LandCell {
    /// Position on the map.
    coord: Coord,
    /// Lowland, Highland, or Desert.
    terrain: Terrain,
    /// Fodder currently available.
    fodder: f64,
    /// Herbivore residents in arrival order.
    herbivores: Vec<Animal>,
    /// Carnivore residents in arrival order.
    carnivores: Vec<Animal>,
    /// Land neighbours in north, south, west, east order.
    neighbors: Vec<Coord>,
}

impl LandCell {
    /// Create an empty land cell holding `fodder`.
    pub const fn new(coord: Coord, terrain: Terrain, fodder: f64, neighbors: Vec<Coord>) -> Self {
        Self {
            coord,
            terrain,
            fodder,
            herbivores: Vec::new(),
            carnivores: Vec::new(),
            neighbors,
        }
    }

    /// Position on the map.
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// Terrain of the cell.
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Fodder currently available.
    pub const fn fodder(&self) -> f64 {
        self.fodder
    }

    /// Land neighbours in north, south, west, east order.
    pub fn neighbors(&self) -> &[Coord] {
        &self.neighbors
    }

    /// Residents of one species, in arrival order.
    pub fn residents(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    const fn residents_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    /// All residents, herbivores first.
    pub fn animals(&self) -> impl Iterator<Item = &Animal> {
        self.herbivores.iter().chain(self.carnivores.iter())
    }

    /// Number of residents of one species.
    pub fn count(&self, species: Species) -> usize {
        self.residents(species).len()
    }

    /// Resident counts for both species.
    pub fn counts(&self) -> SpeciesCounts {
        SpeciesCounts {
            herbivores: self.herbivores.len(),
            carnivores: self.carnivores.len(),
        }
    }

    // -------------------------------------------------------------------
    // Membership
    // -------------------------------------------------------------------

    /// Append animals to the resident list matching each one's species.
    pub fn add_animals(&mut self, animals: impl IntoIterator<Item = Animal>) {
        for animal in animals {
            self.residents_mut(animal.species()).push(animal);
        }
    }

    /// Remove the listed animals of one species and return them in
    /// residence order.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AnimalNotInCell`] if any id is not a resident;
    /// the cell is unchanged in that case.
    pub fn remove_animals(
        &mut self,
        species: Species,
        ids: &[AnimalId],
    ) -> Result<Vec<Animal>, WorldError> {
        let wanted: BTreeSet<AnimalId> = ids.iter().copied().collect();
        let present: BTreeSet<AnimalId> = self.residents(species).iter().map(Animal::id).collect();
        if let Some(missing) = wanted.difference(&present).next() {
            return Err(WorldError::AnimalNotInCell {
                animal: *missing,
                species,
                coord: self.coord,
            });
        }

        let (removed, kept): (Vec<Animal>, Vec<Animal>) = self
            .residents_mut(species)
            .drain(..)
            .partition(|a| wanted.contains(&a.id()));
        *self.residents_mut(species) = kept;
        Ok(removed)
    }

    // -------------------------------------------------------------------
    // Feeding
    // -------------------------------------------------------------------

    /// Herbivores as prey candidates, weakest first.
    ///
    /// The sort is stable, so equally fit herbivores keep residence order.
    pub fn sorted_prey_ascending_fitness(&self, params: &ParameterSet) -> Vec<PreyCandidate> {
        let herb = params.for_species(Species::Herbivore);
        let mut prey: Vec<PreyCandidate> = self
            .herbivores
            .iter()
            .map(|a| PreyCandidate {
                id: a.id(),
                fitness: a.fitness(herb),
                weight: a.weight(),
            })
            .collect();
        prey.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        prey
    }

    /// Run the feeding phase for this cell.
    ///
    /// 1. Fodder is reset to `f_max`
    /// 2. Herbivores are shuffled and graze in that order until the fodder
    ///    runs out
    /// 3. Carnivores hunt in residence order over the herbivores, sorted
    ///    once by ascending fitness; each kill is removed from the
    ///    candidate list before the next carnivore hunts
    /// 4. Killed herbivores leave the cell
    ///
    /// # Errors
    ///
    /// Propagates [`WorldError::AnimalNotInCell`] if a kill cannot be
    /// removed, which indicates a bookkeeping bug.
    pub fn feed(
        &mut self,
        params: &ParameterSet,
        f_max: f64,
        rng: &mut impl Rng,
    ) -> Result<FeedingOutcome, WorldError> {
        self.fodder = f_max;
        let start = self.fodder;

        let herb = params.for_species(Species::Herbivore);
        self.herbivores.shuffle(rng);
        for animal in &mut self.herbivores {
            if self.fodder <= 0.0 {
                break;
            }
            let eaten = animal.graze(herb, self.fodder);
            self.fodder = (self.fodder - eaten).max(0.0);
        }

        let mut killed = Vec::new();
        let mut prey_eaten = 0.0;
        if !self.carnivores.is_empty() && !self.herbivores.is_empty() {
            let carn = params.for_species(Species::Carnivore);
            let mut remaining = self.sorted_prey_ascending_fitness(params);
            for predator in &mut self.carnivores {
                if remaining.is_empty() {
                    break;
                }
                let outcome = hunt(predator, carn, &remaining, rng);
                prey_eaten += outcome.consumed;
                if !outcome.killed.is_empty() {
                    let dead: BTreeSet<AnimalId> = outcome.killed.iter().copied().collect();
                    remaining.retain(|c| !dead.contains(&c.id));
                    killed.extend(outcome.killed);
                }
            }
        }

        let kills = killed.len();
        if kills > 0 {
            self.remove_animals(Species::Herbivore, &killed)?;
        }

        Ok(FeedingOutcome {
            fodder_eaten: start - self.fodder,
            prey_eaten,
            kills,
        })
    }

    // -------------------------------------------------------------------
    // Procreation
    // -------------------------------------------------------------------

    /// Run the procreation phase for this cell.
    ///
    /// Herbivores are evaluated before carnivores, each in residence order.
    /// Every mother sees the headcount of her species at phase entry, and
    /// newborns join the cell only after all mothers have been evaluated.
    /// Returns the number of births per species.
    ///
    /// # Errors
    ///
    /// Propagates [`WorldError::Agent`] if a birth-weight distribution
    /// cannot be built.
    pub fn procreate(
        &mut self,
        params: &ParameterSet,
        ids: &mut AnimalIdSequence,
        rng: &mut impl Rng,
    ) -> Result<SpeciesCounts, WorldError> {
        let headcount = self.counts();
        let mut births = SpeciesCounts::default();
        let mut newborns = Vec::new();

        for species in Species::ALL {
            let n_same = headcount.get(species);
            if n_same == 0 {
                continue;
            }
            let p = params.for_species(species);
            for mother in self.residents_mut(species).iter_mut() {
                if let Some(weight) = mother.give_birth(p, n_same, rng)? {
                    newborns.push(Animal::newborn(ids.next_id(), species, weight));
                    births.add(species, 1);
                }
            }
        }

        self.add_animals(newborns);
        Ok(births)
    }

    // -------------------------------------------------------------------
    // Migration
    // -------------------------------------------------------------------

    /// Decide which residents leave this year and where they go.
    ///
    /// Herbivores are evaluated before carnivores. Residents that already
    /// moved this year are skipped. Every evaluated animal draws its wish to
    /// migrate, then a uniform destination among the land neighbours, and is
    /// marked as moved whether or not it goes anywhere. Nobody leaves the
    /// cell here; the caller applies the returned moves.
    pub fn plan_migration(&mut self, params: &ParameterSet, rng: &mut impl Rng) -> Vec<Migration> {
        let mut moves = Vec::new();
        for species in Species::ALL {
            let p = params.for_species(species);
            let (animals, neighbors) = match species {
                Species::Herbivore => (&mut self.herbivores, &self.neighbors),
                Species::Carnivore => (&mut self.carnivores, &self.neighbors),
            };
            for animal in animals.iter_mut() {
                if animal.has_moved() {
                    continue;
                }
                if animal.wants_to_migrate(p, rng)
                    && let Some(to) = neighbors.choose(rng)
                {
                    moves.push(Migration {
                        animal: animal.id(),
                        species,
                        to: *to,
                    });
                }
                animal.mark_moved();
            }
        }
        moves
    }

    /// Clear the moved flag on every resident.
    pub fn reset_moved_flags(&mut self) {
        for animal in self.herbivores.iter_mut().chain(self.carnivores.iter_mut()) {
            animal.reset_moved();
        }
    }

    // -------------------------------------------------------------------
    // Aging, weight loss, death
    // -------------------------------------------------------------------

    /// Every resident ages by one year.
    ///
    /// # Errors
    ///
    /// Propagates [`WorldError::Agent`] on age overflow.
    pub fn age_residents(&mut self) -> Result<(), WorldError> {
        for animal in self.herbivores.iter_mut().chain(self.carnivores.iter_mut()) {
            animal.age_one_year()?;
        }
        Ok(())
    }

    /// Every resident loses `eta * weight`.
    pub fn lose_weight(&mut self, params: &ParameterSet) {
        for species in Species::ALL {
            let p = params.for_species(species);
            for animal in self.residents_mut(species).iter_mut() {
                animal.lose_weight(p);
            }
        }
    }

    /// Run the death phase: draw each resident's fate, herbivores first,
    /// then remove the dead. Returns deaths per species.
    ///
    /// # Errors
    ///
    /// Propagates [`WorldError::AnimalNotInCell`] if a dead animal cannot
    /// be removed.
    pub fn cull(
        &mut self,
        params: &ParameterSet,
        rng: &mut impl Rng,
    ) -> Result<SpeciesCounts, WorldError> {
        let mut deaths = SpeciesCounts::default();
        for species in Species::ALL {
            let p = params.for_species(species);
            let dead: Vec<AnimalId> = self
                .residents(species)
                .iter()
                .filter(|a| a.dies(p, rng))
                .map(Animal::id)
                .collect();
            if !dead.is_empty() {
                self.remove_animals(species, &dead)?;
                deaths.add(species, dead.len());
            }
        }
        Ok(deaths)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn land(neighbors: Vec<Coord>) -> LandCell {
        LandCell::new(Coord::new(2, 2), Terrain::Lowland, 0.0, neighbors)
    }

    fn populate(cell: &mut LandCell, species: Species, n: u64, age: u32, weight: f64) {
        let base = match species {
            Species::Herbivore => 0,
            Species::Carnivore => 1000,
        };
        cell.add_animals((0..n).map(|i| Animal::new(AnimalId(base + i), species, age, weight)));
    }

    fn params_with(species: Species, pairs: &[(&str, f64)]) -> ParameterSet {
        let mut params = ParameterSet::default();
        let overrides: BTreeMap<String, f64> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect();
        params.update(species, &overrides).unwrap();
        params
    }

    #[test]
    fn add_sorts_by_species() {
        let mut cell = land(Vec::new());
        populate(&mut cell, Species::Herbivore, 3, 5, 20.0);
        populate(&mut cell, Species::Carnivore, 2, 5, 20.0);
        assert_eq!(cell.count(Species::Herbivore), 3);
        assert_eq!(cell.count(Species::Carnivore), 2);
        assert_eq!(cell.animals().count(), 5);
    }

    #[test]
    fn remove_unknown_id_leaves_cell_unchanged() {
        let mut cell = land(Vec::new());
        populate(&mut cell, Species::Herbivore, 3, 5, 20.0);
        let result = cell.remove_animals(Species::Herbivore, &[AnimalId(1), AnimalId(77)]);
        assert!(matches!(result, Err(WorldError::AnimalNotInCell { .. })));
        assert_eq!(cell.count(Species::Herbivore), 3);
    }

    #[test]
    fn remove_keeps_residence_order() {
        let mut cell = land(Vec::new());
        populate(&mut cell, Species::Herbivore, 4, 5, 20.0);
        let removed = cell
            .remove_animals(Species::Herbivore, &[AnimalId(2), AnimalId(0)])
            .unwrap();
        let removed_ids: Vec<AnimalId> = removed.iter().map(Animal::id).collect();
        assert_eq!(removed_ids, vec![AnimalId(0), AnimalId(2)]);
        let kept: Vec<AnimalId> = cell.residents(Species::Herbivore).iter().map(Animal::id).collect();
        assert_eq!(kept, vec![AnimalId(1), AnimalId(3)]);
    }

    #[test]
    fn prey_sorted_weakest_first() {
        let mut cell = land(Vec::new());
        cell.add_animals([
            Animal::new(AnimalId(1), Species::Herbivore, 5, 40.0),
            Animal::new(AnimalId(2), Species::Herbivore, 5, 2.0),
            Animal::new(AnimalId(3), Species::Herbivore, 5, 15.0),
        ]);
        let prey = cell.sorted_prey_ascending_fitness(&ParameterSet::default());
        let ids: Vec<AnimalId> = prey.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![AnimalId(2), AnimalId(3), AnimalId(1)]);
    }

    #[test]
    fn equally_fit_prey_keep_residence_order() {
        let mut cell = land(Vec::new());
        // Ids deliberately out of order so residence order differs from id order.
        cell.add_animals([
            Animal::new(AnimalId(5), Species::Herbivore, 5, 30.0),
            Animal::new(AnimalId(30), Species::Herbivore, 90, 2.0),
            Animal::new(AnimalId(1), Species::Herbivore, 95, 1.0),
            Animal::new(AnimalId(20), Species::Herbivore, 90, 2.0),
            Animal::new(AnimalId(10), Species::Herbivore, 90, 2.0),
        ]);
        let prey = cell.sorted_prey_ascending_fitness(&ParameterSet::default());
        let ids: Vec<AnimalId> = prey.iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec![AnimalId(1), AnimalId(30), AnimalId(20), AnimalId(10), AnimalId(5)]
        );
    }

    #[test]
    fn certain_kill_takes_first_resident_among_equals() {
        let mut cell = land(Vec::new());
        cell.add_animals([
            Animal::new(AnimalId(30), Species::Herbivore, 90, 2.0),
            Animal::new(AnimalId(20), Species::Herbivore, 90, 2.0),
            Animal::new(AnimalId(10), Species::Herbivore, 90, 2.0),
        ]);
        // Appetite of 2 is met by a single kill.
        let params = params_with(Species::Carnivore, &[("DeltaPhiMax", 0.1), ("F", 2.0)]);
        let prey = cell.sorted_prey_ascending_fitness(&params);
        let mut hunter = Animal::new(AnimalId(100), Species::Carnivore, 5, 60.0);
        let mut rng = SmallRng::seed_from_u64(8);
        let outcome = hunt(
            &mut hunter,
            params.for_species(Species::Carnivore),
            &prey,
            &mut rng,
        );
        assert_eq!(outcome.killed, vec![AnimalId(30)]);
    }

    #[test]
    fn grazing_stops_when_fodder_runs_out() {
        let mut cell = land(Vec::new());
        populate(&mut cell, Species::Herbivore, 3, 5, 20.0);
        let params = ParameterSet::default();
        let mut rng = SmallRng::seed_from_u64(3);
        // Each herbivore takes beta * F = 9; 25 units feed two fully and one partially.
        let outcome = cell.feed(&params, 25.0, &mut rng).unwrap();
        assert!((outcome.fodder_eaten - 25.0).abs() < 1e-9);
        assert!(cell.fodder().abs() < 1e-9);
        let total: f64 = cell.residents(Species::Herbivore).iter().map(Animal::weight).sum();
        assert!((total - (60.0 + 25.0)).abs() < 1e-9);
    }

    #[test]
    fn fodder_stays_within_bounds() {
        let mut cell = land(Vec::new());
        populate(&mut cell, Species::Herbivore, 2, 5, 20.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = cell.feed(&ParameterSet::default(), 800.0, &mut rng).unwrap();
        assert!((outcome.fodder_eaten - 18.0).abs() < 1e-9);
        assert!((cell.fodder() - 782.0).abs() < 1e-9);
        assert!(cell.fodder() >= 0.0 && cell.fodder() <= 800.0);
    }

    #[test]
    fn certain_kills_remove_prey() {
        let mut cell = land(Vec::new());
        // Weak herbivores: old and light, fitness near 0.
        cell.add_animals((0..3).map(|i| Animal::new(AnimalId(i), Species::Herbivore, 90, 1.0)));
        cell.add_animals([Animal::new(AnimalId(100), Species::Carnivore, 5, 60.0)]);
        let params = params_with(Species::Carnivore, &[("DeltaPhiMax", 0.1)]);
        let mut rng = SmallRng::seed_from_u64(5);
        let outcome = cell.feed(&params, 0.0, &mut rng).unwrap();
        assert_eq!(outcome.kills, 3);
        assert!((outcome.prey_eaten - 3.0).abs() < 1e-9);
        assert!(outcome.fodder_eaten.abs() < 1e-9);
        assert_eq!(cell.count(Species::Herbivore), 0);
        let carn = cell.residents(Species::Carnivore).first().map_or(0.0, Animal::weight);
        assert!((carn - (60.0 + 0.75 * 3.0)).abs() < 1e-9);
    }

    #[test]
    fn procreation_uses_entry_headcount() {
        let mut cell = land(Vec::new());
        populate(&mut cell, Species::Herbivore, 4, 5, 50.0);
        let params = params_with(Species::Herbivore, &[("gamma", 1.0), ("sigma_birth", 0.0)]);
        let mut ids = AnimalIdSequence::new();
        for _ in 0..4 {
            let _ = ids.next_id();
        }
        let mut rng = SmallRng::seed_from_u64(11);
        let births = cell
            .procreate(&params, &mut ids, &mut rng)
            .unwrap();
        // Every mother gives birth once; newborns do not procreate this year.
        assert_eq!(births.herbivores, 4);
        assert_eq!(cell.count(Species::Herbivore), 8);
        let newborns: Vec<&Animal> = cell
            .residents(Species::Herbivore)
            .iter()
            .filter(|a| a.age() == 0)
            .collect();
        assert_eq!(newborns.len(), 4);
        for mother in cell.residents(Species::Herbivore).iter().filter(|a| a.age() == 5) {
            assert!((mother.weight() - (50.0 - 1.2 * 8.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn lone_animal_cannot_migrate_without_land_neighbours() {
        let mut cell = land(Vec::new());
        populate(&mut cell, Species::Herbivore, 5, 5, 50.0);
        let params = params_with(Species::Herbivore, &[("mu", 1.0)]);
        let mut rng = SmallRng::seed_from_u64(2);
        let moves = cell.plan_migration(&params, &mut rng);
        assert!(moves.is_empty());
        assert!(cell.residents(Species::Herbivore).iter().all(Animal::has_moved));
    }

    #[test]
    fn planned_moves_target_neighbours_and_skip_movers() {
        let east = Coord::new(2, 3);
        let mut cell = land(vec![east]);
        populate(&mut cell, Species::Carnivore, 5, 5, 50.0);
        // A huge a_half keeps fitness, and so the migration chance, at almost 1.
        let params = params_with(Species::Carnivore, &[("mu", 1.0), ("a_half", 1000.0)]);
        let mut rng = SmallRng::seed_from_u64(2);
        let moves = cell.plan_migration(&params, &mut rng);
        assert_eq!(moves.len(), 5);
        assert!(moves.iter().all(|m| m.to == east && m.species == Species::Carnivore));
        // Everybody is already flagged; a second pass plans nothing.
        assert!(cell.plan_migration(&params, &mut rng).is_empty());
        cell.reset_moved_flags();
        assert_eq!(cell.plan_migration(&params, &mut rng).len(), 5);
    }

    #[test]
    fn zero_weight_residents_die() {
        let mut cell = land(Vec::new());
        populate(&mut cell, Species::Herbivore, 3, 5, 0.0);
        populate(&mut cell, Species::Carnivore, 2, 5, 0.0);
        let mut rng = SmallRng::seed_from_u64(4);
        let deaths = cell
            .cull(&ParameterSet::default(), &mut rng)
            .unwrap();
        assert_eq!(deaths, SpeciesCounts { herbivores: 3, carnivores: 2 });
        assert_eq!(cell.animals().count(), 0);
    }

    #[test]
    fn aging_and_weight_loss_touch_every_resident() {
        let mut cell = land(Vec::new());
        populate(&mut cell, Species::Herbivore, 2, 5, 10.0);
        populate(&mut cell, Species::Carnivore, 2, 5, 10.0);
        assert!(cell.age_residents().is_ok());
        cell.lose_weight(&ParameterSet::default());
        for a in cell.residents(Species::Herbivore) {
            assert_eq!(a.age(), 6);
            assert!((a.weight() - 9.5).abs() < 1e-9);
        }
        for a in cell.residents(Species::Carnivore) {
            assert_eq!(a.age(), 6);
            assert!((a.weight() - 8.75).abs() < 1e-9);
        }
    }
}
