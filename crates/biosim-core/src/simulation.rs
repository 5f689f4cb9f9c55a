//! The [`Simulation`] facade: one island, its parameters, and its generator.
//!
//! This is the surface a driver works with. It builds the island from a map
//! (or the default single Lowland cell), applies parameter overrides, places
//! the initial population, runs years, and answers population queries.
//!
//! All setup calls validate their whole input before touching any state, so
//! a rejected call leaves the simulation exactly as it was.

use std::collections::BTreeMap;

use biosim_agents::{Animal, ParameterSet};
use biosim_types::{Coord, PopulationRecord, Species};
use biosim_world::{DEFAULT_MAP, Grid, TerrainParameters};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::cycle::{self, YearSummary};
use crate::error::SimulationError;
use crate::rng::{SimRng, create_rng};
use crate::runner::{NoOpCallback, SimulationResult, YearCallback};

/// A running island simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// The island and its animals.
    grid: Grid,
    /// Species parameter tables.
    params: ParameterSet,
    /// The single generator behind every draw.
    rng: SimRng,
    /// Number of years simulated so far.
    year: u32,
}

impl Simulation {
    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Build a simulation from a map, an initial population, and a seed.
    ///
    /// `None` selects the default island `WWW / WLW / WWW`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::Configuration`] for a bad map,
    /// [`SimulationError::MalformedPopulation`] for a bad population.
    pub fn new(
        map: Option<&str>,
        population: &[PopulationRecord],
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let grid = Grid::parse(map.unwrap_or(DEFAULT_MAP))?;
        let mut sim = Self::with_grid(grid, seed);
        sim.add_population(population)?;
        Ok(sim)
    }

    /// Build a simulation from a loaded configuration.
    ///
    /// Terrain overrides are applied before the map is parsed so initial
    /// fodder already reflects them; species overrides are applied before
    /// the population is placed.
    ///
    /// # Errors
    ///
    /// Any configuration, parameter, or population error.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let mut terrain = TerrainParameters::default();
        for (&code, overrides) in &config.landscape {
            terrain.update(code, overrides).inspect_err(|e| {
                warn!(terrain = %code, error = %e, "Landscape override rejected");
            })?;
        }
        let grid = Grid::with_terrain_parameters(&config.island.map, terrain)?;
        let mut sim = Self::with_grid(grid, config.simulation.seed);

        for (species, overrides) in &config.species {
            sim.set_animal_parameters(species, overrides)?;
        }
        sim.add_population(&config.population)?;
        Ok(sim)
    }

    fn with_grid(grid: Grid, seed: u64) -> Self {
        info!(
            seed,
            rows = grid.rows(),
            cols = grid.cols(),
            land_cells = grid.land_coords().len(),
            "Island created"
        );
        Self {
            grid,
            params: ParameterSet::default(),
            rng: create_rng(seed),
            year: 0,
        }
    }

    // -------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------

    /// Override parameters of the species named `species`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::Parameters`] for an unknown species, an unknown
    /// key, or an out-of-range value; nothing changes in that case.
    pub fn set_animal_parameters(
        &mut self,
        species: &str,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), SimulationError> {
        self.params
            .update_by_name(species, overrides)
            .inspect_err(|e| warn!(species, error = %e, "Species override rejected"))?;
        Ok(())
    }

    /// Override parameters of the terrain with map code `code`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::Configuration`] for a non-configurable terrain,
    /// an unknown key, or an out-of-range value; nothing changes in that
    /// case.
    pub fn set_landscape_parameters(
        &mut self,
        code: char,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), SimulationError> {
        self.grid
            .set_landscape_parameters(code, overrides)
            .inspect_err(|e| warn!(terrain = %code, error = %e, "Landscape override rejected"))?;
        Ok(())
    }

    /// Place animals on the island.
    ///
    /// Every record is checked first: the location must be a land cell,
    /// every species tag must be known, and every weight finite and
    /// non-negative. Only then are the animals placed and counted, in
    /// record order.
    ///
    /// # Errors
    ///
    /// [`SimulationError::MalformedPopulation`] naming the first bad record;
    /// nothing is placed in that case.
    pub fn add_population(&mut self, records: &[PopulationRecord]) -> Result<(), SimulationError> {
        let mut batches: Vec<(Coord, Vec<(Species, u32, f64)>)> = Vec::with_capacity(records.len());
        for record in records {
            self.grid
                .land_cell(record.loc)
                .map_err(|e| SimulationError::MalformedPopulation {
                    reason: e.to_string(),
                })?;

            let mut animals = Vec::with_capacity(record.pop.len());
            for entry in &record.pop {
                let species = Species::from_name(&entry.species).ok_or_else(|| {
                    SimulationError::MalformedPopulation {
                        reason: format!("unknown species {:?} at {}", entry.species, record.loc),
                    }
                })?;
                if !entry.weight.is_finite() || entry.weight < 0.0 {
                    return Err(SimulationError::MalformedPopulation {
                        reason: format!("invalid weight {} at {}", entry.weight, record.loc),
                    });
                }
                animals.push((species, entry.age, entry.weight));
            }
            batches.push((record.loc, animals));
        }

        let mut placed: usize = 0;
        for (loc, animals) in batches {
            let herd: Vec<Animal> = animals
                .into_iter()
                .map(|(species, age, weight)| {
                    Animal::new(self.grid.next_animal_id(), species, age, weight)
                })
                .collect();
            placed = placed.saturating_add(herd.len());
            self.grid.populate(loc, herd)?;
        }
        debug!(
            records = records.len(),
            animals = placed,
            total = self.grid.num_animals(),
            "Population added"
        );
        Ok(())
    }

    // -------------------------------------------------------------------
    // Running
    // -------------------------------------------------------------------

    /// Simulate one year.
    ///
    /// # Errors
    ///
    /// [`SimulationError::Cycle`] if the year fails, or
    /// [`SimulationError::YearOverflow`] if the year counter is exhausted.
    pub fn run_year(&mut self) -> Result<YearSummary, SimulationError> {
        let next = self.year.checked_add(1).ok_or(SimulationError::YearOverflow)?;
        let summary = cycle::run_year(&mut self.grid, &self.params, &mut self.rng, next)?;
        self.year = next;
        Ok(summary)
    }

    /// Simulate `num_years` more years.
    ///
    /// # Errors
    ///
    /// See [`Simulation::run_year`].
    pub fn simulate(&mut self, num_years: u32) -> Result<SimulationResult, SimulationError> {
        self.simulate_with(num_years, &mut NoOpCallback)
    }

    /// Simulate `num_years` more years, calling `callback` after each one.
    ///
    /// # Errors
    ///
    /// See [`Simulation::run_year`]. Years completed before the failure
    /// stay applied.
    pub fn simulate_with(
        &mut self,
        num_years: u32,
        callback: &mut dyn YearCallback,
    ) -> Result<SimulationResult, SimulationError> {
        let mut final_summary = None;
        for _ in 0..num_years {
            let summary = self.run_year()?;
            callback.on_year(&summary, &self.grid);
            final_summary = Some(summary);
        }
        Ok(SimulationResult {
            years_run: num_years,
            final_year: self.year,
            final_summary,
            population: self.grid.num_animals_per_species(),
        })
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Number of years simulated so far.
    pub const fn year(&self) -> u32 {
        self.year
    }

    /// Total living animals.
    pub const fn num_animals(&self) -> usize {
        self.grid.num_animals()
    }

    /// Living animals keyed by species name.
    pub fn num_animals_per_species(&self) -> BTreeMap<&'static str, usize> {
        let counts = self.grid.num_animals_per_species();
        Species::ALL
            .into_iter()
            .map(|s| (s.name(), counts.get(s)))
            .collect()
    }

    /// Per-cell counts of one species; cell `(row, col)` sits at
    /// `[row - 1][col - 1]`.
    pub fn density_matrix(&self, species: Species) -> Vec<Vec<usize>> {
        self.grid.density_matrix(species)
    }

    /// Weights of every animal, keyed by species name.
    pub fn animal_weights(&self) -> BTreeMap<&'static str, Vec<f64>> {
        Species::ALL
            .into_iter()
            .map(|s| (s.name(), self.grid.weights(s)))
            .collect()
    }

    /// Ages of every animal, keyed by species name.
    pub fn animal_ages(&self) -> BTreeMap<&'static str, Vec<u32>> {
        Species::ALL
            .into_iter()
            .map(|s| (s.name(), self.grid.ages(s)))
            .collect()
    }

    /// Fitness of every animal, keyed by species name.
    pub fn animal_fitness(&self) -> BTreeMap<&'static str, Vec<f64>> {
        Species::ALL
            .into_iter()
            .map(|s| (s.name(), self.grid.fitness(s, &self.params)))
            .collect()
    }

    /// The island.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The species parameter tables.
    pub const fn parameters(&self) -> &ParameterSet {
        &self.params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use biosim_types::{AnimalRecord, Terrain};

    use super::*;

    fn herbivores_at(row: usize, col: usize, n: usize) -> PopulationRecord {
        PopulationRecord {
            loc: Coord::new(row, col),
            pop: (0..n)
                .map(|_| AnimalRecord::new(Species::Herbivore, 5, 20.0))
                .collect(),
        }
    }

    fn overrides(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    #[test]
    fn default_island_accepts_population() {
        let sim = Simulation::new(None, &[herbivores_at(2, 2, 10)], 1);
        assert!(sim.is_ok());
        let sim = sim.unwrap();
        assert_eq!(sim.year(), 0);
        assert_eq!(sim.num_animals(), 10);
        assert_eq!(sim.num_animals_per_species().get("Herbivore"), Some(&10));
        assert_eq!(sim.num_animals_per_species().get("Carnivore"), Some(&0));
    }

    #[test]
    fn unknown_species_rejects_whole_population() {
        let mut sim = Simulation::new(None, &[], 1).unwrap();
        let mut bad = herbivores_at(2, 2, 1);
        bad.pop.push(AnimalRecord {
            species: "Omnivore".to_owned(),
            age: 1,
            weight: 5.0,
        });
        let result = sim.add_population(&[herbivores_at(2, 2, 3), bad]);
        assert!(matches!(
            result,
            Err(SimulationError::MalformedPopulation { .. })
        ));
        assert_eq!(sim.num_animals(), 0);
    }

    #[test]
    fn population_on_water_is_rejected() {
        let result = Simulation::new(None, &[herbivores_at(1, 1, 1)], 1);
        assert!(matches!(
            result,
            Err(SimulationError::MalformedPopulation { .. })
        ));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut sim = Simulation::new(None, &[], 1).unwrap();
        let record = PopulationRecord {
            loc: Coord::new(2, 2),
            pop: vec![AnimalRecord::new(Species::Carnivore, 3, -1.0)],
        };
        assert!(sim.add_population(&[record]).is_err());
        assert_eq!(sim.num_animals(), 0);
    }

    #[test]
    fn bad_map_is_a_configuration_error() {
        let result = Simulation::new(Some("WWW\nWLL\nWWW"), &[], 1);
        assert!(matches!(
            result,
            Err(SimulationError::Configuration { .. })
        ));
    }

    #[test]
    fn unknown_species_override_is_a_parameter_error() {
        let mut sim = Simulation::new(None, &[], 1).unwrap();
        let result = sim.set_animal_parameters("Omnivore", &overrides(&[("F", 1.0)]));
        assert!(matches!(result, Err(SimulationError::Parameters { .. })));
        let result = sim.set_animal_parameters("Herbivore", &overrides(&[("F", 20.0)]));
        assert!(result.is_ok());
        let appetite = sim.parameters().for_species(Species::Herbivore).get("F");
        assert!(appetite.is_some_and(|v| (v - 20.0).abs() < 1e-9));
    }

    #[test]
    fn landscape_override_reaches_grid() {
        let mut sim = Simulation::new(None, &[], 1).unwrap();
        assert!(
            sim.set_landscape_parameters('H', &overrides(&[("f_max", 123.0)]))
                .is_ok()
        );
        let f_max = sim.grid().terrain_parameters().f_max(Terrain::Highland);
        assert!((f_max - 123.0).abs() < 1e-9);
        assert!(
            sim.set_landscape_parameters('D', &overrides(&[("f_max", 1.0)]))
                .is_err()
        );
    }

    #[test]
    fn simulate_advances_year_and_calls_back() {
        struct CountCallback {
            years: Vec<u32>,
        }
        impl YearCallback for CountCallback {
            fn on_year(&mut self, summary: &YearSummary, grid: &Grid) {
                assert_eq!(summary.population, grid.num_animals_per_species());
                self.years.push(summary.year);
            }
        }

        let mut sim = Simulation::new(None, &[herbivores_at(2, 2, 20)], 4).unwrap();
        let mut callback = CountCallback { years: Vec::new() };
        let result = sim.simulate_with(3, &mut callback);
        assert!(result.is_ok());
        assert_eq!(callback.years, vec![1, 2, 3]);
        assert_eq!(sim.year(), 3);

        let result = sim.simulate(2).unwrap();
        assert_eq!(result.final_year, 5);
        assert_eq!(result.years_run, 2);
    }

    #[test]
    fn reporting_lists_cover_every_animal() {
        let sim = Simulation::new(None, &[herbivores_at(2, 2, 7)], 1).unwrap();
        let weights = sim.animal_weights();
        let ages = sim.animal_ages();
        let fitness = sim.animal_fitness();
        assert_eq!(weights.get("Herbivore").map(Vec::len), Some(7));
        assert_eq!(ages.get("Herbivore").map(Vec::len), Some(7));
        assert_eq!(fitness.get("Carnivore").map(Vec::len), Some(0));
        assert!(
            fitness
                .values()
                .flatten()
                .all(|phi| (0.0..=1.0).contains(phi))
        );
        assert_eq!(sim.density_matrix(Species::Herbivore), vec![
            vec![0, 0, 0],
            vec![0, 7, 0],
            vec![0, 0, 0]
        ]);
    }
}
