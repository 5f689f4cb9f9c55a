//! The island: a rectangular grid of cells parsed from a map string.
//!
//! The [`Grid`] owns every [`Cell`], the terrain parameters, the island-wide
//! [`PopulationCounter`], and the sequence that hands out animal ids. Cells
//! are stored in a `BTreeMap` keyed by [`Coord`], so iteration is row-major
//! and ascending, which is the cell order of every yearly phase.
//!
//! The per-cell phase wrappers (`feed_cell`, `procreate_cell`, ...) run one
//! phase in one cell and keep the counters in step through
//! [`Grid::count_animals`] and [`Grid::remove_animals`]. Phase ordering
//! across cells belongs to the year cycle.

use std::collections::BTreeMap;

use biosim_agents::{Animal, ParameterSet};
use biosim_types::{AnimalId, AnimalIdSequence, Coord, Species, SpeciesCounts, Terrain};
use rand::Rng;
use tracing::debug;

use crate::cell::{Cell, FeedingOutcome, LandCell};
use crate::error::WorldError;
use crate::population::PopulationCounter;
use crate::terrain::TerrainParameters;

/// The island used when no map is supplied: one Lowland cell in the sea.
pub const DEFAULT_MAP: &str = "WWW\nWLW\nWWW";

/// The island grid.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Every cell, water included, keyed by 1-indexed coordinate.
    cells: BTreeMap<Coord, Cell>,
    /// Number of map rows.
    rows: usize,
    /// Number of map columns.
    cols: usize,
    /// Fodder capacities.
    terrain: TerrainParameters,
    /// Living animals per species.
    population: PopulationCounter,
    /// Source of fresh animal ids.
    ids: AnimalIdSequence,
}

impl Grid {
    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Parse a map string with default terrain parameters.
    ///
    /// # Errors
    ///
    /// See [`Grid::with_terrain_parameters`].
    pub fn parse(map: &str) -> Result<Self, WorldError> {
        Self::with_terrain_parameters(map, TerrainParameters::default())
    }

    /// Parse a map string.
    ///
    /// Lines are trimmed and blank lines skipped. Every remaining line is a
    /// row of terrain codes (`W`, `L`, `H`, `D`). Land cells start with
    /// fodder at their terrain's `f_max`.
    ///
    /// # Errors
    ///
    /// - [`WorldError::EmptyMap`] if no row remains
    /// - [`WorldError::NonUniformRows`] if a row differs in length from the first
    /// - [`WorldError::UnknownTerrainCode`] for an unrecognised character
    /// - [`WorldError::NonWaterBorder`] if a border cell is not water
    pub fn with_terrain_parameters(
        map: &str,
        terrain: TerrainParameters,
    ) -> Result<Self, WorldError> {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(WorldError::EmptyMap);
        };
        let rows = lines.len();
        let cols = first.chars().count();

        let mut terrains: BTreeMap<Coord, Terrain> = BTreeMap::new();
        for (r, line) in lines.iter().enumerate() {
            let row = r.saturating_add(1);
            let found = line.chars().count();
            if found != cols {
                return Err(WorldError::NonUniformRows {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (c, code) in line.chars().enumerate() {
                let coord = Coord::new(row, c.saturating_add(1));
                let kind = Terrain::from_code(code)
                    .ok_or(WorldError::UnknownTerrainCode { code, coord })?;
                terrains.insert(coord, kind);
            }
        }

        for (&coord, &kind) in &terrains {
            let on_border =
                coord.row == 1 || coord.row == rows || coord.col == 1 || coord.col == cols;
            if on_border && kind != Terrain::Water {
                return Err(WorldError::NonWaterBorder {
                    coord,
                    terrain: kind,
                });
            }
        }

        let cells: BTreeMap<Coord, Cell> = terrains
            .iter()
            .map(|(&coord, &kind)| {
                let cell = if kind.is_land() {
                    let neighbors = coord
                        .orthogonal_neighbors()
                        .into_iter()
                        .filter(|n| terrains.get(n).is_some_and(|t| t.is_land()))
                        .collect();
                    Cell::Land(Box::new(LandCell::new(
                        coord,
                        kind,
                        terrain.f_max(kind),
                        neighbors,
                    )))
                } else {
                    Cell::Water { coord }
                };
                (coord, cell)
            })
            .collect();

        let grid = Self {
            cells,
            rows,
            cols,
            terrain,
            population: PopulationCounter::new(),
            ids: AnimalIdSequence::new(),
        };
        debug!(
            rows,
            cols,
            land_cells = grid.land_cells().count(),
            "island map parsed"
        );
        Ok(grid)
    }

    // -------------------------------------------------------------------
    // Cell access
    // -------------------------------------------------------------------

    /// Number of map rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of map columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// The cell at `coord`, if it is on the map.
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// The land cell at `coord`.
    ///
    /// # Errors
    ///
    /// [`WorldError::CellNotFound`] off the map, [`WorldError::NotLand`] on water.
    pub fn land_cell(&self, coord: Coord) -> Result<&LandCell, WorldError> {
        self.cells
            .get(&coord)
            .ok_or(WorldError::CellNotFound(coord))?
            .as_land()
            .ok_or(WorldError::NotLand(coord))
    }

    /// Mutable access to the land cell at `coord`.
    ///
    /// # Errors
    ///
    /// [`WorldError::CellNotFound`] off the map, [`WorldError::NotLand`] on water.
    pub fn land_cell_mut(&mut self, coord: Coord) -> Result<&mut LandCell, WorldError> {
        land_mut(&mut self.cells, coord)
    }

    /// Land coordinates in ascending row-major order.
    pub fn land_coords(&self) -> Vec<Coord> {
        self.land_cells().map(LandCell::coord).collect()
    }

    /// Land cells in ascending row-major order.
    pub fn land_cells(&self) -> impl Iterator<Item = &LandCell> {
        self.cells.values().filter_map(Cell::as_land)
    }

    // -------------------------------------------------------------------
    // Terrain parameters
    // -------------------------------------------------------------------

    /// Current fodder capacities.
    pub const fn terrain_parameters(&self) -> &TerrainParameters {
        &self.terrain
    }

    /// Override the parameters of the terrain with map code `code`.
    ///
    /// Fodder already in the cells is left alone; the new `f_max` applies
    /// from the next feeding phase.
    ///
    /// # Errors
    ///
    /// See [`TerrainParameters::update`].
    pub fn set_landscape_parameters(
        &mut self,
        code: char,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), WorldError> {
        self.terrain.update(code, overrides)
    }

    // -------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------

    /// Hand out a fresh animal id.
    pub const fn next_animal_id(&mut self) -> AnimalId {
        self.ids.next_id()
    }

    /// Put animals into the land cell at `coord` without counting them.
    ///
    /// # Errors
    ///
    /// [`WorldError::CellNotFound`] or [`WorldError::NotLand`].
    pub fn place_animals(&mut self, coord: Coord, animals: Vec<Animal>) -> Result<(), WorldError> {
        land_mut(&mut self.cells, coord)?.add_animals(animals);
        Ok(())
    }

    /// Place animals at `coord` and count them in.
    ///
    /// # Errors
    ///
    /// [`WorldError::CellNotFound`] or [`WorldError::NotLand`]; nothing is
    /// placed or counted in that case.
    pub fn populate(&mut self, coord: Coord, animals: Vec<Animal>) -> Result<(), WorldError> {
        let mut arrivals = SpeciesCounts::default();
        for animal in &animals {
            arrivals.add(animal.species(), 1);
        }
        self.place_animals(coord, animals)?;
        for species in Species::ALL {
            self.count_animals(species, arrivals.get(species));
        }
        Ok(())
    }

    /// Counter hook: `n` animals of `species` came into existence.
    pub fn count_animals(&mut self, species: Species, n: usize) {
        self.population.count(species, n);
    }

    /// Counter hook: `n` animals of `species` died or were eaten.
    ///
    /// # Errors
    ///
    /// [`WorldError::CounterUnderflow`] if fewer than `n` are counted.
    pub fn remove_animals(&mut self, species: Species, n: usize) -> Result<(), WorldError> {
        self.population.remove(species, n)
    }

    /// Total living animals.
    pub const fn num_animals(&self) -> usize {
        self.population.total()
    }

    /// Living animals per species.
    pub const fn num_animals_per_species(&self) -> SpeciesCounts {
        self.population.counts()
    }

    /// Count residents cell by cell, independently of the counters.
    pub fn census(&self) -> SpeciesCounts {
        let mut totals = SpeciesCounts::default();
        for cell in self.land_cells() {
            for species in Species::ALL {
                totals.add(species, cell.count(species));
            }
        }
        totals
    }

    // -------------------------------------------------------------------
    // Per-cell phases
    // -------------------------------------------------------------------

    /// Feeding phase in one cell. Kills are removed from the counters.
    ///
    /// # Errors
    ///
    /// Lookup, membership, or counter errors.
    pub fn feed_cell(
        &mut self,
        coord: Coord,
        params: &ParameterSet,
        rng: &mut impl Rng,
    ) -> Result<FeedingOutcome, WorldError> {
        let f_max = self.terrain.f_max(self.land_cell(coord)?.terrain());
        let outcome = land_mut(&mut self.cells, coord)?.feed(params, f_max, rng)?;
        self.remove_animals(Species::Herbivore, outcome.kills)?;
        Ok(outcome)
    }

    /// Procreation phase in one cell. Newborns are counted in.
    ///
    /// # Errors
    ///
    /// Lookup errors or a failed birth-weight draw.
    pub fn procreate_cell(
        &mut self,
        coord: Coord,
        params: &ParameterSet,
        rng: &mut impl Rng,
    ) -> Result<SpeciesCounts, WorldError> {
        let births = land_mut(&mut self.cells, coord)?.procreate(params, &mut self.ids, rng)?;
        for species in Species::ALL {
            self.count_animals(species, births.get(species));
        }
        Ok(births)
    }

    /// Migration phase for the residents of one cell.
    ///
    /// Movers leave the source cell and are appended to their destination
    /// in the order they were evaluated. Returns movers per species.
    ///
    /// # Errors
    ///
    /// Lookup or membership errors.
    pub fn migrate_from(
        &mut self,
        coord: Coord,
        params: &ParameterSet,
        rng: &mut impl Rng,
    ) -> Result<SpeciesCounts, WorldError> {
        let source = land_mut(&mut self.cells, coord)?;
        let moves = source.plan_migration(params, rng);
        let mut moved = SpeciesCounts::default();
        if moves.is_empty() {
            return Ok(moved);
        }

        let mut departing = Vec::with_capacity(moves.len());
        for species in Species::ALL {
            let ids: Vec<AnimalId> = moves
                .iter()
                .filter(|m| m.species == species)
                .map(|m| m.animal)
                .collect();
            if ids.is_empty() {
                continue;
            }
            departing.extend(source.remove_animals(species, &ids)?);
            moved.add(species, ids.len());
        }

        let destinations: BTreeMap<AnimalId, Coord> =
            moves.iter().map(|m| (m.animal, m.to)).collect();
        for animal in departing {
            if let Some(&to) = destinations.get(&animal.id()) {
                land_mut(&mut self.cells, to)?.add_animals([animal]);
            }
        }
        Ok(moved)
    }

    /// Aging phase in one cell.
    ///
    /// # Errors
    ///
    /// Lookup errors or age overflow.
    pub fn age_cell(&mut self, coord: Coord) -> Result<(), WorldError> {
        land_mut(&mut self.cells, coord)?.age_residents()
    }

    /// Weight-loss phase in one cell.
    ///
    /// # Errors
    ///
    /// Lookup errors.
    pub fn lose_weight_cell(&mut self, coord: Coord, params: &ParameterSet) -> Result<(), WorldError> {
        land_mut(&mut self.cells, coord)?.lose_weight(params);
        Ok(())
    }

    /// Death phase in one cell. The dead are removed from the counters.
    ///
    /// # Errors
    ///
    /// Lookup, membership, or counter errors.
    pub fn cull_cell(
        &mut self,
        coord: Coord,
        params: &ParameterSet,
        rng: &mut impl Rng,
    ) -> Result<SpeciesCounts, WorldError> {
        let deaths = land_mut(&mut self.cells, coord)?.cull(params, rng)?;
        for species in Species::ALL {
            self.remove_animals(species, deaths.get(species))?;
        }
        Ok(deaths)
    }

    /// Clear the moved flag of every animal on the island.
    pub fn reset_moved_flags(&mut self) {
        for cell in self.cells.values_mut().filter_map(Cell::as_land_mut) {
            cell.reset_moved_flags();
        }
    }

    // -------------------------------------------------------------------
    // Reporting
    // -------------------------------------------------------------------

    /// Per-cell counts of one species as a `rows x cols` matrix.
    ///
    /// Cell `(row, col)` sits at `[row - 1][col - 1]`; water entries are 0.
    pub fn density_matrix(&self, species: Species) -> Vec<Vec<usize>> {
        let mut matrix = vec![vec![0; self.cols]; self.rows];
        for cell in self.land_cells() {
            let c = cell.coord();
            if let Some(slot) = matrix
                .get_mut(c.row.saturating_sub(1))
                .and_then(|r| r.get_mut(c.col.saturating_sub(1)))
            {
                *slot = cell.count(species);
            }
        }
        matrix
    }

    /// Weights of every animal of one species, in cell then residence order.
    pub fn weights(&self, species: Species) -> Vec<f64> {
        self.residents(species).map(Animal::weight).collect()
    }

    /// Ages of every animal of one species, in cell then residence order.
    pub fn ages(&self, species: Species) -> Vec<u32> {
        self.residents(species).map(Animal::age).collect()
    }

    /// Fitness of every animal of one species, in cell then residence order.
    pub fn fitness(&self, species: Species, params: &ParameterSet) -> Vec<f64> {
        let p = params.for_species(species);
        self.residents(species).map(|a| a.fitness(p)).collect()
    }

    fn residents(&self, species: Species) -> impl Iterator<Item = &Animal> {
        self.land_cells()
            .flat_map(move |cell| cell.residents(species).iter())
    }
}

/// Mutable land-cell lookup on the cell map alone, so callers can hold other
/// grid fields at the same time.
fn land_mut(cells: &mut BTreeMap<Coord, Cell>, coord: Coord) -> Result<&mut LandCell, WorldError> {
    cells
        .get_mut(&coord)
        .ok_or(WorldError::CellNotFound(coord))?
        .as_land_mut()
        .ok_or(WorldError::NotLand(coord))
}
