//! Year cycle: the six-phase loop that advances the island by one year.
//!
//! Each year first clears every animal's moved flag, then runs these phases
//! in order. Every phase visits each land cell once, in ascending
//! `(row, col)` order, before the next phase starts:
//!
//! 1. **Feeding** -- refill fodder, herbivores graze in shuffled order, then
//!    carnivores hunt the weakest prey first. Kills leave the island.
//!
//! 2. **Procreation** -- mothers give birth against the headcount of their
//!    species at phase entry. Newborns join after the whole cell is done.
//!
//! 3. **Migration** -- every animal that has not moved yet this year may
//!    move to a random land neighbour. Counters are unchanged.
//!
//! 4. **Aging** -- every animal ages by one year.
//!
//! 5. **Weight loss** -- every animal loses `eta * weight`.
//!
//! 6. **Death** -- every animal faces its death draw; the dead are removed.
//!
//! The cycle is deterministic given the same grid, parameters, and
//! generator state.

use biosim_agents::ParameterSet;
use biosim_types::{Coord, Species, SpeciesCounts};
use biosim_world::{Grid, WorldError};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

/// Errors that can occur while running a year.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// A cell operation failed.
    #[error("year {year}, {phase} phase: {source}")]
    World {
        /// The year being simulated.
        year: u32,
        /// The phase that failed.
        phase: Phase,
        /// The underlying world error.
        source: WorldError,
    },
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// One phase of the yearly cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fodder refill, grazing, and predation.
    Feeding,
    /// Births.
    Procreation,
    /// Moves to neighbouring land cells.
    Migration,
    /// Age increment.
    Aging,
    /// Passive weight decay.
    WeightLoss,
    /// Death draws and removal.
    Death,
}

impl Phase {
    /// Phases in the order they run each year.
    pub const ORDER: [Self; 6] = [
        Self::Feeding,
        Self::Procreation,
        Self::Migration,
        Self::Aging,
        Self::WeightLoss,
        Self::Death,
    ];

    /// Lower-case phase name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Feeding => "feeding",
            Self::Procreation => "procreation",
            Self::Migration => "migration",
            Self::Aging => "aging",
            Self::WeightLoss => "weight-loss",
            Self::Death => "death",
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Year summary
// ---------------------------------------------------------------------------

/// What happened during one simulated year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearSummary {
    /// The year number, starting at 1 for the first simulated year.
    pub year: u32,
    /// Newborns per species.
    pub births: SpeciesCounts,
    /// Deaths in the death phase per species.
    pub deaths: SpeciesCounts,
    /// Herbivores killed by carnivores.
    pub predation_kills: usize,
    /// Animals that changed cell per species.
    pub migrations: SpeciesCounts,
    /// Fodder grazed across the island.
    pub fodder_eaten: f64,
    /// Prey weight eaten by carnivores across the island.
    pub prey_eaten: f64,
    /// Living animals per species at the end of the year.
    pub population: SpeciesCounts,
}

fn accumulate(total: &mut SpeciesCounts, delta: SpeciesCounts) {
    for species in Species::ALL {
        total.add(species, delta.get(species));
    }
}

// ---------------------------------------------------------------------------
// Year loop
// ---------------------------------------------------------------------------

/// Advance the island by one year.
///
/// `year` is only used to label the summary and the logs.
///
/// # Errors
///
/// Returns [`CycleError::World`] if a cell operation reports a broken
/// invariant (non-member removal, counter underflow, age overflow).
pub fn run_year(
    grid: &mut Grid,
    params: &ParameterSet,
    rng: &mut impl Rng,
    year: u32,
) -> Result<YearSummary, CycleError> {
    grid.reset_moved_flags();
    let coords = grid.land_coords();
    let mut summary = YearSummary {
        year,
        ..YearSummary::default()
    };

    for phase in Phase::ORDER {
        run_phase(grid, params, rng, phase, &coords, &mut summary)
            .map_err(|source| CycleError::World {
                year,
                phase,
                source,
            })?;
        debug!(
            year,
            phase = %phase,
            herbivores = grid.num_animals_per_species().herbivores,
            carnivores = grid.num_animals_per_species().carnivores,
            "phase complete"
        );
    }

    summary.population = grid.num_animals_per_species();
    info!(
        year,
        herbivores = summary.population.herbivores,
        carnivores = summary.population.carnivores,
        births = summary.births.total(),
        deaths = summary.deaths.total(),
        predation_kills = summary.predation_kills,
        migrations = summary.migrations.total(),
        "Year complete"
    );
    Ok(summary)
}

/// Run one phase over every land cell.
fn run_phase(
    grid: &mut Grid,
    params: &ParameterSet,
    rng: &mut impl Rng,
    phase: Phase,
    coords: &[Coord],
    summary: &mut YearSummary,
) -> Result<(), WorldError> {
    for &coord in coords {
        match phase {
            Phase::Feeding => {
                let outcome = grid.feed_cell(coord, params, rng)?;
                summary.predation_kills = summary.predation_kills.saturating_add(outcome.kills);
                summary.fodder_eaten += outcome.fodder_eaten;
                summary.prey_eaten += outcome.prey_eaten;
            }
            Phase::Procreation => {
                let births = grid.procreate_cell(coord, params, rng)?;
                accumulate(&mut summary.births, births);
            }
            Phase::Migration => {
                let moved = grid.migrate_from(coord, params, rng)?;
                accumulate(&mut summary.migrations, moved);
            }
            Phase::Aging => grid.age_cell(coord)?,
            Phase::WeightLoss => grid.lose_weight_cell(coord, params)?,
            Phase::Death => {
                let deaths = grid.cull_cell(coord, params, rng)?;
                accumulate(&mut summary.deaths, deaths);
            }
        }
    }
    Ok(())
}
