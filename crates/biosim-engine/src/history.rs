//! Year callback that records the population history of a run.
//!
//! After each year this callback appends one [`YearRecord`] and, every
//! `report_every` years, logs a progress report with the current counts
//! and where the herbivores are densest.

use biosim_core::{YearCallback, YearSummary};
use biosim_types::{Coord, Species};
use biosim_world::Grid;
use serde::Serialize;
use tracing::{debug, info};

/// Population counts and events of one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearRecord {
    /// Year number.
    pub year: u32,
    /// Living herbivores at the end of the year.
    pub herbivores: usize,
    /// Living carnivores at the end of the year.
    pub carnivores: usize,
    /// Births across both species.
    pub births: usize,
    /// Death-phase deaths across both species.
    pub deaths: usize,
    /// Herbivores taken by carnivores.
    pub predation_kills: usize,
    /// Animals that changed cell.
    pub migrations: usize,
}

impl From<&YearSummary> for YearRecord {
    fn from(summary: &YearSummary) -> Self {
        Self {
            year: summary.year,
            herbivores: summary.population.herbivores,
            carnivores: summary.population.carnivores,
            births: summary.births.total(),
            deaths: summary.deaths.total(),
            predation_kills: summary.predation_kills,
            migrations: summary.migrations.total(),
        }
    }
}

/// Callback that keeps a per-year population series.
pub struct HistoryCallback {
    /// Years between progress reports; 0 disables them.
    report_every: u32,
    /// One record per simulated year.
    records: Vec<YearRecord>,
}

impl HistoryCallback {
    /// Create an empty history.
    pub const fn new(report_every: u32) -> Self {
        Self {
            report_every,
            records: Vec::new(),
        }
    }

    /// The recorded series, oldest year first.
    pub fn into_records(self) -> Vec<YearRecord> {
        self.records
    }
}

impl YearCallback for HistoryCallback {
    fn on_year(&mut self, summary: &YearSummary, grid: &Grid) {
        let record = YearRecord::from(summary);
        debug!(year = record.year, "Year recorded");

        if summary.year.checked_rem(self.report_every) == Some(0) {
            let (densest, densest_count) = densest_cell(grid, Species::Herbivore)
                .map_or_else(|| ("none".to_owned(), 0), |(c, n)| (c.to_string(), n));
            info!(
                year = record.year,
                animals = record.herbivores.saturating_add(record.carnivores),
                herbivores = record.herbivores,
                carnivores = record.carnivores,
                densest_herbivore_cell = %densest,
                densest_herbivore_count = densest_count,
                "Year report"
            );
        }
        self.records.push(record);
    }
}

/// The land cell holding the most animals of `species`, first in row-major
/// order on ties. `None` when the species is extinct.
fn densest_cell(grid: &Grid, species: Species) -> Option<(Coord, usize)> {
    grid.land_cells()
        .map(|cell| (cell.coord(), cell.count(species)))
        .filter(|(_, n)| *n > 0)
        .fold(None, |best, (coord, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((coord, n)),
        })
}
