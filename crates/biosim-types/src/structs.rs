//! Plain data structs shared across the workspace.
//!
//! These are the shapes exchanged with collaborators: map coordinates,
//! initial-population records, and per-species tallies.

use serde::{Deserialize, Serialize};

use crate::enums::Species;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A 1-indexed `(row, col)` position on the island map.
///
/// Row 1 is the first line of the map string and column 1 its first
/// character. Density matrices place cell `(row, col)` at index
/// `[row - 1][col - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Row number, starting at 1.
    pub row: usize,
    /// Column number, starting at 1.
    pub col: usize,
}

impl Coord {
    /// Create a coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The four orthogonal neighbours in north, south, west, east order.
    ///
    /// Neighbours that would fall off the top or left edge (row or column 0)
    /// are omitted.
    pub fn orthogonal_neighbors(self) -> Vec<Self> {
        let mut out = Vec::with_capacity(4);
        if let Some(row) = self.row.checked_sub(1) {
            out.push(Self::new(row, self.col));
        }
        if let Some(row) = self.row.checked_add(1) {
            out.push(Self::new(row, self.col));
        }
        if let Some(col) = self.col.checked_sub(1) {
            out.push(Self::new(self.row, col));
        }
        if let Some(col) = self.col.checked_add(1) {
            out.push(Self::new(self.row, col));
        }
        out
    }
}

impl core::fmt::Display for Coord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Population records
// ---------------------------------------------------------------------------

/// One animal in an initial-population record.
///
/// `species` is kept as free text so that an unrecognised tag can be
/// reported as a malformed population rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    /// Species name, `"Herbivore"` or `"Carnivore"`.
    pub species: String,
    /// Age in years.
    pub age: u32,
    /// Body weight.
    pub weight: f64,
}

impl AnimalRecord {
    /// Convenience constructor used by drivers and tests.
    pub fn new(species: Species, age: u32, weight: f64) -> Self {
        Self {
            species: species.name().to_owned(),
            age,
            weight,
        }
    }
}

/// A batch of animals placed at one map location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    /// The land cell receiving the animals.
    pub loc: Coord,
    /// The animals to place.
    pub pop: Vec<AnimalRecord>,
}

// ---------------------------------------------------------------------------
// Per-species tallies
// ---------------------------------------------------------------------------

/// A count per species.
///
/// Used for population totals and for per-year event tallies (births,
/// deaths, kills, migrations).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCounts {
    /// Herbivore count.
    pub herbivores: usize,
    /// Carnivore count.
    pub carnivores: usize,
}

impl SpeciesCounts {
    /// Return the count for one species.
    pub const fn get(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    /// Return a mutable reference to the count for one species.
    pub const fn get_mut(&mut self, species: Species) -> &mut usize {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    /// Add `n` to one species' count, saturating at `usize::MAX`.
    pub fn add(&mut self, species: Species, n: usize) {
        let slot = self.get_mut(species);
        *slot = slot.saturating_add(n);
    }

    /// Sum over both species.
    pub const fn total(&self) -> usize {
        self.herbivores.saturating_add(self.carnivores)
    }
}
