//! Enumeration types for the BioSim island simulation.
//!
//! Two closed sets drive everything else: the [`Species`] an animal belongs
//! to and the [`Terrain`] kind of a map cell.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// The species an animal belongs to.
///
/// Both species share the same lifecycle (fitness, aging, weight loss, birth,
/// migration, death) and differ only in how they feed and in their default
/// parameter tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    /// Prey archetype. Grazes on cell fodder.
    Herbivore,
    /// Predator archetype. Hunts herbivores sharing its cell.
    Carnivore,
}

impl Species {
    /// Every species, in the order used for iteration and reporting.
    pub const ALL: [Self; 2] = [Self::Herbivore, Self::Carnivore];

    /// Return the canonical name used in population records and overrides.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Herbivore => "Herbivore",
            Self::Carnivore => "Carnivore",
        }
    }

    /// Look up a species by its canonical name.
    ///
    /// Matching is exact: `"herbivore"` is not recognised.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl core::fmt::Display for Species {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Terrain kind of a single map cell.
///
/// Terrain controls fodder capacity and whether animals may enter the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Impassable water. Holds no animals and no fodder.
    Water,
    /// Lush lowland with the largest fodder capacity.
    Lowland,
    /// Highland with moderate fodder capacity.
    Highland,
    /// Desert. Passable, but never yields fodder.
    Desert,
}

impl Terrain {
    /// Parse a single-character map code (`W`, `L`, `H`, `D`).
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'W' => Some(Self::Water),
            'L' => Some(Self::Lowland),
            'H' => Some(Self::Highland),
            'D' => Some(Self::Desert),
            _ => None,
        }
    }

    /// Whether animals can live in (and migrate into) this terrain.
    pub const fn is_land(self) -> bool {
        !matches!(self, Self::Water)
    }
}

impl core::fmt::Display for Terrain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}
