//! Error types for the `biosim-world` crate.
//!
//! Map and terrain-parameter variants are configuration errors: they are
//! raised before any state changes and abort setup. The membership and
//! counter variants signal a broken invariant in the caller.

use biosim_agents::AgentError;
use biosim_types::{AnimalId, Coord, Species, Terrain};

/// Errors that can occur during island construction and cell operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The map string contains no rows.
    #[error("island map is empty")]
    EmptyMap,

    /// A map row differs in length from the first row.
    #[error("map row {row} has {found} cells, expected {expected}")]
    NonUniformRows {
        /// 1-indexed row number.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// A map character is not one of `W`, `L`, `H`, `D`.
    #[error("unrecognised terrain code {code:?} at {coord}")]
    UnknownTerrainCode {
        /// The offending character.
        code: char,
        /// Where it appeared.
        coord: Coord,
    },

    /// A cell on the map border is not water.
    #[error("border cell {coord} is {terrain}, only water may border the island")]
    NonWaterBorder {
        /// The offending border cell.
        coord: Coord,
        /// Its terrain.
        terrain: Terrain,
    },

    /// A terrain parameter override targeted a terrain without parameters.
    #[error("terrain {code:?} has no configurable parameters")]
    TerrainNotConfigurable {
        /// The requested terrain code.
        code: char,
    },

    /// A terrain parameter override named an unknown key.
    #[error("unknown parameter {key:?} for terrain {terrain}")]
    UnknownTerrainParameter {
        /// The terrain being configured.
        terrain: Terrain,
        /// The unrecognised key.
        key: String,
    },

    /// A terrain parameter override supplied a value outside the accepted range.
    #[error("invalid value {value} for terrain {terrain} parameter {key:?}")]
    InvalidTerrainParameter {
        /// The terrain being configured.
        terrain: Terrain,
        /// The parameter name.
        key: String,
        /// The rejected value.
        value: f64,
    },

    /// No cell exists at the coordinate.
    #[error("no cell at {0}")]
    CellNotFound(Coord),

    /// The coordinate is a water cell where a land cell is required.
    #[error("cell {0} is not land")]
    NotLand(Coord),

    /// An animal scheduled for removal does not live in the cell.
    #[error("{species} {animal} is not in cell {coord}")]
    AnimalNotInCell {
        /// The missing animal.
        animal: AnimalId,
        /// Its expected species list.
        species: Species,
        /// The cell searched.
        coord: Coord,
    },

    /// A removal hook asked to remove more animals than are counted.
    #[error("cannot remove {requested} {species} from a count of {available}")]
    CounterUnderflow {
        /// The species counter.
        species: Species,
        /// How many were to be removed.
        requested: usize,
        /// How many were counted.
        available: usize,
    },

    /// An animal lifecycle rule failed.
    #[error("animal error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}
