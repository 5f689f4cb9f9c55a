//! Per-terrain fodder capacity.
//!
//! Lowland and Highland grow fodder up to `f_max` each year; Desert and
//! Water never grow any. Only Lowland (`L`) and Highland (`H`) accept
//! overrides, and the only key is `f_max`.

use std::collections::BTreeMap;

use biosim_types::Terrain;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;

/// Default yearly fodder in a Lowland cell.
pub const DEFAULT_LOWLAND_F_MAX: f64 = 800.0;

/// Default yearly fodder in a Highland cell.
pub const DEFAULT_HIGHLAND_F_MAX: f64 = 300.0;

/// The configurable parameter key.
const F_MAX: &str = "f_max";

/// Fodder capacities for the terrains that grow fodder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainParameters {
    /// Yearly fodder in a Lowland cell.
    lowland_f_max: f64,
    /// Yearly fodder in a Highland cell.
    highland_f_max: f64,
}

impl Default for TerrainParameters {
    fn default() -> Self {
        Self {
            lowland_f_max: DEFAULT_LOWLAND_F_MAX,
            highland_f_max: DEFAULT_HIGHLAND_F_MAX,
        }
    }
}

impl TerrainParameters {
    /// The yearly fodder capacity of a terrain.
    pub const fn f_max(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Lowland => self.lowland_f_max,
            Terrain::Highland => self.highland_f_max,
            Terrain::Water | Terrain::Desert => 0.0,
        }
    }

    /// Apply overrides for the terrain with map code `code`.
    ///
    /// Every key is checked before anything is written, so a rejected update
    /// leaves the parameters untouched.
    ///
    /// # Errors
    ///
    /// - [`WorldError::TerrainNotConfigurable`] for any code other than `L`
    ///   or `H`
    /// - [`WorldError::UnknownTerrainParameter`] for a key other than `f_max`
    /// - [`WorldError::InvalidTerrainParameter`] for a negative or
    ///   non-finite value
    pub fn update(
        &mut self,
        code: char,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), WorldError> {
        let terrain = match Terrain::from_code(code) {
            Some(t @ (Terrain::Lowland | Terrain::Highland)) => t,
            _ => return Err(WorldError::TerrainNotConfigurable { code }),
        };

        let mut f_max = self.f_max(terrain);
        for (key, &value) in overrides {
            if key != F_MAX {
                return Err(WorldError::UnknownTerrainParameter {
                    terrain,
                    key: key.clone(),
                });
            }
            if !value.is_finite() || value < 0.0 {
                return Err(WorldError::InvalidTerrainParameter {
                    terrain,
                    key: key.clone(),
                    value,
                });
            }
            f_max = value;
        }

        match terrain {
            Terrain::Lowland => self.lowland_f_max = f_max,
            Terrain::Highland => self.highland_f_max = f_max,
            Terrain::Water | Terrain::Desert => {}
        }
        debug!(terrain = %terrain, f_max, "terrain parameters updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    #[test]
    fn defaults() {
        let p = TerrainParameters::default();
        assert!((p.f_max(Terrain::Lowland) - 800.0).abs() < f64::EPSILON);
        assert!((p.f_max(Terrain::Highland) - 300.0).abs() < f64::EPSILON);
        assert!(p.f_max(Terrain::Desert).abs() < f64::EPSILON);
        assert!(p.f_max(Terrain::Water).abs() < f64::EPSILON);
    }

    #[test]
    fn lowland_override_applies() {
        let mut p = TerrainParameters::default();
        assert!(p.update('L', &overrides(&[("f_max", 500.0)])).is_ok());
        assert!((p.f_max(Terrain::Lowland) - 500.0).abs() < f64::EPSILON);
        assert!((p.f_max(Terrain::Highland) - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn desert_and_water_are_not_configurable() {
        let mut p = TerrainParameters::default();
        for code in ['D', 'W', 'X'] {
            let result = p.update(code, &overrides(&[("f_max", 10.0)]));
            assert!(matches!(
                result,
                Err(WorldError::TerrainNotConfigurable { .. })
            ));
        }
        assert_eq!(p, TerrainParameters::default());
    }

    #[test]
    fn unknown_key_and_bad_value_leave_state_untouched() {
        let mut p = TerrainParameters::default();
        let result = p.update('H', &overrides(&[("f_max", 100.0), ("g_max", 1.0)]));
        assert!(matches!(
            result,
            Err(WorldError::UnknownTerrainParameter { .. })
        ));
        let result = p.update('H', &overrides(&[("f_max", -1.0)]));
        assert!(matches!(
            result,
            Err(WorldError::InvalidTerrainParameter { .. })
        ));
        assert_eq!(p, TerrainParameters::default());
    }

    #[test]
    fn serializes_capacities_by_name() {
        let json = serde_json::to_value(TerrainParameters::default()).unwrap_or_default();
        let lowland = json.get("lowland_f_max").and_then(serde_json::Value::as_f64);
        assert!(lowland.is_some_and(|v| (v - 800.0).abs() < f64::EPSILON));
        assert!(json.get("highland_f_max").is_some());
    }
}
