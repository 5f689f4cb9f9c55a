//! Per-species parameter tables.
//!
//! Each species carries one [`SpeciesParameters`] table of named float
//! coefficients. Tables are only changed through
//! [`SpeciesParameters::update`], which validates the entire override map
//! before touching anything: one unknown key or out-of-range value rejects
//! the whole update.
//!
//! | name          | Herbivore | Carnivore |
//! |---------------|-----------|-----------|
//! | `w_birth`     | 8.0       | 6.0       |
//! | `sigma_birth` | 1.5       | 1.0       |
//! | `beta`        | 0.9       | 0.75      |
//! | `eta`         | 0.05      | 0.125     |
//! | `a_half`      | 40.0      | 40.0      |
//! | `phi_age`     | 0.6       | 0.3       |
//! | `w_half`      | 10.0      | 4.0       |
//! | `phi_weight`  | 0.1       | 0.4       |
//! | `mu`          | 0.25      | 0.4       |
//! | `gamma`       | 0.2       | 0.8       |
//! | `zeta`        | 3.5       | 3.5       |
//! | `xi`          | 1.2       | 1.1       |
//! | `omega`       | 0.4       | 0.8       |
//! | `F`           | 10.0      | 50.0      |
//! | `DeltaPhiMax` | --        | 10.0      |

use std::collections::BTreeMap;

use biosim_types::Species;
use serde::Serialize;
use tracing::debug;

use crate::error::AgentError;

/// Named numeric coefficients for one species.
///
/// Field names follow the conventional model notation; the serialized names
/// (and the keys accepted by [`SpeciesParameters::update`]) are exactly the
/// ones listed in the module table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesParameters {
    /// The species this table belongs to.
    #[serde(skip)]
    species: Species,
    /// Mean birth weight.
    pub(crate) w_birth: f64,
    /// Standard deviation of birth weight.
    pub(crate) sigma_birth: f64,
    /// Fraction of eaten food converted to body weight.
    pub(crate) beta: f64,
    /// Fraction of body weight lost per year.
    pub(crate) eta: f64,
    /// Age at which the age factor of fitness is one half.
    pub(crate) a_half: f64,
    /// Steepness of the age factor.
    pub(crate) phi_age: f64,
    /// Weight at which the weight factor of fitness is one half.
    pub(crate) w_half: f64,
    /// Steepness of the weight factor.
    pub(crate) phi_weight: f64,
    /// Migration propensity, multiplied by fitness.
    pub(crate) mu: f64,
    /// Birth propensity, multiplied by fitness and headcount.
    pub(crate) gamma: f64,
    /// Minimum mother weight, in multiples of `w_birth + sigma_birth`.
    pub(crate) zeta: f64,
    /// Mother's weight loss per unit of newborn weight.
    pub(crate) xi: f64,
    /// Death propensity, multiplied by `1 - fitness`.
    pub(crate) omega: f64,
    /// Appetite: fodder or prey weight wanted per year.
    #[serde(rename = "F")]
    pub(crate) f: f64,
    /// Fitness gap at which a kill becomes certain. Carnivores only.
    #[serde(rename = "DeltaPhiMax", skip_serializing_if = "Option::is_none")]
    pub(crate) delta_phi_max: Option<f64>,
}

impl SpeciesParameters {
    /// Default table for herbivores.
    pub const fn herbivore() -> Self {
        Self {
            species: Species::Herbivore,
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            f: 10.0,
            delta_phi_max: None,
        }
    }

    /// Default table for carnivores.
    pub const fn carnivore() -> Self {
        Self {
            species: Species::Carnivore,
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            f: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    /// Default table for the given species.
    pub const fn for_species(species: Species) -> Self {
        match species {
            Species::Herbivore => Self::herbivore(),
            Species::Carnivore => Self::carnivore(),
        }
    }

    /// The species this table belongs to.
    pub const fn species(&self) -> Species {
        self.species
    }

    /// Look up a parameter by name. Returns `None` for unknown names.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find_map(|(name, value)| (name == key).then_some(value))
    }

    /// All parameters as `(name, value)` pairs, in table order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut out = vec![
            ("w_birth", self.w_birth),
            ("sigma_birth", self.sigma_birth),
            ("beta", self.beta),
            ("eta", self.eta),
            ("a_half", self.a_half),
            ("phi_age", self.phi_age),
            ("w_half", self.w_half),
            ("phi_weight", self.phi_weight),
            ("mu", self.mu),
            ("gamma", self.gamma),
            ("zeta", self.zeta),
            ("xi", self.xi),
            ("omega", self.omega),
            ("F", self.f),
        ];
        if let Some(delta) = self.delta_phi_max {
            out.push(("DeltaPhiMax", delta));
        }
        out
    }

    /// Apply a set of overrides, all or nothing.
    ///
    /// Every key must name an existing parameter of this species and every
    /// resulting value must be finite and non-negative, with `eta <= 1` and
    /// `DeltaPhiMax > 0`. On any failure the table is left untouched.
    pub fn update(&mut self, overrides: &BTreeMap<String, f64>) -> Result<(), AgentError> {
        let mut next = self.clone();
        for (key, &value) in overrides {
            let species = self.species;
            let slot = next
                .slot_mut(key)
                .ok_or_else(|| AgentError::UnknownParameter {
                    species,
                    key: key.clone(),
                })?;
            *slot = value;
        }
        next.validate()?;

        debug!(species = %self.species, changed = overrides.len(), "Species parameters updated");
        *self = next;
        Ok(())
    }

    /// Mutable access to a parameter slot by name.
    fn slot_mut(&mut self, key: &str) -> Option<&mut f64> {
        match key {
            "w_birth" => Some(&mut self.w_birth),
            "sigma_birth" => Some(&mut self.sigma_birth),
            "beta" => Some(&mut self.beta),
            "eta" => Some(&mut self.eta),
            "a_half" => Some(&mut self.a_half),
            "phi_age" => Some(&mut self.phi_age),
            "w_half" => Some(&mut self.w_half),
            "phi_weight" => Some(&mut self.phi_weight),
            "mu" => Some(&mut self.mu),
            "gamma" => Some(&mut self.gamma),
            "zeta" => Some(&mut self.zeta),
            "xi" => Some(&mut self.xi),
            "omega" => Some(&mut self.omega),
            "F" => Some(&mut self.f),
            "DeltaPhiMax" => self.delta_phi_max.as_mut(),
            _ => None,
        }
    }

    /// Check every value against the accepted ranges.
    fn validate(&self) -> Result<(), AgentError> {
        let invalid = |key: &str, value: f64, reason: &'static str| AgentError::InvalidParameter {
            species: self.species,
            key: key.to_owned(),
            value,
            reason,
        };

        for (key, value) in self.entries() {
            if !value.is_finite() {
                return Err(invalid(key, value, "must be finite"));
            }
            if value < 0.0 {
                return Err(invalid(key, value, "must be non-negative"));
            }
        }
        if self.eta > 1.0 {
            return Err(invalid("eta", self.eta, "must not exceed 1"));
        }
        if let Some(delta) = self.delta_phi_max
            && delta <= 0.0
        {
            return Err(invalid("DeltaPhiMax", delta, "must be strictly positive"));
        }
        Ok(())
    }
}

/// The parameter tables of both species.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    /// Herbivore table.
    herbivore: SpeciesParameters,
    /// Carnivore table.
    carnivore: SpeciesParameters,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParameters::herbivore(),
            carnivore: SpeciesParameters::carnivore(),
        }
    }
}

impl ParameterSet {
    /// The table for one species.
    pub const fn for_species(&self, species: Species) -> &SpeciesParameters {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    /// Apply overrides to one species' table, all or nothing.
    pub fn update(
        &mut self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), AgentError> {
        match species {
            Species::Herbivore => self.herbivore.update(overrides),
            Species::Carnivore => self.carnivore.update(overrides),
        }
    }

    /// Apply overrides to the species named `species_name`.
    ///
    /// An unrecognised name is rejected before any table is touched.
    pub fn update_by_name(
        &mut self,
        species_name: &str,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<(), AgentError> {
        let species = Species::from_name(species_name)
            .ok_or_else(|| AgentError::UnknownSpecies(species_name.to_owned()))?;
        self.update(species, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    #[test]
    fn defaults_match_table() {
        let herb = SpeciesParameters::herbivore();
        assert_eq!(herb.get("F"), Some(10.0));
        assert_eq!(herb.get("beta"), Some(0.9));
        assert_eq!(herb.get("DeltaPhiMax"), None);

        let carn = SpeciesParameters::carnivore();
        assert_eq!(carn.get("F"), Some(50.0));
        assert_eq!(carn.get("DeltaPhiMax"), Some(10.0));
        assert_eq!(carn.entries().len(), 15);
    }

    #[test]
    fn update_applies_known_keys() {
        let mut herb = SpeciesParameters::herbivore();
        let result = herb.update(&overrides(&[("omega", 0.0), ("F", 20.0)]));
        assert!(result.is_ok());
        assert_eq!(herb.get("omega"), Some(0.0));
        assert_eq!(herb.get("F"), Some(20.0));
    }

    #[test]
    fn unknown_key_rejects_whole_update() {
        let mut herb = SpeciesParameters::herbivore();
        let before = herb.clone();
        let result = herb.update(&overrides(&[("F", 20.0), ("wings", 2.0)]));
        assert!(matches!(result, Err(AgentError::UnknownParameter { .. })));
        assert_eq!(herb, before);
    }

    #[test]
    fn herbivore_has_no_delta_phi_max() {
        let mut herb = SpeciesParameters::herbivore();
        let result = herb.update(&overrides(&[("DeltaPhiMax", 5.0)]));
        assert!(matches!(result, Err(AgentError::UnknownParameter { .. })));
    }

    #[test]
    fn negative_value_rejected() {
        let mut carn = SpeciesParameters::carnivore();
        let before = carn.clone();
        let result = carn.update(&overrides(&[("mu", 0.1), ("gamma", -1.0)]));
        assert!(matches!(result, Err(AgentError::InvalidParameter { .. })));
        assert_eq!(carn, before);
    }

    #[test]
    fn eta_above_one_rejected() {
        let mut herb = SpeciesParameters::herbivore();
        let result = herb.update(&overrides(&[("eta", 1.5)]));
        assert!(matches!(result, Err(AgentError::InvalidParameter { .. })));
    }

    #[test]
    fn zero_delta_phi_max_rejected() {
        let mut carn = SpeciesParameters::carnivore();
        let result = carn.update(&overrides(&[("DeltaPhiMax", 0.0)]));
        assert!(matches!(result, Err(AgentError::InvalidParameter { .. })));
    }

    #[test]
    fn non_finite_rejected() {
        let mut herb = SpeciesParameters::herbivore();
        let result = herb.update(&overrides(&[("w_half", f64::NAN)]));
        assert!(matches!(result, Err(AgentError::InvalidParameter { .. })));
    }

    #[test]
    fn parameter_set_by_name() {
        let mut set = ParameterSet::default();
        let result = set.update_by_name("Carnivore", &overrides(&[("F", 30.0)]));
        assert!(result.is_ok());
        assert_eq!(set.for_species(Species::Carnivore).get("F"), Some(30.0));
        assert_eq!(set.for_species(Species::Herbivore).get("F"), Some(10.0));

        let result = set.update_by_name("Omnivore", &overrides(&[("F", 30.0)]));
        assert!(matches!(result, Err(AgentError::UnknownSpecies(_))));
    }

    #[test]
    fn serializes_with_model_names() {
        let json = serde_json::to_value(SpeciesParameters::carnivore()).unwrap_or_default();
        assert!(json.get("F").is_some());
        assert!(json.get("DeltaPhiMax").is_some());
        let json = serde_json::to_value(SpeciesParameters::herbivore()).unwrap_or_default();
        assert!(json.get("DeltaPhiMax").is_none());
    }
}
