//! Individual animal state and its yearly lifecycle rules.
//!
//! An [`Animal`] is a plain value: identity, species tag, age, weight and a
//! per-year migration flag. Every rule takes the species'
//! [`SpeciesParameters`] explicitly and every stochastic rule takes the
//! shared generator explicitly, so the same seed always replays the same
//! run.
//!
//! # Fitness
//!
//! ```text
//! fitness = q(+1, age, a_half, phi_age) * q(-1, weight, w_half, phi_weight)
//! q(sgn, x, x_half, phi) = 1 / (1 + exp(sgn * phi * (x - x_half)))
//! ```
//!
//! Fitness is recomputed on every call and never cached, since age and
//! weight change several times per year.

use biosim_types::{AnimalId, Species};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::chance::roll;
use crate::error::AgentError;
use crate::params::SpeciesParameters;

/// Logistic half-curve used by both fitness factors.
///
/// With `sgn = +1` the curve falls from 1 towards 0 as `x` grows past
/// `x_half`; with `sgn = -1` it rises from 0 towards 1.
pub fn logistic_q(sgn: f64, x: f64, x_half: f64, phi: f64) -> f64 {
    1.0 / (1.0 + (sgn * phi * (x - x_half)).exp())
}

/// A single animal on the island.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animal {
    /// Unique identity, used for removal and transfer between cells.
    id: AnimalId,
    /// Species tag.
    species: Species,
    /// Age in years.
    age: u32,
    /// Body weight. Zero or below means the animal dies this year.
    weight: f64,
    /// Set once the animal has been considered for migration this year.
    has_moved: bool,
}

impl Animal {
    /// Create an animal with the given identity, age and weight.
    pub const fn new(id: AnimalId, species: Species, age: u32, weight: f64) -> Self {
        Self {
            id,
            species,
            age,
            weight,
            has_moved: false,
        }
    }

    /// Create a newborn (age 0).
    pub const fn newborn(id: AnimalId, species: Species, birth_weight: f64) -> Self {
        Self::new(id, species, 0, birth_weight)
    }

    /// Unique identity.
    pub const fn id(&self) -> AnimalId {
        self.id
    }

    /// Species tag.
    pub const fn species(&self) -> Species {
        self.species
    }

    /// Age in years.
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Current body weight.
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Whether the animal has already been considered for migration this year.
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Flag the animal as evaluated for migration this year.
    pub const fn mark_moved(&mut self) {
        self.has_moved = true;
    }

    /// Clear the migration flag at the start of a year.
    pub const fn reset_moved(&mut self) {
        self.has_moved = false;
    }

    /// Fitness in `[0, 1]`, from current age and weight.
    pub fn fitness(&self, params: &SpeciesParameters) -> f64 {
        let age_factor = logistic_q(1.0, f64::from(self.age), params.a_half, params.phi_age);
        let weight_factor = logistic_q(-1.0, self.weight, params.w_half, params.phi_weight);
        (age_factor * weight_factor).clamp(0.0, 1.0)
    }

    /// Increase weight by `amount`.
    pub(crate) fn gain_weight(&mut self, amount: f64) {
        self.weight += amount;
    }

    // -------------------------------------------------------------------
    // Feeding
    // -------------------------------------------------------------------

    /// Graze from a fodder pool holding `available` units.
    ///
    /// Eats `min(beta * F, available)` and gains exactly that much weight.
    /// Returns the amount eaten; the caller removes it from the cell.
    pub fn graze(&mut self, params: &SpeciesParameters, available: f64) -> f64 {
        let wanted = params.beta * params.f;
        let eaten = wanted.min(available).max(0.0);
        self.gain_weight(eaten);
        eaten
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Age by one year.
    pub fn age_one_year(&mut self) -> Result<(), AgentError> {
        self.age = self
            .age
            .checked_add(1)
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: format!("age increment for animal {}", self.id),
            })?;
        Ok(())
    }

    /// Passive yearly weight decay: `weight -= eta * weight`.
    pub fn lose_weight(&mut self, params: &SpeciesParameters) {
        self.weight -= params.eta * self.weight;
    }

    /// Minimum weight a mother needs before a birth is considered.
    pub fn birth_threshold(params: &SpeciesParameters) -> f64 {
        params.zeta * (params.w_birth + params.sigma_birth)
    }

    /// Attempt to give birth.
    ///
    /// `n_same` is the number of same-species animals in the cell when the
    /// procreation phase started. Returns the newborn's weight when a birth
    /// happens; the mother has then already lost `xi * birth_weight`.
    ///
    /// # Order of operations
    ///
    /// 1. Below the weight threshold: no birth, no draw
    /// 2. Draw with probability `clamp(gamma * fitness * n_same, 0, 1)`
    /// 3. Sample the birth weight from `Normal(w_birth, sigma_birth)`
    /// 4. Abort without side effects if the birth weight is not below the
    ///    mother's weight
    pub fn give_birth(
        &mut self,
        params: &SpeciesParameters,
        n_same: usize,
        rng: &mut impl Rng,
    ) -> Result<Option<f64>, AgentError> {
        if self.weight < Self::birth_threshold(params) {
            return Ok(None);
        }

        let headcount = u32::try_from(n_same).map_or(f64::from(u32::MAX), f64::from);
        let probability = (params.gamma * self.fitness(params) * headcount).clamp(0.0, 1.0);
        if !roll(rng, probability) {
            return Ok(None);
        }

        let distribution = Normal::new(params.w_birth, params.sigma_birth).map_err(|e| {
            AgentError::BirthWeightDistribution {
                species: self.species,
                reason: e.to_string(),
            }
        })?;
        let birth_weight = distribution.sample(rng);

        if birth_weight >= self.weight {
            return Ok(None);
        }

        self.weight -= params.xi * birth_weight;
        Ok(Some(birth_weight))
    }

    /// Decide whether the animal wants to leave its cell this year.
    ///
    /// Draws with probability `mu * fitness`. Whether a move actually happens
    /// also depends on the cell having a land neighbour.
    pub fn wants_to_migrate(&self, params: &SpeciesParameters, rng: &mut impl Rng) -> bool {
        roll(rng, params.mu * self.fitness(params))
    }

    /// Decide whether the animal dies this year.
    ///
    /// Certain when weight is zero or below; otherwise drawn with
    /// probability `omega * (1 - fitness)`.
    pub fn dies(&self, params: &SpeciesParameters, rng: &mut impl Rng) -> bool {
        if self.weight <= 0.0 {
            return true;
        }
        roll(rng, params.omega * (1.0 - self.fitness(params)))
    }
}
