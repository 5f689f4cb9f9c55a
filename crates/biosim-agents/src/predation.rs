//! Carnivore hunting.
//!
//! A carnivore works through the prey of its cell from the weakest to the
//! fittest, attempting one kill per prey until it has eaten its appetite
//! `F`. The kill chance depends on the fitness gap `d = phi_carn - phi_herb`:
//!
//! | gap                    | outcome                          |
//! |------------------------|----------------------------------|
//! | `d <= 0`               | no kill, no draw                 |
//! | `0 < d < DeltaPhiMax`  | kill with probability `d / DeltaPhiMax` |
//! | `d >= DeltaPhiMax`     | certain kill, no draw            |
//!
//! Consumption is capped at `F` after the pass and the carnivore gains
//! `beta * consumed`.

use biosim_types::AnimalId;
use rand::Rng;

use crate::animal::Animal;
use crate::chance::roll;
use crate::params::SpeciesParameters;

/// The view of a prey animal a carnivore needs while hunting.
///
/// Fitness is captured once per feeding phase, after herbivores have
/// grazed, so every carnivore in the cell judges prey by the same values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreyCandidate {
    /// Identity of the prey animal.
    pub id: AnimalId,
    /// Prey fitness at the start of the hunt.
    pub fitness: f64,
    /// Prey weight, eaten in full on a kill.
    pub weight: f64,
}

/// Result of one carnivore's hunt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HuntOutcome {
    /// Prey killed, in the order they were taken.
    pub killed: Vec<AnimalId>,
    /// Weight actually eaten, after the cap at `F`.
    pub consumed: f64,
    /// Weight the carnivore gained (`beta * consumed`).
    pub weight_gain: f64,
}

/// Let `predator` hunt through `prey`, which must be sorted by ascending
/// fitness.
///
/// The predator's fitness is evaluated once, before the first attempt; its
/// weight only changes after the pass.
pub fn hunt(
    predator: &mut Animal,
    params: &SpeciesParameters,
    prey: &[PreyCandidate],
    rng: &mut impl Rng,
) -> HuntOutcome {
    let appetite = params.f;
    let delta_phi_max = params.delta_phi_max.unwrap_or(f64::INFINITY);
    let predator_fitness = predator.fitness(params);

    let mut eaten = 0.0;
    let mut killed = Vec::new();

    for candidate in prey {
        if eaten >= appetite {
            break;
        }

        let gap = predator_fitness - candidate.fitness;
        let kill = if gap <= 0.0 {
            false
        } else if gap < delta_phi_max {
            roll(rng, gap / delta_phi_max)
        } else {
            true
        };

        if kill {
            eaten += candidate.weight;
            killed.push(candidate.id);
        }
    }

    let consumed = eaten.min(appetite);
    let weight_gain = params.beta * consumed;
    predator.gain_weight(weight_gain);

    HuntOutcome {
        killed,
        consumed,
        weight_gain,
    }
}
