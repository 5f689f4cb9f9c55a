//! Type-safe identifiers for simulation entities.
//!
//! Animals are identified by a sequential `u64` handed out by an
//! [`AnimalIdSequence`] owned by the island. Sequential ids keep runs
//! reproducible: the same seed and the same inputs always assign the same
//! id to the same animal.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an animal. Never reused within a run.
    AnimalId
}

/// Monotonic source of [`AnimalId`] values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalIdSequence {
    /// The id handed out by the next call to [`AnimalIdSequence::next_id`].
    next: u64,
}

impl AnimalIdSequence {
    /// Create a sequence starting at id 0.
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Hand out the next unused id.
    ///
    /// Saturates at `u64::MAX`, which no run can reach in practice.
    pub const fn next_id(&mut self) -> AnimalId {
        let id = AnimalId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}
