//! Defaults applied when new prescriptions and circuits are created.

use serde::{Deserialize, Serialize};

use crate::types::Secs;

/// Default number of sets for a newly added standalone exercise.
pub const DEFAULT_SETS: u32 = 3;
/// Default rest after a standalone exercise, in seconds.
pub const DEFAULT_REST_SECS: Secs = 60;
/// Default rep target for a newly added exercise.
pub const DEFAULT_REPS: u32 = 10;
/// Default round count for a newly created circuit.
pub const DEFAULT_CIRCUIT_ROUNDS: u32 = 3;
/// Default rest between circuit rounds, in seconds.
pub const DEFAULT_CIRCUIT_REST_SECS: Secs = 60;

/// Values stamped onto prescriptions and circuits at creation time.
///
/// All fields have the literal defaults above. Deployments may override
/// them via environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionDefaults {
    pub sets: u32,
    pub rest: Secs,
    pub reps: u32,
    pub circuit_rounds: u32,
    pub circuit_rest: Secs,
}

impl Default for CompositionDefaults {
    fn default() -> Self {
        Self {
            sets: DEFAULT_SETS,
            rest: DEFAULT_REST_SECS,
            reps: DEFAULT_REPS,
            circuit_rounds: DEFAULT_CIRCUIT_ROUNDS,
            circuit_rest: DEFAULT_CIRCUIT_REST_SECS,
        }
    }
}

impl CompositionDefaults {
    /// Load defaults from environment variables.
    ///
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `SETLIST_DEFAULT_SETS`       | `3`     |
    /// | `SETLIST_DEFAULT_REST_SECS`  | `60`    |
    /// | `SETLIST_DEFAULT_REPS`       | `10`    |
    /// | `SETLIST_CIRCUIT_ROUNDS`     | `3`     |
    /// | `SETLIST_CIRCUIT_REST_SECS`  | `60`    |
    ///
    /// Unparsable values fall back to the default. Zero counts are rejected
    /// the same way since sets, reps and rounds must be at least 1.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build defaults from an arbitrary key lookup (environment, file, test map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let count = |key: &str, fallback: u32| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v >= 1)
                .unwrap_or(fallback)
        };
        let secs = |key: &str, fallback: Secs| {
            lookup(key)
                .and_then(|v| v.trim().parse::<Secs>().ok())
                .unwrap_or(fallback)
        };

        Self {
            sets: count("SETLIST_DEFAULT_SETS", DEFAULT_SETS),
            rest: secs("SETLIST_DEFAULT_REST_SECS", DEFAULT_REST_SECS),
            reps: count("SETLIST_DEFAULT_REPS", DEFAULT_REPS),
            circuit_rounds: count("SETLIST_CIRCUIT_ROUNDS", DEFAULT_CIRCUIT_ROUNDS),
            circuit_rest: secs("SETLIST_CIRCUIT_REST_SECS", DEFAULT_CIRCUIT_REST_SECS),
        }
    }
}
