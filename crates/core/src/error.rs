use crate::types::{ExerciseId, GroupId};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid workout: {0}")]
    InvalidWorkout(validator::ValidationErrors),

    #[error("Invalid prescription for '{exercise_id}' at position {order_index}: {errors}")]
    InvalidPrescription {
        order_index: u32,
        exercise_id: ExerciseId,
        errors: validator::ValidationErrors,
    },

    #[error("Invalid circuit '{group_id}': {errors}")]
    InvalidCircuit {
        group_id: GroupId,
        errors: validator::ValidationErrors,
    },

    #[error("Unknown metric '{0}'")]
    UnknownMetric(String),
}

impl CoreError {
    /// Field-level errors keyed by wire field name, if this is a validation
    /// failure that carries them.
    pub fn field_errors(&self) -> Option<&validator::ValidationErrors> {
        match self {
            Self::InvalidWorkout(errors)
            | Self::InvalidPrescription { errors, .. }
            | Self::InvalidCircuit { errors, .. } => Some(errors),
            _ => None,
        }
    }
}
