use liftsync_db::DbError;
use thiserror::Error;

/// Caller-visible failures of the workout engine.
///
/// Remote failures never appear here; they are absorbed at the sync boundary.
#[derive(Debug, Error)]
pub enum WorkoutError {
    #[error("Set not found: {0}")]
    SetNotFound(String),

    #[error("Exercise not found at index {0}")]
    ExerciseNotFound(usize),

    #[error("Cannot remove the last set of exercise {0}")]
    CannotRemoveLastSet(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("No current workout")]
    NoCurrentWorkout,

    #[error("Workout {given} is not the current workout ({current})")]
    WorkoutMismatch { given: String, current: String },

    #[error("Workout {0} is already in progress")]
    WorkoutInProgress(String),

    #[error("Workout {0} is already finished")]
    WorkoutFinished(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] DbError),
}

impl WorkoutError {
    /// True when the caller addressed state that does not exist or may not
    /// change, as opposed to bad input or storage trouble.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::SetNotFound(_)
                | Self::ExerciseNotFound(_)
                | Self::CannotRemoveLastSet(_)
                | Self::TemplateNotFound(_)
                | Self::NoCurrentWorkout
                | Self::WorkoutMismatch { .. }
                | Self::WorkoutInProgress(_)
                | Self::WorkoutFinished(_)
        )
    }
}

pub type WorkoutResult<T> = Result<T, WorkoutError>;
