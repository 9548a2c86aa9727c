use async_trait::async_trait;

use crate::error::RemoteResult;
use crate::rows::{
    ExerciseDetailRow, ExerciseRow, RemoteTemplate, RemoteWorkout, SetRow, TemplateExerciseRow,
    TemplateRow, WorkoutRow,
};

/// Network API over the remote relational store.
///
/// Writes are expected to be issued parent before children. Every call may fail
/// under poor connectivity.
#[async_trait]
pub trait RemoteDatabase: Send + Sync {
    // -- Workouts ---

    /// Insert or update the workout row keyed by its (locally generated) id.
    async fn upsert_workout(&self, row: &WorkoutRow) -> RemoteResult<()>;

    /// Delete every exercise-detail row (and, by cascade, set row) of a workout.
    async fn delete_exercise_details(&self, workout_id: &str) -> RemoteResult<()>;

    /// Insert exercise-detail rows, returning their server ids in input order.
    async fn insert_exercise_details(&self, rows: &[ExerciseDetailRow]) -> RemoteResult<Vec<String>>;

    async fn insert_sets(&self, rows: &[SetRow]) -> RemoteResult<()>;

    /// All workouts of a user with embedded details and sets, newest first.
    async fn fetch_workouts(&self, user_id: &str) -> RemoteResult<Vec<RemoteWorkout>>;

    // -- Templates ---

    async fn upsert_template(&self, row: &TemplateRow) -> RemoteResult<()>;
    async fn delete_template_exercises(&self, template_id: &str) -> RemoteResult<()>;
    async fn insert_template_exercises(&self, rows: &[TemplateExerciseRow]) -> RemoteResult<()>;
    async fn fetch_templates(&self, user_id: &str) -> RemoteResult<Vec<RemoteTemplate>>;
    async fn fetch_template(&self, id: &str) -> RemoteResult<Option<RemoteTemplate>>;
    async fn delete_template(&self, id: &str) -> RemoteResult<()>;

    // -- Exercise catalog ---

    async fn fetch_exercise(&self, id: &str) -> RemoteResult<Option<ExerciseRow>>;
    async fn fetch_exercises(&self) -> RemoteResult<Vec<ExerciseRow>>;
}
