//! Row shapes of the remote relational schema.
//!
//! One workout row owns N exercise-detail rows, each owning N set rows.
//! Templates mirror the same shape with set counts instead of set rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    pub status: String,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDetailRow {
    /// Server-generated; absent on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub workout_id: String,
    pub exercise_id: String,
    pub order: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub superset_id: Option<String>,
    #[serde(default)]
    pub superset_type: Option<String>,
    #[serde(default)]
    pub rest_between_sets: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRow {
    pub workout_exercise_details_id: String,
    pub set_number: i32,
    #[serde(default)]
    pub reps: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub is_pr: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExerciseRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub template_id: String,
    pub exercise_id: String,
    pub order: i32,
    /// Number of sets; templates never store recorded values.
    pub sets: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub superset_id: Option<String>,
    #[serde(default)]
    pub superset_type: Option<String>,
    #[serde(default)]
    pub rest_between_sets: Option<i32>,
}

/// Read-mostly exercise catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub gif_url: Option<String>,
}

/// Exercise-detail row with its embedded sets and catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteExerciseDetail {
    #[serde(flatten)]
    pub row: ExerciseDetailRow,
    #[serde(default)]
    pub workout_sets: Vec<SetRow>,
    #[serde(default, rename = "exercises")]
    pub exercise: Option<ExerciseRow>,
}

/// Workout row with its embedded exercise details, as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteWorkout {
    #[serde(flatten)]
    pub row: WorkoutRow,
    #[serde(default)]
    pub workout_exercise_details: Vec<RemoteExerciseDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTemplateExercise {
    #[serde(flatten)]
    pub row: TemplateExerciseRow,
    #[serde(default, rename = "exercises")]
    pub exercise: Option<ExerciseRow>,
}

/// Template row with its embedded exercises, as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTemplate {
    #[serde(flatten)]
    pub row: TemplateRow,
    #[serde(default)]
    pub template_exercises: Vec<RemoteTemplateExercise>,
}
