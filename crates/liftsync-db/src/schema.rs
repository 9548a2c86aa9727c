//! Document shapes persisted in the local store.
//!
//! Field names serialize in camelCase so stored JSON matches the documents
//! the mobile client reads and writes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh globally unique identity.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Workout lifecycle state. Never regresses from `Completed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkoutStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for WorkoutStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown workout status: {s}")),
        }
    }
}

/// A single set within an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub id: String,
    pub set_number: u32,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub reps: Option<f64>,
    #[serde(default)]
    pub is_complete: bool,
    /// Present iff `is_complete` was most recently set true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rpe: Option<f64>,
    /// Derived from history on completion; not authoritative.
    #[serde(default, rename = "isPR")]
    pub is_pr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_reps: Option<f64>,
}

impl ExerciseSet {
    pub fn new(set_number: u32) -> Self {
        Self {
            id: new_id(),
            set_number,
            weight: None,
            reps: None,
            is_complete: false,
            completed_at: None,
            rpe: None,
            is_pr: false,
            previous_weight: None,
            previous_reps: None,
        }
    }

    /// weight × reps, when both are recorded.
    pub fn volume(&self) -> Option<f64> {
        match (self.weight, self.reps) {
            (Some(w), Some(r)) => Some(w * r),
            _ => None,
        }
    }
}

/// An exercise slot inside a workout, holding its ordered sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub id: String,
    /// Reference into the external exercise catalog.
    pub exercise_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    pub sets: Vec<ExerciseSet>,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_between_sets: Option<u32>,
    #[serde(default)]
    pub notes: String,
}

impl WorkoutExercise {
    /// A new exercise slot with `set_count` empty sets (at least one).
    pub fn new(exercise_id: impl Into<String>, order: u32, set_count: u32) -> Self {
        let sets = (1..=set_count.max(1)).map(ExerciseSet::new).collect();
        Self {
            id: new_id(),
            exercise_id: exercise_id.into(),
            name: None,
            muscle_group: None,
            equipment: None,
            sets,
            order,
            superset_id: None,
            superset_type: None,
            rest_between_sets: None,
            notes: String::new(),
        }
    }

    /// Restore `sets[i].set_number == i + 1`.
    pub fn renumber_sets(&mut self) {
        for (i, set) in self.sets.iter_mut().enumerate() {
            set.set_number = i as u32 + 1;
        }
    }
}

/// A workout session document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: WorkoutStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Whole seconds between start and completion.
    #[serde(default)]
    pub duration: Option<i64>,
    pub exercises: Vec<WorkoutExercise>,
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl Workout {
    /// A blank in-progress workout starting now.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            notes: String::new(),
            status: WorkoutStatus::InProgress,
            started_at: Some(Utc::now()),
            completed_at: None,
            duration: None,
            exercises: Vec::new(),
            total_volume: 0.0,
            template_id: None,
        }
    }

    /// Sum of weight × reps over all complete sets.
    pub fn compute_total_volume(&self) -> f64 {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .filter(|s| s.is_complete)
            .filter_map(ExerciseSet::volume)
            .sum()
    }

    /// Locate a set by identity, returning (exercise index, set index).
    pub fn find_set(&self, set_id: &str) -> Option<(usize, usize)> {
        self.exercises.iter().enumerate().find_map(|(ei, e)| {
            e.sets
                .iter()
                .position(|s| s.id == set_id)
                .map(|si| (ei, si))
        })
    }

    /// Structural checks applied before any persist.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("workout has an empty id".into());
        }
        for exercise in &self.exercises {
            if exercise.sets.is_empty() {
                return Err(format!("exercise {} has no sets", exercise.id));
            }
            for (i, set) in exercise.sets.iter().enumerate() {
                if set.set_number != i as u32 + 1 {
                    return Err(format!(
                        "exercise {} has non-dense set numbering at position {}",
                        exercise.id,
                        i + 1
                    ));
                }
                if exercise.sets[..i].iter().any(|s| s.id == set.id) {
                    return Err(format!("exercise {} has duplicate set id {}", exercise.id, set.id));
                }
            }
        }
        Ok(())
    }
}

/// Exercise skeleton inside a template: identity plus set count only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    pub exercise_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub set_count: u32,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_between_sets: Option<u32>,
    #[serde(default)]
    pub notes: String,
}

/// Reusable workout skeleton without recorded values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub exercises: Vec<TemplateExercise>,
    pub created_at: DateTime<Utc>,
}

impl WorkoutTemplate {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("template name is blank".into());
        }
        if let Some(e) = self.exercises.iter().find(|e| e.set_count == 0) {
            return Err(format!("template exercise {} has zero sets", e.exercise_id));
        }
        Ok(())
    }
}

/// Entry in the read-mostly exercise catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
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

impl Exercise {
    /// Primary muscle group shown alongside the exercise name.
    pub fn muscle_group(&self) -> Option<&str> {
        self.primary_muscles
            .first()
            .map(String::as_str)
            .or(self.target.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedExercise {
    pub data: Exercise,
    pub timestamp: DateTime<Utc>,
}

/// Read-through cache of individual exercise lookups, keyed by exercise id.
pub type ExerciseDetailsCache = HashMap<String, CachedExercise>;

/// Full-catalog snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLibraryCache {
    pub timestamp: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
}
