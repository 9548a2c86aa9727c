//! Mapping between local documents and remote rows.

use chrono::{Duration, Utc};
use liftsync_db::schema::{
    new_id, Exercise, ExerciseSet, TemplateExercise, Workout, WorkoutExercise, WorkoutStatus,
    WorkoutTemplate,
};
use liftsync_remote::rows::{
    ExerciseDetailRow, ExerciseRow, RemoteTemplate, RemoteWorkout, SetRow, TemplateExerciseRow,
    TemplateRow, WorkoutRow,
};

use crate::mutation::apply_previous;

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

pub fn exercise_from_row(row: ExerciseRow) -> Exercise {
    Exercise {
        id: row.id,
        name: row.name,
        primary_muscles: row.primary_muscles,
        equipment: row.equipment,
        target: row.target,
        instructions: row.instructions,
        gif_url: row.gif_url,
    }
}

// -- Workouts ---

pub fn workout_row(workout: &Workout, user_id: &str) -> WorkoutRow {
    WorkoutRow {
        id: workout.id.clone(),
        user_id: user_id.to_string(),
        name: workout.name.clone(),
        notes: non_empty(&workout.notes),
        duration: workout.duration,
        status: workout.status.to_string(),
        completed_at: workout.completed_at,
    }
}

pub fn exercise_detail_rows(workout: &Workout) -> Vec<ExerciseDetailRow> {
    workout
        .exercises
        .iter()
        .map(|e| ExerciseDetailRow {
            id: None,
            workout_id: workout.id.clone(),
            exercise_id: e.exercise_id.clone(),
            order: e.order as i32,
            notes: non_empty(&e.notes),
            superset_id: e.superset_id.clone(),
            superset_type: e.superset_type.clone(),
            rest_between_sets: e.rest_between_sets.map(|r| r as i32),
        })
        .collect()
}

pub fn set_rows(exercise: &WorkoutExercise, detail_id: &str) -> Vec<SetRow> {
    exercise
        .sets
        .iter()
        .map(|s| SetRow {
            workout_exercise_details_id: detail_id.to_string(),
            set_number: s.set_number as i32,
            reps: s.reps,
            weight: s.weight,
            duration: None,
            completed: s.is_complete,
            rpe: s.rpe,
            is_pr: s.is_pr,
        })
        .collect()
}

/// Rebuild a local workout document from its remote rows.
///
/// Set rows carry no identity of their own, so set ids are derived from the
/// owning detail row and the set's position after sorting by set number.
/// Duplicate or gapped remote set numbers collapse to a dense `1..=n`.
pub fn workout_from_remote(remote: RemoteWorkout) -> Workout {
    let RemoteWorkout {
        row,
        workout_exercise_details,
    } = remote;

    let mut exercises: Vec<WorkoutExercise> = workout_exercise_details
        .into_iter()
        .map(|detail| {
            let exercise_key = detail.row.id.clone().unwrap_or_else(new_id);
            let mut set_rows = detail.workout_sets;
            set_rows.sort_by_key(|s| s.set_number);
            let mut sets: Vec<ExerciseSet> = set_rows
                .into_iter()
                .enumerate()
                .map(|(i, s)| ExerciseSet {
                    id: format!("{exercise_key}-{}", i + 1),
                    set_number: i as u32 + 1,
                    weight: s.weight,
                    reps: s.reps,
                    is_complete: s.completed,
                    completed_at: None,
                    rpe: s.rpe,
                    is_pr: s.is_pr,
                    previous_weight: None,
                    previous_reps: None,
                })
                .collect();
            if sets.is_empty() {
                sets.push(ExerciseSet::new(1));
            }
            let catalog = detail.exercise.map(exercise_from_row);
            let mut exercise = WorkoutExercise {
                id: exercise_key,
                exercise_id: detail.row.exercise_id,
                name: catalog.as_ref().map(|c| c.name.clone()),
                muscle_group: catalog
                    .as_ref()
                    .and_then(|c| c.muscle_group().map(str::to_string)),
                equipment: catalog.and_then(|c| c.equipment),
                sets,
                order: detail.row.order.max(0) as u32,
                superset_id: detail.row.superset_id,
                superset_type: detail.row.superset_type,
                rest_between_sets: detail.row.rest_between_sets.map(|r| r.max(0) as u32),
                notes: detail.row.notes.unwrap_or_default(),
            };
            exercise.renumber_sets();
            exercise
        })
        .collect();
    exercises.sort_by_key(|e| e.order);

    let status = row.status.parse().unwrap_or(WorkoutStatus::Completed);
    let started_at = match (row.completed_at, row.duration) {
        (Some(done), Some(secs)) => Some(done - Duration::seconds(secs)),
        _ => None,
    };
    let mut workout = Workout {
        id: row.id,
        name: row.name,
        notes: row.notes.unwrap_or_default(),
        status,
        started_at,
        completed_at: row.completed_at,
        duration: row.duration,
        exercises,
        total_volume: 0.0,
        template_id: None,
    };
    workout.total_volume = workout.compute_total_volume();
    workout
}

// -- Templates ---

pub fn template_from_workout(workout: &Workout, name: &str, description: &str) -> WorkoutTemplate {
    WorkoutTemplate {
        id: new_id(),
        name: name.trim().to_string(),
        description: description.to_string(),
        exercises: workout
            .exercises
            .iter()
            .map(|e| TemplateExercise {
                exercise_id: e.exercise_id.clone(),
                name: e.name.clone(),
                set_count: e.sets.len() as u32,
                order: e.order,
                superset_id: e.superset_id.clone(),
                superset_type: e.superset_type.clone(),
                rest_between_sets: e.rest_between_sets,
                notes: e.notes.clone(),
            })
            .collect(),
        created_at: Utc::now(),
    }
}

pub fn template_row(template: &WorkoutTemplate, user_id: &str) -> TemplateRow {
    TemplateRow {
        id: template.id.clone(),
        user_id: user_id.to_string(),
        name: template.name.clone(),
        description: non_empty(&template.description),
        created_at: Some(template.created_at),
    }
}

pub fn template_exercise_rows(template: &WorkoutTemplate) -> Vec<TemplateExerciseRow> {
    template
        .exercises
        .iter()
        .map(|e| TemplateExerciseRow {
            id: None,
            template_id: template.id.clone(),
            exercise_id: e.exercise_id.clone(),
            order: e.order as i32,
            sets: e.set_count as i32,
            notes: non_empty(&e.notes),
            superset_id: e.superset_id.clone(),
            superset_type: e.superset_type.clone(),
            rest_between_sets: e.rest_between_sets.map(|r| r as i32),
        })
        .collect()
}

pub fn template_from_remote(remote: RemoteTemplate) -> WorkoutTemplate {
    let mut exercises: Vec<TemplateExercise> = remote
        .template_exercises
        .into_iter()
        .map(|e| TemplateExercise {
            exercise_id: e.row.exercise_id,
            name: e.exercise.map(|x| x.name),
            set_count: e.row.sets.max(1) as u32,
            order: e.row.order.max(0) as u32,
            superset_id: e.row.superset_id,
            superset_type: e.row.superset_type,
            rest_between_sets: e.row.rest_between_sets.map(|r| r.max(0) as u32),
            notes: e.row.notes.unwrap_or_default(),
        })
        .collect();
    exercises.sort_by_key(|e| e.order);
    WorkoutTemplate {
        id: remote.row.id,
        name: remote.row.name,
        description: remote.row.description.unwrap_or_default(),
        exercises,
        created_at: remote.row.created_at.unwrap_or_else(Utc::now),
    }
}

/// Instantiate a fresh in-progress workout from a template.
///
/// Every workout, exercise, and set gets a new identity. Sets carry no
/// recorded values; `previous_for` supplies prior (weight, reps) per exercise.
pub fn workout_from_template<F>(template: &WorkoutTemplate, previous_for: F) -> Workout
where
    F: Fn(&str) -> Vec<(Option<f64>, Option<f64>)>,
{
    let mut workout = Workout::new(template.name.clone());
    workout.template_id = Some(template.id.clone());
    workout.exercises = template
        .exercises
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mut exercise = WorkoutExercise::new(t.exercise_id.clone(), i as u32, t.set_count);
            exercise.name = t.name.clone();
            exercise.superset_id = t.superset_id.clone();
            exercise.superset_type = t.superset_type.clone();
            exercise.rest_between_sets = t.rest_between_sets;
            exercise.notes = t.notes.clone();
            apply_previous(&mut exercise, &previous_for(&t.exercise_id));
            exercise
        })
        .collect();
    workout
}
