//! Set and exercise mutations on a workout document.
//!
//! These functions edit the document they are given in place; callers pass a
//! private copy (see [`crate::reconcile::Reconciler`]). Targets are located by
//! identity with a linear scan, and a missing target is an error, never a no-op.

use chrono::Utc;
use liftsync_db::schema::{ExerciseSet, Workout, WorkoutExercise};

use crate::error::{WorkoutError, WorkoutResult};

/// Single numeric field of a set editable through [`update_set_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Weight,
    Reps,
    Rpe,
}

impl std::fmt::Display for SetField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weight => write!(f, "weight"),
            Self::Reps => write!(f, "reps"),
            Self::Rpe => write!(f, "rpe"),
        }
    }
}

impl std::str::FromStr for SetField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weight" => Ok(Self::Weight),
            "reps" => Ok(Self::Reps),
            "rpe" => Ok(Self::Rpe),
            _ => Err(format!("Unknown set field: {s}")),
        }
    }
}

/// Coerce raw user input to a numeric field value.
///
/// Empty input clears the field. Unparseable input also clears it.
pub fn parse_numeric_input(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn check_rpe(rpe: Option<f64>) -> WorkoutResult<()> {
    match rpe {
        Some(v) if !(1.0..=10.0).contains(&v) => Err(WorkoutError::Validation(format!(
            "rpe must be between 1 and 10, got {v}"
        ))),
        _ => Ok(()),
    }
}

fn set_mut<'a>(workout: &'a mut Workout, set_id: &str) -> WorkoutResult<&'a mut ExerciseSet> {
    let (ei, si) = workout
        .find_set(set_id)
        .ok_or_else(|| WorkoutError::SetNotFound(set_id.to_string()))?;
    Ok(&mut workout.exercises[ei].sets[si])
}

fn exercise_mut(workout: &mut Workout, index: usize) -> WorkoutResult<&mut WorkoutExercise> {
    workout
        .exercises
        .get_mut(index)
        .ok_or(WorkoutError::ExerciseNotFound(index))
}

pub fn update_set_field(
    workout: &mut Workout,
    set_id: &str,
    field: SetField,
    value: &str,
) -> WorkoutResult<()> {
    let parsed = parse_numeric_input(value);
    if field == SetField::Rpe {
        check_rpe(parsed)?;
    }
    let set = set_mut(workout, set_id)?;
    match field {
        SetField::Weight => set.weight = parsed,
        SetField::Reps => set.reps = parsed,
        SetField::Rpe => set.rpe = parsed,
    }
    Ok(())
}

/// Flip completion of a set, returning the new state.
pub fn toggle_set_completion(workout: &mut Workout, set_id: &str) -> WorkoutResult<bool> {
    let set = set_mut(workout, set_id)?;
    set.is_complete = !set.is_complete;
    set.completed_at = set.is_complete.then(Utc::now);
    Ok(set.is_complete)
}

/// Append a set that repeats the previous last set's values. Returns its id.
pub fn add_set(workout: &mut Workout, exercise_index: usize) -> WorkoutResult<String> {
    let exercise = exercise_mut(workout, exercise_index)?;
    let mut set = ExerciseSet::new(exercise.sets.len() as u32 + 1);
    if let Some(last) = exercise.sets.last() {
        set.weight = last.weight;
        set.reps = last.reps;
        set.rpe = last.rpe;
        set.previous_weight = last.previous_weight;
        set.previous_reps = last.previous_reps;
    }
    let id = set.id.clone();
    exercise.sets.push(set);
    Ok(id)
}

/// Remove a set and renumber the rest densely from 1.
pub fn remove_set(workout: &mut Workout, exercise_index: usize, set_id: &str) -> WorkoutResult<()> {
    let exercise = exercise_mut(workout, exercise_index)?;
    let position = exercise
        .sets
        .iter()
        .position(|s| s.id == set_id)
        .ok_or_else(|| WorkoutError::SetNotFound(set_id.to_string()))?;
    if exercise.sets.len() == 1 {
        return Err(WorkoutError::CannotRemoveLastSet(exercise.id.clone()));
    }
    exercise.sets.remove(position);
    exercise.renumber_sets();
    Ok(())
}

/// Whole-set update: records the values and marks the set complete.
pub fn save_set(
    workout: &mut Workout,
    exercise_index: usize,
    set_index: usize,
    weight: Option<f64>,
    reps: Option<f64>,
    rpe: Option<f64>,
) -> WorkoutResult<()> {
    let (Some(weight), Some(reps)) = (weight, reps) else {
        return Err(WorkoutError::Validation(
            "weight and reps are required to save a set".into(),
        ));
    };
    if weight < 0.0 || reps < 0.0 {
        return Err(WorkoutError::Validation(
            "weight and reps must not be negative".into(),
        ));
    }
    check_rpe(rpe)?;
    let exercise = exercise_mut(workout, exercise_index)?;
    let set = exercise
        .sets
        .get_mut(set_index)
        .ok_or_else(|| WorkoutError::SetNotFound(format!("#{}", set_index + 1)))?;
    set.weight = Some(weight);
    set.reps = Some(reps);
    set.rpe = rpe;
    set.is_complete = true;
    set.completed_at = Some(Utc::now());
    Ok(())
}

/// Append an exercise with one empty set. Returns its index.
///
/// `previous` seeds the informational previous-performance fields per set.
pub fn add_exercise(
    workout: &mut Workout,
    exercise_id: &str,
    previous: &[(Option<f64>, Option<f64>)],
) -> usize {
    let mut exercise = WorkoutExercise::new(exercise_id, workout.exercises.len() as u32, 1);
    apply_previous(&mut exercise, previous);
    workout.exercises.push(exercise);
    workout.exercises.len() - 1
}

/// Remove an exercise and close the gap in `order`.
pub fn remove_exercise(workout: &mut Workout, exercise_index: usize) -> WorkoutResult<()> {
    if exercise_index >= workout.exercises.len() {
        return Err(WorkoutError::ExerciseNotFound(exercise_index));
    }
    workout.exercises.remove(exercise_index);
    for (i, exercise) in workout.exercises.iter_mut().enumerate() {
        exercise.order = i as u32;
    }
    Ok(())
}

/// Copy prior (weight, reps) pairs onto sets by position; extra sets reuse the last pair.
pub fn apply_previous(exercise: &mut WorkoutExercise, previous: &[(Option<f64>, Option<f64>)]) {
    let Some(last) = previous.last() else {
        return;
    };
    for (i, set) in exercise.sets.iter_mut().enumerate() {
        let (weight, reps) = previous.get(i).unwrap_or(last);
        set.previous_weight = *weight;
        set.previous_reps = *reps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workout_with_sets(n: u32) -> Workout {
        let mut w = Workout::new("Test");
        w.exercises.push(WorkoutExercise::new("bench", 0, n));
        w
    }

    fn numbers(w: &Workout) -> Vec<u32> {
        w.exercises[0].sets.iter().map(|s| s.set_number).collect()
    }

    #[test]
    fn numeric_input_coercion() {
        assert_eq!(parse_numeric_input(""), None);
        assert_eq!(parse_numeric_input("   "), None);
        assert_eq!(parse_numeric_input("82.5"), Some(82.5));
        assert_eq!(parse_numeric_input(" 7 "), Some(7.0));
        assert_eq!(parse_numeric_input("82,5"), Some(82.5));
        assert_eq!(parse_numeric_input("abc"), None);
        assert_eq!(parse_numeric_input("inf"), None);
    }

    #[test]
    fn update_field_sets_and_clears() {
        let mut w = workout_with_sets(1);
        let id = w.exercises[0].sets[0].id.clone();
        update_set_field(&mut w, &id, SetField::Weight, "100").unwrap();
        update_set_field(&mut w, &id, SetField::Reps, "5").unwrap();
        assert_eq!(w.exercises[0].sets[0].weight, Some(100.0));
        assert_eq!(w.exercises[0].sets[0].reps, Some(5.0));

        update_set_field(&mut w, &id, SetField::Weight, "").unwrap();
        update_set_field(&mut w, &id, SetField::Reps, "five").unwrap();
        assert_eq!(w.exercises[0].sets[0].weight, None);
        assert_eq!(w.exercises[0].sets[0].reps, None);
    }

    #[test]
    fn update_field_unknown_set() {
        let mut w = workout_with_sets(1);
        let err = update_set_field(&mut w, "nope", SetField::Weight, "1").unwrap_err();
        assert!(matches!(err, WorkoutError::SetNotFound(id) if id == "nope"));
    }

    #[test]
    fn update_rpe_out_of_range_is_rejected() {
        let mut w = workout_with_sets(1);
        let id = w.exercises[0].sets[0].id.clone();
        assert!(matches!(
            update_set_field(&mut w, &id, SetField::Rpe, "11"),
            Err(WorkoutError::Validation(_))
        ));
        update_set_field(&mut w, &id, SetField::Rpe, "8.5").unwrap();
        assert_eq!(w.exercises[0].sets[0].rpe, Some(8.5));
    }

    #[test]
    fn toggle_sets_and_clears_timestamp() {
        let mut w = workout_with_sets(1);
        let id = w.exercises[0].sets[0].id.clone();

        assert!(toggle_set_completion(&mut w, &id).unwrap());
        assert!(w.exercises[0].sets[0].is_complete);
        assert!(w.exercises[0].sets[0].completed_at.is_some());

        assert!(!toggle_set_completion(&mut w, &id).unwrap());
        assert!(!w.exercises[0].sets[0].is_complete);
        assert!(w.exercises[0].sets[0].completed_at.is_none());
    }

    #[test]
    fn add_set_repeats_last_values() {
        let mut w = workout_with_sets(1);
        w.exercises[0].sets[0].weight = Some(60.0);
        w.exercises[0].sets[0].reps = Some(10.0);
        w.exercises[0].sets[0].is_complete = true;

        let new_id = add_set(&mut w, 0).unwrap();
        let added = &w.exercises[0].sets[1];
        assert_eq!(added.id, new_id);
        assert_eq!(added.weight, Some(60.0));
        assert_eq!(added.reps, Some(10.0));
        assert!(!added.is_complete);
        assert_eq!(numbers(&w), vec![1, 2]);
    }

    #[test]
    fn add_set_bad_index() {
        let mut w = workout_with_sets(1);
        assert!(matches!(add_set(&mut w, 3), Err(WorkoutError::ExerciseNotFound(3))));
    }

    #[test]
    fn remove_middle_set_renumbers_in_order() {
        let mut w = workout_with_sets(3);
        let ids: Vec<String> = w.exercises[0].sets.iter().map(|s| s.id.clone()).collect();
        remove_set(&mut w, 0, &ids[1]).unwrap();
        assert_eq!(numbers(&w), vec![1, 2]);
        let remaining: Vec<&str> = w.exercises[0].sets.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(remaining, vec![ids[0].as_str(), ids[2].as_str()]);
    }

    #[test]
    fn remove_last_remaining_set_is_rejected() {
        let mut w = workout_with_sets(1);
        let before = w.clone();
        let id = w.exercises[0].sets[0].id.clone();
        assert!(matches!(
            remove_set(&mut w, 0, &id),
            Err(WorkoutError::CannotRemoveLastSet(_))
        ));
        assert_eq!(w, before);
    }

    #[test]
    fn numbering_stays_dense_across_add_remove_sequences() {
        let mut w = workout_with_sets(1);
        for step in 0..12 {
            if step % 3 == 2 {
                let victim = w.exercises[0].sets[step % w.exercises[0].sets.len()].id.clone();
                remove_set(&mut w, 0, &victim).unwrap();
            } else {
                add_set(&mut w, 0).unwrap();
            }
            let expected: Vec<u32> = (1..=w.exercises[0].sets.len() as u32).collect();
            assert_eq!(numbers(&w), expected);
        }
    }

    #[test]
    fn save_set_requires_weight_and_reps() {
        let mut w = workout_with_sets(1);
        let before = w.clone();
        assert!(matches!(
            save_set(&mut w, 0, 0, Some(100.0), None, None),
            Err(WorkoutError::Validation(_))
        ));
        assert_eq!(w, before);

        save_set(&mut w, 0, 0, Some(100.0), Some(5.0), Some(7.0)).unwrap();
        let set = &w.exercises[0].sets[0];
        assert_eq!((set.weight, set.reps, set.rpe), (Some(100.0), Some(5.0), Some(7.0)));
        assert!(set.is_complete);
        assert!(set.completed_at.is_some());
    }

    #[test]
    fn save_set_bad_indices() {
        let mut w = workout_with_sets(1);
        assert!(matches!(
            save_set(&mut w, 1, 0, Some(1.0), Some(1.0), None),
            Err(WorkoutError::ExerciseNotFound(1))
        ));
        assert!(matches!(
            save_set(&mut w, 0, 4, Some(1.0), Some(1.0), None),
            Err(WorkoutError::SetNotFound(_))
        ));
    }

    #[test]
    fn exercises_keep_dense_order() {
        let mut w = Workout::new("Full body");
        add_exercise(&mut w, "squat", &[]);
        add_exercise(&mut w, "bench", &[(Some(80.0), Some(5.0))]);
        add_exercise(&mut w, "row", &[]);
        assert_eq!(w.exercises[1].sets[0].previous_weight, Some(80.0));

        remove_exercise(&mut w, 0).unwrap();
        let orders: Vec<u32> = w.exercises.iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(w.exercises[0].exercise_id, "bench");
        assert!(matches!(remove_exercise(&mut w, 5), Err(WorkoutError::ExerciseNotFound(5))));
    }
}
