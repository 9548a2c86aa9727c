//! History-derived annotations: previous performance, personal records, and
//! catalog enrichment.

use liftsync_db::schema::{ExerciseDetailsCache, Workout};

/// (weight, reps) of each set from the most recent history occurrence of an exercise.
///
/// `history` is expected newest first.
pub fn previous_performance(history: &[Workout], exercise_id: &str) -> Vec<(Option<f64>, Option<f64>)> {
    history
        .iter()
        .flat_map(|w| w.exercises.iter())
        .find(|e| e.exercise_id == exercise_id)
        .map(|e| e.sets.iter().map(|s| (s.weight, s.reps)).collect())
        .unwrap_or_default()
}

/// Recompute `is_pr` on every set of `workout` against `history`.
///
/// A complete set is a PR when its volume strictly exceeds the volume of every
/// complete set of the same exercise in history. An exercise with no history
/// yields no PRs.
pub fn mark_personal_records(workout: &mut Workout, history: &[Workout]) {
    for exercise in &mut workout.exercises {
        let best = history
            .iter()
            .filter(|w| w.id != workout.id)
            .flat_map(|w| w.exercises.iter())
            .filter(|e| e.exercise_id == exercise.exercise_id)
            .flat_map(|e| e.sets.iter())
            .filter(|s| s.is_complete)
            .filter_map(|s| s.volume())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

        for set in &mut exercise.sets {
            set.is_pr = match (best, set.volume()) {
                (Some(best), Some(v)) if set.is_complete => v > best,
                _ => false,
            };
        }
    }
}

/// Fill exercise display metadata from the cached catalog.
///
/// Cache misses leave the existing values untouched.
pub fn enrich_from_catalog(workouts: &mut [Workout], cache: &ExerciseDetailsCache) {
    for exercise in workouts.iter_mut().flat_map(|w| w.exercises.iter_mut()) {
        let Some(cached) = cache.get(&exercise.exercise_id) else {
            continue;
        };
        let data = &cached.data;
        exercise.name = Some(data.name.clone());
        if let Some(group) = data.muscle_group() {
            exercise.muscle_group = Some(group.to_string());
        }
        if data.equipment.is_some() {
            exercise.equipment = data.equipment.clone();
        }
    }
}
