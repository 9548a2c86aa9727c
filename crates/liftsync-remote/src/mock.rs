//! In-memory mock implementation of RemoteDatabase for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{RemoteError, RemoteResult};
use crate::rows::*;
use crate::traits::RemoteDatabase;

#[derive(Default)]
struct Tables {
    workouts: HashMap<String, WorkoutRow>,
    details: Vec<ExerciseDetailRow>,
    sets: Vec<SetRow>,
    templates: HashMap<String, TemplateRow>,
    template_exercises: Vec<TemplateExerciseRow>,
    exercises: HashMap<String, ExerciseRow>,
}

/// In-memory RemoteDatabase with failure injection.
#[derive(Default)]
pub struct MockRemote {
    tables: Mutex<Tables>,
    fail_all: AtomicBool,
    fail_set_inserts: Mutex<HashSet<String>>,
    next_id: AtomicU64,
    calls: AtomicU64,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the network were down.
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Make set inserts for the given workout fail after its parent rows landed.
    pub fn fail_set_inserts_for(&self, workout_id: &str) {
        self.fail_set_inserts
            .lock()
            .unwrap()
            .insert(workout_id.to_string());
    }

    pub fn clear_set_insert_failures(&self) {
        self.fail_set_inserts.lock().unwrap().clear();
    }

    /// Total number of trait calls received, failed or not.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn add_exercise(&self, exercise: ExerciseRow) {
        self.tables
            .lock()
            .unwrap()
            .exercises
            .insert(exercise.id.clone(), exercise);
    }

    /// Seed a complete remote workout (rows are given server ids as needed).
    pub fn seed_workout(&self, workout: RemoteWorkout) {
        let mut tables = self.tables.lock().unwrap();
        tables
            .workouts
            .insert(workout.row.id.clone(), workout.row.clone());
        for detail in workout.workout_exercise_details {
            let mut row = detail.row;
            let id = row.id.clone().unwrap_or_else(|| self.next_key());
            row.id = Some(id.clone());
            tables.details.push(row);
            for mut set in detail.workout_sets {
                set.workout_exercise_details_id = id.clone();
                tables.sets.push(set);
            }
        }
    }

    pub fn workout_count(&self) -> usize {
        self.tables.lock().unwrap().workouts.len()
    }

    pub fn detail_count(&self, workout_id: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .details
            .iter()
            .filter(|d| d.workout_id == workout_id)
            .count()
    }

    pub fn set_count(&self, workout_id: &str) -> usize {
        let tables = self.tables.lock().unwrap();
        let detail_ids: HashSet<&str> = tables
            .details
            .iter()
            .filter(|d| d.workout_id == workout_id)
            .filter_map(|d| d.id.as_deref())
            .collect();
        tables
            .sets
            .iter()
            .filter(|s| detail_ids.contains(s.workout_exercise_details_id.as_str()))
            .count()
    }

    pub fn template_count(&self) -> usize {
        self.tables.lock().unwrap().templates.len()
    }

    fn next_key(&self) -> String {
        format!("row-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn enter(&self) -> RemoteResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("injected network failure".into()));
        }
        Ok(())
    }

    fn assemble_template(tables: &Tables, row: &TemplateRow) -> RemoteTemplate {
        let mut template_exercises: Vec<RemoteTemplateExercise> = tables
            .template_exercises
            .iter()
            .filter(|e| e.template_id == row.id)
            .map(|e| RemoteTemplateExercise {
                row: e.clone(),
                exercise: tables.exercises.get(&e.exercise_id).cloned(),
            })
            .collect();
        template_exercises.sort_by_key(|e| e.row.order);
        RemoteTemplate {
            row: row.clone(),
            template_exercises,
        }
    }
}

#[async_trait]
impl RemoteDatabase for MockRemote {
    async fn upsert_workout(&self, row: &WorkoutRow) -> RemoteResult<()> {
        self.enter()?;
        self.tables
            .lock()
            .unwrap()
            .workouts
            .insert(row.id.clone(), row.clone());
        Ok(())
    }

    async fn delete_exercise_details(&self, workout_id: &str) -> RemoteResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();
        let removed: HashSet<String> = tables
            .details
            .iter()
            .filter(|d| d.workout_id == workout_id)
            .filter_map(|d| d.id.clone())
            .collect();
        tables.details.retain(|d| d.workout_id != workout_id);
        tables
            .sets
            .retain(|s| !removed.contains(&s.workout_exercise_details_id));
        Ok(())
    }

    async fn insert_exercise_details(&self, rows: &[ExerciseDetailRow]) -> RemoteResult<Vec<String>> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let id = self.next_key();
            let mut row = row.clone();
            row.id = Some(id.clone());
            tables.details.push(row);
            ids.push(id);
        }
        Ok(ids)
    }

    async fn insert_sets(&self, rows: &[SetRow]) -> RemoteResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();
        let failing = self.fail_set_inserts.lock().unwrap();
        let blocked = rows.iter().any(|s| {
            tables.details.iter().any(|d| {
                d.id.as_deref() == Some(s.workout_exercise_details_id.as_str())
                    && failing.contains(&d.workout_id)
            })
        });
        if blocked {
            return Err(RemoteError::Http {
                status: 500,
                body: "injected set insert failure".into(),
            });
        }
        tables.sets.extend(rows.iter().cloned());
        Ok(())
    }

    async fn fetch_workouts(&self, user_id: &str) -> RemoteResult<Vec<RemoteWorkout>> {
        self.enter()?;
        let tables = self.tables.lock().unwrap();
        let mut result: Vec<RemoteWorkout> = tables
            .workouts
            .values()
            .filter(|w| w.user_id == user_id && w.status == "completed")
            .map(|w| {
                let mut details: Vec<RemoteExerciseDetail> = tables
                    .details
                    .iter()
                    .filter(|d| d.workout_id == w.id)
                    .map(|d| {
                        let mut sets: Vec<SetRow> = tables
                            .sets
                            .iter()
                            .filter(|s| Some(s.workout_exercise_details_id.as_str()) == d.id.as_deref())
                            .cloned()
                            .collect();
                        sets.sort_by_key(|s| s.set_number);
                        RemoteExerciseDetail {
                            row: d.clone(),
                            workout_sets: sets,
                            exercise: tables.exercises.get(&d.exercise_id).cloned(),
                        }
                    })
                    .collect();
                details.sort_by_key(|d| d.row.order);
                RemoteWorkout {
                    row: w.clone(),
                    workout_exercise_details: details,
                }
            })
            .collect();
        result.sort_by(|a, b| b.row.completed_at.cmp(&a.row.completed_at));
        Ok(result)
    }

    async fn upsert_template(&self, row: &TemplateRow) -> RemoteResult<()> {
        self.enter()?;
        self.tables
            .lock()
            .unwrap()
            .templates
            .insert(row.id.clone(), row.clone());
        Ok(())
    }

    async fn delete_template_exercises(&self, template_id: &str) -> RemoteResult<()> {
        self.enter()?;
        self.tables
            .lock()
            .unwrap()
            .template_exercises
            .retain(|e| e.template_id != template_id);
        Ok(())
    }

    async fn insert_template_exercises(&self, rows: &[TemplateExerciseRow]) -> RemoteResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();
        for row in rows {
            let mut row = row.clone();
            row.id = Some(self.next_key());
            tables.template_exercises.push(row);
        }
        Ok(())
    }

    async fn fetch_templates(&self, user_id: &str) -> RemoteResult<Vec<RemoteTemplate>> {
        self.enter()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .templates
            .values()
            .filter(|t| t.user_id == user_id)
            .map(|t| Self::assemble_template(&tables, t))
            .collect())
    }

    async fn fetch_template(&self, id: &str) -> RemoteResult<Option<RemoteTemplate>> {
        self.enter()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .templates
            .get(id)
            .map(|t| Self::assemble_template(&tables, t)))
    }

    async fn delete_template(&self, id: &str) -> RemoteResult<()> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();
        tables.templates.remove(id);
        tables.template_exercises.retain(|e| e.template_id != id);
        Ok(())
    }

    async fn fetch_exercise(&self, id: &str) -> RemoteResult<Option<ExerciseRow>> {
        self.enter()?;
        Ok(self.tables.lock().unwrap().exercises.get(id).cloned())
    }

    async fn fetch_exercises(&self) -> RemoteResult<Vec<ExerciseRow>> {
        self.enter()?;
        let mut all: Vec<ExerciseRow> = self
            .tables
            .lock()
            .unwrap()
            .exercises
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}
