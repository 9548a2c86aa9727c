use std::sync::Arc;

use chrono::{Duration, Utc};
use liftsync_core::{Connectivity, Session, SessionProvider};
use liftsync_db::schema::{
    CachedExercise, Exercise, ExerciseLibraryCache, Workout, WorkoutStatus, WorkoutTemplate,
};
use liftsync_db::LocalStore;
use liftsync_remote::{RemoteDatabase, RemoteError, RemoteResult};

use crate::convert;
use crate::error::{WorkoutError, WorkoutResult};
use crate::merge::{merge_by_identity, sort_history};
use crate::mutation::{self, SetField};
use crate::reconcile::Reconciler;
use crate::records;

/// Cached exercise details older than this are refreshed when online.
pub const EXERCISE_CACHE_TTL_DAYS: i64 = 7;

/// Where a completed workout ended up on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    Queued,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub workout: Workout,
    pub outcome: SyncOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub workout_id: String,
    pub error: String,
}

/// Result of one pass over the pending sync queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: Vec<String>,
    pub failed: Vec<SyncFailure>,
    pub remaining: usize,
}

/// Entry point for everything the UI does with workouts.
///
/// Local storage is the source of truth. Remote calls are best-effort: every
/// remote failure is logged and routed to a local fallback (queue, cache, or
/// empty result) and never reaches the caller.
pub struct WorkoutService {
    store: LocalStore,
    reconciler: Reconciler,
    remote: Option<Arc<dyn RemoteDatabase>>,
    connectivity: Arc<dyn Connectivity>,
    session: Arc<dyn SessionProvider>,
}

impl WorkoutService {
    pub fn new(
        store: LocalStore,
        connectivity: Arc<dyn Connectivity>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(store.clone(), true),
            store,
            remote: None,
            connectivity,
            session,
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteDatabase>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Toggle read-back verification of current-workout writes (on by default).
    pub fn verify_writes(mut self, verify: bool) -> Self {
        self.reconciler = Reconciler::new(self.store.clone(), verify);
        self
    }

    // -- Remote gating ---

    async fn online_remote(&self) -> Option<Arc<dyn RemoteDatabase>> {
        let remote = self.remote.clone()?;
        if self.connectivity.is_online().await {
            Some(remote)
        } else {
            None
        }
    }

    /// Remote plus session, when user-owned data may be read or written.
    async fn sync_target(&self) -> Option<(Arc<dyn RemoteDatabase>, Session)> {
        let session = self.session.current_session()?;
        let remote = self.online_remote().await?;
        Some((remote, session))
    }

    // -- Current workout ---

    pub async fn current_workout(&self) -> WorkoutResult<Option<Workout>> {
        Ok(self.store.current_workout().await?)
    }

    async fn ensure_slot_free(&self) -> WorkoutResult<()> {
        match self.store.current_workout().await? {
            Some(current) if !current.status.is_finished() => {
                Err(WorkoutError::WorkoutInProgress(current.id))
            }
            _ => Ok(()),
        }
    }

    /// Start a blank workout and make it current.
    pub async fn start_workout(&self, name: &str) -> WorkoutResult<Workout> {
        self.ensure_slot_free().await?;
        let name = match name.trim() {
            "" => "Workout",
            trimmed => trimmed,
        };
        let workout = Workout::new(name);
        self.store.put_current_workout(&workout, true).await?;
        tracing::info!("Started workout {} ({})", workout.id, workout.name);
        Ok(workout)
    }

    /// Persist the whole document, e.g. after a name or notes edit.
    pub async fn save_current_workout(&self, workout: &Workout) -> WorkoutResult<Workout> {
        let (saved, ()) = self.reconciler.with_mutation(workout, |_| Ok(())).await?;
        Ok(saved)
    }

    pub async fn add_exercise(
        &self,
        workout: &Workout,
        exercise_id: &str,
    ) -> WorkoutResult<(Workout, usize)> {
        let exercise_id = exercise_id.trim();
        if exercise_id.is_empty() {
            return Err(WorkoutError::Validation("exercise id must not be blank".into()));
        }
        let history = self.store.history().await?;
        let previous = records::previous_performance(&history, exercise_id);
        let catalog = self.store.exercise_details_cache().await.unwrap_or_else(|e| {
            tracing::warn!("Exercise cache unreadable, skipping enrichment: {e}");
            Default::default()
        });
        self.reconciler
            .with_mutation(workout, |doc| {
                let index = mutation::add_exercise(doc, exercise_id, &previous);
                records::enrich_from_catalog(std::slice::from_mut(doc), &catalog);
                Ok(index)
            })
            .await
    }

    pub async fn remove_exercise(&self, workout: &Workout, exercise_index: usize) -> WorkoutResult<Workout> {
        let (next, ()) = self
            .reconciler
            .with_mutation(workout, |doc| mutation::remove_exercise(doc, exercise_index))
            .await?;
        Ok(next)
    }

    // -- Set mutations ---

    pub async fn update_set_field(
        &self,
        workout: &Workout,
        set_id: &str,
        field: SetField,
        value: &str,
    ) -> WorkoutResult<Workout> {
        let (next, ()) = self
            .reconciler
            .with_mutation(workout, |doc| mutation::update_set_field(doc, set_id, field, value))
            .await?;
        Ok(next)
    }

    pub async fn toggle_set_completion(
        &self,
        workout: &Workout,
        set_id: &str,
    ) -> WorkoutResult<(Workout, bool)> {
        self.reconciler
            .with_mutation(workout, |doc| mutation::toggle_set_completion(doc, set_id))
            .await
    }

    /// Returns the new document and the id of the appended set.
    pub async fn add_set(&self, workout: &Workout, exercise_index: usize) -> WorkoutResult<(Workout, String)> {
        self.reconciler
            .with_mutation(workout, |doc| mutation::add_set(doc, exercise_index))
            .await
    }

    pub async fn remove_set(
        &self,
        workout: &Workout,
        exercise_index: usize,
        set_id: &str,
    ) -> WorkoutResult<Workout> {
        let (next, ()) = self
            .reconciler
            .with_mutation(workout, |doc| mutation::remove_set(doc, exercise_index, set_id))
            .await?;
        Ok(next)
    }

    pub async fn save_set(
        &self,
        workout: &Workout,
        exercise_index: usize,
        set_index: usize,
        weight: Option<f64>,
        reps: Option<f64>,
        rpe: Option<f64>,
    ) -> WorkoutResult<Workout> {
        let (next, ()) = self
            .reconciler
            .with_mutation(workout, |doc| {
                mutation::save_set(doc, exercise_index, set_index, weight, reps, rpe)
            })
            .await?;
        Ok(next)
    }

    // -- Completion ---

    /// Finish a workout: record it in local history, clear the current slot,
    /// then push it remotely or queue it for a later sync.
    ///
    /// Local history is written before any remote attempt, so a completed
    /// workout is never lost to a network failure.
    pub async fn complete_workout(&self, workout: &Workout) -> WorkoutResult<Completion> {
        if workout.status.is_finished() {
            return Err(WorkoutError::WorkoutFinished(workout.id.clone()));
        }
        let current = self.store.current_workout().await?;
        if let Some(current) = current.filter(|c| c.id != workout.id) {
            return Err(WorkoutError::WorkoutMismatch {
                given: workout.id.clone(),
                current: current.id,
            });
        }

        let now = Utc::now();
        let mut done = workout.clone();
        done.status = WorkoutStatus::Completed;
        done.completed_at = Some(now);
        done.duration = Some(
            done.started_at
                .map(|start| (now - start).num_seconds().max(0))
                .unwrap_or(0),
        );

        let mut history = self.store.history().await?;
        records::mark_personal_records(&mut done, &history);
        done.total_volume = done.compute_total_volume();

        history.retain(|w| w.id != done.id);
        history.insert(0, done.clone());
        self.store.put_history(&history).await?;
        self.store.mark_recently_completed().await?;
        self.store.clear_current_workout().await?;
        tracing::info!(
            "Completed workout {} (volume {}, {}s)",
            done.id,
            done.total_volume,
            done.duration.unwrap_or(0)
        );

        let outcome = match self.sync_target().await {
            Some((remote, session)) => match push_workout(remote.as_ref(), &session.user_id, &done).await {
                Ok(()) => {
                    tracing::info!("Synced workout {}", done.id);
                    SyncOutcome::Synced
                }
                Err(e) => {
                    tracing::warn!("Failed to sync workout {}, queueing: {e}", done.id);
                    self.enqueue(&done).await?;
                    SyncOutcome::Queued
                }
            },
            None => {
                tracing::info!("Offline or signed out, queueing workout {}", done.id);
                self.enqueue(&done).await?;
                SyncOutcome::Queued
            }
        };

        Ok(Completion {
            workout: done,
            outcome,
        })
    }

    async fn enqueue(&self, workout: &Workout) -> WorkoutResult<()> {
        let mut queue = self.store.pending_syncs().await?;
        match queue.iter_mut().find(|w| w.id == workout.id) {
            Some(existing) => *existing = workout.clone(),
            None => queue.push(workout.clone()),
        }
        self.store.put_pending_syncs(&queue).await?;
        Ok(())
    }

    /// Abandon a workout. History and the sync queue are not touched.
    pub async fn cancel_workout(&self, workout: &Workout) -> WorkoutResult<Workout> {
        if workout.status.is_finished() {
            return Err(WorkoutError::WorkoutFinished(workout.id.clone()));
        }
        match self.store.current_workout().await? {
            Some(current) if current.id != workout.id => {
                return Err(WorkoutError::WorkoutMismatch {
                    given: workout.id.clone(),
                    current: current.id,
                });
            }
            Some(_) => self.store.clear_current_workout().await?,
            None => {}
        }
        let mut cancelled = workout.clone();
        cancelled.status = WorkoutStatus::Cancelled;
        tracing::info!("Cancelled workout {}", cancelled.id);
        Ok(cancelled)
    }

    /// Read and clear the one-shot "a workout was just completed" flag.
    pub async fn take_recently_completed(&self) -> WorkoutResult<bool> {
        Ok(self.store.take_recently_completed().await?)
    }

    // -- Pending sync queue ---

    pub async fn pending_count(&self) -> WorkoutResult<usize> {
        Ok(self.store.pending_syncs().await?.len())
    }

    /// Push every queued workout, keeping the ones that fail.
    ///
    /// Failures are collected in the report; one failing workout never stops
    /// the others. Nothing is attempted while offline or signed out.
    pub async fn sync_pending_workouts(&self) -> SyncReport {
        let queue = match self.store.pending_syncs().await {
            Ok(queue) => queue,
            Err(e) => {
                tracing::error!("Failed to read pending sync queue: {e}");
                return SyncReport::default();
            }
        };
        let mut report = SyncReport {
            remaining: queue.len(),
            ..SyncReport::default()
        };
        if queue.is_empty() {
            return report;
        }
        let Some((remote, session)) = self.sync_target().await else {
            tracing::debug!("Skipping sync of {} queued workouts: offline", queue.len());
            return report;
        };

        for workout in &queue {
            match push_workout(remote.as_ref(), &session.user_id, workout).await {
                Ok(()) => report.synced.push(workout.id.clone()),
                Err(e) => {
                    tracing::warn!("Failed to sync queued workout {}: {e}", workout.id);
                    report.failed.push(SyncFailure {
                        workout_id: workout.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        // Re-read so entries queued during the pass survive.
        match self.store.pending_syncs().await {
            Ok(mut latest) => {
                latest.retain(|w| !report.synced.contains(&w.id));
                report.remaining = latest.len();
                if !report.synced.is_empty() {
                    if let Err(e) = self.store.put_pending_syncs(&latest).await {
                        tracing::error!("Failed to update pending sync queue: {e}");
                    }
                }
            }
            Err(e) => tracing::error!("Failed to re-read pending sync queue: {e}"),
        }

        tracing::info!(
            "Sync pass: {} synced, {} failed, {} remaining",
            report.synced.len(),
            report.failed.len(),
            report.remaining
        );
        report
    }

    // -- History ---

    /// Completed workouts, newest first.
    ///
    /// Online: remote history merged over local history (remote wins by id,
    /// local-only entries kept) and written back as the new local cache.
    /// Offline: the local cache, enriched from the cached exercise catalog.
    pub async fn get_workout_history(&self) -> WorkoutResult<Vec<Workout>> {
        let mut local = self.store.history().await?;

        if let Some((remote, session)) = self.sync_target().await {
            match remote.fetch_workouts(&session.user_id).await {
                Ok(rows) => {
                    let fetched: Vec<Workout> = rows
                        .into_iter()
                        .map(convert::workout_from_remote)
                        .filter(|w| match w.validate() {
                            Ok(()) => true,
                            Err(reason) => {
                                tracing::warn!("Skipping remote workout {}: {reason}", w.id);
                                false
                            }
                        })
                        .collect();
                    let mut merged = merge_by_identity(fetched, &local);
                    sort_history(&mut merged);
                    self.store.put_history(&merged).await?;
                    return Ok(merged);
                }
                Err(e) => tracing::warn!("Failed to fetch remote history, using local: {e}"),
            }
        }

        match self.store.exercise_details_cache().await {
            Ok(cache) => records::enrich_from_catalog(&mut local, &cache),
            Err(e) => tracing::warn!("Exercise cache unreadable, skipping enrichment: {e}"),
        }
        Ok(local)
    }

    // -- Templates ---

    pub async fn get_workout_templates(&self) -> WorkoutResult<Vec<WorkoutTemplate>> {
        let local = self.store.templates().await?;
        let Some((remote, session)) = self.sync_target().await else {
            return Ok(local);
        };
        match remote.fetch_templates(&session.user_id).await {
            Ok(rows) => {
                let fetched: Vec<WorkoutTemplate> = rows
                    .into_iter()
                    .map(convert::template_from_remote)
                    .filter(|t| match t.validate() {
                        Ok(()) => true,
                        Err(reason) => {
                            tracing::warn!("Skipping remote template {}: {reason}", t.id);
                            false
                        }
                    })
                    .collect();
                let merged = merge_by_identity(fetched, &local);
                self.store.put_templates(&merged).await?;
                Ok(merged)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch remote templates, using local: {e}");
                Ok(local)
            }
        }
    }

    async fn find_template(&self, template_id: &str) -> WorkoutResult<WorkoutTemplate> {
        if let Some(t) = self
            .store
            .templates()
            .await?
            .into_iter()
            .find(|t| t.id == template_id)
        {
            return Ok(t);
        }
        if let Some(remote) = self.online_remote().await {
            match remote.fetch_template(template_id).await {
                Ok(Some(row)) => return Ok(convert::template_from_remote(row)),
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to fetch template {template_id}: {e}"),
            }
        }
        Err(WorkoutError::TemplateNotFound(template_id.to_string()))
    }

    /// Instantiate a template as the new current workout.
    pub async fn create_workout_from_template(&self, template_id: &str) -> WorkoutResult<Workout> {
        self.ensure_slot_free().await?;
        let template = self.find_template(template_id).await?;
        let history = self.store.history().await?;
        let mut workout = convert::workout_from_template(&template, |exercise_id| {
            records::previous_performance(&history, exercise_id)
        });
        if let Ok(cache) = self.store.exercise_details_cache().await {
            records::enrich_from_catalog(std::slice::from_mut(&mut workout), &cache);
        }
        self.store.put_current_workout(&workout, true).await?;
        tracing::info!("Started workout {} from template {}", workout.id, template.id);
        Ok(workout)
    }

    /// Store the workout's exercise layout as a reusable template.
    pub async fn save_workout_as_template(
        &self,
        workout: &Workout,
        name: &str,
        description: &str,
    ) -> WorkoutResult<WorkoutTemplate> {
        if name.trim().is_empty() {
            return Err(WorkoutError::Validation("template name must not be blank".into()));
        }
        if workout.exercises.is_empty() {
            return Err(WorkoutError::Validation(
                "a template needs at least one exercise".into(),
            ));
        }
        let template = convert::template_from_workout(workout, name, description);
        template.validate().map_err(WorkoutError::Validation)?;

        let mut templates = self.store.templates().await?;
        templates.push(template.clone());
        self.store.put_templates(&templates).await?;
        tracing::info!("Saved template {} ({})", template.id, template.name);

        if let Some((remote, session)) = self.sync_target().await {
            if let Err(e) = push_template(remote.as_ref(), &session.user_id, &template).await {
                tracing::warn!("Failed to push template {}, kept locally: {e}", template.id);
            }
        }
        Ok(template)
    }

    pub async fn delete_template(&self, template_id: &str) -> WorkoutResult<()> {
        let mut templates = self.store.templates().await?;
        let before = templates.len();
        templates.retain(|t| t.id != template_id);
        let removed_locally = templates.len() != before;
        if removed_locally {
            self.store.put_templates(&templates).await?;
        }

        let mut removed_remotely = false;
        if let Some((remote, _)) = self.sync_target().await {
            match remote.delete_template(template_id).await {
                Ok(()) => removed_remotely = true,
                Err(e) => tracing::warn!("Failed to delete remote template {template_id}: {e}"),
            }
        }

        if removed_locally || removed_remotely {
            tracing::info!("Deleted template {template_id}");
            Ok(())
        } else {
            Err(WorkoutError::TemplateNotFound(template_id.to_string()))
        }
    }

    // -- Exercise catalog ---

    /// Read-through lookup of one catalog exercise.
    ///
    /// Fresh cache hits skip the network. Stale or missing entries are fetched
    /// when online; otherwise the last cached copy (stale or not) is served.
    pub async fn get_exercise_details(&self, exercise_id: &str) -> Option<Exercise> {
        let mut cache = self.store.exercise_details_cache().await.unwrap_or_else(|e| {
            tracing::warn!("Exercise cache unreadable: {e}");
            Default::default()
        });
        let ttl = Duration::days(EXERCISE_CACHE_TTL_DAYS);
        if let Some(hit) = cache.get(exercise_id) {
            if Utc::now() - hit.timestamp < ttl {
                return Some(hit.data.clone());
            }
        }

        if let Some(remote) = self.online_remote().await {
            match remote.fetch_exercise(exercise_id).await {
                Ok(Some(row)) => {
                    let exercise = convert::exercise_from_row(row);
                    cache.insert(
                        exercise_id.to_string(),
                        CachedExercise {
                            data: exercise.clone(),
                            timestamp: Utc::now(),
                        },
                    );
                    if let Err(e) = self.store.put_exercise_details_cache(&cache).await {
                        tracing::warn!("Failed to cache exercise {exercise_id}: {e}");
                    }
                    return Some(exercise);
                }
                Ok(None) => tracing::debug!("Exercise {exercise_id} not in remote catalog"),
                Err(e) => tracing::warn!("Failed to fetch exercise {exercise_id}: {e}"),
            }
        }
        cache.remove(exercise_id).map(|c| c.data)
    }

    /// Full catalog, from remote when online, else the last snapshot, else empty.
    pub async fn get_exercise_library(&self) -> Vec<Exercise> {
        if let Some(remote) = self.online_remote().await {
            match remote.fetch_exercises().await {
                Ok(rows) => {
                    let snapshot = ExerciseLibraryCache {
                        timestamp: Utc::now(),
                        exercises: rows.into_iter().map(convert::exercise_from_row).collect(),
                    };
                    if let Err(e) = self.store.put_exercise_library_cache(&snapshot).await {
                        tracing::warn!("Failed to cache exercise library: {e}");
                    }
                    return snapshot.exercises;
                }
                Err(e) => tracing::warn!("Failed to fetch exercise library: {e}"),
            }
        }
        match self.store.exercise_library_cache().await {
            Ok(Some(snapshot)) => snapshot.exercises,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Exercise library cache unreadable: {e}");
                Vec::new()
            }
        }
    }
}

/// Write a workout and its children, replacing any earlier copy.
///
/// The parent row is upserted by the local id and existing children are
/// deleted first, so a retry after a partial failure never duplicates rows.
async fn push_workout(remote: &dyn RemoteDatabase, user_id: &str, workout: &Workout) -> RemoteResult<()> {
    remote
        .upsert_workout(&convert::workout_row(workout, user_id))
        .await?;
    remote.delete_exercise_details(&workout.id).await?;

    let detail_rows = convert::exercise_detail_rows(workout);
    if detail_rows.is_empty() {
        return Ok(());
    }
    let detail_ids = remote.insert_exercise_details(&detail_rows).await?;
    if detail_ids.len() != workout.exercises.len() {
        return Err(RemoteError::Decode(format!(
            "expected {} exercise detail ids, got {}",
            workout.exercises.len(),
            detail_ids.len()
        )));
    }

    let set_rows: Vec<_> = workout
        .exercises
        .iter()
        .zip(&detail_ids)
        .flat_map(|(exercise, detail_id)| convert::set_rows(exercise, detail_id))
        .collect();
    if !set_rows.is_empty() {
        remote.insert_sets(&set_rows).await?;
    }
    Ok(())
}

async fn push_template(remote: &dyn RemoteDatabase, user_id: &str, template: &WorkoutTemplate) -> RemoteResult<()> {
    remote
        .upsert_template(&convert::template_row(template, user_id))
        .await?;
    remote.delete_template_exercises(&template.id).await?;
    let rows = convert::template_exercise_rows(template);
    if !rows.is_empty() {
        remote.insert_template_exercises(&rows).await?;
    }
    Ok(())
}
