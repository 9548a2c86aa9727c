use liftsync_db::schema::Workout;
use liftsync_db::LocalStore;

use crate::error::{WorkoutError, WorkoutResult};

/// Makes each mutation of the current workout atomic from the caller's view.
///
/// The caller's document is never touched: the mutation runs on a private
/// clone, and that clone is persisted as a whole before it is handed back.
/// If the mutation fails, nothing is written.
#[derive(Clone)]
pub struct Reconciler {
    store: LocalStore,
    verify_writes: bool,
}

impl Reconciler {
    pub fn new(store: LocalStore, verify_writes: bool) -> Self {
        Self {
            store,
            verify_writes,
        }
    }

    /// Clone `current`, apply `mutate`, persist, and return the new document.
    ///
    /// `current` must be the workout occupying the current-workout slot and
    /// must not be finished.
    pub async fn with_mutation<T, F>(&self, current: &Workout, mutate: F) -> WorkoutResult<(Workout, T)>
    where
        F: FnOnce(&mut Workout) -> WorkoutResult<T>,
    {
        if current.status.is_finished() {
            return Err(WorkoutError::WorkoutFinished(current.id.clone()));
        }
        self.ensure_current(&current.id).await?;

        let mut next = current.clone();
        let out = mutate(&mut next)?;

        self.store
            .put_current_workout(&next, self.verify_writes)
            .await?;
        tracing::debug!("Persisted mutation of workout {}", next.id);
        Ok((next, out))
    }

    /// The stored current workout must exist and carry `workout_id`.
    async fn ensure_current(&self, workout_id: &str) -> WorkoutResult<()> {
        match self.store.current_workout().await? {
            Some(stored) if stored.id == workout_id => Ok(()),
            Some(stored) => Err(WorkoutError::WorkoutMismatch {
                given: workout_id.to_string(),
                current: stored.id,
            }),
            None => Err(WorkoutError::NoCurrentWorkout),
        }
    }
}
