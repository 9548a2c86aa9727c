//! Typed document layer over a raw [`KeyValueStore`].
//!
//! Every write serializes a complete snapshot and replaces the stored value in
//! one call. Documents are validated before serialization so a structurally
//! invalid document is rejected instead of partially written.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DbError, DbResult};
use crate::keys::StoreKey;
use crate::schema::{
    ExerciseDetailsCache, ExerciseLibraryCache, Workout, WorkoutTemplate,
};
use crate::traits::KeyValueStore;

/// A value that can be persisted as a whole document.
pub trait StoredDocument: Serialize + DeserializeOwned + PartialEq {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl StoredDocument for Workout {
    fn validate(&self) -> Result<(), String> {
        Workout::validate(self)
    }
}

impl StoredDocument for Vec<Workout> {
    fn validate(&self) -> Result<(), String> {
        self.iter().try_for_each(Workout::validate)
    }
}

impl StoredDocument for Vec<WorkoutTemplate> {
    fn validate(&self) -> Result<(), String> {
        self.iter().try_for_each(WorkoutTemplate::validate)
    }
}

impl StoredDocument for ExerciseDetailsCache {}
impl StoredDocument for ExerciseLibraryCache {}

const FLAG_SET: &str = "true";

#[derive(Clone)]
pub struct LocalStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load and decode the document under `key`; `Ok(None)` when absent.
    pub async fn load<T: DeserializeOwned>(&self, key: StoreKey) -> DbResult<Option<T>> {
        match self.kv.get(key.as_str()).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Validate, serialize, and replace the document under `key`.
    pub async fn save<T: StoredDocument>(&self, key: StoreKey, doc: &T) -> DbResult<()> {
        doc.validate().map_err(|reason| DbError::InvalidDocument {
            key: key.to_string(),
            reason,
        })?;
        let raw = serde_json::to_string(doc)?;
        self.kv.set(key.as_str(), raw).await
    }

    /// `save` followed by a read-back that must decode to an equal document.
    pub async fn save_verified<T: StoredDocument>(&self, key: StoreKey, doc: &T) -> DbResult<()> {
        self.save(key, doc).await?;
        match self.load::<T>(key).await? {
            Some(stored) if &stored == doc => Ok(()),
            _ => {
                tracing::error!("Read-back of {key} does not match the document just written");
                Err(DbError::VerificationFailed(key.to_string()))
            }
        }
    }

    pub async fn remove(&self, key: StoreKey) -> DbResult<()> {
        self.kv.remove(key.as_str()).await
    }

    // -- Current workout ---

    pub async fn current_workout(&self) -> DbResult<Option<Workout>> {
        self.load(StoreKey::CurrentWorkout).await
    }

    pub async fn put_current_workout(&self, workout: &Workout, verify: bool) -> DbResult<()> {
        if verify {
            self.save_verified(StoreKey::CurrentWorkout, workout).await
        } else {
            self.save(StoreKey::CurrentWorkout, workout).await
        }
    }

    pub async fn clear_current_workout(&self) -> DbResult<()> {
        self.remove(StoreKey::CurrentWorkout).await
    }

    // -- Lists ---

    async fn load_list<T: DeserializeOwned>(&self, key: StoreKey) -> DbResult<Vec<T>> {
        Ok(self.load(key).await?.unwrap_or_default())
    }

    pub async fn pending_syncs(&self) -> DbResult<Vec<Workout>> {
        self.load_list(StoreKey::PendingWorkoutSyncs).await
    }

    pub async fn put_pending_syncs(&self, queue: &Vec<Workout>) -> DbResult<()> {
        self.save(StoreKey::PendingWorkoutSyncs, queue).await
    }

    pub async fn history(&self) -> DbResult<Vec<Workout>> {
        self.load_list(StoreKey::WorkoutHistory).await
    }

    pub async fn put_history(&self, history: &Vec<Workout>) -> DbResult<()> {
        self.save(StoreKey::WorkoutHistory, history).await
    }

    pub async fn templates(&self) -> DbResult<Vec<WorkoutTemplate>> {
        self.load_list(StoreKey::WorkoutTemplates).await
    }

    pub async fn put_templates(&self, templates: &Vec<WorkoutTemplate>) -> DbResult<()> {
        self.save(StoreKey::WorkoutTemplates, templates).await
    }

    // -- Exercise catalog caches ---

    pub async fn exercise_details_cache(&self) -> DbResult<ExerciseDetailsCache> {
        Ok(self
            .load(StoreKey::ExerciseDetailsCache)
            .await?
            .unwrap_or_default())
    }

    pub async fn put_exercise_details_cache(&self, cache: &ExerciseDetailsCache) -> DbResult<()> {
        self.save(StoreKey::ExerciseDetailsCache, cache).await
    }

    pub async fn exercise_library_cache(&self) -> DbResult<Option<ExerciseLibraryCache>> {
        self.load(StoreKey::ExerciseLibraryCache).await
    }

    pub async fn put_exercise_library_cache(&self, cache: &ExerciseLibraryCache) -> DbResult<()> {
        self.save(StoreKey::ExerciseLibraryCache, cache).await
    }

    // -- One-shot flag ---

    pub async fn mark_recently_completed(&self) -> DbResult<()> {
        self.kv
            .set(StoreKey::RecentlyCompletedWorkout.as_str(), FLAG_SET.to_string())
            .await
    }

    /// Read and clear the recently-completed flag.
    pub async fn take_recently_completed(&self) -> DbResult<bool> {
        let key = StoreKey::RecentlyCompletedWorkout.as_str();
        let set = self.kv.get(key).await?.as_deref() == Some(FLAG_SET);
        if set {
            self.kv.remove(key).await?;
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryStore;
    use crate::schema::{WorkoutExercise, WorkoutStatus};

    fn store() -> (Arc<MemoryStore>, LocalStore) {
        let kv = Arc::new(MemoryStore::new());
        (kv.clone(), LocalStore::new(kv))
    }

    fn workout() -> Workout {
        let mut w = Workout::new("Pull");
        w.exercises.push(WorkoutExercise::new("row", 0, 3));
        w.exercises[0].sets[0].weight = Some(60.0);
        w.exercises[0].sets[0].reps = Some(8.0);
        w
    }

    #[tokio::test]
    async fn save_then_load_is_deep_equal() {
        let (_, store) = store();
        let w = workout();
        store.put_current_workout(&w, true).await.unwrap();
        let loaded = store.current_workout().await.unwrap().unwrap();
        assert_eq!(loaded, w);
    }

    #[tokio::test]
    async fn missing_keys_are_none_or_empty() {
        let (_, store) = store();
        assert!(store.current_workout().await.unwrap().is_none());
        assert!(store.history().await.unwrap().is_empty());
        assert!(store.exercise_details_cache().await.unwrap().is_empty());
        assert!(store.exercise_library_cache().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_document_is_not_written() {
        let (kv, store) = store();
        let mut w = workout();
        w.exercises[0].sets.clear();
        let err = store.put_current_workout(&w, false).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidDocument { .. }));
        assert_eq!(kv.write_count(), 0);
    }

    #[tokio::test]
    async fn verification_catches_silent_drop() {
        let (kv, store) = store();
        kv.drop_writes(true);
        let err = store.put_current_workout(&workout(), true).await.unwrap_err();
        assert!(matches!(err, DbError::VerificationFailed(_)));
    }

    #[tokio::test]
    async fn corrupt_document_is_a_storage_error() {
        let (kv, store) = store();
        kv.insert_raw("workout_history", "{not json");
        assert!(matches!(
            store.history().await.unwrap_err(),
            DbError::Serialization(_)
        ));
    }

    #[tokio::test]
    async fn recently_completed_flag_is_one_shot() {
        let (kv, store) = store();
        assert!(!store.take_recently_completed().await.unwrap());
        store.mark_recently_completed().await.unwrap();
        assert_eq!(kv.raw("recently_completed_workout").as_deref(), Some("true"));
        assert!(store.take_recently_completed().await.unwrap());
        assert!(!store.take_recently_completed().await.unwrap());
    }

    #[tokio::test]
    async fn lists_keep_order() {
        let (_, store) = store();
        let mut a = workout();
        a.status = WorkoutStatus::Completed;
        let b = workout();
        store.put_history(&vec![a.clone(), b.clone()]).await.unwrap();
        let ids: Vec<String> = store.history().await.unwrap().into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }
}
