use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use liftsync_core::{StaticConnectivity, StaticSession};
use liftsync_db::file::FileStore;
use liftsync_db::mock::MemoryStore;
use liftsync_db::schema::{Workout, WorkoutStatus};
use liftsync_db::{KeyValueStore, LocalStore};
use liftsync_engine::{SetField, SyncOutcome, WorkoutError, WorkoutService};
use liftsync_remote::mock::MockRemote;
use liftsync_remote::rows::{ExerciseDetailRow, RemoteExerciseDetail, RemoteWorkout, SetRow, WorkoutRow};

const USER: &str = "user-1";

fn service(
    kv: Arc<dyn KeyValueStore>,
    remote: Arc<MockRemote>,
    online: Arc<StaticConnectivity>,
) -> WorkoutService {
    WorkoutService::new(LocalStore::new(kv), online, Arc::new(StaticSession::new(USER)))
        .with_remote(remote)
}

/// Start a workout with one exercise per (exercise id, set count), all sets recorded.
async fn recorded_workout(svc: &WorkoutService, name: &str, layout: &[(&str, usize)]) -> Workout {
    let mut w = svc.start_workout(name).await.unwrap();
    for (ei, &(exercise_id, sets)) in layout.iter().enumerate() {
        let (next, index) = svc.add_exercise(&w, exercise_id).await.unwrap();
        assert_eq!(index, ei);
        w = next;
        for _ in 1..sets {
            w = svc.add_set(&w, ei).await.unwrap().0;
        }
        for si in 0..sets {
            w = svc
                .save_set(&w, ei, si, Some(50.0 + si as f64), Some(10.0), None)
                .await
                .unwrap();
        }
    }
    w
}

fn remote_workout(id: &str, name: &str, minutes_ago: i64) -> RemoteWorkout {
    RemoteWorkout {
        row: WorkoutRow {
            id: id.into(),
            user_id: USER.into(),
            name: name.into(),
            notes: None,
            duration: Some(600),
            status: "completed".into(),
            completed_at: Some(Utc::now() - Duration::minutes(minutes_ago)),
        },
        workout_exercise_details: vec![RemoteExerciseDetail {
            row: ExerciseDetailRow {
                id: None,
                workout_id: id.into(),
                exercise_id: "deadlift".into(),
                order: 0,
                notes: None,
                superset_id: None,
                superset_type: None,
                rest_between_sets: None,
            },
            workout_sets: vec![SetRow {
                workout_exercise_details_id: String::new(),
                set_number: 1,
                reps: Some(3.0),
                weight: Some(180.0),
                duration: None,
                completed: true,
                rpe: Some(9.0),
                is_pr: false,
            }],
            exercise: None,
        }],
    }
}

#[tokio::test]
async fn offline_completion_is_durable_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(MockRemote::new());
    let online = Arc::new(StaticConnectivity::new(false));

    let completed_id = {
        let kv = Arc::new(FileStore::open(dir.path()).await.unwrap());
        let svc = service(kv, remote.clone(), online.clone());
        let w = recorded_workout(&svc, "Legs", &[("squat", 3)]).await;
        let done = svc.complete_workout(&w).await.unwrap();
        assert_eq!(done.outcome, SyncOutcome::Queued);
        done.workout.id
    };
    assert_eq!(remote.call_count(), 0);

    let kv = Arc::new(FileStore::open(dir.path()).await.unwrap());
    let svc = service(kv, remote.clone(), online.clone());
    assert!(svc.current_workout().await.unwrap().is_none());
    assert_eq!(svc.pending_count().await.unwrap(), 1);
    let history = svc.get_workout_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, completed_id);
    assert_eq!(history[0].status, WorkoutStatus::Completed);

    // Still offline: nothing is attempted and nothing is lost.
    let report = svc.sync_pending_workouts().await;
    assert!(report.synced.is_empty());
    assert_eq!(report.remaining, 1);

    online.set_online(true);
    let report = svc.sync_pending_workouts().await;
    assert_eq!(report.synced, vec![completed_id.clone()]);
    assert_eq!(report.remaining, 0);
    assert_eq!(svc.pending_count().await.unwrap(), 0);
    assert_eq!(remote.set_count(&completed_id), 3);
}

#[tokio::test]
async fn remote_history_wins_by_identity() {
    let kv = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let online = Arc::new(StaticConnectivity::new(false));
    let svc = service(kv, remote.clone(), online.clone());

    let local_only = recorded_workout(&svc, "Pending", &[("bench", 1)]).await;
    let local_only = svc.complete_workout(&local_only).await.unwrap().workout;
    let shared = recorded_workout(&svc, "Local A", &[("bench", 1)]).await;
    let shared = svc.complete_workout(&shared).await.unwrap().workout;

    remote.seed_workout(remote_workout(&shared.id, "Remote A", 60));
    remote.seed_workout(remote_workout("b", "Remote B", 30));

    online.set_online(true);
    let history = svc.get_workout_history().await.unwrap();

    let ids: Vec<&str> = history.iter().map(|w| w.id.as_str()).collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(unique.len(), 3);
    assert!(unique.contains(local_only.id.as_str()));
    assert!(unique.contains("b"));

    let a = history.iter().find(|w| w.id == shared.id).unwrap();
    assert_eq!(a.name, "Remote A");
    assert_eq!(a.exercises[0].exercise_id, "deadlift");

    // Newest completion first: local-only (just now), B (30m), A (60m).
    assert_eq!(ids, vec![local_only.id.as_str(), "b", shared.id.as_str()]);

    // The merged list replaced the local cache.
    online.set_online(false);
    let cached = svc.get_workout_history().await.unwrap();
    assert_eq!(cached, history);
}

#[tokio::test]
async fn remote_history_tolerates_malformed_rows() {
    let kv = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let online = Arc::new(StaticConnectivity::new(true));
    let svc = service(kv, remote.clone(), online.clone());

    let mut doubled = remote_workout("dup", "Doubled", 10);
    let mut second = doubled.workout_exercise_details[0].workout_sets[0].clone();
    second.weight = Some(190.0);
    doubled.workout_exercise_details[0].workout_sets.push(second);
    remote.seed_workout(doubled);
    remote.seed_workout(remote_workout("", "Nameless", 20));

    let history = svc.get_workout_history().await.unwrap();
    assert_eq!(history.len(), 1);
    let sets = &history[0].exercises[0].sets;
    let numbers: Vec<u32> = sets.iter().map(|s| s.set_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_ne!(sets[0].id, sets[1].id);
    assert_eq!(sets[1].weight, Some(190.0));

    online.set_online(false);
    assert_eq!(svc.get_workout_history().await.unwrap(), history);
}

#[tokio::test]
async fn add_save_then_undo_completion() {
    let kv = Arc::new(MemoryStore::new());
    let svc = service(kv, Arc::new(MockRemote::new()), Arc::new(StaticConnectivity::new(false)));

    let w = svc.start_workout("Scenario").await.unwrap();
    let (w, _) = svc.add_exercise(&w, "x").await.unwrap();
    let s1 = w.exercises[0].sets[0].clone();
    assert_eq!((s1.weight, s1.reps), (None, None));

    let (w, s2_id) = svc.add_set(&w, 0).await.unwrap();
    let sets = &w.exercises[0].sets;
    assert_eq!(sets.len(), 2);
    assert_eq!((sets[0].set_number, sets[1].set_number), (1, 2));
    assert_eq!((sets[1].weight, sets[1].reps), (None, None));

    let w = svc
        .save_set(&w, 0, 1, Some(100.0), Some(5.0), Some(7.0))
        .await
        .unwrap();
    let s2 = &w.exercises[0].sets[1];
    assert_eq!(s2.id, s2_id);
    assert_eq!((s2.weight, s2.reps, s2.rpe), (Some(100.0), Some(5.0), Some(7.0)));
    assert!(s2.is_complete);
    assert!(s2.completed_at.is_some());

    let (w, state) = svc.toggle_set_completion(&w, &s2_id).await.unwrap();
    assert!(!state);
    let s2 = &w.exercises[0].sets[1];
    assert!(!s2.is_complete);
    assert!(s2.completed_at.is_none());
    assert_eq!((s2.weight, s2.reps, s2.rpe), (Some(100.0), Some(5.0), Some(7.0)));

    assert_eq!(svc.current_workout().await.unwrap().unwrap(), w);
}

#[tokio::test]
async fn remove_middle_set_renumbers_and_last_set_is_kept() {
    let kv = Arc::new(MemoryStore::new());
    let svc = service(kv, Arc::new(MockRemote::new()), Arc::new(StaticConnectivity::new(false)));

    let w = svc.start_workout("Renumber").await.unwrap();
    let (w, _) = svc.add_exercise(&w, "row").await.unwrap();
    let (w, _) = svc.add_set(&w, 0).await.unwrap();
    let (w, _) = svc.add_set(&w, 0).await.unwrap();
    let ids: Vec<String> = w.exercises[0].sets.iter().map(|s| s.id.clone()).collect();

    let w = svc.remove_set(&w, 0, &ids[1]).await.unwrap();
    let remaining: Vec<(&str, u32)> = w.exercises[0]
        .sets
        .iter()
        .map(|s| (s.id.as_str(), s.set_number))
        .collect();
    assert_eq!(remaining, vec![(ids[0].as_str(), 1), (ids[2].as_str(), 2)]);

    let w = svc.remove_set(&w, 0, &ids[0]).await.unwrap();
    let before = w.clone();
    assert!(matches!(
        svc.remove_set(&w, 0, &ids[2]).await,
        Err(WorkoutError::CannotRemoveLastSet(_))
    ));
    assert_eq!(svc.current_workout().await.unwrap().unwrap(), before);
}

#[tokio::test]
async fn unknown_set_and_bad_input_are_typed_errors() {
    let kv = Arc::new(MemoryStore::new());
    let svc = service(kv, Arc::new(MockRemote::new()), Arc::new(StaticConnectivity::new(false)));
    let w = svc.start_workout("Errors").await.unwrap();
    let (w, _) = svc.add_exercise(&w, "curl").await.unwrap();
    let set_id = w.exercises[0].sets[0].id.clone();

    assert!(matches!(
        svc.toggle_set_completion(&w, "ghost").await,
        Err(WorkoutError::SetNotFound(_))
    ));
    assert!(matches!(
        svc.add_set(&w, 5).await,
        Err(WorkoutError::ExerciseNotFound(5))
    ));
    assert!(matches!(
        svc.save_set(&w, 0, 0, None, Some(5.0), None).await,
        Err(WorkoutError::Validation(_))
    ));

    let w = svc
        .update_set_field(&w, &set_id, SetField::Weight, "12,5")
        .await
        .unwrap();
    assert_eq!(w.exercises[0].sets[0].weight, Some(12.5));
    let w = svc
        .update_set_field(&w, &set_id, SetField::Weight, "abc")
        .await
        .unwrap();
    assert_eq!(w.exercises[0].sets[0].weight, None);
}

#[tokio::test]
async fn template_round_trip_across_devices() {
    let remote = Arc::new(MockRemote::new());
    let online = Arc::new(StaticConnectivity::new(true));
    let phone = service(Arc::new(MemoryStore::new()), remote.clone(), online.clone());

    let w = recorded_workout(&phone, "Upper", &[("bench", 3), ("pullup", 4)]).await;
    let template = phone.save_workout_as_template(&w, "Upper A", "").await.unwrap();
    assert_eq!(remote.template_count(), 1);

    // A second device with an empty local store sees the template remotely.
    let tablet = service(Arc::new(MemoryStore::new()), remote.clone(), online.clone());
    let templates = tablet.get_workout_templates().await.unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].id, template.id);

    let fresh = tablet.create_workout_from_template(&template.id).await.unwrap();
    assert_eq!(fresh.status, WorkoutStatus::InProgress);
    assert_eq!(fresh.template_id.as_deref(), Some(template.id.as_str()));
    let counts: Vec<usize> = fresh.exercises.iter().map(|e| e.sets.len()).collect();
    assert_eq!(counts, vec![3, 4]);

    let old_ids: HashSet<String> = std::iter::once(w.id.clone())
        .chain(w.exercises.iter().map(|e| e.id.clone()))
        .chain(w.exercises.iter().flat_map(|e| e.sets.iter().map(|s| s.id.clone())))
        .collect();
    assert!(!old_ids.contains(&fresh.id));
    for exercise in &fresh.exercises {
        assert!(!old_ids.contains(&exercise.id));
        for set in &exercise.sets {
            assert!(!old_ids.contains(&set.id));
            assert_eq!((set.weight, set.reps, set.is_complete), (None, None, false));
        }
    }
    assert_eq!(tablet.current_workout().await.unwrap().unwrap(), fresh);
}

#[tokio::test]
async fn sync_continues_past_failures_and_retries_without_duplicates() {
    let kv = Arc::new(MemoryStore::new());
    let remote = Arc::new(MockRemote::new());
    let online = Arc::new(StaticConnectivity::new(false));
    let svc = service(kv, remote.clone(), online.clone());

    let mut ids = Vec::new();
    for name in ["One", "Two", "Three"] {
        let w = recorded_workout(&svc, name, &[("bench", 2), ("row", 2)]).await;
        ids.push(svc.complete_workout(&w).await.unwrap().workout.id);
    }
    assert_eq!(svc.pending_count().await.unwrap(), 3);

    online.set_online(true);
    remote.fail_set_inserts_for(&ids[1]);
    let report = svc.sync_pending_workouts().await;
    assert_eq!(report.synced, vec![ids[0].clone(), ids[2].clone()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].workout_id, ids[1]);
    assert_eq!(report.remaining, 1);

    // The failed workout left its parent rows behind; the retry replaces them.
    assert_eq!(remote.detail_count(&ids[1]), 2);
    remote.clear_set_insert_failures();
    let report = svc.sync_pending_workouts().await;
    assert_eq!(report.synced, vec![ids[1].clone()]);
    assert_eq!(report.remaining, 0);

    assert_eq!(remote.workout_count(), 3);
    for id in &ids {
        assert_eq!(remote.detail_count(id), 2);
        assert_eq!(remote.set_count(id), 4);
    }
}

#[tokio::test]
async fn completion_requires_the_current_workout() {
    let kv = Arc::new(MemoryStore::new());
    let svc = service(kv, Arc::new(MockRemote::new()), Arc::new(StaticConnectivity::new(false)));
    let current = svc.start_workout("Current").await.unwrap();
    let stranger = Workout::new("Stranger");

    assert!(matches!(
        svc.complete_workout(&stranger).await,
        Err(WorkoutError::WorkoutMismatch { .. })
    ));
    assert!(matches!(
        svc.add_set(&stranger, 0).await,
        Err(WorkoutError::WorkoutMismatch { .. })
    ));
    assert_eq!(svc.current_workout().await.unwrap().unwrap(), current);
}

#[tokio::test]
async fn signed_out_completion_is_queued() {
    let remote = Arc::new(MockRemote::new());
    let svc = WorkoutService::new(
        LocalStore::new(Arc::new(MemoryStore::new())),
        Arc::new(StaticConnectivity::new(true)),
        Arc::new(StaticSession::new("")),
    )
    .with_remote(remote.clone());

    let w = recorded_workout(&svc, "Anon", &[("bench", 1)]).await;
    let done = svc.complete_workout(&w).await.unwrap();
    assert_eq!(done.outcome, SyncOutcome::Queued);
    assert_eq!(remote.workout_count(), 0);
    assert_eq!(svc.pending_count().await.unwrap(), 1);
}
