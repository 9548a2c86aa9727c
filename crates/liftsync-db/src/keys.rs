/// Fixed keys of the local document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    CurrentWorkout,
    PendingWorkoutSyncs,
    WorkoutHistory,
    WorkoutTemplates,
    ExerciseDetailsCache,
    ExerciseLibraryCache,
    RecentlyCompletedWorkout,
}

impl StoreKey {
    pub const ALL: [StoreKey; 7] = [
        Self::CurrentWorkout,
        Self::PendingWorkoutSyncs,
        Self::WorkoutHistory,
        Self::WorkoutTemplates,
        Self::ExerciseDetailsCache,
        Self::ExerciseLibraryCache,
        Self::RecentlyCompletedWorkout,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentWorkout => "current_workout",
            Self::PendingWorkoutSyncs => "pending_workout_syncs",
            Self::WorkoutHistory => "workout_history",
            Self::WorkoutTemplates => "workout_templates",
            Self::ExerciseDetailsCache => "exercise_details_cache",
            Self::ExerciseLibraryCache => "exercise_library_cache",
            Self::RecentlyCompletedWorkout => "recently_completed_workout",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
