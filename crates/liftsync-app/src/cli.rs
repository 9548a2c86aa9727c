use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "liftsync", about = "LiftSync: offline-first workout logging")]
pub struct Cli {
    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a blank workout
    Start {
        #[arg(long, default_value = "Workout")]
        name: String,
    },

    /// Print the current workout
    Show,

    /// Append an exercise to the current workout
    AddExercise {
        #[arg(long)]
        exercise_id: String,
    },

    /// Remove an exercise by position (0-based)
    RemoveExercise {
        #[arg(long)]
        exercise: usize,
    },

    /// Append a set that repeats the last set's values
    AddSet {
        #[arg(long)]
        exercise: usize,
    },

    /// Remove a set by id
    RemoveSet {
        #[arg(long)]
        exercise: usize,
        #[arg(long)]
        set_id: String,
    },

    /// Set one numeric field of a set (empty value clears it)
    UpdateSet {
        #[arg(long)]
        set_id: String,
        /// weight, reps, or rpe
        #[arg(long)]
        field: String,
        #[arg(long, default_value = "")]
        value: String,
    },

    /// Flip a set between complete and incomplete
    ToggleSet {
        #[arg(long)]
        set_id: String,
    },

    /// Record weight and reps for a set and mark it complete
    SaveSet {
        #[arg(long)]
        exercise: usize,
        /// Set number (1-based)
        #[arg(long)]
        set: usize,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        reps: f64,
        #[arg(long)]
        rpe: Option<f64>,
    },

    /// Finish the current workout and sync or queue it
    Complete,

    /// Abandon the current workout
    Cancel,

    /// Push queued workouts to the remote store
    Sync,

    /// List completed workouts, newest first
    History,

    /// List workout templates
    Templates,

    /// Save the current workout's layout as a template
    SaveTemplate {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Start a workout from a template
    StartFromTemplate {
        #[arg(long)]
        id: String,
    },

    /// Delete a template
    DeleteTemplate {
        #[arg(long)]
        id: String,
    },

    /// Look up one catalog exercise
    Exercise {
        #[arg(long)]
        id: String,
    },

    /// List the exercise catalog
    Exercises,
}
