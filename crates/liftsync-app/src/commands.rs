use anyhow::{Context, Result};
use liftsync_core::config::AppConfig;
use liftsync_db::schema::Workout;
use liftsync_engine::{SetField, SyncOutcome, WorkoutService};

use crate::setup::create_service;

async fn require_current(service: &WorkoutService) -> Result<Workout> {
    service
        .current_workout()
        .await?
        .context("No workout in progress (run `liftsync start` first)")
}

fn print_workout_line(w: &Workout) {
    let when = w
        .completed_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into());
    println!(
        "{}\t{when}\t{}\t{} exercises\tvolume={}",
        w.id,
        w.name,
        w.exercises.len(),
        w.total_volume
    );
}

pub async fn start(config: &AppConfig, name: String) -> Result<()> {
    let service = create_service(config).await?;
    let workout = service.start_workout(&name).await?;
    println!("{}", workout.id);
    Ok(())
}

pub async fn show(config: &AppConfig) -> Result<()> {
    let service = create_service(config).await?;
    let workout = require_current(&service).await?;
    println!("{}", serde_json::to_string_pretty(&workout)?);
    Ok(())
}

pub async fn add_exercise(config: &AppConfig, exercise_id: String) -> Result<()> {
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    let (_, index) = service.add_exercise(&current, &exercise_id).await?;
    println!("{index}");
    Ok(())
}

pub async fn remove_exercise(config: &AppConfig, exercise: usize) -> Result<()> {
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    let next = service.remove_exercise(&current, exercise).await?;
    println!("Removed exercise {exercise} ({} left)", next.exercises.len());
    Ok(())
}

pub async fn add_set(config: &AppConfig, exercise: usize) -> Result<()> {
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    let (_, set_id) = service.add_set(&current, exercise).await?;
    println!("{set_id}");
    Ok(())
}

pub async fn remove_set(config: &AppConfig, exercise: usize, set_id: String) -> Result<()> {
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    let next = service.remove_set(&current, exercise, &set_id).await?;
    let left = next.exercises.get(exercise).map_or(0, |e| e.sets.len());
    println!("Removed {set_id} ({left} sets left)");
    Ok(())
}

pub async fn update_set(config: &AppConfig, set_id: String, field: String, value: String) -> Result<()> {
    let field: SetField = field.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    service
        .update_set_field(&current, &set_id, field, &value)
        .await?;
    println!("Updated {field} of {set_id}");
    Ok(())
}

pub async fn toggle_set(config: &AppConfig, set_id: String) -> Result<()> {
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    let (_, complete) = service.toggle_set_completion(&current, &set_id).await?;
    println!("{}", if complete { "complete" } else { "incomplete" });
    Ok(())
}

pub async fn save_set(
    config: &AppConfig,
    exercise: usize,
    set: usize,
    weight: f64,
    reps: f64,
    rpe: Option<f64>,
) -> Result<()> {
    if set == 0 {
        anyhow::bail!("Set numbers start at 1");
    }
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    service
        .save_set(&current, exercise, set - 1, Some(weight), Some(reps), rpe)
        .await?;
    println!("Saved set {set}: {weight} x {reps}");
    Ok(())
}

pub async fn complete(config: &AppConfig) -> Result<()> {
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    let done = service.complete_workout(&current).await?;
    let outcome = match done.outcome {
        SyncOutcome::Synced => "synced",
        SyncOutcome::Queued => "queued",
    };
    let prs = done
        .workout
        .exercises
        .iter()
        .flat_map(|e| e.sets.iter())
        .filter(|s| s.is_pr)
        .count();
    println!(
        "{}\t{outcome}\tvolume={}\tprs={prs}",
        done.workout.id, done.workout.total_volume
    );
    Ok(())
}

pub async fn cancel(config: &AppConfig) -> Result<()> {
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    let cancelled = service.cancel_workout(&current).await?;
    println!("Cancelled {}", cancelled.id);
    Ok(())
}

pub async fn sync(config: &AppConfig) -> Result<()> {
    let service = create_service(config).await?;
    let report = service.sync_pending_workouts().await;
    for failure in &report.failed {
        println!("failed\t{}\t{}", failure.workout_id, failure.error);
    }
    println!(
        "{} synced, {} failed, {} remaining",
        report.synced.len(),
        report.failed.len(),
        report.remaining
    );
    Ok(())
}

pub async fn history(config: &AppConfig) -> Result<()> {
    let service = create_service(config).await?;
    let history = service.get_workout_history().await?;
    for w in &history {
        print_workout_line(w);
    }
    println!("({} workouts)", history.len());
    Ok(())
}

pub async fn templates(config: &AppConfig) -> Result<()> {
    let service = create_service(config).await?;
    let templates = service.get_workout_templates().await?;
    for t in &templates {
        println!("{}\t{}\t{} exercises", t.id, t.name, t.exercises.len());
    }
    println!("({} templates)", templates.len());
    Ok(())
}

pub async fn save_template(config: &AppConfig, name: String, description: String) -> Result<()> {
    let service = create_service(config).await?;
    let current = require_current(&service).await?;
    let template = service
        .save_workout_as_template(&current, &name, &description)
        .await?;
    println!("{}", template.id);
    Ok(())
}

pub async fn start_from_template(config: &AppConfig, id: String) -> Result<()> {
    let service = create_service(config).await?;
    let workout = service.create_workout_from_template(&id).await?;
    println!("{}", workout.id);
    Ok(())
}

pub async fn delete_template(config: &AppConfig, id: String) -> Result<()> {
    let service = create_service(config).await?;
    service.delete_template(&id).await?;
    println!("Deleted {id}");
    Ok(())
}

pub async fn exercise(config: &AppConfig, id: String) -> Result<()> {
    let service = create_service(config).await?;
    match service.get_exercise_details(&id).await {
        Some(exercise) => println!("{}", serde_json::to_string_pretty(&exercise)?),
        None => anyhow::bail!("Exercise not found: {id}"),
    }
    Ok(())
}

pub async fn exercises(config: &AppConfig) -> Result<()> {
    let service = create_service(config).await?;
    let library = service.get_exercise_library().await;
    for e in &library {
        println!("{}\t{}", e.id, e.name);
    }
    println!("({} exercises)", library.len());
    Ok(())
}
