mod cli;
mod commands;
mod setup;

use anyhow::Result;
use clap::Parser;
use liftsync_core::config::AppConfig;
use liftsync_core::lifecycle;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    lifecycle::init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref());
    lifecycle::log_startup(&config);

    let result = match cli.command {
        Commands::Start { name } => commands::start(&config, name).await,
        Commands::Show => commands::show(&config).await,
        Commands::AddExercise { exercise_id } => commands::add_exercise(&config, exercise_id).await,
        Commands::RemoveExercise { exercise } => commands::remove_exercise(&config, exercise).await,
        Commands::AddSet { exercise } => commands::add_set(&config, exercise).await,
        Commands::RemoveSet { exercise, set_id } => {
            commands::remove_set(&config, exercise, set_id).await
        }
        Commands::UpdateSet {
            set_id,
            field,
            value,
        } => commands::update_set(&config, set_id, field, value).await,
        Commands::ToggleSet { set_id } => commands::toggle_set(&config, set_id).await,
        Commands::SaveSet {
            exercise,
            set,
            weight,
            reps,
            rpe,
        } => commands::save_set(&config, exercise, set, weight, reps, rpe).await,
        Commands::Complete => commands::complete(&config).await,
        Commands::Cancel => commands::cancel(&config).await,
        Commands::Sync => commands::sync(&config).await,
        Commands::History => commands::history(&config).await,
        Commands::Templates => commands::templates(&config).await,
        Commands::SaveTemplate { name, description } => {
            commands::save_template(&config, name, description).await
        }
        Commands::StartFromTemplate { id } => commands::start_from_template(&config, id).await,
        Commands::DeleteTemplate { id } => commands::delete_template(&config, id).await,
        Commands::Exercise { id } => commands::exercise(&config, id).await,
        Commands::Exercises => commands::exercises(&config).await,
    };

    lifecycle::log_shutdown();
    result
}
