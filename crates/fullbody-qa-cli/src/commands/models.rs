//! Models command - inspect the models directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use fullbody_qa_adapters::models::MODELS;
use fullbody_qa_adapters::{list_models, models_dir};

use crate::config::AppConfig;

/// Arguments for the models command
#[derive(Args)]
pub struct ModelsArgs {
    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Models subcommands
#[derive(Subcommand)]
pub enum ModelsCommand {
    /// List known models and whether they are installed
    List,
    /// Print model directory path
    Path,
}

/// Run the models command.
#[allow(clippy::unnecessary_wraps)]
pub fn run(args: &ModelsArgs, config: &AppConfig) -> Result<()> {
    let dir = args
        .models_dir
        .clone()
        .or_else(|| config.models.dir.clone())
        .unwrap_or_else(models_dir);

    match args.command {
        ModelsCommand::List => print_models(&dir),
        ModelsCommand::Path => println!("{}", dir.display()),
    }
    Ok(())
}

fn print_models(dir: &std::path::Path) {
    let models = list_models(dir);

    println!("Models directory: {}", dir.display());
    println!();

    for model in &models {
        let status = if model.installed { "✓" } else { "✗" };
        let purpose = MODELS
            .iter()
            .find(|m| m.name == model.name)
            .map_or("", |m| m.purpose);
        println!("  {status} {} ({}) - {purpose}", model.name, model.path.display());
    }

    println!();
    let installed_count = models.iter().filter(|m| m.installed).count();
    println!("{}/{} models installed", installed_count, models.len());
}
