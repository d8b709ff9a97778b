//! LessonForge CLI
//!
//! Generates lessons from documents and tracks learner progress. Every
//! command prints JSON on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lessonforge_core::config::AppConfig;
use lessonforge_core::error::LessonForgeError;
use lessonforge_sdk::{LessonForge, SdkError};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lessonforge")]
#[command(about = "LessonForge - lessons and knowledge graphs from documents", long_about = None)]
struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config")]
    config: PathBuf,

    /// Overrides storage.data_dir
    #[arg(short, long)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and store lessons for a PDF, text or markdown file
    Generate {
        path: PathBuf,
    },

    /// Show the knowledge graph and lesson order without storing anything
    Graph {
        path: PathBuf,
    },

    /// List stored modules
    Modules,

    /// Show the lessons of a module
    Lessons {
        /// Module file name
        file: String,
    },

    /// Record a lesson completion
    Complete {
        /// Module file name
        file: String,

        /// Lesson key (`lesson-2`) or row id
        lesson: String,

        /// XP earned
        xp: u32,
    },

    /// Show progress statistics for a module
    Stats {
        /// Module file name
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    lessonforge_core::init_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    let forge = LessonForge::from_config(&config);

    match run(&forge, cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            tracing::error!(code = %err.error_code(), "{}", err);
            Err(err.into())
        }
    }
}

async fn run(forge: &LessonForge, command: Commands) -> Result<Value, SdkError> {
    let output = match command {
        Commands::Generate { path } => {
            let outcome = forge.generate(&path).await?;
            json!({
                "moduleFile": outcome.module_file,
                "alreadyStored": outcome.already_stored,
                "topics": outcome.analysis.topics.len(),
                "concepts": outcome.analysis.concepts.len(),
                "relationships": outcome.analysis.relationships.len(),
                "lessonRowIds": outcome.lesson_row_ids,
                "lessons": outcome.lessons,
            })
        }
        Commands::Graph { path } => {
            let curriculum = forge.graph(&path).await?;
            json!({
                "graph": curriculum.graph,
                "stats": curriculum.graph.stats(),
                "order": curriculum.order,
                "omitted": curriculum.omitted,
            })
        }
        Commands::Modules => json!(forge.modules().await?),
        Commands::Lessons { file } => json!(forge.lessons(&file).await?),
        Commands::Complete { file, lesson, xp } => json!(forge.complete(&file, &lesson, xp).await?),
        Commands::Stats { file } => json!(forge.stats(&file).await?),
    };
    Ok(output)
}
