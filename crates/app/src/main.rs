//! `quiz`: terminal front end for the assessment quiz.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use services::{AppServices, Clock};
use tracing_subscriber::EnvFilter;

mod commands;
mod db;

const DEFAULT_LOG_FILTER: &str = "quiz=info,services=info,storage=warn";

#[derive(Parser)]
#[command(name = "quiz", version, about = "Multi-question assessment quiz")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every subcommand.
#[derive(Args)]
struct Settings {
    /// SQLite database URL or file path
    #[arg(
        long = "db",
        env = "QUIZ_DB_URL",
        default_value = "sqlite://quiz.sqlite3",
        global = true
    )]
    db_url: String,

    /// Directory for the local configuration and answer cache
    #[arg(long, env = "QUIZ_CACHE_DIR", default_value = ".quiz-cache", global = true)]
    cache_dir: PathBuf,

    /// Secret that unlocks the admin commands
    #[arg(long, env = "QUIZ_ADMIN_SECRET", hide_env_values = true, global = true)]
    admin_secret: Option<String>,

    /// Pause after each answer, in milliseconds
    #[arg(long, env = "QUIZ_TRANSITION_MS", default_value = "400", global = true)]
    transition_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the quiz interactively
    Take {
        /// Continue the previously interrupted attempt
        #[arg(long)]
        resume: bool,
    },

    /// Print the current questions and result tiers
    Show,

    /// Write the built-in quiz to the database
    Seed {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Edit the quiz configuration
    Admin(commands::admin::AdminArgs),
}

impl Settings {
    async fn open(&self) -> Result<AppServices> {
        let db_url = db::normalize_sqlite_url(&self.db_url);
        db::prepare_sqlite_file(&db_url)?;
        tracing::debug!(%db_url, cache_dir = %self.cache_dir.display(), "opening quiz storage");
        let services = AppServices::new_sqlite(
            &db_url,
            &self.cache_dir,
            self.admin_secret.clone(),
            Clock::System,
        )
        .await
        .with_context(|| format!("failed to open database {db_url}"))?
        .with_transition_delay(Duration::from_millis(self.transition_ms));
        Ok(services)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.settings.open().await {
        Ok(services) => match cli.command {
            Commands::Take { resume } => commands::take::execute(&services, resume).await,
            Commands::Show => commands::show::execute(&services).await,
            Commands::Seed { force } => commands::seed::execute(&services, force).await,
            Commands::Admin(args) => commands::admin::execute(&services, args).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
