//! The `quiz seed` command.

use anyhow::{Result, bail};
use services::{AppServices, ConfigSource};

pub async fn execute(services: &AppServices, force: bool) -> Result<()> {
    let gateway = services.gateway();
    let loaded = if force {
        gateway.install_defaults().await
    } else {
        gateway.load_or_default().await
    };

    match loaded.source {
        ConfigSource::Remote => println!(
            "Database already holds a quiz ({} questions). Use --force to overwrite.",
            loaded.config.question_count()
        ),
        ConfigSource::Defaults { persisted: true } => println!(
            "Seeded built-in quiz ({} questions, {} results).",
            loaded.config.question_count(),
            loaded.config.results().len()
        ),
        ConfigSource::Defaults { persisted: false } => {
            bail!("the built-in quiz was not written to the database; see the log for details")
        }
        other => println!("Configuration source: {other:?}"),
    }
    Ok(())
}
