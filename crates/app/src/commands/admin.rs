//! The `quiz admin` commands.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use quiz_core::model::QuizConfigurationDraft;
use services::{AdminGate, AppServices, ConfigEditor, TierEdit};

#[derive(Args)]
pub struct AdminArgs {
    /// Admin password; prompted for when omitted
    #[arg(long, env = "QUIZ_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: AdminCommand,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Write the current configuration as JSON
    Export {
        #[arg(long)]
        out: PathBuf,
    },

    /// Replace the configuration with a JSON file
    Import {
        #[arg(long)]
        file: PathBuf,
    },

    /// Change a question's text
    EditQuestion {
        id: String,
        #[arg(long)]
        text: String,
    },

    /// Change an option's text
    EditOption {
        question: String,
        option: String,
        #[arg(long)]
        text: String,
    },

    /// Change fields of a result tier; an empty string clears optional fields
    EditTier {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        embed_html: Option<String>,
        #[arg(long)]
        redirect_url: Option<String>,
    },
}

pub async fn execute(services: &AppServices, args: AdminArgs) -> Result<()> {
    let gate = services
        .admin_gate()
        .context("admin commands need QUIZ_ADMIN_SECRET to be set")?;
    sign_in(gate, args.password)?;

    let store = services.store();
    store.revalidate().await;
    let mut editor = ConfigEditor::open(gate, &store.current())?;

    match args.command {
        AdminCommand::Export { out } => {
            let json = serde_json::to_string_pretty(editor.draft())?;
            fs::write(&out, json).with_context(|| format!("failed to write {}", out.display()))?;
            println!("Exported configuration to {}", out.display());
            return Ok(());
        }
        AdminCommand::Import { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let draft: QuizConfigurationDraft = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a quiz configuration", file.display()))?;
            editor.replace_draft(draft);
        }
        AdminCommand::EditQuestion { id, text } => editor.set_question_text(&id, text)?,
        AdminCommand::EditOption {
            question,
            option,
            text,
        } => editor.set_option_text(&question, &option, text)?,
        AdminCommand::EditTier {
            id,
            name,
            min,
            max,
            description,
            embed_html,
            redirect_url,
        } => {
            let edits = [
                name.map(TierEdit::Name),
                min.map(TierEdit::MinScore),
                max.map(TierEdit::MaxScore),
                description.map(TierEdit::Description),
                embed_html.map(|html| TierEdit::EmbedHtml(Some(html))),
                redirect_url.map(|url| TierEdit::RedirectUrl(Some(url))),
            ];
            for edit in edits.into_iter().flatten() {
                editor.edit_tier(&id, edit)?;
            }
        }
    }

    let saved = editor.commit(gate, &store).await?;
    println!(
        "Saved configuration ({} questions, {} results).",
        saved.question_count(),
        saved.results().len()
    );
    Ok(())
}

fn sign_in(gate: &AdminGate, password: Option<String>) -> Result<()> {
    if gate.is_authenticated() {
        return Ok(());
    }
    let mut input = match password {
        Some(password) => password,
        None => prompt_password()?,
    };
    gate.submit(&mut input)?;
    Ok(())
}

fn prompt_password() -> Result<String> {
    eprint!("Admin password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
