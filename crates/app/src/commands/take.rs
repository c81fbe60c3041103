//! The `quiz take` command.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use quiz_core::scoring::display_score;
use services::{AppServices, Clock, QuizSession, ResultOutcome, ReturnReason, SessionState};

const BACK: &str = ":back";
const RESTART: &str = ":restart";
const QUIT: &str = ":quit";

pub async fn execute(services: &AppServices, resume: bool) -> Result<()> {
    services.store().revalidate().await;
    let session = if resume {
        services.resume_session()?
    } else {
        services.start_session()?
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(session, services.clock(), &mut stdin.lock(), &mut stdout.lock()).await
}

/// Drive `session` from `input` until it completes or input ends.
async fn run(
    mut session: QuizSession,
    clock: Clock,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let mut line = String::new();
    loop {
        match session.state() {
            SessionState::Complete => break,
            SessionState::AwaitingTransition { ready_at } => {
                let wait = (ready_at - clock.now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;
                session.poll(clock.now());
                continue;
            }
            SessionState::Advancing => {
                session.poll(clock.now());
                continue;
            }
            SessionState::Idle => {}
        }

        print_question(&session, out)?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out, "\nProgress saved. Continue with `quiz take --resume`.")?;
            return Ok(());
        }

        match line.trim() {
            "" => {}
            BACK => {
                if !session.go_back()? {
                    writeln!(out, "Already at the first question.")?;
                }
            }
            RESTART => session.restart()?,
            QUIT => {
                writeln!(out, "Progress saved. Continue with `quiz take --resume`.")?;
                return Ok(());
            }
            choice => {
                let picked = session.current_question().and_then(|q| {
                    q.options()
                        .iter()
                        .find(|o| o.id().as_str().eq_ignore_ascii_case(choice))
                        .map(|o| o.id().clone())
                });
                match picked {
                    Some(option) => {
                        session.select_option(&option, clock.now())?;
                    }
                    None => writeln!(out, "No choice labelled {choice:?}.")?,
                }
            }
        }
    }

    print_outcome(&session.resolve_outcome()?, out)
}

fn print_question(session: &QuizSession, out: &mut impl Write) -> Result<()> {
    let Some(question) = session.current_question() else {
        return Ok(());
    };
    let progress = session.progress();
    writeln!(
        out,
        "\nQuestion {} of {} ({:.0}%)",
        progress.question_number, progress.total, progress.percent_complete
    )?;
    writeln!(out, "{}", question.prompt())?;
    for option in question.options() {
        writeln!(out, "  {}. {}", option.id().label(), option.text())?;
    }
    let back = if progress.can_go_back {
        format!(", {BACK}")
    } else {
        String::new()
    };
    write!(out, "Choice ({RESTART}{back}, {QUIT}): ")?;
    out.flush()?;
    Ok(())
}

fn print_outcome(outcome: &ResultOutcome, out: &mut impl Write) -> Result<()> {
    match outcome {
        ResultOutcome::Show { tier, score } => {
            writeln!(out, "\nYour score: {:.2}", display_score(*score))?;
            writeln!(out, "Result: {}", tier.name())?;
            if !tier.description().is_empty() {
                writeln!(out, "{}", tier.description())?;
            }
            if let Some(html) = tier.embed_html() {
                writeln!(out, "\n{html}")?;
            }
        }
        ResultOutcome::Redirect { tier, score, url } => {
            writeln!(out, "\nYour score: {:.2}", display_score(*score))?;
            writeln!(out, "Result: {}", tier.name())?;
            writeln!(out, "Continue at {url}")?;
        }
        ResultOutcome::ReturnToStart(ReturnReason::EmptyAnswerSet) => {
            writeln!(out, "\nNo answers recorded. Run `quiz take` to start.")?;
        }
        ResultOutcome::ReturnToStart(ReturnReason::NoMatchingTier { score }) => {
            writeln!(
                out,
                "\nNo result matches a score of {:.2}. Run `quiz take` to start again.",
                display_score(*score)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    use storage::cache::InMemoryCache;
    use storage::repository::Storage;

    fn services() -> AppServices {
        AppServices::from_parts(
            Storage::in_memory().quiz,
            Arc::new(InMemoryCache::new()),
            None,
            Clock::System,
        )
        .with_transition_delay(Duration::ZERO)
    }

    async fn play(services: &AppServices, script: &str) -> String {
        let session = services.start_session().unwrap();
        let mut out = Vec::new();
        run(session, services.clock(), &mut Cursor::new(script), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn full_run_prints_result() {
        let script = "c\n".repeat(11);
        let out = play(&services(), &script).await;
        assert!(out.contains("Question 1 of 11"));
        assert!(out.contains("  A. "));
        assert!(out.contains("Your score: 3.00"));
        assert!(out.contains("Result: Steadfast"));
    }

    #[tokio::test]
    async fn labels_are_case_insensitive_and_back_works() {
        let script = format!("E\n{BACK}\na\n{}", "a\n".repeat(10));
        let out = play(&services(), &script).await;
        assert!(out.contains("Result: Seeking"));
    }

    #[tokio::test]
    async fn end_of_input_saves_progress() {
        let services = services();
        let out = play(&services, "b\nz\n").await;
        assert!(out.contains("No choice labelled \"z\""));
        assert!(out.contains("quiz take --resume"));

        let resumed = services.resume_session().unwrap();
        assert_eq!(resumed.index(), 1);
    }
}
