//! The `quiz show` command.

use anyhow::Result;
use quiz_core::scoring::{SCORE_RANGE_MAX, SCORE_RANGE_MIN};
use services::AppServices;

pub async fn execute(services: &AppServices) -> Result<()> {
    let store = services.store();
    let source = store.revalidate().await;
    let config = store.current();

    println!("Source: {source:?}");
    println!("\nQuestions ({}):", config.question_count());
    for (n, question) in config.questions().iter().enumerate() {
        println!("{:>3}. [{}] {}", n + 1, question.id(), question.prompt());
        for option in question.options() {
            println!(
                "       {}. {} ({})",
                option.id().label(),
                option.text(),
                option.value()
            );
        }
    }

    println!("\nResults ({}):", config.results().len());
    for tier in config.results() {
        println!(
            "  [{}] {} {:.2}-{:.2}",
            tier.id(),
            tier.name(),
            tier.min_score(),
            tier.max_score()
        );
        if !tier.description().is_empty() {
            println!("       {}", tier.description());
        }
        if let Some(url) = tier.redirect_url() {
            println!("       redirects to {url}");
        }
    }

    let gaps = config.coverage_gaps(SCORE_RANGE_MIN, SCORE_RANGE_MAX);
    if !gaps.is_empty() {
        println!("\nScores matching no tier:");
        for gap in gaps {
            println!("  between {} and {}", gap.after, gap.before);
        }
    }
    Ok(())
}
