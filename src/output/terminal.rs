// Colored terminal output for run reports and single scores.

use colored::Colorize;

use crate::pipeline::{RunReport, ScoredPost, SkipReason};
use crate::toxicity::traits::ToxicityResult;

/// Display every scored post followed by its full scoring response.
pub fn display_report(report: &RunReport) {
    println!(
        "\n{}",
        format!("=== Search: {} ===", report.query).bold()
    );
    println!(
        "  {} posts, {} places",
        report.posts_found, report.places_found
    );

    if report.posts_found == 0 {
        println!("\nNo posts matched the query.");
        return;
    }

    for (i, post) in report.scored.iter().enumerate() {
        display_scored_post(i + 1, post);
    }

    if !report.skipped.is_empty() {
        println!(
            "\n{}",
            format!("Skipped {} post(s):", report.skipped.len()).dimmed()
        );
        for skipped in &report.skipped {
            let why = match &skipped.reason {
                SkipReason::NoGeoTag => "no geo tag".to_string(),
                SkipReason::UnknownPlace { place_id } => format!("unknown place {place_id}"),
            };
            println!("  {} ({})", skipped.tweet_id, why.dimmed());
        }
    }

    if !report.failed.is_empty() {
        println!(
            "\n{}",
            format!("{} post(s) could not be scored:", report.failed.len()).red()
        );
        for failed in &report.failed {
            println!("  {} {}", failed.tweet_id, failed.error.dimmed());
        }
    }

    println!();
    println!(
        "  {} scored, {} skipped, {} failed",
        report.scored.len(),
        report.skipped.len(),
        report.failed.len()
    );
}

fn display_scored_post(rank: usize, post: &ScoredPost) {
    println!();
    println!(
        "{}",
        format!("--- [{rank}] Post {} ---", post.tweet_id).bold()
    );
    println!("  Place: {}", post.place.label());
    if let Some(author) = &post.author_id {
        println!("  Author: {author}");
    }
    if let Some(created_at) = post.created_at {
        println!("  Posted: {}", created_at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  Text: {}", post.text);
    println!("  Toxicity: {}", colorize_score(post.toxicity));
    println!("{}", pretty_json(&post.response).dimmed());
}

/// Display the score for a single ad-hoc text.
pub fn display_score(text: &str, result: &ToxicityResult) {
    println!("  Text: {}", super::truncate_chars(text, 140));
    println!("  Toxicity: {}", colorize_score(result.toxicity));
    if !result.languages.is_empty() {
        println!("  Languages: {}", result.languages.join(", "));
    }
    println!("{}", pretty_json(&result.raw).dimmed());
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Colorize a toxicity score by band.
fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format!("{score:.3}");
    if score >= 0.8 {
        text.red().bold()
    } else if score >= 0.5 {
        text.bright_red()
    } else if score >= 0.3 {
        text.yellow()
    } else {
        text.green()
    }
}
