use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use geotox::config::{Config, Overrides, SecretBackend};
use geotox::context::{create_scorer, AppContext};
use geotox::secrets::EnvSecretStore;
use geotox::toxicity::traits::ToxicityScorer;

/// geotox: toxicity scoring for geotagged Twitter/X posts.
///
/// Searches for geotagged posts on a topic, keeps the ones whose place is
/// known, and scores each post's text with the Perspective API.
#[derive(Parser)]
#[command(name = "geotox", version, about)]
struct Cli {
    /// Where to read Twitter secrets: "keyring" (default) or "env"
    #[arg(long, global = true)]
    secret_store: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, join against places, and score every qualifying post
    Run {
        /// Search terms (default: GEOTOX_QUERY or "#politica #eleicoes")
        #[arg(long)]
        query: Option<String>,

        /// Two-letter country code for the place filter (default: GEOTOX_COUNTRY or BR)
        #[arg(long)]
        country: Option<String>,

        /// Results to request, 10 to 500 (default: GEOTOX_MAX_RESULTS or 100)
        #[arg(long)]
        max_results: Option<u32>,

        /// Print the report as JSON instead of colored text
        #[arg(long)]
        json: bool,
    },

    /// Score a single piece of text
    Score {
        /// The text to score
        text: String,

        /// Print the raw response as JSON only
        #[arg(long)]
        json: bool,
    },

    /// Check which credentials are configured (no network calls)
    Credentials,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout carries only results
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("geotox=info")),
        )
        .init();

    let cli = Cli::parse();
    let secret_store = cli
        .secret_store
        .as_deref()
        .map(SecretBackend::parse)
        .transpose()?;

    match cli.command {
        Commands::Run {
            query,
            country,
            max_results,
            json,
        } => {
            let config = Config::load(&Overrides {
                query,
                country,
                max_results,
                secret_store,
            })?;
            let store = geotox::secrets::open_store(config.secret_store);
            let ctx = AppContext::new(config, store.as_ref())?;
            let request = ctx.search_request();
            let report = geotox::pipeline::run(&ctx.search, &ctx.scorer, &request).await?;

            if json {
                println!("{}", geotox::output::report_json(&report)?);
            } else {
                geotox::output::terminal::display_report(&report);
            }
        }

        Commands::Score { text, json } => {
            let config = Config::load(&Overrides::default())?;
            config.require_perspective()?;
            let scorer = create_scorer(&config)?;

            let result = scorer.score_text(&text).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result.raw)?);
            } else {
                geotox::output::terminal::display_score(&text, &result);
            }
        }

        Commands::Credentials => {
            let config = Config::load(&Overrides {
                secret_store,
                ..Default::default()
            })?;
            let store = geotox::secrets::open_store(config.secret_store);
            println!(
                "{}",
                format!("=== Credentials ({:?} store) ===", config.secret_store).bold()
            );
            for (account, present) in geotox::secrets::secret_presence(store.as_ref()) {
                let label = match config.secret_store {
                    SecretBackend::Keyring => {
                        format!("{}/{account}", geotox::secrets::TWITTER_SERVICE)
                    }
                    SecretBackend::Env => {
                        EnvSecretStore::variable_name(geotox::secrets::TWITTER_SERVICE, account)
                    }
                };
                println!("  {:<24} {}", label, presence_label(present));
            }
            println!(
                "  {:<24} {}",
                "PERSPECTIVE_API_KEY",
                presence_label(!config.perspective_api_key.is_empty())
            );
        }
    }

    Ok(())
}

fn presence_label(present: bool) -> colored::ColoredString {
    if present {
        "set".green()
    } else {
        "missing".red()
    }
}
