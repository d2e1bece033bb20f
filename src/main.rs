// FPL captain recommender entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to stderr; stdout carries the result JSON)
// 2. Parse CLI arguments
// 3. Load config
// 4. Run the recommendation pipeline
// 5. Print the result as pretty JSON on stdout

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;

use fpl_captain::config;
use fpl_captain::recommend::{self, RecommendRequest, TeamSource};

const USAGE: &str = "\
Usage: fpl-captain --gameweek <1-38> [options]

Options:
  --gameweek <n>     Target gameweek (required)
  --next             Shift the target gameweek forward by one
  --cookie <str>     FPL session cookie (or set FPL_SESSION_COOKIE)
  --players <a,b,c>  Rank these player names instead of a resolved team
  --narrate          Ask the configured LLM backend to explain the pick
  --config <dir>     Directory containing config/ (default: current dir)
";

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CliArgs {
    gameweek: Option<u32>,
    next: bool,
    cookie: Option<String>,
    players: Option<Vec<String>>,
    narrate: bool,
    config_dir: Option<PathBuf>,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<CliArgs> {
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--gameweek" => {
                let value = args.next().context("--gameweek requires a value")?;
                parsed.gameweek = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid gameweek `{value}`"))?,
                );
            }
            "--next" => parsed.next = true,
            "--cookie" => {
                parsed.cookie = Some(args.next().context("--cookie requires a value")?);
            }
            "--players" => {
                let value = args.next().context("--players requires a value")?;
                parsed.players = Some(
                    value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                );
            }
            "--narrate" => parsed.narrate = true,
            "--config" => {
                let value = args.next().context("--config requires a value")?;
                parsed.config_dir = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                print!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument `{other}`\n\n{USAGE}"),
        }
    }

    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("FPL captain recommender starting up");

    // 2. Parse CLI arguments
    let args = parse_args(std::env::args().skip(1))?;
    let Some(gameweek) = args.gameweek else {
        bail!("--gameweek is required\n\n{USAGE}");
    };
    // The "predict the next gameweek" offset stays caller-side, so it is
    // applied here and nowhere in the core.
    let gameweek = if args.next { gameweek + 1 } else { gameweek };

    // 3. Load config
    let config = match &args.config_dir {
        Some(dir) => {
            config::ensure_config_files(dir)?;
            config::load_config_from(dir)
        }
        None => config::load_config(),
    }
    .context("failed to load configuration")?;
    info!("Config loaded: FPL base {}", config.fpl.base_url);

    // 4. Run the recommendation pipeline
    let source = match args.players {
        Some(names) => TeamSource::Names(names),
        None => {
            let cookie = args
                .cookie
                .or_else(|| std::env::var("FPL_SESSION_COOKIE").ok())
                .unwrap_or_default();
            TeamSource::Session { cookie }
        }
    };
    let request = RecommendRequest {
        gameweek,
        source,
        narrate: args.narrate,
    };

    let recommendation = recommend::recommend(&config, &request).await?;

    // 5. Print the result
    println!("{}", serde_json::to_string_pretty(&recommendation)?);
    Ok(())
}

/// Initialize tracing to stderr so stdout stays machine-readable.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fpl_captain=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
