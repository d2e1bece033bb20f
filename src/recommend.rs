// End-to-end recommendation pipeline: resolve the lineup, score and rank the
// candidates, then optionally narrate the result.

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::captain::{rank, ScoredPlayer};
use crate::config::Config;
use crate::fpl::client::FplClient;
use crate::fpl::{bootstrap, FplError, FIRST_GAMEWEEK, LAST_GAMEWEEK};
use crate::llm::client::{NarrationOutcome, NarratorClient};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Where the starting lineup comes from: an authenticated FPL session, or a
/// raw list of player names supplied by the caller.
#[derive(Debug, Clone)]
pub enum TeamSource {
    Session { cookie: String },
    Names(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct RecommendRequest {
    /// Target gameweek. Any "predict next gameweek" offset is the caller's
    /// business; the pipeline uses this value as-is.
    pub gameweek: u32,
    pub source: TeamSource,
    pub narrate: bool,
}

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// The final recommendation payload. `top_picks` is always sorted by score
/// descending and holds at most 3 entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// Score-based summary: the top scorer plus the full shortlist.
    Scored {
        captain: Option<String>,
        score: Option<f64>,
        top_picks: Vec<ScoredPlayer>,
    },
    /// LLM-narrated summary, attributed to the producing model.
    Narrated {
        explanation: String,
        model: String,
        top_picks: Vec<ScoredPlayer>,
    },
    /// The narrator failed; the ranked shortlist still stands.
    NarrationFailed {
        error: String,
        top_picks: Vec<ScoredPlayer>,
    },
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full fetch-score-rank-explain flow for one request.
pub async fn recommend(config: &Config, request: &RecommendRequest) -> anyhow::Result<Recommendation> {
    let gw = request.gameweek;
    if !(FIRST_GAMEWEEK..=LAST_GAMEWEEK).contains(&gw) {
        return Err(FplError::InvalidGameweek(gw).into());
    }

    let base_url = config.fpl.base_url.trim_end_matches('/');

    let top = match &request.source {
        TeamSource::Session { cookie } => {
            if cookie.trim().is_empty() {
                return Err(FplError::MissingCredential.into());
            }
            let mut client = FplClient::connect(base_url)
                .await
                .context("failed to initialize FPL client")?;
            client
                .authenticate(cookie)
                .await
                .context("authentication failed")?;
            let lineup = client
                .get_team_for_gameweek(gw)
                .await
                .context("failed to fetch team")?;
            rank::recommend_captains(&lineup, client.players())?
        }
        TeamSource::Names(names) => {
            let http = reqwest::Client::new();
            let players = bootstrap::fetch_players(&http, base_url)
                .await
                .context("failed to fetch bootstrap data")?;
            rank::recommend_captains_by_names(names, &players)?
        }
    };

    info!("Ranked {} captain candidates for gameweek {gw}", top.len());

    if !request.narrate {
        let captain = top.first().map(|p| p.name.clone());
        let score = top.first().map(|p| p.score);
        return Ok(Recommendation::Scored {
            captain,
            score,
            top_picks: top,
        });
    }

    let narrator = NarratorClient::from_config(&config.narrator, &config.credentials);
    match narrator.narrate(&top, gw).await {
        NarrationOutcome::Narrated { explanation, model } => Ok(Recommendation::Narrated {
            explanation,
            model,
            top_picks: top,
        }),
        NarrationOutcome::Failed { error } => Ok(Recommendation::NarrationFailed {
            error,
            top_picks: top,
        }),
    }
}
