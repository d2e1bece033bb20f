// Authenticated team resolver for the FPL API.
//
// Each `FplClient` owns its own `reqwest::Client` and performs its own full
// bootstrap fetch at construction to build the id -> name map; instances share
// nothing. Authentication presents the caller-supplied session cookie to
// `/api/me/` and stores the resulting entry id for subsequent picks lookups.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::bootstrap;
use super::{FplError, LineupPlayer, Player, TeamPick, FIRST_GAMEWEEK, LAST_GAMEWEEK};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com";

// The API rejects cookie-authenticated requests without a browser UA.
const USER_AGENT: &str = "Mozilla/5.0";

const STARTING_LINEUP_SIZE: u8 = 11;

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MeResponse {
    player: Option<MePlayer>,
}

#[derive(Debug, Deserialize)]
struct MePlayer {
    entry: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PicksResponse {
    #[serde(default)]
    picks: Vec<TeamPick>,
}

// ---------------------------------------------------------------------------
// FplClient
// ---------------------------------------------------------------------------

pub struct FplClient {
    http: reqwest::Client,
    base_url: String,
    session_cookie: Option<String>,
    entry_id: Option<u64>,
    players: Vec<Player>,
    player_map: HashMap<u32, String>,
}

impl FplClient {
    /// Build a client against `base_url`, fetching the bootstrap catalogue to
    /// seed the player name map. Fails if the catalogue cannot be retrieved.
    pub async fn connect(base_url: impl Into<String>) -> Result<Self, FplError> {
        let base_url = base_url.into();
        info!("Initializing FPL client against {base_url}");

        let http = reqwest::Client::new();
        let players = bootstrap::fetch_players(&http, &base_url).await?;
        let player_map = bootstrap::player_name_map(&players);
        info!("FPL client initialized with {} mapped players", player_map.len());

        Ok(Self {
            http,
            base_url,
            session_cookie: None,
            entry_id: None,
            players,
            player_map,
        })
    }

    /// Present the session cookie to `/api/me/` and store the account's entry
    /// id. The cookie is checked for emptiness before any network call.
    pub async fn authenticate(&mut self, cookie: &str) -> Result<u64, FplError> {
        if cookie.trim().is_empty() {
            return Err(FplError::MissingCredential);
        }

        let url = format!("{}/api/me/", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("Cookie", cookie)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Authentication failed with status {status}");
            return Err(FplError::AuthRejected { status });
        }

        let me: MeResponse = resp.json().await?;
        let entry = me
            .player
            .and_then(|p| p.entry)
            .ok_or(FplError::MissingEntryId)?;

        self.session_cookie = Some(cookie.to_string());
        self.entry_id = Some(entry);
        info!("Authenticated as entry {entry}");
        Ok(entry)
    }

    /// The authenticated account's entry id, if `authenticate` has succeeded.
    pub fn entry_id(&self) -> Option<u64> {
        self.entry_id
    }

    /// The bootstrap catalogue fetched at construction.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Fetch the account's starting lineup (squad positions 1-11) for the
    /// given gameweek, resolving each pick's element id to a display name.
    pub async fn get_team_for_gameweek(&self, gw: u32) -> Result<Vec<LineupPlayer>, FplError> {
        let (entry, cookie) = match (self.entry_id, self.session_cookie.as_deref()) {
            (Some(entry), Some(cookie)) => (entry, cookie),
            _ => return Err(FplError::NotAuthenticated),
        };
        if !(FIRST_GAMEWEEK..=LAST_GAMEWEEK).contains(&gw) {
            return Err(FplError::InvalidGameweek(gw));
        }

        debug!("Fetching picks for entry {entry}, gameweek {gw}");
        let url = format!("{}/api/entry/{entry}/event/{gw}/picks/", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("Cookie", cookie)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FplError::UpstreamStatus {
                endpoint: "picks",
                status,
            });
        }

        let body: PicksResponse = resp.json().await?;
        let lineup: Vec<LineupPlayer> = body
            .picks
            .iter()
            .filter(|p| p.position <= STARTING_LINEUP_SIZE)
            .map(|p| LineupPlayer {
                id: p.element,
                name: self
                    .player_map
                    .get(&p.element)
                    .cloned()
                    .unwrap_or_else(|| format!("Player {}", p.element)),
                is_captain: p.is_captain,
                is_vice_captain: p.is_vice_captain,
            })
            .collect();

        info!("Resolved {} starting players for gameweek {gw}", lineup.len());
        Ok(lineup)
    }
}
