// FPL API integration: the public bootstrap catalogue and the authenticated
// team resolver, plus the wire types and errors they share.

pub mod bootstrap;
pub mod client;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// First scheduling round of a Premier League fantasy season.
pub const FIRST_GAMEWEEK: u32 = 1;
/// Last scheduling round of a Premier League fantasy season.
pub const LAST_GAMEWEEK: u32 = 38;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FplError {
    #[error("request to the FPL API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}")]
    UpstreamStatus {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("no session cookie provided")]
    MissingCredential,

    #[error("authentication rejected with status {status}")]
    AuthRejected { status: reqwest::StatusCode },

    #[error("no entry id found in /api/me/ response")]
    MissingEntryId,

    #[error("must authenticate before fetching a team")]
    NotAuthenticated,

    #[error("gameweek {0} is out of range (1..=38)")]
    InvalidGameweek(u32),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One player record from the bootstrap catalogue.
///
/// `form` and `points_per_game` are decimal strings exactly as the API sends
/// them. Parsing happens at scoring time, so one malformed value surfaces as
/// a scoring error for that player instead of failing deserialization of the
/// whole catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub web_name: String,
    pub form: String,
    pub points_per_game: String,
    pub minutes: u32,
}

/// One raw squad pick from the picks endpoint. Positions 1-11 are the
/// starting lineup, 12-15 the bench.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamPick {
    pub element: u32,
    pub position: u8,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

/// A starting-lineup pick resolved to a display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupPlayer {
    pub id: u32,
    pub name: String,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}
