// Captain selection: per-player scoring and top-3 ranking.

pub mod rank;
pub mod score;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("could not parse {field} value `{value}` for {player}")]
    Stat {
        field: &'static str,
        value: String,
        player: String,
    },
}

/// A starting player with its captaincy score attached. Derived per request,
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPlayer {
    pub id: u32,
    pub name: String,
    pub score: f64,
    pub form: String,
    pub points_per_game: String,
    pub minutes: u32,
}
