// Captaincy scoring.
//
// An equal-weighted blend of recent form and season-long points per game,
// penalized below a minutes threshold that proxies rotation and injury risk.

use crate::fpl::Player;

use super::{ScoreError, ScoredPlayer};

/// Players under this many minutes (roughly half a season) take the
/// low-minutes penalty.
pub const LOW_MINUTES_THRESHOLD: u32 = 800;
pub const LOW_MINUTES_MODIFIER: f64 = 0.8;

/// Score a player: `round2((form * 0.5 + ppg * 0.5) * modifier)` where the
/// modifier is [`LOW_MINUTES_MODIFIER`] under the threshold and 1.0 otherwise.
///
/// `form` and `points_per_game` arrive as decimal strings from the bootstrap
/// catalogue; a malformed value is a hard error, not a zero.
pub fn score_player(player: &Player) -> Result<f64, ScoreError> {
    let form = parse_stat(&player.form, "form", &player.web_name)?;
    let ppg = parse_stat(&player.points_per_game, "points_per_game", &player.web_name)?;

    let modifier = if player.minutes < LOW_MINUTES_THRESHOLD {
        LOW_MINUTES_MODIFIER
    } else {
        1.0
    };

    Ok(round2((form * 0.5 + ppg * 0.5) * modifier))
}

/// Score a player and carry its stats along for display.
pub fn scored(player: &Player) -> Result<ScoredPlayer, ScoreError> {
    Ok(ScoredPlayer {
        id: player.id,
        name: player.web_name.clone(),
        score: score_player(player)?,
        form: player.form.clone(),
        points_per_game: player.points_per_game.clone(),
        minutes: player.minutes,
    })
}

fn parse_stat(value: &str, field: &'static str, player: &str) -> Result<f64, ScoreError> {
    value.trim().parse().map_err(|_| ScoreError::Stat {
        field,
        value: value.to_string(),
        player: player.to_string(),
    })
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
