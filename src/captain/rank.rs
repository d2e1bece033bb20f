// Captain ranking.
//
// Joins a resolved lineup against the bootstrap catalogue, scores each player,
// and keeps the top 3 by score. Picks that cannot be found in the catalogue
// are dropped silently; that is the one tolerated partial failure. A stat that
// fails to parse still propagates as an error.

use std::collections::HashMap;

use tracing::debug;

use crate::fpl::{LineupPlayer, Player};

use super::{score, ScoreError, ScoredPlayer};

/// How many candidates a ranking returns at most.
pub const TOP_PICKS: usize = 3;

/// Rank a starting lineup by captaincy score, highest first, truncated to
/// [`TOP_PICKS`]. Returns fewer entries when fewer picks resolve, and an
/// empty list for an empty lineup.
pub fn recommend_captains(
    lineup: &[LineupPlayer],
    players: &[Player],
) -> Result<Vec<ScoredPlayer>, ScoreError> {
    let by_id: HashMap<u32, &Player> = players.iter().map(|p| (p.id, p)).collect();

    let mut candidates = Vec::with_capacity(lineup.len());
    for pick in lineup {
        match by_id.get(&pick.id) {
            Some(player) => candidates.push(score::scored(player)?),
            None => debug!("Pick {} ({}) not in bootstrap data, skipping", pick.id, pick.name),
        }
    }

    Ok(top_picks(candidates))
}

/// Name-keyed variant for callers that supply raw player names instead of a
/// session credential. Matching on `web_name` is case-insensitive; unknown
/// names are dropped just like unknown ids.
pub fn recommend_captains_by_names(
    names: &[String],
    players: &[Player],
) -> Result<Vec<ScoredPlayer>, ScoreError> {
    let by_name: HashMap<String, &Player> = players
        .iter()
        .map(|p| (p.web_name.to_lowercase(), p))
        .collect();

    let mut candidates = Vec::with_capacity(names.len());
    for name in names {
        match by_name.get(&name.trim().to_lowercase()) {
            Some(player) => candidates.push(score::scored(player)?),
            None => debug!("Player `{name}` not in bootstrap data, skipping"),
        }
    }

    Ok(top_picks(candidates))
}

fn top_picks(mut candidates: Vec<ScoredPlayer>) -> Vec<ScoredPlayer> {
    // sort_by is stable, so tied scores keep their lineup encounter order.
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(TOP_PICKS);
    candidates
}
