// Bootstrap catalogue fetcher.
//
// A single unauthenticated GET of the league-wide player snapshot. Nothing is
// cached: every call pays the full network cost, and any non-success response
// propagates to the caller immediately.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::info;

use super::{FplError, Player};

#[derive(Debug, Deserialize)]
struct BootstrapResponse {
    elements: Vec<Player>,
}

/// Fetch the full player catalogue from `{base_url}/api/bootstrap-static/`.
pub async fn fetch_players(
    http: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<Player>, FplError> {
    let url = format!("{base_url}/api/bootstrap-static/");
    let resp = http.get(&url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FplError::UpstreamStatus {
            endpoint: "bootstrap-static",
            status,
        });
    }

    let body: BootstrapResponse = resp.json().await?;
    info!("Fetched bootstrap data for {} players", body.elements.len());
    Ok(body.elements)
}

/// Build the id -> display name lookup used to label squad picks.
pub fn player_name_map(players: &[Player]) -> HashMap<u32, String> {
    players
        .iter()
        .map(|p| (p.id, p.web_name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32, name: &str) -> Player {
        Player {
            id,
            web_name: name.to_string(),
            form: "5.0".to_string(),
            points_per_game: "5.0".to_string(),
            minutes: 900,
        }
    }

    #[test]
    fn name_map_covers_every_player() {
        let players = vec![player(1, "Haaland"), player(2, "Salah"), player(3, "Saka")];
        let map = player_name_map(&players);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&1).map(String::as_str), Some("Haaland"));
        assert_eq!(map.get(&3).map(String::as_str), Some("Saka"));
    }

    #[test]
    fn name_map_of_empty_catalogue_is_empty() {
        assert!(player_name_map(&[]).is_empty());
    }

    #[test]
    fn bootstrap_response_deserializes_elements() {
        let json = r#"{
            "elements": [
                {
                    "id": 427,
                    "web_name": "Haaland",
                    "form": "6.5",
                    "points_per_game": "7.1",
                    "minutes": 1170
                }
            ],
            "events": [],
            "teams": []
        }"#;
        let body: BootstrapResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.elements.len(), 1);
        assert_eq!(body.elements[0].web_name, "Haaland");
        assert_eq!(body.elements[0].form, "6.5");
        assert_eq!(body.elements[0].minutes, 1170);
    }
}
