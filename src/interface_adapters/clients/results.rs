// Best-effort reporting of finished matches to the head service. A failed
// report is logged and dropped; the match outcome already reached the
// clients over their sockets.

use crate::domain::entities::Team;
use crate::use_cases::types::WorldSnapshot;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct MatchResultReport<'a> {
    room_id: &'a str,
    winner: &'static str,
    duration_seconds: f32,
    kills_radiant: u32,
    kills_dire: u32,
    players: Vec<PlayerResult<'a>>,
}

#[derive(Debug, Serialize)]
struct PlayerResult<'a> {
    user_id: u64,
    name: &'a str,
    team: &'static str,
    is_bot: bool,
    kills: u32,
    deaths: u32,
    creep_kills: u32,
    gold_earned: u32,
    damage_dealt: u64,
}

/// Posts match results to the configured endpoint; a missing endpoint
/// disables reporting entirely.
#[derive(Clone)]
pub struct ResultsClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl ResultsClient {
    pub fn new(
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub async fn report(&self, room_id: &str, winner: Team, final_snapshot: &WorldSnapshot) {
        let Some(base_url) = &self.base_url else {
            debug!(room_id, "result reporting disabled; no endpoint configured");
            return;
        };

        let report = MatchResultReport {
            room_id,
            winner: winner.as_str(),
            duration_seconds: final_snapshot.clock,
            kills_radiant: final_snapshot.kills_radiant,
            kills_dire: final_snapshot.kills_dire,
            players: final_snapshot
                .players
                .iter()
                .map(|p| PlayerResult {
                    user_id: p.id.0,
                    name: &p.name,
                    team: p.team.as_str(),
                    is_bot: p.is_bot,
                    kills: p.score.kills,
                    deaths: p.score.deaths,
                    creep_kills: p.score.creep_kills,
                    gold_earned: p.score.gold_earned,
                    damage_dealt: p.score.damage_dealt,
                })
                .collect(),
        };

        let url = format!("{base_url}/matches/results");
        match self.http.post(url).json(&report).send().await {
            Ok(response) if response.status().is_success() => {
                info!(room_id, winner = winner.as_str(), "match result reported");
            }
            Ok(response) => {
                warn!(room_id, status = %response.status(), "result report rejected");
            }
            Err(e) => {
                warn!(room_id, error = %e, "result report failed");
            }
        }
    }
}
