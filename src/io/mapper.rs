//! Raw API payloads -> flat row records.
//!
//! The mapper only knows where fields live in the API-Football response. It
//! does not judge values: an absent, null or wrongly typed field becomes
//! `None` and is left for the validator. Only a payload without the expected
//! top-level structure is an error here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::domain::{AssistRecord, Dataset, Records, ScorerRecord, StandingRecord};
use crate::error::MappingError;

/// Map a payload for `dataset` into its record set.
pub fn map_records(dataset: Dataset, payload: &Value) -> Result<Records, MappingError> {
    match dataset {
        Dataset::Standings => map_standings(payload).map(Records::Standings),
        Dataset::TopScorers => map_scorers(payload).map(Records::Scorers),
        Dataset::TopAssists => map_assists(payload).map(Records::Assists),
    }
}

/// League table lives at `response[0].league.standings[0]`.
pub fn map_standings(payload: &Value) -> Result<Vec<StandingRecord>, MappingError> {
    let response = response_array(Dataset::Standings, payload)?;
    let table = response
        .first()
        .and_then(|entry| LeagueEntry::deserialize(entry).ok())
        .and_then(|entry| entry.league.standings.into_iter().next())
        .ok_or(MappingError::MissingStandingsTable)?;

    table
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let row: StandingRow = decode_entry(Dataset::Standings, index, entry)?;
            let all = row.all.unwrap_or_default();
            let goals = all.goals.unwrap_or_default();
            Ok(StandingRecord {
                rank: row.rank,
                team: row.team.and_then(|t| t.name),
                points: row.points,
                played: all.played,
                wins: all.win,
                draws: all.draw,
                losses: all.lose,
                goals_for: goals.scored,
                goals_against: goals.against,
                goal_difference: row.goals_diff,
            })
        })
        .collect()
}

pub fn map_scorers(payload: &Value) -> Result<Vec<ScorerRecord>, MappingError> {
    map_players(Dataset::TopScorers, payload, |goals| goals.total, |line| ScorerRecord {
        player: line.player,
        team: line.team,
        goals: line.tally,
        appearances: line.appearances,
    })
}

pub fn map_assists(payload: &Value) -> Result<Vec<AssistRecord>, MappingError> {
    map_players(Dataset::TopAssists, payload, |goals| goals.assists, |line| AssistRecord {
        player: line.player,
        team: line.team,
        assists: line.tally,
        appearances: line.appearances,
    })
}

#[derive(Debug, Deserialize)]
struct LeagueEntry {
    league: LeagueTables,
}

#[derive(Debug, Deserialize)]
struct LeagueTables {
    standings: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct StandingRow {
    #[serde(default, deserialize_with = "lenient")]
    rank: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    team: Option<Named>,
    #[serde(default, deserialize_with = "lenient")]
    points: Option<i64>,
    #[serde(default, rename = "goalsDiff", deserialize_with = "lenient")]
    goals_diff: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    all: Option<MatchRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct MatchRecord {
    #[serde(default, deserialize_with = "lenient")]
    played: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    win: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    draw: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    lose: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    goals: Option<GoalTotals>,
}

#[derive(Debug, Default, Deserialize)]
struct GoalTotals {
    #[serde(default, rename = "for", deserialize_with = "lenient")]
    scored: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    against: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerEntry {
    #[serde(default, deserialize_with = "lenient")]
    player: Option<Named>,
    #[serde(default, deserialize_with = "lenient")]
    statistics: Option<Vec<PlayerStatistics>>,
}

#[derive(Debug, Deserialize)]
struct PlayerStatistics {
    #[serde(default, deserialize_with = "lenient")]
    team: Option<Named>,
    #[serde(default, deserialize_with = "lenient")]
    games: Option<Games>,
    #[serde(default, deserialize_with = "lenient")]
    goals: Option<PlayerGoals>,
}

#[derive(Debug, Deserialize)]
struct Games {
    // The API spells it "appearences".
    #[serde(default, rename = "appearences", deserialize_with = "lenient")]
    appearances: Option<i64>,
}

/// Tallies stay raw so "null" (not on this board) can be told apart from a
/// value of the wrong type.
#[derive(Debug, Default, Deserialize)]
struct PlayerGoals {
    #[serde(default)]
    total: Option<Value>,
    #[serde(default)]
    assists: Option<Value>,
}

/// Any value that doesn't fit `T` (null included) becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

struct RawLine {
    player: Option<String>,
    team: Option<String>,
    tally: Option<i64>,
    appearances: Option<i64>,
}

/// Shared walk over a player leaderboard.
///
/// A player whose tally is absent or null is not on this leaderboard (the API
/// lists scorers with no assists and vice versa) and is left out. A tally of
/// any other non-integer type is kept as `None` for the validator to reject.
fn map_players<R>(
    dataset: Dataset,
    payload: &Value,
    tally: impl Fn(PlayerGoals) -> Option<Value>,
    build: impl Fn(RawLine) -> R,
) -> Result<Vec<R>, MappingError> {
    let response = response_array(dataset, payload)?;
    let mut out = Vec::with_capacity(response.len());

    for (index, entry) in response.iter().enumerate() {
        let entry: PlayerEntry = decode_entry(dataset, index, entry)?;
        let player = entry.player.and_then(|p| p.name);
        let stats = entry.statistics.and_then(|s| s.into_iter().next());
        let (team, games, goals) = match stats {
            Some(s) => (s.team.and_then(|t| t.name), s.games, s.goals),
            None => (None, None, None),
        };

        let raw = match goals.and_then(&tally) {
            None | Some(Value::Null) => {
                debug!(%dataset, index, player = player.as_deref().unwrap_or("?"), "No tally; skipping player");
                continue;
            }
            Some(raw) => raw,
        };
        out.push(build(RawLine {
            player,
            team,
            tally: raw.as_i64(),
            appearances: games.and_then(|g| g.appearances),
        }));
    }

    Ok(out)
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Vec<Value>,
}

fn response_array(dataset: Dataset, payload: &Value) -> Result<Vec<Value>, MappingError> {
    Envelope::deserialize(payload)
        .map(|envelope| envelope.response)
        .map_err(|_| MappingError::MissingResponse { dataset })
}

fn decode_entry<T: DeserializeOwned>(
    dataset: Dataset,
    index: usize,
    entry: &Value,
) -> Result<T, MappingError> {
    if !entry.is_object() {
        return Err(MappingError::MalformedEntry { dataset, index });
    }
    T::deserialize(entry).map_err(|_| MappingError::MalformedEntry { dataset, index })
}
