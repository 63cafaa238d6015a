//! Shared domain types.
//!
//! Records mirror the warehouse tables one-to-one. Every field is optional
//! because the mapper copies whatever the API sent without judging it; the
//! validator is the one place that decides whether a missing value is fatal.

use std::fmt;

/// Competition year. The 2025 season runs from August 2025 to July 2026.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Season(pub i32);

impl Season {
    pub fn year(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three datasets a run processes, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Standings,
    TopScorers,
    TopAssists,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Standings, Dataset::TopScorers, Dataset::TopAssists];

    /// API path, relative to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Dataset::Standings => "/standings",
            Dataset::TopScorers => "/players/topscorers",
            Dataset::TopAssists => "/players/topassists",
        }
    }

    /// Warehouse table this dataset replaces.
    pub fn table(self) -> &'static str {
        match self {
            Dataset::Standings => "epl_standings",
            Dataset::TopScorers => "epl_top_scorers",
            Dataset::TopAssists => "epl_top_assists",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dataset::Standings => "standings",
            Dataset::TopScorers => "top scorers",
            Dataset::TopAssists => "top assists",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the league table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingRecord {
    pub rank: Option<i64>,
    pub team: Option<String>,
    pub points: Option<i64>,
    pub played: Option<i64>,
    pub wins: Option<i64>,
    pub draws: Option<i64>,
    pub losses: Option<i64>,
    pub goals_for: Option<i64>,
    pub goals_against: Option<i64>,
    /// Signed: half the league usually sits below zero.
    pub goal_difference: Option<i64>,
}

impl StandingRecord {
    /// Names of required fields that are absent (or blank, for the team).
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.rank.is_none() {
            missing.push("rank");
        }
        if blank(self.team.as_deref()) {
            missing.push("team");
        }
        let counts = [
            ("points", self.points),
            ("played", self.played),
            ("wins", self.wins),
            ("draws", self.draws),
            ("losses", self.losses),
            ("goals_for", self.goals_for),
            ("goals_against", self.goals_against),
            ("goal_difference", self.goal_difference),
        ];
        missing.extend(counts.iter().filter(|(_, v)| v.is_none()).map(|(name, _)| *name));
        missing
    }

    /// Team name when present, otherwise a positional label for messages.
    pub fn describe(&self, index: usize) -> String {
        match self.team.as_deref() {
            Some(team) if !team.trim().is_empty() => team.to_string(),
            _ => format!("row {}", index + 1),
        }
    }
}

/// One row of the top-scorers leaderboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScorerRecord {
    pub player: Option<String>,
    pub team: Option<String>,
    pub goals: Option<i64>,
    pub appearances: Option<i64>,
}

/// One row of the top-assists leaderboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistRecord {
    pub player: Option<String>,
    pub team: Option<String>,
    pub assists: Option<i64>,
    pub appearances: Option<i64>,
}

/// Common view over the two player leaderboards.
///
/// Scorers and assists share the same shape apart from the name of the
/// tallied stat, so they are validated by the same code.
pub trait PlayerLine {
    /// Column name of the tallied stat (`goals` / `assists`).
    const TALLY: &'static str;

    fn player(&self) -> Option<&str>;
    fn team(&self) -> Option<&str>;
    fn tally(&self) -> Option<i64>;
    fn appearances(&self) -> Option<i64>;

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if blank(self.player()) {
            missing.push("player");
        }
        if blank(self.team()) {
            missing.push("team");
        }
        if self.tally().is_none() {
            missing.push(Self::TALLY);
        }
        if self.appearances().is_none() {
            missing.push("appearances");
        }
        missing
    }

    fn describe(&self, index: usize) -> String {
        match (self.player(), self.team()) {
            (Some(player), Some(team)) => format!("{player} ({team})"),
            (Some(player), None) => player.to_string(),
            _ => format!("row {}", index + 1),
        }
    }
}

impl PlayerLine for ScorerRecord {
    const TALLY: &'static str = "goals";

    fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }
    fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }
    fn tally(&self) -> Option<i64> {
        self.goals
    }
    fn appearances(&self) -> Option<i64> {
        self.appearances
    }
}

impl PlayerLine for AssistRecord {
    const TALLY: &'static str = "assists";

    fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }
    fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }
    fn tally(&self) -> Option<i64> {
        self.assists
    }
    fn appearances(&self) -> Option<i64> {
        self.appearances
    }
}

/// Mapped rows for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Records {
    Standings(Vec<StandingRecord>),
    Scorers(Vec<ScorerRecord>),
    Assists(Vec<AssistRecord>),
}

impl Records {
    pub fn dataset(&self) -> Dataset {
        match self {
            Records::Standings(_) => Dataset::Standings,
            Records::Scorers(_) => Dataset::TopScorers,
            Records::Assists(_) => Dataset::TopAssists,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Records::Standings(rows) => rows.len(),
            Records::Scorers(rows) => rows.len(),
            Records::Assists(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_routes() {
        assert_eq!(Dataset::Standings.path(), "/standings");
        assert_eq!(Dataset::TopAssists.table(), "epl_top_assists");
        assert_eq!(Dataset::TopScorers.to_string(), "top scorers");
    }

    #[test]
    fn standing_missing_fields_lists_blank_team() {
        let record = StandingRecord {
            rank: Some(1),
            team: Some("  ".into()),
            points: Some(3),
            played: Some(1),
            wins: Some(1),
            draws: Some(0),
            losses: Some(0),
            goals_for: Some(2),
            goals_against: None,
            goal_difference: Some(2),
        };
        assert_eq!(record.missing_fields(), vec!["team", "goals_against"]);
        assert_eq!(record.describe(4), "row 5");
    }

    #[test]
    fn player_line_names_tally_column() {
        let scorer = ScorerRecord {
            player: Some("Erling Haaland".into()),
            team: Some("Manchester City".into()),
            goals: None,
            appearances: Some(30),
        };
        assert_eq!(scorer.missing_fields(), vec!["goals"]);

        let assist = AssistRecord::default();
        assert_eq!(
            assist.missing_fields(),
            vec!["player", "team", "assists", "appearances"]
        );
    }
}
