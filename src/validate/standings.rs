//! League-table checks.
//!
//! Fatal: required fields, team count, duplicate teams, negative counts,
//! `points == 3*wins + draws`, `played == wins + draws + losses`.
//! Warnings: goal difference disagreeing with goals for/against, ranks that
//! are not exactly `1..=N`.

use std::collections::HashSet;

use crate::domain::{Dataset, StandingRecord};
use crate::validate::{Check, EXPECTED_TEAM_COUNT, ValidationResult};

pub fn validate(records: &[StandingRecord]) -> ValidationResult {
    let mut result = ValidationResult::new(Dataset::Standings, records.len());

    check_required_fields(records, &mut result);
    check_team_count(records, &mut result);
    check_duplicate_teams(records, &mut result);
    check_non_negative(records, &mut result);
    check_points(records, &mut result);
    check_played(records, &mut result);
    check_goal_difference(records, &mut result);
    check_rank_sequence(records, &mut result);

    result
}

fn check_required_fields(records: &[StandingRecord], result: &mut ValidationResult) {
    for (index, record) in records.iter().enumerate() {
        let missing = record.missing_fields();
        if !missing.is_empty() {
            result.push(
                Check::RequiredFields,
                format!("{}: missing {}", record.describe(index), missing.join(", ")),
            );
        }
    }
}

fn check_team_count(records: &[StandingRecord], result: &mut ValidationResult) {
    if records.len() != EXPECTED_TEAM_COUNT {
        result.push(
            Check::TeamCount,
            format!("expected {EXPECTED_TEAM_COUNT} teams, got {}", records.len()),
        );
    }
}

fn check_duplicate_teams(records: &[StandingRecord], result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for team in records.iter().filter_map(|r| r.team.as_deref()) {
        if !seen.insert(team) && reported.insert(team) {
            result.push(Check::DuplicateTeam, format!("team '{team}' appears more than once"));
        }
    }
}

fn check_non_negative(records: &[StandingRecord], result: &mut ValidationResult) {
    for (index, record) in records.iter().enumerate() {
        let fields = [
            ("rank", record.rank),
            ("points", record.points),
            ("played", record.played),
            ("wins", record.wins),
            ("draws", record.draws),
            ("losses", record.losses),
            ("goals_for", record.goals_for),
            ("goals_against", record.goals_against),
        ];
        for (name, value) in fields {
            if let Some(v) = value.filter(|v| *v < 0) {
                result.push(
                    Check::NegativeValue,
                    format!("{}: {name} is negative ({v})", record.describe(index)),
                );
            }
        }
    }
}

fn check_points(records: &[StandingRecord], result: &mut ValidationResult) {
    for (index, record) in records.iter().enumerate() {
        let (Some(points), Some(wins), Some(draws)) = (record.points, record.wins, record.draws)
        else {
            continue;
        };
        match wins.checked_mul(3).and_then(|w| w.checked_add(draws)) {
            Some(expected) if points == expected => {}
            Some(expected) => result.push(
                Check::PointsMismatch,
                format!(
                    "{}: points {points} != 3*{wins} + {draws} ({expected})",
                    record.describe(index)
                ),
            ),
            None => result.push(
                Check::PointsMismatch,
                format!("{}: 3*{wins} + {draws} is out of range", record.describe(index)),
            ),
        }
    }
}

fn check_played(records: &[StandingRecord], result: &mut ValidationResult) {
    for (index, record) in records.iter().enumerate() {
        let (Some(played), Some(wins), Some(draws), Some(losses)) =
            (record.played, record.wins, record.draws, record.losses)
        else {
            continue;
        };
        match wins.checked_add(draws).and_then(|n| n.checked_add(losses)) {
            Some(expected) if played == expected => {}
            Some(expected) => result.push(
                Check::PlayedMismatch,
                format!(
                    "{}: played {played} != {wins} + {draws} + {losses} ({expected})",
                    record.describe(index)
                ),
            ),
            None => result.push(
                Check::PlayedMismatch,
                format!("{}: {wins} + {draws} + {losses} is out of range", record.describe(index)),
            ),
        }
    }
}

fn check_goal_difference(records: &[StandingRecord], result: &mut ValidationResult) {
    for (index, record) in records.iter().enumerate() {
        let (Some(gd), Some(gf), Some(ga)) =
            (record.goal_difference, record.goals_for, record.goals_against)
        else {
            continue;
        };
        match gf.checked_sub(ga) {
            Some(expected) if gd == expected => {}
            Some(_) => result.push(
                Check::GoalDifferenceMismatch,
                format!("{}: goal difference {gd} != {gf} - {ga}", record.describe(index)),
            ),
            None => result.push(
                Check::NegativeValue,
                format!("{}: {gf} - {ga} is out of range", record.describe(index)),
            ),
        }
    }
}

fn check_rank_sequence(records: &[StandingRecord], result: &mut ValidationResult) {
    let mut ranks: Vec<i64> = records.iter().filter_map(|r| r.rank).collect();
    if ranks.is_empty() {
        return;
    }
    ranks.sort_unstable();
    let in_sequence = ranks.iter().zip(1..).all(|(rank, expected)| *rank == expected);
    if !in_sequence || ranks.len() != records.len() {
        result.push(
            Check::RankSequence,
            format!("ranks are not exactly 1..={}", records.len()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAMS: [&str; 20] = [
        "Liverpool",
        "Arsenal",
        "Manchester City",
        "Chelsea",
        "Newcastle",
        "Aston Villa",
        "Nottingham Forest",
        "Brighton",
        "Bournemouth",
        "Brentford",
        "Fulham",
        "Crystal Palace",
        "Everton",
        "West Ham",
        "Manchester United",
        "Wolves",
        "Tottenham",
        "Leicester",
        "Ipswich",
        "Southampton",
    ];

    fn record(rank: i64, team: &str, wins: i64, draws: i64, losses: i64) -> StandingRecord {
        let goals_for = 30 + wins;
        let goals_against = 30 + losses;
        StandingRecord {
            rank: Some(rank),
            team: Some(team.to_string()),
            points: Some(wins * 3 + draws),
            played: Some(wins + draws + losses),
            wins: Some(wins),
            draws: Some(draws),
            losses: Some(losses),
            goals_for: Some(goals_for),
            goals_against: Some(goals_against),
            goal_difference: Some(goals_for - goals_against),
        }
    }

    fn full_table() -> Vec<StandingRecord> {
        TEAMS
            .iter()
            .enumerate()
            .map(|(i, team)| {
                let i = i as i64;
                let wins = 25 - i;
                let draws = i % 6;
                record(i + 1, team, wins, draws, 38 - wins - draws)
            })
            .collect()
    }

    fn checks(result: &ValidationResult) -> Vec<Check> {
        result.fatal.iter().map(|i| i.check).collect()
    }

    #[test]
    fn out_of_range_wins_are_rejected() {
        let mut table = full_table();
        table[0].wins = Some(i64::MAX / 2);

        let result = validate(&table);

        assert!(!result.passed());
        let points = result
            .fatal
            .iter()
            .find(|i| i.check == Check::PointsMismatch)
            .unwrap();
        assert!(points.message.contains("out of range"), "got: {}", points.message);
        assert!(checks(&result).contains(&Check::PlayedMismatch));
    }

    #[test]
    fn out_of_range_losses_are_rejected() {
        let mut table = full_table();
        table[3].losses = Some(i64::MAX);

        let result = validate(&table);

        let played = result
            .fatal
            .iter()
            .find(|i| i.check == Check::PlayedMismatch)
            .unwrap();
        assert!(played.message.starts_with("Chelsea:"));
        assert!(played.message.contains("out of range"));
    }

    #[test]
    fn consistent_full_table_passes() {
        let result = validate(&full_table());
        assert!(result.passed(), "{:?}", result.fatal);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn negative_goal_difference_is_fine() {
        let table = full_table();
        assert!(table.iter().any(|r| r.goal_difference.unwrap() < 0));
        assert!(validate(&table).passed());
    }

    #[test]
    fn wrong_team_count_is_fatal() {
        let mut table = full_table();
        table.pop();
        assert_eq!(checks(&validate(&table)), vec![Check::TeamCount]);

        let mut table = full_table();
        table.push(record(21, "Sunderland", 1, 1, 36));
        assert_eq!(checks(&validate(&table)), vec![Check::TeamCount]);
    }

    #[test]
    fn duplicate_team_is_fatal() {
        let mut table = full_table();
        table[19].team = Some("Liverpool".into());
        let result = validate(&table);
        assert_eq!(checks(&result), vec![Check::DuplicateTeam]);
        assert!(result.fatal[0].message.contains("Liverpool"));
    }

    #[test]
    fn missing_fields_are_fatal() {
        let mut table = full_table();
        table[3].wins = None;
        let result = validate(&table);
        assert_eq!(checks(&result), vec![Check::RequiredFields]);
        assert!(result.fatal[0].message.contains("Chelsea: missing wins"));
    }

    #[test]
    fn negative_points_are_fatal() {
        let mut table = full_table();
        table[0] = StandingRecord {
            points: Some(-10),
            wins: Some(0),
            draws: Some(0),
            losses: Some(38),
            played: Some(38),
            ..table[0].clone()
        };
        let result = validate(&table);
        assert!(checks(&result).contains(&Check::NegativeValue));
        assert!(checks(&result).contains(&Check::PointsMismatch));
    }

    #[test]
    fn points_mismatch_is_fatal() {
        let mut table = full_table();
        table[0].points = Some(100);
        assert_eq!(checks(&validate(&table)), vec![Check::PointsMismatch]);
    }

    #[test]
    fn played_mismatch_is_fatal() {
        let mut table = full_table();
        table[5].played = Some(40);
        assert_eq!(checks(&validate(&table)), vec![Check::PlayedMismatch]);
    }

    #[test]
    fn goal_difference_mismatch_is_a_warning() {
        let mut table = full_table();
        table[2].goal_difference = Some(99);
        let result = validate(&table);
        assert!(result.passed());
        assert_eq!(result.warnings[0].check, Check::GoalDifferenceMismatch);
    }

    #[test]
    fn shared_rank_is_a_warning() {
        let mut table = full_table();
        table[1].rank = Some(1);
        let result = validate(&table);
        assert!(result.passed());
        assert_eq!(result.warnings[0].check, Check::RankSequence);
    }

    #[test]
    fn collects_every_issue() {
        let mut table = full_table();
        table[0].points = Some(1);
        table[1].played = Some(1);
        table[2].team = Some("Liverpool".into());
        assert_eq!(
            checks(&validate(&table)),
            vec![Check::DuplicateTeam, Check::PointsMismatch, Check::PlayedMismatch]
        );
    }
}
