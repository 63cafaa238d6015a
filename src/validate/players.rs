//! Player leaderboard checks (top scorers, top assists).
//!
//! Duplicate player+team pairs are only a warning: mid-season transfers put
//! the same name on the board legitimately.

use std::collections::HashMap;

use crate::domain::{Dataset, PlayerLine};
use crate::validate::{Check, ValidationResult};

pub fn validate<P: PlayerLine>(dataset: Dataset, records: &[P]) -> ValidationResult {
    let mut result = ValidationResult::new(dataset, records.len());

    for (index, record) in records.iter().enumerate() {
        let missing = record.missing_fields();
        if !missing.is_empty() {
            result.push(
                Check::RequiredFields,
                format!("{}: missing {}", record.describe(index), missing.join(", ")),
            );
        }
    }

    if records.is_empty() {
        result.push(Check::EmptyDataset, format!("{dataset} dataset is empty"));
    }

    for (index, record) in records.iter().enumerate() {
        if let Some(tally) = record.tally().filter(|v| *v < 0) {
            result.push(
                Check::NegativeValue,
                format!("{}: {} is negative ({tally})", record.describe(index), P::TALLY),
            );
        }
        if let Some(apps) = record.appearances().filter(|v| *v <= 0) {
            result.push(
                Check::NonPositiveAppearances,
                format!("{}: appearances must be positive ({apps})", record.describe(index)),
            );
        }
    }

    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    for record in records {
        if let (Some(player), Some(team)) = (record.player(), record.team()) {
            *seen.entry((player, team)).or_default() += 1;
        }
    }
    let mut duplicates: Vec<_> = seen.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicates.sort();
    for ((player, team), count) in duplicates {
        result.push(
            Check::DuplicatePlayer,
            format!("{player} ({team}) listed {count} times"),
        );
    }

    result
}
