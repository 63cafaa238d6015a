//! Dataset validation.
//!
//! Every mapped record set passes through here before anything is written.
//! Checks never stop early: all issues are collected so a rejected dataset
//! can be diagnosed from a single log. Each check has a fixed severity; one
//! fatal issue rejects the whole dataset, warnings are logged and the load
//! goes ahead.

use std::fmt;

use tracing::{error, info, warn};

use crate::domain::{Dataset, Records};
use crate::error::ValidationError;

pub mod players;
pub mod standings;

/// Clubs in a Premier League season.
pub const EXPECTED_TEAM_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warning,
}

/// Identifies which rule produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    RequiredFields,
    TeamCount,
    DuplicateTeam,
    NegativeValue,
    PointsMismatch,
    PlayedMismatch,
    GoalDifferenceMismatch,
    RankSequence,
    EmptyDataset,
    NonPositiveAppearances,
    DuplicatePlayer,
}

impl Check {
    pub fn severity(self) -> Severity {
        match self {
            Check::GoalDifferenceMismatch | Check::RankSequence | Check::DuplicatePlayer => {
                Severity::Warning
            }
            _ => Severity::Fatal,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Check::RequiredFields => "required_fields",
            Check::TeamCount => "team_count",
            Check::DuplicateTeam => "duplicate_team",
            Check::NegativeValue => "negative_value",
            Check::PointsMismatch => "points_mismatch",
            Check::PlayedMismatch => "played_mismatch",
            Check::GoalDifferenceMismatch => "goal_difference_mismatch",
            Check::RankSequence => "rank_sequence",
            Check::EmptyDataset => "empty_dataset",
            Check::NonPositiveAppearances => "non_positive_appearances",
            Check::DuplicatePlayer => "duplicate_player",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub check: Check,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.check, self.message)
    }
}

/// Outcome of validating one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub dataset: Dataset,
    pub records: usize,
    pub fatal: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationResult {
    pub fn new(dataset: Dataset, records: usize) -> Self {
        Self {
            dataset,
            records,
            fatal: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record an issue under its check's severity.
    pub fn push(&mut self, check: Check, message: impl Into<String>) {
        let issue = Issue {
            check,
            message: message.into(),
        };
        match check.severity() {
            Severity::Fatal => self.fatal.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    pub fn passed(&self) -> bool {
        self.fatal.is_empty()
    }

    pub fn ensure_passed(&self) -> Result<(), ValidationError> {
        if self.passed() {
            Ok(())
        } else {
            Err(ValidationError {
                dataset: self.dataset,
                issues: self.fatal.clone(),
            })
        }
    }

    pub fn log(&self) {
        for issue in &self.fatal {
            error!(dataset = %self.dataset, check = %issue.check, "{}", issue.message);
        }
        for issue in &self.warnings {
            warn!(dataset = %self.dataset, check = %issue.check, "{}", issue.message);
        }
        if self.passed() {
            info!(
                dataset = %self.dataset,
                records = self.records,
                warnings = self.warnings.len(),
                "Validation passed"
            );
        } else {
            error!(
                dataset = %self.dataset,
                records = self.records,
                fatal = self.fatal.len(),
                warnings = self.warnings.len(),
                "Validation failed"
            );
        }
    }
}

/// Validate a mapped record set with the rules for its dataset.
pub fn validate(records: &Records) -> ValidationResult {
    match records {
        Records::Standings(rows) => standings::validate(rows),
        Records::Scorers(rows) => players::validate(Dataset::TopScorers, rows),
        Records::Assists(rows) => players::validate(Dataset::TopAssists, rows),
    }
}
