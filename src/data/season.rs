//! Season resolution.
//!
//! Competitions run August through July, so a date before August belongs to
//! the season that started the previous calendar year.

use chrono::{Datelike, Local, NaiveDate};

use crate::domain::Season;

/// First month (1-based) of a new season.
pub const SEASON_START_MONTH: u32 = 8;

/// Season that is in progress on `date`.
pub fn resolve(date: NaiveDate) -> Season {
    if date.month() >= SEASON_START_MONTH {
        Season(date.year())
    } else {
        Season(date.year() - 1)
    }
}

/// Season in progress today, by the local clock.
pub fn current() -> Season {
    resolve(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rolls_over_on_first_of_august() {
        assert_eq!(resolve(date(2025, 7, 31)), Season(2024));
        assert_eq!(resolve(date(2025, 8, 1)), Season(2025));
    }

    #[test]
    fn january_belongs_to_previous_year() {
        assert_eq!(resolve(date(2026, 1, 1)), Season(2025));
    }

    #[test]
    fn december_belongs_to_current_year() {
        assert_eq!(resolve(date(2025, 12, 31)), Season(2025));
    }
}
