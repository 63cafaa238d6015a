//! Terminal run summary.
//!
//! Formatting lives here so pipeline code only produces values and the
//! printed layout can change in one place.

use crate::app::pipeline::{DatasetStatus, PipelineRun};

/// Format the end-of-run summary (season, stamp, per-dataset lines, overall status).
pub fn format_run_summary(run: &PipelineRun) -> String {
    let mut out = String::new();

    out.push_str("=== epl - Premier League data pipeline ===\n");
    out.push_str(&format!("Season: {}\n", run.season));
    out.push_str(&format!("Exported at: {}\n", run.exported_at.to_rfc3339()));
    out.push('\n');

    for outcome in &run.outcomes {
        let status = match &outcome.status {
            DatasetStatus::Succeeded { rows } => {
                format!("loaded {rows} row(s) into {}", outcome.dataset.table())
            }
            DatasetStatus::Skipped { records } => {
                format!("validated {records} record(s), load skipped")
            }
            DatasetStatus::Failed(err) => format!("FAILED at {}: {err}", err.stage()),
        };
        out.push_str(&format!("  {:<12} {status}", outcome.dataset.label()));
        if !outcome.warnings.is_empty() {
            out.push_str(&format!(" ({} warning(s))", outcome.warnings.len()));
        }
        out.push('\n');
    }

    let status = run.status();
    out.push('\n');
    out.push_str(&format!("Result: {status} (exit {})\n", status.exit_code()));
    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::app::pipeline::{DatasetError, DatasetOutcome};
    use crate::domain::{Dataset, Season};
    use crate::error::ValidationError;
    use crate::validate::{Check, Issue};

    fn issue(check: Check, message: &str) -> Issue {
        Issue {
            check,
            message: message.into(),
        }
    }

    #[test]
    fn summary_lists_every_dataset() {
        let run = PipelineRun {
            season: Season(2025),
            exported_at: Utc.with_ymd_and_hms(2026, 1, 10, 6, 0, 0).unwrap(),
            outcomes: vec![
                DatasetOutcome {
                    dataset: Dataset::Standings,
                    status: DatasetStatus::Failed(DatasetError::Validation(ValidationError {
                        dataset: Dataset::Standings,
                        issues: vec![issue(Check::PointsMismatch, "Arsenal: points off")],
                    })),
                    warnings: Vec::new(),
                },
                DatasetOutcome {
                    dataset: Dataset::TopScorers,
                    status: DatasetStatus::Succeeded { rows: 20 },
                    warnings: vec![issue(Check::DuplicatePlayer, "Salah (Liverpool) listed 2 times")],
                },
                DatasetOutcome {
                    dataset: Dataset::TopAssists,
                    status: DatasetStatus::Succeeded { rows: 20 },
                    warnings: Vec::new(),
                },
            ],
        };

        let text = format_run_summary(&run);

        assert!(text.contains("Season: 2025"));
        assert!(text.contains("Exported at: 2026-01-10T06:00:00+00:00"));
        assert!(text.contains("standings    FAILED at validate"));
        assert!(text.contains("loaded 20 row(s) into epl_top_scorers (1 warning(s))"));
        assert!(text.contains("Result: partial failure (exit 1)"));
    }

    #[test]
    fn dry_run_lines_say_skipped() {
        let run = PipelineRun {
            season: Season(2024),
            exported_at: Utc::now(),
            outcomes: vec![DatasetOutcome {
                dataset: Dataset::TopAssists,
                status: DatasetStatus::Skipped { records: 18 },
                warnings: Vec::new(),
            }],
        };
        let text = format_run_summary(&run);
        assert!(text.contains("validated 18 record(s), load skipped"));
        assert!(text.contains("Result: all datasets succeeded (exit 0)"));
    }
}
