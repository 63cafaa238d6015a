//! The fetch -> map -> validate -> load pipeline.
//!
//! Each dataset runs end-to-end before the next one starts. A dataset that
//! fails at any stage becomes a `Failed` outcome carrying the stage and cause;
//! the runner then moves on to the next dataset. The aggregate of the three
//! outcomes decides the run status and the process exit code.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{error, info, info_span, warn};

use crate::data::{ApiClient, FetchParams, Sleeper, Transport};
use crate::domain::{Dataset, Season};
use crate::error::{FetchError, LoadError, MappingError, ValidationError};
use crate::io::map_records;
use crate::validate::{self, Issue};
use crate::warehouse::{self, Warehouse};

/// Where a dataset was when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Map,
    Validate,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "fetch",
            Stage::Map => "map",
            Stage::Validate => "validate",
            Stage::Load => "load",
        })
    }
}

/// Any per-dataset failure.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl DatasetError {
    pub fn stage(&self) -> Stage {
        match self {
            DatasetError::Fetch(_) => Stage::Fetch,
            DatasetError::Mapping(_) => Stage::Map,
            DatasetError::Validation(_) => Stage::Validate,
            DatasetError::Load(_) => Stage::Load,
        }
    }
}

#[derive(Debug)]
pub enum DatasetStatus {
    /// Table replaced with `rows` rows.
    Succeeded { rows: u64 },
    Failed(DatasetError),
    /// Validated, but loading was not requested.
    Skipped { records: usize },
}

#[derive(Debug)]
pub struct DatasetOutcome {
    pub dataset: Dataset,
    pub status: DatasetStatus,
    /// Non-fatal validation issues, kept even when the dataset loaded.
    pub warnings: Vec<Issue>,
}

impl DatasetOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, DatasetStatus::Failed(_))
    }
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    AllSucceeded,
    PartialFailure,
    AllFailed,
}

impl RunStatus {
    pub fn from_outcomes(outcomes: &[DatasetOutcome]) -> Self {
        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        if failed == 0 {
            RunStatus::AllSucceeded
        } else if failed == outcomes.len() {
            RunStatus::AllFailed
        } else {
            RunStatus::PartialFailure
        }
    }

    /// 0 only when nothing failed.
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::AllSucceeded => 0,
            RunStatus::PartialFailure | RunStatus::AllFailed => 1,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunStatus::AllSucceeded => "all datasets succeeded",
            RunStatus::PartialFailure => "partial failure",
            RunStatus::AllFailed => "all datasets failed",
        })
    }
}

/// Everything a run produced.
#[derive(Debug)]
pub struct PipelineRun {
    pub season: Season,
    /// Shared by every row written in this run.
    pub exported_at: DateTime<Utc>,
    pub outcomes: Vec<DatasetOutcome>,
}

impl PipelineRun {
    pub fn status(&self) -> RunStatus {
        RunStatus::from_outcomes(&self.outcomes)
    }

    pub fn outcome(&self, dataset: Dataset) -> Option<&DatasetOutcome> {
        self.outcomes.iter().find(|o| o.dataset == dataset)
    }
}

pub struct PipelineRunner<'a, T: Transport, S: Sleeper> {
    client: &'a ApiClient<T, S>,
    params: FetchParams,
    exported_at: DateTime<Utc>,
}

impl<'a, T: Transport, S: Sleeper> PipelineRunner<'a, T, S> {
    pub fn new(client: &'a ApiClient<T, S>, params: FetchParams, exported_at: DateTime<Utc>) -> Self {
        Self {
            client,
            params,
            exported_at,
        }
    }

    /// Process all three datasets in order.
    ///
    /// With no warehouse, datasets are fetched and validated only; those that
    /// pass come back as `Skipped`.
    pub fn run(&self, mut warehouse: Option<&mut dyn Warehouse>) -> PipelineRun {
        info!(
            season = %self.params.season,
            league = self.params.league,
            exported_at = %self.exported_at,
            load = warehouse.is_some(),
            "Starting EPL data pipeline"
        );

        let mut outcomes = Vec::with_capacity(Dataset::ALL.len());
        for dataset in Dataset::ALL {
            let store = warehouse.as_mut().map(|w| &mut **w as &mut dyn Warehouse);
            outcomes.push(self.run_dataset(dataset, store));
        }

        let run = PipelineRun {
            season: self.params.season,
            exported_at: self.exported_at,
            outcomes,
        };
        match run.status() {
            RunStatus::AllSucceeded => info!(status = %run.status(), "Pipeline completed"),
            status => warn!(status = %status, "Pipeline completed with errors"),
        }
        run
    }

    fn run_dataset(&self, dataset: Dataset, warehouse: Option<&mut dyn Warehouse>) -> DatasetOutcome {
        let span = info_span!("dataset", dataset = %dataset);
        let _enter = span.enter();

        let mut warnings = Vec::new();
        let status = match self.process(dataset, warehouse, &mut warnings) {
            Ok(status) => {
                info!(%dataset, "Dataset processed");
                status
            }
            Err(err) => {
                error!(%dataset, stage = %err.stage(), error = %err, "Dataset failed");
                DatasetStatus::Failed(err)
            }
        };

        DatasetOutcome {
            dataset,
            status,
            warnings,
        }
    }

    fn process(
        &self,
        dataset: Dataset,
        warehouse: Option<&mut dyn Warehouse>,
        warnings: &mut Vec<Issue>,
    ) -> Result<DatasetStatus, DatasetError> {
        let payload = self.client.fetch(dataset, &self.params)?;
        let records = map_records(dataset, &payload)?;
        info!(%dataset, records = records.len(), "Mapped records");

        let validation = validate::validate(&records);
        validation.log();
        warnings.clone_from(&validation.warnings);
        validation.ensure_passed()?;

        match warehouse {
            Some(store) => {
                let rows = warehouse::load_records(store, &records, self.exported_at)?;
                Ok(DatasetStatus::Succeeded { rows })
            }
            None => Ok(DatasetStatus::Skipped {
                records: records.len(),
            }),
        }
    }
}
