use crate::config::EtlConfig;
use crate::error::{EtlError, FetchError, Stage};
use crate::fetcher::SeasonAveragesFetcher;
use crate::loader::Loader;
use crate::secrets::SecretProvider;
use crate::transform::Transformer;
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Where a run currently is; `Failed` is absorbing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Fetching,
    Transforming,
    Connecting,
    Loading,
    Done,
    Failed(Stage),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Fetching => f.write_str("fetching"),
            PipelineState::Transforming => f.write_str("transforming"),
            PipelineState::Connecting => f.write_str("connecting"),
            PipelineState::Loading => f.write_str("loading"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Failed(stage) => write!(f, "failed during {}", stage),
        }
    }
}

/// Outcome of a single run
#[derive(Debug)]
pub struct RunReport {
    pub state: PipelineState,
    pub rows_loaded: usize,
    /// The API response had no `data` field, so nothing was loaded
    pub no_data: bool,
    pub error: Option<EtlError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.state == PipelineState::Done
    }
}

/// Fetch, transform and load, in that order, stopping at the first failure
pub struct Pipeline {
    config: EtlConfig,
    fetcher: SeasonAveragesFetcher,
    transformer: Transformer,
    secrets: Box<dyn SecretProvider>,
}

impl Pipeline {
    pub fn new(config: EtlConfig, secrets: Box<dyn SecretProvider>) -> Result<Self, FetchError> {
        let fetcher = SeasonAveragesFetcher::new(&config)?;
        let transformer = Transformer::new(config.columns.clone());

        Ok(Self { config, fetcher, transformer, secrets })
    }

    /// Run once. Stage failures are logged and reported, never propagated.
    pub async fn run(&self) -> RunReport {
        let started_at = Utc::now();
        let mut state = PipelineState::Fetching;

        let (rows_loaded, no_data, error) = match self.execute(&mut state).await {
            Ok(Some(rows)) => {
                info!("Process finished");
                (rows, false, None)
            }
            Ok(None) => {
                warn!("API response contained no data; nothing was loaded");
                (0, true, None)
            }
            Err(e) => {
                let stage = e.stage();
                error!("Stage {} failed: {}", stage, e);
                transition(&mut state, PipelineState::Failed(stage));
                (0, false, Some(e))
            }
        };

        if error.is_none() {
            transition(&mut state, PipelineState::Done);
        }

        RunReport { state, rows_loaded, no_data, error, started_at, finished_at: Utc::now() }
    }

    /// `Ok(None)` when the payload carried no data
    async fn execute(&self, state: &mut PipelineState) -> Result<Option<usize>, EtlError> {
        let request = self.config.query_request();
        let payload = self.fetcher.fetch(&request).await?;
        info!("Season averages retrieved successfully");

        transition(state, PipelineState::Transforming);
        let Some(table) = self.transformer.transform(&payload)? else {
            return Ok(None);
        };
        info!(
            "Data processed successfully: {} rows, {} columns",
            table.len(),
            table.columns().len()
        );

        transition(state, PipelineState::Connecting);
        let mut loader = Loader::connect(&self.config.database, self.secrets.as_ref()).await?;
        info!("Connected to the database successfully");

        transition(state, PipelineState::Loading);
        let rows = loader.load(&table, &self.config.database.table_name).await?;

        if let Err(e) = loader.close().await {
            warn!("Failed to close database connection cleanly: {}", e);
        }

        Ok(Some(rows))
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    if matches!(state, PipelineState::Failed(_)) {
        return;
    }
    debug!("Pipeline {} -> {}", state, next);
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_is_absorbing() {
        let mut state = PipelineState::Loading;
        transition(&mut state, PipelineState::Failed(Stage::Load));
        transition(&mut state, PipelineState::Done);
        assert_eq!(state, PipelineState::Failed(Stage::Load));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::Failed(Stage::Connect).to_string(), "failed during connect");
        assert_eq!(PipelineState::Transforming.to_string(), "transforming");
    }
}
