use anyhow::{Context, Result};
use season_averages_etl::logging::initialize_logging;
use season_averages_etl::{
    EnvSecretProvider, EtlConfig, FileSecretProvider, Pipeline, SecretProvider,
};
use std::process::ExitCode;
use tracing::{error, info};

const PASSWORD_ENV: &str = "ETL_DB_PASSWORD";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();

    let config = EtlConfig::load().context("Failed to load configuration")?;
    initialize_logging(&config.logging)?;

    info!("Starting season averages ETL v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Season {} for {} players into table {}",
        config.query.season,
        config.query.player_ids.len(),
        config.database.table_name
    );

    let secrets: Box<dyn SecretProvider> = if std::env::var_os(PASSWORD_ENV).is_some() {
        Box::new(EnvSecretProvider::new(PASSWORD_ENV))
    } else {
        Box::new(FileSecretProvider::new(config.database.resolve_password_file()))
    };

    let pipeline = Pipeline::new(config, secrets).context("Failed to create HTTP client")?;
    let report = pipeline.run().await;

    let elapsed = report.finished_at - report.started_at;
    if report.is_success() {
        info!("Loaded {} rows in {} ms", report.rows_loaded, elapsed.num_milliseconds());
        Ok(ExitCode::SUCCESS)
    } else {
        error!("Run ended in state: {}", report.state);
        Ok(ExitCode::FAILURE)
    }
}
