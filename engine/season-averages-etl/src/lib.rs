//! Season Averages ETL
//!
//! Batch job that fetches per-player season averages from the balldontlie API,
//! reshapes them into a typed table and appends the rows to a warehouse table,
//! creating the table when it does not exist yet.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod loader;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod secrets;
pub mod transform;

pub use config::{ColumnMapping, EtlConfig};
pub use error::{ConnectError, EtlError, FetchError, LoadError, SecretError, Stage, TransformError};
pub use fetcher::SeasonAveragesFetcher;
pub use loader::Loader;
pub use models::*;
pub use pipeline::{Pipeline, PipelineState, RunReport};
pub use secrets::{
    EnvSecretProvider, FileSecretProvider, Secret, SecretProvider, StaticSecretProvider,
};
pub use transform::Transformer;
