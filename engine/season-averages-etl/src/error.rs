//! Error types for each pipeline stage

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Transform,
    Connect,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Transform => "transform",
            Stage::Connect => "connect",
            Stage::Load => "load",
        };
        f.write_str(name)
    }
}

/// Failures retrieving the season averages payload
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request to {url} failed with status: {status}")]
    Status { status: reqwest::StatusCode, url: String },

    #[error("Failed to parse response body as JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Failures reshaping the payload into a table
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Record {index} is missing field '{field}'")]
    MissingField { field: String, index: usize },

    #[error("Field 'data' is not an array")]
    InvalidData,

    #[error("Record {index} is not a JSON object")]
    InvalidRecord { index: usize },

    #[error("Record {index} has a non-scalar value in field '{field}'")]
    UnsupportedValue { field: String, index: usize },
}

/// Failures obtaining the database credential
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Failed to read secret file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable {0} is not set")]
    MissingEnv(String),

    #[error("Secret is empty")]
    Empty,
}

/// Failures opening the database connection
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Unable to read database password: {0}")]
    Secret(#[from] SecretError),

    #[error("Invalid connection target: {message}")]
    InvalidTarget { message: String },

    #[error("Unable to connect to database server: {0}")]
    Connection(#[from] sqlx::Error),
}

/// Failures creating the table or inserting rows
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid SQL identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Failed to create table {table}: {source}")]
    CreateTable {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to insert rows into {table}: {source}")]
    Insert {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Transaction error: {0}")]
    Transaction(#[source] sqlx::Error),
}

/// Any stage failure, tagged with the stage that produced it
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Request error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Data processing error: {0}")]
    Transform(#[from] TransformError),

    #[error("Database connection error: {0}")]
    Connect(#[from] ConnectError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

impl EtlError {
    pub fn stage(&self) -> Stage {
        match self {
            EtlError::Fetch(_) => Stage::Fetch,
            EtlError::Transform(_) => Stage::Transform,
            EtlError::Connect(_) => Stage::Connect,
            EtlError::Load(_) => Stage::Load,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_attribution() {
        let err: EtlError =
            TransformError::MissingField { field: "pf".to_string(), index: 0 }.into();
        assert_eq!(err.stage(), Stage::Transform);
        assert_eq!(err.to_string(), "Data processing error: Record 0 is missing field 'pf'");

        let err: EtlError = ConnectError::from(SecretError::Empty).into();
        assert_eq!(err.stage(), Stage::Connect);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Fetch.to_string(), "fetch");
        assert_eq!(Stage::Load.to_string(), "load");
    }
}
