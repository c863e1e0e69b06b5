use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::models::QueryRequest;

/// Configuration for the season averages batch job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// balldontlie API configuration
    pub api: ApiConfig,

    /// Season and players to request
    pub query: QueryConfig,

    /// Keep-list of source fields with their destination column names, in output order
    pub columns: Vec<ColumnMapping>,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the stats API
    pub base_url: String,

    /// Resource path of the season averages endpoint
    pub season_averages_path: String,

    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub season: i32,
    pub player_ids: Vec<i64>,
}

/// One keep-list entry: source field and its destination column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: String,
    pub target: String,
}

impl ColumnMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; when set it replaces host/port/name/user
    pub url: Option<String>,

    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,

    /// Destination table
    pub table_name: String,

    /// Password file; relative paths resolve against the executable's directory
    pub password_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (compact, pretty, json)
    pub format: String,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://www.balldontlie.io".to_string(),
                season_averages_path: "/api/v1/season_averages".to_string(),
                timeout_secs: 30,
            },
            query: QueryConfig {
                season: 2017,
                player_ids: vec![
                    274, 2198, 473, 334, 319, 363, 2206, 159, 6, 184, 1412, 171, 44, 170, 2118,
                ],
            },
            columns: default_columns(),
            database: DatabaseConfig {
                url: None,
                host: "data-engineer-cluster.cyhh5bfevlmn.us-east-1.redshift.amazonaws.com"
                    .to_string(),
                port: 5439,
                name: "data-engineer-database".to_string(),
                user: "guille_shedden_coderhouse".to_string(),
                table_name: "average_player_season_stats".to_string(),
                password_file: PathBuf::from("pwd_coder.txt"),
            },
            logging: LoggingConfig { level: "info".to_string(), format: "compact".to_string() },
        }
    }
}

/// Fields kept from each season average record and the column each becomes
pub fn default_columns() -> Vec<ColumnMapping> {
    [
        ("player_id", "PlayerID"),
        ("games_played", "PartidosJugados"),
        ("season", "Temporada"),
        ("min", "MinutosPromedio"),
        ("ftm", "Libres"),
        ("fgm", "Dobles"),
        ("fg3m", "Triples"),
        ("dreb", "RebotesDefensivos"),
        ("oreb", "RebotesOfensivos"),
        ("ast", "Asistencias"),
        ("pf", "FaltasCometidas"),
    ]
    .into_iter()
    .map(|(source, target)| ColumnMapping::new(source, target))
    .collect()
}

impl EtlConfig {
    /// Defaults, then the TOML file named by `ETL_CONFIG_FILE`, then environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("ETL_CONFIG_FILE") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file; missing sections fall back to defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {:?}", path))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse configuration file: {:?}", path))
    }

    /// Apply `ETL_*` / `DATABASE_URL` overrides using the given lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("ETL_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Some(timeout) = lookup("ETL_API_TIMEOUT_SECS") {
            self.api.timeout_secs =
                timeout.trim().parse().context("ETL_API_TIMEOUT_SECS must be an integer")?;
        }

        if let Some(season) = lookup("ETL_SEASON") {
            self.query.season = season.trim().parse().context("ETL_SEASON must be an integer")?;
        }

        if let Some(ids) = lookup("ETL_PLAYER_IDS") {
            self.query.player_ids = parse_player_ids(&ids)?;
        }

        if let Some(db_url) = lookup("DATABASE_URL") {
            self.database.url = Some(db_url);
        }

        if let Some(host) = lookup("ETL_DB_HOST") {
            self.database.host = host;
        }

        if let Some(port) = lookup("ETL_DB_PORT") {
            self.database.port = port.trim().parse().context("ETL_DB_PORT must be a port number")?;
        }

        if let Some(name) = lookup("ETL_DB_NAME") {
            self.database.name = name;
        }

        if let Some(user) = lookup("ETL_DB_USER") {
            self.database.user = user;
        }

        if let Some(table) = lookup("ETL_TABLE_NAME") {
            self.database.table_name = table;
        }

        if let Some(path) = lookup("ETL_PASSWORD_FILE") {
            self.database.password_file = PathBuf::from(path);
        }

        if let Some(level) = lookup("ETL_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("ETL_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api.base_url))?;

        if self.api.timeout_secs == 0 {
            bail!("API timeout must be greater than 0");
        }

        if self.query.player_ids.is_empty() {
            bail!("At least one player id is required");
        }

        if self.columns.is_empty() {
            bail!("Column keep-list must not be empty");
        }

        let mut sources = HashSet::new();
        let mut targets = HashSet::new();
        for column in &self.columns {
            if !sources.insert(column.source.as_str()) {
                bail!("Duplicate source field in keep-list: {}", column.source);
            }
            if !targets.insert(column.target.as_str()) {
                bail!("Duplicate destination column: {}", column.target);
            }
            if !is_valid_identifier(&column.target) {
                bail!("Destination column is not a valid SQL identifier: {}", column.target);
            }
        }

        if !is_valid_identifier(&self.database.table_name) {
            bail!("Table name is not a valid SQL identifier: {}", self.database.table_name);
        }

        Ok(())
    }

    /// The request issued by the fetch stage
    pub fn query_request(&self) -> QueryRequest {
        QueryRequest::new(self.query.season, self.query.player_ids.clone())
    }

    /// Full endpoint URL for season averages
    pub fn season_averages_url(&self) -> String {
        format!(
            "{}{}",
            self.api.base_url.trim_end_matches('/'),
            self.api.season_averages_path
        )
    }
}

impl DatabaseConfig {
    /// Resolve the password file path
    pub fn resolve_password_file(&self) -> PathBuf {
        if self.password_file.is_absolute() {
            return self.password_file.clone();
        }

        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&self.password_file)))
            .unwrap_or_else(|| self.password_file.clone())
    }
}

fn parse_player_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse::<i64>().with_context(|| format!("Invalid player id: {}", id)))
        .collect()
}

/// Letters, digits and underscores, not starting with a digit
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
