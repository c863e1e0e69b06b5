//! Database credential sources

use crate::error::SecretError;
use std::fmt;
use std::path::PathBuf;

/// A credential value; never printed by `Debug`
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Source of the database password, read once per connection
pub trait SecretProvider: Send + Sync {
    fn read(&self) -> Result<Secret, SecretError>;
}

/// Password stored as the entire contents of a file
#[derive(Debug, Clone)]
pub struct FileSecretProvider {
    path: PathBuf,
}

impl FileSecretProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretProvider for FileSecretProvider {
    fn read(&self) -> Result<Secret, SecretError> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|source| SecretError::Io { path: self.path.clone(), source })?;
        non_empty(contents)
    }
}

/// Password taken from an environment variable
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    var: String,
}

impl EnvSecretProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl SecretProvider for EnvSecretProvider {
    fn read(&self) -> Result<Secret, SecretError> {
        let value =
            std::env::var(&self.var).map_err(|_| SecretError::MissingEnv(self.var.clone()))?;
        non_empty(value)
    }
}

/// Fixed in-memory password
#[derive(Debug, Clone)]
pub struct StaticSecretProvider(Secret);

impl StaticSecretProvider {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Secret::new(value))
    }
}

impl SecretProvider for StaticSecretProvider {
    fn read(&self) -> Result<Secret, SecretError> {
        Ok(self.0.clone())
    }
}

// Editors commonly leave a trailing newline in password files.
fn non_empty(raw: String) -> Result<Secret, SecretError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SecretError::Empty);
    }
    Ok(Secret::new(trimmed))
}
