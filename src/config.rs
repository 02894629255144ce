use std::fmt;
use std::io;
use std::num::NonZeroUsize;

use crate::error::{LoadError, Result};

/// File produced by the upstream clean-up step.
pub const DEFAULT_INPUT_FILE: &str = "combined_ukhm_clean.csv";
/// Destination table, replaced on every run.
pub const DEFAULT_TABLE_NAME: &str = "price_paied";
/// Rows written per insert.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(50_000) {
    Some(size) => size,
    None => panic!("batch size must be non-zero"),
};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: &str = "5432";

// Reported in this order when absent.
const REQUIRED_KEYS: [&str; 3] = ["DB_USER", "DB_PASSWORD", "DB_NAME"];

/// How the destination table gets replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Drop, recreate, then insert batches straight into the destination.
    #[default]
    Replace,
    /// Load into a staging table and swap it in with a single transaction.
    Staged,
}

impl LoadMode {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(LoadMode::Replace),
            "staged" => Ok(LoadMode::Staged),
            other => Err(LoadError::InvalidConfig(format!(
                "DB_LOAD_MODE must be 'replace' or 'staged', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub database: String,
    pub input_file: String,
    pub table_name: String,
    pub load_mode: LoadMode,
    pub batch_size: NonZeroUsize,
}

impl Config {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary key lookup.
    /// Empty values are treated the same as unset ones.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingConfig(missing));
        }

        let load_mode = match get("DB_LOAD_MODE") {
            Some(mode) => LoadMode::parse(&mode)?,
            None => LoadMode::default(),
        };

        Ok(Self {
            user: get("DB_USER").unwrap_or_default(),
            password: get("DB_PASSWORD").unwrap_or_default(),
            host: get("DB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: get("DB_PORT").unwrap_or_else(|| DEFAULT_PORT.to_string()),
            database: get("DB_NAME").unwrap_or_default(),
            input_file: DEFAULT_INPUT_FILE.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            load_mode,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    pub fn with_input_file(mut self, input_file: impl Into<String>) -> Self {
        self.input_file = input_file.into();
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_load_mode(mut self, load_mode: LoadMode) -> Self {
        self.load_mode = load_mode;
        self
    }
}

/// Interpret the outcome of loading an optional `.env` file.
///
/// A file that does not exist is skipped. Any other failure (unreadable file,
/// malformed line, bad substitution) is a configuration error.
pub fn optional_env_file<T>(loaded: std::result::Result<T, dotenvy::Error>) -> Result<Option<T>> {
    match loaded {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LoadError::InvalidConfig(format!("Error loading .env file: {}", e))),
    }
}

// Keeps the password out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("input_file", &self.input_file)
            .field("table_name", &self.table_name)
            .field("load_mode", &self.load_mode)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn resolves_with_defaults() {
        let config = Config::resolve(lookup(&[
            ("DB_USER", "loader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "warehouse"),
        ]))
        .unwrap();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, "5432");
        assert_eq!(config.input_file, DEFAULT_INPUT_FILE);
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
        assert_eq!(config.batch_size.get(), 50_000);
        assert_eq!(config.load_mode, LoadMode::Replace);
    }

    #[test]
    fn overrides_host_and_port() {
        let config = Config::resolve(lookup(&[
            ("DB_USER", "loader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "warehouse"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
        ]))
        .unwrap();

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, "6543");
    }

    #[test]
    fn reports_every_missing_key() {
        let err = Config::resolve(lookup(&[("DB_PASSWORD", "secret")])).unwrap_err();
        match err {
            LoadError::MissingConfig(keys) => assert_eq!(keys, vec!["DB_USER", "DB_NAME"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_values_count_as_missing() {
        let err = Config::resolve(lookup(&[
            ("DB_USER", ""),
            ("DB_PASSWORD", ""),
            ("DB_NAME", ""),
        ]))
        .unwrap_err();
        match err {
            LoadError::MissingConfig(keys) => {
                assert_eq!(keys, vec!["DB_USER", "DB_PASSWORD", "DB_NAME"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parses_load_mode() {
        let config = Config::resolve(lookup(&[
            ("DB_USER", "loader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "warehouse"),
            ("DB_LOAD_MODE", "Staged"),
        ]))
        .unwrap();
        assert_eq!(config.load_mode, LoadMode::Staged);

        let err = Config::resolve(lookup(&[
            ("DB_USER", "loader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "warehouse"),
            ("DB_LOAD_MODE", "upsert"),
        ]))
        .unwrap_err();
        assert!(matches!(err, LoadError::InvalidConfig(_)));
    }

    #[test]
    fn default_batch_size() {
        assert_eq!(DEFAULT_BATCH_SIZE.get(), 50_000);
    }

    #[test]
    fn missing_env_file_is_skipped() {
        let loaded: std::result::Result<(), dotenvy::Error> =
            Err(dotenvy::Error::Io(io::Error::from(io::ErrorKind::NotFound)));
        assert!(optional_env_file(loaded).unwrap().is_none());
        assert_eq!(optional_env_file(Ok::<_, dotenvy::Error>(7)).unwrap(), Some(7));
    }

    #[test]
    fn unreadable_env_file_is_config_error() {
        let loaded: std::result::Result<(), dotenvy::Error> =
            Err(dotenvy::Error::Io(io::Error::from(io::ErrorKind::PermissionDenied)));
        let err = optional_env_file(loaded).unwrap_err();
        assert!(matches!(err, LoadError::InvalidConfig(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn malformed_env_file_is_config_error() {
        let loaded: std::result::Result<(), dotenvy::Error> =
            Err(dotenvy::Error::LineParse("DB_USER='loader".into(), 8));
        let err = optional_env_file(loaded).unwrap_err();
        assert!(err.to_string().contains("Error loading .env file"));
    }

    #[test]
    fn debug_hides_password() {
        let config = Config::resolve(lookup(&[
            ("DB_USER", "loader"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_NAME", "warehouse"),
        ]))
        .unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
