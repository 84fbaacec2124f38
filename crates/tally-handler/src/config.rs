//! Configuration loading
//!
//! Precedence, lowest to highest: built-in defaults, TOML file, environment.

use std::fs;
use std::path::{Path, PathBuf};
use tally_core::{ConfigError, HandlerConfig};

/// Table name variable
pub const TABLE_NAME_ENV: &str = "TABLE_NAME";

/// Write concurrency override
pub const MAX_CONCURRENT_WRITES_ENV: &str = "TALLY_MAX_CONCURRENT_WRITES";

/// Failure to produce a usable configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`HandlerConfig`]
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Environment override has an unusable value
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    /// Resolved configuration failed validation
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Load and validate configuration from `path` (optional) and the process environment
///
/// # Errors
/// Returns [`ConfigLoadError`] if the file cannot be read or parsed, an
/// override is malformed, or the result fails validation.
pub fn load(path: Option<&Path>) -> Result<HandlerConfig, ConfigLoadError> {
    let config = resolve(path, |name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

/// Merge defaults, file and environment without validating
///
/// `env` looks up a variable by name, so callers (and tests) control the
/// environment seen.
///
/// # Errors
/// Returns [`ConfigLoadError`] if the file cannot be read or parsed or an
/// override is malformed.
pub fn resolve<F>(path: Option<&Path>, env: F) -> Result<HandlerConfig, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => HandlerConfig::default(),
    };

    if let Some(table) = env(TABLE_NAME_ENV).filter(|t| !t.is_empty()) {
        config.table_name = table;
    }
    if let Some(raw) = env(MAX_CONCURRENT_WRITES_ENV) {
        config.max_concurrent_writes = raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigLoadError::InvalidEnv {
                name: MAX_CONCURRENT_WRITES_ENV,
                value: raw,
            })?;
    }

    Ok(config)
}

/// Parse configuration from TOML text
///
/// # Errors
/// Returns the TOML error for malformed input or unknown value types.
pub fn from_toml_str(text: &str) -> Result<HandlerConfig, toml::de::Error> {
    toml::from_str(text)
}

fn read_file(path: &Path) -> Result<HandlerConfig, ConfigLoadError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_toml_str(&text).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = from_toml_str(
            r#"
            table_name = "carts"

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.table_name, "carts");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 50);
        assert_eq!(config.aggregate_sort_key, "totalquantity");
        assert_eq!(config.aggregation.product_prefix, "product#");
    }

    #[test]
    fn environment_sets_table_name() {
        let config = resolve(None, env(&[(TABLE_NAME_ENV, "shopping-cart")])).unwrap();
        assert_eq!(config.table_name, "shopping-cart");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_table_name_fails_validation() {
        let config = resolve(None, env(&[])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_concurrency_override() {
        let err = resolve(None, env(&[(MAX_CONCURRENT_WRITES_ENV, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigLoadError::InvalidEnv { .. }));

        let err = resolve(None, env(&[(MAX_CONCURRENT_WRITES_ENV, "0")])).unwrap_err();
        assert!(matches!(err, ConfigLoadError::InvalidEnv { .. }));
    }

    #[test]
    fn concurrency_override_applies() {
        let config = resolve(None, env(&[(MAX_CONCURRENT_WRITES_ENV, " 4 ")])).unwrap();
        assert_eq!(config.max_concurrent_writes, 4);
    }
}
