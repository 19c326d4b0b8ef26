//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "SERVERLESS_PROXY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load from the file named by [`CONFIG_ENV`], or fall back to defaults.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            tracing::info!(path = ?path, "Loading configuration");
            load_config(Path::new(&path))
        }
        None => Ok(ProxyConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [api_gateway]
            header_policy = "last_wins"

            [[filters]]
            kind = "require_header"
            header = "Authorization"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.filters.len(), 1);
        assert_eq!(
            config.api_gateway.header_policy,
            crate::config::HeaderMergePolicy::LastWins
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/serverless-proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse_config("[dispatch]\ndefault_charset = \"EBCDIC\"\n").unwrap_err();
        assert!(err.to_string().contains("dispatch.default_charset"));

        let err = parse_config("filters = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
