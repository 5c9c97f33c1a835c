//! Configuration file loading.
//!
//! This module handles loading groq-client configuration from TOML files
//! at XDG-compliant locations.

use crate::config::types::FileConfig;
use crate::error::ClientError;
use std::path::{Path, PathBuf};

/// Default configuration file name for project-local config.
const LOCAL_CONFIG_NAME: &str = "groq-client.toml";

/// Default configuration file name within XDG config directory.
const XDG_CONFIG_NAME: &str = "config.toml";

/// Application name for XDG directory lookup.
const APP_NAME: &str = "groq-client";

/// Loads configuration from the default search paths.
///
/// Search order:
/// 1. `./groq-client.toml` (project-local)
/// 2. `~/.config/groq-client/config.toml` (XDG config)
///
/// Returns an empty configuration if no config file is found.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be parsed.
pub fn load() -> Result<FileConfig, ClientError> {
    for path in search_paths() {
        if path.exists() {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            return from_path(&path);
        }
    }

    Ok(FileConfig::default())
}

/// Loads configuration from a specific file path.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file contains invalid TOML
/// - The TOML doesn't match the expected schema
pub fn from_path(path: &Path) -> Result<FileConfig, ClientError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ClientError::configuration(
            "config_file",
            format!("failed to read '{}': {}", path.display(), e),
        )
    })?;

    toml::from_str(&contents).map_err(|e| {
        ClientError::configuration(
            "config_file",
            format!("failed to parse '{}': {}", path.display(), e),
        )
    })
}

/// Parses configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or doesn't match the schema.
pub fn from_str(toml_str: &str) -> Result<FileConfig, ClientError> {
    toml::from_str(toml_str)
        .map_err(|e| ClientError::configuration("config", format!("invalid TOML: {e}")))
}

/// Returns the paths that would be searched for configuration files.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_NAME)];

    if let Some(dir) = xdg_config_dir() {
        paths.push(dir.join(XDG_CONFIG_NAME));
    }

    paths
}

/// Returns the path to the XDG config directory for groq-client.
///
/// This is `~/.config/groq-client` on most systems.
#[must_use]
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn from_str_parses_valid_toml() {
        let toml = r#"
api_key_env = "MY_GROQ_KEY"
default_model = "llama3-70b-8192"
timeout_secs = 30

[rate_limit]
wait = false
max_wait_ms = 2000
        "#;

        let config = from_str(toml).unwrap();

        assert_eq!(config.api_key_env.as_deref(), Some("MY_GROQ_KEY"));
        assert_eq!(config.model(), "llama3-70b-8192");
        assert_eq!(config.timeout_secs, Some(30));

        let rate_limit = config.rate_limit.unwrap().to_rate_limit_config();
        assert!(!rate_limit.wait_on_rate_limit);
        assert_eq!(rate_limit.max_wait, Duration::from_millis(2_000));
    }

    #[test]
    fn from_str_accepts_empty_document() {
        let config = from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn from_str_error_on_invalid_toml() {
        let result = from_str("this is not valid toml [[[");

        let err = result.unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn from_str_error_on_wrong_type() {
        let result = from_str("timeout_secs = \"soon\"");
        assert!(result.unwrap_err().is_configuration());
    }

    #[test]
    fn from_path_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "default_model = \"test-model\"\nstream_buffer = 4").unwrap();

        let config = from_path(&config_path).unwrap();

        assert_eq!(config.model(), "test-model");
        assert_eq!(config.stream_buffer, Some(4));
    }

    #[test]
    fn from_path_parse_error_is_not_nested() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "timeout_secs = [").unwrap();

        let message = from_path(&config_path).unwrap_err().to_string();

        assert!(message.starts_with("invalid configuration for 'config_file': failed to parse"));
        assert_eq!(message.matches("invalid configuration").count(), 1);
    }

    #[test]
    fn from_str_parses_logging_section() {
        let toml = r#"
[logging]
level = "debug"
log_dir = "/tmp/groq-client-logs"
        "#;

        let logging = from_str(toml).unwrap().logging.unwrap();

        assert!(logging.enabled);
        assert_eq!(logging.app_name, "groq-client");
        assert_eq!(logging.level, LogLevel::Debug);
        assert_eq!(logging.log_dir, Some(PathBuf::from("/tmp/groq-client-logs")));
    }

    #[test]
    fn from_path_error_on_missing_file() {
        let result = from_path(Path::new("/nonexistent/path/config.toml"));

        let err = result.unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("/nonexistent/path/config.toml"));
    }

    #[test]
    fn search_paths_starts_with_local() {
        let paths = search_paths();

        assert_eq!(paths[0], PathBuf::from(LOCAL_CONFIG_NAME));
    }

    #[test]
    fn xdg_config_dir_returns_path() {
        if let Some(dir) = xdg_config_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }
}
