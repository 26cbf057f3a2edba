use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analysis::DEFAULT_STUDENT_COUNT;
use crate::error::{CantineError, Result};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cantine.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the persisted JSON keys.
    pub data_dir: PathBuf,

    /// Initial per-day headcount divisor.
    pub student_count: i64,

    pub extraction: ExtractionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("cantine_data"),
            student_count: DEFAULT_STUDENT_COUNT,
            extraction: ExtractionConfig::default(),
        }
    }
}

/// Invoice extraction service settings. The key itself comes from the
/// environment variable named by `api_key_env`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub api_key_env: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ExtractionConfig {
    /// Read the API key from the environment.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(CantineError::Config(format!(
                "Missing extraction API key: set {} in the environment or .env",
                self.api_key_env
            ))),
        }
    }
}

/// Parse a config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path);
    let contents = fs::read_to_string(path)
        .map_err(|e| CantineError::Config(format!("Failed to read {:?}: {}", path, e)))?;
    Ok(toml::from_str(&contents)?)
}

/// Load `path` if given, else `cantine.toml` if present, else defaults.
pub fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE),
        None => {
            tracing::debug!("No config file, using defaults");
            Ok(AppConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
            student_count = 240

            [extraction]
            model = "gemini-2.0-flash"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.student_count, 240);
        assert_eq!(config.data_dir, PathBuf::from("cantine_data"));
        assert_eq!(config.extraction.model, "gemini-2.0-flash");
        assert_eq!(config.extraction.timeout_secs, 60);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "data_dir = \"/tmp/cantine\"").unwrap();
        let config = load_app_config(Some(file.path())).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cantine"));
        assert_eq!(config.student_count, DEFAULT_STUDENT_COUNT);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_config("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, CantineError::Config(_)));
    }

    #[test]
    fn test_missing_api_key() {
        let config = ExtractionConfig {
            api_key_env: "CANTINE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.api_key(), Err(CantineError::Config(_))));
    }
}
