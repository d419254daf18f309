use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_PAGE_SIZE, DEFAULT_TOTAL_COUNT, DEFAULT_UTC_OFFSET_HOURS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Harvester configuration loaded from environment variables or a JSON file.
#[derive(Debug, Clone)]
pub struct Config {
    // Harvest target
    pub user_id: String,
    pub total_count: u32,
    pub forum_names: Vec<String>,
    pub mode: HarvestMode,

    // Platform session
    pub bduss: String,
    pub platform_base_url: String,
    pub platform_timeout: Duration,

    // Scheduling
    pub page_size: u32,
    pub concurrency: usize,

    // Output
    pub output_dir: PathBuf,
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestMode {
    /// Harvest the user's posts, optionally filtered by forum
    Posts,
    /// Harvest the forums the user follows
    Followed,
}

/// Shape of the JSON config file.
///
/// `user_id` may be written either as a string or as a bare number.
#[derive(Debug, Deserialize)]
struct FileConfig {
    user_id: UserRef,
    total_count: Option<u32>,
    forum_names: Option<Vec<String>>,
    #[serde(rename = "BDUSS")]
    bduss: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserRef {
    Text(String),
    Number(u64),
}

impl UserRef {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_for_user(required_env("HARVEST_USER_ID")?)
    }

    /// Load configuration from a JSON file.
    ///
    /// The file supplies the harvest target and credential; the remaining
    /// settings still come from the environment or their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an
    /// environment override is invalid.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::from_env_for_user(file.user_id.into_string())?;
        if let Some(total_count) = file.total_count {
            config.total_count = total_count;
        }
        if let Some(forum_names) = file.forum_names {
            config.forum_names = forum_names;
        }
        if let Some(bduss) = file.bduss {
            config.bduss = bduss;
        }
        Ok(config)
    }

    fn from_env_for_user(user_id: String) -> Result<Self, ConfigError> {
        Ok(Self {
            // Harvest target
            user_id,
            total_count: parse_env_u32("HARVEST_TOTAL_COUNT", DEFAULT_TOTAL_COUNT)?,
            forum_names: parse_list(&env_or_default("HARVEST_FORUM_NAMES", "")),
            mode: parse_harvest_mode(&env_or_default("HARVEST_MODE", "posts"))?,

            // Platform session
            bduss: env_or_default("BDUSS", ""),
            platform_base_url: env_or_default("PLATFORM_BASE_URL", "http://127.0.0.1:8000"),
            platform_timeout: Duration::from_secs(parse_env_u64("PLATFORM_TIMEOUT_SECS", 30)?),

            // Scheduling
            page_size: parse_env_u32("HARVEST_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            concurrency: parse_env_usize("HARVEST_CONCURRENCY", DEFAULT_CONCURRENCY)?,

            // Output
            output_dir: PathBuf::from(env_or_default("OUTPUT_DIR", ".")),
            utc_offset_hours: parse_env_i32("UTC_OFFSET_HOURS", DEFAULT_UTC_OFFSET_HOURS)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "HARVEST_USER_ID".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "HARVEST_PAGE_SIZE".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !(1..=DEFAULT_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidValue {
                name: "HARVEST_CONCURRENCY".to_string(),
                message: format!(
                    "must be within 1..={DEFAULT_CONCURRENCY}, got {}",
                    self.concurrency
                ),
            });
        }
        if let Err(e) = url::Url::parse(&self.platform_base_url) {
            return Err(ConfigError::InvalidValue {
                name: "PLATFORM_BASE_URL".to_string(),
                message: e.to_string(),
            });
        }
        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(ConfigError::InvalidValue {
                name: "UTC_OFFSET_HOURS".to_string(),
                message: format!("must be within -23..=23, got {}", self.utc_offset_hours),
            });
        }
        Ok(())
    }

    /// Configuration with defaults and no environment lookups.
    #[doc(hidden)]
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            user_id: "tb.1.test".to_string(),
            total_count: DEFAULT_TOTAL_COUNT,
            forum_names: Vec::new(),
            mode: HarvestMode::Posts,
            bduss: String::new(),
            platform_base_url: "http://127.0.0.1:8000".to_string(),
            platform_timeout: Duration::from_secs(10),
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            output_dir: PathBuf::from("."),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_i32(name: &str, default: i32) -> Result<i32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

/// Split a comma-separated list, dropping blank entries.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_harvest_mode(value: &str) -> Result<HarvestMode, ConfigError> {
    match value.to_lowercase().as_str() {
        "posts" => Ok(HarvestMode::Posts),
        "followed" | "followed_forums" => Ok(HarvestMode::Followed),
        _ => Err(ConfigError::InvalidValue {
            name: "HARVEST_MODE".to_string(),
            message: format!("must be 'posts' or 'followed', got '{value}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_harvest_mode() {
        assert_eq!(parse_harvest_mode("posts").unwrap(), HarvestMode::Posts);
        assert_eq!(parse_harvest_mode("POSTS").unwrap(), HarvestMode::Posts);
        assert_eq!(parse_harvest_mode("followed").unwrap(), HarvestMode::Followed);
        assert_eq!(
            parse_harvest_mode("followed_forums").unwrap(),
            HarvestMode::Followed
        );
        assert!(parse_harvest_mode("threads").is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("rust, 贴吧 ,,go"), vec!["rust", "贴吧", "go"]);
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(parse_env_u32("NONEXISTENT_VAR", 30).unwrap(), 30);
        assert_eq!(parse_env_i32("NONEXISTENT_VAR", -2).unwrap(), -2);
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let config = Config {
            page_size: 0,
            ..Config::for_testing()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { name, .. }) if name == "HARVEST_PAGE_SIZE"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            concurrency: 0,
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_concurrency_at_five() {
        let at_cap = Config {
            concurrency: 5,
            ..Config::for_testing()
        };
        assert!(at_cap.validate().is_ok());

        let above_cap = Config {
            concurrency: 6,
            ..Config::for_testing()
        };
        assert!(matches!(
            above_cap.validate(),
            Err(ConfigError::InvalidValue { name, .. }) if name == "HARVEST_CONCURRENCY"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = Config {
            platform_base_url: "not a url".to_string(),
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::for_testing().validate().is_ok());
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_reads_target() {
        std::env::set_var("HARVEST_USER_ID", "tb.1.env");
        std::env::set_var("HARVEST_FORUM_NAMES", "rust, golang");
        std::env::set_var("HARVEST_MODE", "followed");

        let config = Config::from_env().unwrap();

        std::env::remove_var("HARVEST_USER_ID");
        std::env::remove_var("HARVEST_FORUM_NAMES");
        std::env::remove_var("HARVEST_MODE");

        assert_eq!(config.user_id, "tb.1.env");
        assert_eq!(config.forum_names, vec!["rust", "golang"]);
        assert_eq!(config.mode, HarvestMode::Followed);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_requires_user() {
        std::env::remove_var("HARVEST_USER_ID");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingEnvVar(name)) if name == "HARVEST_USER_ID"
        ));
    }

    #[test]
    #[serial_test::serial]
    fn test_from_json_file_accepts_numeric_user_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"user_id": 123456, "total_count": 60, "forum_names": ["rust"], "BDUSS": "abc"}}"#
        )
        .unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert_eq!(config.user_id, "123456");
        assert_eq!(config.total_count, 60);
        assert_eq!(config.forum_names, vec!["rust"]);
        assert_eq!(config.bduss, "abc");
    }

    #[test]
    #[serial_test::serial]
    fn test_from_json_file_rejects_missing_user() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"total_count": 60}}"#).unwrap();

        assert!(matches!(
            Config::from_json_file(file.path()),
            Err(ConfigError::ParseFile { .. })
        ));
    }
}
