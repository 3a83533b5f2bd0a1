use crate::feeds::curiouscat::DEFAULT_ENDPOINT;
use crate::reader::DEFAULT_PAGE_SIZE;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub page_size: usize,
    /// Pre-filled in the username field of the TUI.
    pub username: String,
    pub user_agent: String,
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            username: String::new(),
            user_agent: format!("catfeed/{}", env!("CARGO_PKG_VERSION")),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("catfeed").join("config.toml"))
    }

    /// Load the config at `path`, or the default location when `None`.
    /// A missing file gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            bail!("endpoint must not be empty");
        }
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        Ok(())
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("catfeed").join("catfeed.log")))
            .unwrap_or_else(|| PathBuf::from("catfeed.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint, "https://curiouscat.live/api/v2.1/profile/");
        assert_eq!(config.page_size, 30);
        assert!(config.username.is_empty());
        assert!(config.user_agent.starts_with("catfeed/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("username = \"someone\"\nlog_level = \"debug\"\n");
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.username, "someone");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.page_size, 30);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            r#"
endpoint = "http://localhost:8080/profile/"
page_size = 10
username = "me"
user_agent = "test-agent"
log_level = "catfeed=trace"
log_file = "/tmp/catfeed-test.log"
"#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/profile/");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.log_file(), PathBuf::from("/tmp/catfeed-test.log"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let file = write_config("page_size = 0\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let file = write_config("page_size = \"many\"\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
