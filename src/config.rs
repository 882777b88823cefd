use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Which select widget backs the database/table pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectWidget {
    /// Searchable text input with a filtered dropdown
    #[default]
    Combobox,
    /// Plain list stepped with the arrow keys
    Native,
}

/// Initial values for the wizard forms; reset restores these
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefaults {
    #[serde(default)]
    pub db_url: String,
    #[serde(default)]
    pub db_username: String,
    #[serde(default)]
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the generator backend, without the `/api/...` suffix
    pub server_url: String,
    /// Where downloaded archives are written
    pub download_dir: String,
    #[serde(default)]
    pub select_widget: SelectWidget,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub defaults: FormDefaults,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            download_dir: ".".to_string(),
            select_widget: SelectWidget::Combobox,
            request_timeout_secs: default_timeout_secs(),
            defaults: FormDefaults::default(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".crud-gen-tui"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn load() -> Option<Config> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return None;
        }

        let contents = fs::read_to_string(&config_path).ok()?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Option<Config> {
        match serde_json::from_str(contents) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring malformed config file: {}", e);
                None
            }
        }
    }

    /// Load the config, writing a default one on first run so it can be edited
    ///
    /// A malformed file is left untouched and defaults are used for this session.
    pub fn load_or_init() -> Config {
        if let Some(config) = Self::load() {
            return config;
        }

        let config = Config::default();
        let missing = Self::config_path().is_some_and(|p| !p.exists());
        if missing {
            if let Err(e) = config.save() {
                log::warn!("Could not write default config: {}", e);
            }
        }
        config
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config_fills_defaults() {
        let config = Config::parse(
            r#"{"server_url": "http://gen.internal:9000", "download_dir": "/tmp/out"}"#,
        )
        .unwrap();

        assert_eq!(config.server_url, "http://gen.internal:9000");
        assert_eq!(config.select_widget, SelectWidget::Combobox);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.defaults, FormDefaults::default());
    }

    #[test]
    fn test_parse_native_select_widget() {
        let config = Config::parse(
            r#"{"server_url": "x", "download_dir": ".", "select_widget": "native",
                "defaults": {"db_url": "jdbc:mysql://localhost:3306", "db_username": "root"}}"#,
        )
        .unwrap();

        assert_eq!(config.select_widget, SelectWidget::Native);
        assert_eq!(config.defaults.db_username, "root");
        assert_eq!(config.defaults.output_dir, "");
    }

    #[test]
    fn test_parse_malformed_config_returns_none() {
        assert!(Config::parse("{ not json").is_none());
    }

    #[test]
    fn test_request_timeout_never_zero() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
