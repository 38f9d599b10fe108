//! Application settings persistence
//!
//! Handles saving and loading user preferences.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Library settings
    #[serde(default)]
    pub library: LibrarySettings,
    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,
    /// Network settings
    #[serde(default)]
    pub network: NetworkSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySettings {
    /// Overrides the default database location
    pub database_path: Option<PathBuf>,
    /// Number of entries in the most played list
    #[serde(default = "default_most_played_limit")]
    pub most_played_limit: i64,
    /// Prefix written before every video id when exporting playlists
    #[serde(default = "default_export_base_url")]
    pub export_base_url: String,
}

fn default_most_played_limit() -> i64 {
    10
}

fn default_export_base_url() -> String {
    "https://music.youtube.com/watch?v=".to_string()
}

/// Storage-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Maximum size of the thumbnail cache in MB
    pub max_cache_mb: u64,
    /// Overrides the default cache directory
    pub cache_dir: Option<PathBuf>,
}

/// Proxy type for network connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProxyType {
    /// No proxy
    #[default]
    None,
    /// HTTP proxy
    Http,
    /// HTTPS proxy
    Https,
    /// Use system proxy settings
    System,
}

/// Network settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub proxy_type: ProxyType,
    pub proxy_host: String,
    pub proxy_port: u16,
}

impl NetworkSettings {
    /// Build proxy URL string from settings
    /// Returns None if proxy is disabled or incomplete
    pub fn proxy_url(&self) -> Option<String> {
        match self.proxy_type {
            ProxyType::None => None,
            ProxyType::System => std::env::var("HTTPS_PROXY")
                .or_else(|_| std::env::var("https_proxy"))
                .or_else(|_| std::env::var("HTTP_PROXY"))
                .or_else(|_| std::env::var("http_proxy"))
                .ok(),
            ProxyType::Http | ProxyType::Https => {
                if self.proxy_host.is_empty() || self.proxy_port == 0 {
                    return None;
                }
                let scheme = if self.proxy_type == ProxyType::Http {
                    "http"
                } else {
                    "https"
                };
                Some(format!("{}://{}:{}", scheme, self.proxy_host, self.proxy_port))
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library: LibrarySettings::default(),
            storage: StorageSettings::default(),
            network: NetworkSettings::default(),
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            database_path: None,
            most_played_limit: default_most_played_limit(),
            export_base_url: default_export_base_url(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            max_cache_mb: 200,
            cache_dir: None,
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            proxy_type: ProxyType::None,
            proxy_host: String::new(),
            proxy_port: 0,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn file_path() -> PathBuf {
        utils::config_dir().join("settings.json")
    }

    /// Load settings from file, or return defaults if not found
    pub fn load() -> Self {
        match Self::load_from_file(&Self::file_path()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save settings to the default file
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to_file(&Self::file_path())
    }

    /// Save settings to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Database location, honouring the override
    pub fn database_path(&self) -> PathBuf {
        self.library
            .database_path
            .clone()
            .unwrap_or_else(utils::default_database_path)
    }

    /// Thumbnail cache location, honouring the override
    pub fn thumbnails_dir(&self) -> PathBuf {
        match &self.storage.cache_dir {
            Some(dir) => dir.join("thumbnails"),
            None => utils::thumbnails_cache_dir(),
        }
    }
}

/// Errors that can occur with settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.library.most_played_limit = 25;
        settings.storage.max_cache_mb = 50;
        settings.save_to_file(&path).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "library": { "database_path": "/tmp/lib.sqlite" } }"#).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded.library.most_played_limit, 10);
        assert_eq!(loaded.database_path(), PathBuf::from("/tmp/lib.sqlite"));
        assert_eq!(loaded.storage, StorageSettings::default());
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            Settings::load_from_file(&path),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_proxy_url() {
        let mut network = NetworkSettings::default();
        assert_eq!(network.proxy_url(), None);

        network.proxy_type = ProxyType::Http;
        assert_eq!(network.proxy_url(), None);

        network.proxy_host = "127.0.0.1".into();
        network.proxy_port = 8080;
        assert_eq!(network.proxy_url().as_deref(), Some("http://127.0.0.1:8080"));
    }
}
