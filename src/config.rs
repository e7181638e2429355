//! Configuration management for textlens.
//!
//! A TOML file (`textlens.toml` by default) is read first, then environment
//! variables override individual values. The result is resolved into
//! [`Settings`], which is passed explicitly to every component constructor.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::diesel_context::DieselDbContext;
use crate::repository::util::validate_database_url;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILENAME: &str = "textlens.toml";

/// Default database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "textlens.db";

/// Default bucket for rendered images.
pub const DEFAULT_BUCKET: &str = "analytics-images";

/// Default artifacts subdirectory name.
const ARTIFACTS_SUBDIR: &str = "artifacts";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which object store receives rendered images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Local directory tree, one subdirectory per bucket.
    #[default]
    Filesystem,
    /// S3/MinIO-style HTTP object store.
    Http,
}

/// Object storage for rendered images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    /// Filesystem root (defaults to `<data_dir>/artifacts`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Base URL of the HTTP object store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            bucket: DEFAULT_BUCKET.to_string(),
            root: None,
            endpoint: None,
            access_token: None,
            timeout_secs: 30,
        }
    }
}

/// Upstream file-storage service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5001".to_string(),
            timeout_secs: 30,
        }
    }
}

impl FileStorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Word-cloud rendering service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordCloudConfig {
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub width: u32,
    pub height: u32,
    pub timeout_secs: u64,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            api_key: None,
            width: 800,
            height: 600,
            timeout_secs: 60,
        }
    }
}

impl WordCloudConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5002".to_string(),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Overrides `<data_dir>/textlens.db`. Set via DATABASE_URL env var or config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    pub storage: StorageConfig,
    pub file_storage: FileStorageConfig,
    pub word_cloud: WordCloudConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Parse a config file from disk.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment-style overrides. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TEXTLENS_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Some(v) = get("TEXTLENS_BUCKET") {
            self.storage.bucket = v;
        }
        if let Some(v) = get("ARTIFACT_STORE_URL") {
            self.storage.backend = StorageBackend::Http;
            self.storage.endpoint = Some(v);
        }
        if let Some(v) = get("ARTIFACT_STORE_TOKEN") {
            self.storage.access_token = Some(v);
        }
        if let Some(v) = get("FILE_STORAGE_URL") {
            self.file_storage.endpoint = v;
        }
        if let Some(v) = get("WORD_CLOUD_URL") {
            self.word_cloud.endpoint = v;
        }
        if let Some(v) = get("WORD_CLOUD_API_KEY") {
            self.word_cloud.api_key = Some(v);
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }
}

/// Options controlling where configuration is read from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file (must exist).
    pub config_path: Option<PathBuf>,
    /// Skip environment overrides (tests).
    pub ignore_env: bool,
}

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Explicit database URL; `None` means SQLite inside `data_dir`.
    pub database_url: Option<String>,
    pub storage: StorageConfig,
    pub file_storage: FileStorageConfig,
    pub word_cloud: WordCloudConfig,
    pub server: ServerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(Config::default())
    }
}

impl Settings {
    pub fn from_config(config: Config) -> Self {
        Self {
            data_dir: config.data_dir.unwrap_or_else(|| PathBuf::from("data")),
            database_url: config.database_url,
            storage: config.storage,
            file_storage: config.file_storage,
            word_cloud: config.word_cloud,
            server: config.server,
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => format!("sqlite:{}", self.database_path().display()),
        }
    }

    /// Full path of the default SQLite database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_DATABASE_FILENAME)
    }

    /// Root directory of the filesystem artifact store.
    pub fn artifact_root(&self) -> PathBuf {
        self.storage
            .root
            .clone()
            .unwrap_or_else(|| self.data_dir.join(ARTIFACTS_SUBDIR))
    }

    /// Check the settings for values no component could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.bucket must not be empty".into()));
        }
        if self.storage.bucket.contains(['/', '\\']) || self.storage.bucket == ".." {
            return Err(ConfigError::Invalid(format!(
                "storage.bucket '{}' must be a single path segment",
                self.storage.bucket
            )));
        }
        if self.storage.backend == StorageBackend::Http && self.storage.endpoint.is_none() {
            return Err(ConfigError::Invalid(
                "storage.endpoint is required for the http storage backend".into(),
            ));
        }
        validate_database_url(&self.database_url()).map_err(ConfigError::Invalid)
    }

    /// Ensure all local directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        let mut dirs = vec![self.data_dir.clone()];
        if self.storage.backend == StorageBackend::Filesystem {
            dirs.push(self.artifact_root());
        }
        for dir in dirs {
            fs::create_dir_all(&dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory '{}': {}", dir.display(), e),
                )
            })?;
        }
        Ok(())
    }

    /// Create a database context using the configured database URL or path.
    pub fn create_db_context(&self) -> Result<DieselDbContext, diesel::result::Error> {
        DieselDbContext::from_url(&self.database_url())
    }
}

/// Load settings from the config file (if any) and the environment.
pub fn load_settings(options: &LoadOptions) -> Result<Settings, ConfigError> {
    let mut config = match options.config_path {
        Some(ref path) => Config::load_from_path(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILENAME);
            if default_path.exists() {
                Config::load_from_path(&default_path)?
            } else {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILENAME);
                Config::default()
            }
        }
    };

    if !options.ignore_env {
        config.apply_env();
    }

    let settings = Settings::from_config(config);
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.storage.bucket, "analytics-images");
        assert_eq!(settings.word_cloud.width, 800);
        assert_eq!(settings.word_cloud.height, 600);
        assert_eq!(settings.storage.backend, StorageBackend::Filesystem);
        assert!(settings.database_url().starts_with("sqlite:"));
        assert!(settings.database_url().ends_with("textlens.db"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            data_dir = "/srv/textlens"

            [storage]
            bucket = "clouds"

            [word_cloud]
            endpoint = "http://render:9000"
            width = 1024
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.bucket, "clouds");
        assert_eq!(config.storage.timeout_secs, 30);
        assert_eq!(config.word_cloud.width, 1024);
        assert_eq!(config.word_cloud.height, 600);
        assert_eq!(config.file_storage.endpoint, "http://localhost:5001");

        let settings = Settings::from_config(config);
        assert_eq!(
            settings.artifact_root(),
            PathBuf::from("/srv/textlens").join("artifacts")
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite:/tmp/x.db"),
            ("TEXTLENS_BUCKET", "other"),
            ("ARTIFACT_STORE_URL", "http://minio:9000"),
            ("WORD_CLOUD_API_KEY", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.database_url.as_deref(), Some("sqlite:/tmp/x.db"));
        assert_eq!(config.storage.bucket, "other");
        assert_eq!(config.storage.backend, StorageBackend::Http);
        assert_eq!(config.storage.endpoint.as_deref(), Some("http://minio:9000"));
        // Empty values do not override.
        assert_eq!(config.word_cloud.api_key, None);
    }

    #[test]
    fn test_validate_rejects_bad_bucket() {
        let mut settings = Settings::default();
        settings.storage.bucket = "a/b".to_string();
        assert!(settings.validate().is_err());
        settings.storage.bucket = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_http_requires_endpoint() {
        let mut settings = Settings::default();
        settings.storage.backend = StorageBackend::Http;
        assert!(settings.validate().is_err());
        settings.storage.endpoint = Some("http://minio:9000".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textlens.toml");
        fs::write(&path, "[server]\nbind = \"127.0.0.1:9999\"\n").unwrap();

        let settings = load_settings(&LoadOptions {
            config_path: Some(path),
            ignore_env: true,
        })
        .unwrap();
        assert_eq!(settings.server.bind, "127.0.0.1:9999");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let err = load_settings(&LoadOptions {
            config_path: Some(PathBuf::from("/definitely/not/here.toml")),
            ignore_env: true,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
