//! Configuration file handling.
//!
//! The configuration file is stored at `$FINAPP_HOME/config.json` and names the drive folder and
//! workbook the tool operates on, the two sheet names it cares about, and where the OAuth
//! credentials live.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "finapp";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CREDENTIALS_JSON: &str = "credentials.json";
const CONFIG_JSON: &str = "config.json";

const DEFAULT_DRIVE_FOLDER: &str = "FinApp";
const DEFAULT_WORKBOOK_NAME: &str = "Tracking.xlsx";
const DEFAULT_TRACKING_SHEET: &str = "Movimientos";
const DEFAULT_APPEND_SHEET: &str = "Registro";
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINAPP_HOME` and from there it loads `$FINAPP_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and its subdirectories:
    /// - Creates an initial `config.json` with default settings
    /// - Moves `credentials_file` into its default location in the data dir
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/finapp`
    /// - `credentials_file` - The OAuth credentials JSON (client id/secret, refresh token). This
    ///   will be moved from its current path into the data directory.
    pub async fn create(dir: impl Into<PathBuf>, credentials_file: &Path) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finapp home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let credentials_destination = secrets.join(CREDENTIALS_JSON);
        utils::rename(credentials_file, &credentials_destination).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
        })
    }

    /// Validates that `finapp_home` and the files it must contain exist, and loads the config.
    pub async fn load(finapp_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = finapp_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("FinApp home is missing, run 'finapp init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
        };
        if config.config_file.local_workbook_path.is_none() && !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn drive_folder(&self) -> &str {
        &self.config_file.drive_folder
    }

    pub fn workbook_name(&self) -> &str {
        &self.config_file.workbook_name
    }

    pub fn tracking_sheet(&self) -> &str {
        &self.config_file.tracking_sheet
    }

    pub fn append_sheet(&self) -> &str {
        &self.config_file.append_sheet
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config_file.cache_ttl_seconds)
    }

    /// When set, the workbook is a plain local file and no network is touched.
    pub fn local_workbook(&self) -> Option<PathBuf> {
        self.config_file
            .local_workbook_path
            .as_ref()
            .map(|p| self.resolve(p.clone()))
    }

    /// Returns the stored `credentials_path` if set, otherwise the default secrets location.
    pub fn credentials_path(&self) -> PathBuf {
        let p = self
            .config_file
            .credentials_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CREDENTIALS_JSON));
        self.resolve(p)
    }

    /// Relative paths in the config file are interpreted relative to the home directory.
    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finapp",
///   "config_version": 1,
///   "drive_folder": "FinApp",
///   "workbook_name": "Tracking.xlsx",
///   "tracking_sheet": "Movimientos",
///   "append_sheet": "Registro",
///   "cache_ttl_seconds": 300
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finapp"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Drive folder the workbook lives in
    #[serde(default = "default_drive_folder")]
    drive_folder: String,

    /// Exact file name of the workbook within the folder
    #[serde(default = "default_workbook_name")]
    workbook_name: String,

    /// Sheet holding the transaction table
    #[serde(default = "default_tracking_sheet")]
    tracking_sheet: String,

    /// Sheet new records are appended to
    #[serde(default = "default_append_sheet")]
    append_sheet: String,

    /// How long a downloaded workbook may be served from memory
    #[serde(default = "default_cache_ttl_seconds")]
    cache_ttl_seconds: u64,

    /// Path to a local workbook; set this to bypass the drive entirely
    #[serde(skip_serializing_if = "Option::is_none", default)]
    local_workbook_path: Option<PathBuf>,

    /// Path to the OAuth credentials file (relative to the home dir or absolute)
    /// Defaults to $FINAPP_HOME/.secrets/credentials.json if not specified
    #[serde(skip_serializing_if = "Option::is_none", default)]
    credentials_path: Option<PathBuf>,
}

fn default_drive_folder() -> String {
    DEFAULT_DRIVE_FOLDER.to_string()
}

fn default_workbook_name() -> String {
    DEFAULT_WORKBOOK_NAME.to_string()
}

fn default_tracking_sheet() -> String {
    DEFAULT_TRACKING_SHEET.to_string()
}

fn default_append_sheet() -> String {
    DEFAULT_APPEND_SHEET.to_string()
}

fn default_cache_ttl_seconds() -> u64 {
    DEFAULT_CACHE_TTL_SECONDS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            drive_folder: default_drive_folder(),
            workbook_name: default_workbook_name(),
            tracking_sheet: default_tracking_sheet(),
            append_sheet: default_append_sheet(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            local_workbook_path: None,
            credentials_path: None,
        }
    }
}

impl ConfigFile {
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("finapp_home");
        let credentials_source = dir.path().join("downloaded.json");
        let credentials_content = r#"{"client_id":"a","client_secret":"b","refresh_token":"c","redirect_uri":"http://localhost"}"#;
        utils::write(&credentials_source, credentials_content)
            .await
            .unwrap();

        let config = Config::create(&home_dir, &credentials_source).await.unwrap();

        assert_eq!(config.drive_folder(), "FinApp");
        assert_eq!(config.workbook_name(), "Tracking.xlsx");
        assert_eq!(config.tracking_sheet(), "Movimientos");
        assert_eq!(config.append_sheet(), "Registro");
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert!(config.local_workbook().is_none());

        let moved = utils::read(&config.credentials_path()).await.unwrap();
        assert_eq!(credentials_content, moved);
        // the source file was moved, not copied
        assert!(!credentials_source.exists());
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("finapp_home");
        let credentials_source = dir.path().join("downloaded.json");
        utils::write(&credentials_source, "{}").await.unwrap();

        let created = Config::create(&home_dir, &credentials_source).await.unwrap();
        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(created.config_file, loaded.config_file);
        assert_eq!(created.root(), loaded.root());
    }

    #[tokio::test]
    async fn test_load_missing_home_is_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_minimal_config_gets_defaults() {
        let dir = TempDir::new().unwrap();
        let home = dir.path();
        utils::make_dir(&home.join(SECRETS)).await.unwrap();
        let json = r#"{"app_name": "finapp", "config_version": 1}"#;
        utils::write(&home.join(CONFIG_JSON), json).await.unwrap();

        let config = Config::load(home).await.unwrap();
        assert_eq!(config.workbook_name(), "Tracking.xlsx");
        assert_eq!(config.append_sheet(), "Registro");
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let home = dir.path();
        utils::make_dir(&home.join(SECRETS)).await.unwrap();
        let json = r#"{"app_name": "otra_cosa", "config_version": 1}"#;
        utils::write(&home.join(CONFIG_JSON), json).await.unwrap();

        let result = Config::load(home).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_local_workbook_resolves_relative_path() {
        let dir = TempDir::new().unwrap();
        let home = dir.path();
        utils::make_dir(&home.join(SECRETS)).await.unwrap();
        let json = r#"{
            "app_name": "finapp",
            "config_version": 1,
            "local_workbook_path": "Tracking.xlsx"
        }"#;
        utils::write(&home.join(CONFIG_JSON), json).await.unwrap();

        let config = Config::load(home).await.unwrap();
        let local = config.local_workbook().unwrap();
        assert!(local.is_absolute());
        assert!(local.ends_with("Tracking.xlsx"));
    }

    #[tokio::test]
    async fn test_serialization_omits_none_fields() {
        let config = ConfigFile::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("local_workbook_path"));
        assert!(!json.contains("credentials_path"));
    }
}
