use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Firestore caps a single commit at 500 writes.
pub const MAX_BATCH_SIZE: usize = 500;

const PRODUCTION_BASE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub firestore: FirestoreConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub emulator_host: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        FirestoreConfig {
            project_id: String::new(),
            database_id: "(default)".to_string(),
            api_key: None,
            access_token: None,
            emulator_host: None,
            base_url: PRODUCTION_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl FirestoreConfig {
    /// REST root for this database, ending in `/documents`.
    pub fn documents_root(&self) -> String {
        let base = match &self.emulator_host {
            Some(host) => format!("http://{}/v1", host.trim_end_matches('/')),
            None => self.base_url.trim_end_matches('/').to_string(),
        };
        format!("{}/{}/documents", base, self.database_path())
    }

    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub subjects_path: PathBuf,
    pub themes_path: PathBuf,
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            subjects_path: PathBuf::from("data/subjects.json"),
            themes_path: PathBuf::from("data/themes.json"),
            batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl ImportConfig {
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Config::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads `path`, or `CATALOG_CONFIG` when no path is given, then lets the
    /// environment override individual settings.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("CATALOG_CONFIG").map(PathBuf::from));

        let config = match file {
            Some(file) => {
                let mut config = Self::from_file(&file)?;
                config.apply_overrides(|key| std::env::var(key).ok())?;
                config
            }
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Blank values count as unset.
    pub fn apply_overrides<F>(&mut self, raw_lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| raw_lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(project_id) = lookup("FIRESTORE_PROJECT_ID") {
            self.firestore.project_id = project_id;
        }
        if let Some(database_id) = lookup("FIRESTORE_DATABASE_ID") {
            self.firestore.database_id = database_id;
        }
        if let Some(api_key) = lookup("FIREBASE_API_KEY") {
            self.firestore.api_key = Some(api_key);
        }
        if let Some(token) =
            lookup("FIRESTORE_ACCESS_TOKEN").or_else(|| lookup("GOOGLE_OAUTH_ACCESS_TOKEN"))
        {
            self.firestore.access_token = Some(token);
        }
        if let Some(host) = lookup("FIRESTORE_EMULATOR_HOST") {
            self.firestore.emulator_host = Some(host);
        }
        if let Some(path) = lookup("CATALOG_SUBJECTS_PATH") {
            self.import.subjects_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CATALOG_THEMES_PATH") {
            self.import.themes_path = PathBuf::from(path);
        }
        if let Some(batch_size) = lookup("CATALOG_BATCH_SIZE") {
            self.import.batch_size = batch_size.parse()?;
        }
        if let Some(level) = lookup("CATALOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.firestore.project_id.trim().is_empty() {
            anyhow::bail!(
                "firestore.project_id is not set (use FIRESTORE_PROJECT_ID or a config file)"
            );
        }
        if self.firestore.database_id.trim().is_empty() {
            anyhow::bail!("firestore.database_id must not be empty");
        }
        Ok(())
    }
}
