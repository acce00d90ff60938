use crate::error::{CodaError, ErrorContext};
use crate::projection::FieldSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://coda.io/apis/v1";
pub const DEFAULT_ICON: &str = "icon.png";

const CONFIG_ENV: &str = "CODA_CONFIG";
const API_BASE_ENV: &str = "CODA_API_BASE";
const CACHE_DIR_ENV: &str = "CODA_CACHE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Coda API, without the trailing `/docs`
    pub api_base: String,
    /// Directory holding the dated cache directories
    pub cache_dir: PathBuf,
    /// Icon path attached to every launcher record
    pub icon: String,
    /// Upper bound on requests issued while following pagination tokens
    pub max_pages: usize,
    pub max_tables: usize,
    pub request_timeout_secs: u64,
    pub fields: FieldSchema,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            cache_dir: std::env::temp_dir(),
            icon: DEFAULT_ICON.to_string(),
            max_pages: 100,
            max_tables: 10,
            request_timeout_secs: 30,
            fields: FieldSchema::default(),
        }
    }
}

impl Config {
    /// Load the configuration file (if any) and apply environment overrides
    pub fn load() -> Result<Self, CodaError> {
        let lookup = |key: &str| std::env::var(key).ok();

        let config_path = match lookup(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_config_path(),
        };

        let mut config = match config_path {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, CodaError> {
        let contents = fs::read_to_string(path).coda_config_err(format!(
            "Failed to read configuration file at {}",
            path.display()
        ))?;

        let config: Self =
            toml::from_str(&contents).coda_config_err("Failed to parse configuration file")?;

        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Apply `CODA_API_BASE` and `CODA_CACHE_DIR` through the given lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_base) = lookup(API_BASE_ENV) {
            self.api_base = api_base;
        }
        if let Some(cache_dir) = lookup(CACHE_DIR_ENV) {
            self.cache_dir = PathBuf::from(cache_dir);
        }
    }

    pub fn validate(&self) -> Result<(), CodaError> {
        Self::validate_url(&self.api_base)?;

        if self.max_pages == 0 {
            return Err(CodaError::Config(
                "max_pages must be at least 1".to_string(),
            ));
        }

        if self.fields.allow.is_empty() {
            return Err(CodaError::Config(
                "fields.allow cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The `/docs` collection URL every endpoint hangs off
    pub fn docs_url(&self) -> String {
        format!("{}/docs", self.api_base.trim_end_matches('/'))
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("coda-alfred").join("config.toml"))
    }

    fn validate_url(url_str: &str) -> Result<(), CodaError> {
        let url = Url::parse(url_str)
            .map_err(|e| CodaError::Config(format!("Invalid URL '{url_str}': {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CodaError::Config(format!(
                "Invalid URL scheme '{scheme}': only HTTP and HTTPS are supported"
            ))),
        }
    }
}
