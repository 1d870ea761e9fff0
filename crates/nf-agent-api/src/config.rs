//! Agent API server configuration.
//!
//! Defaults, optionally overlaid by the TOML file named in `NF_CONFIG`,
//! then by individual environment variables (a `.env` file is honoured).

use std::path::{Path, PathBuf};

use anyhow::Context;
use nf_tabular::{ArchiveSource, Delimiter};
use serde::Deserialize;

use crate::inference::GeminiConfig;

/// Top-level API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Where the dataset archive is found and extracted.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Archive paths tried in order; the first existing file wins.
    #[serde(default = "default_archive_candidates")]
    pub archive_candidates: Vec<PathBuf>,
    #[serde(default = "default_extract_dir")]
    pub extract_dir: PathBuf,
    #[serde(default)]
    pub delimiter: Delimiter,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_archive_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("202401_NFs.zip"),
        PathBuf::from("data/202401_NFs.zip"),
    ]
}

fn default_extract_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            archive_candidates: default_archive_candidates(),
            extract_dir: default_extract_dir(),
            delimiter: Delimiter::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            data: DataConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load from `.env`, the optional `NF_CONFIG` file, and the environment.
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        let mut config = match std::env::var("NF_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file; missing keys take their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Apply overrides from `get` (the process environment in production).
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(host) = get("NF_HOST") {
            self.host = host;
        }
        if let Some(port) = get("NF_PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("NF_PORT is not a valid port: {port}"))?;
        }
        if let Some(archive) = get("NF_ARCHIVE_PATH") {
            self.data.archive_candidates.insert(0, PathBuf::from(archive));
        }
        if let Some(dir) = get("NF_EXTRACT_DIR") {
            self.data.extract_dir = PathBuf::from(dir);
        }
        if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")) {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(secs) = get("GEMINI_TIMEOUT_SECS") {
            self.gemini.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("GEMINI_TIMEOUT_SECS is not a number: {secs}"))?;
        }
        Ok(())
    }

    /// Dataset source described by `data`.
    pub fn dataset_source(&self) -> ArchiveSource {
        ArchiveSource {
            candidates: self.data.archive_candidates.clone(),
            extract_dir: self.data.extract_dir.clone(),
            delimiter: self.data.delimiter,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
