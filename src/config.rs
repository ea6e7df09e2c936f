/// Configuration
///
/// Everything is optional: a missing file or missing keys fall back to the
/// defaults below. Lookup order is `--config PATH`, then
/// `<config dir>/image-rater/config.toml`, then built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::state::progress::DEFAULT_PROGRESS_FILE;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestConfig,
    pub session: SessionConfig,
    pub organize: OrganizeConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// File extensions considered images (case-insensitive)
    pub extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: ["png", "jpg", "jpeg", "gif"].map(String::from).to_vec(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Well-known progress file name inside the image folder
    pub progress_file: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            progress_file: DEFAULT_PROGRESS_FILE.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OrganizeConfig {
    /// Subfolder rejected images are moved into
    pub rejected_folder: String,
    /// Tier folders are named `<prefix><tier>`, e.g. `rated_5`
    pub tier_folder_prefix: String,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            rejected_folder: "rejected".to_string(),
            tier_folder_prefix: "rated_".to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the per-user location if a file
    /// exists there, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// `<config dir>/image-rater/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("image-rater");
        path.push("config.toml");
        Some(path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loading config");
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ingest.extensions.is_empty() {
            return Err(Error::Config("ingest.extensions must not be empty".to_string()));
        }
        for (key, value) in [
            ("session.progress_file", &self.session.progress_file),
            ("organize.rejected_folder", &self.organize.rejected_folder),
        ] {
            if value.is_empty() || value.contains(['/', '\\']) {
                return Err(Error::Config(format!("{} must be a plain file name", key)));
            }
        }
        Ok(())
    }
}
