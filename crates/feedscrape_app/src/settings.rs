use std::fs;
use std::io;
use std::path::Path;

use feedscrape_core::DEFAULT_MAX_POSTS;
use feedscrape_engine::{AtomicFileWriter, PersistError};
use scrape_logging::{scrape_info, scrape_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SETTINGS_FILENAME: &str = ".feedscrape_settings.ron";

/// Preferences remembered between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_posts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_posts: DEFAULT_MAX_POSTS as u32,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to write settings: {0}")]
    Write(#[from] PersistError),
}

/// `Ok(None)` when no settings were saved yet.
pub fn read_settings(dir: &Path) -> Result<Option<Settings>, SettingsError> {
    let path = dir.join(SETTINGS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(ron::from_str(&content)?))
}

/// Saved settings, or the defaults when they are missing or unreadable.
pub fn load_settings(dir: &Path) -> Settings {
    match read_settings(dir) {
        Ok(Some(settings)) => {
            scrape_info!("Loaded settings from {:?}", dir.join(SETTINGS_FILENAME));
            settings
        }
        Ok(None) => Settings::default(),
        Err(err) => {
            scrape_warn!("Ignoring saved settings: {err}");
            Settings::default()
        }
    }
}

pub fn save_settings(dir: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let content = ron::ser::to_string_pretty(settings, ron::ser::PrettyConfig::new())?;
    AtomicFileWriter::new(dir.to_path_buf()).write(SETTINGS_FILENAME, content)?;
    Ok(())
}
