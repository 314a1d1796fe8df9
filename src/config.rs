use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_ACTORS_URL: &str = "https://leipziger-ecken.de/jsonapi/akteure";
const DEFAULT_EVENTS_URL: &str = "https://leipziger-ecken.de/jsonapi/events";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub actors_url: String,
    pub events_url: String,
    pub page_size: usize,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            actors_url: DEFAULT_ACTORS_URL.to_string(),
            events_url: DEFAULT_EVENTS_URL.to_string(),
            page_size: 50,
            output_dir: PathBuf::from("./docs"),
        }
    }
}

impl AppConfig {
    /// Loads the configuration file if one was given, otherwise falls back
    /// to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<AppConfig> {
        match path {
            Some(path) => read_config(path)
                .with_context(|| format!("unable to load config {}", path.display())),
            None => Ok(AppConfig::default()),
        }
    }

    /// Rejects settings the walker cannot work with. A zero page size would
    /// never advance the offset, so it is refused before any fetch happens.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
