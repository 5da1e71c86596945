use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::experiment::ExperimentMode;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV: &str = "RETHROW_LAB_CONFIG";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub mode: ExperimentMode,
    pub native_backtrace: bool,
    pub report: Option<PathBuf>,
    pub benchmark: Option<PathBuf>,
}

impl ExperimentConfig {
    /// Configuration named by [`CONFIG_ENV`], or defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => load_or_default(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

/// Load a JSON configuration from disk, falling back to defaults if the file is missing.
pub fn load_or_default<T>(path: &Path) -> Result<T>
where
    T: Default + DeserializeOwned,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    let value = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config from {}", path.display()))?;
    Ok(value)
}
