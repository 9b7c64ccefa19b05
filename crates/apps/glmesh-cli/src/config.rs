use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glmesh_wire::COMPANY_ID;
use serde::Deserialize;

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub company_id: u16,
    pub state_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self { company_id: COMPANY_ID, state_dir: None, log_level: "info".into() }
    }
}

impl CliConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load `explicit` if given, which must exist; otherwise the default
    /// location if a file is there, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match default_path() {
            Some(path) if path.is_file() => Self::from_path(path),
            _ => Ok(Self::default()),
        }
    }

    /// Where zones.json and scenes.json live.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("glmesh")))
            .unwrap_or_else(|| PathBuf::from(".glmesh"))
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("glmesh").join("config.toml"))
}
