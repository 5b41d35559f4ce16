use anyhow::{Context as _, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULTS: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub registry: RegistrySettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySettings {
    pub path: String,
    #[serde(default)]
    pub config_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub filter: String,
}

impl Settings {
    /// Load settings with layering: defaults → user settings file.
    pub fn load() -> Result<Self> {
        let user_file = project_dirs().map(|dirs| dirs.config_dir().join("settings.toml"));

        let user = match user_file {
            Some(path) if path.exists() => Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("could not read {}", path.display()))?,
            ),
            _ => None,
        };

        Self::from_layers(user.as_deref())
    }

    /// Keys present in `user` override the bundled defaults; tables merge.
    pub fn from_layers(user: Option<&str>) -> Result<Self> {
        let mut merged: toml::Value = toml::from_str(DEFAULTS)?;

        if let Some(user) = user {
            let overlay: toml::Value = toml::from_str(user).context("invalid user settings")?;
            merge(&mut merged, overlay);
        }

        Ok(merged.try_into()?)
    }

    pub fn registry_path(&self) -> Result<PathBuf> {
        expand_tilde(Path::new(&self.registry.path))
    }

    pub fn config_file(&self) -> Result<Option<PathBuf>> {
        self.registry
            .config_file
            .as_deref()
            .map(|file| expand_tilde(Path::new(file)))
            .transpose()
    }
}

pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "plugin-registry")
}

fn merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| anyhow!("cannot determine home directory"))?;

    Ok(home.join(rest))
}
