use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::session::SessionDefaults;

/// Flat key/value settings stored as TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub map: BTreeMap<String, String>,
}

pub const KNOWN_KEYS: [&str; 5] = ["sets", "reps", "weight", "rest", "templates"];

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("speedrun").join("config"))
            .context("Could not determine config directory")
    }

    /// Missing file means empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        let content = toml::to_string(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to save config to {}", path.display()))
    }

    /// Session defaults with any configured overrides applied.
    pub fn session_defaults(&self) -> Result<SessionDefaults> {
        let mut defaults = SessionDefaults::default();

        if let Some(sets) = self.parsed::<u32>("sets")? {
            if sets == 0 {
                return Err(anyhow!("config key `sets` must be greater than zero"));
            }
            defaults.sets = sets;
        }
        if let Some(reps) = self.parsed::<u32>("reps")? {
            defaults.reps = reps;
        }
        if let Some(weight) = self.parsed::<f32>("weight")? {
            if !weight.is_finite() || weight < 0.0 {
                return Err(anyhow!("config key `weight` must be a non-negative number"));
            }
            defaults.weight = weight;
        }
        if let Some(rest) = self.parsed::<u32>("rest")? {
            defaults.rest_seconds = rest;
        }

        Ok(defaults)
    }

    pub fn templates_path(&self) -> Option<PathBuf> {
        self.map.get("templates").map(PathBuf::from)
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.map
            .get(key)
            .map(|v| {
                v.trim()
                    .parse::<T>()
                    .with_context(|| format!("config key `{key}` has invalid value `{v}`"))
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

impl OutputFmt {
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Print `value` as pretty JSON, or run `text` for human output.
pub fn emit<T: Serialize>(fmt: OutputFmt, value: &T, text: impl FnOnce()) -> Result<()> {
    match fmt {
        OutputFmt::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFmt::Text => text(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        Config {
            map: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn empty_config_gives_stock_defaults() {
        assert_eq!(Config::default().session_defaults().unwrap(), SessionDefaults::default());
    }

    #[test]
    fn overrides_apply() {
        let d = config(&[("sets", "5"), ("reps", "5"), ("weight", "82.5"), ("rest", "120")])
            .session_defaults()
            .unwrap();
        assert_eq!((d.sets, d.reps, d.weight, d.rest_seconds), (5, 5, 82.5, 120));
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(config(&[("sets", "0")]).session_defaults().is_err());
        assert!(config(&[("reps", "ten")]).session_defaults().is_err());
        assert!(config(&[("weight", "-5")]).session_defaults().is_err());
    }

    #[test]
    fn round_trips_through_toml_file() {
        let dir = std::env::temp_dir().join(format!("speedrun-cfg-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config");

        assert_eq!(Config::load(&path).unwrap(), Config::default());

        let cfg = config(&[("rest", "90"), ("templates", "/tmp/t.toml")]);
        cfg.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.templates_path(), Some(PathBuf::from("/tmp/t.toml")));

        fs::remove_dir_all(dir).unwrap();
    }
}
