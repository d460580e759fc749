use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::platform::Platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub paths: PathsConfig,
    pub classify: ClassifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub catalog_file: PathBuf,
    pub steam_root: Option<PathBuf>,
    pub epic_root: Option<PathBuf>,
}

/// Tuning for the title classifier. The built-in tables are heuristics that
/// are known to misclassify edge cases, so they stay user-extensible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    pub low_id_threshold: Option<u32>,
    pub low_id_allowlist: Vec<String>,
    pub extra_denylist: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/home/user"));
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| home.join(".local/share"))
            .join("questlog");

        Self {
            general: GeneralConfig {
                log_level: "info".to_string(),
            },
            paths: PathsConfig {
                catalog_file: data_dir.join("catalog.json"),
                steam_root: None,
                epic_root: None,
            },
            classify: ClassifyConfig {
                low_id_threshold: None,
                low_id_allowlist: vec![],
                extra_denylist: vec![],
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".config"))
            .join("questlog")
            .join("config.toml")
    }

    /// Per-platform root override, if the user configured one.
    pub fn root_override(&self, platform: Platform) -> Option<&Path> {
        match platform {
            Platform::Steam => self.paths.steam_root.as_deref(),
            Platform::Epic => self.paths.epic_root.as_deref(),
            Platform::Ubisoft | Platform::Gog => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.paths.catalog_file, config.paths.catalog_file);
        assert_eq!(parsed.general.log_level, "info");
    }

    #[test]
    fn test_root_override_only_applies_to_filesystem_platforms() {
        let mut config = Config::default();
        config.paths.steam_root = Some(PathBuf::from("/mnt/steam"));
        assert_eq!(
            config.root_override(Platform::Steam),
            Some(Path::new("/mnt/steam"))
        );
        assert_eq!(config.root_override(Platform::Ubisoft), None);
    }
}
