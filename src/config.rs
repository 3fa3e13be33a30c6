//! Application configuration management.

use std::path::{Path, PathBuf};

use color_eyre::Result;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Player configuration
    #[serde(default)]
    pub player: PlayerConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,
}

/// Server connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Archive server URL (e.g., "http://localhost:8080")
    pub url: String,
}

/// Player configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Volume level (0-100)
    #[serde(default = "default_volume")]
    pub volume: u8,
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Offer inline play controls on matching results
    #[serde(default)]
    pub play_mode: bool,
}

fn default_volume() -> u8 {
    80
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { url: String::new() }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { play_mode: false }
    }
}

impl Config {
    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))?;

        Ok(config_dir.join("asot-tui").join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        // Clamp volume to valid range (0-100)
        config.player.volume = config.player.volume.min(100);

        Ok(config)
    }

    /// Save configuration to file.
    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        Ok(())
    }

    /// Check if the configuration is valid for connecting.
    pub fn is_valid(&self) -> bool {
        !self.server.url.is_empty()
            && (self.server.url.starts_with("http://") || self.server.url.starts_with("https://"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.player.volume, 80);
        assert!(!config.ui.play_mode);
        assert!(!config.is_valid());
    }

    #[test]
    fn parses_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [server]
            url = "http://localhost:8080"

            [ui]
            play_mode = true
            "#,
        )
        .unwrap();

        assert!(config.is_valid());
        assert!(config.ui.play_mode);
        assert_eq!(config.player.volume, 80);
    }

    #[test]
    fn volume_clamps_to_100_on_load() {
        let path = std::env::temp_dir().join("asot-tui-volume-clamp-test.toml");
        std::fs::write(
            &path,
            r#"
            [player]
            volume = 150
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.player.volume, 100);
    }

    #[test]
    fn rejects_non_http_url() {
        let config: Config = toml::from_str(
            r#"
            [server]
            url = "localhost:8080"
            "#,
        )
        .unwrap();
        assert!(!config.is_valid());
    }
}
