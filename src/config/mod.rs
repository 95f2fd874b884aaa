use ratatui::style::Color;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    pub margin_horizontal: u16,
    pub margin_vertical: u16,
    pub focused_border: String,
    pub unfocused_border: String,
    pub syntax_theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            margin_horizontal: 2,
            margin_vertical: 1,
            focused_border: "#FFFFFF".to_string(),
            unfocused_border: "#AAAAAA".to_string(),
            syntax_theme: "base16-ocean.dark".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    pub sample_count: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { sample_count: 50 }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("review-queue").join("config.toml"))
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicit path must exist and parse. Without one, the default location
    /// is tried and anything missing or broken there falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let Some(path) = config_path() else {
            return Ok(Config::default());
        };
        if !path.exists() {
            return Ok(Config::default());
        }

        match Self::from_file(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("ignoring config: {}", e);
                Ok(Config::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the visual constants handed to the router and its pages.
    pub fn chrome(&self) -> Chrome {
        let defaults = Chrome::default();
        Chrome {
            margin_horizontal: self.ui.margin_horizontal,
            margin_vertical: self.ui.margin_vertical,
            focused_border: parse_color(&self.ui.focused_border).unwrap_or(defaults.focused_border),
            unfocused_border: parse_color(&self.ui.unfocused_border)
                .unwrap_or(defaults.unfocused_border),
        }
    }
}

fn parse_color(value: &str) -> Option<Color> {
    match Color::from_str(value) {
        Ok(color) => Some(color),
        Err(_) => {
            tracing::warn!(value, "unrecognised color in config, using default");
            None
        }
    }
}

/// Immutable layout and style constants shared by every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    pub margin_horizontal: u16,
    pub margin_vertical: u16,
    pub focused_border: Color,
    pub unfocused_border: Color,
}

impl Chrome {
    /// Usable content size for a terminal of the given size.
    pub fn content_size(&self, width: u16, height: u16) -> (u16, u16) {
        (
            width.saturating_sub(self.margin_horizontal * 2),
            height.saturating_sub(self.margin_vertical * 2),
        )
    }

    pub fn border(&self, focused: bool) -> Color {
        if focused {
            self.focused_border
        } else {
            self.unfocused_border
        }
    }
}

impl Default for Chrome {
    fn default() -> Self {
        Self {
            margin_horizontal: 2,
            margin_vertical: 1,
            focused_border: Color::Rgb(0xFF, 0xFF, 0xFF),
            unfocused_border: Color::Rgb(0xAA, 0xAA, 0xAA),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r##"
[ui]
margin_horizontal = 1
margin_vertical = 0
focused_border = "yellow"
unfocused_border = "#333333"
syntax_theme = "InspiredGitHub"

[source]
sample_count = 5
"##;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ui.margin_horizontal, 1);
        assert_eq!(config.ui.syntax_theme, "InspiredGitHub");
        assert_eq!(config.source.sample_count, 5);

        let chrome = config.chrome();
        assert_eq!(chrome.focused_border, Color::Yellow);
        assert_eq!(chrome.unfocused_border, Color::Rgb(0x33, 0x33, 0x33));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[source]\nsample_count = 3\n").unwrap();
        assert_eq!(config.ui, UiConfig::default());
        assert_eq!(config.source.sample_count, 3);
    }

    #[test]
    fn default_chrome_matches_default_config() {
        assert_eq!(Config::default().chrome(), Chrome::default());
    }

    #[test]
    fn invalid_color_falls_back() {
        let mut config = Config::default();
        config.ui.focused_border = "not-a-color".to_string();
        assert_eq!(config.chrome().focused_border, Chrome::default().focused_border);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn explicit_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui\nmargin = ").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn content_size_subtracts_margins() {
        let chrome = Chrome::default();
        assert_eq!(chrome.content_size(80, 24), (76, 22));
        assert_eq!(chrome.content_size(3, 1), (0, 0));
    }
}
