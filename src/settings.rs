//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blockfall/settings.toml (or platform equivalent)

use crate::error::StoreError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Gameplay settings
    pub gameplay: GameplaySettings,
}

/// Key bindings (stored as strings for easy editing).
/// Each action accepts either one key or a list of keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(with = "one_or_many")]
    pub move_left: Vec<String>,
    #[serde(with = "one_or_many")]
    pub move_right: Vec<String>,
    #[serde(with = "one_or_many")]
    pub soft_drop: Vec<String>,
    #[serde(with = "one_or_many")]
    pub hard_drop: Vec<String>,
    #[serde(with = "one_or_many")]
    pub rotate_cw: Vec<String>,
    #[serde(with = "one_or_many")]
    pub rotate_ccw: Vec<String>,
    #[serde(with = "one_or_many")]
    pub hold: Vec<String>,
    #[serde(with = "one_or_many")]
    pub pause: Vec<String>,
    #[serde(with = "one_or_many")]
    pub quit: Vec<String>,
}

/// A single key is written as a string, several as an array
mod one_or_many {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Keys {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S: Serializer>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        match keys {
            [key] => serializer.serialize_str(key),
            _ => keys.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Keys::deserialize(deserializer)? {
            Keys::One(key) => vec![key],
            Keys::Many(keys) => keys,
        })
    }
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Ghost piece visibility
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Delayed Auto Shift in milliseconds
    pub das_ms: u64,
    /// Auto Repeat Rate in milliseconds
    pub arr_ms: u64,
    /// Repeat interval while soft drop is held
    pub soft_drop_ms: u64,
}

impl GameplaySettings {
    pub fn das(&self) -> Duration {
        Duration::from_millis(self.das_ms)
    }

    pub fn arr(&self) -> Duration {
        Duration::from_millis(self.arr_ms)
    }

    pub fn soft_drop(&self) -> Duration {
        Duration::from_millis(self.soft_drop_ms)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = |list: &[&str]| list.iter().map(|k| k.to_string()).collect::<Vec<_>>();
        Self {
            move_left: keys(&["Left"]),
            move_right: keys(&["Right"]),
            soft_drop: keys(&["Down"]),
            hard_drop: keys(&["Space"]),
            rotate_cw: keys(&["Up", "x"]),
            rotate_ccw: keys(&["z"]),
            hold: keys(&["c", "Shift"]),
            pause: keys(&["p", "Esc"]),
            quit: keys(&["q"]),
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            das_ms: 170,
            arr_ms: 50,
            soft_drop_ms: 50,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from a file; a missing or broken file yields defaults
    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => settings,
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!("ignoring unreadable settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), StoreError> {
        let path = Self::default_path().ok_or(StoreError::NoDirectory)?;
        self.save_to(&path)
    }

    /// Save settings to a file, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl VisualSettings {
    /// Get the block characters based on style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("blockfall-settings-{}-{}", std::process::id(), name))
            .join("settings.toml")
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = temp_file("roundtrip");
        let mut settings = Settings::default();
        settings.gameplay.das_ms = 120;
        settings.keys.hold = vec!["h".to_string()];
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_single_key_or_list() {
        let settings: Settings = toml::from_str(
            r#"
            [keys]
            move_left = "a"
            rotate_cw = ["w", "Up"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.keys.move_left, vec!["a"]);
        assert_eq!(settings.keys.rotate_cw, vec!["w", "Up"]);
        // Untouched sections keep their defaults
        assert_eq!(settings.keys.hard_drop, vec!["Space"]);
        assert_eq!(settings.gameplay, GameplaySettings::default());
    }

    #[test]
    fn test_missing_or_corrupt_file_gives_defaults() {
        let missing = temp_file("missing");
        assert_eq!(Settings::load_from(&missing), Settings::default());

        let corrupt = temp_file("corrupt");
        fs::create_dir_all(corrupt.parent().unwrap()).unwrap();
        fs::write(&corrupt, "gameplay = [[[").unwrap();
        assert_eq!(Settings::load_from(&corrupt), Settings::default());
        let _ = fs::remove_dir_all(corrupt.parent().unwrap());
    }

    #[test]
    fn test_durations() {
        let gameplay = GameplaySettings::default();
        assert_eq!(gameplay.das(), Duration::from_millis(170));
        assert_eq!(gameplay.arr(), Duration::from_millis(50));
        assert_eq!(gameplay.soft_drop(), Duration::from_millis(50));
    }
}
