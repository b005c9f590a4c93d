use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{ChordType, DifficultyFilter};
use crate::settings::{
    BeginnerSettings, GameMode, Language, SelectionMode, Settings, SpeedSettings,
};

/// On-disk preferences. Flat so the file stays easy to edit by hand; the
/// per-mode flags are folded into mode-tagged [`Settings`] on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub game_mode: GameMode,
    pub countdown_secs: u8,
    pub show_on_keyboard: bool,
    pub auto_reveal: bool,
    pub sound: bool,
    pub chord_types: Vec<ChordType>,
    pub difficulty: DifficultyFilter,
    pub selection_mode: SelectionMode,
    pub selected_chords: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for Config {
    fn from(s: &Settings) -> Self {
        Self {
            language: s.language,
            game_mode: s.game_mode,
            countdown_secs: s.speed.countdown_secs(),
            show_on_keyboard: s.speed.show_on_keyboard,
            auto_reveal: s.beginner.auto_reveal,
            sound: s.sound_enabled,
            chord_types: s.chord_types.iter().copied().collect(),
            difficulty: s.difficulty,
            selection_mode: s.selection_mode,
            selected_chords: s.selected_chord_ids.iter().cloned().collect(),
        }
    }
}

impl From<Config> for Settings {
    fn from(c: Config) -> Self {
        Self {
            language: c.language,
            game_mode: c.game_mode,
            speed: SpeedSettings::new(c.countdown_secs, c.show_on_keyboard),
            beginner: BeginnerSettings {
                auto_reveal: c.auto_reveal,
            },
            sound_enabled: c.sound,
            chord_types: c.chord_types.into_iter().collect(),
            difficulty: c.difficulty,
            selection_mode: c.selection_mode,
            selected_chord_ids: c.selected_chords.into_iter().collect(),
        }
    }
}

/// Read-only source of preferences. Sessions never write back.
pub trait ConfigStore {
    fn load(&self) -> Config;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "triads") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("triads_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("no config at {} ({err}), using defaults", self.path.display());
                return Config::default();
            }
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(
                    "ignoring unreadable config {}: {err}",
                    self.path.display()
                );
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));

        assert_eq!(store.path(), dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();

        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            br#"{"game_mode": "beginner", "auto_reveal": true, "language": "fr"}"#,
        )
        .unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.game_mode, GameMode::Beginner);
        assert!(cfg.auto_reveal);
        assert_eq!(cfg.language, Language::Fr);
        assert_eq!(cfg.countdown_secs, Config::default().countdown_secs);
    }

    #[test]
    fn load_custom_config_into_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cfg = Config {
            language: Language::Fr,
            game_mode: GameMode::Speed,
            countdown_secs: 7,
            show_on_keyboard: false,
            auto_reveal: true,
            sound: false,
            chord_types: vec![ChordType::Minor],
            difficulty: DifficultyFilter::Advanced,
            selection_mode: SelectionMode::Selected,
            selected_chords: vec!["C#-minor".into(), "Eb-minor".into()],
        };
        fs::write(&path, serde_json::to_vec_pretty(&cfg).unwrap()).unwrap();

        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded, cfg);

        let settings = Settings::from(loaded);
        assert_eq!(settings.speed.countdown_secs(), 7);
        assert!(!settings.speed.show_on_keyboard);
        assert!(settings.beginner.auto_reveal);
        assert!(!settings.sound_enabled);
        assert!(settings.selected_chord_ids.contains("Eb-minor"));
    }

    #[test]
    fn out_of_range_countdown_is_clamped() {
        let cfg = Config {
            countdown_secs: 0,
            ..Config::default()
        };

        assert_eq!(Settings::from(cfg).speed.countdown_secs(), 1);
    }

    #[test]
    fn settings_roundtrip_through_config() {
        let settings = Settings::default();
        assert_eq!(Settings::from(Config::from(&settings)), settings);
    }
}
