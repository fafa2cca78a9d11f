use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::duration::Duration;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// What the line above each bar shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibleMeta {
    /// Time signature, printed where it changes
    #[default]
    Meter,
    /// Bar number
    Number,
    /// Bar label
    Label,
    /// Length name of every chord
    Length,
}

impl VisibleMeta {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "meter" => Some(VisibleMeta::Meter),
            "number" => Some(VisibleMeta::Number),
            "label" => Some(VisibleMeta::Label),
            "length" => Some(VisibleMeta::Length),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Length of chords created in insert mode
    #[serde(default = "default_insert_duration")]
    pub insert_duration: Duration,
    #[serde(default)]
    pub visible_meta: VisibleMeta,
    #[serde(default)]
    pub continuous_playback: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            insert_duration: default_insert_duration(),
            visible_meta: VisibleMeta::default(),
            continuous_playback: false,
        }
    }
}

fn default_insert_duration() -> Duration {
    Duration::QUARTER
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Tempo given to new documents
    #[serde(default = "default_bpm")]
    pub bpm: u32,
    /// MIDI program given to new documents
    #[serde(default = "default_instrument")]
    pub instrument: u8,
    /// Substring of the MIDI output port name to open (first port if absent)
    #[serde(default)]
    pub port: Option<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            bpm: default_bpm(),
            instrument: default_instrument(),
            port: None,
        }
    }
}

fn default_bpm() -> u32 {
    120
}

fn default_instrument() -> u8 {
    24
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Theme colour overrides, `name = "#RRGGBB"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.editor.insert_duration, Duration::QUARTER);
        assert_eq!(config.editor.visible_meta, VisibleMeta::Meter);
        assert!(!config.editor.continuous_playback);
        assert_eq!(config.playback.bpm, 120);
        assert_eq!(config.playback.instrument, 24);
        assert!(config.playback.port.is_none());
        assert!(config.ui.colors.is_empty());
    }

    #[test]
    fn full_config() {
        let config: Config = toml::from_str(
            r##"
[editor]
insert_duration = "1/8"
visible_meta = "length"
continuous_playback = true

[playback]
bpm = 90
instrument = 25
port = "FluidSynth"

[ui.colors]
cursor = "#FF0000"
"##,
        )
        .unwrap();
        assert_eq!(config.editor.insert_duration, Duration::new(1, 8));
        assert_eq!(config.editor.visible_meta, VisibleMeta::Length);
        assert!(config.editor.continuous_playback);
        assert_eq!(config.playback.bpm, 90);
        assert_eq!(config.playback.port.as_deref(), Some("FluidSynth"));
        assert_eq!(config.ui.colors["cursor"], "#FF0000");
    }

    #[test]
    fn bad_duration_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[editor]\ninsert_duration = \"1/0\"\n");
        assert!(result.is_err());
    }
}
