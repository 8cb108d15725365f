// Configuration management
//
// Handles player configuration and settings persistence.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::apu::Channels;
use crate::audio::ResamplerKind;

/// Default configuration file path
const CONFIG_FILE: &str = "vgm_player.toml";

/// Configuration load/save errors
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read or written
    Io(io::Error),
    /// File contents are not valid TOML for this schema
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Player configuration
///
/// Stores all user-configurable playback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Output settings
    pub output: OutputConfig,

    /// Playback settings
    pub playback: PlaybackConfig,

    /// Channel toggles
    pub channels: ChannelConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Host sample rate in Hz (usually 44100 or 48000)
    pub sample_rate: u32,

    /// Resampling strategy
    pub resampler: ResamplerKind,
}

/// Playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Fade the track tail to silence instead of stopping abruptly
    pub fadeout: bool,
}

/// Per-channel enable toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub pulse1: bool,
    pub pulse2: bool,
    pub triangle: bool,
    pub noise: bool,
    pub dmc: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            output: OutputConfig {
                sample_rate: 44_100,
                resampler: ResamplerKind::default(),
            },
            playback: PlaybackConfig { fadeout: true },
            channels: ChannelConfig {
                pulse1: true,
                pulse2: true,
                triangle: true,
                noise: true,
                dmc: true,
            },
        }
    }
}

impl PlayerConfig {
    /// Load configuration from the default file or fall back to defaults
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration and saves it to the file.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| {
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save();
            config
        })
    }

    /// Load configuration from the default file
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(CONFIG_FILE)
    }

    /// Save configuration to a specific path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Mask of channels the configuration turns off
    pub fn disabled_channels(&self) -> Channels {
        let mut mask = Channels::empty();
        if !self.channels.pulse1 {
            mask |= Channels::PULSE1;
        }
        if !self.channels.pulse2 {
            mask |= Channels::PULSE2;
        }
        if !self.channels.triangle {
            mask |= Channels::TRIANGLE;
        }
        if !self.channels.noise {
            mask |= Channels::NOISE;
        }
        if !self.channels.dmc {
            mask |= Channels::DMC;
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.output.sample_rate, 44_100);
        assert!(config.playback.fadeout);
        assert!(config.channels.dmc);
        assert!(config.disabled_channels().is_empty());
    }

    #[test]
    fn test_disabled_channels_mask() {
        let mut config = PlayerConfig::default();
        config.channels.pulse2 = false;
        config.channels.noise = false;
        assert_eq!(
            config.disabled_channels(),
            Channels::PULSE2 | Channels::NOISE
        );
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = std::env::temp_dir().join("vgm_rs_config_round_trip.toml");
        let mut config = PlayerConfig::default();
        config.output.sample_rate = 48_000;
        config.channels.triangle = false;
        config.save_to(&path).unwrap();

        let loaded = PlayerConfig::load_from(&path).unwrap();
        assert_eq!(loaded.output.sample_rate, 48_000);
        assert!(!loaded.channels.triangle);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = PlayerConfig::load_from("definitely_missing_config.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join("vgm_rs_config_malformed.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let result = PlayerConfig::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_resampler_kind_serializes_snake_case() {
        let config = PlayerConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("resampler"));
        let expected = if cfg!(feature = "blip") {
            "band_limited"
        } else {
            "decimator"
        };
        assert!(text.contains(expected));
    }
}
