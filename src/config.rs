//! Speech and application settings.
//!
//! ```rust
//! use hanzi_cards::config::SpeechConfigBuilder;
//!
//! let speech = SpeechConfigBuilder::default()
//!     .character_rate(0.5)
//!     .build()?;
//! assert_eq!(speech.lang, "zh-CN");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Voice parameters for the three playback modes.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default, build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct SpeechConfig {
    /// BCP 47 language tag handed to the speech channel.
    #[builder(setter(into))]
    pub lang: String,
    /// Rate for a character read together with its example words.
    pub character_rate: f32,
    /// Rate for a single example word.
    pub word_rate: f32,
    /// Rate for the bare character on the selection screen.
    pub preview_rate: f32,
    /// Rate for the bare character on the simple browsing page.
    pub display_rate: f32,
    /// How many example words are shown and read per card.
    pub max_example_words: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            lang: "zh-CN".to_string(),
            character_rate: 0.4,
            word_rate: 0.7,
            preview_rate: 0.7,
            display_rate: 0.8,
            max_example_words: 2,
        }
    }
}

impl SpeechConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rate("character_rate", self.character_rate)
            .and_then(|_| check_rate("word_rate", self.word_rate))
            .and_then(|_| check_rate("preview_rate", self.preview_rate))
            .and_then(|_| check_rate("display_rate", self.display_rate))
            .map_err(ConfigError::Invalid)
    }
}

impl SpeechConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let rates = [
            ("character_rate", self.character_rate),
            ("word_rate", self.word_rate),
            ("preview_rate", self.preview_rate),
            ("display_rate", self.display_rate),
        ];
        for (name, rate) in rates {
            if let Some(rate) = rate {
                check_rate(name, rate)?;
            }
        }
        Ok(())
    }
}

fn check_rate(name: &str, rate: f32) -> Result<(), String> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(format!("{name} must be a positive number, got {rate}"))
    }
}

/// Top-level settings, usually read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the persistence file lives. `None` lets the host choose.
    pub storage_path: Option<PathBuf>,
    pub speech: SpeechConfig,
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.speech.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
