//! # hanzi-cards
//!
//! Flashcard state for learning Chinese characters: a fixed character
//! catalog, a persisted study selection, card navigation and serialized
//! text-to-speech playback.
//!
//! ## Components
//!
//! - **Catalog**: the immutable bank of characters ([`catalog`])
//! - **Store**: fail-soft typed persistence over a key-value backend ([`store`])
//! - **Selection**: ordered, duplicate-free study set ([`selection`])
//! - **Navigation**: bounded cursor and learning sessions ([`navigation`])
//! - **Speech**: one utterance at a time over a pluggable channel ([`speech`])
//! - **App**: the screens tying it all together ([`app`])
//!
//! ## Quick Start
//!
//! ```ignore
//! use hanzi_cards::{app::StudyApp, catalog::Catalog, config::SpeechConfig};
//! use hanzi_cards::store::{MemoryBackend, Store};
//!
//! let mut app = StudyApp::new(
//!     Catalog::builtin(),
//!     Store::new(MemoryBackend::new()),
//!     my_channel,
//!     SpeechConfig::default(),
//! );
//! app.toggle(4);
//! app.start_learning()?;
//! app.speak_character();
//! ```

pub mod app;
pub mod catalog;
pub mod config;
pub mod navigation;
pub mod selection;
pub mod speech;
pub mod store;

use std::path::Path;

pub use app::{AppError, Screen, StudyApp};
pub use catalog::{Catalog, Character};
pub use speech::{SpeechChannel, SpeechError};

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug)]
pub struct SynthesisResult {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    /// Sample rate of the audio
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to a 32-bit float mono WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), SpeechError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// An offline text-to-speech engine.
///
/// Implement this to drive a [`speech::wav::WavChannel`] with a real model.
pub trait SynthesisEngine {
    /// Synthesize `text` in language `lang` at speed multiplier `rate`.
    fn synthesize(
        &mut self,
        text: &str,
        lang: &str,
        rate: f32,
    ) -> Result<SynthesisResult, SpeechError>;
}
