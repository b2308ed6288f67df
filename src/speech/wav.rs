//! A speech channel that renders utterances to WAV files.
//!
//! Useful where no live audio device exists: each utterance is synthesized by
//! a [`SynthesisEngine`] and written to `<out_dir>/utterance-<id>.wav`.
//! Rendering is synchronous, so every utterance is completed before `speak`
//! returns and there is never anything to cancel.

use std::path::{Path, PathBuf};

use crate::{SynthesisEngine, SynthesisResult};

use super::{Completion, SpeechChannel, SpeechError, Utterance};

pub struct WavChannel<E> {
    engine: E,
    out_dir: PathBuf,
    rendered: Vec<PathBuf>,
}

impl<E: SynthesisEngine> WavChannel<E> {
    /// Create a channel writing into `out_dir`, creating it if needed.
    pub fn new(engine: E, out_dir: &Path) -> Result<Self, SpeechError> {
        std::fs::create_dir_all(out_dir)?;
        Ok(Self {
            engine,
            out_dir: out_dir.to_path_buf(),
            rendered: Vec::new(),
        })
    }

    /// Files written so far, in utterance order.
    pub fn rendered(&self) -> &[PathBuf] {
        &self.rendered
    }

    fn render(&mut self, utterance: &Utterance) -> Result<PathBuf, SpeechError> {
        let result: SynthesisResult =
            self.engine
                .synthesize(&utterance.text, &utterance.lang, utterance.rate)?;
        let path = self
            .out_dir
            .join(format!("utterance-{:04}.wav", utterance.id.get()));
        result.write_wav(&path)?;
        log::info!(
            "Rendered {:.2}s of audio for {:?} to {}",
            result.duration_secs(),
            utterance.text,
            path.display()
        );
        Ok(path)
    }
}

impl<E: SynthesisEngine> SpeechChannel for WavChannel<E> {
    fn speak(&mut self, utterance: &Utterance, completion: Completion) -> Result<(), SpeechError> {
        match self.render(utterance) {
            Ok(path) => {
                self.rendered.push(path);
                completion.finished();
            }
            Err(e) => completion.failed(e.to_string()),
        }
        Ok(())
    }

    fn cancel_all(&mut self) {}
}
