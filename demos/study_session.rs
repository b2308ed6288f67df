use std::f32::consts::PI;
use std::path::PathBuf;

use hanzi_cards::{
    config::AppConfig,
    speech::{wav::WavChannel, SpeechError},
    store::{FileBackend, Store},
    Catalog, StudyApp, SynthesisEngine, SynthesisResult,
};

/// Stand-in engine: a 440Hz tone per character, stretched by the rate.
struct ToneEngine;

impl SynthesisEngine for ToneEngine {
    fn synthesize(
        &mut self,
        text: &str,
        _lang: &str,
        rate: f32,
    ) -> Result<SynthesisResult, SpeechError> {
        let sample_rate = 24_000;
        let len = (text.chars().count() as f32 * 0.3 / rate * sample_rate as f32) as usize;
        let samples = (0..len)
            .map(|i| 0.2 * (2.0 * PI * 440.0 * i as f32 / sample_rate as f32).sin())
            .collect();
        Ok(SynthesisResult {
            samples,
            sample_rate,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(&PathBuf::from(path))?,
        None => AppConfig::default(),
    };
    let work_dir = std::env::temp_dir().join("hanzi-cards");
    let storage_path = config
        .storage_path
        .clone()
        .unwrap_or_else(|| work_dir.join("storage.json"));

    let store = Store::new(FileBackend::open(&storage_path)?);
    let channel = WavChannel::new(ToneEngine, &work_dir.join("audio"))?;
    let mut app = StudyApp::new(Catalog::builtin(), store, channel, config.speech);

    println!("Characters matching \"shan\":");
    for ch in app.filter("shan") {
        println!("  {} {}", ch.glyph, ch.pinyin);
    }

    if !app.can_start_learning() {
        for id in [4, 9, 10] {
            app.toggle(id)?;
        }
    }
    println!("Selected: {:?}", app.selection().ids());

    app.start_learning()?;
    loop {
        if let Some(ch) = app.current() {
            println!("Card {} {} {:?}", ch.glyph, ch.pinyin, ch.words);
        }
        app.speak_character();
        app.poll_speech();
        app.speak_word(0);
        app.poll_speech();
        if !app.next() {
            break;
        }
    }
    app.back();

    for path in app.speech().channel().rendered() {
        println!("Wrote {}", path.display());
    }
    println!("Selection saved to {}", storage_path.display());
    Ok(())
}
