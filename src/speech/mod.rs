//! Serialized access to the platform's speech capability.
//!
//! The [`SpeechController`] owns a single [`SpeechChannel`] and keeps at most
//! one utterance in flight. Each request gets a fresh [`UtteranceId`]; the
//! channel reports the outcome through a [`Completion`] handle, which travels
//! back over an mpsc queue and is applied on the next [`SpeechController::poll`].
//! Outcomes for any id other than the one in flight belong to cancelled
//! requests and are dropped.
//!
//! # Playback Modes
//!
//! | Mode | Text | Rate (default) |
//! |---|---|---|
//! | character | glyph + up to two example words, joined by `，` | 0.4 |
//! | word | one example word, highlighted until done | 0.7 |
//! | preview | bare glyph, selection screen | 0.7 |
//! | glyph | bare glyph, simple browsing page | 0.8 |

pub mod wav;

use std::sync::mpsc::{self, Receiver, Sender};

use crate::catalog::Character;
use crate::config::SpeechConfig;

/// Separator placed between a character and its example words.
pub const WORD_SEPARATOR: char = '，';

#[derive(thiserror::Error, Debug)]
pub enum SpeechError {
    #[error("Speech channel unavailable: {0}")]
    Unavailable(String),
    #[error("Synthesis failed: {0}")]
    Synthesis(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(u64);

impl UtteranceId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A single request handed to the speech channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub lang: String,
    pub rate: f32,
    /// Example word index being read, for highlighting.
    pub word: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Finished(UtteranceId),
    Failed { id: UtteranceId, reason: String },
}

impl SpeechEvent {
    pub fn id(&self) -> UtteranceId {
        match self {
            SpeechEvent::Finished(id) => *id,
            SpeechEvent::Failed { id, .. } => *id,
        }
    }
}

/// One-shot handle a channel uses to report how an utterance ended.
///
/// Consuming `self` guarantees at most one report per utterance. A channel may
/// drop the handle without reporting only for utterances it cancelled.
#[derive(Debug)]
pub struct Completion {
    id: UtteranceId,
    tx: Sender<SpeechEvent>,
}

impl Completion {
    pub fn id(&self) -> UtteranceId {
        self.id
    }

    pub fn finished(self) {
        // The controller may already be gone; nothing is waiting then.
        let _ = self.tx.send(SpeechEvent::Finished(self.id));
    }

    pub fn failed(self, reason: impl Into<String>) {
        let _ = self.tx.send(SpeechEvent::Failed {
            id: self.id,
            reason: reason.into(),
        });
    }
}

/// The external speech capability.
pub trait SpeechChannel {
    /// Start speaking `utterance`, reporting its outcome through `completion`.
    fn speak(&mut self, utterance: &Utterance, completion: Completion) -> Result<(), SpeechError>;

    /// Stop everything currently playing or queued.
    fn cancel_all(&mut self);
}

/// Transient playback state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    in_flight: Option<UtteranceId>,
    active_word: Option<usize>,
}

impl PlaybackState {
    pub fn is_speaking(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<UtteranceId> {
        self.in_flight
    }

    /// Example word currently being read, if any.
    pub fn active_word(&self) -> Option<usize> {
        self.active_word
    }
}

pub struct SpeechController<C: SpeechChannel> {
    channel: C,
    config: SpeechConfig,
    state: PlaybackState,
    next_id: u64,
    tx: Sender<SpeechEvent>,
    rx: Receiver<SpeechEvent>,
}

impl<C: SpeechChannel> SpeechController<C> {
    pub fn new(channel: C, config: SpeechConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            channel,
            config,
            state: PlaybackState::default(),
            next_id: 1,
            tx,
            rx,
        }
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_speaking(&self) -> bool {
        self.state.is_speaking()
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Speak `text`. Returns `None` if an utterance is already in flight or
    /// the channel refused the request.
    pub fn speak(&mut self, text: &str, rate: f32, lang: &str) -> Option<UtteranceId> {
        self.start(text.to_string(), rate, lang.to_string(), None)
    }

    /// Read a character followed by its first example words.
    pub fn speak_character(&mut self, character: &Character) -> Option<UtteranceId> {
        let text = compose_character_text(character, self.config.max_example_words);
        let rate = self.config.character_rate;
        let lang = self.config.lang.clone();
        self.start(text, rate, lang, None)
    }

    /// Read one example word and mark it active until it finishes.
    pub fn speak_word(&mut self, character: &Character, index: usize) -> Option<UtteranceId> {
        let shown = character.words.len().min(self.config.max_example_words);
        if index >= shown {
            log::debug!(
                "No example word {index} for character {} ({shown} shown)",
                character.id
            );
            return None;
        }
        let text = character.words[index].clone();
        let rate = self.config.word_rate;
        let lang = self.config.lang.clone();
        self.start(text, rate, lang, Some(index))
    }

    /// Read the bare glyph, as the selection screen does.
    pub fn preview(&mut self, character: &Character) -> Option<UtteranceId> {
        let rate = self.config.preview_rate;
        let lang = self.config.lang.clone();
        self.start(character.glyph.clone(), rate, lang, None)
    }

    /// Read the bare glyph at the browsing page's rate.
    pub fn speak_glyph(&mut self, character: &Character) -> Option<UtteranceId> {
        let rate = self.config.display_rate;
        let lang = self.config.lang.clone();
        self.start(character.glyph.clone(), rate, lang, None)
    }

    /// Stop any in-flight utterance and return to idle. Safe to call at any time.
    pub fn cancel(&mut self) {
        self.channel.cancel_all();
        if let Some(id) = self.state.in_flight {
            log::debug!("Cancelled utterance {}", id.get());
        }
        self.state = PlaybackState::default();
        // Anything still queued refers to a cancelled utterance.
        while self.rx.try_recv().is_ok() {}
    }

    /// Apply queued completions. Returns whether the in-flight utterance ended.
    pub fn poll(&mut self) -> bool {
        let mut ended = false;
        while let Ok(event) = self.rx.try_recv() {
            ended |= self.handle(event);
        }
        ended
    }

    /// Apply a single completion. Returns whether it ended the in-flight utterance.
    pub fn handle(&mut self, event: SpeechEvent) -> bool {
        if self.state.in_flight != Some(event.id()) {
            log::debug!("Ignoring stale speech event for {}", event.id().get());
            return false;
        }
        if let SpeechEvent::Failed { id, reason } = &event {
            log::warn!("Utterance {} failed: {reason}", id.get());
        }
        self.state = PlaybackState::default();
        true
    }

    fn start(
        &mut self,
        text: String,
        rate: f32,
        lang: String,
        word: Option<usize>,
    ) -> Option<UtteranceId> {
        // A completion may be queued but not yet applied.
        self.poll();
        if self.state.is_speaking() {
            log::debug!("Speech request rejected, already speaking");
            return None;
        }

        // The platform may still hold a finished-but-unreported utterance.
        self.channel.cancel_all();

        let id = UtteranceId(self.next_id);
        self.next_id += 1;
        let utterance = Utterance {
            id,
            text,
            lang,
            rate,
            word,
        };

        self.state = PlaybackState {
            in_flight: Some(id),
            active_word: word,
        };
        let completion = Completion {
            id,
            tx: self.tx.clone(),
        };
        match self.channel.speak(&utterance, completion) {
            Ok(()) => {
                log::debug!(
                    "Speaking utterance {} {:?} at rate {}",
                    id.get(),
                    utterance.text,
                    utterance.rate
                );
                Some(id)
            }
            Err(e) => {
                log::warn!("Speech channel refused utterance {}: {e}", id.get());
                self.state = PlaybackState::default();
                None
            }
        }
    }
}

impl<C: SpeechChannel> Drop for SpeechController<C> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Text for whole-character mode: the glyph followed by up to `max_words`
/// example words.
pub fn compose_character_text(character: &Character, max_words: usize) -> String {
    let mut text = character.glyph.clone();
    for word in character.words.iter().take(max_words) {
        text.push(WORD_SEPARATOR);
        text.push_str(word);
    }
    text
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// Channel that records requests and holds completions until the test
    /// finishes or fails them.
    #[derive(Default)]
    pub(crate) struct FakeChannel {
        pub spoken: Vec<Utterance>,
        pub cancels: usize,
        pub overlaps: usize,
        pub refuse: bool,
        pending: Option<Completion>,
    }

    impl FakeChannel {
        pub fn finish(&mut self) {
            if let Some(completion) = self.pending.take() {
                completion.finished();
            }
        }

        pub fn fail(&mut self) {
            if let Some(completion) = self.pending.take() {
                completion.failed("synthesis engine crashed");
            }
        }

        pub fn playing(&self) -> bool {
            self.pending.is_some()
        }
    }

    impl SpeechChannel for FakeChannel {
        fn speak(
            &mut self,
            utterance: &Utterance,
            completion: Completion,
        ) -> Result<(), SpeechError> {
            if self.refuse {
                return Err(SpeechError::Unavailable("no voices installed".to_string()));
            }
            if self.pending.is_some() {
                self.overlaps += 1;
            }
            self.spoken.push(utterance.clone());
            self.pending = Some(completion);
            Ok(())
        }

        fn cancel_all(&mut self) {
            self.cancels += 1;
            self.pending = None;
        }
    }

    fn hao() -> Character {
        Character::new(34, "好", "hao3", &["好人", "你好", "好看"])
    }

    fn controller() -> SpeechController<FakeChannel> {
        SpeechController::new(FakeChannel::default(), SpeechConfig::default())
    }

    #[test]
    fn composes_character_with_two_words() {
        assert_eq!(compose_character_text(&hao(), 2), "好，好人，你好");
        let bare = Character::new(1, "一", "yi1", &[]);
        assert_eq!(compose_character_text(&bare, 2), "一");
    }

    #[test]
    fn rejects_requests_while_speaking() {
        let mut speech = controller();
        let first = speech.speak_character(&hao());
        assert!(first.is_some());
        assert!(speech.is_speaking());

        assert_eq!(speech.speak_word(&hao(), 0), None);
        assert_eq!(speech.speak("你", 1.0, "zh-CN"), None);
        assert_eq!(speech.channel().spoken.len(), 1);
        assert_eq!(speech.channel().overlaps, 0);

        let spoken = &speech.channel().spoken[0];
        assert_eq!(spoken.text, "好，好人，你好");
        assert_eq!(spoken.rate, 0.4);
        assert_eq!(spoken.lang, "zh-CN");
    }

    #[test]
    fn completion_returns_to_idle() {
        let mut speech = controller();
        speech.speak_word(&hao(), 1).unwrap();
        assert_eq!(speech.state().active_word(), Some(1));
        assert_eq!(speech.channel().spoken[0].rate, 0.7);

        assert!(!speech.poll());
        assert!(speech.is_speaking());

        speech.channel_mut().finish();
        assert!(speech.poll());
        assert!(!speech.is_speaking());
        assert_eq!(speech.state().active_word(), None);

        assert!(speech.speak_character(&hao()).is_some());
    }

    #[test]
    fn failure_returns_to_idle() {
        let mut speech = controller();
        speech.speak_word(&hao(), 0).unwrap();
        speech.channel_mut().fail();
        assert!(speech.poll());
        assert_eq!(speech.state(), &PlaybackState::default());
    }

    #[test]
    fn refused_request_stays_idle() {
        let mut speech = controller();
        speech.channel_mut().refuse = true;
        assert_eq!(speech.preview(&hao()), None);
        assert!(!speech.is_speaking());
    }

    #[test]
    fn word_index_limited_to_shown_words() {
        let mut speech = controller();
        assert_eq!(speech.speak_word(&hao(), 2), None);
        assert!(speech.channel().spoken.is_empty());
    }

    #[test]
    fn cancel_is_idempotent_and_ignores_late_events() {
        let mut speech = controller();
        speech.cancel();
        speech.cancel();
        assert!(!speech.is_speaking());

        let id = speech.speak_character(&hao()).unwrap();
        speech.cancel();
        assert!(!speech.is_speaking());

        let next = speech.preview(&hao()).unwrap();
        assert_ne!(id, next);
        assert!(!speech.handle(SpeechEvent::Finished(id)));
        assert!(speech.is_speaking());
        assert!(speech.handle(SpeechEvent::Finished(next)));
        assert!(!speech.is_speaking());
    }

    #[test]
    fn queued_completion_frees_slot_without_poll() {
        let mut speech = controller();
        speech.speak_character(&hao()).unwrap();
        speech.channel_mut().finish();

        let next = speech.speak_word(&hao(), 0);
        assert!(next.is_some());
        assert_eq!(speech.state().in_flight(), next);
        assert_eq!(speech.state().active_word(), Some(0));
        assert_eq!(speech.channel().spoken.len(), 2);
        assert_eq!(speech.channel().overlaps, 0);
    }

    #[test]
    fn queued_failure_frees_slot_without_poll() {
        let mut speech = controller();
        speech.preview(&hao()).unwrap();
        speech.channel_mut().fail();
        assert!(speech.speak_character(&hao()).is_some());
    }

    #[test]
    fn glyph_mode_reads_bare_glyph_at_display_rate() {
        let mut speech = controller();
        speech.speak_glyph(&hao()).unwrap();
        let spoken = &speech.channel().spoken[0];
        assert_eq!(spoken.text, "好");
        assert_eq!(spoken.rate, 0.8);
        assert_eq!(spoken.word, None);
    }

    /// Channel whose cancel count outlives the controller that owns it.
    struct CountingChannel {
        cancels: Rc<Cell<usize>>,
    }

    impl SpeechChannel for CountingChannel {
        fn speak(&mut self, _utterance: &Utterance, _completion: Completion) -> Result<(), SpeechError> {
            Ok(())
        }

        fn cancel_all(&mut self) {
            self.cancels.set(self.cancels.get() + 1);
        }
    }

    #[test]
    fn dropping_controller_cancels_speech() {
        let cancels = Rc::new(Cell::new(0));
        let mut speech = SpeechController::new(
            CountingChannel {
                cancels: Rc::clone(&cancels),
            },
            SpeechConfig::default(),
        );
        speech.speak_character(&hao()).unwrap();
        let before = cancels.get();

        drop(speech);
        assert_eq!(cancels.get(), before + 1);
    }

    #[test]
    fn new_utterance_cancels_channel_first() {
        let mut speech = controller();
        speech.preview(&hao()).unwrap();
        let cancels = speech.channel().cancels;
        speech.channel_mut().finish();
        speech.poll();
        speech.preview(&hao()).unwrap();
        assert_eq!(speech.channel().cancels, cancels + 1);
        assert_eq!(speech.channel().overlaps, 0);
    }
}
