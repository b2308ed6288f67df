//! Screen-level flow: choose characters, study them, or browse the catalog.
//!
//! ```text
//! Selecting ──start_learning──▶ Learning(Session)
//!     ▲  ◀────────back─────────────┘
//!     └──────────back──────────── Browsing (persisted cursor over the catalog)
//! ```
//!
//! Every user action runs to completion synchronously. When an action moves
//! to a new card, speech is cancelled before the index changes, so no two
//! utterances can overlap.

use crate::catalog::{Catalog, Character};
use crate::config::SpeechConfig;
use crate::navigation::{Cursor, Position, Session};
use crate::selection::{Selection, Toggled};
use crate::speech::{PlaybackState, SpeechChannel, SpeechController, UtteranceId};
use crate::store::{KeyValueBackend, Store};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Select at least one character before learning")]
    EmptySelection,
    #[error("Character {0} is not in the catalog")]
    UnknownCharacter(u32),
}

#[derive(Debug, Clone)]
pub enum Screen {
    Selecting,
    Learning(Session),
    Browsing,
}

pub struct StudyApp<B: KeyValueBackend, C: SpeechChannel> {
    catalog: Catalog,
    store: Store<B>,
    selection: Selection,
    /// Simple-mode cursor over the whole catalog.
    progress: Cursor,
    screen: Screen,
    speech: SpeechController<C>,
}

impl<B: KeyValueBackend, C: SpeechChannel> StudyApp<B, C> {
    /// Start the app, restoring the saved selection and simple-mode cursor.
    pub fn new(catalog: Catalog, store: Store<B>, channel: C, speech: SpeechConfig) -> Self {
        let stored = store.selected_characters();
        let stored_len = stored.len();
        // Stored records are refreshed from the catalog; unknown ids are dropped.
        let known: Vec<Character> = stored
            .into_iter()
            .filter_map(|c| catalog.get(c.id).cloned())
            .collect();
        let selection = Selection::restore(known);
        let progress = Cursor::restore(catalog.len(), store.current_progress());

        log::info!(
            "Restored {} selected characters, progress {}/{}",
            selection.len(),
            progress.index(),
            catalog.len()
        );

        let mut app = Self {
            catalog,
            store,
            selection,
            progress,
            screen: Screen::Selecting,
            speech: SpeechController::new(channel, speech),
        };
        if app.selection.len() != stored_len {
            log::warn!(
                "Dropped {} stored characters not in the catalog",
                stored_len - app.selection.len()
            );
            app.persist_selection();
        }
        app
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn speech(&self) -> &SpeechController<C> {
        &self.speech
    }

    pub fn speech_mut(&mut self) -> &mut SpeechController<C> {
        &mut self.speech
    }

    /// Catalog characters matching a search term, in display order.
    pub fn filter(&self, term: &str) -> Vec<&Character> {
        self.catalog.filter(term)
    }

    pub fn is_selected(&self, id: u32) -> bool {
        self.selection.contains(id)
    }

    pub fn toggle(&mut self, id: u32) -> Result<Toggled, AppError> {
        let character = self
            .catalog
            .get(id)
            .ok_or(AppError::UnknownCharacter(id))?;
        let toggled = self.selection.toggle(character);
        log::debug!("{toggled:?} character {id}, {} selected", self.selection.len());
        self.persist_selection();
        Ok(toggled)
    }

    pub fn clear(&mut self) {
        self.selection.clear();
        self.store.clear_selected_characters();
    }

    pub fn can_start_learning(&self) -> bool {
        self.selection.can_start_learning()
    }

    fn persist_selection(&mut self) {
        self.store
            .save_selected_characters(self.selection.as_slice());
    }

    /// Enter the learning flow over a snapshot of the current selection.
    pub fn start_learning(&mut self) -> Result<(), AppError> {
        if !self.can_start_learning() {
            return Err(AppError::EmptySelection);
        }
        self.speech.cancel();
        let session = Session::new(self.selection.as_slice().to_vec());
        log::info!("Starting session with {} characters", session.cards().len());
        self.screen = Screen::Learning(session);
        Ok(())
    }

    /// Enter simple mode at the saved position in the catalog.
    pub fn browse(&mut self) {
        self.speech.cancel();
        self.screen = Screen::Browsing;
    }

    /// Return to the selection screen, silencing the card being left.
    pub fn back(&mut self) {
        self.speech.cancel();
        self.screen = Screen::Selecting;
    }

    /// The card on screen, if any.
    pub fn current(&self) -> Option<&Character> {
        match &self.screen {
            Screen::Selecting => None,
            Screen::Learning(session) => session.current(),
            Screen::Browsing => self.catalog.at(self.progress.index()),
        }
    }

    /// Where the cursor sits, or `None` outside a navigable screen.
    pub fn position(&self) -> Option<Position> {
        match &self.screen {
            Screen::Selecting => None,
            Screen::Learning(session) => Some(session.cursor().position()),
            Screen::Browsing => Some(self.progress.position()),
        }
    }

    pub fn next(&mut self) -> bool {
        self.step(Cursor::can_next, Cursor::next)
    }

    pub fn previous(&mut self) -> bool {
        self.step(Cursor::can_previous, Cursor::previous)
    }

    fn step(&mut self, can_move: fn(&Cursor) -> bool, apply: fn(&mut Cursor) -> bool) -> bool {
        let allowed = match &self.screen {
            Screen::Selecting => false,
            Screen::Learning(session) => can_move(session.cursor()),
            Screen::Browsing => can_move(&self.progress),
        };
        if !allowed {
            return false;
        }

        self.speech.cancel();
        let index = match &mut self.screen {
            Screen::Selecting => return false,
            Screen::Learning(session) => {
                apply(session.cursor_mut());
                session.cursor().index()
            }
            Screen::Browsing => {
                apply(&mut self.progress);
                self.store.save_progress(self.progress.index());
                self.progress.index()
            }
        };
        log::debug!("Moved to card {index}");
        true
    }

    /// Read the current card. A study card is read with its example words,
    /// a browsed card as the bare glyph.
    pub fn speak_character(&mut self) -> Option<UtteranceId> {
        let character = self.current()?.clone();
        match self.screen {
            Screen::Browsing => self.speech.speak_glyph(&character),
            _ => self.speech.speak_character(&character),
        }
    }

    /// Read one example word of the current card.
    pub fn speak_word(&mut self, index: usize) -> Option<UtteranceId> {
        let character = self.current()?.clone();
        self.speech.speak_word(&character, index)
    }

    /// Read a catalog character on its own, as the selection grid does.
    pub fn preview(&mut self, id: u32) -> Option<UtteranceId> {
        let character = self.catalog.get(id)?.clone();
        self.speech.preview(&character)
    }

    /// Apply speech completions reported by the channel.
    pub fn poll_speech(&mut self) -> bool {
        self.speech.poll()
    }

    pub fn playback(&self) -> &PlaybackState {
        self.speech.state()
    }
}
