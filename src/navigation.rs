//! Position within an ordered list of characters.
//!
//! A [`Cursor`] only tracks an index and a length; the list itself lives in a
//! [`Session`] (a fixed snapshot of the selection) or in the catalog for the
//! simple, persisted mode. Moving the cursor never goes out of bounds: calls
//! past either end are no-ops.

use crate::catalog::Character;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Nothing to navigate.
    Empty,
    /// A single card, which is both the first and the last.
    Single,
    AtStart,
    Middle,
    AtEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// Cursor at `index`, clamped into `0..len`.
    pub fn restore(len: usize, index: usize) -> Self {
        let clamped = index.min(len.saturating_sub(1));
        if clamped != index {
            log::debug!("Clamped restored cursor {index} to {clamped} (len {len})");
        }
        Self {
            index: clamped,
            len,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn can_next(&self) -> bool {
        self.index + 1 < self.len
    }

    pub fn can_previous(&self) -> bool {
        self.index > 0
    }

    /// Advance one step. Returns whether the index changed.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Step back once. Returns whether the index changed.
    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn position(&self) -> Position {
        match (self.len, self.index) {
            (0, _) => Position::Empty,
            (1, _) => Position::Single,
            (_, 0) => Position::AtStart,
            (len, i) if i + 1 == len => Position::AtEnd,
            _ => Position::Middle,
        }
    }
}

/// One run of the learning flow over a fixed list of characters.
///
/// The cursor always starts at the first card and is never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    cards: Vec<Character>,
    cursor: Cursor,
}

impl Session {
    pub fn new(cards: Vec<Character>) -> Self {
        let cursor = Cursor::new(cards.len());
        Self { cards, cursor }
    }

    pub fn cards(&self) -> &[Character] {
        &self.cards
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// The card under the cursor, or `None` for an empty session.
    pub fn current(&self) -> Option<&Character> {
        self.cards.get(self.cursor.index())
    }

    /// One-based progress as shown above the card, e.g. `"2 / 5"`.
    pub fn progress_label(&self) -> Option<String> {
        if self.cards.is_empty() {
            return None;
        }
        Some(format!("{} / {}", self.cursor.index() + 1, self.cards.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<Character> {
        vec![
            Character::new(1, "A", "a", &[]),
            Character::new(2, "B", "b", &[]),
            Character::new(3, "C", "c", &[]),
        ]
    }

    #[test]
    fn next_stops_at_last_card() {
        let mut session = Session::new(abc());
        assert_eq!(session.cursor().position(), Position::AtStart);

        session.cursor_mut().next();
        session.cursor_mut().next();
        assert!(!session.cursor_mut().next());
        assert_eq!(session.cursor().index(), 2);
        assert_eq!(session.current().map(|c| c.glyph.as_str()), Some("C"));
        assert_eq!(session.cursor().position(), Position::AtEnd);
    }

    #[test]
    fn repeated_moves_terminate_at_boundaries() {
        for len in 1..6 {
            let mut cursor = Cursor::new(len);
            for _ in 0..len + 3 {
                cursor.next();
            }
            assert_eq!(cursor.index(), len - 1);
            assert!(!cursor.next());
            assert_eq!(cursor.index(), len - 1);

            for _ in 0..len + 3 {
                cursor.previous();
            }
            assert_eq!(cursor.index(), 0);
            assert!(!cursor.previous());
            assert_eq!(cursor.index(), 0);
        }
    }

    #[test]
    fn positions_cover_every_state() {
        assert_eq!(Cursor::new(0).position(), Position::Empty);
        assert_eq!(Cursor::new(1).position(), Position::Single);

        let mut cursor = Cursor::new(3);
        assert_eq!(cursor.position(), Position::AtStart);
        cursor.next();
        assert_eq!(cursor.position(), Position::Middle);
        cursor.next();
        assert_eq!(cursor.position(), Position::AtEnd);
    }

    #[test]
    fn empty_cursor_never_moves() {
        let mut cursor = Cursor::new(0);
        assert!(!cursor.can_next());
        assert!(!cursor.can_previous());
        assert!(!cursor.next());
        assert!(!cursor.previous());
        assert_eq!(cursor.index(), 0);

        let session = Session::new(Vec::new());
        assert!(session.current().is_none());
        assert!(session.progress_label().is_none());
    }

    #[test]
    fn restore_clamps_into_range() {
        assert_eq!(Cursor::restore(3, 1).index(), 1);
        assert_eq!(Cursor::restore(3, 99).index(), 2);
        assert_eq!(Cursor::restore(0, 5).index(), 0);
    }

    #[test]
    fn progress_label_is_one_based() {
        let mut session = Session::new(abc());
        assert_eq!(session.progress_label().as_deref(), Some("1 / 3"));
        session.cursor_mut().next();
        assert_eq!(session.progress_label().as_deref(), Some("2 / 3"));
    }
}
