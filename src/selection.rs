//! The set of characters chosen for study.

use std::collections::HashSet;

use crate::catalog::Character;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Empty,
    NonEmpty,
}

/// Outcome of [`Selection::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Ordered selection without duplicate ids. Order is the order of most recent
/// addition: removing and re-adding a character moves it to the end.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    characters: Vec<Character>,
    ids: HashSet<u32>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a selection from persisted records, keeping the first
    /// occurrence of any repeated id.
    pub fn restore(characters: Vec<Character>) -> Self {
        let mut selection = Self::new();
        for ch in characters {
            if selection.ids.insert(ch.id) {
                selection.characters.push(ch);
            } else {
                log::debug!("Dropping duplicate stored character {}", ch.id);
            }
        }
        selection
    }

    pub fn toggle(&mut self, character: &Character) -> Toggled {
        if self.ids.remove(&character.id) {
            self.characters.retain(|c| c.id != character.id);
            Toggled::Removed
        } else {
            self.ids.insert(character.id);
            self.characters.push(character.clone());
            Toggled::Added
        }
    }

    pub fn clear(&mut self) {
        self.characters.clear();
        self.ids.clear();
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn as_slice(&self) -> &[Character] {
        &self.characters
    }

    pub fn ids(&self) -> Vec<u32> {
        self.characters.iter().map(|c| c.id).collect()
    }

    pub fn state(&self) -> SelectionState {
        if self.is_empty() {
            SelectionState::Empty
        } else {
            SelectionState::NonEmpty
        }
    }

    /// The learning flow can only be entered with at least one character.
    pub fn can_start_learning(&self) -> bool {
        self.state() == SelectionState::NonEmpty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars() -> Vec<Character> {
        vec![
            Character::new(1, "A", "a", &[]),
            Character::new(2, "B", "b", &[]),
            Character::new(3, "C", "c", &[]),
        ]
    }

    #[test]
    fn toggle_adds_then_removes() {
        let c = chars();
        let mut selection = Selection::new();
        assert_eq!(selection.state(), SelectionState::Empty);
        assert!(!selection.can_start_learning());

        assert_eq!(selection.toggle(&c[0]), Toggled::Added);
        assert_eq!(selection.toggle(&c[1]), Toggled::Added);
        assert_eq!(selection.ids(), vec![1, 2]);
        assert_eq!(selection.state(), SelectionState::NonEmpty);

        assert_eq!(selection.toggle(&c[0]), Toggled::Removed);
        assert_eq!(selection.ids(), vec![2]);
        assert!(!selection.contains(1));
        assert!(selection.contains(2));
    }

    #[test]
    fn re_adding_moves_to_end() {
        let c = chars();
        let mut selection = Selection::new();
        for ch in &c {
            selection.toggle(ch);
        }
        selection.toggle(&c[0]);
        selection.toggle(&c[0]);
        assert_eq!(selection.ids(), vec![2, 3, 1]);
    }

    #[test]
    fn keeps_characters_toggled_an_odd_number_of_times() {
        let c = chars();
        // Sequence of indices into `c`.
        let sequence = [0, 1, 2, 1, 0, 2, 2, 1, 0];
        let mut selection = Selection::new();
        let mut counts = [0usize; 3];
        let mut last_added = [0usize; 3];
        for (step, &i) in sequence.iter().enumerate() {
            selection.toggle(&c[i]);
            counts[i] += 1;
            if counts[i] % 2 == 1 {
                last_added[i] = step;
            }
        }

        let mut expected: Vec<usize> = (0..3).filter(|&i| counts[i] % 2 == 1).collect();
        expected.sort_by_key(|&i| last_added[i]);
        let expected: Vec<u32> = expected.iter().map(|&i| c[i].id).collect();
        assert_eq!(expected, vec![3, 2, 1]);
        assert_eq!(selection.ids(), expected);
    }

    #[test]
    fn clear_empties_selection() {
        let c = chars();
        let mut selection = Selection::new();
        selection.toggle(&c[0]);
        selection.clear();
        assert!(selection.is_empty());
        assert!(!selection.contains(1));
        assert_eq!(selection.toggle(&c[0]), Toggled::Added);
    }

    #[test]
    fn restore_drops_duplicate_ids() {
        let c = chars();
        let selection = Selection::restore(vec![c[1].clone(), c[0].clone(), c[1].clone()]);
        assert_eq!(selection.ids(), vec![2, 1]);
    }
}
