use rand::Rng;
use rand::seq::IndexedRandom;

/// Letters used for both the target and its flankers.
pub const DEFAULT_ALPHABET: [char; 3] = ['E', 'P', 'B'];

pub const ARRAY_SLOTS: usize = 11;
pub const LINE_BREAK_SLOTS: [usize; 2] = [3, 7];
pub const TARGET_SLOT: usize = 5;

/// A 3×3 crowding array laid out as text: three rows of three letters
/// separated by line breaks. The center letter is the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterArray {
    slots: [char; ARRAY_SLOTS],
}

impl LetterArray {
    /// Draws every letter slot independently and uniformly from `alphabet`.
    /// Returns `None` for an empty alphabet.
    pub fn generate<R: Rng + ?Sized>(alphabet: &[char], rng: &mut R) -> Option<Self> {
        let mut slots = ['\n'; ARRAY_SLOTS];
        for (i, slot) in slots.iter_mut().enumerate() {
            if !LINE_BREAK_SLOTS.contains(&i) {
                *slot = *alphabet.choose(rng)?;
            }
        }
        Some(Self { slots })
    }

    pub fn from_rows(rows: [[char; 3]; 3]) -> Self {
        let [top, middle, bottom] = rows;
        Self {
            slots: [
                top[0], top[1], top[2], '\n', middle[0], middle[1], middle[2], '\n', bottom[0],
                bottom[1], bottom[2],
            ],
        }
    }

    pub fn target(&self) -> char {
        self.slots[TARGET_SLOT]
    }

    /// The eight surrounding letters, row by row.
    pub fn flankers(&self) -> impl Iterator<Item = char> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != TARGET_SLOT && !LINE_BREAK_SLOTS.contains(i))
            .map(|(_, c)| *c)
    }

    pub fn text(&self) -> String {
        self.slots.iter().collect()
    }
}

/// Keys the experiment listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKey {
    /// A printable key, stored lowercase.
    Char(char),
    Space,
    Enter,
    Backspace,
    Escape,
}

impl ResponseKey {
    pub fn letter(c: char) -> Self {
        ResponseKey::Char(c.to_ascii_lowercase())
    }

    /// True when this key names `target`, ignoring case.
    pub fn matches_target(&self, target: char) -> bool {
        match self {
            ResponseKey::Char(c) => c.eq_ignore_ascii_case(&target),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn layout_has_line_breaks_in_fixed_slots() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let array = LetterArray::generate(&DEFAULT_ALPHABET, &mut rng).unwrap();
            let text = array.text();
            let rows: Vec<&str> = text.split('\n').collect();
            assert_eq!(rows.len(), 3);
            assert!(rows.iter().all(|r| r.chars().count() == 3));
            assert_eq!(rows[1].chars().nth(1), Some(array.target()));
            assert!(text.chars().filter(|c| *c != '\n').all(|c| DEFAULT_ALPHABET.contains(&c)));
            assert_eq!(array.flankers().count(), 8);
        }
    }

    #[test]
    fn every_letter_eventually_appears_as_target() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(LetterArray::generate(&DEFAULT_ALPHABET, &mut rng).unwrap().target());
        }
        assert_eq!(seen.len(), DEFAULT_ALPHABET.len());
    }

    #[test]
    fn empty_alphabet_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(LetterArray::generate(&[], &mut rng).is_none());
    }

    #[test]
    fn key_match_ignores_case() {
        assert!(ResponseKey::letter('E').matches_target('e'));
        assert!(ResponseKey::Char('p').matches_target('P'));
        assert!(!ResponseKey::Char('b').matches_target('E'));
        assert!(!ResponseKey::Space.matches_target(' '));
    }

    #[test]
    fn from_rows_places_center_as_target() {
        let array = LetterArray::from_rows([['E', 'E', 'E'], ['P', 'B', 'P'], ['E', 'E', 'E']]);
        assert_eq!(array.target(), 'B');
        assert_eq!(array.text(), "EEE\nPBP\nEEE");
    }
}
