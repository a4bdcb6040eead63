// Copyright (C) 2020-2024 Andy Kurnia.

use super::{alphabet, dawg, error};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnagramMode {
    /// Words using every tile.
    Exact,
    /// Words using some of the tiles.
    Subset,
    /// Words containing every real tile, with any letters added.
    Superset,
}

/// Reusable scratch for anagram queries. Zero value works; not shareable
/// across threads while a query is running.
#[derive(Default)]
pub struct Anagrammer {
    freq: Vec<u16>,
    blanks: u16,
    query_len: usize,
}

impl Anagrammer {
    pub fn new() -> Self {
        Self::default()
    }

    fn common_init(&mut self, dawg: &dawg::Dawg) {
        self.freq.clear();
        self.freq.resize(dawg.alphabet().len() as usize + 1, 0);
        self.blanks = 0;
        self.query_len = 0;
    }

    /// `?` is a blank, other glyphs must be uppercase letters.
    pub fn init_for_str(&mut self, dawg: &dawg::Dawg, tiles: &str) -> error::Returns<()> {
        self.common_init(dawg);
        for c in tiles.chars() {
            self.query_len += 1;
            match dawg.alphabet().val(c) {
                Ok(alphabet::Tile::Zero) if c == alphabet::BLANK_TOKEN => self.blanks += 1,
                Ok(alphabet::Tile::Letter(code)) => self.freq[code as usize] += 1,
                _ => {
                    return_error!(format!("invalid rune {c:?}"));
                }
            }
        }
        Ok(())
    }

    /// Rack tiles: 0 is a blank, `1..=len` are letters.
    pub fn init_for_machine_word(&mut self, dawg: &dawg::Dawg, tiles: &[u8]) -> error::Returns<()> {
        self.common_init(dawg);
        self.query_len = tiles.len();
        let num_letters = dawg.alphabet().len();
        for &t in tiles {
            if t == 0 {
                self.blanks += 1;
            } else if t <= num_letters {
                self.freq[t as usize] += 1;
            } else {
                return_error!(format!("invalid byte {t}"));
            }
        }
        Ok(())
    }

    #[inline(always)]
    pub fn num_blanks(&self) -> u16 {
        self.blanks
    }

    /// Lazily enumerates matching words in lexicographic order. Dropping the
    /// iterator restores the scratch, so the same tiles can be queried again.
    pub fn anagrams<'a>(&'a mut self, dawg: &'a dawg::Dawg, mode: AnagramMode) -> Anagrams<'a> {
        let query_len = self.query_len as i32;
        let (min_len, min_exact, saved_blanks) = match mode {
            AnagramMode::Exact => (query_len, 0, None),
            AnagramMode::Subset => (1, 0, None),
            AnagramMode::Superset => {
                let saved = self.blanks;
                self.blanks = u16::MAX;
                (query_len, query_len - saved as i32, Some(saved))
            }
        };
        let root = Frame::new(dawg, dawg.root(), min_len, min_exact, None);
        Anagrams {
            dawg,
            scratch: self,
            word: Vec::new(),
            stack: vec![root],
            saved_blanks,
        }
    }

    /// Whether a blank-free word has any valid arrangement. Designated
    /// blanks count as their letters.
    pub fn is_valid_jumble(&mut self, dawg: &dawg::Dawg, word: &[u8]) -> error::Returns<bool> {
        let unblanked = word
            .iter()
            .map(|&t| alphabet::Tile::from_byte(t).letter())
            .collect::<Vec<_>>();
        self.init_for_machine_word(dawg, &unblanked)?;
        if self.blanks > 0 {
            return_error!("has blanks".into());
        }
        Ok(self.anagrams(dawg, AnagramMode::Exact).next().is_some())
    }
}

struct Frame {
    node: u32,
    num_arcs: u8,
    letter_set: u64,
    min_len: i32,
    min_exact: i32,
    next_arc: u8,
    next_terminal: u8,
    // (letter, paid with a blank) consumed to enter this frame.
    entered_by: Option<(u8, bool)>,
}

impl Frame {
    fn new(
        dawg: &dawg::Dawg,
        node: u32,
        min_len: i32,
        min_exact: i32,
        entered_by: Option<(u8, bool)>,
    ) -> Self {
        Self {
            node,
            num_arcs: dawg.num_arcs(node),
            letter_set: dawg.letter_set(node),
            min_len,
            min_exact,
            next_arc: 1,
            next_terminal: 1,
            entered_by,
        }
    }
}

pub struct Anagrams<'a> {
    dawg: &'a dawg::Dawg,
    scratch: &'a mut Anagrammer,
    word: Vec<u8>,
    stack: Vec<Frame>,
    saved_blanks: Option<u16>,
}

impl Anagrams<'_> {
    fn pop_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            if let Some((letter, by_blank)) = frame.entered_by {
                self.word.pop();
                if by_blank {
                    self.scratch.blanks += 1;
                } else {
                    self.scratch.freq[letter as usize] += 1;
                }
            }
        }
    }
}

impl Iterator for Anagrams<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        let num_letters = self.dawg.alphabet().len();
        loop {
            let frame = self.stack.last_mut()?;
            let arc = if frame.next_arc <= frame.num_arcs {
                Some(self.dawg.arc(frame.node + frame.next_arc as u32))
            } else {
                None
            };
            // words ending here come before words continuing through the arc.
            let limit = arc.map_or(num_letters, |(_, letter)| letter);
            if frame.next_terminal <= limit {
                let j = frame.next_terminal;
                frame.next_terminal += 1;
                if frame.letter_set & (1u64 << (j - 1)) != 0 && frame.min_len <= 1 {
                    let accepted = if self.scratch.freq[j as usize] > 0 {
                        frame.min_exact <= 1
                    } else {
                        self.scratch.blanks > 0 && frame.min_exact <= 0
                    };
                    if accepted {
                        let mut found = Vec::with_capacity(self.word.len() + 1);
                        found.extend_from_slice(&self.word);
                        found.push(j);
                        return Some(found);
                    }
                }
                continue;
            }
            let Some((next, letter)) = arc else {
                self.pop_frame();
                continue;
            };
            frame.next_arc += 1;
            let (min_len, min_exact) = (frame.min_len - 1, frame.min_exact);
            if self.scratch.freq[letter as usize] > 0 {
                self.scratch.freq[letter as usize] -= 1;
                self.word.push(letter);
                let child =
                    Frame::new(self.dawg, next, min_len, min_exact - 1, Some((letter, false)));
                self.stack.push(child);
            } else if self.scratch.blanks > 0 {
                self.scratch.blanks -= 1;
                self.word.push(letter);
                let child = Frame::new(self.dawg, next, min_len, min_exact, Some((letter, true)));
                self.stack.push(child);
            }
        }
    }
}

impl Drop for Anagrams<'_> {
    fn drop(&mut self) {
        while !self.stack.is_empty() {
            self.pop_frame();
        }
        if let Some(blanks) = self.saved_blanks {
            self.scratch.blanks = blanks;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::build;
    use super::*;

    static WORDS: &[&str] = &[
        "AT", "TA", "CAT", "CATS", "ACT", "DOG", "GOD", "RETINA", "RETAIN", "RETINAS",
        "RETAINS", "STAINER", "NITRE", "QI", "ZA",
    ];

    fn fixture() -> dawg::Dawg {
        let bytes = build::build_from_strs("TEST", &alphabet::Alphabet::english(), WORDS).unwrap();
        dawg::Dawg::from_bytes(&bytes).unwrap()
    }

    fn run(dawg: &dawg::Dawg, tiles: &str, mode: AnagramMode) -> Vec<String> {
        let mut da = Anagrammer::new();
        da.init_for_str(dawg, tiles).unwrap();
        da.anagrams(dawg, mode)
            .map(|w| dawg.alphabet().fmt_word(&w))
            .collect()
    }

    #[test]
    fn exact() {
        let d = fixture();
        assert_eq!(run(&d, "RETINA", AnagramMode::Exact), ["RETAIN", "RETINA"]);
        assert_eq!(run(&d, "TAC", AnagramMode::Exact), ["ACT", "CAT"]);
        assert_eq!(run(&d, "CA?", AnagramMode::Exact), ["ACT", "CAT"]);
        assert_eq!(run(&d, "??", AnagramMode::Exact), ["AT", "QI", "TA", "ZA"]);
        assert!(run(&d, "XYZ", AnagramMode::Exact).is_empty());
    }

    #[test]
    fn subset() {
        let d = fixture();
        assert_eq!(run(&d, "CATS", AnagramMode::Subset), ["ACT", "AT", "CAT", "CATS", "TA"]);
    }

    #[test]
    fn superset() {
        let d = fixture();
        assert_eq!(
            run(&d, "TA", AnagramMode::Superset),
            ["ACT", "AT", "CAT", "CATS", "RETAIN", "RETAINS", "RETINA", "RETINAS", "STAINER", "TA"]
        );
        assert_eq!(run(&d, "RS?", AnagramMode::Superset), ["RETAINS", "RETINAS", "STAINER"]);
    }

    #[test]
    fn scratch_is_restored_after_partial_iteration() {
        let d = fixture();
        let mut da = Anagrammer::new();
        da.init_for_str(&d, "A?").unwrap();
        {
            let mut it = da.anagrams(&d, AnagramMode::Superset);
            assert_eq!(it.next(), Some(vec![1, 3, 20]));
        }
        assert_eq!(da.num_blanks(), 1);
        let all = da
            .anagrams(&d, AnagramMode::Subset)
            .map(|w| d.alphabet().fmt_word(&w))
            .collect::<Vec<_>>();
        assert_eq!(all, ["AT", "TA", "ZA"]);
        assert_eq!(da.num_blanks(), 1);
    }

    #[test]
    fn long_queries_find_nothing() {
        let d = fixture();
        let many = "A".repeat(300);
        assert!(run(&d, &many, AnagramMode::Exact).is_empty());
        assert!(run(&d, &many, AnagramMode::Subset).is_empty());
        let mut da = Anagrammer::new();
        da.init_for_str(&d, &"?".repeat(300)).unwrap();
        assert_eq!(da.num_blanks(), 300);
        assert_eq!(da.anagrams(&d, AnagramMode::Exact).count(), 0);
        assert_eq!(da.num_blanks(), 300);
    }

    #[test]
    fn every_word_is_its_own_anagram() {
        let d = fixture();
        let english = alphabet::Alphabet::english();
        let mut da = Anagrammer::new();
        for word in WORDS {
            let tiles = english.to_rack(word).unwrap();
            da.init_for_machine_word(&d, &tiles).unwrap();
            let found = da.anagrams(&d, AnagramMode::Exact).collect::<Vec<_>>();
            assert!(found.contains(&tiles), "{word}");
            for w in &found {
                assert!(d.has_word(w));
            }
        }
    }

    #[test]
    fn jumbles() {
        let d = fixture();
        let english = alphabet::Alphabet::english();
        let mut da = Anagrammer::new();
        assert!(da.is_valid_jumble(&d, &english.to_rack("OGD").unwrap()).unwrap());
        assert!(da.is_valid_jumble(&d, &[0x80 | 7, 15, 4]).unwrap());
        assert!(!da.is_valid_jumble(&d, &english.to_rack("OGDS").unwrap()).unwrap());
        assert!(da.is_valid_jumble(&d, &[7, 0, 4]).is_err());
        assert!(d.has_anagram(&english.to_rack("IQ").unwrap()).unwrap());
    }
}
