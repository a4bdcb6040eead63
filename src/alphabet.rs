// Copyright (C) 2020-2024 Andy Kurnia.

use super::error;

// letter sets are u64 bitmasks indexed by code - 1.
pub const MAX_ALPHABET_SIZE: usize = 62;
pub const BLANK_TOKEN: char = '?';
pub const PLAYED_THROUGH_TOKEN: char = '.';

const BLANKED_BIT: u8 = 0x80;

/// One tile, decoded from its wire byte.
///
/// Wire bytes are `0`, `1..=N` for a real letter, and `0x80 | code` for a
/// blank designated as that letter. Code 0 has three meanings depending on
/// where the byte lives: an undesignated blank on a rack, a played-through
/// square inside a move, or an empty board square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tile {
    Zero,
    Letter(u8),
    Blank(u8),
}

impl Tile {
    #[inline(always)]
    pub fn from_byte(b: u8) -> Tile {
        if b == 0 {
            Tile::Zero
        } else if b & BLANKED_BIT != 0 {
            Tile::Blank(b & !BLANKED_BIT)
        } else {
            Tile::Letter(b)
        }
    }

    #[inline(always)]
    pub fn to_byte(self) -> u8 {
        match self {
            Tile::Zero => 0,
            Tile::Letter(c) => c,
            Tile::Blank(c) => c | BLANKED_BIT,
        }
    }

    /// Letter code with any blank designation removed.
    #[inline(always)]
    pub fn letter(self) -> u8 {
        match self {
            Tile::Zero => 0,
            Tile::Letter(c) | Tile::Blank(c) => c,
        }
    }

    #[inline(always)]
    pub fn is_blanked(self) -> bool {
        matches!(self, Tile::Blank(_))
    }

    /// The rack tile this played tile came from; `None` for played-through.
    #[inline(always)]
    pub fn rack_tile(self) -> Option<u8> {
        match self {
            Tile::Zero => None,
            Tile::Letter(c) => Some(c),
            Tile::Blank(_) => Some(0),
        }
    }
}

pub fn decode(bytes: &[u8]) -> Vec<Tile> {
    bytes.iter().map(|&b| Tile::from_byte(b)).collect()
}

pub fn encode(tiles: &[Tile]) -> Vec<u8> {
    tiles.iter().map(|t| t.to_byte()).collect()
}

/// Bidirectional mapping between glyphs and letter codes `1..=len`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    letters: Box<[char]>,
}

impl Alphabet {
    pub fn from_letters(letters: Vec<char>) -> error::Returns<Alphabet> {
        if letters.len() > MAX_ALPHABET_SIZE {
            return_error!(format!(
                "alphabet has {} letters, max is {}",
                letters.len(),
                MAX_ALPHABET_SIZE
            ));
        }
        for (i, &c) in letters.iter().enumerate() {
            if c == BLANK_TOKEN || c == PLAYED_THROUGH_TOKEN {
                return_error!(format!("reserved glyph {:?} in alphabet", c));
            }
            if letters[..i].contains(&c) {
                return_error!(format!("duplicate glyph {:?} in alphabet", c));
            }
        }
        log::debug!("alphabet: {:?}", letters);
        Ok(Alphabet {
            letters: letters.into_boxed_slice(),
        })
    }

    pub fn from_code_points(code_points: &[u32]) -> error::Returns<Alphabet> {
        let mut letters = Vec::with_capacity(code_points.len());
        for &cp in code_points {
            match char::from_u32(cp) {
                Some(c) => letters.push(c),
                None => {
                    return_error!(format!("invalid code point {}", cp));
                }
            }
        }
        Self::from_letters(letters)
    }

    pub fn english() -> Alphabet {
        Alphabet {
            letters: ('A'..='Z').collect(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> u8 {
        self.letters.len() as u8
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    #[inline(always)]
    pub fn letter(&self, code: u8) -> Option<char> {
        if code == 0 {
            None
        } else {
            self.letters.get(code as usize - 1).copied()
        }
    }

    fn code_of(&self, c: char) -> Option<u8> {
        self.letters
            .iter()
            .position(|&l| l == c)
            .map(|p| p as u8 + 1)
    }

    /// Parses one glyph. Lowercase means a designated blank.
    pub fn val(&self, c: char) -> error::Returns<Tile> {
        if c == BLANK_TOKEN || c == PLAYED_THROUGH_TOKEN {
            return Ok(Tile::Zero);
        }
        if let Some(code) = self.code_of(c) {
            return Ok(Tile::Letter(code));
        }
        let mut upper = c.to_uppercase();
        if let (Some(u), None) = (upper.next(), upper.next()) {
            if u != c {
                if let Some(code) = self.code_of(u) {
                    return Ok(Tile::Blank(code));
                }
            }
        }
        return_error!(format!("letter `{}` not found in alphabet", c));
    }

    pub fn to_tiles(&self, s: &str) -> error::Returns<Vec<Tile>> {
        s.chars().map(|c| self.val(c)).collect()
    }

    /// Parses a rack string; `?` is the blank.
    pub fn to_rack(&self, s: &str) -> error::Returns<Vec<u8>> {
        let mut rack = Vec::with_capacity(s.len());
        for c in s.chars() {
            match self.val(c)? {
                Tile::Letter(code) => rack.push(code),
                Tile::Zero if c == BLANK_TOKEN => rack.push(0),
                _ => {
                    return_error!(format!("`{}` cannot be on a rack", c));
                }
            }
        }
        Ok(rack)
    }

    pub fn fmt_tile(&self, tile: Tile, zero_is_played_through: bool) -> char {
        match tile {
            Tile::Zero => {
                if zero_is_played_through {
                    PLAYED_THROUGH_TOKEN
                } else {
                    BLANK_TOKEN
                }
            }
            Tile::Letter(c) => self.letter(c).unwrap_or(BLANK_TOKEN),
            Tile::Blank(c) => self
                .letter(c)
                .and_then(|l| l.to_lowercase().next())
                .unwrap_or(BLANK_TOKEN),
        }
    }

    pub fn fmt_rack(&self, rack: &[u8]) -> String {
        rack.iter()
            .map(|&t| self.fmt_tile(Tile::from_byte(t), false))
            .collect()
    }

    pub fn fmt_word(&self, word: &[u8]) -> String {
        self.fmt_rack(word)
    }

    pub fn fmt_played(&self, tiles: &[Tile]) -> String {
        tiles.iter().map(|&t| self.fmt_tile(t, true)).collect()
    }
}
