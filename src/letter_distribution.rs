// Copyright (C) 2020-2024 Andy Kurnia.

use super::{alphabet, cache, config, error};

pub struct LetterDistribution {
    name: String,
    alphabet: alphabet::Alphabet,
    // indexed by code, [0] is the blank.
    counts: Box<[u8]>,
    scores: Box<[i8]>,
    vowels: Box<[bool]>,
    sort_keys: Box<[u8]>,
    num_tiles: u16,
}

// letter, quantity, value, is_vowel
static ENGLISH: &[(char, u8, i8, bool)] = &[
    ('A', 9, 1, true),
    ('B', 2, 3, false),
    ('C', 2, 3, false),
    ('D', 4, 2, false),
    ('E', 12, 1, true),
    ('F', 2, 4, false),
    ('G', 3, 2, false),
    ('H', 2, 4, false),
    ('I', 9, 1, true),
    ('J', 1, 8, false),
    ('K', 1, 5, false),
    ('L', 4, 1, false),
    ('M', 2, 3, false),
    ('N', 6, 1, false),
    ('O', 8, 1, true),
    ('P', 2, 3, false),
    ('Q', 1, 10, false),
    ('R', 6, 1, false),
    ('S', 4, 1, false),
    ('T', 6, 1, false),
    ('U', 4, 1, true),
    ('V', 2, 4, false),
    ('W', 2, 4, false),
    ('X', 1, 8, false),
    ('Y', 2, 4, false),
    ('Z', 1, 10, false),
    ('?', 2, 0, false),
];

impl LetterDistribution {
    // letter codes follow code point order; rack sort order follows the rows.
    fn from_rows(name: &str, rows: &[(char, u8, i8, bool)]) -> error::Returns<LetterDistribution> {
        let mut letters = rows
            .iter()
            .map(|&(c, ..)| c)
            .filter(|&c| c != alphabet::BLANK_TOKEN)
            .collect::<Vec<_>>();
        letters.sort_unstable();
        let alphabet = alphabet::Alphabet::from_letters(letters)?;
        let n = alphabet.len() as usize + 1;
        let mut counts = vec![0u8; n];
        let mut scores = vec![0i8; n];
        let mut vowels = vec![false; n];
        let mut sort_keys = vec![0u8; n];
        let mut num_tiles = 0u16;
        for (idx, &(c, count, score, is_vowel)) in rows.iter().enumerate() {
            let code = alphabet.val(c)?.letter() as usize;
            counts[code] = count;
            scores[code] = score;
            vowels[code] = is_vowel;
            sort_keys[code] = idx as u8;
            num_tiles += count as u16;
        }
        log::debug!(
            "letter distribution {}: {} letters, {} tiles",
            name,
            alphabet.len(),
            num_tiles
        );
        Ok(LetterDistribution {
            name: name.to_string(),
            alphabet,
            counts: counts.into_boxed_slice(),
            scores: scores.into_boxed_slice(),
            vowels: vowels.into_boxed_slice(),
            sort_keys: sort_keys.into_boxed_slice(),
            num_tiles,
        })
    }

    /// Reads headerless `letter,quantity,value,vowel` records.
    pub fn from_reader<R: std::io::Read>(name: &str, r: R) -> error::Returns<LetterDistribution> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(r);
        let mut rows = Vec::<(char, u8, i8, bool)>::new();
        for result in csv_reader.records() {
            let record = result?;
            if record.len() < 4 {
                return_error!(format!("expected 4 fields, got {:?}", record));
            }
            let mut chars = record[0].chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return_error!(format!("invalid letter {:?}", &record[0]));
                }
            };
            let count = record[1]
                .parse::<u8>()
                .map_err(|e| error::GameError::InvalidInput(format!("{:?}: {}", &record[1], e)))?;
            let score = record[2]
                .parse::<i8>()
                .map_err(|e| error::GameError::InvalidInput(format!("{:?}: {}", &record[2], e)))?;
            let is_vowel = match &record[3] {
                "1" => true,
                "0" => false,
                x => {
                    return_error!(format!("invalid vowel flag {:?}", x));
                }
            };
            if rows.iter().any(|&(d, ..)| d == c) {
                return_error!(format!("duplicate letter {:?}", c));
            }
            rows.push((c, count, score, is_vowel));
        }
        Self::from_rows(name, &rows)
    }

    pub fn from_file(name: &str, path: &std::path::Path) -> error::Returns<LetterDistribution> {
        log::debug!("loading {}", path.display());
        Self::from_reader(name, std::fs::File::open(path)?)
    }

    pub fn english() -> LetterDistribution {
        Self::from_rows("english", ENGLISH).unwrap_or_else(|_| unreachable!())
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn alphabet(&self) -> &alphabet::Alphabet {
        &self.alphabet
    }

    /// Copies of this code in a fresh bag; code 0 is the blank.
    #[inline(always)]
    pub fn count(&self, code: u8) -> u8 {
        self.counts.get(code as usize).copied().unwrap_or(0)
    }

    #[inline(always)]
    pub fn num_tiles(&self) -> u16 {
        self.num_tiles
    }

    /// Score of a tile byte. Designated blanks score as the blank.
    #[inline(always)]
    pub fn score(&self, tile: u8) -> i32 {
        match alphabet::Tile::from_byte(tile) {
            alphabet::Tile::Letter(c) => self.scores.get(c as usize).copied().unwrap_or(0) as i32,
            alphabet::Tile::Zero | alphabet::Tile::Blank(_) => self.scores[0] as i32,
        }
    }

    pub fn word_score(&self, word: &[u8]) -> i32 {
        word.iter().map(|&t| self.score(t)).sum()
    }

    #[inline(always)]
    pub fn is_vowel(&self, tile: u8) -> bool {
        let code = alphabet::Tile::from_byte(tile).letter();
        code != 0 && self.vowels.get(code as usize).copied().unwrap_or(false)
    }

    pub fn sort_key(&self, code: u8) -> u8 {
        self.sort_keys.get(code as usize).copied().unwrap_or(u8::MAX)
    }

    /// Rack order for display: file order, blanks last unless listed.
    pub fn sort_rack(&self, rack: &mut [u8]) {
        rack.sort_unstable_by_key(|&t| self.sort_key(t));
    }

    pub fn full_bag(&self) -> Vec<u8> {
        let mut bag = Vec::with_capacity(self.num_tiles as usize);
        for (code, &count) in self.counts.iter().enumerate() {
            for _ in 0..count {
                bag.push(code as u8);
            }
        }
        bag
    }
}

impl cache::Loadable for LetterDistribution {
    fn load(cfg: &config::Config, name: &str) -> error::Returns<Self> {
        Self::from_file(name, &cfg.letter_distribution_path(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_has_one_hundred_tiles() {
        let ld = LetterDistribution::english();
        assert_eq!(ld.num_tiles(), 100);
        assert_eq!(ld.full_bag().len(), 100);
        assert_eq!(ld.count(0), 2);
        assert_eq!(ld.count(5), 12);
        assert_eq!(ld.score(26), 10);
        assert_eq!(ld.score(0x80 | 26), 0);
        assert!(ld.is_vowel(1));
        assert!(!ld.is_vowel(0));
        assert!(!ld.is_vowel(25));
    }

    #[test]
    fn reads_csv() {
        let csv = "A,2,1,1\nB,1,3,0\n?,1,0,0\n";
        let ld = LetterDistribution::from_reader("tiny", csv.as_bytes()).unwrap();
        assert_eq!(ld.alphabet().len(), 2);
        assert_eq!(ld.num_tiles(), 4);
        assert_eq!(ld.full_bag(), vec![0, 1, 1, 2]);
        assert_eq!(ld.word_score(&[1, 2, 0x81]), 4);
        let mut rack = vec![0, 2, 1];
        ld.sort_rack(&mut rack);
        assert_eq!(rack, vec![1, 2, 0]);
    }

    #[test]
    fn codes_follow_code_points() {
        let csv = "?,1,0,0\nZ,1,10,0\nB,2,3,0\nA,1,1,1\n";
        let ld = LetterDistribution::from_reader("unsorted", csv.as_bytes()).unwrap();
        assert_eq!(ld.alphabet().letters(), ['A', 'B', 'Z']);
        assert_eq!(ld.count(1), 1);
        assert_eq!(ld.count(2), 2);
        assert_eq!(ld.score(3), 10);
        assert!(ld.is_vowel(1));
        assert_eq!(ld.full_bag(), vec![0, 1, 2, 2, 3]);
        // display order is still the file's.
        let mut rack = vec![1, 2, 3, 0];
        ld.sort_rack(&mut rack);
        assert_eq!(rack, vec![0, 3, 2, 1]);
    }

    #[test]
    fn rejects_bad_csv() {
        assert!(LetterDistribution::from_reader("x", "A,x,1,1\n".as_bytes()).is_err());
        assert!(LetterDistribution::from_reader("x", "AB,1,1,1\n".as_bytes()).is_err());
        assert!(LetterDistribution::from_reader("x", "A,1,1,1\nA,1,1,1\n".as_bytes()).is_err());
        assert!(LetterDistribution::from_reader("x", "A,1,1\n".as_bytes()).is_err());
    }
}
