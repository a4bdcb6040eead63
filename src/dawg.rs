// Copyright (C) 2020-2024 Andy Kurnia.

use super::{alphabet, anagram, cache, config, error};

pub const MAGIC: &[u8; 4] = b"cdwg";

const NUM_ARCS_BIT_LOC: u32 = 24;
const LOW_BITS_MASK: u32 = (1 << NUM_ARCS_BIT_LOC) - 1;

/// Directed acyclic word graph, read whole from the big-endian `cdwg` format.
///
/// Each node occupies one slot holding `num_arcs << 24 | letter_set_index`
/// and is followed by its arcs, one slot each, holding
/// `(letter - 1) << 24 | next_node_index`. Node 0 is the root. A node's
/// letter set holds the letters that end a word when appended there.
pub struct Dawg {
    nodes: Box<[u32]>,
    letter_sets: Box<[u64]>,
    alphabet: alphabet::Alphabet,
    lexicon_name: String,
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, what: &str) -> error::Returns<&'a [u8]> {
        match self.pos.checked_add(n) {
            Some(end) if end <= self.buf.len() => {
                let ret = &self.buf[self.pos..end];
                self.pos = end;
                Ok(ret)
            }
            _ => Err(error::GameError::Format(format!(
                "truncated while reading {what} at offset {}",
                self.pos
            ))),
        }
    }

    fn u8(&mut self, what: &str) -> error::Returns<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u32(&mut self, what: &str) -> error::Returns<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u32s(&mut self, what: &str) -> error::Returns<Vec<u32>> {
        let len = self.u32(what)? as usize;
        let b = self.take(len.saturating_mul(4), what)?;
        Ok(b.chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn u64s(&mut self, what: &str) -> error::Returns<Vec<u64>> {
        let len = self.u32(what)? as usize;
        let b = self.take(len.saturating_mul(8), what)?;
        Ok(b.chunks_exact(8)
            .map(|c| u64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            .collect())
    }
}

impl Dawg {
    pub fn from_bytes(buf: &[u8]) -> error::Returns<Dawg> {
        let mut r = Reader { buf, pos: 0 };
        if r.take(4, "magic")? != MAGIC {
            return Err(error::GameError::Format(
                "magic number does not match dawg".into(),
            ));
        }
        let name_len = r.u8("lexicon name length")? as usize;
        let lexicon_name = String::from_utf8_lossy(r.take(name_len, "lexicon name")?).into_owned();
        log::debug!("read lexicon name: {:?}", lexicon_name);
        let alphabet = alphabet::Alphabet::from_code_points(&r.u32s("alphabet")?)
            .map_err(|e| error::GameError::Format(e.to_string()))?;
        let letter_sets = r.u64s("letter sets")?;
        let nodes = r.u32s("nodes")?;
        log::debug!(
            "alphabet size {}, {} letter sets, {} nodes",
            alphabet.len(),
            letter_sets.len(),
            nodes.len()
        );
        let ret = Dawg {
            nodes: nodes.into_boxed_slice(),
            letter_sets: letter_sets.into_boxed_slice(),
            alphabet,
            lexicon_name,
        };
        ret.check_reachable_nodes()?;
        Ok(ret)
    }

    pub fn from_file(path: &std::path::Path) -> error::Returns<Dawg> {
        log::debug!("loading {}", path.display());
        Self::from_bytes(&std::fs::read(path)?)
    }

    // every index reachable from the root must be in range, so accessors
    // can index directly afterwards.
    fn check_reachable_nodes(&self) -> error::Returns<()> {
        if self.nodes.is_empty() {
            return Err(error::GameError::Format("no root node".into()));
        }
        let num_letters = self.alphabet.len();
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![0u32];
        seen[0] = true;
        while let Some(node) = stack.pop() {
            let p = node as usize;
            let num_arcs = self.num_arcs(node) as usize;
            if p + num_arcs >= self.nodes.len() {
                return Err(error::GameError::Format(format!(
                    "node {node} has {num_arcs} arcs past the end"
                )));
            }
            if (self.nodes[p] & LOW_BITS_MASK) as usize >= self.letter_sets.len() {
                return Err(error::GameError::Format(format!(
                    "node {node} has a bad letter set index"
                )));
            }
            for i in 1..=num_arcs {
                let (next, letter) = self.arc(node + i as u32);
                if letter == 0 || letter > num_letters {
                    return Err(error::GameError::Format(format!(
                        "arc {} has letter {letter} outside the alphabet",
                        p + i
                    )));
                }
                let next_idx = next as usize;
                if next_idx >= self.nodes.len() {
                    return Err(error::GameError::Format(format!(
                        "arc {} points past the end",
                        p + i
                    )));
                }
                if !seen[next_idx] {
                    seen[next_idx] = true;
                    stack.push(next);
                }
            }
        }
        Ok(())
    }

    #[inline(always)]
    pub fn alphabet(&self) -> &alphabet::Alphabet {
        &self.alphabet
    }

    #[inline(always)]
    pub fn lexicon_name(&self) -> &str {
        &self.lexicon_name
    }

    #[inline(always)]
    pub fn root(&self) -> u32 {
        0
    }

    #[inline(always)]
    pub fn num_arcs(&self, node: u32) -> u8 {
        (self.nodes[node as usize] >> NUM_ARCS_BIT_LOC) as u8
    }

    #[inline(always)]
    pub fn letter_set(&self, node: u32) -> u64 {
        self.letter_sets[(self.nodes[node as usize] & LOW_BITS_MASK) as usize]
    }

    /// Follows the arc stored at slot `arc_idx`, giving the next node and the
    /// arc's letter code.
    #[inline(always)]
    pub fn arc(&self, arc_idx: u32) -> (u32, u8) {
        let v = self.nodes[arc_idx as usize];
        (v & LOW_BITS_MASK, (v >> NUM_ARCS_BIT_LOC) as u8 + 1)
    }

    /// Whether `letter` (designated blanks unblanked) ends a word at `node`.
    #[inline(always)]
    pub fn in_letter_set(&self, letter: u8, node: u32) -> bool {
        let code = alphabet::Tile::from_byte(letter).letter();
        code != 0 && code <= 64 && self.letter_set(node) & (1u64 << (code - 1)) != 0
    }

    pub fn next_node(&self, node: u32, letter: u8) -> Option<u32> {
        let code = alphabet::Tile::from_byte(letter).letter();
        (1..=self.num_arcs(node) as u32)
            .map(|i| self.arc(node + i))
            .find(|&(_, l)| l == code)
            .map(|(next, _)| next)
    }

    /// Membership test. Designated blanks count as their letter; a missing
    /// arc is simply `false`.
    pub fn has_word(&self, word: &[u8]) -> bool {
        let Some((&last, prefix)) = word.split_last() else {
            return false;
        };
        let mut node = self.root();
        for &letter in prefix {
            match self.next_node(node, letter) {
                Some(next) => node = next,
                None => return false,
            }
        }
        self.in_letter_set(last, node)
    }

    /// Whether some arrangement of these letters is a word.
    pub fn has_anagram(&self, word: &[u8]) -> error::Returns<bool> {
        anagram::Anagrammer::new().is_valid_jumble(self, word)
    }
}

impl cache::Loadable for Dawg {
    fn load(cfg: &config::Config, name: &str) -> error::Returns<Self> {
        Self::from_file(&cfg.dawg_path(name))
    }
}
