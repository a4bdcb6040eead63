// Copyright (C) 2020-2024 Andy Kurnia.

use super::{alphabet, dawg, error};

struct MyHasher(u64);

impl std::hash::Hasher for MyHasher {
    fn finish(&self) -> u64 {
        self.0
    }
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (std::num::Wrapping(self.0) * std::num::Wrapping(3467)).0 ^ (!b as u64);
        }
    }
}

impl Default for MyHasher {
    fn default() -> MyHasher {
        MyHasher(0)
    }
}

type MyHasherDefault = std::hash::BuildHasherDefault<MyHasher>;

// Unconfirmed entries.
struct Transition {
    tile: u8,
    accepts: bool,
    arc_index: u32, // Refers to states.
}

struct TransitionStack<'a> {
    transitions: &'a mut Vec<Transition>,
    indexes: &'a mut Vec<usize>,
}

impl TransitionStack<'_> {
    fn push(&mut self, tile: u8) {
        self.transitions.push(Transition {
            tile,
            accepts: false,
            arc_index: 0, // Filled up later.
        });
        self.indexes.push(self.transitions.len());
    }

    fn pop(&mut self, state_maker: &mut StateMaker) {
        if let Some(start_of_batch) = self.indexes.pop() {
            let new_arc_index = state_maker.make_state(&self.transitions[start_of_batch..]);
            self.transitions[start_of_batch - 1].arc_index = new_arc_index;
            self.transitions.truncate(start_of_batch);
        }
    }
}

// Deduplicated entries. A node is the sibling chain starting at its first
// state; index 0 is the sink, the node with no outgoing letters.
#[derive(Clone, Eq, Hash, PartialEq)]
struct State {
    tile: u8,
    accepts: bool,
    arc_index: u32,  // Refers to states.
    next_index: u32, // Refers to states.
}

struct StateMaker<'a> {
    states: &'a mut Vec<State>,
    states_finder: &'a mut std::collections::HashMap<State, u32, MyHasherDefault>,
}

impl StateMaker<'_> {
    fn make_state(&mut self, node_transitions: &[Transition]) -> u32 {
        let mut ret = 0;
        for node_transition in node_transitions.iter().rev() {
            let state = State {
                tile: node_transition.tile,
                accepts: node_transition.accepts,
                arc_index: node_transition.arc_index,
                next_index: ret,
            };
            use std::collections::hash_map::Entry::{Occupied, Vacant};
            match self.states_finder.entry(state) {
                Occupied(entry) => {
                    ret = *entry.get();
                }
                Vacant(entry) => {
                    ret = self.states.len() as u32;
                    self.states.push(entry.key().clone());
                    entry.insert(ret);
                }
            }
        }
        ret
    }

    fn make_dawg(&mut self, sorted_machine_words: &[Box<[u8]>]) -> u32 {
        let mut transition_stack = TransitionStack {
            transitions: &mut Vec::new(),
            indexes: &mut Vec::new(),
        };
        for machine_word_index in 0..sorted_machine_words.len() {
            let this_word = &sorted_machine_words[machine_word_index];
            let this_word_len = this_word.len();
            let mut prefix_len = 0;
            if machine_word_index > 0 {
                let prev_word = &sorted_machine_words[machine_word_index - 1];
                let prev_word_len = transition_stack.indexes.len();
                let min_word_len = std::cmp::min(this_word_len, prev_word_len);
                while prefix_len < min_word_len && prev_word[prefix_len] == this_word[prefix_len] {
                    prefix_len += 1;
                }
                for _ in prefix_len..prev_word_len {
                    transition_stack.pop(self);
                }
            }
            for &tile in &this_word[prefix_len..this_word_len] {
                transition_stack.push(tile);
            }
            let transitions_len = transition_stack.transitions.len();
            transition_stack.transitions[transitions_len - 1].accepts = true;
        }
        for _ in 0..transition_stack.indexes.len() {
            transition_stack.pop(self);
        }
        self.make_state(&transition_stack.transitions[..])
    }
}

// A laid out node: where it lives and what its letter set and arcs are.
struct NodeLayout {
    letter_set_index: u32,
    arcs: Vec<(u8, u32)>, // (tile, state chain of child)
}

struct Layouter<'a> {
    states: &'a [State],
    positions: std::collections::HashMap<u32, u32, MyHasherDefault>,
    letter_sets: Vec<u64>,
    letter_set_finder: std::collections::HashMap<u64, u32, MyHasherDefault>,
    order: Vec<(u32, NodeLayout)>,
    num_written: u32,
}

impl Layouter<'_> {
    fn describe(&mut self, mut p: u32) -> NodeLayout {
        let mut letter_set = 0u64;
        let mut arcs = Vec::new();
        while p != 0 {
            let state = &self.states[p as usize];
            if state.accepts {
                letter_set |= 1 << (state.tile - 1);
            }
            // children with nothing below them need no arc.
            if state.arc_index != 0 {
                arcs.push((state.tile, state.arc_index));
            }
            p = state.next_index;
        }
        let next_letter_set_index = self.letter_sets.len() as u32;
        let letter_set_index = *self
            .letter_set_finder
            .entry(letter_set)
            .or_insert(next_letter_set_index);
        if letter_set_index == next_letter_set_index {
            self.letter_sets.push(letter_set);
        }
        NodeLayout {
            letter_set_index,
            arcs,
        }
    }

    // breadth-first, so the root lands at 0.
    fn lay_out(&mut self, root: u32) {
        let mut queue = std::collections::VecDeque::new();
        self.positions.insert(root, 0);
        queue.push_back(root);
        while let Some(p) = queue.pop_front() {
            let layout = self.describe(p);
            self.num_written += 1 + layout.arcs.len() as u32;
            for &(_, child) in &layout.arcs {
                if !self.positions.contains_key(&child) {
                    // position is fixed once its predecessors are written.
                    self.positions.insert(child, u32::MAX);
                    queue.push_back(child);
                }
            }
            self.order.push((p, layout));
        }
        let mut pos = 0u32;
        for (p, layout) in &self.order {
            self.positions.insert(*p, pos);
            pos += 1 + layout.arcs.len() as u32;
        }
    }

    fn to_nodes(&self) -> error::Returns<Vec<u32>> {
        let mut nodes = Vec::with_capacity(self.num_written as usize);
        for (_, layout) in &self.order {
            nodes.push(((layout.arcs.len() as u32) << 24) | layout.letter_set_index);
            for &(tile, child) in &layout.arcs {
                let next = self.positions.get(&child).copied().unwrap_or(u32::MAX);
                if next > 0xffffff {
                    return_error!(format!("arc target {next} does not fit in 24 bits"));
                }
                nodes.push((((tile - 1) as u32) << 24) | next);
            }
        }
        Ok(nodes)
    }
}

/// Builds a `cdwg` file from machine words (letter codes `1..=len`).
/// Words may be unsorted and repeated; empty words are ignored.
pub fn build(
    lexicon_name: &str,
    alphabet: &alphabet::Alphabet,
    machine_words: &[Box<[u8]>],
) -> error::Returns<Vec<u8>> {
    if lexicon_name.len() > u8::MAX as usize {
        return_error!(format!("lexicon name is {} bytes", lexicon_name.len()));
    }
    let num_letters = alphabet.len();
    let mut sorted_machine_words = Vec::with_capacity(machine_words.len());
    for word in machine_words {
        if let Some(&bad) = word.iter().find(|&&t| t == 0 || t > num_letters) {
            return_error!(format!("tile {bad} is not a letter"));
        }
        if !word.is_empty() {
            sorted_machine_words.push(word.clone());
        }
    }
    sorted_machine_words.sort();
    sorted_machine_words.dedup();

    // The sink state always exists.
    let mut states = vec![State {
        tile: 0,
        accepts: false,
        arc_index: 0,
        next_index: 0,
    }];
    let mut states_finder = std::collections::HashMap::<_, _, MyHasherDefault>::default();
    states_finder.insert(states[0].clone(), 0);
    let root = StateMaker {
        states: &mut states,
        states_finder: &mut states_finder,
    }
    .make_dawg(&sorted_machine_words);

    let mut layouter = Layouter {
        states: &states,
        positions: Default::default(),
        letter_sets: Vec::new(),
        letter_set_finder: Default::default(),
        order: Vec::new(),
        num_written: 0,
    };
    layouter.lay_out(root);
    if layouter.letter_sets.len() > 0xffffff || layouter.num_written > 0xffffff {
        return_error!(format!(
            "this format cannot have {} nodes and {} letter sets",
            layouter.num_written,
            layouter.letter_sets.len()
        ));
    }
    let nodes = layouter.to_nodes()?;
    log::debug!(
        "built {}: {} words, {} nodes, {} letter sets",
        lexicon_name,
        sorted_machine_words.len(),
        nodes.len(),
        layouter.letter_sets.len()
    );

    let mut ret = Vec::with_capacity(
        4 + 1 + lexicon_name.len() + 12 + 4 * num_letters as usize
            + 8 * layouter.letter_sets.len()
            + 4 * nodes.len(),
    );
    ret.extend_from_slice(dawg::MAGIC);
    ret.push(lexicon_name.len() as u8);
    ret.extend_from_slice(lexicon_name.as_bytes());
    ret.extend_from_slice(&(num_letters as u32).to_be_bytes());
    for &c in alphabet.letters() {
        ret.extend_from_slice(&(c as u32).to_be_bytes());
    }
    ret.extend_from_slice(&(layouter.letter_sets.len() as u32).to_be_bytes());
    for &letter_set in &layouter.letter_sets {
        ret.extend_from_slice(&letter_set.to_be_bytes());
    }
    ret.extend_from_slice(&(nodes.len() as u32).to_be_bytes());
    for &node in &nodes {
        ret.extend_from_slice(&node.to_be_bytes());
    }
    Ok(ret)
}

/// Convenience wrapper parsing uppercase words with the alphabet.
pub fn build_from_strs(
    lexicon_name: &str,
    alphabet: &alphabet::Alphabet,
    words: &[&str],
) -> error::Returns<Vec<u8>> {
    let mut machine_words = Vec::with_capacity(words.len());
    for word in words {
        let mut machine_word = Vec::with_capacity(word.len());
        for tile in alphabet.to_tiles(word)? {
            match tile {
                alphabet::Tile::Letter(c) => machine_word.push(c),
                _ => {
                    return_error!(format!("{word:?} is not a plain word"));
                }
            }
        }
        machine_words.push(machine_word.into_boxed_slice());
    }
    build(lexicon_name, alphabet, &machine_words)
}
