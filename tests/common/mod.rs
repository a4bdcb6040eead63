// Copyright (C) 2020-2024 Andy Kurnia.

#![allow(dead_code)]

use cwgame::event::{ChallengeRule, ClientEventType, ClientGameplayEvent};
use cwgame::game_state::{GameDocument, GamePlayer};
use cwgame::{
    alphabet, build, cache, config, dawg, error, game, game_config, game_timers, inventory,
    letter_distribution,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

pub const LEXICON: &str = "NWL20";
pub const TINY: &str = "tiny";
pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

pub static WORDS: &[&str] = &[
    "AA", "AD", "AT", "TA", "DO", "GO", "OD", "ACT", "CAT", "CATS", "SCAT", "DOG", "DOGS", "GOD",
    "GODS", "RETINA", "RETAIN", "RETINAS", "RETAINS", "STAINER", "QI", "ZA",
];

// exactly two racks' worth: RETINAS and DGOUVWX.
pub const TINY_TILES: &str = "RETINASDGOUVWX";

pub struct Table {
    pub engine: game::Engine,
    pub clock: Arc<game_timers::FakeClock>,
    pub rng: ChaCha8Rng,
}

/// A distribution with the English alphabet and scores but only the tiles
/// in `TINY_TILES`, so the bag empties as soon as the racks are dealt.
pub fn tiny_distribution() -> letter_distribution::LetterDistribution {
    let english = letter_distribution::LetterDistribution::english();
    let alphabet = english.alphabet();
    let mut csv = String::new();
    for code in 1..=alphabet.len() {
        let c = alphabet.letter(code).unwrap();
        let count = TINY_TILES.chars().filter(|&t| t == c).count();
        csv.push_str(&format!("{c},{count},{},0\n", english.score(code)));
    }
    csv.push_str("?,0,0,0\n");
    letter_distribution::LetterDistribution::from_reader(TINY, csv.as_bytes()).unwrap()
}

pub fn fixture_dawg() -> dawg::Dawg {
    let bytes = build::build_from_strs(LEXICON, &alphabet::Alphabet::english(), WORDS).unwrap();
    dawg::Dawg::from_bytes(&bytes).unwrap()
}

impl Table {
    pub fn new(seed: u64) -> Self {
        let cache = Arc::new(cache::ObjectCache::new());
        cache.put("english", letter_distribution::LetterDistribution::english()).unwrap();
        cache.put(TINY, tiny_distribution()).unwrap();
        cache.put(LEXICON, fixture_dawg()).unwrap();
        let clock = Arc::new(game_timers::FakeClock::new(1_000_000));
        Self {
            engine: game::Engine::new(config::Config::default(), cache, clock.clone()),
            clock,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn rules(&self, rule: ChallengeRule) -> game_config::GameRules {
        game_config::GameRules::new(LEXICON, "english").with_challenge_rule(rule)
    }

    pub fn start(&mut self, rules: &game_config::GameRules) -> GameDocument {
        let players = [GamePlayer::new(ALICE), GamePlayer::new(BOB)];
        let mut doc = self.engine.new_game(rules, &players).unwrap();
        self.engine.start_game_with_rng(&mut doc, &mut self.rng).unwrap();
        doc
    }

    pub fn start_with(&mut self, rule: ChallengeRule) -> GameDocument {
        let rules = self.rules(rule);
        self.start(&rules)
    }

    /// Deals fixed racks, e.g. `["ACTDOGS", "EEIIOOU"]`.
    pub fn deal(&mut self, doc: &mut GameDocument, racks: [&str; 2]) {
        let alphabet = alphabet::Alphabet::english();
        let racks = racks.map(|r| alphabet.to_rack(r).unwrap());
        self.engine
            .assign_racks(doc, &racks, inventory::RackAssignBehavior::NeverAssignEmpty)
            .unwrap();
    }

    pub fn send(
        &mut self,
        doc: &mut GameDocument,
        user: &str,
        evt: ClientGameplayEvent,
    ) -> error::Returns<bool> {
        self.engine.process_gameplay_event_with_rng(doc, &evt, user, &mut self.rng)
    }

    pub fn place(
        &mut self,
        doc: &mut GameDocument,
        user: &str,
        coords: &str,
        tiles: &str,
    ) -> error::Returns<bool> {
        let evt = ClientGameplayEvent::place(&doc.uid, user, coords, tiles);
        self.send(doc, user, evt)
    }

    pub fn pass(&mut self, doc: &mut GameDocument, user: &str) -> error::Returns<bool> {
        let evt = ClientGameplayEvent::new(ClientEventType::Pass, &doc.uid, user);
        self.send(doc, user, evt)
    }

    pub fn challenge(&mut self, doc: &mut GameDocument, user: &str) -> error::Returns<bool> {
        let evt = ClientGameplayEvent::new(ClientEventType::Challenge, &doc.uid, user);
        self.send(doc, user, evt)
    }

    pub fn resign(&mut self, doc: &mut GameDocument, user: &str) -> error::Returns<bool> {
        let evt = ClientGameplayEvent::new(ClientEventType::Resign, &doc.uid, user);
        self.send(doc, user, evt)
    }

    pub fn exchange(
        &mut self,
        doc: &mut GameDocument,
        user: &str,
        tiles: &str,
    ) -> error::Returns<bool> {
        let evt = ClientGameplayEvent::exchange(&doc.uid, user, tiles);
        self.send(doc, user, evt)
    }

    pub fn assert_conserved(&mut self, doc: &mut GameDocument) {
        let dist = self
            .engine
            .cache()
            .load::<letter_distribution::LetterDistribution>(
                self.engine.config(),
                &doc.letter_distribution,
            )
            .unwrap();
        doc.inventory(&dist, &mut self.rng).validate_invariants().unwrap();
    }
}

pub fn fmt_rack(rack: &[u8]) -> String {
    alphabet::Alphabet::english().fmt_rack(rack)
}

pub fn sorted(tiles: &[u8]) -> Vec<u8> {
    let mut v = tiles.to_vec();
    v.sort_unstable();
    v
}
