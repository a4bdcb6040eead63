// Copyright (C) 2020-2024 Andy Kurnia.

use super::{bag, board, error, event, game_config, game_timers, inventory, letter_distribution};
use rand::prelude::*;

pub const GAME_DOCUMENT_VERSION: u32 = 1;

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct GamePlayer {
    pub user_id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub quit: bool,
}

impl GamePlayer {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.into(),
            nickname: user_id.into(),
            quit: false,
        }
    }
}

/// Everything about one game. Callers persist this between events and must
/// not apply two events to the same document at once.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct GameDocument {
    pub version: u32,
    pub uid: String,
    pub players: Vec<GamePlayer>,
    pub events: Vec<event::GameEvent>,
    pub lexicon: String,
    pub variant: game_config::Variant,
    pub board_layout: String,
    pub letter_distribution: String,
    pub racks: Vec<Vec<u8>>,
    pub board: board::Board,
    pub bag: bag::Bag,
    pub player_on_turn: usize,
    pub current_scores: Vec<i32>,
    pub timers: game_timers::GameTimers,
    pub play_state: event::PlayState,
    pub challenge_rule: event::ChallengeRule,
    pub scoreless_turns: u32,
    pub end_reason: event::GameEndReason,
    pub winner: Option<usize>,
}

impl GameDocument {
    #[inline(always)]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn player_index(&self, user_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.user_id == user_id)
    }

    #[inline(always)]
    pub fn is_over(&self) -> bool {
        self.play_state == event::PlayState::GameOver
    }

    /// Tile movements over this document's bag, racks and board.
    pub fn inventory<'a>(
        &'a mut self,
        dist: &'a letter_distribution::LetterDistribution,
        rng: &'a mut dyn RngCore,
    ) -> inventory::TileInventory<'a> {
        inventory::TileInventory::new(dist, &mut self.bag, &mut self.racks, &self.board, rng)
    }

    pub fn to_json(&self) -> error::Returns<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> error::Returns<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{board_layout, matrix};
    use super::*;
    use rand_chacha::ChaCha8Rng;

    fn doc() -> GameDocument {
        let dist = letter_distribution::LetterDistribution::english();
        GameDocument {
            version: GAME_DOCUMENT_VERSION,
            uid: "abc".into(),
            players: vec![GamePlayer::new("a"), GamePlayer::new("b")],
            events: Vec::new(),
            lexicon: "NWL20".into(),
            variant: game_config::Variant::Classic,
            board_layout: board_layout::CROSSWORD_GAME_LAYOUT.into(),
            letter_distribution: "english".into(),
            racks: vec![Vec::new(), Vec::new()],
            board: board::Board::new(matrix::Dim { rows: 15, cols: 15 }),
            bag: bag::Bag::new(&dist),
            player_on_turn: 0,
            current_scores: vec![0, 0],
            timers: game_timers::GameTimers::new(&[60, 60], 0, false, 1, None, false),
            play_state: event::PlayState::Playing,
            challenge_rule: event::ChallengeRule::Void,
            scoreless_turns: 0,
            end_reason: event::GameEndReason::None,
            winner: None,
        }
    }

    #[test]
    fn players_and_inventory() {
        let mut d = doc();
        assert_eq!(d.player_index("b"), Some(1));
        assert_eq!(d.player_index("c"), None);
        assert!(!d.is_over());
        let dist = letter_distribution::LetterDistribution::english();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        d.inventory(&dist, &mut rng).draw_to_fill_rack(1).unwrap();
        assert_eq!(d.racks[1].len(), 7);
        assert_eq!(d.bag.len(), 93);
    }

    #[test]
    fn reads_older_player_records() {
        let d = GameDocument::from_json(&doc().to_json().unwrap()).unwrap();
        assert_eq!(d, doc());
        let p: GamePlayer = serde_json::from_str(r#"{"user_id":"x"}"#).unwrap();
        assert_eq!((p.nickname.as_str(), p.quit), ("", false));
    }
}
