// Copyright (C) 2020-2024 Andy Kurnia.

use super::{board_layout, error, event};

pub const RACK_SIZE: usize = 7;
pub const EXCHANGE_TILE_LIMIT: usize = 7;
pub const NUM_ZEROS_TO_END: u32 = 6;
pub const BINGO_BONUS: i32 = 50;

pub const DEFAULT_LEXICON: &str = "NWL20";
pub const DEFAULT_LETTER_DISTRIBUTION: &str = "english";

/// How formed words are judged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum Variant {
    #[default]
    Classic,
    /// Any arrangement of a formed word's letters that is a word counts.
    WordSmog,
}

impl Variant {
    #[inline(always)]
    pub fn is_jumbled(&self) -> bool {
        matches!(self, Variant::WordSmog)
    }
}

/// The rules a game is created with.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct GameRules {
    lexicon: String,
    letter_distribution: String,
    board_layout: String,
    variant: Variant,
    challenge_rule: event::ChallengeRule,
    seconds_per_player: Vec<u32>,
    increment_seconds: u32,
    reset_to_increment_after_turn: bool,
    max_overtime_minutes: u32,
    time_bank_ms: Option<i64>,
    untimed: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            lexicon: DEFAULT_LEXICON.into(),
            letter_distribution: DEFAULT_LETTER_DISTRIBUTION.into(),
            board_layout: board_layout::CROSSWORD_GAME_LAYOUT.into(),
            variant: Variant::Classic,
            challenge_rule: event::ChallengeRule::Void,
            seconds_per_player: vec![300, 300],
            increment_seconds: 0,
            reset_to_increment_after_turn: false,
            max_overtime_minutes: 1,
            time_bank_ms: None,
            untimed: false,
        }
    }
}

impl GameRules {
    pub fn new(lexicon: &str, letter_distribution: &str) -> Self {
        Self {
            lexicon: lexicon.into(),
            letter_distribution: letter_distribution.into(),
            ..Self::default()
        }
    }

    pub fn with_board_layout(mut self, name: &str) -> Self {
        self.board_layout = name.into();
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_challenge_rule(mut self, rule: event::ChallengeRule) -> Self {
        self.challenge_rule = rule;
        self
    }

    /// One entry per player.
    pub fn with_seconds_per_player(mut self, seconds: Vec<u32>) -> Self {
        self.seconds_per_player = seconds;
        self
    }

    pub fn with_increment(
        mut self,
        increment_seconds: u32,
        reset_to_increment_after_turn: bool,
    ) -> Self {
        self.increment_seconds = increment_seconds;
        self.reset_to_increment_after_turn = reset_to_increment_after_turn;
        self
    }

    pub fn with_max_overtime_minutes(mut self, minutes: u32) -> Self {
        self.max_overtime_minutes = minutes;
        self
    }

    pub fn with_time_bank_ms(mut self, ms: i64) -> Self {
        self.time_bank_ms = Some(ms);
        self
    }

    pub fn untimed(mut self) -> Self {
        self.untimed = true;
        self
    }

    #[inline(always)]
    pub fn lexicon(&self) -> &str {
        &self.lexicon
    }

    #[inline(always)]
    pub fn letter_distribution(&self) -> &str {
        &self.letter_distribution
    }

    #[inline(always)]
    pub fn board_layout(&self) -> &str {
        &self.board_layout
    }

    #[inline(always)]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[inline(always)]
    pub fn challenge_rule(&self) -> event::ChallengeRule {
        self.challenge_rule
    }

    #[inline(always)]
    pub fn seconds_per_player(&self) -> &[u32] {
        &self.seconds_per_player
    }

    #[inline(always)]
    pub fn increment_seconds(&self) -> u32 {
        self.increment_seconds
    }

    #[inline(always)]
    pub fn reset_to_increment_after_turn(&self) -> bool {
        self.reset_to_increment_after_turn
    }

    #[inline(always)]
    pub fn max_overtime_minutes(&self) -> u32 {
        self.max_overtime_minutes
    }

    #[inline(always)]
    pub fn time_bank_ms(&self) -> Option<i64> {
        self.time_bank_ms
    }

    #[inline(always)]
    pub fn is_untimed(&self) -> bool {
        self.untimed
    }

    /// Rejects rules that cannot start a game for `num_players` players.
    pub fn validate(&self, num_players: usize) -> error::Returns<()> {
        if num_players == 0 {
            return Err(error::GameError::Setup("a game needs players".into()));
        }
        if self.seconds_per_player.len() != num_players {
            return Err(error::GameError::Setup(format!(
                "{} timer settings for {num_players} players",
                self.seconds_per_player.len()
            )));
        }
        if self.lexicon.is_empty() {
            return Err(error::GameError::Setup("no lexicon".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_validation() {
        let rules = GameRules::new("CSW21", "english")
            .with_challenge_rule(event::ChallengeRule::Five)
            .with_seconds_per_player(vec![60, 60, 60])
            .with_increment(5, true)
            .with_time_bank_ms(30000);
        assert_eq!(rules.lexicon(), "CSW21");
        assert_eq!(rules.board_layout(), board_layout::CROSSWORD_GAME_LAYOUT);
        assert_eq!(rules.challenge_rule(), event::ChallengeRule::Five);
        assert!(rules.reset_to_increment_after_turn());
        assert_eq!(rules.time_bank_ms(), Some(30000));
        assert!(rules.validate(3).is_ok());
        assert!(matches!(rules.validate(2), Err(error::GameError::Setup(_))));
        assert!(!rules.variant().is_jumbled());
        assert!(GameRules::default().with_variant(Variant::WordSmog).variant().is_jumbled());
    }
}
