// Copyright (C) 2020-2024 Andy Kurnia.

use super::board;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum EventType {
    #[default]
    TilePlacementMove,
    Pass,
    Exchange,
    Challenge,
    ChallengeBonus,
    PhonyTilesReturned,
    EndRackPts,
    EndRackPenalty,
    UnsuccessfulChallengeTurnLoss,
    TimedOut,
    Resigned,
}

impl EventType {
    /// Turns that count toward ending the game on zeros.
    #[inline(always)]
    pub fn is_scoreless_turn(&self) -> bool {
        matches!(
            self,
            EventType::Pass | EventType::Exchange | EventType::UnsuccessfulChallengeTurnLoss
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum PlayState {
    #[default]
    Unstarted,
    Playing,
    WaitingForFinalPass,
    GameOver,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum ChallengeRule {
    /// Words are checked when played and cannot be challenged.
    #[default]
    Void,
    Single,
    /// A wrong challenge loses the challenger's turn.
    Double,
    /// Whoever is wrong loses the game.
    Triple,
    Five,
    Ten,
}

impl ChallengeRule {
    /// Points the challengee gets for a valid play that was challenged.
    pub fn bonus(&self) -> Option<i32> {
        match self {
            ChallengeRule::Single => Some(0),
            ChallengeRule::Five => Some(5),
            ChallengeRule::Ten => Some(10),
            ChallengeRule::Void | ChallengeRule::Double | ChallengeRule::Triple => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum GameEndReason {
    #[default]
    None,
    Time,
    Standard,
    ConsecutiveZeroes,
    Resigned,
    TripleChallenge,
}

/// One entry of the game log. Tile fields hold wire bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct GameEvent {
    pub kind: EventType,
    pub player_index: usize,
    pub rack: Vec<u8>,
    pub cumulative: i32,
    pub score: i32,
    pub bonus: i32,
    pub end_rack_points: i32,
    pub lost_score: i32,
    pub millis_remaining: i64,
    pub position_coords: String,
    pub position: Option<board::Position>,
    pub played_tiles: Vec<u8>,
    pub exchanged: Vec<u8>,
    pub leave: Vec<u8>,
    pub words_formed: Vec<Vec<u8>>,
    pub is_bingo: bool,
}

impl GameEvent {
    pub fn new(kind: EventType, player_index: usize) -> Self {
        Self {
            kind,
            player_index,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum ClientEventType {
    TilePlacement,
    Pass,
    Exchange,
    Challenge,
    Resign,
}

/// What a player submits. Tiles come either as a string in the alphabet's
/// glyphs or as wire bytes, not both.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ClientGameplayEvent {
    pub kind: ClientEventType,
    pub game_id: String,
    pub user_id: String,
    #[serde(default)]
    pub position_coords: String,
    #[serde(default)]
    pub tiles: String,
    #[serde(default)]
    pub machine_letters: Vec<u8>,
}

impl ClientGameplayEvent {
    pub fn new(kind: ClientEventType, game_id: &str, user_id: &str) -> Self {
        Self {
            kind,
            game_id: game_id.into(),
            user_id: user_id.into(),
            position_coords: String::new(),
            tiles: String::new(),
            machine_letters: Vec::new(),
        }
    }

    pub fn place(game_id: &str, user_id: &str, coords: &str, tiles: &str) -> Self {
        Self {
            position_coords: coords.into(),
            tiles: tiles.into(),
            ..Self::new(ClientEventType::TilePlacement, game_id, user_id)
        }
    }

    pub fn exchange(game_id: &str, user_id: &str, tiles: &str) -> Self {
        Self {
            tiles: tiles.into(),
            ..Self::new(ClientEventType::Exchange, game_id, user_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_bonuses() {
        assert_eq!(ChallengeRule::Five.bonus(), Some(5));
        assert_eq!(ChallengeRule::Single.bonus(), Some(0));
        assert_eq!(ChallengeRule::Double.bonus(), None);
        assert!(EventType::UnsuccessfulChallengeTurnLoss.is_scoreless_turn());
        assert!(!EventType::ChallengeBonus.is_scoreless_turn());
    }

    #[test]
    fn client_event_from_json() {
        let evt: ClientGameplayEvent = serde_json::from_str(
            r#"{"kind":"TilePlacement","game_id":"g","user_id":"u","position_coords":"8H","tiles":"CAT"}"#,
        )
        .unwrap();
        assert_eq!(evt, ClientGameplayEvent::place("g", "u", "8H", "CAT"));
    }
}
