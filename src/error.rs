// Copyright (C) 2020-2024 Andy Kurnia.

// Rejections a player can cause are ordinary variants. Conservation
// violations mean a board/rack pairing broke upstream and are never repaired.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    // setup
    #[error("bad game rules: {0}")]
    Setup(String),
    #[error("game has already been started")]
    StartNotPermitted,

    // turn legality
    #[error("game not active")]
    GameNotActive,
    #[error("not on turn")]
    NotOnTurn,
    #[error("can only pass or challenge")]
    OnlyPassOrChallenge,
    #[error("you can only exchange with {0} or more tiles in the bag")]
    ExchangeNotPermitted(usize),
    #[error("that move type is not available")]
    MoveTypeNotUserInputtable,
    #[error("game ids do not match")]
    UnmatchedGameId,
    #[error("player not in this game")]
    PlayerNotInGame,
    #[error("challenge not allowed: {0}")]
    ChallengeNotPermitted(String),
    #[error("resigning requires exactly two players, game has {0}")]
    ResignNotPermitted(usize),

    // word legality
    #[error("{0}")]
    InvalidWords(InvalidWords),
    #[error("{0}")]
    IllegalPlay(String),

    // tiles
    #[error("tried to draw {requested} tiles, bag has {available}")]
    InsufficientTiles { requested: usize, available: usize },
    #[error("tried to remove tile {0} from bag that was not there")]
    TileNotInBag(u8),
    #[error("tile in play but not in rack: {0}")]
    TileNotInRack(u8),
    #[error("tile conservation violated: {0}")]
    ConservationViolation(String),

    // format and loading
    #[error("bad dictionary format: {0}")]
    Format(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("cache lock poisoned")]
    CachePoisoned,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GameError {
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, GameError::ConservationViolation(_))
    }
}

/// Words rejected by the lexicon, kept both as machine words and as the
/// strings shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidWords {
    pub words: Vec<Vec<u8>>,
    pub rendered: Vec<String>,
}

impl std::fmt::Display for InvalidWords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid words: {}", self.rendered.join(", "))
    }
}

pub type Returns<T> = Result<T, GameError>;

#[macro_export]
macro_rules! return_error {
    ($error:expr) => {
        return Err($crate::error::GameError::InvalidInput($error));
    };
}
