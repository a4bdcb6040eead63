// Copyright (C) 2020-2024 Andy Kurnia.

use super::alphabet::Tile;
use super::{alphabet, board_layout, error, letter_distribution, matrix};

/// Where a placement starts and which way it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Position {
    pub row: i8,
    pub col: i8,
    pub down: bool,
}

impl Position {
    // lane is the row (across) or column (down); idx runs along it.
    #[inline(always)]
    fn lane_idx(&self) -> (i8, i8) {
        if self.down {
            (self.col, self.row)
        } else {
            (self.row, self.col)
        }
    }
}

/// Board squares as wire bytes: 0 empty, otherwise a letter or designated blank.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Board {
    dim: matrix::Dim,
    tiles: Vec<u8>,
    is_empty: bool,
}

fn illegal(msg: impl Into<String>) -> error::GameError {
    error::GameError::IllegalPlay(msg.into())
}

impl Board {
    pub fn new(dim: matrix::Dim) -> Self {
        Self {
            dim,
            tiles: vec![0; dim.num_squares()],
            is_empty: true,
        }
    }

    #[inline(always)]
    pub fn dim(&self) -> matrix::Dim {
        self.dim
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    #[inline(always)]
    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    #[inline(always)]
    pub fn get(&self, row: i8, col: i8) -> Tile {
        if self.dim.contains(row, col) {
            Tile::from_byte(self.tiles[self.dim.at_row_col(row, col)])
        } else {
            Tile::Zero
        }
    }

    #[inline(always)]
    fn has_letter_at(&self, strider: &matrix::Strider, idx: i8) -> bool {
        strider.get(idx).is_some_and(|sq| self.tiles[sq] != 0)
    }

    // strider for the play's lane, and that the whole play fits on it.
    fn play_strider(&self, pos: &Position, len: usize) -> error::Returns<(matrix::Strider, i8)> {
        let (lane, idx) = pos.lane_idx();
        let num_lanes = if pos.down {
            self.dim.cols
        } else {
            self.dim.rows
        };
        let strider = self.dim.lane(pos.down, lane.clamp(0, num_lanes.max(1) - 1));
        if lane < 0
            || lane >= num_lanes
            || idx < 0
            || idx as usize + len > strider.len() as usize
        {
            return Err(illegal("play extends off of the board"));
        }
        Ok((strider, idx))
    }

    /// Checks the geometry of a placement against the current board.
    /// `Tile::Zero` marks a played-through square.
    pub fn error_if_illegal_play(&self, pos: &Position, tiles: &[Tile]) -> error::Returns<()> {
        let (strider, idx) = self.play_strider(pos, tiles.len())?;
        let (lane, _) = pos.lane_idx();
        let perpendicular = |i: i8| self.dim.lane(!pos.down, i);
        let (center_row, center_col) = self.dim.center();
        let mut touches_center = false;
        let mut borders_a_tile = false;
        let mut placed_a_tile = false;
        for (i, &tile) in (idx..).zip(tiles.iter()) {
            let sq = strider.at(i);
            if sq == self.dim.at_row_col(center_row, center_col) {
                touches_center = true;
            }
            let on_board = self.tiles[sq];
            if tile == Tile::Zero {
                if on_board == 0 {
                    return Err(illegal(
                        "a played-through marker was specified, but there is no tile at the given location",
                    ));
                }
                borders_a_tile = true;
            } else {
                if on_board != 0 {
                    return Err(illegal(
                        "tried to play through a letter already on the board; please use the played-through marker (.) instead",
                    ));
                }
                let cross = perpendicular(i);
                if self.has_letter_at(&cross, lane - 1) || self.has_letter_at(&cross, lane + 1) {
                    borders_a_tile = true;
                }
                placed_a_tile = true;
            }
        }
        if self.is_empty && !touches_center {
            return Err(illegal("the first play must touch the center square"));
        }
        if !self.is_empty && !borders_a_tile {
            return Err(illegal("your play must border a tile already on the board"));
        }
        if !placed_a_tile {
            return Err(illegal("your play must place a new tile"));
        }
        if tiles.len() < 2 {
            return Err(illegal("your play must include at least two letters"));
        }
        if self.has_letter_at(&strider, idx - 1)
            || self.has_letter_at(&strider, idx + tiles.len() as i8)
        {
            return Err(illegal("your play must include the whole word"));
        }
        Ok(())
    }

    /// The main word first, then every perpendicular word of two or more
    /// letters through a newly placed tile. Letters are unblanked.
    pub fn formed_words(&self, pos: &Position, tiles: &[Tile]) -> error::Returns<Vec<Vec<u8>>> {
        if tiles.is_empty() {
            return Err(illegal("no tiles placed"));
        }
        let (strider, idx) = self.play_strider(pos, tiles.len())?;
        let (lane, _) = pos.lane_idx();
        let mut words = vec![Vec::with_capacity(tiles.len())];
        for (i, &tile) in (idx..).zip(tiles.iter()) {
            if tile == Tile::Zero {
                words[0].push(Tile::from_byte(self.tiles[strider.at(i)]).letter());
                continue;
            }
            words[0].push(tile.letter());
            let cross = self.dim.lane(!pos.down, i);
            let mut j = lane;
            while self.has_letter_at(&cross, j - 1) {
                j -= 1;
            }
            let mut cross_word = Vec::new();
            while let Some(sq) = cross.get(j) {
                let letter = if j == lane {
                    tile.letter()
                } else {
                    Tile::from_byte(self.tiles[sq]).letter()
                };
                if letter == 0 {
                    break;
                }
                cross_word.push(letter);
                j += 1;
            }
            if cross_word.len() >= 2 {
                words.push(cross_word);
            }
        }
        Ok(words)
    }

    /// Scores a legal placement against the board before it is placed.
    /// The bingo bonus applies when `rack_size` tiles are placed.
    pub fn score(
        &self,
        layout: &board_layout::BoardLayout,
        dist: &letter_distribution::LetterDistribution,
        pos: &Position,
        tiles: &[Tile],
        rack_size: usize,
        bingo_bonus: i32,
    ) -> error::Returns<i32> {
        let (strider, idx) = self.play_strider(pos, tiles.len())?;
        let (lane, _) = pos.lane_idx();
        let mut recounted_score = 0;
        let mut num_played = 0;

        {
            let mut word_multiplier = 1;
            let mut word_score = 0;
            for (i, &tile) in (idx..).zip(tiles.iter()) {
                let strider_at_i = strider.at(i);
                let (letter_multiplier, placed_tile) = if tile != Tile::Zero {
                    let premium = layout.premium(strider_at_i);
                    num_played += 1;
                    word_multiplier *= premium.word_multiplier as i32;
                    (premium.letter_multiplier as i32, tile.to_byte())
                } else {
                    (1, self.tiles[strider_at_i])
                };
                word_score += dist.score(placed_tile) * letter_multiplier;
            }
            recounted_score += word_score * word_multiplier;
        }

        for (i, &tile) in (idx..).zip(tiles.iter()) {
            if tile == Tile::Zero {
                continue;
            }
            let cross = self.dim.lane(!pos.down, i);
            if !self.has_letter_at(&cross, lane - 1) && !self.has_letter_at(&cross, lane + 1) {
                // no perpendicular tile
                continue;
            }
            let mut j = lane;
            while self.has_letter_at(&cross, j - 1) {
                j -= 1;
            }
            let mut word_multiplier = 1;
            let mut word_score = 0;
            while let Some(sq) = cross.get(j) {
                let (letter_multiplier, placed_tile) = if j == lane {
                    let premium = layout.premium(sq);
                    word_multiplier *= premium.word_multiplier as i32;
                    (premium.letter_multiplier as i32, tile.to_byte())
                } else {
                    (1, self.tiles[sq])
                };
                if placed_tile == 0 {
                    break;
                }
                word_score += dist.score(placed_tile) * letter_multiplier;
                j += 1;
            }
            recounted_score += word_score * word_multiplier;
        }

        if num_played >= rack_size {
            recounted_score += bingo_bonus;
        }
        Ok(recounted_score)
    }

    /// Puts the new tiles on the board. Played-through squares are untouched.
    pub fn place(&mut self, pos: &Position, tiles: &[Tile]) -> error::Returns<()> {
        let (strider, idx) = self.play_strider(pos, tiles.len())?;
        for (i, &tile) in (idx..).zip(tiles.iter()) {
            if tile != Tile::Zero {
                let sq = strider.at(i);
                if self.tiles[sq] != 0 {
                    return Err(error::GameError::ConservationViolation(format!(
                        "square {sq} is already occupied"
                    )));
                }
                self.tiles[sq] = tile.to_byte();
                self.is_empty = false;
            }
        }
        Ok(())
    }

    /// Exact inverse of `place`.
    pub fn unplace(&mut self, pos: &Position, tiles: &[Tile]) -> error::Returns<()> {
        let (strider, idx) = self.play_strider(pos, tiles.len())?;
        for (i, &tile) in (idx..).zip(tiles.iter()) {
            let sq = strider.at(i);
            if tile == Tile::Zero {
                if self.tiles[sq] == 0 {
                    return Err(error::GameError::ConservationViolation(
                        "mismatch with played-through marker".into(),
                    ));
                }
            } else if self.tiles[sq] != tile.to_byte() {
                return Err(error::GameError::ConservationViolation(format!(
                    "square {sq} does not hold the tile being removed"
                )));
            }
        }
        for (i, &tile) in (idx..).zip(tiles.iter()) {
            if tile != Tile::Zero {
                self.tiles[strider.at(i)] = 0;
            }
        }
        self.is_empty = self.tiles.iter().all(|&t| t == 0);
        Ok(())
    }

    /// Tiles on the board as they came from racks: designated blanks are 0.
    pub fn rack_tiles(&self) -> impl Iterator<Item = u8> + '_ {
        self.tiles
            .iter()
            .filter_map(|&t| Tile::from_byte(t).rack_tile())
    }

    /// Rows joined by `/`, runs of empty squares as counts.
    pub fn to_fen(&self, alphabet: &alphabet::Alphabet) -> String {
        let mut bd = String::new();
        for row in 0..self.dim.rows {
            let mut zero_ct = 0;
            for col in 0..self.dim.cols {
                let tile = self.get(row, col);
                if tile == Tile::Zero {
                    zero_ct += 1;
                    continue;
                }
                if zero_ct > 0 {
                    bd.push_str(&zero_ct.to_string());
                    zero_ct = 0;
                }
                bd.push(alphabet.fmt_tile(tile, false));
            }
            if zero_ct > 0 {
                bd.push_str(&zero_ct.to_string());
            }
            if row != self.dim.rows - 1 {
                bd.push('/');
            }
        }
        bd
    }
}
