// Copyright (C) 2020-2024 Andy Kurnia.

use super::{bag, board, error, game_config, letter_distribution};
use rand::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum RackAssignBehavior {
    NeverAssignEmpty,
    AlwaysAssignEmpty,
    AssignEmptyIfUnambiguous,
}

/// What remains of `rack` after taking out `tiles_used`, sorted.
///
/// Designated blanks come out of the rack as blanks. With
/// `zero_is_played_through`, a 0 in `tiles_used` is a played-through square
/// and takes nothing; otherwise it is a blank.
pub fn leave(
    rack: &[u8],
    tiles_used: &[u8],
    zero_is_played_through: bool,
) -> error::Returns<Vec<u8>> {
    let mut freq = [0u8; 256];
    for &t in rack {
        freq[t as usize] += 1;
    }
    for &t in tiles_used {
        if t == 0 && zero_is_played_through {
            continue;
        }
        let t = if t & 0x80 != 0 { 0 } else { t };
        if freq[t as usize] == 0 {
            return Err(error::GameError::TileNotInRack(t));
        }
        freq[t as usize] -= 1;
    }
    let mut ret = Vec::with_capacity(rack.len());
    for (t, &n) in freq.iter().enumerate() {
        for _ in 0..n {
            ret.push(t as u8);
        }
    }
    Ok(ret)
}

/// Every movement of tiles between bag, racks and board goes through here.
/// Each public operation ends by checking that no tile was made or lost.
pub struct TileInventory<'a> {
    dist: &'a letter_distribution::LetterDistribution,
    bag: &'a mut bag::Bag,
    racks: &'a mut [Vec<u8>],
    board: &'a board::Board,
    rng: &'a mut dyn RngCore,
}

impl<'a> TileInventory<'a> {
    pub fn new(
        dist: &'a letter_distribution::LetterDistribution,
        bag: &'a mut bag::Bag,
        racks: &'a mut [Vec<u8>],
        board: &'a board::Board,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self {
            dist,
            bag,
            racks,
            board,
            rng,
        }
    }

    fn check_player(&self, player: usize) -> error::Returns<()> {
        if player >= self.racks.len() {
            return_error!(format!("no player {player}"));
        }
        Ok(())
    }

    fn bag_and_board_counts(&self) -> [usize; 256] {
        let mut counts = [0usize; 256];
        for &t in &self.bag.0 {
            counts[t as usize] += 1;
        }
        for t in self.board.rack_tiles() {
            counts[t as usize] += 1;
        }
        counts
    }

    /// bag + racks + board, with designated blanks as blanks, must equal the
    /// distribution for every tile.
    pub fn validate_invariants(&self) -> error::Returns<()> {
        let mut counts = self.bag_and_board_counts();
        for rack in self.racks.iter() {
            for &t in rack {
                counts[t as usize] += 1;
            }
        }
        let num_letters = self.dist.alphabet().len() as usize;
        for (tile, &found) in counts.iter().enumerate() {
            let expected = if tile <= num_letters {
                self.dist.count(tile as u8) as usize
            } else {
                0
            };
            if found != expected {
                let rack_lens = self.racks.iter().map(|r| r.len()).collect::<Vec<_>>();
                let msg = format!(
                    "tile {tile} count mismatch: expected {expected}, found {found} (bag={}, board={}, racks={rack_lens:?})",
                    self.bag.len(),
                    self.board_tile_count(),
                );
                log::error!("{msg}");
                return Err(error::GameError::ConservationViolation(msg));
            }
        }
        Ok(())
    }

    pub fn board_tile_count(&self) -> usize {
        self.board.tiles().iter().filter(|&&t| t != 0).count()
    }

    pub fn total_tile_count(&self) -> usize {
        self.bag.len() + self.racks.iter().map(|r| r.len()).sum::<usize>() + self.board_tile_count()
    }

    pub fn validated_put_back(&mut self, tiles: &[u8]) -> error::Returns<()> {
        if tiles.is_empty() {
            return Ok(());
        }
        let mut counts = self.bag_and_board_counts();
        let num_letters = self.dist.alphabet().len();
        for &t in tiles {
            counts[t as usize] += 1;
            let max = if t <= num_letters {
                self.dist.count(t) as usize
            } else {
                0
            };
            if counts[t as usize] > max {
                let msg = format!(
                    "putting back tile {t} would give {} in bag+board (max {max})",
                    counts[t as usize]
                );
                log::error!("{msg}");
                return Err(error::GameError::ConservationViolation(msg));
            }
        }
        self.bag.put_back(tiles);
        Ok(())
    }

    fn move_tiles_from_rack_to_bag(&mut self, player: usize, tiles: &[u8]) -> error::Returns<()> {
        if tiles.is_empty() {
            return Ok(());
        }
        self.racks[player] = leave(&self.racks[player], tiles, false)?;
        self.bag.put_back(tiles);
        Ok(())
    }

    fn move_tiles_from_bag_to_rack(&mut self, player: usize, tiles: &[u8]) -> error::Returns<()> {
        if tiles.is_empty() {
            return Ok(());
        }
        self.bag.remove_tiles(tiles)?;
        self.racks[player].extend_from_slice(tiles);
        Ok(())
    }

    fn draw_tiles_to_rack(&mut self, player: usize, n: usize) -> usize {
        let drawn = self.bag.draw_at_most(self.rng, n);
        self.racks[player].extend_from_slice(&drawn);
        drawn.len()
    }

    // tiles of `desired` that the bag cannot supply.
    fn missing_from_bag(&self, desired: &[u8]) -> Vec<u8> {
        let mut have = [0usize; 256];
        for &t in &self.bag.0 {
            have[t as usize] += 1;
        }
        let mut missing = Vec::new();
        for &t in desired {
            if have[t as usize] > 0 {
                have[t as usize] -= 1;
            } else {
                missing.push(t);
            }
        }
        missing
    }

    pub fn exchange_tiles(&mut self, player: usize, tiles: &[u8]) -> error::Returns<()> {
        self.check_player(player)?;
        if tiles.is_empty() {
            return Ok(());
        }
        leave(&self.racks[player], tiles, false)?;
        // draw first so the same tiles cannot come straight back.
        let drawn = self.bag.draw(self.rng, tiles.len())?;
        self.racks[player].extend_from_slice(&drawn);
        self.racks[player] = leave(&self.racks[player], tiles, false)?;
        self.validated_put_back(tiles)?;
        self.validate_invariants()
    }

    pub fn draw_to_rack(&mut self, player: usize, n: usize) -> error::Returns<()> {
        self.check_player(player)?;
        let drawn = self.bag.draw(self.rng, n)?;
        self.racks[player].extend_from_slice(&drawn);
        self.validate_invariants()
    }

    pub fn draw_at_most_to_rack(&mut self, player: usize, n: usize) -> error::Returns<usize> {
        self.check_player(player)?;
        let drew = self.draw_tiles_to_rack(player, n);
        self.validate_invariants()?;
        Ok(drew)
    }

    pub fn draw_to_fill_rack(&mut self, player: usize) -> error::Returns<usize> {
        self.check_player(player)?;
        let needed = game_config::RACK_SIZE.saturating_sub(self.racks[player].len());
        if needed == 0 {
            return Ok(0);
        }
        let drew = self.draw_tiles_to_rack(player, needed);
        self.validate_invariants()?;
        Ok(drew)
    }

    pub fn clear_rack(&mut self, player: usize) -> error::Returns<()> {
        self.check_player(player)?;
        if self.racks[player].is_empty() {
            return Ok(());
        }
        let rack = std::mem::take(&mut self.racks[player]);
        self.bag.put_back(&rack);
        self.validate_invariants()
    }

    /// Replaces a rack with specific tiles. The old rack goes back first.
    /// Tiles the bag lacks are borrowed from other players, who then refill.
    pub fn set_rack(&mut self, player: usize, desired: &[u8]) -> error::Returns<()> {
        self.check_player(player)?;
        let current = std::mem::take(&mut self.racks[player]);
        self.bag.put_back(&current);
        if desired.is_empty() {
            return self.validate_invariants();
        }
        if self.bag.can_remove_tiles(desired) {
            self.move_tiles_from_bag_to_rack(player, desired)?;
            return self.validate_invariants();
        }
        let to_borrow = self.missing_from_bag(desired);
        let lender = (0..self.racks.len())
            .filter(|&p| p != player)
            .find(|&p| leave(&self.racks[p], &to_borrow, false).is_ok());
        let Some(lender) = lender else {
            return Err(error::GameError::TileNotInBag(to_borrow.first().copied().unwrap_or(0)));
        };
        self.move_tiles_from_rack_to_bag(lender, &to_borrow)?;
        log::debug!(
            "borrowed {:?} from player {lender}, their rack now {} tiles, bag {}",
            to_borrow,
            self.racks[lender].len(),
            self.bag.len()
        );
        self.move_tiles_from_bag_to_rack(player, desired)?;
        let needed = game_config::RACK_SIZE.saturating_sub(self.racks[lender].len());
        let drew = self.draw_tiles_to_rack(lender, needed);
        log::debug!("refilled player {lender} with {drew} tiles, bag {}", self.bag.len());
        self.validate_invariants()
    }

    /// Sets every rack at once. All current racks go back; empty entries
    /// stay empty. With `allow_borrowing`, empty entries instead keep their
    /// current racks and may lend tiles the bag lacks.
    pub fn set_all_racks(
        &mut self,
        racks: &[Vec<u8>],
        allow_borrowing: bool,
    ) -> error::Returns<()> {
        if racks.len() != self.racks.len() {
            return_error!(format!(
                "racks length {} doesn't match player count {}",
                racks.len(),
                self.racks.len()
            ));
        }
        for (i, new_rack) in racks.iter().enumerate() {
            if !allow_borrowing || !new_rack.is_empty() {
                let current = std::mem::take(&mut self.racks[i]);
                self.bag.put_back(&current);
            }
        }
        for (i, new_rack) in racks.iter().enumerate() {
            if new_rack.is_empty() {
                continue;
            }
            if self.bag.can_remove_tiles(new_rack) {
                self.move_tiles_from_bag_to_rack(i, new_rack)?;
            } else if allow_borrowing {
                self.borrow_from_preserved_racks(i, new_rack, racks)?;
            } else {
                self.move_tiles_from_bag_to_rack(i, new_rack)?;
            }
        }
        self.validate_invariants()
    }

    fn borrow_from_preserved_racks(
        &mut self,
        player: usize,
        desired: &[u8],
        racks: &[Vec<u8>],
    ) -> error::Returns<()> {
        let to_borrow = self.missing_from_bag(desired);
        for (lender, requested) in racks.iter().enumerate() {
            if lender == player || !requested.is_empty() || self.racks[lender].is_empty() {
                continue;
            }
            if self.move_tiles_from_rack_to_bag(lender, &to_borrow).is_err() {
                continue;
            }
            log::debug!(
                "borrowed {to_borrow:?} from preserved rack of player {lender} for player {player}"
            );
            self.move_tiles_from_bag_to_rack(player, desired)?;
            let needed = game_config::RACK_SIZE.saturating_sub(self.racks[lender].len());
            self.draw_tiles_to_rack(lender, needed);
            return Ok(());
        }
        Err(error::GameError::TileNotInBag(to_borrow.first().copied().unwrap_or(0)))
    }

    pub fn assign_racks(
        &mut self,
        racks: &[Vec<u8>],
        behavior: RackAssignBehavior,
    ) -> error::Returns<()> {
        for (i, rack) in self.racks.iter().enumerate() {
            if !rack.is_empty() {
                log::debug!("throwing in rack {rack:?} for player {i}");
            }
        }
        self.set_all_racks(racks, false)?;
        let empties = racks.iter().filter(|r| r.is_empty()).count();
        let bag_will_be_empty = self.bag.len() <= empties * game_config::RACK_SIZE;
        let fill = match behavior {
            RackAssignBehavior::NeverAssignEmpty => false,
            RackAssignBehavior::AlwaysAssignEmpty => true,
            RackAssignBehavior::AssignEmptyIfUnambiguous => bag_will_be_empty,
        };
        if fill {
            // empties first, then partial racks.
            let order = racks
                .iter()
                .enumerate()
                .filter(|(_, r)| r.is_empty())
                .chain(
                    racks
                        .iter()
                        .enumerate()
                        .filter(|(_, r)| !r.is_empty() && r.len() < game_config::RACK_SIZE),
                )
                .map(|(i, _)| i)
                .collect::<Vec<_>>();
            for i in order {
                self.draw_to_fill_rack(i)?;
            }
        }
        Ok(())
    }

    pub fn log_tile_state(&self, label: &str) {
        let rack_lens = self.racks.iter().map(|r| r.len()).collect::<Vec<_>>();
        log::debug!(
            "tile-state {label}: bag={} racks={rack_lens:?} board={} total={}",
            self.bag.len(),
            self.board_tile_count(),
            self.total_tile_count()
        );
    }
}
