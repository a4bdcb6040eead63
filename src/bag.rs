// Copyright (C) 2020-2024 Andy Kurnia.

use super::{error, letter_distribution};
use rand::prelude::*;

/// Undrawn tiles as rack codes (0 is a blank). Order carries no meaning.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Bag(pub Vec<u8>);

impl Bag {
    pub fn new(dist: &letter_distribution::LetterDistribution) -> Bag {
        Bag(dist.full_bag())
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes `n` uniformly random tiles. The bag is untouched on error.
    pub fn draw(&mut self, rng: &mut dyn RngCore, n: usize) -> error::Returns<Vec<u8>> {
        let available = self.0.len();
        if n > available {
            return Err(error::GameError::InsufficientTiles {
                requested: n,
                available,
            });
        }
        let (picked, _) = self.0.partial_shuffle(rng, n);
        let drawn = picked.to_vec();
        self.remove_tiles(&drawn)?;
        Ok(drawn)
    }

    /// Like `draw`, but takes whatever is left when the bag runs short.
    pub fn draw_at_most(&mut self, rng: &mut dyn RngCore, n: usize) -> Vec<u8> {
        let n = n.min(self.0.len());
        self.draw(rng, n).unwrap_or_default()
    }

    #[inline(always)]
    pub fn put_back(&mut self, tiles: &[u8]) {
        self.0.extend_from_slice(tiles);
    }

    pub fn can_remove_tiles(&self, tiles: &[u8]) -> bool {
        let mut freq = [0u16; 256];
        for &t in &self.0 {
            freq[t as usize] += 1;
        }
        tiles.iter().all(|&t| {
            let f = &mut freq[t as usize];
            if *f == 0 {
                false
            } else {
                *f -= 1;
                true
            }
        })
    }

    /// Takes specific tiles out. The bag is untouched on error.
    pub fn remove_tiles(&mut self, tiles: &[u8]) -> error::Returns<()> {
        let mut wanted = [0u16; 256];
        for &t in tiles {
            wanted[t as usize] += 1;
        }
        let mut have = [0u16; 256];
        for &t in &self.0 {
            have[t as usize] += 1;
        }
        if let Some(&missing) = tiles.iter().find(|&&t| have[t as usize] < wanted[t as usize]) {
            return Err(error::GameError::TileNotInBag(missing));
        }
        self.0.retain(|&t| {
            let w = &mut wanted[t as usize];
            if *w > 0 {
                *w -= 1;
                false
            } else {
                true
            }
        });
        Ok(())
    }

    pub fn count(&self, tile: u8) -> usize {
        self.0.iter().filter(|&&t| t == tile).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    fn english_bag() -> Bag {
        Bag::new(&letter_distribution::LetterDistribution::english())
    }

    #[test]
    fn fresh_bag() {
        let bag = english_bag();
        assert_eq!(bag.len(), 100);
        assert_eq!(bag.count(0), 2);
        assert_eq!(bag.count(5), 12);
    }

    #[test]
    fn draw_takes_exactly_n() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut bag = english_bag();
        let drawn = bag.draw(&mut rng, 7).unwrap();
        assert_eq!(drawn.len(), 7);
        assert_eq!(bag.len(), 93);
        for &t in &drawn {
            let taken = drawn.iter().filter(|&&d| d == t).count();
            assert_eq!(bag.count(t) + taken, english_bag().count(t));
        }
    }

    #[test]
    fn draws_empty_the_bag_without_loss() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut bag = english_bag();
        let mut drawn = Vec::new();
        while !bag.is_empty() {
            drawn.extend(bag.draw(&mut rng, bag.len().min(7)).unwrap());
        }
        drawn.sort_unstable();
        let mut full = english_bag().0;
        full.sort_unstable();
        assert_eq!(drawn, full);

        // any tile can come out first.
        let mut seen = [false; 4];
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut bag = Bag(vec![0, 1, 2, 3]);
            seen[bag.draw(&mut rng, 1).unwrap()[0] as usize] = true;
            assert_eq!(bag.len(), 3);
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn overdraw_leaves_bag_alone() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut bag = Bag(vec![1, 2, 3]);
        match bag.draw(&mut rng, 4) {
            Err(error::GameError::InsufficientTiles {
                requested: 4,
                available: 3,
            }) => {}
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(bag.0, [1, 2, 3]);
        let mut drawn = bag.draw_at_most(&mut rng, 10);
        drawn.sort_unstable();
        assert_eq!(drawn, [1, 2, 3]);
        assert!(bag.is_empty());
        assert!(bag.draw_at_most(&mut rng, 2).is_empty());
    }

    #[test]
    fn remove_specific_tiles() {
        let mut bag = Bag(vec![1, 1, 2, 0, 3]);
        assert!(bag.can_remove_tiles(&[1, 1, 0]));
        assert!(!bag.can_remove_tiles(&[2, 2]));
        assert!(matches!(bag.remove_tiles(&[3, 3]), Err(error::GameError::TileNotInBag(3))));
        assert_eq!(bag.len(), 5);
        bag.remove_tiles(&[1, 0]).unwrap();
        assert_eq!(bag.0, [1, 2, 3]);
        bag.put_back(&[0, 0]);
        assert_eq!(bag.count(0), 2);
    }
}
