//! 7-bag randomizer for piece generation
//!
//! All 7 pieces are shuffled, then dealt out before the next shuffled set
//! is drawn. This prevents long droughts and floods.

use crate::tetromino::TetrominoType;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag {
    /// Draw pool, drawn from the front
    pool: VecDeque<TetrominoType>,
    rng: ChaCha8Rng,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create a bag seeded from the OS entropy source
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a bag with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            pool: VecDeque::with_capacity(TetrominoType::COUNT * 2),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw the next piece, refilling first if the pool is empty
    pub fn next(&mut self) -> TetrominoType {
        loop {
            match self.pool.pop_front() {
                Some(piece) => return piece,
                None => self.refill(),
            }
        }
    }

    /// Preview the next `count` draws without consuming them
    pub fn peek(&mut self, count: usize) -> Vec<TetrominoType> {
        while self.pool.len() < count {
            self.refill();
        }
        self.pool.iter().take(count).copied().collect()
    }

    /// Discard the pool; the next draw starts a fresh bag
    pub fn reset(&mut self) {
        self.pool.clear();
    }

    /// Append a new shuffled bag behind the pieces still pending
    fn refill(&mut self) {
        let mut new_bag = TetrominoType::all();
        new_bag.shuffle(&mut self.rng);
        self.pool.extend(new_bag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_aligned_bag_contains_all_pieces() {
        let mut bag = Bag::with_seed(7);
        for _ in 0..20 {
            let pieces: HashSet<_> = (0..7).map(|_| bag.next()).collect();
            assert_eq!(pieces.len(), 7);
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut bag = Bag::with_seed(42);
        bag.next();
        bag.next();
        let peeked = bag.peek(12);
        assert_eq!(peeked.len(), 12);
        let drawn: Vec<_> = (0..12).map(|_| bag.next()).collect();
        assert_eq!(peeked, drawn);
    }

    #[test]
    fn test_peek_across_bags_keeps_bag_invariant() {
        let mut bag = Bag::with_seed(3);
        // Force a refill while pieces from the first bag are still pending
        bag.next();
        bag.peek(10);
        let mut drawn = vec![];
        for _ in 0..13 {
            drawn.push(bag.next());
        }
        let second_bag: HashSet<_> = drawn[6..13].iter().collect();
        assert_eq!(second_bag.len(), 7);
    }

    #[test]
    fn test_draining_the_pool_refills_on_demand() {
        let mut bag = Bag::with_seed(11);
        let previewed = bag.peek(10);
        let drawn: Vec<_> = (0..14).map(|_| bag.next()).collect();
        assert_eq!(drawn[..10], previewed[..]);
        assert!(bag.pool.is_empty());

        let fresh: HashSet<_> = (0..7).map(|_| bag.next()).collect();
        assert_eq!(fresh.len(), 7);
    }

    #[test]
    fn test_reset_starts_new_bag() {
        let mut bag = Bag::with_seed(1);
        for _ in 0..3 {
            bag.next();
        }
        bag.reset();
        let pieces: HashSet<_> = (0..7).map(|_| bag.next()).collect();
        assert_eq!(pieces.len(), 7);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Bag::with_seed(99);
        let mut b = Bag::with_seed(99);
        let sa: Vec<_> = (0..21).map(|_| a.next()).collect();
        let sb: Vec<_> = (0..21).map(|_| b.next()).collect();
        assert_eq!(sa, sb);
    }
}
