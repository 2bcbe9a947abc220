//! Seeded Randomness
//!
//! Every nation owns exactly one `PseudoRandom`. All of its decisions draw
//! from it, so a run is a pure function of (seed, ticks, observed state).

use rand::rngs::SmallRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// 31-multiplier string hash over UTF-16 code units, wrapping at 32 bits
pub fn simple_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Deterministic random source for one nation
#[derive(Debug, Clone)]
pub struct PseudoRandom {
    rng: SmallRng,
}

impl PseudoRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seed from the nation's identity combined with the session identity
    pub fn for_nation(identity: &str, game_id: &str) -> Self {
        let seed = simple_hash(identity).wrapping_add(simple_hash(game_id));
        Self::new(seed as i64 as u64)
    }

    /// Uniform integer in `[min, max)`. Returns `min` when the range is empty.
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Uniform float in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// True with probability `1 / one_in`
    pub fn chance(&mut self, one_in: u32) -> bool {
        if one_in <= 1 {
            return true;
        }
        self.rng.gen_range(0..one_in) == 0
    }

    /// Uniformly pick one element
    pub fn rand_element<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..items.len());
        items.get(idx)
    }

    /// Up to `limit` elements without replacement.
    ///
    /// Collections no larger than `limit` come back whole and in order;
    /// larger ones yield a uniform random subset in draw order.
    pub fn sample<T: Clone>(&mut self, items: &[T], limit: usize) -> Vec<T> {
        if items.len() <= limit {
            return items.to_vec();
        }
        index::sample(&mut self.rng, items.len(), limit)
            .into_iter()
            .map(|i| items[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_simple_hash_matches_known_values() {
        assert_eq!(simple_hash(""), 0);
        assert_eq!(simple_hash("a"), 97);
        assert_eq!(simple_hash("ab"), 97 * 31 + 98);
        // Long strings wrap instead of overflowing
        let _ = simple_hash("a fairly long nation identity that wraps around i32");
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = PseudoRandom::for_nation("nation_1", "game_x");
        let mut b = PseudoRandom::for_nation("nation_1", "game_x");
        let va: Vec<i64> = (0..50).map(|_| a.next_int(0, 1000)).collect();
        let vb: Vec<i64> = (0..50).map(|_| b.next_int(0, 1000)).collect();
        assert_eq!(va, vb);
    }

    #[test]
    fn test_different_identity_different_sequence() {
        let mut a = PseudoRandom::for_nation("nation_1", "game_x");
        let mut b = PseudoRandom::for_nation("nation_2", "game_x");
        let va: Vec<i64> = (0..20).map(|_| a.next_int(0, 1_000_000)).collect();
        let vb: Vec<i64> = (0..20).map(|_| b.next_int(0, 1_000_000)).collect();
        assert_ne!(va, vb);
    }

    #[test]
    fn test_next_int_bounds() {
        let mut rng = PseudoRandom::new(7);
        for _ in 0..1000 {
            let v = rng.next_int(-25, 25);
            assert!((-25..25).contains(&v));
        }
        assert_eq!(rng.next_int(5, 5), 5);
        assert_eq!(rng.next_int(5, 2), 5);
    }

    #[test]
    fn test_chance_one_always_true() {
        let mut rng = PseudoRandom::new(1);
        assert!((0..100).all(|_| rng.chance(1)));
    }

    #[test]
    fn test_chance_rate_is_roughly_right() {
        let mut rng = PseudoRandom::new(99);
        let hits = (0..10_000).filter(|_| rng.chance(4)).count();
        assert!(hits > 2000 && hits < 3000, "got {} hits", hits);
    }

    #[test]
    fn test_rand_element_empty() {
        let mut rng = PseudoRandom::new(3);
        let empty: [u32; 0] = [];
        assert!(rng.rand_element(&empty).is_none());
        assert_eq!(rng.rand_element(&[9]), Some(&9));
    }

    #[test]
    fn test_sample_small_returns_all() {
        let mut rng = PseudoRandom::new(3);
        let items = vec![1, 2, 3];
        assert_eq!(rng.sample(&items, 50), items);
    }

    #[test]
    fn test_sample_large_without_replacement() {
        let mut rng = PseudoRandom::new(11);
        let items: Vec<u32> = (0..500).collect();
        let sampled = rng.sample(&items, 50);
        assert_eq!(sampled.len(), 50);
        let unique: HashSet<_> = sampled.iter().collect();
        assert_eq!(unique.len(), 50);
    }
}
