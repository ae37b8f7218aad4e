//! Reproducible random source.
//!
//! A 32-bit multiply-xorshift generator seeded from a string hash. The same
//! seed string always yields the same stream, on every platform, which is what
//! makes a schedule for a given date reproducible.

use rand::rngs::SmallRng;
use rand::{Error, RngCore, SeedableRng};

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over the seed bytes followed by a murmur-style finaliser.
pub fn hash_seed(seed: &str) -> u32 {
    let mut h = seed.bytes().fold(FNV_OFFSET, |h, byte| (h ^ byte as u32).wrapping_mul(FNV_PRIME));
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// Appends wall-clock millis and OS entropy so that repeated calls differ.
pub fn with_entropy(seed: &str) -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let noise = SmallRng::from_entropy().next_u32();
    format!("{seed}|{millis}|{noise:08x}")
}

#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> SeededRng {
        SeededRng { state: seed }
    }

    pub fn from_seed_str(seed: &str) -> SeededRng {
        SeededRng::new(hash_seed(seed))
    }

    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.step() as f64 / 4_294_967_296.0
    }
}

/// Lets the `rand` samplers (`SliceRandom`, `WeightedIndex`) draw from the
/// seeded stream.
impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::{Distribution, WeightedIndex};
    use rand::seq::SliceRandom;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SeededRng::from_seed_str("2025-01-01");
        let mut b = SeededRng::from_seed_str("2025-01-01");
        for _ in 0..100 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a: Vec<u32> = (0..8).scan(SeededRng::from_seed_str("2025-01-01"), |r, _| Some(r.step())).collect();
        let b: Vec<u32> = (0..8).scan(SeededRng::from_seed_str("2025-01-02"), |r, _| Some(r.step())).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_draws_in_unit_interval() {
        let mut rng = SeededRng::new(0);
        for _ in 0..10_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_draws_are_spread() {
        let mut rng = SeededRng::from_seed_str("spread");
        let mut buckets = [0usize; 10];
        for _ in 0..10_000 {
            buckets[rng.gen_range(0..10)] += 1;
        }
        assert!(buckets.iter().all(|&n| n > 800 && n < 1200), "{buckets:?}");
    }

    #[test]
    fn test_rng_core_follows_step() {
        let mut a = SeededRng::from_seed_str("core");
        let mut b = SeededRng::from_seed_str("core");
        let (lo, hi) = (b.step() as u64, b.step() as u64);
        assert_eq!(a.next_u64(), hi << 32 | lo);

        let mut bytes = [0u8; 6];
        a.fill_bytes(&mut bytes);
        let word = b.step().to_le_bytes();
        assert_eq!(bytes[..4], word);
        assert_eq!(bytes[4..], b.step().to_le_bytes()[..2]);
    }

    #[test]
    fn test_shuffle_is_permutation_and_reproducible() {
        let mut items: Vec<u32> = (0..20).collect();
        let mut again = items.clone();
        items.shuffle(&mut SeededRng::from_seed_str("x"));
        again.shuffle(&mut SeededRng::from_seed_str("x"));
        assert_eq!(items, again);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<u32>>());
        assert_ne!(items, sorted);
    }

    #[test]
    fn test_weighted_index_skips_zero_weights() {
        let mut rng = SeededRng::from_seed_str("w");
        let dist = WeightedIndex::new([0.0, 2.0, 0.0]).unwrap();
        for _ in 0..200 {
            assert_eq!(dist.sample(&mut rng), 1);
        }
    }

    #[test]
    fn test_choose() {
        let items = [1, 2, 3, 4];
        let mut a = SeededRng::from_seed_str("choose");
        let mut b = SeededRng::from_seed_str("choose");
        for _ in 0..20 {
            assert_eq!(items.choose(&mut a), items.choose(&mut b));
        }
        let empty: [u8; 0] = [];
        assert_eq!(empty.choose(&mut a), None);
    }

    #[test]
    fn test_entropy_changes_seed() {
        assert_ne!(with_entropy("2025-01-01"), with_entropy("2025-01-01"));
        assert!(with_entropy("2025-01-01").starts_with("2025-01-01|"));
    }
}
