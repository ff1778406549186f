//! Seedable linear congruential generator

use rand::{RngCore, SeedableRng};

const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1;

/// 64-bit LCG used as the default maze generator.
///
/// `next_u64` returns the full new state. `next_u32` returns its high half,
/// since the low bits of a power-of-two modulus LCG repeat with short periods.
///
/// Maze generation picks neighbours with `next_u32() % count`. A generator
/// that reduces the full 64-bit state instead walks the same LCG sequence but
/// lays out a different maze for the same seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededLcg {
    state: u64,
}

impl SeededLcg {
    /// Creates a generator whose state is exactly `seed`
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u64 {
        self.state
    }
}

impl RngCore for SeededLcg {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SeededLcg {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_outputs() {
        let mut rng = SeededLcg::new(0);
        assert_eq!(rng.next_u64(), 1);
        assert_eq!(rng.next_u64(), LCG_MULTIPLIER.wrapping_add(1));
    }

    #[test]
    fn test_next_u32_is_high_half() {
        let mut rng = SeededLcg::new(0xC0FFEE);
        let mut full = rng.clone();
        for _ in 0..8 {
            let state = full.next_u64();
            assert_eq!(rng.next_u32(), (state >> 32) as u32);
        }
        // One step from zero leaves the high half empty
        assert_eq!(SeededLcg::new(0).next_u32(), 0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededLcg::seed_from_u64(0xC0FFEE);
        let mut b = SeededLcg::new(0xC0FFEE);
        for _ in 0..32 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = SeededLcg::new(7);
        let mut expected = SeededLcg::new(7);
        let mut buf = [0u8; 11];
        rng.fill_bytes(&mut buf);

        let first = expected.next_u64().to_le_bytes();
        let second = expected.next_u64().to_le_bytes();
        assert_eq!(&buf[..8], &first);
        assert_eq!(&buf[8..], &second[..3]);
    }
}
