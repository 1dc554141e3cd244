//! Xorshift PRNG for musical randomness.
//!
//! Not cryptographic. Used for FM ratio/index choice, LFO rates and the
//! sequencer's dice rolls, where a deterministic seed keeps renders
//! reproducible.

/// 32-bit xorshift generator.
#[derive(Debug, Clone)]
pub struct Xorshift32 {
    state: u32,
}

impl Default for Xorshift32 {
    fn default() -> Self {
        Self::new(0x2545_F491)
    }
}

impl Xorshift32 {
    /// Create a generator. A zero seed is replaced, since zero is a fixed point.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x2545_F491 } else { seed },
        }
    }

    /// Next raw value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform integer in `[0, bound)`. Returns 0 for a zero bound.
    #[inline]
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        ((u64::from(self.next_u32()) * u64::from(bound)) >> 32) as u32
    }

    /// `k / 256` for a uniform `k ∈ [0, 256)`.
    #[inline]
    pub fn unit_256(&mut self) -> f32 {
        self.below(256) as f32 / 256.0
    }

    /// Uniform value in `[min, max]` quantized to `steps` levels.
    #[inline]
    pub fn stepped(&mut self, min: f32, max: f32, steps: u32) -> f32 {
        if steps < 2 {
            return min;
        }
        let k = self.below(steps) as f32 / (steps - 1) as f32;
        min + (max - min) * k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_per_seed() {
        let mut a = Xorshift32::new(42);
        let mut b = Xorshift32::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_not_stuck() {
        let mut rng = Xorshift32::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_ranges() {
        let mut rng = Xorshift32::new(7);
        for _ in 0..10_000 {
            assert!(rng.below(5) < 5);
            let u = rng.unit_256();
            assert!((0.0..1.0).contains(&u));
            let s = rng.stepped(0.33, 3.33, 256);
            assert!(s >= 0.33 && s <= 3.3301, "{s}");
        }
        assert_eq!(rng.below(0), 0);
    }

    #[test]
    fn test_below_covers_all_values() {
        let mut rng = Xorshift32::new(99);
        let mut seen = [false; 8];
        for _ in 0..1000 {
            seen[rng.below(8) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
