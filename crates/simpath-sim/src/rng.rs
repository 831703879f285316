use serde::{Deserialize, Serialize};

/// Small deterministic RNG driving graph generation and oracle shuffles.
///
/// A plain LCG: reproducible across platforms and independent of any
/// external crate's stream stability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Create a new deterministic RNG from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// Next pseudo-random `u64`.
    pub const fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Next value in `[0, upper_exclusive)`; `0` when the bound is `0`.
    pub fn next_index(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        // High bits of an LCG are the well-mixed ones.
        let draw = (self.next_u64() >> 32) % upper_exclusive as u64;
        usize::try_from(draw).unwrap_or(0)
    }

    /// Next float in `[0, 1)` with 53 bits of precision.
    pub fn next_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
    }

    /// Next float in `[low, high)`.
    pub fn next_in(&mut self, low: f64, high: f64) -> f64 {
        (high - low).mul_add(self.next_unit(), low)
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}
