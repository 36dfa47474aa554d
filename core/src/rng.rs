//! Random Number Generator.
//!
//! PCG32 with one independent stream per simulation lane. A lane's stream is a
//! pure function of the base seed and the lane index so a render can be
//! reproduced exactly regardless of thread count or scheduling.

use crate::geometry::Point2f;
use crate::pbrt::*;

/// 32-bit precision value for 1 - epsilon.
pub const ONE_MINUS_EPSILON: Float = hexf32!("0x1.fffffep-1"); // 0.99999994

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// Implements the pseudo-random number generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RNG {
    state: u64,
    inc: u64,
}

impl Default for RNG {
    /// Return a new instance of `RNG` with default state and stream.
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl RNG {
    /// Create a new `RNG` on the given stream using the default initial state.
    ///
    /// * `sequence_index` - The stream to select.
    pub fn new(sequence_index: u64) -> Self {
        Self::seeded(PCG32_DEFAULT_STATE, sequence_index)
    }

    /// Create a new `RNG` for one simulation lane.
    ///
    /// * `seed` - Base seed of the render.
    /// * `lane` - Lane index; `pixel_index * samples_per_pixel + sample`.
    pub fn for_lane(seed: u64, lane: u64) -> Self {
        Self::seeded(seed ^ PCG32_DEFAULT_STATE, lane)
    }

    /// Create a new `RNG` from an initial state and a stream selector.
    ///
    /// * `init_state` - Initial state.
    /// * `init_seq`   - Stream selector. Only the lower 63 bits are used.
    fn seeded(init_state: u64, init_seq: u64) -> Self {
        let mut rng = Self {
            state: 0,
            inc: (init_seq << 1) | 1,
        };
        let _ = rng.uniform_u32();
        rng.state = rng.state.wrapping_add(init_state);
        let _ = rng.uniform_u32();
        rng
    }

    /// Returns a uniformly distributed u32 value.
    #[inline(always)]
    pub fn uniform_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);

        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed value over the half open interval [0.0, 1.0).
    #[inline]
    pub fn uniform_float(&mut self) -> Float {
        min(
            self.uniform_u32() as Float * hexf32!("0x1.0p-32") as Float,
            ONE_MINUS_EPSILON,
        )
    }

    /// Returns a 2-D sample with both coordinates in [0.0, 1.0).
    pub fn uniform_point2(&mut self) -> Point2f {
        let x = self.uniform_float();
        let y = self.uniform_float();
        Point2f::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lanes_are_reproducible() {
        let mut a = RNG::for_lane(42, 17);
        let mut b = RNG::for_lane(42, 17);
        for _ in 0..100 {
            assert_eq!(a.uniform_u32(), b.uniform_u32());
        }
    }

    #[test]
    fn lanes_are_independent() {
        let a: Vec<u32> = {
            let mut r = RNG::for_lane(42, 0);
            (0..8).map(|_| r.uniform_u32()).collect()
        };
        let b: Vec<u32> = {
            let mut r = RNG::for_lane(42, 1);
            (0..8).map(|_| r.uniform_u32()).collect()
        };
        assert_ne!(a, b);
    }

    #[test]
    fn seed_changes_stream() {
        let mut a = RNG::for_lane(1, 5);
        let mut b = RNG::for_lane(2, 5);
        let xs: Vec<u32> = (0..8).map(|_| a.uniform_u32()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.uniform_u32()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn uniform_mean_is_about_half() {
        let mut rng = RNG::new(7);
        let n = 100_000;
        let sum: f64 = (0..n).map(|_| rng.uniform_float() as f64).sum();
        let mean = sum / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "mean = {}", mean);
    }

    proptest! {
        #[test]
        fn uniform_float_in_unit_interval(seed in any::<u64>(), lane in 0..1_000_000u64) {
            let mut rng = RNG::for_lane(seed, lane);
            for _ in 0..16 {
                let f = rng.uniform_float();
                prop_assert!((0.0..1.0).contains(&f));
            }
        }
    }
}
