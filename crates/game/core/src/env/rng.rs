//! Combat random stream with snapshot/restore.
//!
//! Combat owns a dedicated stream so that its draws never interleave with any
//! other consumer. The stream position is an opaque [`RngSnapshot`]; the phase
//! solver records a before/after snapshot pair around every resolution so that
//! undo and redo only restore recorded positions and never re-invoke the
//! generator.
//!
//! # Determinism
//!
//! Given the same seed, a stream produces the same sequence of values. Saving
//! the snapshot alongside the board restores the exact position on load.

/// Opaque position of a random stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RngSnapshot(pub u64);

/// Stateful random source consumed by combat.
pub trait RandomStream {
    /// Advances the stream and returns the next 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Captures the current position.
    fn snapshot(&self) -> RngSnapshot;

    /// Moves the stream back (or forward) to a captured position.
    fn restore(&mut self, snapshot: RngSnapshot);

    /// Draws a percentile roll in `0..100`.
    fn roll_percent(&mut self) -> u32 {
        self.next_u32() % 100
    }
}

/// PCG random stream (Permuted Congruential Generator).
///
/// This implementation uses PCG-XSH-RR, which produces 32-bit output from
/// 64-bit state. The whole state is the snapshot.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgStream {
    state: u64,
}

impl PcgStream {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a stream from a seed, avalanching it so nearby seeds diverge.
    pub fn from_seed(seed: u64) -> Self {
        let mut hash = seed ^ 0x9e3779b97f4a7c15;
        hash ^= hash >> 33;
        hash = hash.wrapping_mul(0xff51afd7ed558ccd);
        hash ^= hash >> 33;
        Self { state: hash }
    }

    /// Resumes a stream at a previously captured position.
    pub const fn from_snapshot(snapshot: RngSnapshot) -> Self {
        Self { state: snapshot.0 }
    }

    /// Advance the PCG state by one step.
    ///
    /// `state' = (state * multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomStream for PcgStream {
    fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }

    fn snapshot(&self) -> RngSnapshot {
        RngSnapshot(self.state)
    }

    fn restore(&mut self, snapshot: RngSnapshot) {
        self.state = snapshot.0;
    }
}
