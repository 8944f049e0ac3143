//! Seeded word combiner and the per-process hash seed.

use crate::tracing_compat::warn;
use core::fmt;
use std::hash::BuildHasher;
use std::sync::LazyLock;

static PROCESS_SEED: LazyLock<HashSeed> = LazyLock::new(HashSeed::from_os);

/// Secret seed mixed into every canonical hash.
///
/// The process seed is drawn once from OS entropy, so hash values are stable
/// within a process and unpredictable across processes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HashSeed(u64);

impl HashSeed {
    /// Returns the seed shared by every policy in this process.
    #[must_use]
    pub fn process() -> Self {
        *PROCESS_SEED
    }

    /// Creates a fixed seed for reproducible hashing in tests and benchmarks.
    ///
    /// A fixed seed makes hash values predictable and should not be used for
    /// untrusted input.
    #[must_use]
    pub const fn fixed(seed: u64) -> Self {
        Self(seed)
    }

    fn from_os() -> Self {
        let mut buf = [0u8; 8];
        match getrandom::fill(&mut buf) {
            Ok(()) => Self(u64::from_le_bytes(buf)),
            Err(_err) => {
                warn!(error = %_err, "OS entropy unavailable, seeding from std RandomState");
                Self(std::hash::RandomState::new().hash_one(0x5eed_u64))
            }
        }
    }

    pub(crate) const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for HashSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Don't expose the seed
        f.write_str("HashSeed(..)")
    }
}

/// Accumulates 32-bit words into a seeded 64-bit hash.
///
/// Each word goes through one multiply-rotate-multiply round; [`finish`]
/// folds in the word count and applies full avalanche.
///
/// [`finish`]: Combiner::finish
#[derive(Debug, Clone)]
pub struct Combiner {
    acc: u64,
    words: u64,
}

impl Combiner {
    const PRIME_1: u64 = 0x9e37_79b1_85eb_ca87;
    const PRIME_2: u64 = 0xc2b2_ae3d_27d4_eb4f;
    const PRIME_5: u64 = 0x27d4_eb2f_1656_67c5;

    /// Starts a new hash under `seed`.
    #[must_use]
    pub const fn new(seed: HashSeed) -> Self {
        Self {
            acc: seed.raw().wrapping_add(Self::PRIME_5),
            words: 0,
        }
    }

    /// Mixes one 32-bit word.
    #[inline]
    pub fn write_u32(&mut self, word: u32) {
        self.acc = self
            .acc
            .wrapping_add(u64::from(word).wrapping_mul(Self::PRIME_2))
            .rotate_left(31)
            .wrapping_mul(Self::PRIME_1);
        self.words = self.words.wrapping_add(1);
    }

    /// Mixes a 64-bit value as its high word followed by its low word.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_u64(&mut self, value: u64) {
        self.write_u32((value >> 32) as u32);
        self.write_u32(value as u32);
    }

    /// Returns the final hash.
    #[must_use]
    pub const fn finish(&self) -> u64 {
        let mut h = self.acc ^ self.words.wrapping_mul(Self::PRIME_1);
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
        h ^= h >> 33;
        h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        h ^= h >> 33;
        h
    }
}
