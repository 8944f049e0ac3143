//! Canonical hashers for the allow-listed key types.
//!
//! Equal values must hash equally even when their bit patterns differ, so
//! floats are canonicalised before their bits are taken. Values wider than
//! 32 bits are fed to the combiner one 32-bit word at a time so no half of
//! the value is dropped.

use super::combine::Combiner;
use crate::value::{Float32, Float64, Timestamp, TimestampOffset};
use uuid::Uuid;

/// Bit pattern every 32-bit NaN hashes as.
pub const CANONICAL_NAN_F32: u32 = 0x7fc0_0000;

/// Bit pattern every 64-bit NaN hashes as.
pub const CANONICAL_NAN_F64: u64 = 0x7ff8_0000_0000_0000;

/// Returns the hashing bits of `value`: both zeros map to `+0.0` and every
/// NaN maps to [`CANONICAL_NAN_F32`].
#[inline]
#[must_use]
pub fn canonical_f32_bits(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        CANONICAL_NAN_F32
    } else {
        value.to_bits()
    }
}

/// Returns the hashing bits of `value`: both zeros map to `+0.0` and every
/// NaN maps to [`CANONICAL_NAN_F64`].
#[inline]
#[must_use]
pub fn canonical_f64_bits(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        CANONICAL_NAN_F64
    } else {
        value.to_bits()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A type with a collision-resistant, representation-canonical hash.
///
/// This trait is sealed: the set of implementors is the allow-list.
pub trait CanonicalHash: sealed::Sealed {
    /// Feeds the canonical form of `self` into `state`.
    fn canonical_hash(&self, state: &mut Combiner);
}

// Values of 32 bits or fewer fit in a single word. Signed values are
// sign-extended so that the word is a function of the value alone.
macro_rules! impl_single_word {
    ($($ty:ty => |$v:ident| $word:expr),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl CanonicalHash for $ty {
                #[inline]
                #[allow(clippy::cast_sign_loss)]
                fn canonical_hash(&self, state: &mut Combiner) {
                    let $v = *self;
                    state.write_u32($word);
                }
            }
        )*
    };
}

impl_single_word! {
    bool => |v| u32::from(v),
    char => |v| u32::from(v),
    i8 => |v| i32::from(v) as u32,
    u8 => |v| u32::from(v),
    i16 => |v| i32::from(v) as u32,
    u16 => |v| u32::from(v),
    i32 => |v| v as u32,
    u32 => |v| v,
    Float32 => |v| canonical_f32_bits(v.0),
}

impl sealed::Sealed for i64 {}

impl CanonicalHash for i64 {
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn canonical_hash(&self, state: &mut Combiner) {
        state.write_u64(*self as u64);
    }
}

impl sealed::Sealed for u64 {}

impl CanonicalHash for u64 {
    #[inline]
    fn canonical_hash(&self, state: &mut Combiner) {
        state.write_u64(*self);
    }
}

impl sealed::Sealed for Float64 {}

impl CanonicalHash for Float64 {
    #[inline]
    fn canonical_hash(&self, state: &mut Combiner) {
        state.write_u64(canonical_f64_bits(self.0));
    }
}

impl sealed::Sealed for str {}

impl CanonicalHash for str {
    fn canonical_hash(&self, state: &mut Combiner) {
        for ch in self.chars() {
            state.write_u32(u32::from(ch));
        }
    }
}

impl sealed::Sealed for String {}

impl CanonicalHash for String {
    #[inline]
    fn canonical_hash(&self, state: &mut Combiner) {
        self.as_str().canonical_hash(state);
    }
}

impl sealed::Sealed for Uuid {}

impl CanonicalHash for Uuid {
    fn canonical_hash(&self, state: &mut Combiner) {
        let raw = self.as_u128();
        state.write_u64((raw >> 64) as u64);
        state.write_u64(raw as u64);
    }
}

impl sealed::Sealed for Timestamp {}

impl CanonicalHash for Timestamp {
    #[allow(clippy::cast_sign_loss)]
    fn canonical_hash(&self, state: &mut Combiner) {
        state.write_u64(self.ticks() as u64);
        state.write_u32(u32::from(self.kind() as u8));
    }
}

impl sealed::Sealed for TimestampOffset {}

impl CanonicalHash for TimestampOffset {
    #[allow(clippy::cast_sign_loss)]
    fn canonical_hash(&self, state: &mut Combiner) {
        // The offset is folded into the UTC ticks and hashed no further.
        state.write_u64(self.utc_ticks() as u64);
    }
}

/// Hashes `value` under `seed` with its canonical hasher.
#[must_use]
pub fn canonical_hash_of<T: CanonicalHash + ?Sized>(value: &T, seed: super::HashSeed) -> u64 {
    let mut state = Combiner::new(seed);
    value.canonical_hash(&mut state);
    state.finish()
}
