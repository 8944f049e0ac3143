//! Collision-resistant canonical hashing.
//!
//! Hashes are seeded per process ([`HashSeed`]) and computed over canonical
//! 32-bit words ([`Combiner`]), so an attacker cannot precompute a set of
//! colliding keys and equal values always land in the same bucket.
//!
//! This is not a cryptographic hash. It makes bucket placement unpredictable
//! and representation-independent, nothing more.

pub mod canonical;
pub mod combine;

pub use canonical::{
    CANONICAL_NAN_F32, CANONICAL_NAN_F64, CanonicalHash, canonical_f32_bits, canonical_f64_bits,
    canonical_hash_of,
};
pub use combine::{Combiner, HashSeed};
