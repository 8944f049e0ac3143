//! Hashguard: hash-flooding resistant key comparison for decoders of untrusted data.
//!
//! # Overview
//!
//! A decoder that builds hash maps or sets from attacker-controlled keys can
//! be driven into worst-case bucket collisions if the key hash is
//! predictable. Hashguard supplies the comparers such a decoder uses: a
//! [`SecurityPolicy`] decides whether keys need collision-resistant hashing,
//! and when they do it hands out seeded, canonicalising comparers for a
//! closed allow-list of key types and refuses everything else.
//!
//! # Core Guarantees
//!
//! - **Closed allow-list**: under a collision-resistant policy a key type
//!   without a canonical hasher fails with
//!   [`PolicyError::UnsupportedKeyType`]; it never silently falls back to a
//!   weak hash
//! - **Hash/equality consistency**: `+0.0`/`-0.0` and every NaN payload hash
//!   alike, 64-bit values contribute both halves
//! - **Per-process unpredictability**: canonical hashes are keyed by a seed
//!   drawn from OS entropy
//! - **Immutable policies**: every setter returns a new `Arc<SecurityPolicy>`
//!   (or the receiver when nothing changes); runtime dispatch caches are never
//!   shared between policies
//!
//! # Module Structure
//!
//! - [`policy`]: The [`SecurityPolicy`] object and its presets
//! - [`dispatch`]: Static type dispatch table and the runtime dispatcher for [`Value`] keys
//! - [`comparer`]: The [`EqualityComparer`] trait and its default and canonical implementations
//! - [`hash`]: Seeded word combiner and per-type canonical hashing
//! - [`value`]: The decoder's type-erased [`Value`] and key newtypes
//! - [`collections`]: Hash map and set built on a policy comparer
//! - [`depth`]: Object graph depth limiting
//! - [`config`]: Declarative and environment-driven policy configuration
//! - [`active`]: Process-wide default policy
//! - [`error`](mod@error): Error types
//!
//! # Example
//!
//! ```
//! use hashguard::{KeyType, KeyedSet, SecurityPolicy};
//!
//! #[derive(Debug, PartialEq, Eq, Hash)]
//! struct Point(i32, i32);
//! impl KeyType for Point {}
//!
//! let untrusted = SecurityPolicy::untrusted();
//! let err = KeyedSet::<Point>::new(&untrusted).unwrap_err();
//! assert!(err.is_unsupported_key_type());
//!
//! let mut names = KeyedSet::<String>::new(&untrusted).unwrap();
//! assert!(names.insert("alice".to_owned()).unwrap());
//! assert!(!names.insert("alice".to_owned()).unwrap());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod tracing_compat;

pub mod active;
pub mod collections;
pub mod comparer;
pub mod config;
pub mod depth;
pub mod dispatch;
pub mod error;
pub mod hash;
pub mod policy;
pub mod value;

pub use active::{active_policy, set_active_policy};
pub use collections::{KeyedMap, KeyedSet};
pub use comparer::{
    CanonicalComparer, ComparerKind, DefaultComparer, EqualityComparer, SharedComparer,
};
pub use config::{PolicyConfig, PolicyPreset};
pub use depth::{DepthTracker, UNTRUSTED_MAX_OBJECT_GRAPH_DEPTH};
pub use dispatch::{DispatchStats, KeyTag, KeyType, RuntimeDispatcher};
pub use error::{PolicyError, PolicyErrorKind, PolicyResult};
pub use hash::{CanonicalHash, Combiner, HashSeed};
pub use policy::{PolicyExtension, SecurityPolicy};
pub use value::{
    ExtValue, Float32, Float64, OpaqueValue, TimeKind, Timestamp, TimestampOffset, Value,
    ValueKind,
};
