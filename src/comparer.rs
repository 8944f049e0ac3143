//! Equality comparers handed to collection builders.
//!
//! A comparer decides bucket placement (`hash_code`) and key identity
//! (`equals`) for one collection. Builders fetch it once from a
//! [`SecurityPolicy`](crate::SecurityPolicy) and keep it for the lifetime of
//! the collection.

use crate::error::PolicyResult;
use crate::hash::{CanonicalHash, HashSeed, canonical_hash_of};
use core::fmt;
use hashbrown::DefaultHashBuilder;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::sync::Arc;

/// Which strategy a comparer implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparerKind {
    /// Platform default hashing; fast, not collision resistant.
    Default,
    /// Seeded canonical hashing for one statically known type.
    Canonical,
    /// Runtime dispatch over type-erased values.
    RuntimeDispatch,
}

/// Hash and equality strategy for keys of type `T`.
pub trait EqualityComparer<T: ?Sized>: Send + Sync {
    /// Returns `true` if `a` and `b` are the same key.
    fn equals(&self, a: &T, b: &T) -> bool;

    /// Returns the bucket hash of `value`.
    ///
    /// Statically typed comparers never fail. The runtime dispatcher fails
    /// with [`UnsupportedKeyType`](crate::PolicyError::UnsupportedKeyType)
    /// when it meets a value whose runtime type has no canonical hasher.
    fn hash_code(&self, value: &T) -> PolicyResult<u64>;

    /// Returns the strategy this comparer implements.
    fn kind(&self) -> ComparerKind;
}

/// Shared handle to a comparer.
pub type SharedComparer<T> = Arc<dyn EqualityComparer<T>>;

/// Platform default comparer: `Eq` plus hashbrown's default hasher.
pub struct DefaultComparer<T: ?Sized> {
    build: DefaultHashBuilder,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized> DefaultComparer<T> {
    /// Creates a comparer with fresh hasher state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            build: DefaultHashBuilder::default(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Default for DefaultComparer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for DefaultComparer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultComparer")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: Hash + Eq + ?Sized> EqualityComparer<T> for DefaultComparer<T> {
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }

    fn hash_code(&self, value: &T) -> PolicyResult<u64> {
        Ok(self.build.hash_one(value))
    }

    fn kind(&self) -> ComparerKind {
        ComparerKind::Default
    }
}

/// Collision-resistant comparer for one allow-listed type.
pub struct CanonicalComparer<T: ?Sized> {
    seed: HashSeed,
    _marker: PhantomData<fn(&T)>,
}

impl<T: CanonicalHash + ?Sized> CanonicalComparer<T> {
    /// Creates a comparer hashing under `seed`.
    #[must_use]
    pub const fn new(seed: HashSeed) -> Self {
        Self {
            seed,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for CanonicalComparer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalComparer")
            .field("type", &std::any::type_name::<T>())
            .field("seed", &self.seed)
            .finish()
    }
}

impl<T: CanonicalHash + Eq + ?Sized> EqualityComparer<T> for CanonicalComparer<T> {
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }

    fn hash_code(&self, value: &T) -> PolicyResult<u64> {
        Ok(canonical_hash_of(value, self.seed))
    }

    fn kind(&self) -> ComparerKind {
        ComparerKind::Canonical
    }
}
