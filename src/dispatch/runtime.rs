//! Runtime fallback dispatcher for type-erased keys.
//!
//! A [`Value`] key only reveals its type when it is hashed. The dispatcher
//! looks at the runtime kind, resolves that kind's comparer through the
//! static table once, caches it, and forwards to it from then on.

use super::table;
use crate::comparer::{ComparerKind, DefaultComparer, EqualityComparer, SharedComparer};
use crate::error::PolicyResult;
use crate::hash::HashSeed;
use crate::tracing_compat::{trace, warn};
use crate::value::{Value, ValueKind};
use core::fmt;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing dispatcher activity.
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Comparers resolved through the dispatch table.
    pub resolutions: AtomicU64,
    /// Lookups answered from the cache.
    pub cache_hits: AtomicU64,
    /// Opaque values hashed with the default hasher.
    pub opaque_fallbacks: AtomicU64,
}

/// Collision-resistant comparer for [`Value`] keys.
///
/// Hashing rules:
///
/// - [`Value::Nil`] hashes to `0`.
/// - [`Value::Opaque`] carries no type beyond "some value", so no canonical
///   form exists. It is hashed with the default hasher and is the one case
///   where collision resistance is not enforced.
/// - Every other value is hashed by the comparer cached for its
///   [`ValueKind`]; kinds off the allow-list fail with
///   [`UnsupportedKeyType`](crate::PolicyError::UnsupportedKeyType).
///
/// Equality is plain value equality.
pub struct RuntimeDispatcher {
    seed: HashSeed,
    cache: RwLock<HashMap<ValueKind, SharedComparer<Value>>>,
    opaque: DefaultComparer<Value>,
    stats: DispatchStats,
}

impl RuntimeDispatcher {
    /// Creates a dispatcher with an empty cache.
    #[must_use]
    pub fn new(seed: HashSeed) -> Self {
        Self {
            seed,
            cache: RwLock::new(HashMap::new()),
            opaque: DefaultComparer::new(),
            stats: DispatchStats::default(),
        }
    }

    /// Returns the comparer for `kind`, resolving and caching it on first use.
    ///
    /// Concurrent first uses may each resolve; the first insert wins and every
    /// caller gets the cached instance.
    pub fn comparer_for(&self, kind: ValueKind) -> PolicyResult<SharedComparer<Value>> {
        let cached = self.cache.read().get(&kind).cloned();
        if let Some(comparer) = cached {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(comparer);
        }

        let resolved = table::resolve_kind(kind, self.seed).inspect_err(|_err| {
            warn!(%kind, error = %_err, "runtime key type has no collision-resistant hasher");
        })?;
        self.stats.resolutions.fetch_add(1, Ordering::Relaxed);

        let mut cache = self.cache.write();
        let comparer = Arc::clone(cache.entry(kind).or_insert(resolved));
        trace!(%kind, cached = cache.len(), "runtime dispatch cache filled");
        drop(cache);
        Ok(comparer)
    }

    /// Returns the activity counters.
    #[must_use]
    pub const fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Number of runtime kinds resolved so far.
    #[must_use]
    pub fn cached_kinds(&self) -> usize {
        self.cache.read().len()
    }
}

impl EqualityComparer<Value> for RuntimeDispatcher {
    fn equals(&self, a: &Value, b: &Value) -> bool {
        a == b
    }

    fn hash_code(&self, value: &Value) -> PolicyResult<u64> {
        match value.kind() {
            None => Ok(0),
            Some(ValueKind::Opaque) => {
                self.stats.opaque_fallbacks.fetch_add(1, Ordering::Relaxed);
                self.opaque.hash_code(value)
            }
            Some(kind) => self.comparer_for(kind)?.hash_code(value),
        }
    }

    fn kind(&self) -> ComparerKind {
        ComparerKind::RuntimeDispatch
    }
}

impl fmt::Debug for RuntimeDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeDispatcher")
            .field("cached_kinds", &self.cached_kinds())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
