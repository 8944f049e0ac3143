//! Hash collections driven by a policy comparer.
//!
//! These are the reference consumers of [`SecurityPolicy::equality_comparer`]:
//! a decoder materialising a map or set asks the policy for a comparer once
//! and uses it for every key of that collection.
//!
//! Each entry keeps the hash it was inserted with, so growing the table never
//! calls back into the comparer.
//!
//! ```
//! use hashguard::{KeyedSet, SecurityPolicy, Value};
//!
//! let policy = SecurityPolicy::untrusted();
//! let keys = [Value::from(1i32), Value::from(1.0f64), Value::from("x")];
//! let set = KeyedSet::try_from_keys(&policy, keys).unwrap();
//! assert_eq!(set.len(), 3);
//! ```

use crate::comparer::SharedComparer;
use crate::dispatch::KeyType;
use crate::error::PolicyResult;
use crate::policy::SecurityPolicy;
use core::fmt;
use hashbrown::hash_table::{Entry, HashTable};

struct Slot<K, V> {
    hash: u64,
    key: K,
    value: V,
}

/// A hash map whose hashing and key equality come from a comparer.
pub struct KeyedMap<K, V> {
    comparer: SharedComparer<K>,
    table: HashTable<Slot<K, V>>,
}

impl<K: KeyType, V> KeyedMap<K, V> {
    /// Creates an empty map using `policy`'s comparer for `K`.
    pub fn new(policy: &SecurityPolicy) -> PolicyResult<Self> {
        Ok(Self::with_comparer(policy.equality_comparer::<K>()?))
    }

    /// Builds a map from decoded entries. Later duplicates overwrite earlier
    /// ones.
    pub fn try_from_entries(
        policy: &SecurityPolicy,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> PolicyResult<Self> {
        let mut map = Self::new(policy)?;
        for (key, value) in entries {
            map.insert(key, value)?;
        }
        Ok(map)
    }
}

impl<K, V> KeyedMap<K, V> {
    /// Creates an empty map using `comparer`.
    #[must_use]
    pub fn with_comparer(comparer: SharedComparer<K>) -> Self {
        Self {
            comparer,
            table: HashTable::new(),
        }
    }

    /// Returns the comparer this map was built with.
    #[must_use]
    pub fn comparer(&self) -> &SharedComparer<K> {
        &self.comparer
    }

    /// Inserts `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> PolicyResult<Option<V>> {
        let hash = self.comparer.hash_code(&key)?;
        let comparer = &self.comparer;
        let entry = self.table.entry(
            hash,
            |slot| slot.hash == hash && comparer.equals(&slot.key, &key),
            |slot| slot.hash,
        );
        match entry {
            Entry::Occupied(mut occupied) => {
                Ok(Some(std::mem::replace(&mut occupied.get_mut().value, value)))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Slot { hash, key, value });
                Ok(None)
            }
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &K) -> PolicyResult<Option<&V>> {
        let hash = self.comparer.hash_code(key)?;
        Ok(self
            .table
            .find(hash, |slot| {
                slot.hash == hash && self.comparer.equals(&slot.key, key)
            })
            .map(|slot| &slot.value))
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &K) -> PolicyResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> PolicyResult<Option<V>> {
        let hash = self.comparer.hash_code(key)?;
        let comparer = &self.comparer;
        let found = self.table.find_entry(hash, |slot| {
            slot.hash == hash && comparer.equals(&slot.key, key)
        });
        Ok(found.ok().map(|occupied| occupied.remove().0.value))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterates over entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.table.iter().map(|slot| (&slot.key, &slot.value))
    }

    /// Iterates over keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.table.iter().map(|slot| &slot.key)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for KeyedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A hash set whose hashing and key equality come from a comparer.
pub struct KeyedSet<K> {
    map: KeyedMap<K, ()>,
}

impl<K: KeyType> KeyedSet<K> {
    /// Creates an empty set using `policy`'s comparer for `K`.
    pub fn new(policy: &SecurityPolicy) -> PolicyResult<Self> {
        KeyedMap::new(policy).map(|map| Self { map })
    }

    /// Builds a set from decoded keys.
    pub fn try_from_keys(
        policy: &SecurityPolicy,
        keys: impl IntoIterator<Item = K>,
    ) -> PolicyResult<Self> {
        let mut set = Self::new(policy)?;
        for key in keys {
            set.insert(key)?;
        }
        Ok(set)
    }
}

impl<K> KeyedSet<K> {
    /// Creates an empty set using `comparer`.
    #[must_use]
    pub fn with_comparer(comparer: SharedComparer<K>) -> Self {
        Self {
            map: KeyedMap::with_comparer(comparer),
        }
    }

    /// Returns the comparer this set was built with.
    #[must_use]
    pub fn comparer(&self) -> &SharedComparer<K> {
        self.map.comparer()
    }

    /// Adds `key`; returns `false` if an equal key was already present.
    pub fn insert(&mut self, key: K) -> PolicyResult<bool> {
        Ok(self.map.insert(key, ())?.is_none())
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &K) -> PolicyResult<bool> {
        self.map.contains_key(key)
    }

    /// Removes `key`; returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> PolicyResult<bool> {
        Ok(self.map.remove(key)?.is_some())
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over keys in table order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }
}

impl<K: fmt::Debug> fmt::Debug for KeyedSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
