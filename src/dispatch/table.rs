//! Static type dispatch table.
//!
//! Every allow-listed key type carries a [`KeyTag`]; resolution is a single
//! `match` over that tag. There is no fallback arm: a type without an entry
//! fails with [`PolicyError::UnsupportedKeyType`] instead of silently getting a
//! weak hash.

use crate::comparer::{CanonicalComparer, ComparerKind, EqualityComparer, SharedComparer};
use crate::error::{PolicyError, PolicyResult};
use crate::hash::{CanonicalHash, HashSeed, canonical_hash_of};
use crate::tracing_compat::debug;
use crate::value::{Float32, Float64, Timestamp, TimestampOffset, Value, ValueKind};
use std::any::Any;
use std::borrow::Cow;
use std::hash::Hash;
use std::sync::Arc;
use uuid::Uuid;

/// Dispatch tag of a key type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTag {
    /// `bool`.
    Bool,
    /// `char`.
    Char,
    /// `i8`.
    I8,
    /// `u8`.
    U8,
    /// `i16`.
    I16,
    /// `u16`.
    U16,
    /// `i32`.
    I32,
    /// `u32`.
    U32,
    /// `i64`.
    I64,
    /// `u64`.
    U64,
    /// [`Float32`].
    F32,
    /// [`Float64`].
    F64,
    /// `String`.
    Str,
    /// [`Uuid`].
    Uuid,
    /// [`Timestamp`].
    Timestamp,
    /// [`TimestampOffset`].
    TimestampOffset,
    /// [`Value`]: resolved per value at hash time.
    Value,
    /// Not on the allow-list.
    Unlisted,
}

impl KeyTag {
    /// Every tag that resolves under a collision-resistant policy.
    pub const ALLOW_LIST: [Self; 17] = [
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Str,
        Self::Uuid,
        Self::Timestamp,
        Self::TimestampOffset,
        Self::Value,
    ];

    /// Returns `true` if this tag is on the allow-list.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        !matches!(self, Self::Unlisted)
    }

    /// Maps a runtime value kind to its tag. Kinds a decoder can produce but
    /// that have no canonical hasher map to [`KeyTag::Unlisted`].
    #[must_use]
    pub const fn of_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Self::Bool,
            ValueKind::Char => Self::Char,
            ValueKind::I8 => Self::I8,
            ValueKind::U8 => Self::U8,
            ValueKind::I16 => Self::I16,
            ValueKind::U16 => Self::U16,
            ValueKind::I32 => Self::I32,
            ValueKind::U32 => Self::U32,
            ValueKind::I64 => Self::I64,
            ValueKind::U64 => Self::U64,
            ValueKind::F32 => Self::F32,
            ValueKind::F64 => Self::F64,
            ValueKind::Str => Self::Str,
            ValueKind::Uuid => Self::Uuid,
            ValueKind::Timestamp => Self::Timestamp,
            ValueKind::TimestampOffset => Self::TimestampOffset,
            ValueKind::Binary
            | ValueKind::Array
            | ValueKind::Map
            | ValueKind::Ext(_)
            | ValueKind::Opaque => Self::Unlisted,
        }
    }
}

/// A type usable as a collection key.
///
/// The crate implements this for every allow-listed type. Application types
/// implement it with the defaults, which makes them usable under a trusted
/// policy and rejected under an untrusted one:
///
/// ```
/// use hashguard::{KeyType, SecurityPolicy};
///
/// #[derive(PartialEq, Eq, Hash)]
/// struct Point { x: i32, y: i32 }
///
/// impl KeyType for Point {}
///
/// assert!(SecurityPolicy::trusted().equality_comparer::<Point>().is_ok());
/// let err = SecurityPolicy::untrusted()
///     .equality_comparer::<Point>()
///     .err()
///     .unwrap();
/// assert!(err.type_name().unwrap().ends_with("Point"));
/// ```
pub trait KeyType: Hash + Eq + Send + Sync + 'static {
    /// Dispatch tag. Claiming the tag of a different type does not grant a
    /// canonical hasher; resolution still fails.
    const TAG: KeyTag = KeyTag::Unlisted;

    /// Name reported in [`PolicyError::UnsupportedKeyType`].
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

macro_rules! impl_key_type {
    ($($ty:ty => $tag:ident, $name:literal);* $(;)?) => {
        $(
            impl KeyType for $ty {
                const TAG: KeyTag = KeyTag::$tag;

                fn type_name() -> Cow<'static, str> {
                    Cow::Borrowed($name)
                }
            }
        )*
    };
}

impl_key_type! {
    bool => Bool, "bool";
    char => Char, "char";
    i8 => I8, "i8";
    u8 => U8, "u8";
    i16 => I16, "i16";
    u16 => U16, "u16";
    i32 => I32, "i32";
    u32 => U32, "u32";
    i64 => I64, "i64";
    u64 => U64, "u64";
    Float32 => F32, "f32";
    Float64 => F64, "f64";
    String => Str, "string";
    Uuid => Uuid, "uuid";
    Timestamp => Timestamp, "timestamp";
    TimestampOffset => TimestampOffset, "timestamp-offset";
    Value => Value, "value";
}

fn canonical<C: KeyType + CanonicalHash>(seed: HashSeed) -> Box<dyn Any> {
    let comparer: SharedComparer<C> = Arc::new(CanonicalComparer::<C>::new(seed));
    Box::new(comparer)
}

/// Resolves the collision-resistant comparer for `T`.
///
/// `dispatcher` supplies the runtime dispatcher when `T` is [`Value`]; it is
/// not called otherwise.
pub fn resolve<T: KeyType>(
    seed: HashSeed,
    dispatcher: impl FnOnce() -> SharedComparer<Value>,
) -> PolicyResult<SharedComparer<T>> {
    let erased = match T::TAG {
        KeyTag::Bool => canonical::<bool>(seed),
        KeyTag::Char => canonical::<char>(seed),
        KeyTag::I8 => canonical::<i8>(seed),
        KeyTag::U8 => canonical::<u8>(seed),
        KeyTag::I16 => canonical::<i16>(seed),
        KeyTag::U16 => canonical::<u16>(seed),
        KeyTag::I32 => canonical::<i32>(seed),
        KeyTag::U32 => canonical::<u32>(seed),
        KeyTag::I64 => canonical::<i64>(seed),
        KeyTag::U64 => canonical::<u64>(seed),
        KeyTag::F32 => canonical::<Float32>(seed),
        KeyTag::F64 => canonical::<Float64>(seed),
        KeyTag::Str => canonical::<String>(seed),
        KeyTag::Uuid => canonical::<Uuid>(seed),
        KeyTag::Timestamp => canonical::<Timestamp>(seed),
        KeyTag::TimestampOffset => canonical::<TimestampOffset>(seed),
        KeyTag::Value => Box::new(dispatcher()),
        KeyTag::Unlisted => return Err(PolicyError::unsupported_type_name(T::type_name())),
    };
    let type_name = T::type_name();
    // The downcast only fails for a type claiming another type's tag.
    match erased.downcast::<SharedComparer<T>>() {
        Ok(comparer) => {
            debug!(key_type = %type_name, tag = ?T::TAG, "resolved canonical comparer");
            Ok(*comparer)
        }
        Err(_) => Err(PolicyError::unsupported_type_name(type_name)),
    }
}

/// Collision-resistant comparer for every [`Value`] of one runtime kind.
#[derive(Debug)]
pub struct KindComparer {
    kind: ValueKind,
    seed: HashSeed,
}

impl KindComparer {
    /// Returns the kind this comparer was resolved for.
    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        self.kind
    }
}

impl EqualityComparer<Value> for KindComparer {
    fn equals(&self, a: &Value, b: &Value) -> bool {
        a == b
    }

    fn hash_code(&self, value: &Value) -> PolicyResult<u64> {
        debug_assert_eq!(value.kind(), Some(self.kind));
        canonical_value_hash(value, self.seed)
    }

    fn kind(&self) -> ComparerKind {
        ComparerKind::Canonical
    }
}

/// Resolves the comparer for values of runtime kind `kind`.
pub fn resolve_kind(kind: ValueKind, seed: HashSeed) -> PolicyResult<SharedComparer<Value>> {
    if KeyTag::of_kind(kind).is_allowed() {
        Ok(Arc::new(KindComparer { kind, seed }))
    } else {
        Err(PolicyError::unsupported_type_name(kind.type_name()))
    }
}

fn canonical_value_hash(value: &Value, seed: HashSeed) -> PolicyResult<u64> {
    let hash = match value {
        Value::Bool(v) => canonical_hash_of(v, seed),
        Value::Char(v) => canonical_hash_of(v, seed),
        Value::I8(v) => canonical_hash_of(v, seed),
        Value::U8(v) => canonical_hash_of(v, seed),
        Value::I16(v) => canonical_hash_of(v, seed),
        Value::U16(v) => canonical_hash_of(v, seed),
        Value::I32(v) => canonical_hash_of(v, seed),
        Value::U32(v) => canonical_hash_of(v, seed),
        Value::I64(v) => canonical_hash_of(v, seed),
        Value::U64(v) => canonical_hash_of(v, seed),
        Value::F32(v) => canonical_hash_of(v, seed),
        Value::F64(v) => canonical_hash_of(v, seed),
        Value::Str(v) => canonical_hash_of(v.as_str(), seed),
        Value::Uuid(v) => canonical_hash_of(v, seed),
        Value::Timestamp(v) => canonical_hash_of(v, seed),
        Value::TimestampOffset(v) => canonical_hash_of(v, seed),
        Value::Nil => 0,
        other => {
            let name = other.kind().map_or(Cow::Borrowed("nil"), ValueKind::type_name);
            return Err(PolicyError::unsupported_type_name(name));
        }
    };
    Ok(hash)
}
