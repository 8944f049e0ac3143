//! The "any value" representation produced by a decoder.
//!
//! [`Value`] is what a weakly-typed key looks like once decoded: the decoder
//! knows the wire type of each key but the consumer asked for no static type.
//! The allow-listed primitives have canonical hashers; the remaining variants
//! exist because a decoder can produce them, and they are rejected when
//! collision resistance is required.

use core::fmt;
use std::any::Any;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Number of 100-nanosecond ticks in one minute.
pub const TICKS_PER_MINUTE: i64 = 600_000_000;

/// A 32-bit float usable as a hash key.
///
/// Equality treats `+0.0` and `-0.0` as equal and every NaN as equal to every
/// other NaN, so the type is a lawful `Eq`. `Hash` is consistent with that.
#[derive(Clone, Copy, Default)]
#[repr(transparent)]
pub struct Float32(pub f32);

/// A 64-bit float usable as a hash key.
///
/// Same equality rules as [`Float32`].
#[derive(Clone, Copy, Default)]
#[repr(transparent)]
pub struct Float64(pub f64);

impl PartialEq for Float32 {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 || (self.0.is_nan() && other.0.is_nan())
    }
}

impl Eq for Float32 {}

impl Hash for Float32 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(crate::hash::canonical_f32_bits(self.0));
    }
}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 || (self.0.is_nan() && other.0.is_nan())
    }
}

impl Eq for Float64 {}

impl Hash for Float64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(crate::hash::canonical_f64_bits(self.0));
    }
}

impl fmt::Debug for Float32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}f32", self.0)
    }
}

impl fmt::Debug for Float64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}f64", self.0)
    }
}

impl From<f32> for Float32 {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

impl From<f64> for Float64 {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// How a [`Timestamp`] relates to UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TimeKind {
    /// No time zone information.
    #[default]
    Unspecified = 0,
    /// Coordinated universal time.
    Utc = 1,
    /// The producer's local time.
    Local = 2,
}

/// An instant in time, counted in 100-nanosecond ticks.
///
/// Two timestamps are equal only when both the ticks and the kind match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    ticks: i64,
    kind: TimeKind,
}

impl Timestamp {
    /// Creates a timestamp.
    #[must_use]
    pub const fn new(ticks: i64, kind: TimeKind) -> Self {
        Self { ticks, kind }
    }

    /// Creates a UTC timestamp.
    #[must_use]
    pub const fn utc(ticks: i64) -> Self {
        Self::new(ticks, TimeKind::Utc)
    }

    /// Returns the tick count.
    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.ticks
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(self) -> TimeKind {
        self.kind
    }
}

/// An instant with a UTC offset.
///
/// `ticks` are local to the offset. Equality compares the UTC-normalised tick
/// count only, so the same instant written with different offsets is equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampOffset {
    ticks: i64,
    offset_minutes: i16,
}

impl TimestampOffset {
    /// Creates an instant from local ticks and an offset in minutes.
    #[must_use]
    pub const fn new(ticks: i64, offset_minutes: i16) -> Self {
        Self {
            ticks,
            offset_minutes,
        }
    }

    /// Returns the local tick count.
    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.ticks
    }

    /// Returns the offset from UTC in minutes.
    #[must_use]
    pub const fn offset_minutes(self) -> i16 {
        self.offset_minutes
    }

    /// Returns the tick count normalised to UTC.
    #[must_use]
    pub const fn utc_ticks(self) -> i64 {
        self.ticks
            .wrapping_sub((self.offset_minutes as i64).wrapping_mul(TICKS_PER_MINUTE))
    }
}

impl PartialEq for TimestampOffset {
    fn eq(&self, other: &Self) -> bool {
        self.utc_ticks() == other.utc_ticks()
    }
}

impl Eq for TimestampOffset {}

impl Hash for TimestampOffset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.utc_ticks().hash(state);
    }
}

/// An application-defined extension value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtValue {
    type_code: i8,
    data: Vec<u8>,
}

impl ExtValue {
    /// Creates an extension value.
    #[must_use]
    pub fn new(type_code: i8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            type_code,
            data: data.into(),
        }
    }

    /// Returns the extension type code.
    #[must_use]
    pub const fn type_code(&self) -> i8 {
        self.type_code
    }

    /// Returns the payload.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A boxed value carrying no type information beyond "some value".
///
/// Equality is identity: two handles are equal only if they share the same
/// allocation.
#[derive(Clone)]
pub struct OpaqueValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    /// Boxes a value.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Attempts to view the boxed value as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner).cast::<()>() as usize
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for OpaqueValue {}

impl Hash for OpaqueValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.addr());
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueValue({:#x})", self.addr())
    }
}

/// A decoded value whose static type is "any value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Value {
    /// The absent value.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Unicode scalar value.
    Char(char),
    /// 8-bit signed integer.
    I8(i8),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit signed integer.
    I16(i16),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit signed integer.
    I32(i32),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit signed integer.
    I64(i64),
    /// 64-bit unsigned integer.
    U64(u64),
    /// 32-bit float.
    F32(Float32),
    /// 64-bit float.
    F64(Float64),
    /// Text.
    Str(String),
    /// 128-bit unique identifier.
    Uuid(Uuid),
    /// Instant in time.
    Timestamp(Timestamp),
    /// Instant with a UTC offset.
    TimestampOffset(TimestampOffset),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Key/value pairs in wire order.
    Map(Vec<(Value, Value)>),
    /// Application-defined extension.
    Ext(ExtValue),
    /// A boxed value with no more specific type.
    Opaque(OpaqueValue),
}

impl Value {
    /// Returns the runtime type of this value, or `None` for [`Value::Nil`].
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        let kind = match self {
            Self::Nil => return None,
            Self::Bool(_) => ValueKind::Bool,
            Self::Char(_) => ValueKind::Char,
            Self::I8(_) => ValueKind::I8,
            Self::U8(_) => ValueKind::U8,
            Self::I16(_) => ValueKind::I16,
            Self::U16(_) => ValueKind::U16,
            Self::I32(_) => ValueKind::I32,
            Self::U32(_) => ValueKind::U32,
            Self::I64(_) => ValueKind::I64,
            Self::U64(_) => ValueKind::U64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Str(_) => ValueKind::Str,
            Self::Uuid(_) => ValueKind::Uuid,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::TimestampOffset(_) => ValueKind::TimestampOffset,
            Self::Binary(_) => ValueKind::Binary,
            Self::Array(_) => ValueKind::Array,
            Self::Map(_) => ValueKind::Map,
            Self::Ext(ext) => ValueKind::Ext(ext.type_code),
            Self::Opaque(_) => ValueKind::Opaque,
        };
        Some(kind)
    }

    /// Returns `true` for [`Value::Nil`].
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    char => Char,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Float32 => F32,
    Float64 => F64,
    String => Str,
    &str => Str,
    Uuid => Uuid,
    Timestamp => Timestamp,
    TimestampOffset => TimestampOffset,
    ExtValue => Ext,
    OpaqueValue => Opaque,
}

/// Runtime type descriptor of a non-nil [`Value`].
///
/// This is the key of the runtime dispatch cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    /// [`Value::Bool`].
    Bool,
    /// [`Value::Char`].
    Char,
    /// [`Value::I8`].
    I8,
    /// [`Value::U8`].
    U8,
    /// [`Value::I16`].
    I16,
    /// [`Value::U16`].
    U16,
    /// [`Value::I32`].
    I32,
    /// [`Value::U32`].
    U32,
    /// [`Value::I64`].
    I64,
    /// [`Value::U64`].
    U64,
    /// [`Value::F32`].
    F32,
    /// [`Value::F64`].
    F64,
    /// [`Value::Str`].
    Str,
    /// [`Value::Uuid`].
    Uuid,
    /// [`Value::Timestamp`].
    Timestamp,
    /// [`Value::TimestampOffset`].
    TimestampOffset,
    /// [`Value::Binary`].
    Binary,
    /// [`Value::Array`].
    Array,
    /// [`Value::Map`].
    Map,
    /// [`Value::Ext`] with its type code.
    Ext(i8),
    /// [`Value::Opaque`].
    Opaque,
}

impl ValueKind {
    /// Returns the type name used in diagnostics.
    #[must_use]
    pub fn type_name(self) -> std::borrow::Cow<'static, str> {
        let name = match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "string",
            Self::Uuid => "uuid",
            Self::Timestamp => "timestamp",
            Self::TimestampOffset => "timestamp-offset",
            Self::Binary => "binary",
            Self::Array => "array",
            Self::Map => "map",
            Self::Ext(code) => return format!("ext({code})").into(),
            Self::Opaque => "opaque",
        };
        name.into()
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}
