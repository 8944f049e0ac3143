//! Error types for policy and comparer resolution.
//!
//! Every error here is a configuration or usage error. Nothing is transient,
//! so nothing is retried: errors bubble to the caller unchanged.

use std::borrow::Cow;
use thiserror::Error;

/// The kind of policy error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyErrorKind {
    /// A key type outside the collision-resistant allow-list was requested.
    UnsupportedKeyType,
    /// A required argument was absent or malformed.
    InvalidArgument,
    /// The object graph depth limit was exceeded.
    DepthExceeded,
}

/// An error raised by a [`SecurityPolicy`](crate::SecurityPolicy) or one of
/// the comparers it hands out.
///
/// # Example
///
/// ```
/// use hashguard::{PolicyError, PolicyErrorKind};
///
/// let err = PolicyError::unsupported_type_name("my_crate::Point");
/// assert_eq!(err.kind(), PolicyErrorKind::UnsupportedKeyType);
/// assert_eq!(err.type_name(), Some("my_crate::Point"));
/// assert!(err.to_string().contains("my_crate::Point"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Collision resistance is required and the key type has no canonical
    /// hasher.
    #[error("key type `{type_name}` has no collision-resistant hasher; use a trusted policy or another key type")]
    UnsupportedKeyType {
        /// Name of the offending type.
        type_name: Cow<'static, str>,
    },
    /// A required argument was absent or malformed.
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        /// Name of the argument.
        argument: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// Decoding nested deeper than the policy allows.
    #[error("object graph depth exceeded the maximum of {max}")]
    DepthExceeded {
        /// The configured maximum depth.
        max: usize,
    },
}

impl PolicyError {
    /// Creates an [`UnsupportedKeyType`](Self::UnsupportedKeyType) error for a
    /// named type.
    #[must_use]
    pub fn unsupported_type_name(type_name: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedKeyType {
            type_name: type_name.into(),
        }
    }

    /// Creates an [`InvalidArgument`](Self::InvalidArgument) error.
    #[must_use]
    pub fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> PolicyErrorKind {
        match self {
            Self::UnsupportedKeyType { .. } => PolicyErrorKind::UnsupportedKeyType,
            Self::InvalidArgument { .. } => PolicyErrorKind::InvalidArgument,
            Self::DepthExceeded { .. } => PolicyErrorKind::DepthExceeded,
        }
    }

    /// Returns `true` if this is an unsupported key type error.
    #[must_use]
    pub const fn is_unsupported_key_type(&self) -> bool {
        matches!(self, Self::UnsupportedKeyType { .. })
    }

    /// Returns `true` if this is an invalid argument error.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Name of the rejected key type, if this is an unsupported key type error.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::UnsupportedKeyType { type_name } => Some(type_name.as_ref()),
            _ => None,
        }
    }
}

/// Result type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
