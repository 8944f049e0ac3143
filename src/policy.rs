//! The security policy object.
//!
//! A [`SecurityPolicy`] says how much the decoder trusts its input. The only
//! hashing decision it makes is whether keys need collision-resistant
//! hashing; when they do, the usable key types shrink to the allow-list in
//! [`KeyTag::ALLOW_LIST`](crate::KeyTag::ALLOW_LIST).
//!
//! Policies are immutable and shared as `Arc<SecurityPolicy>`. Every `with_*`
//! method returns the receiver itself when nothing would change and a fresh
//! policy otherwise:
//!
//! ```
//! use hashguard::SecurityPolicy;
//! use std::sync::Arc;
//!
//! let trusted = SecurityPolicy::trusted();
//! let same = trusted.with_hash_collision_resistant(false);
//! assert!(Arc::ptr_eq(&trusted, &same));
//!
//! let strict = trusted.with_hash_collision_resistant(true);
//! assert!(strict.hash_collision_resistant());
//! assert!(!trusted.hash_collision_resistant());
//! ```

use crate::comparer::{DefaultComparer, SharedComparer};
use crate::depth::{DepthTracker, UNTRUSTED_MAX_OBJECT_GRAPH_DEPTH};
use crate::dispatch::{KeyType, RuntimeDispatcher, table};
use crate::error::{PolicyError, PolicyResult};
use crate::hash::HashSeed;
use crate::tracing_compat::debug;
use crate::value::Value;
use core::fmt;
use std::any::Any;
use std::sync::{Arc, LazyLock, OnceLock};

static TRUSTED: LazyLock<Arc<SecurityPolicy>> =
    LazyLock::new(|| Arc::new(SecurityPolicy::preset(false, usize::MAX)));

static UNTRUSTED: LazyLock<Arc<SecurityPolicy>> = LazyLock::new(|| {
    Arc::new(SecurityPolicy::preset(
        true,
        UNTRUSTED_MAX_OBJECT_GRAPH_DEPTH,
    ))
});

/// Extra state carried by a derived policy.
///
/// The extension is cloned with [`clone_extension`](Self::clone_extension)
/// every time a `with_*` method derives a new policy, so an application's
/// own settings survive every derivation.
pub trait PolicyExtension: fmt::Debug + Send + Sync + 'static {
    /// Returns an owned copy of this extension.
    fn clone_extension(&self) -> Box<dyn PolicyExtension>;

    /// Returns `self` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Decoder security settings.
pub struct SecurityPolicy {
    hash_collision_resistant: bool,
    max_object_graph_depth: usize,
    hash_seed: HashSeed,
    /// Created on first type-erased request; never shared with clones.
    dispatcher: OnceLock<Arc<RuntimeDispatcher>>,
    extension: Option<Box<dyn PolicyExtension>>,
}

impl SecurityPolicy {
    fn preset(hash_collision_resistant: bool, max_object_graph_depth: usize) -> Self {
        Self {
            hash_collision_resistant,
            max_object_graph_depth,
            hash_seed: HashSeed::process(),
            dispatcher: OnceLock::new(),
            extension: None,
        }
    }

    /// Policy for data from a trusted source: default hashing, no depth limit.
    #[must_use]
    pub fn trusted() -> Arc<Self> {
        Arc::clone(&*TRUSTED)
    }

    /// Policy for data from an untrusted source: collision-resistant hashing
    /// and a nesting limit of [`UNTRUSTED_MAX_OBJECT_GRAPH_DEPTH`].
    #[must_use]
    pub fn untrusted() -> Arc<Self> {
        Arc::clone(&*UNTRUSTED)
    }

    /// Creates a policy with the same settings as `template`.
    ///
    /// Fails with [`PolicyError::InvalidArgument`] when no template is given.
    pub fn from_template(template: Option<&Self>) -> PolicyResult<Self> {
        template
            .cloned()
            .ok_or_else(|| PolicyError::invalid_argument("template", "a template policy is required"))
    }

    /// Whether keys must be hashed collision-resistantly.
    #[must_use]
    pub const fn hash_collision_resistant(&self) -> bool {
        self.hash_collision_resistant
    }

    /// Maximum nesting depth a decoder may reach.
    #[must_use]
    pub const fn max_object_graph_depth(&self) -> usize {
        self.max_object_graph_depth
    }

    /// Seed used by this policy's canonical comparers.
    #[must_use]
    pub const fn hash_seed(&self) -> HashSeed {
        self.hash_seed
    }

    /// Returns a policy differing from this one only in the flag.
    #[must_use]
    pub fn with_hash_collision_resistant(self: &Arc<Self>, value: bool) -> Arc<Self> {
        if self.hash_collision_resistant == value {
            return Arc::clone(self);
        }
        self.derive(|policy| policy.hash_collision_resistant = value)
    }

    /// Returns a policy differing from this one only in the depth limit.
    #[must_use]
    pub fn with_max_object_graph_depth(self: &Arc<Self>, depth: usize) -> Arc<Self> {
        if self.max_object_graph_depth == depth {
            return Arc::clone(self);
        }
        self.derive(|policy| policy.max_object_graph_depth = depth)
    }

    /// Returns a policy differing from this one only in the hash seed.
    #[must_use]
    pub fn with_hash_seed(self: &Arc<Self>, seed: HashSeed) -> Arc<Self> {
        if self.hash_seed == seed {
            return Arc::clone(self);
        }
        self.derive(|policy| policy.hash_seed = seed)
    }

    /// Returns a policy carrying `extension`, replacing any existing one.
    #[must_use]
    pub fn with_extension(self: &Arc<Self>, extension: impl PolicyExtension) -> Arc<Self> {
        self.derive(|policy| policy.extension = Some(Box::new(extension)))
    }

    /// Returns the extension if it is an `E`.
    #[must_use]
    pub fn extension<E: PolicyExtension>(&self) -> Option<&E> {
        self.extension
            .as_deref()
            .and_then(|extension| extension.as_any().downcast_ref())
    }

    fn derive(self: &Arc<Self>, apply: impl FnOnce(&mut Self)) -> Arc<Self> {
        let mut next = (**self).clone();
        apply(&mut next);
        debug!(
            hash_collision_resistant = next.hash_collision_resistant,
            max_object_graph_depth = next.max_object_graph_depth,
            "derived security policy"
        );
        Arc::new(next)
    }

    /// Returns the comparer for keys of static type `T`.
    ///
    /// Under a trusted policy this is always the [`DefaultComparer`]. Under a
    /// collision-resistant policy it is the canonical comparer for `T`, the
    /// runtime dispatcher when `T` is [`Value`], and
    /// [`PolicyError::UnsupportedKeyType`] for anything off the allow-list.
    pub fn equality_comparer<T: KeyType>(&self) -> PolicyResult<SharedComparer<T>> {
        if !self.hash_collision_resistant {
            return Ok(Arc::new(DefaultComparer::<T>::new()));
        }
        table::resolve::<T>(self.hash_seed, || -> SharedComparer<Value> {
            self.runtime_dispatcher()
        })
    }

    /// Returns the comparer for type-erased keys.
    ///
    /// Same as `equality_comparer::<Value>()`.
    pub fn erased_equality_comparer(&self) -> PolicyResult<SharedComparer<Value>> {
        self.equality_comparer::<Value>()
    }

    /// Returns this policy's runtime dispatcher, creating it on first use.
    #[must_use]
    pub fn runtime_dispatcher(&self) -> Arc<RuntimeDispatcher> {
        Arc::clone(
            self.dispatcher
                .get_or_init(|| Arc::new(RuntimeDispatcher::new(self.hash_seed))),
        )
    }

    /// Returns a depth tracker bounded by this policy's limit.
    #[must_use]
    pub const fn depth_tracker(&self) -> DepthTracker {
        DepthTracker::new(self.max_object_graph_depth)
    }
}

impl Clone for SecurityPolicy {
    fn clone(&self) -> Self {
        Self {
            hash_collision_resistant: self.hash_collision_resistant,
            max_object_graph_depth: self.max_object_graph_depth,
            hash_seed: self.hash_seed,
            dispatcher: OnceLock::new(),
            extension: self
                .extension
                .as_deref()
                .map(PolicyExtension::clone_extension),
        }
    }
}

impl fmt::Debug for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityPolicy")
            .field("hash_collision_resistant", &self.hash_collision_resistant)
            .field("max_object_graph_depth", &self.max_object_graph_depth)
            .field("hash_seed", &self.hash_seed)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}
