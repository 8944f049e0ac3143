//! Process-wide default policy.
//!
//! Nothing in this crate reads the active policy on its own; callers thread a
//! policy explicitly and may use [`active_policy`] as the default value. It
//! starts as [`SecurityPolicy::trusted`] and the last call to
//! [`set_active_policy`] wins. Code that needs stable behaviour across a
//! whole decode should read it once and keep the `Arc`.

use crate::policy::SecurityPolicy;
use crate::tracing_compat::info;
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};

static ACTIVE: LazyLock<RwLock<Arc<SecurityPolicy>>> =
    LazyLock::new(|| RwLock::new(SecurityPolicy::trusted()));

/// Returns the current process-wide policy.
#[must_use]
pub fn active_policy() -> Arc<SecurityPolicy> {
    Arc::clone(&*ACTIVE.read())
}

/// Replaces the process-wide policy and returns the previous one.
pub fn set_active_policy(policy: Arc<SecurityPolicy>) -> Arc<SecurityPolicy> {
    info!(
        hash_collision_resistant = policy.hash_collision_resistant(),
        max_object_graph_depth = policy.max_object_graph_depth(),
        "active security policy replaced"
    );
    std::mem::replace(&mut *ACTIVE.write(), policy)
}
