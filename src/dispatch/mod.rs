//! Key type dispatch.
//!
//! - [`table`]: static resolution from a [`KeyTag`] to a canonical comparer.
//! - [`runtime`]: the cached per-value dispatcher for [`Value`](crate::Value) keys.

pub mod runtime;
pub mod table;

pub use runtime::{DispatchStats, RuntimeDispatcher};
pub use table::{KeyTag, KeyType, KindComparer, resolve, resolve_kind};
