//! Optional tracing integration.
//!
//! With the `tracing-integration` feature the macros re-export
//! [`tracing`](https://docs.rs/tracing). Without it they expand to nothing, so
//! call sites carry no cost and need no `cfg` attributes.
//!
//! The no-op macros are defined under `*_noop` names and re-exported by path:
//! a bare `warn` would be ambiguous with the built-in `#[warn]` attribute.

#[cfg(feature = "tracing-integration")]
pub(crate) use tracing::{debug, info, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
macro_rules! debug_noop {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "tracing-integration"))]
macro_rules! info_noop {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "tracing-integration"))]
macro_rules! trace_noop {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "tracing-integration"))]
macro_rules! warn_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing-integration"))]
pub(crate) use {debug_noop as debug, info_noop as info, trace_noop as trace, warn_noop as warn};
