//! Object graph depth limiting.
//!
//! A decoder calls [`DepthTracker::enter`] before descending into a nested
//! array, map or object and [`DepthTracker::leave`] on the way out. Untrusted
//! input nested past the policy's limit fails instead of exhausting the
//! stack.

use crate::error::{PolicyError, PolicyResult};

/// Maximum nesting depth of the untrusted preset.
pub const UNTRUSTED_MAX_OBJECT_GRAPH_DEPTH: usize = 500;

/// Tracks the nesting depth of one decode operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthTracker {
    depth: usize,
    max: usize,
}

impl DepthTracker {
    /// Creates a tracker at depth zero.
    #[must_use]
    pub const fn new(max: usize) -> Self {
        Self { depth: 0, max }
    }

    /// Descends one level.
    ///
    /// Fails with [`PolicyError::DepthExceeded`] if the new depth would exceed
    /// the maximum; the depth is left unchanged in that case.
    pub fn enter(&mut self) -> PolicyResult<()> {
        if self.depth >= self.max {
            return Err(PolicyError::DepthExceeded { max: self.max });
        }
        self.depth += 1;
        Ok(())
    }

    /// Ascends one level.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Configured maximum.
    #[must_use]
    pub const fn max(&self) -> usize {
        self.max
    }
}
