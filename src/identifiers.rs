//! Type-safe identifiers for connection entities.
//!
//! Newtype wrappers keep transport handle IDs and retry tokens from being
//! mixed up. Both are allocated monotonically by the
//! [`ConnectionManager`](crate::transport::ConnectionManager) and never reused
//! within one manager's lifetime.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// HandleId
// ============================================================================

/// Identifies one transport handle (one connection attempt).
///
/// Every notification carries the ID of the handle that produced it, so
/// late notifications from a superseded handle can be recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    /// Creates a handle ID from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the next ID in sequence.
    #[inline]
    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// RetryToken
// ============================================================================

/// Identifies one scheduled retry.
///
/// A timer that fires with a token other than the pending one is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetryToken(u64);

impl RetryToken {
    /// Creates a token from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(token: u64) -> Self {
        Self(token)
    }

    #[inline]
    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

// ============================================================================
// Tests
// ============================================================================
