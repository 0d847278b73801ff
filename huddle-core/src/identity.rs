//! Counter-based identity allocation
//!
//! Identities are decimal strings drawn from a wrapping counter. Clients and
//! sessions each own an allocator, so the two namespaces never interfere.

use uuid::Uuid;

use crate::config::{DEFAULT_ID_BASE, DEFAULT_ID_CEILING};

/// Monotonic identity counter that wraps from `ceiling` back to `base`
#[derive(Debug, Clone)]
pub struct IdAllocator {
    base: u64,
    ceiling: u64,
    next: u64,
}

impl IdAllocator {
    /// Create an allocator that hands out `base..=ceiling`
    pub fn new(base: u64, ceiling: u64) -> Self {
        let ceiling = ceiling.max(base);
        Self {
            base,
            ceiling,
            next: base,
        }
    }

    /// Mint the next identity not rejected by `in_use`
    ///
    /// Values still held by a live entry are skipped, so wrapping never hands
    /// out a duplicate. If a full cycle finds nothing free the allocator
    /// falls back to a random UUID rather than failing.
    pub fn next(&mut self, in_use: impl Fn(&str) -> bool) -> String {
        // Saturates when the range spans all of u64
        let span = (self.ceiling - self.base).saturating_add(1);
        for _ in 0..span {
            let candidate = self.advance().to_string();
            if !in_use(&candidate) {
                return candidate;
            }
        }

        tracing::warn!(
            base = self.base,
            ceiling = self.ceiling,
            "identity range exhausted, falling back to uuid"
        );
        Uuid::new_v4().to_string()
    }

    fn advance(&mut self) -> u64 {
        let value = self.next;
        self.next = if value >= self.ceiling {
            self.base
        } else {
            value + 1
        };
        value
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_BASE, DEFAULT_ID_CEILING)
    }
}
