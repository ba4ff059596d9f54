//! Fragment identifier allocation.

use std::collections::HashSet;

/// Default prefix for allocated ids.
pub const DEFAULT_ID_PREFIX: &str = "genid";

/// Allocates fragment ids for one conversion run.
///
/// Ids are never shared between runs: each run owns its allocator and hands
/// it to the segmenter by `&mut`. Ids already present in the source must be
/// registered with [`IdAllocator::reserve`] first so allocation skips them.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    prefix: String,
    counter: u64,
    sequence: u64,
    reserved: HashSet<String>,
}

impl IdAllocator {
    /// Create an allocator producing `{prefix}-{kind}{n}` ids.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
            sequence: 0,
            reserved: HashSet::new(),
        }
    }

    /// Prefix used for allocated ids.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Mark an id as taken.
    pub fn reserve(&mut self, id: impl Into<String>) {
        self.reserved.insert(id.into());
    }

    /// Whether an id is already taken.
    #[must_use]
    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved.contains(id)
    }

    /// Allocate the next `{prefix}-{kind}{n}` id.
    ///
    /// One counter is shared by all kinds, so `allocate("div")` followed by
    /// `allocate("p")` yields `genid-div1` and `genid-p2`.
    pub fn allocate(&mut self, kind: &str) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("{}-{kind}{}", self.prefix, self.counter);
            if self.reserved.insert(candidate.clone()) {
                return candidate;
            }
            tracing::debug!(id = %candidate, "Skipping id already used in source");
        }
    }

    /// Allocate the next `{kind}-{m}` sequence id (`pb-1`, `pb-2`, ...).
    ///
    /// Uses its own counter, independent of [`IdAllocator::allocate`].
    pub fn next_sequence(&mut self, kind: &str) -> String {
        loop {
            self.sequence += 1;
            let candidate = format!("{kind}-{}", self.sequence);
            if self.reserved.insert(candidate.clone()) {
                return candidate;
            }
            tracing::debug!(id = %candidate, "Skipping id already used in source");
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}
