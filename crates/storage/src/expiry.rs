//! Expiry index for proactive cleanup
//!
//! This module provides `ExpiryIndex`, a min-heap of `(expiry, key)`
//! candidates. It lets the janitor find keys worth checking without scanning
//! the whole table:
//! - Every put pushes one candidate, even for an existing key
//! - Candidates are never removed on overwrite or delete
//! - `pop_due()` drains candidates in expiry order, O(log n) each
//!
//! The index is a hint. A popped candidate may be stale (the key was deleted
//! or re-inserted with a different expiry), so callers must re-validate it
//! against the table before removing anything.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ttlkv_core::Timestamp;

use crate::entry::is_expired;

/// A key that may be expired at `expiry`
///
/// Field order matters: the derived `Ord` compares `expiry` first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Candidate {
    /// Expiry recorded when the candidate was pushed
    pub expiry: Timestamp,
    /// The key that was written
    pub key: String,
}

/// Min-heap of expiry candidates, earliest expiry first
#[derive(Debug, Default)]
pub struct ExpiryIndex {
    heap: BinaryHeap<Reverse<Candidate>>,
}

impl ExpiryIndex {
    /// Create a new empty ExpiryIndex
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Record that `key` was written with the given expiry
    pub fn push(&mut self, expiry: Timestamp, key: String) {
        self.heap.push(Reverse(Candidate { expiry, key }));
    }

    /// Earliest expiry in the index, if any
    pub fn peek_expiry(&self) -> Option<Timestamp> {
        self.heap.peek().map(|Reverse(c)| c.expiry)
    }

    /// Pop the earliest candidate if it is due at `now`
    ///
    /// Returns `None` when the index is empty or the earliest candidate
    /// expires after `now`.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<Candidate> {
        match self.peek_expiry() {
            Some(expiry) if is_expired(expiry, now) => self.heap.pop().map(|Reverse(c)| c),
            _ => None,
        }
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Get the number of candidates, stale ones included
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_index_pops_in_expiry_order() {
        let mut index = ExpiryIndex::new();
        index.push(Timestamp::from_micros(800), "b".to_string());
        index.push(Timestamp::from_micros(500), "a".to_string());
        index.push(Timestamp::from_micros(1200), "c".to_string());

        let now = Timestamp::from_micros(1000);
        let first = index.pop_due(now).unwrap();
        let second = index.pop_due(now).unwrap();

        assert_eq!(first.key, "a");
        assert_eq!(second.key, "b");
        // "c" is not due yet
        assert!(index.pop_due(now).is_none());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_expiry_index_boundary_is_due() {
        let mut index = ExpiryIndex::new();
        index.push(Timestamp::from_micros(500), "k".to_string());

        assert!(index.pop_due(Timestamp::from_micros(499)).is_none());
        assert!(index.pop_due(Timestamp::from_micros(500)).is_some());
    }

    #[test]
    fn test_expiry_index_keeps_duplicate_candidates() {
        let mut index = ExpiryIndex::new();
        index.push(Timestamp::from_micros(100), "k".to_string());
        index.push(Timestamp::from_micros(900), "k".to_string());

        assert_eq!(index.len(), 2);
        assert_eq!(index.peek_expiry(), Some(Timestamp::from_micros(100)));

        let stale = index.pop_due(Timestamp::from_micros(200)).unwrap();
        assert_eq!(stale.expiry, Timestamp::from_micros(100));
        assert_eq!(index.peek_expiry(), Some(Timestamp::from_micros(900)));
    }

    #[test]
    fn test_expiry_index_empty() {
        let mut index = ExpiryIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.peek_expiry(), None);
        assert!(index.pop_due(Timestamp::MAX).is_none());
    }

    #[test]
    fn test_expiry_index_same_expiry_different_keys() {
        let mut index = ExpiryIndex::new();
        for i in 0..5 {
            index.push(Timestamp::from_micros(300), format!("key_{}", i));
        }

        let mut drained = Vec::new();
        while let Some(candidate) = index.pop_due(Timestamp::from_micros(300)) {
            drained.push(candidate.key);
        }
        drained.sort();
        assert_eq!(drained, vec!["key_0", "key_1", "key_2", "key_3", "key_4"]);
        assert!(index.is_empty());
    }
}
