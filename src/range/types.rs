//! Range types
//!
//! Defines the interval abstraction shared by routing and continuations.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Smallest effective partition key (inclusive lower bound of the key space)
pub const MIN_EFFECTIVE_KEY: &str = "";

/// Largest effective partition key (exclusive upper bound of the key space)
pub const MAX_EFFECTIVE_KEY: &str = "FF";

fn default_true() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(value: &bool) -> bool {
    *value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

// ============================================================================
// Range
// ============================================================================

/// An interval over an ordered key space.
///
/// Defaults to half-open `[min, max)`. A range with `min == max` is a single
/// point when both bounds are inclusive and empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range<K> {
    /// Lower bound
    pub min: K,
    /// Upper bound
    pub max: K,
    /// Whether `min` belongs to the range
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub is_min_inclusive: bool,
    /// Whether `max` belongs to the range
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_max_inclusive: bool,
}

impl<K: Ord> Range<K> {
    /// Create a range with explicit bound inclusivity
    pub fn new(min: K, max: K, is_min_inclusive: bool, is_max_inclusive: bool) -> Self {
        Self {
            min,
            max,
            is_min_inclusive,
            is_max_inclusive,
        }
    }

    /// Create a half-open `[min, max)` range
    pub fn half_open(min: K, max: K) -> Self {
        Self::new(min, max, true, false)
    }

    /// Create a single-point `[key, key]` range
    pub fn point(key: K) -> Self
    where
        K: Clone,
    {
        Self::new(key.clone(), key, true, true)
    }

    /// True when `min == max` and not both bounds are inclusive
    pub fn is_empty(&self) -> bool {
        self.min == self.max && !(self.is_min_inclusive && self.is_max_inclusive)
    }

    /// True for a `[k, k]` range
    pub fn is_point(&self) -> bool {
        self.min == self.max && self.is_min_inclusive && self.is_max_inclusive
    }

    /// Check whether a key falls inside the range
    pub fn contains(&self, key: &K) -> bool {
        let above_min = match self.min.cmp(key) {
            Ordering::Less => true,
            Ordering::Equal => self.is_min_inclusive,
            Ordering::Greater => false,
        };
        let below_max = match key.cmp(&self.max) {
            Ordering::Less => true,
            Ordering::Equal => self.is_max_inclusive,
            Ordering::Greater => false,
        };
        above_min && below_max
    }

    /// Check whether two ranges share at least one key.
    ///
    /// Touching bounds only overlap when both touching bounds are inclusive.
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        let left = self.min.cmp(&other.max);
        let right = other.min.cmp(&self.max);
        if left == Ordering::Greater || right == Ordering::Greater {
            return false;
        }
        if left == Ordering::Equal && !(self.is_min_inclusive && other.is_max_inclusive) {
            return false;
        }
        if right == Ordering::Equal && !(other.is_min_inclusive && self.is_max_inclusive) {
            return false;
        }
        true
    }

    /// Order by lower bound; at equal keys an inclusive bound sorts first
    pub fn cmp_by_min(&self, other: &Self) -> Ordering {
        self.min
            .cmp(&other.min)
            .then_with(|| match (self.is_min_inclusive, other.is_min_inclusive) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            })
    }

    /// Order by upper bound; at equal keys an exclusive bound sorts first
    pub fn cmp_by_max(&self, other: &Self) -> Ordering {
        self.max
            .cmp(&other.max)
            .then_with(|| match (self.is_max_inclusive, other.is_max_inclusive) {
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                _ => Ordering::Equal,
            })
    }
}

impl Range<String> {
    /// The whole effective key space `["", "FF")`
    pub fn full() -> Self {
        Self::half_open(MIN_EFFECTIVE_KEY.to_string(), MAX_EFFECTIVE_KEY.to_string())
    }
}

impl<K: fmt::Display> fmt::Display for Range<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.is_min_inclusive { '[' } else { '(' };
        let close = if self.is_max_inclusive { ']' } else { ')' };
        write!(f, "{open}{},{}{close}", self.min, self.max)
    }
}

// ============================================================================
// Partition Key Range
// ============================================================================

/// A backend partition and the slice of key space it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyRange {
    /// Partition identifier
    pub id: String,
    /// Inclusive lower bound
    pub min_inclusive: String,
    /// Exclusive upper bound
    pub max_exclusive: String,
    /// Ids of the ranges this one was split from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl PartitionKeyRange {
    /// Create a new partition key range
    pub fn new(
        id: impl Into<String>,
        min_inclusive: impl Into<String>,
        max_exclusive: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            min_inclusive: min_inclusive.into(),
            max_exclusive: max_exclusive.into(),
            parents: Vec::new(),
        }
    }

    /// Record the parent ranges this range was split from
    #[must_use]
    pub fn with_parents(mut self, parents: Vec<String>) -> Self {
        self.parents = parents;
        self
    }

    /// The `[min_inclusive, max_exclusive)` interval
    pub fn to_range(&self) -> Range<String> {
        Range::half_open(self.min_inclusive.clone(), self.max_exclusive.clone())
    }
}
