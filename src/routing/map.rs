//! Routing map
//!
//! An immutable, validated snapshot of a container's partition key ranges
//! that answers overlap queries.

use crate::error::{Error, Result};
use crate::range::{PartitionKeyRange, Range, MAX_EFFECTIVE_KEY, MIN_EFFECTIVE_KEY};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// A complete, gap-free cover of the effective key space.
///
/// Ranges are held sorted by `min_inclusive`; because the cover is contiguous
/// they are sorted by `max_exclusive` as well.
#[derive(Debug, Clone)]
pub struct RoutingMap {
    /// Ranges ordered by lower bound
    ranges: Vec<PartitionKeyRange>,
    /// Position of each range id in `ranges`
    index_by_id: HashMap<String, usize>,
}

impl RoutingMap {
    /// Build a routing map, rejecting anything that is not a complete cover
    pub fn try_new(mut ranges: Vec<PartitionKeyRange>) -> Result<Self> {
        ranges.sort_by(|a, b| a.min_inclusive.cmp(&b.min_inclusive));

        let (Some(first), Some(last)) = (ranges.first(), ranges.last()) else {
            return Err(Error::incomplete_routing_map("no partition key ranges"));
        };
        if first.min_inclusive != MIN_EFFECTIVE_KEY {
            return Err(Error::incomplete_routing_map(format!(
                "first range '{}' starts at '{}' instead of the minimum key",
                first.id, first.min_inclusive
            )));
        }
        if last.max_exclusive != MAX_EFFECTIVE_KEY {
            return Err(Error::incomplete_routing_map(format!(
                "last range '{}' ends at '{}' instead of '{MAX_EFFECTIVE_KEY}'",
                last.id, last.max_exclusive
            )));
        }

        let mut index_by_id = HashMap::with_capacity(ranges.len());
        for (position, range) in ranges.iter().enumerate() {
            if range.min_inclusive >= range.max_exclusive {
                return Err(Error::incomplete_routing_map(format!(
                    "range '{}' is empty: [{},{})",
                    range.id, range.min_inclusive, range.max_exclusive
                )));
            }
            if index_by_id.insert(range.id.clone(), position).is_some() {
                return Err(Error::incomplete_routing_map(format!(
                    "duplicate range id '{}'",
                    range.id
                )));
            }
        }

        for pair in ranges.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            match left.max_exclusive.cmp(&right.min_inclusive) {
                Ordering::Equal => {}
                Ordering::Less => {
                    return Err(Error::incomplete_routing_map(format!(
                        "gap between '{}' and '{}': [{},{})",
                        left.id, right.id, left.max_exclusive, right.min_inclusive
                    )));
                }
                Ordering::Greater => {
                    return Err(Error::incomplete_routing_map(format!(
                        "ranges '{}' and '{}' overlap",
                        left.id, right.id
                    )));
                }
            }
        }

        Ok(Self {
            ranges,
            index_by_id,
        })
    }

    /// All ranges in key order
    pub fn ranges(&self) -> &[PartitionKeyRange] {
        &self.ranges
    }

    /// Number of partitions
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Always false for a constructed map; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Look up a range by id
    pub fn range_by_id(&self, range_id: &str) -> Option<&PartitionKeyRange> {
        self.index_by_id.get(range_id).map(|&i| &self.ranges[i])
    }

    /// Ranges overlapping a single query range, in key order
    pub fn overlapping_ranges(&self, query: &Range<String>) -> Vec<&PartitionKeyRange> {
        let mut positions = BTreeSet::new();
        self.collect_overlapping(query, &mut positions);
        positions.into_iter().map(|i| &self.ranges[i]).collect()
    }

    /// Ranges overlapping any of several query ranges, in key order.
    ///
    /// Query order is irrelevant and value-equal duplicates count once.
    /// Distinct query ranges that overlap each other are rejected.
    pub fn overlapping_ranges_multi(
        &self,
        queries: &[Range<String>],
    ) -> Result<Vec<&PartitionKeyRange>> {
        let distinct = distinct_query_ranges(queries)?;

        let mut positions = BTreeSet::new();
        for query in distinct {
            self.collect_overlapping(query, &mut positions);
        }
        Ok(positions.into_iter().map(|i| &self.ranges[i]).collect())
    }

    fn collect_overlapping(&self, query: &Range<String>, out: &mut BTreeSet<usize>) {
        if query.is_empty() {
            return;
        }

        // First range whose end lies beyond the query start
        let start = self
            .ranges
            .partition_point(|r| r.max_exclusive <= query.min);

        for (position, candidate) in self.ranges.iter().enumerate().skip(start) {
            let past_end = match candidate.min_inclusive.cmp(&query.max) {
                Ordering::Less => false,
                Ordering::Equal => !query.is_max_inclusive,
                Ordering::Greater => true,
            };
            if past_end {
                break;
            }
            if candidate.to_range().overlaps(query) {
                out.insert(position);
            }
        }
    }
}

/// Sort query ranges, drop empties and exact duplicates, and reject overlaps
fn distinct_query_ranges(queries: &[Range<String>]) -> Result<Vec<&Range<String>>> {
    let mut sorted: Vec<&Range<String>> = queries.iter().filter(|q| !q.is_empty()).collect();
    sorted.sort_by(|a, b| a.cmp_by_min(b).then_with(|| a.cmp_by_max(b)));
    sorted.dedup_by(|a, b| **a == **b);

    // Sorted by lower bound, so any overlap shows up between neighbours
    for pair in sorted.windows(2) {
        if pair[0].overlaps(pair[1]) {
            return Err(Error::invalid_argument(format!(
                "query ranges {} and {} overlap",
                pair[0], pair[1]
            )));
        }
    }

    Ok(sorted)
}

/// Parse a YAML or JSON list of partition key ranges
pub fn parse_ranges(contents: &str) -> Result<Vec<PartitionKeyRange>> {
    Ok(serde_yaml::from_str(contents)?)
}
