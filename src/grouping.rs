//! Aggregation of duration records by an extracted grouping key
//!
//! Groups records in a single pass under whatever key an extractor derives
//! (class, package, or anything else). Group order is the insertion order of
//! each key's first record; callers sort separately when they need a
//! by-duration ordering.

use crate::parser::DurationRecord;
use indexmap::IndexMap;

/// Aggregated durations for one grouping key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    /// Sum of member durations in seconds.
    pub total_duration: f64,
    /// Number of member tests.
    pub test_count: usize,
    /// Member records in first-seen order.
    pub tests: Vec<DurationRecord>,
}

/// Group records by an arbitrary key extractor.
///
/// O(n) over the records; each record lands in exactly one group, so the sum
/// of group totals equals the sum of input durations. The returned map keeps
/// first-occurrence insertion order.
pub fn group_by<F>(records: &[DurationRecord], extractor: F) -> IndexMap<String, Group>
where
    F: Fn(&str) -> String,
{
    let mut groups: IndexMap<String, Group> = IndexMap::new();

    for record in records {
        let key = extractor(&record.name);
        let group = groups.entry(key).or_default();
        group.total_duration += record.duration;
        group.test_count += 1;
        group.tests.push(record.clone());
    }

    groups
}

/// Groups as `(key, group)` pairs sorted by total duration descending.
///
/// This is the ordering the cumulative-distribution walk and the LPT
/// scheduler both require.
pub fn sorted_by_total_desc(groups: &IndexMap<String, Group>) -> Vec<(&str, &Group)> {
    let mut sorted: Vec<(&str, &Group)> = groups.iter().map(|(k, g)| (k.as_str(), g)).collect();
    sorted.sort_by(|a, b| {
        b.1.total_duration
            .partial_cmp(&a.1.total_duration)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}
