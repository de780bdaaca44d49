//! Aggregation Core
//!
//! Pure functions over in-memory record lists: filtering, stable sorting,
//! ranking, summary statistics and category bucketing. Every function is
//! total over any well-formed list (including empty); malformed or missing
//! fields in individual records degrade to the caller-supplied sentinel
//! and never raise. The upstream schema is inconsistent enough that this
//! is the only workable contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{field, Record, RankedRecord, ACTIVE_MARKER};

/// Bucket name for category values outside the known set
pub const OTHER_BUCKET: &str = "other";

/// Sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Ascending,
    Descending,
}

/// Per-field summary statistics over the present-and-numeric values
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Keep only records actively on sale. A missing `sells` field means
/// not-selling and is excluded.
pub fn filter_selling(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|r| r.text(field::SELLS) == Some(ACTIVE_MARKER))
        .cloned()
        .collect()
}

/// Stable sort by a numeric field, substituting `missing_sentinel` for
/// absent or non-numeric values.
///
/// Descending order reverses the comparator, not the list, so records
/// with equal keys keep their input order in both directions. That
/// stability is what makes rank assignment deterministic.
pub fn sort_by_field(
    records: &[Record],
    field: &str,
    order: Order,
    missing_sentinel: f64,
) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ka = a.num_or(field, missing_sentinel);
        let kb = b.num_or(field, missing_sentinel);
        match order {
            Order::Ascending => ka.total_cmp(&kb),
            Order::Descending => kb.total_cmp(&ka),
        }
    });
    sorted
}

/// Sort, truncate to `limit` and assign 1-based ranks in output order.
/// `limit = 0` yields an empty list, not an error.
pub fn rank_top(
    records: &[Record],
    field: &str,
    order: Order,
    limit: usize,
    missing_sentinel: f64,
) -> Vec<RankedRecord> {
    let mut sorted = sort_by_field(records, field, order, missing_sentinel);
    sorted.truncate(limit);
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, record)| RankedRecord {
            rank: (i + 1) as u32,
            record,
        })
        .collect()
}

/// Compute count/mean/min/max per requested field, over records where the
/// field is present and numeric. A field absent across all records yields
/// the zero `FieldSummary` rather than a division-by-zero failure.
pub fn summarize(records: &[Record], numeric_fields: &[&str]) -> BTreeMap<String, FieldSummary> {
    let mut summaries = BTreeMap::new();

    for &name in numeric_fields {
        let values: Vec<f64> = records.iter().filter_map(|r| r.num(name)).collect();

        let summary = if values.is_empty() {
            FieldSummary::default()
        } else {
            let count = values.len();
            let sum: f64 = values.iter().sum();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            FieldSummary {
                count,
                mean: sum / count as f64,
                min,
                max,
            }
        };

        summaries.insert(name.to_string(), summary);
    }

    summaries
}

/// Partition records by a category field. Known categories get their own
/// bucket (present even when empty); anything else - including records
/// with the field missing - collects under `"other"`. Every record lands
/// in exactly one bucket.
pub fn bucket_by_category(
    records: &[Record],
    category_field: &str,
    known_categories: &[&str],
) -> BTreeMap<String, Vec<Record>> {
    let mut buckets: BTreeMap<String, Vec<Record>> = known_categories
        .iter()
        .map(|&c| (c.to_string(), Vec::new()))
        .collect();
    buckets.insert(OTHER_BUCKET.to_string(), Vec::new());

    for record in records {
        let bucket = match record.text(category_field) {
            Some(c) if known_categories.contains(&c) => c.to_string(),
            _ => OTHER_BUCKET.to_string(),
        };
        buckets.entry(bucket).or_default().push(record.clone());
    }

    buckets
}
