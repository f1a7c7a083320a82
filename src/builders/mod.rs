// Per-archetype series builders.
//
// Every builder is a pure function of (rows, binding, options). Missing
// required roles or an empty dataset produce an empty result.

pub mod bar;
pub mod heatmap;
pub mod line;
pub mod pie;
pub mod radar;
pub mod scatter;

use crate::data::{text, Row};
use crate::transform::{compare_labels, distinct_values, SortSpec};
use std::cmp::Ordering;

/// How rows are split into series by an optional colour/group field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Buckets {
    /// No field bound: a single implicit series over all rows.
    Ungrouped,
    /// One series per distinct value, first-seen order.
    Grouped { field: String, values: Vec<String> },
}

impl Buckets {
    pub(crate) fn new(rows: &[&Row], field: Option<&str>) -> Self {
        match field {
            None => Buckets::Ungrouped,
            Some(field) => Buckets::Grouped {
                field: field.to_string(),
                values: distinct_values(rows.iter().copied(), field),
            },
        }
    }

    /// The bucket value a row belongs to. Ungrouped rows all map to `Some(None)`;
    /// grouped rows without the field map to `None` and join no series.
    pub(crate) fn value_of(&self, row: &Row) -> Option<Option<String>> {
        match self {
            Buckets::Ungrouped => Some(None),
            Buckets::Grouped { field, .. } => text(row, field).map(Some),
        }
    }

    /// Bucket keys in series order.
    pub(crate) fn keys(&self) -> Vec<Option<String>> {
        match self {
            Buckets::Ungrouped => vec![None],
            Buckets::Grouped { values, .. } => values.iter().cloned().map(Some).collect(),
        }
    }
}

/// How bucketed categories (pie slices, radar spokes) are ordered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BucketOrder {
    FirstSeen,
    Label { desc: bool },
    FirstValue { desc: bool },
}

impl BucketOrder {
    /// A sort key naming a category field sorts by label and wins over any
    /// other key, which sorts by the first value's total.
    pub(crate) fn resolve(specs: &[SortSpec], category_fields: &[&str]) -> Self {
        if let Some(spec) = specs
            .iter()
            .find(|s| category_fields.contains(&s.field.as_str()))
        {
            return BucketOrder::Label { desc: spec.desc };
        }
        match specs.first() {
            Some(spec) => BucketOrder::FirstValue { desc: spec.desc },
            None => BucketOrder::FirstSeen,
        }
    }

    /// Sort `(label, totals)` buckets in place. Stable.
    pub(crate) fn apply<T>(self, buckets: &mut [(String, Vec<f64>, T)]) {
        let ordering = |a: Ordering, desc: bool| if desc { a.reverse() } else { a };
        match self {
            BucketOrder::FirstSeen => {}
            BucketOrder::Label { desc } => {
                buckets.sort_by(|a, b| ordering(compare_labels(&a.0, &b.0), desc))
            }
            BucketOrder::FirstValue { desc } => buckets.sort_by(|a, b| {
                let x = a.1.first().copied().unwrap_or(0.0);
                let y = b.1.first().copied().unwrap_or(0.0);
                ordering(x.total_cmp(&y), desc)
            }),
        }
    }
}
