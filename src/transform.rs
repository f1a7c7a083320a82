// Row-level stages shared by every builder: filter, sort, group.
//
// All stages work on borrowed views (`Vec<&Row>`); the caller's rows are
// never reordered or modified.

use crate::binding::FieldDescriptor;
use crate::data::{cell, key_text, number_or_zero, scalar_number, scalar_text, Row};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::hash::Hash;

/// Separator used when joining several fields into one key or label.
pub const KEY_SEPARATOR: &str = " / ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    /// Anything unrecognized; always passes.
    #[serde(other)]
    Unknown,
}

impl FilterOp {
    /// Evaluate the predicate against one cell (`None` = absent).
    pub fn evaluate(self, cell: Option<&Value>, operand: &Value) -> bool {
        match self {
            FilterOp::Eq => text_eq(cell, operand),
            FilterOp::Neq => !text_eq(cell, operand),
            FilterOp::Gt => compare_operand(cell, operand) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                compare_operand(cell, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => compare_operand(cell, operand) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                compare_operand(cell, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::In => member(cell, operand),
            FilterOp::Nin => !member(cell, operand),
            FilterOp::Unknown => true,
        }
    }
}

fn text_eq(cell: Option<&Value>, operand: &Value) -> bool {
    match (cell.and_then(scalar_text), scalar_text(operand)) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    }
}

fn compare_operand(cell: Option<&Value>, operand: &Value) -> Option<Ordering> {
    let cell = cell?;
    if operand.is_null() {
        return None;
    }
    let ordering = match (scalar_number(cell), scalar_number(operand)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => scalar_text(cell)
            .unwrap_or_default()
            .cmp(&scalar_text(operand).unwrap_or_default()),
    };
    Some(ordering)
}

fn member(cell: Option<&Value>, operand: &Value) -> bool {
    match operand {
        Value::Array(items) => items.iter().any(|item| text_eq(cell, item)),
        single => text_eq(cell, single),
    }
}

/// Sort order of two scalars: numbers first (by value), then text.
/// Total over mixed columns.
pub fn compare_scalars(a: &Value, b: &Value) -> Ordering {
    match (scalar_number(a), scalar_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => scalar_text(a)
            .unwrap_or_default()
            .cmp(&scalar_text(b).unwrap_or_default()),
    }
}

/// Ordering of two possibly-absent cells; absent sorts first.
pub fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_scalars(a, b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Label ordering: numeric labels first, by value, then the rest as text.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (label_number(a), label_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn label_number(label: &str) -> Option<f64> {
    label.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A single row predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: FieldDescriptor,
    #[serde(alias = "op")]
    pub operator: FilterOp,
    #[serde(default)]
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: FieldDescriptor::new(field),
            operator,
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.operator
            .evaluate(cell(row, &self.field.name), &self.value)
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub desc: bool,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: true,
        }
    }

    /// Apply the direction to an ascending ordering.
    pub fn directed(&self, ordering: Ordering) -> Ordering {
        if self.desc {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Keep rows satisfying every filter.
pub fn filter<'a>(rows: &'a [Row], filters: &[Filter]) -> Vec<&'a Row> {
    rows.iter()
        .filter(|row| filters.iter().all(|f| f.matches(row)))
        .collect()
}

/// Stable multi-key sort into a new view.
pub fn sort<'a>(rows: &[&'a Row], specs: &[SortSpec]) -> Vec<&'a Row> {
    let mut sorted = rows.to_vec();
    if specs.is_empty() {
        return sorted;
    }
    sorted.sort_by(|a, b| {
        specs
            .iter()
            .map(|spec| {
                spec.directed(compare_cells(cell(a, &spec.field), cell(b, &spec.field)))
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

/// Bucket rows by key, keys in first-seen order.
pub fn group_by<'a, K, F>(rows: &[&'a Row], mut key_fn: F) -> IndexMap<K, Vec<&'a Row>>
where
    K: Hash + Eq,
    F: FnMut(&Row) -> K,
{
    let mut groups: IndexMap<K, Vec<&'a Row>> = IndexMap::new();
    for row in rows {
        groups.entry(key_fn(row)).or_default().push(*row);
    }
    groups
}

/// Join several fields of a row into one key.
pub fn composite_key(row: &Row, fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| key_text(row, f))
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

/// Distinct present values of a field in first-seen order.
pub fn distinct_values<'a>(rows: impl IntoIterator<Item = &'a Row>, field: &str) -> Vec<String> {
    let mut seen = indexmap::IndexSet::new();
    for row in rows {
        if let Some(v) = cell(row, field).and_then(scalar_text) {
            seen.insert(v);
        }
    }
    seen.into_iter().collect()
}

pub fn sum_field(rows: &[&Row], field: &str) -> f64 {
    rows.iter().map(|row| number_or_zero(row, field)).sum()
}
