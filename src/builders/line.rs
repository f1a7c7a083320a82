use crate::binding::{FieldBinding, FieldDescriptor, Role};
use crate::builders::Buckets;
use crate::data::Row;
use crate::ir::{ChartResult, Datum, Series, SeriesStyle};
use crate::palette::{color_map, lookup_color, translucent, FILL_ALPHA};
use crate::transform::{composite_key, filter, group_by, sort, sum_field};
use crate::ChartOptions;
use indexmap::IndexSet;

pub const PRIMARY_AXIS: &str = "y";
pub const SECONDARY_AXIS: &str = "y2";

/// Line chart: one series per (colour bucket, y field), summed per x label.
pub fn build(rows: &[Row], binding: &FieldBinding, options: &ChartOptions) -> ChartResult {
    build_series(rows, binding, options, false)
}

/// Same as `build`, with translucent fills under each line.
pub fn build_area(rows: &[Row], binding: &FieldBinding, options: &ChartOptions) -> ChartResult {
    build_series(rows, binding, options, true)
}

fn build_series(
    rows: &[Row],
    binding: &FieldBinding,
    options: &ChartOptions,
    filled: bool,
) -> ChartResult {
    let x_fields = binding.names(Role::X);
    let y_fields = binding.fields(Role::Y);
    let y2_fields = binding.fields(Role::Y2);
    if rows.is_empty() || x_fields.is_empty() || (y_fields.is_empty() && y2_fields.is_empty()) {
        return ChartResult::empty();
    }

    let filtered = filter(rows, &options.filters);
    if filtered.is_empty() {
        return ChartResult::empty();
    }
    let sorted = sort(&filtered, &options.sort);

    // X label = x fields, plus the label field when bound
    let mut key_fields = x_fields;
    if let Some(label) = binding.first(Role::Label) {
        key_fields.push(label.name.as_str());
    }
    let key_of = |row: &Row| composite_key(row, &key_fields);

    let labels: IndexSet<String> = sorted.iter().map(|&row| key_of(row)).collect();

    let buckets = Buckets::new(&sorted, binding.first(Role::Color).map(|f| f.name.as_str()));
    let by_bucket = group_by(&sorted, |row| buckets.value_of(row));

    let palette = options.palette();
    let colors = match &buckets {
        Buckets::Grouped { field, .. } => color_map(sorted.iter().copied(), field, &palette),
        Buckets::Ungrouped => Default::default(),
    };

    let axes: [(&str, &[FieldDescriptor]); 2] =
        [(PRIMARY_AXIS, y_fields), (SECONDARY_AXIS, y2_fields)];

    let mut datasets = Vec::new();
    for bucket in buckets.keys() {
        let bucket_rows = by_bucket
            .get(&Some(bucket.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let by_label = group_by(bucket_rows, &key_of);

        for (axis, fields) in axes {
            for field in fields {
                let data: Vec<Datum> = labels
                    .iter()
                    .map(|label| {
                        let total = by_label
                            .get(label)
                            .map(|rows| sum_field(rows, &field.name))
                            .unwrap_or(0.0);
                        Datum::from(total)
                    })
                    .collect();

                let color = match &bucket {
                    Some(value) => lookup_color(&colors, Some(value.as_str()), &palette),
                    None => palette.color(datasets.len()).to_string(),
                };
                let label = match &bucket {
                    Some(value) => format!("{} ({})", field.display_label(), value),
                    None => field.display_label().to_string(),
                };
                let style = SeriesStyle {
                    fill: filled.then(|| translucent(&color, FILL_ALPHA)),
                    color: Some(color),
                    axis_id: Some(axis.to_string()),
                    dashed: axis == SECONDARY_AXIS,
                    ..SeriesStyle::default()
                };
                datasets.push(Series::new(label, data, style));
            }
        }
    }

    ChartResult {
        labels: labels.into_iter().collect(),
        datasets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Filter, FilterOp, SortSpec};
    use serde_json::{json, Value};

    fn make_rows(value: Value) -> Vec<Row> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn sales_rows() -> Vec<Row> {
        make_rows(json!([
            { "month": "Jan", "region": "N", "sales": 2, "cost": 1, "order": 1 },
            { "month": "Jan", "region": "S", "sales": 3, "cost": 1, "order": 1 },
            { "month": "Feb", "region": "N", "sales": 5, "cost": "n/a", "order": 2 },
            { "month": "Mar", "region": "S", "sales": 7, "cost": 4, "order": 3 }
        ]))
    }

    #[test]
    fn test_sums_per_label() {
        let rows = sales_rows();
        let binding = FieldBinding::new()
            .bind(Role::X, &["month"])
            .bind(Role::Y, &["sales"]);
        let result = build(&rows, &binding, &ChartOptions::default());

        assert_eq!(result.labels, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(result.datasets.len(), 1);
        assert_eq!(result.datasets[0].label, "sales");
        assert_eq!(result.datasets[0].values(), vec![Some(5.0), Some(5.0), Some(7.0)]);
        assert_eq!(result.datasets[0].style.axis_id.as_deref(), Some("y"));
        assert!(!result.datasets[0].style.dashed);
    }

    #[test]
    fn test_secondary_axis_is_dashed() {
        let rows = sales_rows();
        let binding = FieldBinding::new()
            .bind(Role::X, &["month"])
            .bind(Role::Y, &["sales"])
            .bind(Role::Y2, &["cost"]);
        let result = build(&rows, &binding, &ChartOptions::default());

        assert_eq!(result.datasets.len(), 2);
        let cost = &result.datasets[1];
        assert_eq!(cost.style.axis_id.as_deref(), Some("y2"));
        assert!(cost.style.dashed);
        // non-numeric cost counts as zero
        assert_eq!(cost.values(), vec![Some(2.0), Some(0.0), Some(4.0)]);
        assert_ne!(result.datasets[0].style.color, cost.style.color);
    }

    #[test]
    fn test_color_buckets() {
        let rows = sales_rows();
        let binding = FieldBinding::new()
            .bind(Role::X, &["month"])
            .bind(Role::Y, &["sales"])
            .bind(Role::Color, &["region"]);
        let result = build(&rows, &binding, &ChartOptions::default());

        let labels: Vec<&str> = result.datasets.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["sales (N)", "sales (S)"]);
        assert_eq!(result.datasets[0].values(), vec![Some(2.0), Some(5.0), Some(0.0)]);
        assert_eq!(result.datasets[1].values(), vec![Some(3.0), Some(0.0), Some(7.0)]);
        assert_eq!(result.datasets[0].style.color.as_deref(), Some("#1f77b4"));
        assert_eq!(result.datasets[1].style.color.as_deref(), Some("#ff7f0e"));
        for series in &result.datasets {
            assert_eq!(series.data.len(), result.labels.len());
        }
    }

    #[test]
    fn test_sort_and_label_field() {
        let rows = sales_rows();
        let binding = FieldBinding::new()
            .bind(Role::X, &["month"])
            .bind(Role::Label, &["region"])
            .bind(Role::Y, &["sales"]);
        let options = ChartOptions {
            sort: vec![SortSpec::desc("order")],
            ..ChartOptions::default()
        };
        let result = build(&rows, &binding, &options);

        assert_eq!(result.labels, vec!["Mar / S", "Feb / N", "Jan / N", "Jan / S"]);
        assert_eq!(
            result.datasets[0].values(),
            vec![Some(7.0), Some(5.0), Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn test_filters_apply_first() {
        let rows = sales_rows();
        let binding = FieldBinding::new()
            .bind(Role::X, &["month"])
            .bind(Role::Y, &["sales"]);
        let options = ChartOptions {
            filters: vec![Filter::new("region", FilterOp::Eq, "S")],
            ..ChartOptions::default()
        };
        let result = build(&rows, &binding, &options);
        assert_eq!(result.labels, vec!["Jan", "Mar"]);
        assert_eq!(result.datasets[0].values(), vec![Some(3.0), Some(7.0)]);
    }

    #[test]
    fn test_filters_removing_every_row() {
        let rows = sales_rows();
        let options = ChartOptions {
            filters: vec![Filter::new("region", FilterOp::Eq, "West")],
            ..ChartOptions::default()
        };
        let plain = FieldBinding::new()
            .bind(Role::X, &["month"])
            .bind(Role::Y, &["sales"]);
        let bucketed = plain.clone().bind(Role::Color, &["region"]);

        assert_eq!(build(&rows, &plain, &options), ChartResult::empty());
        assert_eq!(build(&rows, &bucketed, &options), ChartResult::empty());
    }

    #[test]
    fn test_area_fill() {
        let rows = sales_rows();
        let binding = FieldBinding::new()
            .bind(Role::X, &["month"])
            .bind(Role::Y, &["sales"]);
        let result = build_area(&rows, &binding, &ChartOptions::default());
        assert_eq!(
            result.datasets[0].style.fill.as_deref(),
            Some("rgba(31, 119, 180, 0.2)")
        );
    }

    #[test]
    fn test_empty_and_unbound() {
        let binding = FieldBinding::new()
            .bind(Role::X, &["month"])
            .bind(Role::Y, &["sales"]);
        assert!(build(&[], &binding, &ChartOptions::default()).is_empty());

        let rows = sales_rows();
        let no_y = FieldBinding::new().bind(Role::X, &["month"]);
        assert!(build(&rows, &no_y, &ChartOptions::default()).is_empty());
    }

    #[test]
    fn test_input_order_preserved() {
        let rows = sales_rows();
        let before = rows.clone();
        let binding = FieldBinding::new()
            .bind(Role::X, &["month"])
            .bind(Role::Y, &["sales"]);
        let options = ChartOptions {
            sort: vec![SortSpec::desc("sales")],
            ..ChartOptions::default()
        };
        let _ = build(&rows, &binding, &options);
        assert_eq!(rows, before);
    }
}
