use crate::binding::{FieldBinding, Role};
use crate::builders::BucketOrder;
use crate::data::{number_or_zero, text, Row};
use crate::ir::{ChartResult, Datum, Series, SeriesStyle};
use crate::palette::{color_map, lookup_color};
use crate::transform::{composite_key, filter};
use crate::ChartOptions;
use indexmap::IndexMap;

/// Pie / donut chart: one slice per joined category label, one ring per
/// value field.
pub fn build(rows: &[Row], binding: &FieldBinding, options: &ChartOptions) -> ChartResult {
    let category_fields = binding.names(Role::Category);
    let value_fields = binding.fields(Role::Value);
    if rows.is_empty() || category_fields.is_empty() || value_fields.is_empty() {
        return ChartResult::empty();
    }

    let filtered = filter(rows, &options.filters);
    if filtered.is_empty() {
        return ChartResult::empty();
    }

    let mut slices: IndexMap<String, (Vec<f64>, &Row)> = IndexMap::new();
    for &row in &filtered {
        let label = composite_key(row, &category_fields);
        let (totals, _) = slices
            .entry(label)
            .or_insert_with(|| (vec![0.0; value_fields.len()], row));
        for (total, field) in totals.iter_mut().zip(value_fields) {
            *total += number_or_zero(row, &field.name);
        }
    }

    let mut slices: Vec<(String, Vec<f64>, &Row)> = slices
        .into_iter()
        .map(|(label, (totals, row))| (label, totals, row))
        .collect();
    BucketOrder::resolve(&options.sort, &category_fields).apply(&mut slices);

    let palette = options.palette();
    let background_colors: Vec<String> = match binding.first(Role::Color) {
        Some(color) => {
            let colors = color_map(filtered.iter().copied(), &color.name, &palette);
            slices
                .iter()
                .map(|(_, _, row)| lookup_color(&colors, text(row, &color.name).as_deref(), &palette))
                .collect()
        }
        None => (0..slices.len()).map(|i| palette.color(i).to_string()).collect(),
    };

    let datasets = value_fields
        .iter()
        .enumerate()
        .map(|(vi, field)| {
            let data = slices.iter().map(|(_, totals, _)| Datum::from(totals[vi])).collect();
            let style = SeriesStyle {
                background_colors: background_colors.clone(),
                ..SeriesStyle::default()
            };
            Series::new(field.display_label(), data, style)
        })
        .collect();

    ChartResult {
        labels: slices.into_iter().map(|(label, _, _)| label).collect(),
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

    fn budget_rows() -> Vec<Row> {
        make_rows(json!([
            { "dept": "Ops", "team": "A", "spend": 1, "staff": 4, "tier": "low" },
            { "dept": "Eng", "team": "B", "spend": 3, "staff": 9, "tier": "high" },
            { "dept": "Ops", "team": "A", "spend": 4, "staff": "", "tier": "low" },
            { "dept": "Art", "team": "C", "spend": 2, "staff": 1, "tier": "high" }
        ]))
    }

    #[test]
    fn test_slices_sum_per_category() {
        let rows = budget_rows();
        let binding = FieldBinding::new()
            .bind(Role::Category, &["dept"])
            .bind(Role::Value, &["spend"]);
        let result = build(&rows, &binding, &ChartOptions::default());

        assert_eq!(result.labels, vec!["Ops", "Eng", "Art"]);
        assert_eq!(result.datasets.len(), 1);
        assert_eq!(result.datasets[0].values(), vec![Some(5.0), Some(3.0), Some(2.0)]);
        assert_eq!(
            result.datasets[0].style.background_colors,
            vec!["#1f77b4", "#ff7f0e", "#2ca02c"]
        );
    }

    #[test]
    fn test_joined_categories_and_rings() {
        let rows = budget_rows();
        let binding = FieldBinding::new()
            .bind(Role::Category, &["dept", "team"])
            .bind(Role::Value, &["spend", "staff"]);
        let result = build(&rows, &binding, &ChartOptions::default());

        assert_eq!(result.labels, vec!["Ops / A", "Eng / B", "Art / C"]);
        assert_eq!(result.datasets.len(), 2);
        assert_eq!(result.datasets[1].label, "staff");
        assert_eq!(result.datasets[1].values(), vec![Some(4.0), Some(9.0), Some(1.0)]);
    }

    #[test]
    fn test_sort_by_first_value_desc() {
        let rows = make_rows(json!([
            { "k": "a", "v": 1 },
            { "k": "b", "v": 3 },
            { "k": "c", "v": 2 }
        ]));
        let binding = FieldBinding::new()
            .bind(Role::Category, &["k"])
            .bind(Role::Value, &["v"]);
        let options = ChartOptions {
            sort: vec![SortSpec::desc("v")],
            ..ChartOptions::default()
        };
        let result = build(&rows, &binding, &options);
        assert_eq!(result.labels, vec!["b", "c", "a"]);
        assert_eq!(result.datasets[0].values(), vec![Some(3.0), Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_category_sort_wins() {
        let rows = budget_rows();
        let binding = FieldBinding::new()
            .bind(Role::Category, &["dept"])
            .bind(Role::Value, &["spend"]);
        let options = ChartOptions {
            sort: vec![SortSpec::desc("spend"), SortSpec::asc("dept")],
            ..ChartOptions::default()
        };
        let result = build(&rows, &binding, &options);
        assert_eq!(result.labels, vec!["Art", "Eng", "Ops"]);
    }

    #[test]
    fn test_category_sort_over_mixed_labels() {
        let mut seed: u64 = 42;
        let rows: Vec<Row> = (0..600)
            .map(|i| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let r = (seed >> 33) % 500;
                let k = match i % 3 {
                    0 => json!(r),
                    1 => json!(r.to_string()),
                    _ => json!(format!("{}a", r)),
                };
                json!({ "k": k, "v": 1 }).as_object().cloned().unwrap()
            })
            .collect();
        let binding = FieldBinding::new()
            .bind(Role::Category, &["k"])
            .bind(Role::Value, &["v"]);
        let options = ChartOptions {
            sort: vec![SortSpec::asc("k")],
            ..ChartOptions::default()
        };
        let result = build(&rows, &binding, &options);

        let numeric = result
            .labels
            .iter()
            .take_while(|l| l.parse::<f64>().is_ok())
            .count();
        assert!(numeric > 0);
        assert!(result.labels[numeric..].iter().all(|l| l.ends_with('a')));
        let values: Vec<f64> = result.labels[..numeric]
            .iter()
            .map(|l| l.parse::<f64>().unwrap())
            .collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        let total: f64 = result.datasets[0].values().iter().flatten().sum();
        assert_eq!(total, 600.0);
    }

    #[test]
    fn test_color_field_per_slice() {
        let rows = budget_rows();
        let binding = FieldBinding::new()
            .bind(Role::Category, &["dept"])
            .bind(Role::Value, &["spend"])
            .bind(Role::Color, &["tier"]);
        let result = build(&rows, &binding, &ChartOptions::default());
        assert_eq!(
            result.datasets[0].style.background_colors,
            vec!["#1f77b4", "#ff7f0e", "#ff7f0e"]
        );
    }

    #[test]
    fn test_filters_and_missing_value_role() {
        let rows = budget_rows();
        let binding = FieldBinding::new()
            .bind(Role::Category, &["dept"])
            .bind(Role::Value, &["spend"]);
        let options = ChartOptions {
            filters: vec![Filter::new("tier", FilterOp::Eq, "high")],
            ..ChartOptions::default()
        };
        assert_eq!(build(&rows, &binding, &options).labels, vec!["Eng", "Art"]);

        let none = ChartOptions {
            filters: vec![Filter::new("tier", FilterOp::Eq, "mid")],
            ..ChartOptions::default()
        };
        assert_eq!(build(&rows, &binding, &none), ChartResult::empty());

        let no_value = FieldBinding::new().bind(Role::Category, &["dept"]);
        assert!(build(&rows, &no_value, &ChartOptions::default()).is_empty());
        let no_category = FieldBinding::new().bind(Role::Value, &["spend"]);
        assert!(build(&rows, &no_category, &ChartOptions::default()).is_empty());
        assert!(build(&[], &binding, &ChartOptions::default()).is_empty());
    }
}
