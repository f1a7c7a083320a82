use crate::binding::{FieldBinding, Role};
use crate::builders::BucketOrder;
use crate::data::{key_text, number_or_zero, text, Row};
use crate::ir::{ChartResult, Datum, Series, SeriesStyle};
use crate::palette::{color_map, lookup_color, translucent, FILL_ALPHA};
use crate::transform::filter;
use crate::ChartOptions;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Radar chart over a single category axis.
///
/// With a colour field: one series per colour value, each spoke the sum of
/// the first value field for that (category, colour). Without: one series
/// per value field.
pub fn build(rows: &[Row], binding: &FieldBinding, options: &ChartOptions) -> ChartResult {
    let category = binding
        .first(Role::Category)
        .or_else(|| binding.first(Role::Indicators));
    let value_fields = binding.fields(Role::Value);
    let Some(category) = category else {
        return ChartResult::empty();
    };
    if rows.is_empty() || value_fields.is_empty() {
        return ChartResult::empty();
    }
    let category = category.name.as_str();

    let filtered = filter(rows, &options.filters);
    if filtered.is_empty() {
        return ChartResult::empty();
    }

    let mut spokes: IndexMap<String, Vec<f64>> = IndexMap::new();
    for &row in &filtered {
        let totals = spokes
            .entry(key_text(row, category))
            .or_insert_with(|| vec![0.0; value_fields.len()]);
        for (total, field) in totals.iter_mut().zip(value_fields) {
            *total += number_or_zero(row, &field.name);
        }
    }

    let mut spokes: Vec<(String, Vec<f64>, ())> = spokes
        .into_iter()
        .map(|(label, totals)| (label, totals, ()))
        .collect();
    BucketOrder::resolve(&options.sort, &[category]).apply(&mut spokes);

    let palette = options.palette();
    let styled = |color: String| SeriesStyle {
        fill: Some(translucent(&color, FILL_ALPHA)),
        color: Some(color),
        ..SeriesStyle::default()
    };

    let datasets = match binding.first(Role::Color) {
        Some(color) => {
            let first_value = &value_fields[0].name;
            // colour value -> category -> sum of the first value field
            let mut cells: IndexMap<String, HashMap<String, f64>> = IndexMap::new();
            for &row in &filtered {
                if let Some(value) = text(row, &color.name) {
                    *cells
                        .entry(value)
                        .or_default()
                        .entry(key_text(row, category))
                        .or_insert(0.0) += number_or_zero(row, first_value);
                }
            }

            let colors = color_map(filtered.iter().copied(), &color.name, &palette);
            cells
                .iter()
                .map(|(value, by_category)| {
                    let data = spokes
                        .iter()
                        .map(|(label, _, _)| {
                            Datum::from(by_category.get(label).copied().unwrap_or(0.0))
                        })
                        .collect();
                    let line = lookup_color(&colors, Some(value.as_str()), &palette);
                    Series::new(value.clone(), data, styled(line))
                })
                .collect()
        }
        None => value_fields
            .iter()
            .enumerate()
            .map(|(vi, field)| {
                let data = spokes
                    .iter()
                    .map(|(_, totals, _)| Datum::from(totals[vi]))
                    .collect();
                let line = palette.color(vi).to_string();
                Series::new(field.display_label(), data, styled(line))
            })
            .collect(),
    };

    ChartResult {
        labels: spokes.into_iter().map(|(label, _, _)| label).collect(),
        datasets,
    }
}
