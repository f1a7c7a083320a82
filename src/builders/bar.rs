use crate::binding::{FieldBinding, Role};
use crate::data::{cell, number_or_zero, text, Row};
use crate::ir::{ChartResult, Datum, Series, SeriesStyle};
use crate::palette::{color_map, lookup_color};
use crate::transform::{compare_cells, compare_labels, composite_key, distinct_values, filter, sort};
use crate::{BarSort, BarSortKey, ChartOptions};
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Aggregate for one x key.
struct XGroup<'a> {
    label: String,
    representative: &'a Row,
    /// Per y field
    totals: Vec<f64>,
    /// Colour value -> sum over all y fields
    by_color: IndexMap<String, f64>,
}

/// Bar chart.
///
/// Without a colour field (or when colour is the sole x field) there is one
/// dataset per y field. A distinct colour dimension instead yields one
/// dataset per colour value, with `None` where an x key has no rows of
/// that colour.
pub fn build(rows: &[Row], binding: &FieldBinding, options: &ChartOptions) -> ChartResult {
    let x_fields = binding.names(Role::X);
    let y_fields = binding.fields(Role::Y);
    if rows.is_empty() || x_fields.is_empty() || y_fields.is_empty() {
        return ChartResult::empty();
    }

    let color_field = binding.first(Role::Color).map(|f| f.name.as_str());
    let color_is_x = matches!(color_field, Some(c) if x_fields.len() == 1 && x_fields[0] == c);

    // The colour field only stays in the key when it is the whole key.
    let mut key_fields: Vec<&str> = if color_is_x {
        x_fields.clone()
    } else {
        x_fields
            .iter()
            .copied()
            .filter(|f| Some(*f) != color_field)
            .collect()
    };
    if key_fields.is_empty() {
        key_fields = x_fields.clone();
    }

    let label_fields: Vec<&str> = if options.label_fields.is_empty() {
        binding.names(Role::Labels)
    } else {
        options.label_fields.iter().map(String::as_str).collect()
    };

    let filtered = filter(rows, &options.filters);
    if filtered.is_empty() {
        return ChartResult::empty();
    }
    let ordered = sort(&filtered, &options.sort);

    let split_by_color = if color_is_x { None } else { color_field };
    let mut groups: IndexMap<String, XGroup> = IndexMap::new();
    for &row in &ordered {
        let key = composite_key(row, &key_fields);
        let group = groups.entry(key).or_insert_with_key(|key| XGroup {
            label: if label_fields.is_empty() {
                key.clone()
            } else {
                composite_key(row, &label_fields)
            },
            representative: row,
            totals: vec![0.0; y_fields.len()],
            by_color: IndexMap::new(),
        });

        let mut row_total = 0.0;
        for (total, field) in group.totals.iter_mut().zip(y_fields) {
            let v = number_or_zero(row, &field.name);
            *total += v;
            row_total += v;
        }
        if let Some(value) = split_by_color.and_then(|c| text(row, c)) {
            *group.by_color.entry(value).or_insert(0.0) += row_total;
        }
    }

    let mut groups: Vec<XGroup> = groups.into_values().collect();
    if let Some(bar_sort) = &options.bar_sort {
        sort_groups(&mut groups, bar_sort, x_fields[0]);
    }

    let palette = options.palette();
    let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();

    let datasets = match split_by_color {
        None => y_fields
            .iter()
            .enumerate()
            .map(|(yi, field)| {
                let data = groups.iter().map(|g| Datum::from(g.totals[yi])).collect();
                let style = match color_field.filter(|_| color_is_x) {
                    Some(color) => {
                        let colors = color_map(filtered.iter().copied(), color, &palette);
                        SeriesStyle {
                            background_colors: groups
                                .iter()
                                .map(|g| {
                                    let value = text(g.representative, color);
                                    lookup_color(&colors, value.as_deref(), &palette)
                                })
                                .collect(),
                            ..SeriesStyle::default()
                        }
                    }
                    None => SeriesStyle::colored(palette.color(0)),
                };
                Series::new(field.display_label(), data, style)
            })
            .collect(),
        Some(color) => {
            let values = distinct_values(filtered.iter().copied(), color);
            let colors = palette.assign_colors(&values);
            values
                .iter()
                .map(|value| {
                    let data = groups
                        .iter()
                        .map(|g| Datum::from(g.by_color.get(value).copied()))
                        .collect();
                    let style = SeriesStyle::colored(lookup_color(&colors, Some(value.as_str()), &palette));
                    Series::new(value.clone(), data, style)
                })
                .collect()
        }
    };

    ChartResult { labels, datasets }
}

fn sort_groups(groups: &mut [XGroup], bar_sort: &BarSort, first_x: &str) {
    let ascending = |a: &XGroup, b: &XGroup| -> Ordering {
        match &bar_sort.by {
            BarSortKey::Value => {
                let x = a.totals.first().copied().unwrap_or(0.0);
                let y = b.totals.first().copied().unwrap_or(0.0);
                x.total_cmp(&y)
            }
            BarSortKey::Label => compare_labels(&a.label, &b.label),
            BarSortKey::X => compare_cells(
                cell(a.representative, first_x),
                cell(b.representative, first_x),
            ),
            BarSortKey::Field(name) => {
                compare_cells(cell(a.representative, name), cell(b.representative, name))
            }
        }
    };
    if bar_sort.dir.is_desc() {
        groups.sort_by(|a, b| ascending(b, a));
    } else {
        groups.sort_by(|a, b| ascending(a, b));
    }
}
