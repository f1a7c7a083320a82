use crate::binding::{FieldBinding, Role};
use crate::data::{number, text, Row};
use crate::ir::{ChartResult, Datum, Series, SeriesStyle};
use crate::transform::{distinct_values, filter};
use crate::ChartOptions;
use std::collections::HashMap;

/// Heatmap as a matrix: x values become labels, each y value a series, and
/// each cell the value field of the first row at that (x, y).
pub fn build(rows: &[Row], binding: &FieldBinding, options: &ChartOptions) -> ChartResult {
    let (Some(x), Some(y), Some(value)) = (
        binding.first(Role::X),
        binding.first(Role::Y),
        binding.first(Role::Value),
    ) else {
        return ChartResult::empty();
    };
    if rows.is_empty() {
        return ChartResult::empty();
    }

    let filtered = filter(rows, &options.filters);
    if filtered.is_empty() {
        return ChartResult::empty();
    }
    let xs = distinct_values(filtered.iter().copied(), &x.name);
    let ys = distinct_values(filtered.iter().copied(), &y.name);

    let mut cells: HashMap<(String, String), &Row> = HashMap::new();
    for &row in &filtered {
        if let (Some(xv), Some(yv)) = (text(row, &x.name), text(row, &y.name)) {
            cells.entry((xv, yv)).or_insert(row);
        }
    }

    let palette = options.palette();
    let datasets = ys
        .iter()
        .enumerate()
        .map(|(yi, yv)| {
            let data = xs
                .iter()
                .map(|xv| {
                    let cell = cells
                        .get(&(xv.clone(), yv.clone()))
                        .and_then(|row| number(row, &value.name));
                    Datum::from(cell)
                })
                .collect();
            Series::new(yv.clone(), data, SeriesStyle::colored(palette.color(yi)))
        })
        .collect();

    ChartResult {
        labels: xs,
        datasets,
    }
}
