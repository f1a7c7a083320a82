use crate::binding::{FieldBinding, Role};
use crate::builders::Buckets;
use crate::data::{cell, number, scalar_number, scalar_text, text, Row};
use crate::ir::{AxisMeta, Datum, Point, ScatterResult, Series, SeriesStyle};
use crate::palette::{color_map, lookup_color, ColorMap, ColorPalette};
use crate::scale::{CategoricalEncoder, RadiusScale};
use crate::transform::filter;
use crate::ChartOptions;
use indexmap::IndexMap;
use serde_json::Value;

/// Scatter / bubble chart.
///
/// Each axis coerces values to numbers row by row; values that do not
/// coerce are placed through that axis's own categorical encoder and the
/// encoder's labels are reported in `meta`.
pub fn build(rows: &[Row], binding: &FieldBinding, options: &ChartOptions) -> ScatterResult {
    let (Some(x), Some(y)) = (binding.first(Role::X), binding.first(Role::Y)) else {
        return ScatterResult::empty();
    };
    if rows.is_empty() {
        return ScatterResult::empty();
    }

    let group_field = binding.first(Role::Group).map(|f| f.name.as_str());
    let color_field = binding
        .first(Role::Color)
        .map(|f| f.name.as_str())
        .or(group_field);
    let size_field = binding.first(Role::Size).map(|f| f.name.as_str());

    let filtered = filter(rows, &options.filters);
    if filtered.is_empty() {
        return ScatterResult::empty();
    }
    let palette = options.palette();

    let radius = match size_field {
        Some(size) => RadiusScale::fit(filtered.iter().filter_map(|row| number(row, size))),
        None => RadiusScale::default(),
    };
    let colors = color_field
        .map(|field| color_map(filtered.iter().copied(), field, &palette))
        .unwrap_or_default();

    let buckets = Buckets::new(&filtered, group_field);
    let mut series: IndexMap<Option<String>, (Vec<Datum>, Vec<String>)> = buckets
        .keys()
        .into_iter()
        .map(|key| (key, (Vec::new(), Vec::new())))
        .collect();

    let mut x_encoder = CategoricalEncoder::new();
    let mut y_encoder = CategoricalEncoder::new();
    for &row in &filtered {
        let Some(bucket) = buckets.value_of(row) else {
            continue;
        };
        let (Some(raw_x), Some(raw_y)) = (cell(row, &x.name), cell(row, &y.name)) else {
            continue;
        };
        let px = position(raw_x, &mut x_encoder);
        let py = position(raw_y, &mut y_encoder);
        let r = radius.radius(size_field.and_then(|size| number(row, size)));
        let fill = point_color(row, color_field, &colors, &palette);

        if let Some((points, point_colors)) = series.get_mut(&bucket) {
            points.push(Datum::from(Point { x: px, y: py, r }));
            point_colors.push(fill);
        }
    }

    let datasets = series
        .into_iter()
        .enumerate()
        .map(|(i, (bucket, (data, point_colors)))| {
            let line = match (&bucket, color_field) {
                (Some(value), Some(field)) if Some(field) == group_field => {
                    lookup_color(&colors, Some(value.as_str()), &palette)
                }
                _ => palette.color(i).to_string(),
            };
            let label = bucket.unwrap_or_else(|| y.display_label().to_string());
            let style = SeriesStyle {
                color: Some(line),
                background_colors: point_colors,
                ..SeriesStyle::default()
            };
            Series::new(label, data, style)
        })
        .collect();

    let axis_labels = |encoder: CategoricalEncoder| {
        if encoder.is_empty() {
            None
        } else {
            Some(encoder.labels())
        }
    };
    let meta = AxisMeta {
        x_labels: axis_labels(x_encoder),
        y_labels: axis_labels(y_encoder),
    };
    let meta = (meta.x_labels.is_some() || meta.y_labels.is_some()).then_some(meta);

    ScatterResult { datasets, meta }
}

/// Numeric value of a cell, or its categorical index.
fn position(value: &Value, encoder: &mut CategoricalEncoder) -> f64 {
    match scalar_number(value) {
        Some(n) => n,
        None => encoder.encode(&scalar_text(value).unwrap_or_default()) as f64,
    }
}

fn point_color(
    row: &Row,
    color_field: Option<&str>,
    colors: &ColorMap,
    palette: &ColorPalette,
) -> String {
    let value = color_field.and_then(|field| text(row, field));
    lookup_color(colors, value.as_deref(), palette)
}
