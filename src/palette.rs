// Deterministic colour assignment.

use crate::data::{text, Row};
use crate::transform::distinct_values;
use indexmap::IndexMap;

/// d3 category10
const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// Alpha used for area and radar fills.
pub const FILL_ALPHA: f32 = 0.2;

/// Distinct value -> colour, in first-seen order.
pub type ColorMap = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::category10()
    }
}

impl ColorPalette {
    /// An empty list falls back to category10 so indexing never fails.
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            Self::category10()
        } else {
            Self { colors }
        }
    }

    pub fn category10() -> Self {
        Self {
            colors: CATEGORY10.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Colour at `index`, cycling past the end.
    pub fn color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    /// Zip keys with the palette in the order given.
    pub fn assign_colors(&self, keys: &[String]) -> ColorMap {
        keys.iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), self.color(i).to_string()))
            .collect()
    }
}

/// Colour map over the distinct values of `field`, first-seen order.
pub fn color_map<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    field: &str,
    palette: &ColorPalette,
) -> ColorMap {
    palette.assign_colors(&distinct_values(rows, field))
}

/// Colour of each row's bucket; rows without the field get the first colour.
pub fn row_colors<'a>(
    rows: impl IntoIterator<Item = &'a Row> + Clone,
    field: &str,
    palette: &ColorPalette,
) -> Vec<String> {
    let map = color_map(rows.clone(), field, palette);
    rows.into_iter()
        .map(|row| lookup_color(&map, text(row, field).as_deref(), palette))
        .collect()
}

/// Colour for a value, defaulting to the first palette entry.
pub fn lookup_color(map: &ColorMap, value: Option<&str>, palette: &ColorPalette) -> String {
    value
        .and_then(|v| map.get(v))
        .cloned()
        .unwrap_or_else(|| palette.color(0).to_string())
}

/// Same colour as `rgba(r, g, b, alpha)`. Unparseable input is returned as-is.
pub fn translucent(color: &str, alpha: f32) -> String {
    match csscolorparser::parse(color) {
        Ok(parsed) => {
            let [r, g, b, _] = parsed.to_rgba8();
            format!("rgba({}, {}, {}, {})", r, g, b, alpha)
        }
        Err(_) => color.to_string(),
    }
}
