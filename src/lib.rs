// Library exports for chartseries

pub mod binding;
pub mod builders;
pub mod data;
pub mod ir;
pub mod palette;
pub mod parser;
pub mod runtime;
pub mod scale;
pub mod transform;

pub use binding::{FieldBinding, FieldDescriptor, Role};
pub use data::{DataFormat, Dataset, Row};
pub use ir::{AxisMeta, ChartOutput, ChartResult, Datum, Point, ScatterResult, Series, SeriesStyle};
pub use palette::ColorPalette;
pub use runtime::{build_chart, ChartConfig, ChartKind};
pub use transform::{Filter, FilterOp, SortSpec};

use serde::{Deserialize, Serialize};

/// Caller-supplied knobs shared by every builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartOptions {
    pub filters: Vec<Filter>,
    pub sort: Vec<SortSpec>,
    pub label_fields: Vec<String>,
    pub bar_sort: Option<BarSort>,
    pub palette: Option<Vec<String>>,
}

impl ChartOptions {
    /// The palette override when one is set, category10 otherwise.
    pub fn palette(&self) -> ColorPalette {
        match &self.palette {
            Some(colors) if !colors.is_empty() => ColorPalette::new(colors.clone()),
            _ => ColorPalette::category10(),
        }
    }
}

/// Ordering of bar x keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSort {
    pub by: BarSortKey,
    #[serde(default)]
    pub dir: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BarSortKey {
    /// Total of the first y field
    Value,
    /// Display label
    Label,
    /// Raw value of the first x field
    X,
    /// Raw value of any other field
    Field(String),
}

impl From<String> for BarSortKey {
    fn from(value: String) -> Self {
        match value.as_str() {
            "value" => BarSortKey::Value,
            "label" => BarSortKey::Label,
            "x" => BarSortKey::X,
            _ => BarSortKey::Field(value),
        }
    }
}

impl From<BarSortKey> for String {
    fn from(key: BarSortKey) -> Self {
        match key {
            BarSortKey::Value => "value".to_string(),
            BarSortKey::Label => "label".to_string(),
            BarSortKey::X => "x".to_string(),
            BarSortKey::Field(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_desc(self) -> bool {
        matches!(self, SortDirection::Desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_defaults() {
        let options: ChartOptions = serde_json::from_value(json!({})).unwrap();
        assert!(options.filters.is_empty());
        assert!(options.bar_sort.is_none());
        assert_eq!(options.palette().colors().len(), 10);
    }

    #[test]
    fn test_options_palette_override() {
        let options: ChartOptions =
            serde_json::from_value(json!({ "palette": ["red", "blue"] })).unwrap();
        assert_eq!(options.palette().color(3), "blue");

        let empty: ChartOptions = serde_json::from_value(json!({ "palette": [] })).unwrap();
        assert_eq!(empty.palette(), ColorPalette::category10());
    }

    #[test]
    fn test_bar_sort_parsing() {
        let options: ChartOptions = serde_json::from_value(json!({
            "barSort": { "by": "region", "dir": "desc" },
            "labelFields": ["name"]
        }))
        .unwrap();
        let sort = options.bar_sort.unwrap();
        assert_eq!(sort.by, BarSortKey::Field("region".to_string()));
        assert!(sort.dir.is_desc());
        assert_eq!(options.label_fields, vec!["name".to_string()]);

        let by_value: BarSort = serde_json::from_value(json!({ "by": "value" })).unwrap();
        assert_eq!(by_value.by, BarSortKey::Value);
        assert_eq!(by_value.dir, SortDirection::Asc);
    }
}
