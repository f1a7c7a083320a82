// Render-ready output shapes handed to the chart renderer.

use serde::Serialize;

/// Positioned datum for scatter and bubble charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

/// One cell of a series: a value aligned to a label, or a point.
/// `Value(None)` renders as a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Datum {
    Value(Option<f64>),
    Point(Point),
}

impl Datum {
    pub fn value(&self) -> Option<f64> {
        match self {
            Datum::Value(v) => *v,
            Datum::Point(_) => None,
        }
    }

    pub fn point(&self) -> Option<&Point> {
        match self {
            Datum::Point(p) => Some(p),
            Datum::Value(_) => None,
        }
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Value(Some(v))
    }
}

impl From<Option<f64>> for Datum {
    fn from(v: Option<f64>) -> Self {
        Datum::Value(v)
    }
}

impl From<Point> for Datum {
    fn from(p: Point) -> Self {
        Datum::Point(p)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStyle {
    /// Line / border colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Per-datum colours (bars, slices, points)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub background_colors: Vec<String>,
    /// Translucent area fill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dashed: bool,
}

impl SeriesStyle {
    pub fn colored(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Self::default()
        }
    }
}

/// A named sequence of data plus its visual style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub data: Vec<Datum>,
    pub style: SeriesStyle,
}

impl Series {
    pub fn new(label: impl Into<String>, data: Vec<Datum>, style: SeriesStyle) -> Self {
        Self {
            label: label.into(),
            data,
            style,
        }
    }

    /// Aligned values; points read as `None`.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.data.iter().map(Datum::value).collect()
    }

    pub fn points(&self) -> Vec<Point> {
        self.data.iter().filter_map(Datum::point).copied().collect()
    }
}

/// Output of the label-aligned archetypes. Every dataset has one datum per label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartResult {
    pub labels: Vec<String>,
    pub datasets: Vec<Series>,
}

impl ChartResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.datasets.is_empty()
    }
}

/// Tick labels for categorically encoded scatter axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScatterResult {
    pub datasets: Vec<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<AxisMeta>,
}

impl ScatterResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Either output shape, serialized without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartOutput {
    Aligned(ChartResult),
    Scatter(ScatterResult),
}

impl ChartOutput {
    pub fn labels(&self) -> &[String] {
        match self {
            ChartOutput::Aligned(r) => &r.labels,
            ChartOutput::Scatter(_) => &[],
        }
    }

    pub fn datasets(&self) -> &[Series] {
        match self {
            ChartOutput::Aligned(r) => &r.datasets,
            ChartOutput::Scatter(r) => &r.datasets,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartOutput::Aligned(r) => r.is_empty(),
            ChartOutput::Scatter(r) => r.is_empty(),
        }
    }
}

impl From<ChartResult> for ChartOutput {
    fn from(r: ChartResult) -> Self {
        ChartOutput::Aligned(r)
    }
}

impl From<ScatterResult> for ChartOutput {
    fn from(r: ScatterResult) -> Self {
        ChartOutput::Scatter(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_series_serialization() {
        let series = Series::new(
            "Sales",
            vec![Datum::from(1.0), Datum::from(None)],
            SeriesStyle {
                color: Some("#1f77b4".to_string()),
                axis_id: Some("y2".to_string()),
                dashed: true,
                ..SeriesStyle::default()
            },
        );
        let value = serde_json::to_value(&series).unwrap();
        assert_eq!(
            value,
            json!({
                "label": "Sales",
                "data": [1.0, null],
                "style": { "color": "#1f77b4", "axisId": "y2", "dashed": true }
            })
        );
    }

    #[test]
    fn test_empty_shapes() {
        let aligned = serde_json::to_value(ChartOutput::from(ChartResult::empty())).unwrap();
        assert_eq!(aligned, json!({ "labels": [], "datasets": [] }));

        let scatter = serde_json::to_value(ChartOutput::from(ScatterResult::empty())).unwrap();
        assert_eq!(scatter, json!({ "datasets": [] }));
    }

    #[test]
    fn test_point_datum() {
        let p = Point { x: 1.0, y: 2.0, r: 4.0 };
        let series = Series::new("s", vec![Datum::from(p)], SeriesStyle::default());
        assert_eq!(series.points(), vec![p]);
        assert_eq!(series.values(), vec![None]);
        assert_eq!(
            serde_json::to_value(&series.data).unwrap(),
            json!([{ "x": 1.0, "y": 2.0, "r": 4.0 }])
        );
    }
}
