use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One record of a dataset: field name -> scalar.
pub type Row = Map<String, Value>;

/// Text of a scalar for labels, keys and string equality.
/// Null is treated as absent.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Numeric coercion of a scalar. Fails on blank or non-numeric text.
pub fn scalar_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// The cell for `field`, with explicit nulls folded into absence.
pub fn cell<'a>(row: &'a Row, field: &str) -> Option<&'a Value> {
    row.get(field).filter(|v| !v.is_null())
}

/// Display text of a field; `None` when absent.
pub fn text(row: &Row, field: &str) -> Option<String> {
    cell(row, field).and_then(scalar_text)
}

/// Text of a field for use inside a composite key; absent becomes "".
pub fn key_text(row: &Row, field: &str) -> String {
    text(row, field).unwrap_or_default()
}

pub fn number(row: &Row, field: &str) -> Option<f64> {
    cell(row, field).and_then(scalar_number)
}

/// Numeric value for aggregation: missing or malformed counts as zero.
pub fn number_or_zero(row: &Row, field: &str) -> f64 {
    number(row, field).unwrap_or(0.0)
}

fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Input file formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    #[default]
    Json,
    Csv,
}

impl DataFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(DataFormat::Csv)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(DataFormat::Json)
        } else {
            None
        }
    }
}

/// An ordered in-memory snapshot of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Create a Dataset from a JSON array of objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut rows = Vec::with_capacity(array.len());
        for (idx, item) in array.iter().enumerate() {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Item {} in array must be an object", idx))?;
            rows.push(obj.clone());
        }

        debug!("Parsed {} JSON rows", rows.len());
        Ok(Self { rows })
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input).context("Failed to parse dataset JSON")?;
        Self::from_json(&value)
    }

    /// Read CSV with a header row. Cells are typed on the way in.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("Failed to read CSV record {}", idx + 1))?;
            let mut row = Row::new();
            for (header, raw) in headers.iter().zip(record.iter()) {
                if let Some(value) = csv_cell(raw) {
                    row.insert(header.clone(), value);
                }
            }
            rows.push(row);
        }

        debug!("Parsed {} CSV rows over {} columns", rows.len(), headers.len());
        Ok(Self { rows })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open CSV file '{}'", path.display()))?;
        Self::from_csv_reader(file)
    }

    pub fn from_reader<R: Read>(mut reader: R, format: DataFormat) -> Result<Self> {
        match format {
            DataFormat::Csv => Self::from_csv_reader(reader),
            DataFormat::Json => {
                let mut buf = String::new();
                reader
                    .read_to_string(&mut buf)
                    .context("Failed to read dataset input")?;
                Self::from_json_str(&buf)
            }
        }
    }
}

fn csv_cell(raw: &str) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Some(n) = raw
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
    {
        return Some(Value::Number(n));
    }
    match raw {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => Some(Value::String(raw.to_string())),
    }
}
