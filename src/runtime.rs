// Chart dispatch: pick the builder for a chart kind and run it

use crate::binding::{FieldBinding, Role};
use crate::builders::{bar, heatmap, line, pie, radar, scatter};
use crate::data::Row;
use crate::ir::ChartOutput;
use crate::ChartOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Area,
    Bar,
    Pie,
    Donut,
    Scatter,
    Bubble,
    Radar,
    Heatmap,
}

impl ChartKind {
    /// Roles this kind reads from a binding.
    pub fn roles(self) -> &'static [Role] {
        match self {
            ChartKind::Line | ChartKind::Area => {
                &[Role::X, Role::Y, Role::Y2, Role::Color, Role::Label]
            }
            ChartKind::Bar => &[Role::X, Role::Y, Role::Color, Role::Labels],
            ChartKind::Pie | ChartKind::Donut => &[Role::Category, Role::Value, Role::Color],
            ChartKind::Scatter | ChartKind::Bubble => {
                &[Role::X, Role::Y, Role::Group, Role::Size, Role::Color]
            }
            ChartKind::Radar => &[Role::Category, Role::Indicators, Role::Value, Role::Color],
            ChartKind::Heatmap => &[Role::X, Role::Y, Role::Value],
        }
    }
}

/// Build the series for `kind`. Never fails: unusable input gives an empty
/// output of the right shape.
pub fn build_chart(
    kind: ChartKind,
    rows: &[Row],
    binding: &FieldBinding,
    options: &ChartOptions,
) -> ChartOutput {
    match kind {
        ChartKind::Line => line::build(rows, binding, options).into(),
        ChartKind::Area => line::build_area(rows, binding, options).into(),
        ChartKind::Bar => bar::build(rows, binding, options).into(),
        ChartKind::Pie | ChartKind::Donut => pie::build(rows, binding, options).into(),
        ChartKind::Scatter | ChartKind::Bubble => scatter::build(rows, binding, options).into(),
        ChartKind::Radar => radar::build(rows, binding, options).into(),
        ChartKind::Heatmap => heatmap::build(rows, binding, options).into(),
    }
}

/// A complete chart request: kind, binding and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    #[serde(default)]
    pub binding: FieldBinding,
    #[serde(default)]
    pub options: ChartOptions,
}

impl ChartConfig {
    pub fn new(kind: ChartKind, binding: FieldBinding) -> Self {
        Self {
            kind,
            binding,
            options: ChartOptions::default(),
        }
    }

    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("Invalid chart config")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("In config {}", path.display()))
    }

    pub fn build(&self, rows: &[Row]) -> ChartOutput {
        build_chart(self.kind, rows, &self.binding, &self.options)
    }

    /// Bound role names the selected kind will ignore.
    pub fn unused_roles(&self) -> Vec<&str> {
        let used = self.kind.roles();
        self.binding
            .role_names()
            .filter(|name| !used.iter().any(|role| role.as_str() == *name))
            .collect()
    }
}
