//! Plot-friendly chart artifacts.
//!
//! Plain serializable data, computed once from the result table; the SVG
//! module consumes them without looking back at the table.

use serde::{Deserialize, Serialize};

/// A single y series over categorical x labels, used for both line and bar
/// charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesArtifact {
    pub x_label: String,
    pub y_label: String,
    /// X axis labels, in row order.
    pub labels: Vec<String>,
    /// One y value per label.
    pub values: Vec<f64>,
    /// Optional override color for the whole series.
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Share of the positive total, in `[0, 1]`.
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChartArtifact {
    pub label_column: String,
    pub value_column: String,
    pub slices: Vec<PieSlice>,
}

/// Observed points plus the fitted regression line over the same x range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitPlotArtifact {
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub line: Vec<(f64, f64)>,
}
