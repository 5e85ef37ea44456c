use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the current query result should be displayed.
///
/// The set is closed on purpose: an unknown kind coming in from a form is a
/// parse error at the boundary, not a silent fallback somewhere downstream.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum ChartKind {
    #[default]
    Table,
    LineChart,
    BarChart,
    PieChart,
}

impl ChartKind {
    pub const ALL: [Self; 4] = [
        Self::Table,
        Self::LineChart,
        Self::BarChart,
        Self::PieChart,
    ];

    /// Identifier used in URLs and form values.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::LineChart => "line",
            Self::BarChart => "bar",
            Self::PieChart => "pie",
        }
    }

    /// Human-readable name shown in the view selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::LineChart => "Line Chart",
            Self::BarChart => "Bar Chart",
            Self::PieChart => "Pie Chart",
        }
    }

    /// Whether this kind plots a y series against an x axis.
    pub fn needs_both_axes(self) -> bool {
        matches!(self, Self::LineChart | Self::BarChart)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown visualization kind: {0}")]
pub struct ChartKindParseError(String);

impl FromStr for ChartKind {
    type Err = ChartKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "line" => Ok(Self::LineChart),
            "bar" => Ok(Self::BarChart),
            "pie" => Ok(Self::PieChart),
            other => Err(ChartKindParseError(other.to_owned())),
        }
    }
}

/// User-chosen rendering of the current result.
///
/// Rebuilt from request parameters on every render pass; nothing in here
/// survives a new query submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSelection {
    pub kind: ChartKind,
    pub x_column: Option<String>,
    pub y_column: Option<String>,
    /// Value series for pie charts. When unset, the second result column is
    /// used as a fallback (kept from the original behavior).
    pub value_column: Option<String>,
    /// Optional override color for the whole series, e.g. `#1f77b4`.
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.as_str().parse::<ChartKind>().ok(), Some(kind));
        }
    }

    #[test]
    fn unknown_kind_is_an_error() {
        assert!("scatter".parse::<ChartKind>().is_err());
    }
}
