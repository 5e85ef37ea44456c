//! Chart rendering for SPARQL Analytics.
//!
//! The renderer is split the same way as the rest of the pipeline: a chart
//! *artifact* is plain data computed from the result table and the user's
//! view selection, and the SVG module turns an artifact into markup. A
//! selection that cannot be charted yields an advisory message, never an
//! error and never a panic.

use sparql_analytics_model::{ChartKind, QueryResult, ViewSelection};

pub mod artifact;
mod svg;

pub use artifact::{FitPlotArtifact, PieChartArtifact, PieSlice, SeriesArtifact};

/// What the result renderer hands back to the shell for a chart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Inline SVG markup, ready to embed.
    Chart(String),
    /// The selection cannot be charted as-is; shown to the user as a hint,
    /// not as an error.
    Advisory(String),
}

/// Builds the chart for `selection`, or an advisory explaining what is
/// missing.
pub fn chart(result: &QueryResult, selection: &ViewSelection) -> RenderOutcome {
    match selection.kind {
        ChartKind::Table => {
            // Tables are rendered as HTML by the shell; a chart request for
            // them is a routing mistake, not a user problem.
            RenderOutcome::Advisory("the table view has no chart".to_owned())
        }
        ChartKind::LineChart | ChartKind::BarChart => series_chart(result, selection),
        ChartKind::PieChart => pie_chart(result, selection),
    }
}

fn series_chart(result: &QueryResult, selection: &ViewSelection) -> RenderOutcome {
    let (Some(x_column), Some(y_column)) = (&selection.x_column, &selection.y_column) else {
        return RenderOutcome::Advisory("Please select variables for the axes.".to_owned());
    };
    let Some(x_idx) = result.column_index(x_column) else {
        return RenderOutcome::Advisory(format!("column `{x_column}` is not part of the result"));
    };
    let Some(y_idx) = result.column_index(y_column) else {
        return RenderOutcome::Advisory(format!("column `{y_column}` is not part of the result"));
    };
    if result.rows.is_empty() {
        return RenderOutcome::Advisory("there are no rows to plot".to_owned());
    }

    let mut values = Vec::with_capacity(result.rows.len());
    for value in result.column_values(y_idx) {
        match parse_number(value) {
            Some(v) => values.push(v),
            None => {
                return RenderOutcome::Advisory(format!(
                    "column `{y_column}` contains non-numeric values and cannot be plotted"
                ));
            }
        }
    }

    let artifact = SeriesArtifact {
        x_label: x_column.clone(),
        y_label: y_column.clone(),
        labels: result.column_values(x_idx).map(str::to_owned).collect(),
        values,
        color: sanitized_color(selection.color.as_deref()),
    };
    let svg = match selection.kind {
        ChartKind::LineChart => svg::render_line(&artifact),
        _ => svg::render_bar(&artifact),
    };
    RenderOutcome::Chart(svg)
}

fn pie_chart(result: &QueryResult, selection: &ViewSelection) -> RenderOutcome {
    let Some(x_column) = &selection.x_column else {
        return RenderOutcome::Advisory("Please select variables for the axes.".to_owned());
    };
    if result.columns.len() < 2 {
        return RenderOutcome::Advisory(
            "a pie chart needs at least two columns: labels and values".to_owned(),
        );
    }
    let Some(label_idx) = result.column_index(x_column) else {
        return RenderOutcome::Advisory(format!("column `{x_column}` is not part of the result"));
    };
    // Explicit value column, with the second result column kept as the
    // fallback the original front-end hard-coded.
    let value_column = match &selection.value_column {
        Some(column) => match result.column_index(column) {
            Some(idx) => idx,
            None => {
                return RenderOutcome::Advisory(format!(
                    "column `{column}` is not part of the result"
                ));
            }
        },
        None => 1,
    };
    if result.rows.is_empty() {
        return RenderOutcome::Advisory("there are no rows to plot".to_owned());
    }

    let value_name = &result.columns[value_column];
    let mut slices = Vec::with_capacity(result.rows.len());
    let mut total = 0.0;
    for row in &result.rows {
        let Some(value) = parse_number(&row[value_column]) else {
            return RenderOutcome::Advisory(format!(
                "column `{value_name}` contains non-numeric values and cannot be plotted"
            ));
        };
        if value > 0.0 {
            total += value;
            slices.push(PieSlice {
                label: row[label_idx].clone(),
                value,
                fraction: 0.0,
            });
        }
    }
    if total <= 0.0 {
        return RenderOutcome::Advisory(format!(
            "column `{value_name}` has no positive values to build pie segments from"
        ));
    }
    for slice in &mut slices {
        slice.fraction = slice.value / total;
    }

    let artifact = PieChartArtifact {
        label_column: x_column.clone(),
        value_column: value_name.clone(),
        slices,
    };
    RenderOutcome::Chart(svg::render_pie(&artifact))
}

/// Renders the regression scatter plus fitted line.
pub fn fit_plot(artifact: &FitPlotArtifact) -> RenderOutcome {
    if artifact.points.is_empty() || artifact.line.is_empty() {
        return RenderOutcome::Advisory("nothing to plot for this fit".to_owned());
    }
    RenderOutcome::Chart(svg::render_fit(artifact))
}

fn parse_number(value: &str) -> Option<f64> {
    let parsed = value.trim().parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Accepts only plain hex colors like `#4c78a8`; anything else falls back
/// to the palette so user input never lands unescaped in SVG attributes.
fn sanitized_color(color: Option<&str>) -> Option<String> {
    let color = color?.trim();
    let hex = color.strip_prefix('#')?;
    let valid_len = matches!(hex.len(), 3 | 6 | 8);
    (valid_len && hex.chars().all(|c| c.is_ascii_hexdigit())).then(|| color.to_owned())
}
