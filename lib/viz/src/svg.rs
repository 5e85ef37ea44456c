//! Minimal SVG canvas plus one renderer per artifact kind.
//!
//! The markup is written by hand into a `String`; there is no layout engine
//! underneath, every renderer places its axes and labels directly.

use std::fmt::Write;

use crate::artifact::{FitPlotArtifact, PieChartArtifact, SeriesArtifact};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 50.0;

const AXIS_COLOR: &str = "#666666";
const GRID_COLOR: &str = "#dddddd";
const TEXT_COLOR: &str = "#333333";

/// Default categorical palette (matplotlib tab10).
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

struct Canvas {
    out: String,
}

impl Canvas {
    fn new() -> Self {
        let mut out = String::new();
        let _ = write!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" \
             width=\"{WIDTH}\" height=\"{HEIGHT}\" font-family=\"sans-serif\">"
        );
        let _ = write!(
            out,
            "<rect x=\"0\" y=\"0\" width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"#ffffff\"/>"
        );
        Self { out }
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        let _ = write!(
            self.out,
            "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" \
             stroke=\"{stroke}\" stroke-width=\"{width}\"/>"
        );
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        let mut coords = String::new();
        for (x, y) in points {
            let _ = write!(coords, "{x:.2},{y:.2} ");
        }
        let _ = write!(
            self.out,
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{width}\"/>",
            coords.trim_end()
        );
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        let _ = write!(
            self.out,
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" fill=\"{fill}\"/>"
        );
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        let _ = write!(
            self.out,
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{fill}\"/>"
        );
    }

    fn path(&mut self, d: &str, fill: &str) {
        let _ = write!(
            self.out,
            "<path d=\"{d}\" fill=\"{fill}\" stroke=\"#ffffff\" stroke-width=\"1\"/>"
        );
    }

    fn text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: &str) {
        let _ = write!(
            self.out,
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{size}\" fill=\"{TEXT_COLOR}\" \
             text-anchor=\"{anchor}\">{}</text>",
            escape(content)
        );
    }

    fn finish(mut self) -> String {
        self.out.push_str("</svg>");
        self.out
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn tick_label(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    if value.abs() >= 10_000.0 || value.abs() < 0.01 {
        return format!("{value:.1e}");
    }
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// Linear mapping from a data range onto a pixel range.
struct Scale {
    lo: f64,
    hi: f64,
    px_lo: f64,
    px_hi: f64,
}

impl Scale {
    fn new(lo: f64, hi: f64, px_lo: f64, px_hi: f64) -> Self {
        // Degenerate ranges still need a usable scale.
        let (lo, hi) = if (hi - lo).abs() < f64::EPSILON {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        };
        Self { lo, hi, px_lo, px_hi }
    }

    fn at(&self, value: f64) -> f64 {
        self.px_lo + (value - self.lo) / (self.hi - self.lo) * (self.px_hi - self.px_lo)
    }

    fn ticks(&self) -> Vec<f64> {
        const STEPS: usize = 5;
        (0..=STEPS)
            .map(|i| self.lo + (self.hi - self.lo) * i as f64 / STEPS as f64)
            .collect()
    }
}

fn draw_y_axis(canvas: &mut Canvas, scale: &Scale, label: &str) {
    let bottom = HEIGHT - MARGIN_BOTTOM;
    canvas.line(MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT, bottom, AXIS_COLOR, 1.0);
    for tick in scale.ticks() {
        let y = scale.at(tick);
        canvas.line(MARGIN_LEFT, y, WIDTH - MARGIN_RIGHT, y, GRID_COLOR, 0.5);
        canvas.text(MARGIN_LEFT - 6.0, y + 3.0, &tick_label(tick), 10.0, "end");
    }
    canvas.text(12.0, MARGIN_TOP - 10.0, label, 11.0, "start");
}

fn draw_x_baseline(canvas: &mut Canvas, label: &str) {
    let bottom = HEIGHT - MARGIN_BOTTOM;
    canvas.line(MARGIN_LEFT, bottom, WIDTH - MARGIN_RIGHT, bottom, AXIS_COLOR, 1.0);
    canvas.text(WIDTH / 2.0, HEIGHT - 8.0, label, 11.0, "middle");
}

/// X labels under the axis, thinned so they stay readable.
fn draw_x_labels(canvas: &mut Canvas, labels: &[String], position: impl Fn(usize) -> f64) {
    let bottom = HEIGHT - MARGIN_BOTTOM;
    let step = labels.len().div_ceil(10).max(1);
    for (i, label) in labels.iter().enumerate() {
        if i % step != 0 {
            continue;
        }
        let mut shown = label.clone();
        if shown.len() > 14 {
            shown.truncate(13);
            shown.push('\u{2026}');
        }
        canvas.text(position(i), bottom + 16.0, &shown, 10.0, "middle");
    }
}

fn value_bounds(values: &[f64], include_zero: bool) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    (lo, hi)
}

pub(crate) fn render_line(artifact: &SeriesArtifact) -> String {
    let mut canvas = Canvas::new();
    let (lo, hi) = value_bounds(&artifact.values, false);
    let scale = Scale::new(lo, hi, HEIGHT - MARGIN_BOTTOM, MARGIN_TOP);
    draw_y_axis(&mut canvas, &scale, &artifact.y_label);
    draw_x_baseline(&mut canvas, &artifact.x_label);

    let n = artifact.values.len();
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let x_at = |i: usize| {
        if n == 1 {
            MARGIN_LEFT + plot_width / 2.0
        } else {
            MARGIN_LEFT + plot_width * i as f64 / (n - 1) as f64
        }
    };
    draw_x_labels(&mut canvas, &artifact.labels, x_at);

    let color = artifact.color.as_deref().unwrap_or(PALETTE[0]);
    let points: Vec<(f64, f64)> = artifact
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| (x_at(i), scale.at(v)))
        .collect();
    canvas.polyline(&points, color, 2.0);
    for &(x, y) in &points {
        canvas.circle(x, y, 3.0, color);
    }
    canvas.finish()
}

pub(crate) fn render_bar(artifact: &SeriesArtifact) -> String {
    let mut canvas = Canvas::new();
    let (lo, hi) = value_bounds(&artifact.values, true);
    let scale = Scale::new(lo, hi, HEIGHT - MARGIN_BOTTOM, MARGIN_TOP);
    draw_y_axis(&mut canvas, &scale, &artifact.y_label);
    draw_x_baseline(&mut canvas, &artifact.x_label);

    let n = artifact.values.len();
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let slot = plot_width / n as f64;
    let x_at = |i: usize| MARGIN_LEFT + slot * (i as f64 + 0.5);
    draw_x_labels(&mut canvas, &artifact.labels, x_at);

    let color = artifact.color.as_deref().unwrap_or(PALETTE[0]);
    let baseline = scale.at(0.0);
    let bar_width = (slot * 0.8).min(60.0);
    for (i, &value) in artifact.values.iter().enumerate() {
        let top = scale.at(value);
        let (y, h) = if top <= baseline {
            (top, baseline - top)
        } else {
            (baseline, top - baseline)
        };
        canvas.rect(x_at(i) - bar_width / 2.0, y, bar_width, h.max(0.5), color);
    }
    canvas.finish()
}

pub(crate) fn render_pie(artifact: &PieChartArtifact) -> String {
    use std::f64::consts::PI;

    let mut canvas = Canvas::new();
    canvas.text(
        WIDTH / 2.0,
        18.0,
        &format!("{} by {}", artifact.value_column, artifact.label_column),
        12.0,
        "middle",
    );

    let cx = WIDTH * 0.4;
    let cy = (HEIGHT + MARGIN_TOP) / 2.0;
    let r = (HEIGHT - MARGIN_TOP - 40.0) / 2.0;

    // 12 o'clock start, clockwise, same convention as the original charts.
    let mut start = -PI / 2.0;
    for (i, slice) in artifact.slices.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let sweep = 2.0 * PI * slice.fraction;
        if slice.fraction >= 0.9995 {
            canvas.circle(cx, cy, r, color);
        } else {
            let end = start + sweep;
            let x1 = cx + r * start.cos();
            let y1 = cy + r * start.sin();
            let x2 = cx + r * end.cos();
            let y2 = cy + r * end.sin();
            let large_arc = i32::from(sweep > PI);
            let d = format!(
                "M{cx:.2},{cy:.2} L{x1:.2},{y1:.2} A{r:.2},{r:.2} 0 {large_arc} 1 {x2:.2},{y2:.2} Z"
            );
            canvas.path(&d, color);
        }

        if slice.fraction > 0.03 {
            let mid = start + sweep / 2.0;
            let lx = cx + (r + 16.0) * mid.cos();
            let ly = cy + (r + 16.0) * mid.sin();
            let anchor = if mid.cos() < -0.1 {
                "end"
            } else if mid.cos() > 0.1 {
                "start"
            } else {
                "middle"
            };
            canvas.text(
                lx,
                ly,
                &format!("{} ({:.1}%)", slice.label, slice.fraction * 100.0),
                10.0,
                anchor,
            );
        }
        start += sweep;
    }
    canvas.finish()
}

pub(crate) fn render_fit(artifact: &FitPlotArtifact) -> String {
    let mut canvas = Canvas::new();

    let xs: Vec<f64> = artifact
        .points
        .iter()
        .chain(&artifact.line)
        .map(|&(x, _)| x)
        .collect();
    let ys: Vec<f64> = artifact
        .points
        .iter()
        .chain(&artifact.line)
        .map(|&(_, y)| y)
        .collect();
    let (x_lo, x_hi) = value_bounds(&xs, false);
    let (y_lo, y_hi) = value_bounds(&ys, false);
    let x_scale = Scale::new(x_lo, x_hi, MARGIN_LEFT, WIDTH - MARGIN_RIGHT);
    let y_scale = Scale::new(y_lo, y_hi, HEIGHT - MARGIN_BOTTOM, MARGIN_TOP);

    draw_y_axis(&mut canvas, &y_scale, &artifact.y_label);
    draw_x_baseline(&mut canvas, &artifact.x_label);
    let bottom = HEIGHT - MARGIN_BOTTOM;
    for tick in x_scale.ticks() {
        canvas.text(x_scale.at(tick), bottom + 16.0, &tick_label(tick), 10.0, "middle");
    }

    for &(x, y) in &artifact.points {
        canvas.circle(x_scale.at(x), y_scale.at(y), 3.0, PALETTE[0]);
    }
    let line: Vec<(f64, f64)> = artifact
        .line
        .iter()
        .map(|&(x, y)| (x_scale.at(x), y_scale.at(y)))
        .collect();
    canvas.polyline(&line, PALETTE[3], 2.0);
    canvas.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn tick_labels_are_compact() {
        assert_eq!(tick_label(0.0), "0");
        assert_eq!(tick_label(2.5), "2.5");
        assert_eq!(tick_label(10.0), "10");
    }

    #[test]
    fn a_single_full_slice_renders_as_a_circle() {
        let artifact = PieChartArtifact {
            label_column: "kind".to_owned(),
            value_column: "count".to_owned(),
            slices: vec![crate::PieSlice {
                label: "all".to_owned(),
                value: 10.0,
                fraction: 1.0,
            }],
        };
        let svg = render_pie(&artifact);
        assert!(svg.contains("<circle"));
    }
}
