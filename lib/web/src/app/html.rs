//! Server-rendered HTML for the single-page shell.
//!
//! Plain string building; every user-controlled value goes through
//! [`escape`] before it lands in markup.

use std::fmt::Write;

use sparql_analytics_model::{
    catalog, ChartKind, ExportFormat, Pager, QueryResult, RegressionKind, ViewSelection,
};
use sparql_analytics_viz::{FitPlotArtifact, RenderOutcome};

use crate::session::{QueryPhase, SessionState};

const INTRO: &str = "Execute SPARQL queries against an RDF endpoint, visualize the \
results as tables or charts, run a regression over result columns and export \
everything to CSV, JSON or Excel.";

pub(crate) fn page(session: &SessionState, notice: Option<String>, page_size: usize) -> String {
    let mut out = String::with_capacity(8 * 1024);
    out.push_str(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>SPARQL Analytics</title><style>\
         body{font-family:sans-serif;margin:2rem auto;max-width:60rem;padding:0 1rem;color:#222}\
         textarea{width:100%;font-family:monospace}\
         input[type=text],select{margin:0.2rem 0}\
         table{border-collapse:collapse;margin:1rem 0}\
         th,td{border:1px solid #ccc;padding:0.3rem 0.6rem;text-align:left}\
         th{background:#f0f0f0}\
         .notice{background:#fff3cd;border:1px solid #e0c868;padding:0.6rem;margin:1rem 0}\
         .error{background:#f8d7da;border:1px solid #d9a0a7;padding:0.6rem;margin:1rem 0}\
         .success{background:#d4edda;border:1px solid #9fcfab;padding:0.6rem;margin:1rem 0}\
         .muted{color:#666}\
         pre{background:#f6f6f6;padding:0.8rem;overflow-x:auto}\
         </style></head><body>",
    );
    out.push_str("<h1>SPARQL Editor &amp; Querier</h1>");
    let _ = write!(out, "<p class=\"muted\">{}</p>", escape(INTRO));

    if let Some(notice) = notice {
        let _ = write!(out, "<div class=\"notice\">{}</div>", escape(&notice));
    }

    query_form(&mut out, session);
    match &session.phase {
        QueryPhase::NoQuery => {}
        QueryPhase::QueryRunning => {
            out.push_str("<p class=\"muted\">Query running&hellip;</p>");
        }
        QueryPhase::QueryFailed { error, .. } => {
            let _ = write!(
                out,
                "<div class=\"error\">An error occurred during query execution: {}</div>",
                escape(error)
            );
        }
        QueryPhase::QuerySucceeded { result } => {
            let _ = write!(
                out,
                "<div class=\"success\">Query executed successfully, retrieved {} results in {:.2} seconds.</div>",
                result.rows.len(),
                result.duration.as_secs_f64()
            );
            if result.is_empty() {
                out.push_str("<p>No results found.</p>");
            } else {
                result_section(&mut out, session, result, page_size);
            }
        }
    }

    out.push_str("</body></html>");
    out
}

fn query_form(out: &mut String, session: &SessionState) {
    out.push_str("<form method=\"get\" action=\"/app\">");
    out.push_str("<label>Query Templates: <select name=\"template\">");
    for template in catalog() {
        let _ = write!(
            out,
            "<option value=\"{name}\"{selected}>{name}</option>",
            name = escape(template.name),
            selected = selected(session.template == template.name),
        );
    }
    out.push_str("</select></label> <button type=\"submit\">Load template</button></form>");

    out.push_str("<form method=\"post\" action=\"/app/query\">");
    let _ = write!(
        out,
        "<label>SPARQL Endpoint: <input type=\"text\" name=\"endpoint\" size=\"60\" value=\"{}\" placeholder=\"https://example.org/sparql\"></label><br>",
        escape(&session.endpoint)
    );
    let _ = write!(
        out,
        "<label>SPARQL Query:<br><textarea name=\"query\" rows=\"12\">{}</textarea></label><br>",
        escape(&session.query_text)
    );
    out.push_str("<button type=\"submit\">Execute Query</button></form>");
}

fn result_section(out: &mut String, session: &SessionState, result: &QueryResult, page_size: usize) {
    view_form(out, &session.view, result);
    match session.view.kind {
        ChartKind::Table => table_view(out, result, session.page, page_size),
        _ => match sparql_analytics_viz::chart(result, &session.view) {
            RenderOutcome::Chart(svg) => out.push_str(&svg),
            RenderOutcome::Advisory(message) => {
                let _ = write!(out, "<div class=\"notice\">{}</div>", escape(&message));
            }
        },
    }
    regression_section(out, session, result);
    export_links(out);
}

fn view_form(out: &mut String, view: &ViewSelection, result: &QueryResult) {
    out.push_str("<h2>Visualization</h2><form method=\"get\" action=\"/app/view\">");
    out.push_str("<label>Type: <select name=\"kind\">");
    for kind in ChartKind::ALL {
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            kind.as_str(),
            selected(view.kind == kind),
            kind.label()
        );
    }
    out.push_str("</select></label> ");
    column_select(out, "x", "X axis", result, view.x_column.as_deref());
    column_select(out, "y", "Y axis", result, view.y_column.as_deref());
    column_select(out, "value", "Pie values", result, view.value_column.as_deref());
    let _ = write!(
        out,
        "<label>Series color: <input type=\"text\" name=\"color\" size=\"8\" value=\"{}\" placeholder=\"#1f77b4\"></label> ",
        escape(view.color.as_deref().unwrap_or(""))
    );
    out.push_str("<button type=\"submit\">Apply</button></form>");
}

fn column_select(
    out: &mut String,
    name: &str,
    label: &str,
    result: &QueryResult,
    current: Option<&str>,
) {
    let _ = write!(out, "<label>{label}: <select name=\"{name}\">");
    out.push_str("<option value=\"\"></option>");
    for column in &result.columns {
        let _ = write!(
            out,
            "<option value=\"{col}\"{sel}>{col}</option>",
            col = escape(column),
            sel = selected(current == Some(column.as_str())),
        );
    }
    out.push_str("</select></label> ");
}

fn table_view(out: &mut String, result: &QueryResult, page: usize, page_size: usize) {
    let pager = Pager {
        page,
        page_size: page_size.max(1),
    }
    .clamped(result.rows.len());
    let total_pages = pager.total_pages(result.rows.len());

    out.push_str("<table><thead><tr>");
    for column in &result.columns {
        let _ = write!(out, "<th>{}</th>", escape(column));
    }
    out.push_str("</tr></thead><tbody>");
    for row in &result.rows[pager.range(result.rows.len())] {
        out.push_str("<tr>");
        for value in row {
            let _ = write!(out, "<td>{}</td>", escape(value));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");

    if total_pages > 1 {
        let prev = pager.prev().page;
        let next = pager.next(result.rows.len()).page;
        let _ = write!(
            out,
            "<p><a href=\"/app/view?kind=table&amp;page={prev}\">&laquo; Previous</a> \
             Page {} of {total_pages} \
             <a href=\"/app/view?kind=table&amp;page={next}\">Next &raquo;</a></p>",
            pager.page
        );
    }
}

fn regression_section(out: &mut String, session: &SessionState, result: &QueryResult) {
    out.push_str("<h2>Regression</h2><form method=\"post\" action=\"/app/regression\">");
    let request = session.regression_request.as_ref();
    let dependent = request.map(|r| r.dependent.as_str());
    column_select(out, "dependent", "Dependent", result, dependent);
    out.push_str("<label>Independents: <select name=\"independents\" multiple size=\"3\">");
    for column in &result.columns {
        let chosen = request.is_some_and(|r| r.independents.iter().any(|c| c == column));
        let _ = write!(
            out,
            "<option value=\"{col}\"{sel}>{col}</option>",
            col = escape(column),
            sel = selected(chosen),
        );
    }
    out.push_str("</select></label> <label>Model: <select name=\"kind\">");
    let current_kind = request.map_or(RegressionKind::Linear, |r| r.kind);
    for kind in RegressionKind::ALL {
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            kind.as_str(),
            selected(current_kind == kind),
            kind.label()
        );
    }
    out.push_str("</select></label> <button type=\"submit\">Fit model</button></form>");

    let Some(outcome) = &session.regression else {
        return;
    };
    if let Some(error) = &outcome.error {
        let _ = write!(out, "<div class=\"error\">{}</div>", escape(error));
        return;
    }
    let _ = write!(out, "<pre>{}</pre>", escape(&outcome.summary_text));
    if let (Some(line), Some(request)) = (&outcome.fitted_line, request) {
        if let Some(artifact) = fit_artifact(result, request, line) {
            if let RenderOutcome::Chart(svg) = sparql_analytics_viz::fit_plot(&artifact) {
                out.push_str(&svg);
            }
        }
    }
}

/// Observed (x, y) pairs for the fitted-line plot; only the
/// single-independent case has one x axis to plot against.
fn fit_artifact(
    result: &QueryResult,
    request: &sparql_analytics_model::RegressionRequest,
    line: &[(f64, f64)],
) -> Option<FitPlotArtifact> {
    let [independent] = request.independents.as_slice() else {
        return None;
    };
    let x_idx = result.column_index(independent)?;
    let y_idx = result.column_index(&request.dependent)?;
    let points = result
        .rows
        .iter()
        .filter_map(|row| {
            let x = row[x_idx].trim().parse::<f64>().ok()?;
            let y = row[y_idx].trim().parse::<f64>().ok()?;
            (x.is_finite() && y.is_finite()).then_some((x, y))
        })
        .collect::<Vec<_>>();
    Some(FitPlotArtifact {
        x_label: independent.clone(),
        y_label: request.dependent.clone(),
        points,
        line: line.to_vec(),
    })
}

fn export_links(out: &mut String) {
    out.push_str("<h2>Export</h2><p>");
    for format in ExportFormat::ALL {
        let _ = write!(
            out,
            "<a href=\"/app/export?format={}\">Download as {}</a> ",
            format.as_str(),
            format.label()
        );
    }
    out.push_str("</p>");
}

fn selected(is_selected: bool) -> &'static str {
    if is_selected {
        " selected"
    } else {
        ""
    }
}

pub(crate) fn escape(value: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_analytics_model::QueryResult;
    use std::time::Duration;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(escape("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
    }

    #[test]
    fn a_fresh_session_renders_the_form_only() {
        let session = SessionState::default();
        let page = page(&session, None, 25);
        assert!(page.contains("Execute Query"));
        assert!(!page.contains("Download as CSV"));
    }

    #[test]
    fn a_logistic_fit_for_the_regression_plot_is_skipped_without_numeric_rows() {
        let result = QueryResult::ok(
            vec!["x".to_owned(), "y".to_owned()],
            vec![vec!["a".to_owned(), "b".to_owned()]],
            Duration::ZERO,
        );
        let request = sparql_analytics_model::RegressionRequest {
            dependent: "y".to_owned(),
            independents: vec!["x".to_owned()],
            kind: RegressionKind::Logistic,
        };
        let artifact = fit_artifact(&result, &request, &[(0.0, 0.5)]).unwrap();
        assert!(artifact.points.is_empty());
    }

    #[test]
    fn a_stored_result_renders_table_and_export_links() {
        let mut session = SessionState::default();
        session.begin_query();
        session.finish_query(QueryResult::ok(
            vec!["a".to_owned()],
            vec![vec!["<script>".to_owned()]],
            Duration::from_millis(3),
        ));
        let html = page(&session, None, 25);
        assert!(html.contains("Download as CSV"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
