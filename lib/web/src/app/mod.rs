use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Form as MultiForm;
use serde::Deserialize;

use sparql_analytics_client::validate_query;
use sparql_analytics_model::{
    catalog, ChartKind, ExportFormat, RegressionKind, RegressionOutcome, RegressionRequest,
    ViewSelection,
};

use crate::error::ServerError;
use crate::state::{AppState, SESSION_COOKIE};

mod html;

pub fn create_app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handle_page))
        .route("/query", post(handle_query))
        .route("/view", get(handle_view))
        .route("/regression", post(handle_regression))
        .route("/export", get(handle_export))
}

#[derive(Debug, Deserialize)]
struct PageParams {
    /// Template to load into the query editor, by catalog name.
    template: Option<String>,
}

async fn handle_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<PageParams>,
) -> (CookieJar, Html<String>) {
    let (jar, session_id) = state.ensure_session(jar);
    if let Some(name) = params.template {
        state.with_session(&session_id, |session| {
            match catalog().iter().find(|t| t.name == name) {
                Some(template) => {
                    session.template = template.name.to_owned();
                    session.query_text = template.query.to_owned();
                }
                None => session.set_notice(format!("Unknown query template: {name}")),
            }
        });
    }
    let (session, notice) = state.with_session(&session_id, |session| {
        let notice = session.take_notice();
        (session.clone(), notice)
    });
    let page = html::page(&session, notice, state.page_size);
    (jar, Html(page))
}

#[derive(Debug, Deserialize)]
struct QueryForm {
    endpoint: String,
    query: String,
}

async fn handle_query(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<QueryForm>,
) -> (CookieJar, Redirect) {
    let (jar, session_id) = state.ensure_session(jar);
    state.with_session(&session_id, |session| {
        session.endpoint = form.endpoint.trim().to_owned();
        session.query_text = form.query.clone();
    });

    if form.endpoint.trim().is_empty() {
        state.with_session(&session_id, |session| {
            session.set_notice("Please provide a SPARQL endpoint.");
        });
        return (jar, Redirect::to("/app"));
    }
    if let Err(error) = validate_query(&form.query) {
        // Surfaced inline; the query is not sent.
        state.with_session(&session_id, |session| {
            session.set_notice(format!(
                "The SPARQL query seems to be invalid, please check the syntax ({error})."
            ));
        });
        return (jar, Redirect::to("/app"));
    }

    state.with_session(&session_id, |session| session.begin_query());
    let result = state
        .client
        .execute(form.endpoint.trim(), &form.query)
        .await;
    state.with_session(&session_id, |session| session.finish_query(result));
    (jar, Redirect::to("/app"))
}

#[derive(Debug, Deserialize)]
struct ViewParams {
    kind: Option<String>,
    x: Option<String>,
    y: Option<String>,
    value: Option<String>,
    color: Option<String>,
    page: Option<usize>,
}

/// Empty form selections come in as empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn handle_view(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<ViewParams>,
) -> Result<(CookieJar, Redirect), ServerError> {
    let (jar, session_id) = state.ensure_session(jar);
    let kind = match params.kind {
        Some(raw) => raw
            .parse::<ChartKind>()
            .map_err(|e| ServerError::BadRequest(e.to_string()))?,
        None => state.session_snapshot(&session_id).view.kind,
    };
    state.with_session(&session_id, |session| {
        session.view = ViewSelection {
            kind,
            x_column: non_empty(params.x),
            y_column: non_empty(params.y),
            value_column: non_empty(params.value),
            color: non_empty(params.color),
        };
        if let Some(page) = params.page {
            session.page = page.max(1);
        }
    });
    Ok((jar, Redirect::to("/app")))
}

#[derive(Debug, Deserialize)]
struct RegressionForm {
    dependent: String,
    #[serde(default)]
    independents: Vec<String>,
    kind: String,
}

async fn handle_regression(
    State(state): State<AppState>,
    jar: CookieJar,
    MultiForm(form): MultiForm<RegressionForm>,
) -> Result<(CookieJar, Redirect), ServerError> {
    let (jar, session_id) = state.ensure_session(jar);
    let kind = form
        .kind
        .parse::<RegressionKind>()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;
    let request = RegressionRequest {
        dependent: form.dependent,
        independents: form.independents,
        kind,
    };

    let session = state.session_snapshot(&session_id);
    let Some(result) = session.result() else {
        state.with_session(&session_id, |session| {
            session.set_notice("Run a query before fitting a regression.");
        });
        return Ok((jar, Redirect::to("/app")));
    };

    let outcome = match sparql_analytics_regression::fit(result, &request) {
        Ok(model) => RegressionOutcome {
            summary_text: model.summary(),
            fitted_line: model.fitted_line(),
            error: None,
        },
        Err(error) => RegressionOutcome::failed(error.to_string()),
    };
    state.with_session(&session_id, |session| {
        session.regression_request = Some(request);
        session.regression = Some(outcome);
    });
    Ok((jar, Redirect::to("/app")))
}

async fn handle_export(
    State(state): State<AppState>,
    format: ExportFormat,
    jar: CookieJar,
) -> Result<Response, ServerError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Err(ServerError::NoResults);
    };
    let session = state.session_snapshot(cookie.value());
    let Some(result) = session.result() else {
        return Err(ServerError::NoResults);
    };

    let payload = sparql_analytics_export::export(result, format).map_err(|error| match error {
        sparql_analytics_export::ExportError::NoColumns => {
            ServerError::DataShape(error.to_string())
        }
        other => ServerError::Internal(other.into()),
    })?;
    tracing::info!(format = %format, bytes = payload.bytes.len(), "export download");

    let disposition = format!("attachment; filename=\"{}\"", payload.file_name);
    Ok((
        [
            (CONTENT_TYPE, payload.media_type.to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        payload.bytes,
    )
        .into_response())
}
