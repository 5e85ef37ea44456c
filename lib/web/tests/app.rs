//! End-to-end tests against the in-process application.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use axum_test::TestServer;
use sparql_analytics_web::{create_app, ServerConfig};

fn test_server() -> TestServer {
    let app = create_app(&ServerConfig::default());
    TestServer::builder()
        .save_cookies()
        .build(app)
        .expect("test server")
}

#[tokio::test]
async fn root_redirects_to_the_app() {
    let server = test_server();
    let response = server.get("/").await;
    response.assert_status(StatusCode::PERMANENT_REDIRECT);
}

#[tokio::test]
async fn a_fresh_session_gets_the_query_form() {
    let server = test_server();
    let response = server.get("/app").await;
    response.assert_status_ok();
    let text = response.text();
    assert!(text.contains("SPARQL Endpoint"));
    assert!(text.contains("Execute Query"));
}

#[tokio::test]
async fn an_invalid_query_is_rejected_inline_and_never_sent() {
    let server = test_server();
    let response = server
        .post("/app/query")
        .form(&[
            ("endpoint", "http://localhost:1/sparql"),
            ("query", "this is not sparql"),
        ])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);

    let page = server.get("/app").await.text();
    assert!(page.contains("seems to be invalid"));
}

#[tokio::test]
async fn a_missing_endpoint_is_reported() {
    let server = test_server();
    server
        .post("/app/query")
        .form(&[("endpoint", ""), ("query", "SELECT * WHERE { ?s ?p ?o }")])
        .await
        .assert_status(StatusCode::SEE_OTHER);
    let page = server.get("/app").await.text();
    assert!(page.contains("Please provide a SPARQL endpoint."));
}

#[tokio::test]
async fn export_without_results_is_a_loud_404() {
    let server = test_server();
    let response = server.get("/app/export?format=csv").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn an_unknown_export_format_is_a_bad_request() {
    let server = test_server();
    let response = server.get("/app/export?format=pdf").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn an_unknown_view_kind_is_a_bad_request() {
    let server = test_server();
    let response = server.get("/app/view?kind=hologram").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn loading_a_template_fills_the_editor() {
    let server = test_server();
    server
        .get("/app?template=Count%20triples")
        .await
        .assert_status_ok();
    let page = server.get("/app").await.text();
    assert!(page.contains("COUNT(*)"));
}

/// Fixed SPARQL results JSON served by the mock endpoint.
const MOCK_BODY: &str = r#"{"head":{"vars":["a","b"]},"results":{"bindings":[{"a":{"type":"literal","value":"1"},"b":{"type":"literal","value":"2"}}]}}"#;

async fn mock_sparql() -> impl IntoResponse {
    (
        [("content-type", "application/sparql-results+json")],
        MOCK_BODY,
    )
}

#[tokio::test]
async fn querying_a_mock_endpoint_renders_results_and_exports_them() {
    let endpoint_app = Router::new().route("/sparql", post(mock_sparql));
    let endpoint = TestServer::builder()
        .http_transport()
        .build(endpoint_app)
        .expect("mock endpoint");
    let endpoint_url = format!(
        "{}sparql",
        endpoint.server_address().expect("mock endpoint address")
    );

    let server = test_server();
    server
        .post("/app/query")
        .form(&[
            ("endpoint", endpoint_url.as_str()),
            ("query", "SELECT ?a ?b WHERE { ?a ?p ?b }"),
        ])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let page = server.get("/app").await.text();
    assert!(page.contains("retrieved 1 results"));
    assert!(page.contains("<th>a</th>"));

    let csv = server.get("/app/export?format=csv").await;
    csv.assert_status_ok();
    assert_eq!(csv.text(), "a,b\n1,2\n");

    // Switching the view must not re-run the query; the mock would answer
    // again, but the stored result stays the same object.
    server
        .get("/app/view?kind=bar&x=a&y=b")
        .await
        .assert_status(StatusCode::SEE_OTHER);
    let page = server.get("/app").await.text();
    assert!(page.contains("<svg"));
}
