//! Query executor for SPARQL Analytics.
//!
//! Sends a query string to a remote endpoint, asks for the standard SPARQL
//! results JSON and normalizes the response into a flat table of strings.
//! All transport is delegated to [`reqwest`]; parsing to [`sparesults`].

use oxrdf::Term;
use sparesults::{QueryResultsFormat, QueryResultsParser, ReaderQueryResultsParserOutput};
use std::time::Instant;
use url::Url;

use sparql_analytics_model::QueryResult;

mod error;

pub use error::ClientError;

/// Keywords every accepted query has to contain, verbatim.
const REQUIRED_KEYWORDS: [&str; 4] = ["SELECT", "WHERE", "{", "}"];

/// Shallow plausibility check applied before a query is dispatched.
///
/// Known weakness, kept from the original front-end: this accepts plenty of
/// invalid queries and rejects valid non-SELECT forms such as `ASK` or
/// `CONSTRUCT`. It is a guard against obviously empty or truncated input,
/// not a parser.
pub fn validate_query(query: &str) -> Result<(), ClientError> {
    for keyword in REQUIRED_KEYWORDS {
        if !query.contains(keyword) {
            return Err(ClientError::InvalidQuery(format!(
                "missing `{keyword}`"
            )));
        }
    }
    Ok(())
}

/// Thin wrapper around a [`reqwest::Client`] configured for SPARQL requests.
///
/// Deliberately no overall request timeout: the interaction model is one
/// blocking request per user action, and a hung endpoint blocks exactly that
/// interaction.
#[derive(Debug, Clone, Default)]
pub struct SparqlClient {
    http: reqwest::Client,
}

impl SparqlClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes `query` against `endpoint` and folds every failure into the
    /// returned [`QueryResult`]; this never returns an `Err`.
    ///
    /// The duration spans from just before dispatch until the response body
    /// was fully materialized, on the success and the failure path alike.
    pub async fn execute(&self, endpoint: &str, query: &str) -> QueryResult {
        let started = Instant::now();
        match self.try_execute(endpoint, query).await {
            Ok((columns, rows)) => {
                let duration = started.elapsed();
                tracing::info!(
                    rows = rows.len(),
                    ?duration,
                    "query executed successfully"
                );
                QueryResult::ok(columns, rows, duration)
            }
            Err(error) => {
                tracing::warn!(%error, "query execution failed");
                QueryResult::failed(error.to_string(), started.elapsed())
            }
        }
    }

    async fn try_execute(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<(Vec<String>, Vec<Vec<String>>), ClientError> {
        let endpoint = Url::parse(endpoint)?;
        let response = self
            .http
            .post(endpoint)
            .header(reqwest::header::ACCEPT, "application/sparql-results+json")
            .form(&[("query", query)])
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        parse_results(&body)
    }
}

/// Parses a SPARQL results JSON document into a column header and one row of
/// strings per solution.
///
/// Columns come from `head.vars` in document order. A variable left unbound
/// in a solution becomes the empty string, so every row has exactly one
/// entry per column.
pub fn parse_results(body: &[u8]) -> Result<(Vec<String>, Vec<Vec<String>>), ClientError> {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Json);
    match parser.for_reader(body)? {
        ReaderQueryResultsParserOutput::Solutions(solutions) => {
            let variables = solutions.variables().to_vec();
            let columns = variables
                .iter()
                .map(|v| v.as_str().to_owned())
                .collect::<Vec<_>>();
            let mut rows = Vec::new();
            for solution in solutions {
                let solution = solution?;
                let row = variables
                    .iter()
                    .map(|variable| {
                        solution
                            .get(variable.as_str())
                            .map(term_value)
                            .unwrap_or_default()
                    })
                    .collect::<Vec<_>>();
                rows.push(row);
            }
            Ok((columns, rows))
        }
        ReaderQueryResultsParserOutput::Boolean(_) => Err(ClientError::UnexpectedResults),
    }
}

/// Flattens an RDF term to the plain value shown in the result table.
fn term_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_owned(),
        Term::BlankNode(node) => node.as_str().to_owned(),
        Term::Literal(literal) => literal.value().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_standard_results_shape() {
        let body = br#"{"head":{"vars":["a","b"]},"results":{"bindings":[{"a":{"type":"literal","value":"1"},"b":{"type":"literal","value":"2"}}]}}"#;
        let (columns, rows) = parse_results(body).unwrap();
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(rows, vec![vec!["1".to_owned(), "2".to_owned()]]);
    }

    #[test]
    fn unbound_variables_become_empty_strings() {
        let body = br#"{"head":{"vars":["s","o"]},"results":{"bindings":[
            {"s":{"type":"uri","value":"http://example.com/a"}},
            {"s":{"type":"uri","value":"http://example.com/b"},"o":{"type":"literal","value":"x"}}
        ]}}"#;
        let (columns, rows) = parse_results(body).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["http://example.com/a".to_owned(), String::new()]);
        assert_eq!(rows[1][1], "x");
    }

    #[test]
    fn zero_bindings_still_yield_the_header() {
        let body = br#"{"head":{"vars":["a","b"]},"results":{"bindings":[]}}"#;
        let (columns, rows) = parse_results(body).unwrap();
        assert_eq!(columns, vec!["a", "b"]);
        assert!(rows.is_empty());
    }

    #[test]
    fn boolean_results_are_rejected() {
        let body = br#"{"head":{},"boolean":true}"#;
        assert!(matches!(
            parse_results(body),
            Err(ClientError::UnexpectedResults)
        ));
    }

    #[test]
    fn malformed_bodies_are_an_error() {
        assert!(parse_results(b"<html>not json</html>").is_err());
    }

    #[test]
    fn shallow_validation_accepts_a_plain_select() {
        validate_query("SELECT ?s WHERE { ?s ?p ?o }").unwrap();
    }

    #[test]
    fn shallow_validation_rejects_ask_queries() {
        // Documented weakness: ASK is valid SPARQL but fails the heuristic.
        assert!(validate_query("ASK { ?s ?p ?o }").is_err());
        assert!(validate_query("").is_err());
    }

    #[tokio::test]
    async fn a_bad_endpoint_folds_into_a_failed_result() {
        let client = SparqlClient::new();
        let result = client
            .execute("not a url", "SELECT ?s WHERE { ?s ?p ?o }")
            .await;
        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(result.rows.is_empty());
    }
}
