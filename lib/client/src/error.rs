/// Everything that can go wrong between a submitted query string and a
/// normalized result table.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("the query does not look like a SELECT query: {0}")]
    InvalidQuery(String),
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not parse query results: {0}")]
    Results(#[from] sparesults::QueryResultsParseError),
    #[error("the endpoint returned a boolean result, expected solutions")]
    UnexpectedResults,
}
