use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Content negotiation failed: {0}")]
    ContentNegotiation(String),
    #[error("No query results available; run a query first")]
    NoResults,
    #[error("Result data does not fit the request: {0}")]
    DataShape(String),
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::ContentNegotiation(_) => StatusCode::NOT_ACCEPTABLE,
            ServerError::NoResults => StatusCode::NOT_FOUND,
            ServerError::DataShape(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
