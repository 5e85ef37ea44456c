use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use headers::HeaderMapExt;
use headers_accept::Accept;
use mediatype::names::{APPLICATION, CSV, JSON, TEXT};
use mediatype::{MediaType, Name};
use sparql_analytics_model::ExportFormat;

use crate::error::ServerError;
use crate::state::AppState;

const XLSX_SUBTYPE: Name<'static> =
    Name::new_unchecked("vnd.openxmlformats-officedocument.spreadsheetml.sheet");

/// Picks the export format for a download request.
///
/// An explicit `format` query parameter always wins; without one the
/// `Accept` header is negotiated against the three offered media types,
/// and a request without either falls back to CSV.
impl FromRequestParts<AppState> for ExportFormat {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(query) = parts.uri.query() {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                if key == "format" {
                    return value
                        .parse::<Self>()
                        .map_err(|e| ServerError::BadRequest(e.to_string()));
                }
            }
        }

        static MEDIA_TYPES: [MediaType<'_>; 3] = [
            MediaType::new(TEXT, CSV),
            MediaType::new(APPLICATION, JSON),
            MediaType::new(APPLICATION, XLSX_SUBTYPE),
        ];

        let Some(accept) = parts.headers.typed_get::<Accept>() else {
            return Ok(Self::Csv);
        };
        match accept.negotiate(&MEDIA_TYPES) {
            Some(media_type) => Ok(format_for(media_type)),
            None => Err(ServerError::ContentNegotiation(
                "the accept header does not allow text/csv, application/json or the xlsx media type"
                    .to_owned(),
            )),
        }
    }
}

fn format_for(media_type: &MediaType<'_>) -> ExportFormat {
    if media_type.subty == CSV {
        ExportFormat::Csv
    } else if media_type.subty == JSON {
        ExportFormat::Json
    } else {
        ExportFormat::Excel
    }
}
