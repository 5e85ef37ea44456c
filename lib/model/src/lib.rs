//! Shared data model for SPARQL Analytics.
//!
//! Everything in here is plain data passed between the query executor, the
//! renderer, the regression helper, the exporters and the web shell. None of
//! these types own a connection or perform I/O.

mod export;
mod pager;
mod regression;
mod result;
mod templates;
mod view;

pub use export::{ExportFormat, ExportFormatParseError};
pub use pager::Pager;
pub use regression::{RegressionKind, RegressionKindParseError, RegressionOutcome, RegressionRequest};
pub use result::QueryResult;
pub use templates::{catalog, QueryTemplate};
pub use view::{ChartKind, ChartKindParseError, ViewSelection};
