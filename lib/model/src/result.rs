use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a single query submission.
///
/// Invariant: every row has exactly `columns.len()` entries. The struct is
/// built once by the executor and never mutated afterwards; the web shell
/// keeps the latest one per session until the next submission replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub success: bool,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub error: Option<String>,
    /// Wall-clock time from dispatch until the response was fully read.
    pub duration: Duration,
}

impl QueryResult {
    /// A successful result with the given header and rows.
    pub fn ok(columns: Vec<String>, rows: Vec<Vec<String>>, duration: Duration) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self {
            success: true,
            columns,
            rows,
            error: None,
            duration,
        }
    }

    /// A failed result carrying the raw error text and no rows.
    pub fn failed(error: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: false,
            columns: Vec::new(),
            rows: Vec::new(),
            error: Some(error.into()),
            duration,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[index].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_index_respects_order() {
        let result = QueryResult::ok(
            vec!["a".to_owned(), "b".to_owned()],
            vec![vec!["1".to_owned(), "2".to_owned()]],
            Duration::from_millis(5),
        );
        assert_eq!(result.column_index("a"), Some(0));
        assert_eq!(result.column_index("b"), Some(1));
        assert_eq!(result.column_index("c"), None);
    }

    #[test]
    fn failed_result_has_no_rows() {
        let result = QueryResult::failed("connection refused", Duration::ZERO);
        assert!(!result.success);
        assert!(result.columns.is_empty());
        assert!(result.rows.is_empty());
        assert_eq!(result.error.as_deref(), Some("connection refused"));
    }
}
