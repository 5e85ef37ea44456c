use std::fmt;
use std::str::FromStr;

/// Download formats offered for a query result.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    pub const ALL: [Self; 3] = [Self::Csv, Self::Json, Self::Excel];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Excel => "xlsx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON",
            Self::Excel => "Excel",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// File name offered to the browser for the download.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Csv => "query_results.csv",
            Self::Json => "query_results.json",
            Self::Excel => "query_results.xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown export format: {0}")]
pub struct ExportFormatParseError(String);

impl FromStr for ExportFormat {
    type Err = ExportFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xlsx" | "excel" => Ok(Self::Excel),
            other => Err(ExportFormatParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_match_formats() {
        assert_eq!(ExportFormat::Csv.file_name(), "query_results.csv");
        assert_eq!(ExportFormat::Json.file_name(), "query_results.json");
        assert_eq!(ExportFormat::Excel.file_name(), "query_results.xlsx");
    }

    #[test]
    fn excel_accepts_both_spellings() {
        assert_eq!("excel".parse::<ExportFormat>().ok(), Some(ExportFormat::Excel));
        assert_eq!("xlsx".parse::<ExportFormat>().ok(), Some(ExportFormat::Excel));
    }
}
