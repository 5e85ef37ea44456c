use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which family the regression helper should fit.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum RegressionKind {
    #[default]
    Linear,
    Logistic,
}

impl RegressionKind {
    pub const ALL: [Self; 2] = [Self::Linear, Self::Logistic];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Logistic => "logistic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "Linear (OLS)",
            Self::Logistic => "Logistic",
        }
    }
}

impl fmt::Display for RegressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown regression kind: {0}")]
pub struct RegressionKindParseError(String);

impl FromStr for RegressionKind {
    type Err = RegressionKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "logistic" => Ok(Self::Logistic),
            other => Err(RegressionKindParseError(other.to_owned())),
        }
    }
}

/// Column selection for one regression run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegressionRequest {
    pub dependent: String,
    pub independents: Vec<String>,
    pub kind: RegressionKind,
}

/// What the shell keeps around after a regression run.
///
/// A failed fit is still an outcome: `error` carries the message and
/// `summary_text` stays empty. The UI never sees a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionOutcome {
    pub summary_text: String,
    /// Paired (x, y) points of the fitted line, only available for the
    /// single-independent-variable case.
    pub fitted_line: Option<Vec<(f64, f64)>>,
    pub error: Option<String>,
}

impl RegressionOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            summary_text: String::new(),
            fitted_line: None,
            error: Some(error.into()),
        }
    }
}
