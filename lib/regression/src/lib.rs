//! Regression helper for SPARQL Analytics.
//!
//! Takes the stringly-typed result table, coerces the selected columns to
//! numbers, drops rows with missing values and fits either an ordinary
//! least squares or a binomial (logistic) model with an implicit intercept.
//! Every failure mode is a [`RegressionError`], never a panic.

use sparql_analytics_model::{QueryResult, RegressionKind, RegressionRequest};
use std::fmt::Write;

mod logit;
mod ols;

/// Points on the fitted line for the single-regressor case.
const FITTED_LINE_POINTS: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum RegressionError {
    #[error("column `{0}` is not part of the result")]
    UnknownColumn(String),
    #[error("no independent columns selected")]
    NoIndependents,
    #[error("not enough data to fit after cleaning: {usable} usable rows")]
    NotEnoughData { usable: usize },
    #[error("dependent column `{column}` has {levels} distinct levels, logistic regression needs exactly 2")]
    NonBinaryDependent { column: String, levels: usize },
    #[error("design matrix is singular, the selected columns are collinear")]
    Singular,
    #[error("IRLS did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },
}

/// One fitted model term.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    /// t value for linear fits, z value for logistic fits.
    pub statistic: f64,
}

/// Fit statistics, per model family.
#[derive(Debug, Clone, PartialEq)]
pub enum FitStatistics {
    Linear {
        r_squared: f64,
        adj_r_squared: f64,
    },
    Logistic {
        log_likelihood: f64,
        /// McFadden pseudo R-squared.
        pseudo_r_squared: f64,
        iterations: usize,
    },
}

/// A fitted regression model plus everything the UI needs to present it.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub kind: RegressionKind,
    pub dependent: String,
    /// Intercept first, then one entry per independent column.
    pub coefficients: Vec<Coefficient>,
    pub n_obs: usize,
    pub dropped_rows: usize,
    pub stats: FitStatistics,
    /// Observed range of the regressor, single-independent case only.
    x_range: Option<(f64, f64)>,
}

impl FittedModel {
    /// Fixed-format text summary: a model header followed by one line per
    /// coefficient with estimate, standard error and test statistic.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        match &self.stats {
            FitStatistics::Linear {
                r_squared,
                adj_r_squared,
            } => {
                let _ = writeln!(out, "Linear regression (ordinary least squares)");
                let _ = writeln!(
                    out,
                    "Dependent: {}    Observations: {}    Dropped rows: {}",
                    self.dependent, self.n_obs, self.dropped_rows
                );
                let _ = writeln!(
                    out,
                    "R-squared: {r_squared:.4}    Adj. R-squared: {adj_r_squared:.4}"
                );
            }
            FitStatistics::Logistic {
                log_likelihood,
                pseudo_r_squared,
                iterations,
            } => {
                let _ = writeln!(out, "Logistic regression (binomial, logit link)");
                let _ = writeln!(
                    out,
                    "Dependent: {}    Observations: {}    Dropped rows: {}",
                    self.dependent, self.n_obs, self.dropped_rows
                );
                let _ = writeln!(
                    out,
                    "Log-likelihood: {log_likelihood:.4}    McFadden R-squared: {pseudo_r_squared:.4}    IRLS iterations: {iterations}"
                );
            }
        }
        let statistic = match self.stats {
            FitStatistics::Linear { .. } => "t value",
            FitStatistics::Logistic { .. } => "z value",
        };
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<20} {:>14} {:>14} {:>10}",
            "Term", "Estimate", "Std. Error", statistic
        );
        let _ = writeln!(out, "{}", "-".repeat(62));
        for c in &self.coefficients {
            let _ = writeln!(
                out,
                "{:<20} {:>14.6} {:>14.6} {:>10.3}",
                c.name, c.estimate, c.std_error, c.statistic
            );
        }
        out
    }

    /// Paired (x, y) points of the fitted line over the observed x range.
    ///
    /// Only defined when exactly one independent column was used; with more
    /// regressors there is no single line to draw.
    pub fn fitted_line(&self) -> Option<Vec<(f64, f64)>> {
        let (lo, hi) = self.x_range?;
        let intercept = self.coefficients.first()?.estimate;
        let slope = self.coefficients.get(1)?.estimate;
        let span = hi - lo;
        let points = (0..FITTED_LINE_POINTS)
            .map(|i| {
                let x = lo + span * i as f64 / (FITTED_LINE_POINTS - 1) as f64;
                let eta = intercept + slope * x;
                let y = match self.kind {
                    RegressionKind::Linear => eta,
                    RegressionKind::Logistic => logit::sigmoid(eta),
                };
                (x, y)
            })
            .collect();
        Some(points)
    }
}

/// Fits the requested model against the result table.
pub fn fit(
    result: &QueryResult,
    request: &RegressionRequest,
) -> Result<FittedModel, RegressionError> {
    let design = Design::build(result, request)?;
    match request.kind {
        RegressionKind::Linear => ols::fit(design),
        RegressionKind::Logistic => logit::fit(design),
    }
}

/// Parses one table cell as a number; anything unparsable is missing.
fn coerce(value: &str) -> Option<f64> {
    let parsed = value.trim().parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Cleaned design: y, row-major X without the intercept column, and the
/// bookkeeping the fitters and the summary need.
pub(crate) struct Design {
    pub(crate) dependent: String,
    pub(crate) names: Vec<String>,
    pub(crate) y: Vec<f64>,
    pub(crate) x: Vec<Vec<f64>>,
    pub(crate) dropped_rows: usize,
}

impl Design {
    fn build(result: &QueryResult, request: &RegressionRequest) -> Result<Self, RegressionError> {
        if request.independents.is_empty() {
            return Err(RegressionError::NoIndependents);
        }
        let dep_idx = result
            .column_index(&request.dependent)
            .ok_or_else(|| RegressionError::UnknownColumn(request.dependent.clone()))?;
        let indep_idx = request
            .independents
            .iter()
            .map(|name| {
                result
                    .column_index(name)
                    .ok_or_else(|| RegressionError::UnknownColumn(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let dep_values: Vec<Option<f64>> = match request.kind {
            RegressionKind::Linear => result
                .rows
                .iter()
                .map(|row| coerce(&row[dep_idx]))
                .collect(),
            RegressionKind::Logistic => encode_binary(result, dep_idx, &request.dependent)?,
        };

        let mut y = Vec::new();
        let mut x = Vec::new();
        let mut dropped_rows = 0usize;
        for (row, dep) in result.rows.iter().zip(dep_values) {
            let regressors = indep_idx
                .iter()
                .map(|&i| coerce(&row[i]))
                .collect::<Option<Vec<f64>>>();
            match (dep, regressors) {
                (Some(dep), Some(regressors)) => {
                    y.push(dep);
                    x.push(regressors);
                }
                _ => dropped_rows += 1,
            }
        }

        if y.len() < 2 {
            return Err(RegressionError::NotEnoughData { usable: y.len() });
        }
        Ok(Self {
            dependent: request.dependent.clone(),
            names: request.independents.clone(),
            y,
            x,
            dropped_rows,
        })
    }

    pub(crate) fn n(&self) -> usize {
        self.y.len()
    }

    /// Number of model parameters including the intercept.
    pub(crate) fn k(&self) -> usize {
        self.names.len() + 1
    }

    /// Range of the single regressor, if there is exactly one.
    pub(crate) fn x_range(&self) -> Option<(f64, f64)> {
        if self.names.len() != 1 {
            return None;
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for row in &self.x {
            lo = lo.min(row[0]);
            hi = hi.max(row[0]);
        }
        Some((lo, hi))
    }

    /// Coefficient names with the intercept prepended.
    pub(crate) fn term_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.k());
        names.push("(Intercept)".to_owned());
        names.extend(self.names.iter().cloned());
        names
    }
}

/// Maps the dependent column to categorical 0/1 codes for logistic fits.
///
/// Levels are the distinct non-empty cell values, coded in lexical order.
/// Cells that are empty after trimming count as missing. Anything other
/// than exactly two levels is an error.
fn encode_binary(
    result: &QueryResult,
    dep_idx: usize,
    column: &str,
) -> Result<Vec<Option<f64>>, RegressionError> {
    let mut levels: Vec<&str> = result
        .column_values(dep_idx)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    levels.sort_unstable();
    levels.dedup();
    if levels.len() != 2 {
        return Err(RegressionError::NonBinaryDependent {
            column: column.to_owned(),
            levels: levels.len(),
        });
    }
    let codes = result
        .column_values(dep_idx)
        .map(|value| {
            let value = value.trim();
            if value.is_empty() {
                None
            } else if value == levels[0] {
                Some(0.0)
            } else {
                Some(1.0)
            }
        })
        .collect();
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_analytics_model::QueryResult;
    use std::time::Duration;

    fn table(columns: &[&str], rows: &[&[&str]]) -> QueryResult {
        QueryResult::ok(
            columns.iter().map(|c| (*c).to_owned()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| (*v).to_owned()).collect())
                .collect(),
            Duration::ZERO,
        )
    }

    fn request(kind: RegressionKind) -> RegressionRequest {
        RegressionRequest {
            dependent: "y".to_owned(),
            independents: vec!["x".to_owned()],
            kind,
        }
    }

    #[test]
    fn perfect_linear_relation_recovers_slope_and_intercept() {
        let rows: Vec<Vec<String>> = (1..=10)
            .map(|x| vec![x.to_string(), (2 * x).to_string()])
            .collect();
        let result = QueryResult::ok(
            vec!["x".to_owned(), "y".to_owned()],
            rows,
            Duration::ZERO,
        );
        let model = fit(&result, &request(RegressionKind::Linear)).unwrap();
        assert!((model.coefficients[0].estimate).abs() < 1e-9, "intercept");
        assert!((model.coefficients[1].estimate - 2.0).abs() < 1e-9, "slope");
        match model.stats {
            FitStatistics::Linear { r_squared, .. } => assert!((r_squared - 1.0).abs() < 1e-9),
            FitStatistics::Logistic { .. } => panic!("wrong family"),
        }
    }

    #[test]
    fn non_numeric_rows_are_dropped_not_imputed() {
        let result = table(
            &["x", "y"],
            &[
                &["1", "2"],
                &["banana", "4"],
                &["3", ""],
                &["4", "8"],
                &["5", "10"],
            ],
        );
        let model = fit(&result, &request(RegressionKind::Linear)).unwrap();
        assert_eq!(model.n_obs, 3);
        assert_eq!(model.dropped_rows, 2);
        assert!((model.coefficients[1].estimate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn too_few_usable_rows_is_an_error_not_a_panic() {
        let result = table(&["x", "y"], &[&["1", "2"], &["oops", "4"]]);
        assert!(matches!(
            fit(&result, &request(RegressionKind::Linear)),
            Err(RegressionError::NotEnoughData { usable: 1 })
        ));
    }

    #[test]
    fn unknown_columns_are_reported_by_name() {
        let result = table(&["a"], &[&["1"], &["2"]]);
        let err = fit(&result, &request(RegressionKind::Linear)).unwrap_err();
        assert!(matches!(err, RegressionError::UnknownColumn(name) if name == "y"));
    }

    #[test]
    fn logistic_needs_a_binary_dependent() {
        let result = table(
            &["x", "y"],
            &[&["1", "a"], &["2", "b"], &["3", "c"], &["4", "a"]],
        );
        assert!(matches!(
            fit(&result, &request(RegressionKind::Logistic)),
            Err(RegressionError::NonBinaryDependent { levels: 3, .. })
        ));
    }

    #[test]
    fn logistic_separable_data_fits_and_predicts_the_levels() {
        let rows: Vec<Vec<String>> = (0..20)
            .map(|i| {
                let x = f64::from(i);
                // Noisy threshold at x = 10 keeps the fit away from
                // complete separation.
                let label = if (x + if i % 3 == 0 { 3.0 } else { 0.0 }) > 10.0 {
                    "yes"
                } else {
                    "no"
                };
                vec![x.to_string(), label.to_owned()]
            })
            .collect();
        let result = QueryResult::ok(
            vec!["x".to_owned(), "y".to_owned()],
            rows,
            Duration::ZERO,
        );
        let model = fit(&result, &request(RegressionKind::Logistic)).unwrap();
        // "no" < "yes" lexically, so a positive slope means larger x
        // pushes towards "yes".
        assert!(model.coefficients[1].estimate > 0.0);
        let line = model.fitted_line().unwrap();
        assert!(line.iter().all(|&(_, p)| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn summary_lists_every_term() {
        let rows: Vec<Vec<String>> = (1..=10)
            .map(|x| vec![x.to_string(), (3 * x + 1).to_string()])
            .collect();
        let result = QueryResult::ok(
            vec!["x".to_owned(), "y".to_owned()],
            rows,
            Duration::ZERO,
        );
        let model = fit(&result, &request(RegressionKind::Linear)).unwrap();
        let summary = model.summary();
        assert!(summary.contains("(Intercept)"));
        assert!(summary.contains('x'));
        assert!(summary.contains("R-squared"));
    }

    #[test]
    fn fitted_line_requires_a_single_regressor() {
        let result = table(
            &["x", "z", "y"],
            &[
                &["1", "1", "4"],
                &["2", "0", "5"],
                &["3", "1", "8"],
                &["4", "0", "9"],
            ],
        );
        let req = RegressionRequest {
            dependent: "y".to_owned(),
            independents: vec!["x".to_owned(), "z".to_owned()],
            kind: RegressionKind::Linear,
        };
        let model = fit(&result, &req).unwrap();
        assert!(model.fitted_line().is_none());
        assert_eq!(model.coefficients.len(), 3);
    }
}
