//! Binomial regression with a logit link, fitted by iteratively
//! reweighted least squares.

use nalgebra::{DMatrix, DVector};
use sparql_analytics_model::RegressionKind;

use crate::ols::design_matrix;
use crate::{Coefficient, Design, FitStatistics, FittedModel, RegressionError};

const MAX_ITERATIONS: usize = 25;
const TOLERANCE: f64 = 1e-8;
/// Lower bound on the IRLS weights, keeps the working response finite when
/// a fitted probability saturates.
const MIN_WEIGHT: f64 = 1e-10;

pub(crate) fn sigmoid(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

pub(crate) fn fit(design: Design) -> Result<FittedModel, RegressionError> {
    let n = design.n();
    let k = design.k();
    let x_mat = design_matrix(&design);
    let y = &design.y;

    let mut beta = DVector::<f64>::zeros(k);
    let mut iterations = 0;
    let mut converged = false;
    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let (xtwx, xtwz) = weighted_system(&x_mat, y, &beta);
        let next = xtwx.lu().solve(&xtwz).ok_or(RegressionError::Singular)?;
        let step = (&next - &beta).amax();
        beta = next;
        if step < TOLERANCE {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(RegressionError::NoConvergence {
            iterations: MAX_ITERATIONS,
        });
    }

    // Fisher information at the solution gives the covariance estimate.
    let (xtwx, _) = weighted_system(&x_mat, y, &beta);
    let covariance = xtwx.try_inverse().ok_or(RegressionError::Singular)?;

    let coefficients = design
        .term_names()
        .into_iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = beta[j];
            let std_error = covariance[(j, j)].max(0.0).sqrt();
            Coefficient {
                name,
                estimate,
                std_error,
                statistic: estimate / std_error,
            }
        })
        .collect();

    let log_likelihood = log_likelihood(&x_mat, y, &beta);
    let pseudo_r_squared = mcfadden(y, log_likelihood);

    Ok(FittedModel {
        kind: RegressionKind::Logistic,
        dependent: design.dependent.clone(),
        coefficients,
        n_obs: n,
        dropped_rows: design.dropped_rows,
        stats: FitStatistics::Logistic {
            log_likelihood,
            pseudo_r_squared,
            iterations,
        },
        x_range: design.x_range(),
    })
}

/// One IRLS step's normal equations: `X'WX` and `X'Wz` with the working
/// response `z = eta + (y - mu) / w`.
fn weighted_system(
    x_mat: &DMatrix<f64>,
    y: &[f64],
    beta: &DVector<f64>,
) -> (DMatrix<f64>, DVector<f64>) {
    let n = x_mat.nrows();
    let k = x_mat.ncols();
    let eta = x_mat * beta;
    let mut xtwx = DMatrix::<f64>::zeros(k, k);
    let mut xtwz = DVector::<f64>::zeros(k);
    for i in 0..n {
        let mu = sigmoid(eta[i]);
        let w = (mu * (1.0 - mu)).max(MIN_WEIGHT);
        let z = eta[i] + (y[i] - mu) / w;
        for a in 0..k {
            let xa = x_mat[(i, a)];
            xtwz[a] += w * xa * z;
            for b in a..k {
                xtwx[(a, b)] += w * xa * x_mat[(i, b)];
            }
        }
    }
    // Mirror the upper triangle.
    for a in 0..k {
        for b in 0..a {
            xtwx[(a, b)] = xtwx[(b, a)];
        }
    }
    (xtwx, xtwz)
}

fn log_likelihood(x_mat: &DMatrix<f64>, y: &[f64], beta: &DVector<f64>) -> f64 {
    let eta = x_mat * beta;
    y.iter()
        .enumerate()
        .map(|(i, &yi)| {
            let mu = sigmoid(eta[i]).clamp(1e-12, 1.0 - 1e-12);
            yi * mu.ln() + (1.0 - yi) * (1.0 - mu).ln()
        })
        .sum()
}

/// McFadden pseudo R-squared against the intercept-only model.
fn mcfadden(y: &[f64], log_likelihood: f64) -> f64 {
    let n = y.len() as f64;
    let p = y.iter().sum::<f64>() / n;
    if p <= 0.0 || p >= 1.0 {
        // Row dropping can leave a single level behind; there is no null
        // model to compare against then.
        return f64::NAN;
    }
    let null_ll = n * (p * p.ln() + (1.0 - p) * (1.0 - p).ln());
    1.0 - log_likelihood / null_ll
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_bounded_and_centered() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(40.0) <= 1.0);
        assert!(sigmoid(-40.0) >= 0.0);
    }
}
