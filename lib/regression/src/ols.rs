//! Ordinary least squares via the normal equations.

use nalgebra::{DMatrix, DVector};
use sparql_analytics_model::RegressionKind;

use crate::{Coefficient, Design, FitStatistics, FittedModel, RegressionError};

pub(crate) fn fit(design: Design) -> Result<FittedModel, RegressionError> {
    let n = design.n();
    let k = design.k();
    if n <= k {
        // No residual degrees of freedom, the standard errors would be
        // meaningless.
        return Err(RegressionError::NotEnoughData { usable: n });
    }

    let x_mat = design_matrix(&design);
    let y_vec = DVector::from_column_slice(&design.y);

    let xtx = x_mat.transpose() * &x_mat;
    let xty = x_mat.transpose() * &y_vec;
    let xtx_inv = xtx.try_inverse().ok_or(RegressionError::Singular)?;
    let beta = &xtx_inv * xty;

    let fitted = &x_mat * &beta;
    let resid = &y_vec - fitted;
    let rss: f64 = resid.iter().map(|r| r * r).sum();
    let y_mean = design.y.iter().sum::<f64>() / n as f64;
    let tss: f64 = design.y.iter().map(|y| (y - y_mean) * (y - y_mean)).sum();

    let dof = (n - k) as f64;
    let sigma2 = rss / dof;
    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };
    let adj_r_squared = if tss > 0.0 {
        1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / dof
    } else {
        f64::NAN
    };

    let coefficients = design
        .term_names()
        .into_iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = beta[j];
            let std_error = (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt();
            Coefficient {
                name,
                estimate,
                std_error,
                statistic: estimate / std_error,
            }
        })
        .collect();

    Ok(FittedModel {
        kind: RegressionKind::Linear,
        dependent: design.dependent.clone(),
        coefficients,
        n_obs: n,
        dropped_rows: design.dropped_rows,
        stats: FitStatistics::Linear {
            r_squared,
            adj_r_squared,
        },
        x_range: design.x_range(),
    })
}

/// Row-major design matrix with the intercept column prepended.
pub(crate) fn design_matrix(design: &Design) -> DMatrix<f64> {
    let n = design.n();
    let k = design.k();
    let mut data = Vec::with_capacity(n * k);
    for row in &design.x {
        data.push(1.0);
        data.extend_from_slice(row);
    }
    DMatrix::from_row_slice(n, k, &data)
}
