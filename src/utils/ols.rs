//! Ordinary Least Squares (OLS) regression over row-major feature matrices.
//!
//! Used by the linear lag regressor. An optional ridge penalty shrinks the slope
//! coefficients; the intercept is never penalised.

use crate::error::{ForecastError, Result};

/// OLS regression coefficients and intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct OLSResult {
    /// Regression coefficients (one per feature column).
    pub coefficients: Vec<f64>,
    /// Intercept term.
    pub intercept: f64,
}

impl OLSResult {
    /// Predict the response for one feature row.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: row.len(),
            });
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>())
    }
}

/// Fit y = intercept + X @ coefficients, with `ridge * |coefficients|²` added to
/// the squared error.
///
/// Uses Cholesky decomposition to solve the normal equations.
///
/// # Arguments
/// * `rows` - Feature rows (n rows of k values)
/// * `y` - Target values (length n)
/// * `ridge` - Non-negative penalty on the slope coefficients
pub fn ols_fit(rows: &[Vec<f64>], y: &[f64], ridge: f64) -> Result<OLSResult> {
    let n = y.len();

    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if rows.len() != n {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: rows.len(),
        });
    }
    if !(ridge >= 0.0 && ridge.is_finite()) {
        return Err(ForecastError::InvalidParameter(format!(
            "ridge penalty must be finite and non-negative, got {}",
            ridge
        )));
    }

    let k = rows[0].len();
    if let Some(bad) = rows.iter().find(|r| r.len() != k) {
        return Err(ForecastError::DimensionMismatch {
            expected: k,
            got: bad.len(),
        });
    }

    if k == 0 {
        // No regressors - just return the mean as intercept
        return Ok(OLSResult {
            coefficients: vec![],
            intercept: y.iter().sum::<f64>() / n as f64,
        });
    }

    // Design matrix has k+1 columns: [1, x1, x2, ...]
    let num_params = k + 1;
    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];

    for (row, &y_obs) in rows.iter().zip(y) {
        xtx[0][0] += 1.0;
        for j in 0..k {
            xtx[0][j + 1] += row[j];
            xtx[j + 1][0] += row[j];
        }
        for i in 0..k {
            for j in 0..k {
                xtx[i + 1][j + 1] += row[i] * row[j];
            }
        }

        xty[0] += y_obs;
        for i in 0..k {
            xty[i + 1] += row[i] * y_obs;
        }
    }

    for i in 1..num_params {
        xtx[i][i] += ridge;
    }
    // Small jitter keeps near-collinear lag columns solvable
    for i in 0..num_params {
        xtx[i][i] += 1e-8;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ComputationError(
            "OLS regression failed: matrix not positive definite".into(),
        )
    })?;

    if beta.iter().any(|b| !b.is_finite()) {
        return Err(ForecastError::ComputationError(
            "OLS regression produced non-finite coefficients".into(),
        ));
    }

    Ok(OLSResult {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
    })
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b where A is symmetric positive definite.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // Cholesky decomposition A = L @ L'
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ols_fit_simple_linear() {
        // y = 2 + 3*x
        let rows: Vec<Vec<f64>> = (1..=5).map(|x| vec![x as f64]).collect();
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];

        let result = ols_fit(&rows, &y, 0.0).unwrap();

        assert_relative_eq!(result.intercept, 2.0, epsilon = 1e-6);
        assert_eq!(result.coefficients.len(), 1);
        assert_relative_eq!(result.coefficients[0], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn ols_fit_multiple_regressors() {
        // y = 1 + 2*x1 + 3*x2
        let x1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let x2 = [0.5, 2.5, 1.0, 3.0, 1.5, 3.5, 2.0, 4.0];
        let rows: Vec<Vec<f64>> = x1.iter().zip(&x2).map(|(a, b)| vec![*a, *b]).collect();
        let y: Vec<f64> = rows.iter().map(|r| 1.0 + 2.0 * r[0] + 3.0 * r[1]).collect();

        let result = ols_fit(&rows, &y, 0.0).unwrap();

        assert_relative_eq!(result.intercept, 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.coefficients[0], 2.0, epsilon = 1e-4);
        assert_relative_eq!(result.coefficients[1], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn ols_fit_no_regressors() {
        let rows = vec![vec![]; 5];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];

        let result = ols_fit(&rows, &y, 0.0).unwrap();

        assert_relative_eq!(result.intercept, 6.0, epsilon = 1e-10);
        assert!(result.coefficients.is_empty());
        assert_relative_eq!(result.predict_row(&[]).unwrap(), 6.0, epsilon = 1e-10);
    }

    #[test]
    fn ridge_shrinks_slope() {
        let rows: Vec<Vec<f64>> = (1..=5).map(|x| vec![x as f64]).collect();
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];

        let plain = ols_fit(&rows, &y, 0.0).unwrap();
        let shrunk = ols_fit(&rows, &y, 50.0).unwrap();

        assert!(shrunk.coefficients[0].abs() < plain.coefficients[0].abs());
    }

    #[test]
    fn ols_predict_row() {
        let rows: Vec<Vec<f64>> = (1..=5).map(|x| vec![x as f64]).collect();
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];
        let result = ols_fit(&rows, &y, 0.0).unwrap();

        assert_relative_eq!(result.predict_row(&[6.0]).unwrap(), 20.0, epsilon = 1e-6);
        assert!(matches!(
            result.predict_row(&[6.0, 7.0]),
            Err(ForecastError::DimensionMismatch {
                expected: 1,
                got: 2
            })
        ));
    }

    #[test]
    fn ols_fit_rejects_bad_input() {
        assert!(ols_fit(&[], &[], 0.0).is_err());
        assert!(ols_fit(&[vec![1.0], vec![2.0]], &[1.0, 2.0, 3.0], 0.0).is_err());
        assert!(ols_fit(&[vec![1.0], vec![2.0, 3.0]], &[1.0, 2.0], 0.0).is_err());
        assert!(ols_fit(&[vec![1.0], vec![2.0]], &[1.0, 2.0], -1.0).is_err());
    }

    #[test]
    fn cholesky_rejects_non_positive_definite() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        assert!(solve_symmetric(&a, &[1.0, 1.0]).is_none());
    }
}
