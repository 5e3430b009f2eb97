//! Ordinary least squares linear regression

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Linear regression fit by solving the normal equations.
///
/// Uses Cholesky decomposition with a small ridge retry for near-singular
/// systems, falling back to Gauss-Jordan elimination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Option<Array1<f64>>,
    intercept: f64,
    pub fit_intercept: bool,
    is_fitted: bool,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            fit_intercept: true,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(PipelineError::Shape {
                expected: format!("y length = {n_samples}"),
                actual: format!("y length = {}", y.len()),
            });
        }

        let (x_centered, y_centered, x_mean, y_mean) = if self.fit_intercept {
            let x_mean = x
                .mean_axis(Axis(0))
                .ok_or_else(|| PipelineError::Training("empty feature matrix".to_string()))?;
            let y_mean = y.mean().unwrap_or(0.0);
            let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
            let y_centered = y - y_mean;
            (x_centered, y_centered, x_mean, y_mean)
        } else {
            (x.clone(), y.clone(), Array1::zeros(x.ncols()), 0.0)
        };

        let xtx = x_centered.t().dot(&x_centered);
        let xty = x_centered.t().dot(&y_centered);

        let coefficients = solve_spd(&xtx, &xty).ok_or_else(|| {
            PipelineError::Training("normal equations are singular".to_string())
        })?;

        self.intercept = if self.fit_intercept {
            y_mean - coefficients.dot(&x_mean)
        } else {
            0.0
        };
        self.coefficients = Some(coefficients);
        self.is_fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(PipelineError::NotFitted)?;
        Ok(x.dot(coefficients) + self.intercept)
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// Solve the symmetric positive-definite system `a x = b`.
///
/// Tries plain Cholesky, then Cholesky with a ridge proportional to the
/// diagonal magnitude, then Gauss-Jordan inversion.
fn solve_spd(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    if let Some(x) = cholesky_solve(a, b) {
        return Some(x);
    }

    let n = a.nrows();
    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
    let mut a_reg = a.clone();
    for i in 0..n {
        a_reg[[i, i]] += ridge;
    }
    if let Some(x) = cholesky_solve(&a_reg, b) {
        return Some(x);
    }

    matrix_inverse(a).map(|inv| inv.dot(b))
}

fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // A = L L^T
    let mut l: Array2<f64> = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y: Array1<f64> = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T x = y
    let mut x: Array1<f64> = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    // Augmented matrix [M | I], Gauss-Jordan with partial pivoting
    let mut aug: Array2<f64> = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }
        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }
        if aug[[col, col]].abs() < 1e-10 {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv: Array2<f64> = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Some(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_exact_linear_relation() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0]; // y = 2x + 1

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&array![[5.0]]).unwrap();
        assert!((pred[0] - 11.0).abs() < 1e-8);
    }

    #[test]
    fn test_two_features() {
        let x = array![
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [1.0, 2.0],
        ];
        let y: Array1<f64> = x.rows().into_iter().map(|r| 3.0 * r[0] - r[1] + 0.5).collect();

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-8);
        }
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = LinearRegression::new();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(PipelineError::NotFitted)
        ));
    }

    #[test]
    fn test_shape_mismatch_errors() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0, 3.0];
        let mut model = LinearRegression::new();
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_collinear_features_still_solve() {
        // Second feature duplicates the first; ridge retry should handle it
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-4);
        }
    }
}
