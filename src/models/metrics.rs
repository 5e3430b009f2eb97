//! Regression scoring metrics

use ndarray::Array1;

/// Coefficient of determination.
///
/// Returns 0.0 for a zero-variance target, matching the convention that a
/// constant predictor explains nothing.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let y_mean = y_true.sum() / n;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}

/// Mean squared error.
pub fn mse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n
}

/// Mean absolute error.
pub fn mae(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n
}
