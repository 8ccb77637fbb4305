use super::error::{Result, invalid, require_len};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Linearly interpolated order statistic of an ascending slice, `p` in `[0, 1]`.
///
/// `percentile(xs, 0.0)` is the minimum and `percentile(xs, 1.0)` the maximum.
pub fn percentile(sorted: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(invalid(format!("percentile must be within [0, 1], got {p}")));
    }
    require_len("percentile", sorted.len(), 1)?;

    let last = sorted.len() - 1;
    let index = p * last as f64;
    let lower = index.floor() as usize;
    let upper = (index.ceil() as usize).min(last);
    let weight = index - lower as f64;

    Ok(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub standard_error: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares of `values` against their index `0..n`.
/// Returns `None` for fewer than two points.
pub fn linear_fit(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = mean(values);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }

    let slope = numerator / denominator;
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let predicted = slope * i as f64 + intercept;
        ss_res += (y - predicted).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }

    // Rounding floor for sums of squares around the mean.
    let flat_tol = f64::EPSILON * y_mean.powi(2) * nf;
    let r_squared = if ss_tot <= flat_tol {
        if ss_res <= flat_tol { 1.0 } else { 0.0 }
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };
    let standard_error = if n > 2 {
        (ss_res / (nf - 2.0)).sqrt()
    } else {
        0.0
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        standard_error,
    })
}
