//! Mean and standard deviation over a window of samples

/// Mean and population standard deviation of a sample set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeanStdDev {
    pub mean: f64,
    pub std_dev: f64,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by N). `None` for an empty set or NaN input.
pub fn mean_std_dev(values: &[f64]) -> Option<MeanStdDev> {
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let std_dev = variance.sqrt();
    if !mean.is_finite() || !std_dev.is_finite() {
        return None;
    }
    Some(MeanStdDev { mean, std_dev })
}

pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
