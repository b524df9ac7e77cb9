/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the sample variance (n - 1 denominator) given a pre-computed mean.
/// Returns `None` for fewer than two values.
pub fn sample_variance(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();

    Some(sum_sq / (values.len() - 1) as f64)
}

/// Linear-interpolated quantile of an ascending slice. `q` is in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Most frequent value of an ascending slice; ties go to the smallest value.
pub fn mode(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut idx = 0;

    while idx < sorted.len() {
        let value = sorted[idx];
        let run = sorted[idx..].iter().take_while(|v| **v == value).count();
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        idx += run;
    }

    best.map(|(value, _)| value)
}

/// Most decimal places [`round_to`] honours; an f64 holds no more.
pub const MAX_DECIMALS: u32 = 15;

/// Rounds to `decimals` places, half away from zero.
///
/// Values too large to scale are returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Keeps the present values of a nullable column.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}
