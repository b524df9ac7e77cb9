use crate::analyzers::types::Correlation;
use crate::error::SectionError;
use crate::table::Table;

/// Pearson correlation over positions where both values are present.
///
/// Returns `None` with fewer than two pairs or when either side has zero
/// variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> (usize, Option<f64>) {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return (n, None);
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return (n, None);
    }

    let r = cov / (var_x * var_y).sqrt();
    (n, Some(r.clamp(-1.0, 1.0)))
}

/// Correlates two numeric columns of `table`.
pub fn correlate(table: &Table, x: &str, y: &str) -> Result<Correlation, SectionError> {
    let xs = table.require_numeric(x)?;
    let ys = table.require_numeric(y)?;
    let (pairs, coefficient) = pearson(xs, ys);

    Ok(Correlation {
        x: x.to_string(),
        y: y.to_string(),
        pairs,
        coefficient,
    })
}
