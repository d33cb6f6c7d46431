/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Pearson correlation of two equally long series, clamped to [-1, 1].
///
/// Returns `None` for fewer than two pairs, mismatched lengths, a non-finite
/// value, or when either series is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if !xs.iter().chain(ys).all(|v| v.is_finite()) {
        return None;
    }
    if is_flat(xs) || is_flat(ys) {
        return None;
    }

    let mx = mean(xs)?;
    let my = mean(ys)?;
    let sx = stddev(xs, mx);
    let sy = stddev(ys, my);
    if sx == 0.0 || sy == 0.0 {
        return None;
    }

    let covariance = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / xs.len() as f64;

    let r = covariance / (sx * sy);
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

// Compared on the values, since rounding in the mean can leave a constant
// series with a tiny nonzero spread.
fn is_flat(values: &[f64]) -> bool {
    values.iter().all(|&v| v == values[0])
}

/// `part` as a percentage of `total`; 0.0 when `total` is zero.
pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
