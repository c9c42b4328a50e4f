/// Quantile of a sample using linear interpolation between the two nearest
/// order statistics. Returns NaN on an empty slice; `q` is clamped to
/// `[0, 1]`.
pub fn quantile(xs: &[f64], q: f64) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;
    if lower + 1 < sorted.len() {
        sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
    } else {
        sorted[lower]
    }
}

pub fn median(xs: &[f64]) -> f64 {
    quantile(xs, 0.5)
}

/// Most frequent value; ties break toward the smallest. NaN on an empty
/// slice.
pub fn mode(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best = sorted[0];
    let mut best_run = 0usize;
    let mut current = sorted[0];
    let mut run = 0usize;
    for &v in &sorted {
        if v == current {
            run += 1;
        } else {
            current = v;
            run = 1;
        }
        if run > best_run {
            best = current;
            best_run = run;
        }
    }
    best
}

/// Rounds to the given number of decimal places.
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&xs, 0.5) - 2.5).abs() <= EPS);
        assert_eq!(quantile(&xs, 0.0), 1.0);
        assert_eq!(quantile(&xs, 1.0), 4.0);
        assert!((quantile(&xs, 0.25) - 1.75).abs() <= EPS);
    }

    #[test]
    fn quantile_of_empty_slice_is_nan() {
        assert!(quantile(&[], 0.5).is_nan());
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn median_of_odd_length_is_middle_element() {
        assert_eq!(median(&[9.0, 1.0, 5.0]), 5.0);
    }

    #[test]
    fn mode_prefers_smallest_on_ties() {
        assert_eq!(mode(&[3.0, 1.0, 3.0, 1.0, 2.0]), 1.0);
        assert_eq!(mode(&[4.0, 4.0, 2.0, 2.0, 2.0]), 2.0);
        assert!(mode(&[]).is_nan());
    }

    #[test]
    fn round_to_decimal_places() {
        assert_eq!(round_to(1.2345, 2), 1.23);
        assert_eq!(round_to(1.239, 2), 1.24);
        assert_eq!(round_to(-0.125, 1), -0.1);
    }
}
