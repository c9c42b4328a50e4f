//! Factory functions for the common derived calculators: skewness,
//! kurtosis and the rolling-window batch statistics (quantile, median,
//! mode, median absolute deviation).

use crate::calculators::state::Snapshot;
use crate::calculators::{StandardizedMoment, Window};
use crate::utils::math;

/// Normal consistency constant for the median absolute deviation.
pub const MAD_NORMAL_FACTOR: f64 = 1.4826;

/// Streaming skewness (third standardized moment), windowed when a size is
/// given.
pub fn skewness_calculator(window_size: Option<usize>) -> Box<dyn Snapshot> {
    standardized_moment_calculator(3, window_size)
}

/// Streaming kurtosis (fourth standardized moment), windowed when a size
/// is given.
pub fn kurtosis_calculator(window_size: Option<usize>) -> Box<dyn Snapshot> {
    standardized_moment_calculator(4, window_size)
}

fn standardized_moment_calculator(order: i32, window_size: Option<usize>) -> Box<dyn Snapshot> {
    let calculator = StandardizedMoment::new(order);
    match window_size {
        Some(_) => Box::new(Window::over(Box::new(calculator), window_size)),
        None => Box::new(calculator),
    }
}

/// Quantile over the trailing window, recomputed from the buffer at read
/// time; NaN while the buffer is empty.
pub fn quantile_calculator(q: f64, window_size: Option<usize>) -> Box<dyn Snapshot> {
    Box::new(Window::of_fn(move |xs| math::quantile(xs, q), window_size))
}

/// Median over the trailing window.
pub fn median_calculator(window_size: Option<usize>) -> Box<dyn Snapshot> {
    quantile_calculator(0.5, window_size)
}

/// Mode over the trailing window, optionally rounding each value to
/// `decimals` places before counting.
pub fn mode_calculator(decimals: Option<i32>, window_size: Option<usize>) -> Box<dyn Snapshot> {
    match decimals {
        None => Box::new(Window::of_fn(math::mode, window_size)),
        Some(decimals) => Box::new(Window::of_fn(
            move |xs| {
                let rounded: Vec<f64> = xs.iter().map(|&v| math::round_to(v, decimals)).collect();
                math::mode(&rounded)
            },
            window_size,
        )),
    }
}

/// Median absolute deviation over the trailing window:
/// `(median(|x - median|) * factor) ^ power`. The default scaling is
/// [`MAD_NORMAL_FACTOR`] with `power = 1`; see
/// [`median_absolute_deviation_calculator_with`].
pub fn median_absolute_deviation_calculator(window_size: Option<usize>) -> Box<dyn Snapshot> {
    median_absolute_deviation_calculator_with(window_size, 1, MAD_NORMAL_FACTOR)
}

pub fn median_absolute_deviation_calculator_with(
    window_size: Option<usize>,
    power: i32,
    factor: f64,
) -> Box<dyn Snapshot> {
    Box::new(Window::of_fn(
        move |xs| {
            if xs.is_empty() {
                return f64::NAN;
            }
            let center = math::median(xs);
            let deviations: Vec<f64> = xs.iter().map(|&v| (v - center).abs()).collect();
            (math::median(&deviations) * factor).powi(power)
        },
        window_size,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn rolling_median_tracks_last_window() {
        let mut median = median_calculator(Some(3));
        median.extend(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(median.statistic(), 3.0);
    }

    #[test]
    fn quantile_calculator_is_nan_before_data() {
        let quantile = quantile_calculator(0.25, Some(5));
        assert!(quantile.statistic().is_nan());
    }

    #[test]
    fn mode_calculator_rounds_before_counting() {
        let mut mode = mode_calculator(Some(0), None);
        mode.extend(&[1.1, 0.9, 1.04, 2.6, 2.7]);
        // rounds to [1, 1, 1, 3, 3]
        assert_eq!(mode.statistic(), 1.0);
    }

    #[test]
    fn mad_of_symmetric_window_matches_hand_computation() {
        let mut mad = median_absolute_deviation_calculator_with(None, 1, 1.0);
        mad.extend(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        // median 3, absolute deviations [2, 1, 0, 1, 2], median 1
        assert!((mad.statistic() - 1.0).abs() <= EPS);
    }

    #[test]
    fn default_mad_applies_normal_factor() {
        let mut mad = median_absolute_deviation_calculator(None);
        mad.extend(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((mad.statistic() - MAD_NORMAL_FACTOR).abs() <= EPS);
    }

    #[test]
    fn windowed_skewness_forgets_old_regime() {
        let mut rolling = skewness_calculator(Some(10));
        let mut unwindowed = skewness_calculator(None);
        for &x in &[100.0, 200.0, 150.0, 120.0, 180.0] {
            rolling.append(x);
            unwindowed.append(x);
        }
        for x in 1..=10 {
            rolling.append(x as f64);
            unwindowed.append(x as f64);
        }
        // the rolling variant now only sees the small values
        assert!(rolling.statistic().is_finite());
        assert!((rolling.statistic() - unwindowed.statistic()).abs() > 1e-6);
    }
}
