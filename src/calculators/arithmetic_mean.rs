use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot};
use crate::calculators::Calculator;
use crate::core::Sample;

/// Streaming arithmetic mean using the Welford recurrence
/// `mean += (x - mean) / (count + 1)`.
///
/// After the update, NaN lanes of the running mean are overwritten by the
/// corresponding lanes of the observation. For scalars this seeds the mean
/// with the first value; for vectors it additionally lets individual lanes
/// that went undefined resume from the next observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticMean<T: Sample = f64> {
    mean: Option<T>,
    count: usize,
}

/// Plain state record for [`ArithmeticMean`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticMeanState<T> {
    pub count: usize,
    pub mean: Option<T>,
}

impl<T: Sample> ArithmeticMean<T> {
    pub fn new() -> Self {
        Self {
            mean: None,
            count: 0,
        }
    }

    pub fn state(&self) -> ArithmeticMeanState<T> {
        ArithmeticMeanState {
            count: self.count,
            mean: self.mean.clone(),
        }
    }

    pub fn from_state(state: ArithmeticMeanState<T>) -> Self {
        Self {
            mean: state.mean,
            count: state.count,
        }
    }

    /// The running mean, `None` while undefined.
    #[inline]
    pub(crate) fn value(&self) -> Option<&T> {
        self.mean.as_ref()
    }
}

impl<T: Sample> Default for ArithmeticMean<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> Calculator for ArithmeticMean<T> {
    type Input = T;
    type Output = T;

    fn append(&mut self, x: T) {
        match &mut self.mean {
            None => self.mean = Some(x),
            Some(mean) => {
                let weight = 1.0 / (self.count as f64 + 1.0);
                let mut updated = mean.zip_with(&x, |m, v| m + weight * (v - m));
                updated.merge_nan(&x);
                *mean = updated;
            }
        }
        self.count += 1;
    }

    fn statistic(&self) -> T {
        self.mean.clone().unwrap_or_else(T::nan)
    }

    fn count(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.mean = None;
        self.count = 0;
    }
}

impl Snapshot for ArithmeticMean<f64> {
    fn capture(&self) -> Option<CalculatorState> {
        Some(CalculatorState::ArithmeticMean(self.state()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn starts_undefined() {
        let mean: ArithmeticMean = ArithmeticMean::new();
        assert!(mean.statistic().is_nan());
        assert_eq!(mean.count(), 0);
    }

    #[test]
    fn matches_batch_mean() {
        let xs = [0.34, 0.65, 0.21, 0.43, 0.23, 0.23, 0.12, 0.54, 0.98, 0.32];
        let mut mean = ArithmeticMean::new();
        mean.extend(&xs);
        let expected = xs.iter().sum::<f64>() / xs.len() as f64;
        assert!(approx_eq(mean.statistic(), expected, EPS));
        assert!(approx_eq(mean.statistic(), 0.405, 1e-9));
        assert_eq!(mean.count(), xs.len());
    }

    #[test]
    fn reset_then_replay_is_bit_identical() {
        let xs = [3.5, -1.25, 0.75, 8.0];
        let mut mean = ArithmeticMean::new();
        mean.extend(&xs);
        let first = mean.statistic();

        mean.reset();
        assert!(mean.statistic().is_nan());
        assert_eq!(mean.count(), 0);

        mean.extend(&xs);
        assert_eq!(mean.statistic().to_bits(), first.to_bits());
    }

    #[test]
    fn vector_mean_heals_nan_lanes() {
        let mut mean: ArithmeticMean<Vec<f64>> = ArithmeticMean::new();
        mean.append(vec![1.0, f64::NAN]);
        mean.append(vec![3.0, 10.0]);
        mean.append(vec![5.0, 20.0]);

        let stat = mean.statistic();
        assert!(approx_eq(stat[0], 3.0, EPS));
        // the second lane restarted at the second observation, so its mean
        // still follows the 1/(count+1) weights of the shared counter
        assert!(stat[1].is_finite());
        assert!(stat[1] > 10.0 && stat[1] < 20.0);
    }

    #[test]
    fn state_round_trip_preserves_statistic() {
        let mut mean = ArithmeticMean::new();
        mean.extend(&[1.0, 2.0, 4.0]);

        let restored = ArithmeticMean::from_state(mean.state());
        assert_eq!(restored, mean);
        assert_eq!(restored.statistic().to_bits(), mean.statistic().to_bits());
    }
}
