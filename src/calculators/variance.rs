use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot};
use crate::calculators::{ArithmeticMean, ArithmeticMeanState, Calculator};
use crate::core::Sample;

/// Streaming variance using Welford's recurrence.
///
/// Maintains an owned running mean; each observation contributes
/// `(x - mean_before) * (x - mean_after)` to the `m2` accumulator, avoiding
/// the catastrophic cancellation of a sum-of-squares formulation. The
/// statistic is `m2 / (count - ddof)` and stays NaN while fewer than two
/// observations have been seen.
///
/// With `semi` enabled, the second factor is clamped to `min(delta2, 0)`,
/// yielding a downside semi-variance.
#[derive(Debug, Clone, PartialEq)]
pub struct Variance<T: Sample = f64> {
    mean: ArithmeticMean<T>,
    m2: Option<T>,
    count: usize,
    ddof: f64,
    semi: bool,
}

/// Plain state record for [`Variance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceState<T> {
    pub count: usize,
    pub m2: Option<T>,
    pub ddof: f64,
    pub semi: bool,
    pub mean: ArithmeticMeanState<T>,
}

impl<T: Sample> Variance<T> {
    /// Sample variance (`ddof = 1`).
    pub fn new() -> Self {
        Self::with_ddof(1.0)
    }

    pub fn with_ddof(ddof: f64) -> Self {
        Self {
            mean: ArithmeticMean::new(),
            m2: None,
            count: 0,
            ddof,
            semi: false,
        }
    }

    /// Downside semi-variance with the given divisor correction.
    pub fn semi_with_ddof(ddof: f64) -> Self {
        Self {
            semi: true,
            ..Self::with_ddof(ddof)
        }
    }

    pub fn ddof(&self) -> f64 {
        self.ddof
    }

    /// The running mean of the observations seen so far.
    pub fn mean(&self) -> T {
        self.mean.statistic()
    }

    pub fn state(&self) -> VarianceState<T> {
        VarianceState {
            count: self.count,
            m2: self.m2.clone(),
            ddof: self.ddof,
            semi: self.semi,
            mean: self.mean.state(),
        }
    }

    pub fn from_state(state: VarianceState<T>) -> Self {
        Self {
            mean: ArithmeticMean::from_state(state.mean),
            m2: state.m2,
            count: state.count,
            ddof: state.ddof,
            semi: state.semi,
        }
    }
}

impl<T: Sample> Default for Variance<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> Calculator for Variance<T> {
    type Input = T;
    type Output = T;

    fn append(&mut self, x: T) {
        self.count += 1;
        // zero on the first observation, when no mean exists yet
        let delta = match self.mean.value() {
            Some(mean) => x.zip_with(mean, |v, m| v - m),
            None => x.map(|_| 0.0),
        };
        self.mean.append(x.clone());
        let mean_after = self.mean.statistic();
        let mut delta2 = x.zip_with(&mean_after, |v, m| v - m);
        if self.semi {
            delta2 = delta2.map(|v| v.min(0.0));
        }
        let product = delta.zip_with(&delta2, |a, b| a * b);
        match &mut self.m2 {
            None => self.m2 = Some(product),
            Some(m2) => {
                let mut updated = m2.zip_with(&product, |a, b| a + b);
                updated.merge_nan(&product);
                *m2 = updated;
            }
        }
    }

    fn statistic(&self) -> T {
        if self.count < 2 {
            return T::nan();
        }
        let divisor = self.count as f64 - self.ddof;
        match &self.m2 {
            Some(m2) => m2.map(|v| v / divisor),
            None => T::nan(),
        }
    }

    fn count(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.mean.reset();
        self.m2 = None;
        self.count = 0;
    }
}

impl Snapshot for Variance<f64> {
    fn capture(&self) -> Option<CalculatorState> {
        Some(CalculatorState::Variance(self.state()))
    }
}
