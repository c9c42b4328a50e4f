use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot};
use crate::calculators::{Calculator, Variance, VarianceState};
use crate::core::Sample;

/// Streaming standard deviation: the square root of an owned [`Variance`].
///
/// The default inner variance uses `ddof = 1.5`, an approximate correction
/// for the small-sample bias that taking the square root introduces on top
/// of Bessel's correction. Use [`over`] to supply a variance with different
/// settings.
///
/// [`over`]: StandardDeviation::over
#[derive(Debug, Clone, PartialEq)]
pub struct StandardDeviation<T: Sample = f64> {
    variance: Variance<T>,
}

/// Plain state record for [`StandardDeviation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDeviationState<T> {
    pub variance: VarianceState<T>,
}

impl<T: Sample> StandardDeviation<T> {
    pub fn new() -> Self {
        Self::over(Variance::with_ddof(1.5))
    }

    pub fn over(variance: Variance<T>) -> Self {
        Self { variance }
    }

    pub fn state(&self) -> StandardDeviationState<T> {
        StandardDeviationState {
            variance: self.variance.state(),
        }
    }

    pub fn from_state(state: StandardDeviationState<T>) -> Self {
        Self {
            variance: Variance::from_state(state.variance),
        }
    }
}

impl<T: Sample> Default for StandardDeviation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> Calculator for StandardDeviation<T> {
    type Input = T;
    type Output = T;

    fn append(&mut self, x: T) {
        self.variance.append(x);
    }

    fn statistic(&self) -> T {
        self.variance.statistic().map(f64::sqrt)
    }

    fn count(&self) -> usize {
        self.variance.count()
    }

    fn reset(&mut self) {
        self.variance.reset();
    }
}

impl Snapshot for StandardDeviation<f64> {
    fn capture(&self) -> Option<CalculatorState> {
        Some(CalculatorState::StandardDeviation(self.state()))
    }
}
