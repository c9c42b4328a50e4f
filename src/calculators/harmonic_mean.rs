use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot};
use crate::calculators::{ArithmeticMean, ArithmeticMeanState, Calculator};
use crate::core::Sample;

/// Streaming harmonic mean: the running mean of reciprocals, inverted at
/// read time. A zero observation drives the statistic to zero through the
/// infinite reciprocal, which is the limit behavior of the harmonic mean.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HarmonicMean<T: Sample = f64> {
    reciprocal_mean: ArithmeticMean<T>,
}

/// Plain state record for [`HarmonicMean`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicMeanState<T> {
    pub reciprocal_mean: ArithmeticMeanState<T>,
}

impl<T: Sample> HarmonicMean<T> {
    pub fn new() -> Self {
        Self {
            reciprocal_mean: ArithmeticMean::new(),
        }
    }

    pub fn state(&self) -> HarmonicMeanState<T> {
        HarmonicMeanState {
            reciprocal_mean: self.reciprocal_mean.state(),
        }
    }

    pub fn from_state(state: HarmonicMeanState<T>) -> Self {
        Self {
            reciprocal_mean: ArithmeticMean::from_state(state.reciprocal_mean),
        }
    }
}

impl<T: Sample> Calculator for HarmonicMean<T> {
    type Input = T;
    type Output = T;

    fn append(&mut self, x: T) {
        self.reciprocal_mean.append(x.map(|v| 1.0 / v));
    }

    fn statistic(&self) -> T {
        self.reciprocal_mean.statistic().map(|v| 1.0 / v)
    }

    fn count(&self) -> usize {
        self.reciprocal_mean.count()
    }

    fn reset(&mut self) {
        self.reciprocal_mean.reset();
    }
}

impl Snapshot for HarmonicMean<f64> {
    fn capture(&self) -> Option<CalculatorState> {
        Some(CalculatorState::HarmonicMean(self.state()))
    }
}
