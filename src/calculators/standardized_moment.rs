use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot};
use crate::calculators::{
    ArithmeticMean, ArithmeticMeanState, Calculator, StandardDeviation, StandardDeviationState,
};
use crate::core::Sample;

/// Standardized moment of order `n`: the running mean of
/// `((x - inner_mean) / inner_sd)^n`.
///
/// Order 3 is skewness and order 4 kurtosis; see the factory functions in
/// [`factories`](crate::calculators::factories).
///
/// The inner standard deviation is undefined until two observations have
/// been seen, so the first standardized values are NaN; the outer mean's
/// NaN-lane merge makes it restart from the first finite value. The
/// standardization uses the mean and deviation as they stood at each point
/// in the stream, so the result converges to the batch statistic rather
/// than matching it exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizedMoment<T: Sample = f64> {
    order: i32,
    inner_mean: ArithmeticMean<T>,
    inner_sd: StandardDeviation<T>,
    outer_mean: ArithmeticMean<T>,
}

/// Plain state record for [`StandardizedMoment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedMomentState<T> {
    pub order: i32,
    pub inner_mean: ArithmeticMeanState<T>,
    pub inner_sd: StandardDeviationState<T>,
    pub outer_mean: ArithmeticMeanState<T>,
}

impl<T: Sample> StandardizedMoment<T> {
    pub fn new(order: i32) -> Self {
        Self {
            order,
            inner_mean: ArithmeticMean::new(),
            inner_sd: StandardDeviation::new(),
            outer_mean: ArithmeticMean::new(),
        }
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn state(&self) -> StandardizedMomentState<T> {
        StandardizedMomentState {
            order: self.order,
            inner_mean: self.inner_mean.state(),
            inner_sd: self.inner_sd.state(),
            outer_mean: self.outer_mean.state(),
        }
    }

    pub fn from_state(state: StandardizedMomentState<T>) -> Self {
        Self {
            order: state.order,
            inner_mean: ArithmeticMean::from_state(state.inner_mean),
            inner_sd: StandardDeviation::from_state(state.inner_sd),
            outer_mean: ArithmeticMean::from_state(state.outer_mean),
        }
    }
}

impl<T: Sample> Calculator for StandardizedMoment<T> {
    type Input = T;
    type Output = T;

    fn append(&mut self, x: T) {
        self.inner_mean.append(x.clone());
        self.inner_sd.append(x.clone());
        let mean = self.inner_mean.statistic();
        let sd = self.inner_sd.statistic();
        let order = self.order;
        let standardized = x
            .zip_with(&mean, |v, m| v - m)
            .zip_with(&sd, |d, s| (d / s).powi(order));
        self.outer_mean.append(standardized);
    }

    fn statistic(&self) -> T {
        self.outer_mean.statistic()
    }

    fn count(&self) -> usize {
        self.outer_mean.count()
    }

    fn reset(&mut self) {
        self.inner_mean.reset();
        self.inner_sd.reset();
        self.outer_mean.reset();
    }
}

impl Snapshot for StandardizedMoment<f64> {
    fn capture(&self) -> Option<CalculatorState> {
        Some(CalculatorState::StandardizedMoment(self.state()))
    }
}
