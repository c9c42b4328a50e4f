use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot};
use crate::calculators::{ArithmeticMean, ArithmeticMeanState, Calculator};
use crate::core::Sample;

/// Raw moment of order `n`: the running mean of `x^n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Moment<T: Sample = f64> {
    order: i32,
    mean: ArithmeticMean<T>,
}

/// Plain state record for [`Moment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentState<T> {
    pub order: i32,
    pub mean: ArithmeticMeanState<T>,
}

impl<T: Sample> Moment<T> {
    pub fn new(order: i32) -> Self {
        Self {
            order,
            mean: ArithmeticMean::new(),
        }
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn state(&self) -> MomentState<T> {
        MomentState {
            order: self.order,
            mean: self.mean.state(),
        }
    }

    pub fn from_state(state: MomentState<T>) -> Self {
        Self {
            order: state.order,
            mean: ArithmeticMean::from_state(state.mean),
        }
    }
}

impl<T: Sample> Calculator for Moment<T> {
    type Input = T;
    type Output = T;

    fn append(&mut self, x: T) {
        let order = self.order;
        self.mean.append(x.map(|v| v.powi(order)));
    }

    fn statistic(&self) -> T {
        self.mean.statistic()
    }

    fn count(&self) -> usize {
        self.mean.count()
    }

    fn reset(&mut self) {
        self.mean.reset();
    }
}

impl Snapshot for Moment<f64> {
    fn capture(&self) -> Option<CalculatorState> {
        Some(CalculatorState::Moment(self.state()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn second_raw_moment_is_mean_of_squares() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let mut moment = Moment::new(2);
        moment.extend(&xs);
        let expected = xs.iter().map(|v| v * v).sum::<f64>() / xs.len() as f64;
        assert!((moment.statistic() - expected).abs() <= EPS);
        assert_eq!(moment.count(), 4);
    }

    #[test]
    fn first_moment_equals_mean() {
        let xs = [0.3, -1.2, 2.5, 0.0, 7.25];
        let mut moment = Moment::new(1);
        let mut mean = ArithmeticMean::new();
        moment.extend(&xs);
        mean.extend(&xs);
        assert_eq!(moment.statistic().to_bits(), mean.statistic().to_bits());
    }

    #[test]
    fn reset_clears_accumulation() {
        let mut moment = Moment::new(3);
        moment.extend(&[1.0, 2.0]);
        moment.reset();
        assert!(moment.statistic().is_nan());
        assert_eq!(moment.count(), 0);
    }
}
