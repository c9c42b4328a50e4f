use serde::{Deserialize, Serialize};

use crate::calculators::{ArithmeticMean, ArithmeticMeanState, Calculator};
use crate::core::Sample;

/// Streaming covariance over paired observations `(x, y)`.
///
/// Welford-style cross-product accumulation: `delta1` is taken against the
/// first mean before its update, `delta2` against the second mean after
/// its update, and `delta1 * delta2` accumulates in `m12`. The statistic
/// is `m12 / (count - ddof)` and stays NaN while fewer than two pairs have
/// been seen.
#[derive(Debug, Clone, PartialEq)]
pub struct Covariance<T: Sample = f64> {
    mean1: ArithmeticMean<T>,
    mean2: ArithmeticMean<T>,
    m12: Option<T>,
    count: usize,
    ddof: f64,
}

/// Plain state record for [`Covariance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceState<T> {
    pub count: usize,
    pub m12: Option<T>,
    pub ddof: f64,
    pub mean1: ArithmeticMeanState<T>,
    pub mean2: ArithmeticMeanState<T>,
}

impl<T: Sample> Covariance<T> {
    /// Sample covariance (`ddof = 1`).
    pub fn new() -> Self {
        Self::with_ddof(1.0)
    }

    pub fn with_ddof(ddof: f64) -> Self {
        Self {
            mean1: ArithmeticMean::new(),
            mean2: ArithmeticMean::new(),
            m12: None,
            count: 0,
            ddof,
        }
    }

    pub fn state(&self) -> CovarianceState<T> {
        CovarianceState {
            count: self.count,
            m12: self.m12.clone(),
            ddof: self.ddof,
            mean1: self.mean1.state(),
            mean2: self.mean2.state(),
        }
    }

    pub fn from_state(state: CovarianceState<T>) -> Self {
        Self {
            mean1: ArithmeticMean::from_state(state.mean1),
            mean2: ArithmeticMean::from_state(state.mean2),
            m12: state.m12,
            count: state.count,
            ddof: state.ddof,
        }
    }
}

impl<T: Sample> Default for Covariance<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> Calculator for Covariance<T> {
    type Input = (T, T);
    type Output = T;

    fn append(&mut self, (x, y): (T, T)) {
        self.count += 1;
        let delta1 = self.mean1.value().map(|m| x.zip_with(m, |v, m| v - m));
        self.mean1.append(x);
        self.mean2.append(y.clone());
        // the first pair contributes nothing: no prior mean to deviate from
        let Some(delta1) = delta1 else {
            return;
        };
        let mean2_after = self.mean2.statistic();
        let delta2 = y.zip_with(&mean2_after, |v, m| v - m);
        let product = delta1.zip_with(&delta2, |a, b| a * b);
        match &mut self.m12 {
            None => self.m12 = Some(product),
            Some(m12) => {
                let mut updated = m12.zip_with(&product, |a, b| a + b);
                updated.merge_nan(&product);
                *m12 = updated;
            }
        }
    }

    fn statistic(&self) -> T {
        if self.count < 2 {
            return T::nan();
        }
        let divisor = self.count as f64 - self.ddof;
        match &self.m12 {
            Some(m12) => m12.map(|v| v / divisor),
            None => T::nan(),
        }
    }

    fn count(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.mean1.reset();
        self.mean2.reset();
        self.m12 = None;
        self.count = 0;
    }
}
