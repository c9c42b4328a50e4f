use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot};
use crate::calculators::Calculator;

/// Streaming geometric mean, maintained as the running mean of `ln|x|`
/// together with a count of negative observations.
///
/// For mixed-sign streams the result is complex-valued in general: the sign
/// is reconstructed as `((-1)^neg_count)^(1/count)` on the principal branch,
/// i.e. `exp(i*pi/count)` when the negative count is odd and `1` otherwise.
/// This convention is branch-cut dependent and deliberately kept as-is; see
/// [`complex_statistic`] for the full value. With `return_radius` (the
/// default) [`statistic`] returns the magnitude, discarding sign
/// information; otherwise it returns the real part.
///
/// Zero observations send the log mean to negative infinity, as expected
/// for a geometric mean touching zero.
///
/// [`complex_statistic`]: GeometricMean::complex_statistic
/// [`statistic`]: Calculator::statistic
#[derive(Debug, Clone, PartialEq)]
pub struct GeometricMean {
    log_mean: f64,
    count: usize,
    negative_count: usize,
    return_radius: bool,
}

/// Plain state record for [`GeometricMean`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricMeanState {
    pub count: usize,
    pub log_mean: f64,
    pub negative_count: usize,
    pub return_radius: bool,
}

impl GeometricMean {
    pub fn new() -> Self {
        Self::with_return_radius(true)
    }

    pub fn with_return_radius(return_radius: bool) -> Self {
        Self {
            log_mean: f64::NAN,
            count: 0,
            negative_count: 0,
            return_radius,
        }
    }

    /// The geometric mean as `(re, im)` on the principal branch.
    pub fn complex_statistic(&self) -> (f64, f64) {
        if self.count == 0 {
            return (f64::NAN, f64::NAN);
        }
        let radius = self.log_mean.exp();
        let angle = if self.negative_count % 2 == 1 {
            PI / self.count as f64
        } else {
            0.0
        };
        (radius * angle.cos(), radius * angle.sin())
    }

    pub fn state(&self) -> GeometricMeanState {
        GeometricMeanState {
            count: self.count,
            log_mean: self.log_mean,
            negative_count: self.negative_count,
            return_radius: self.return_radius,
        }
    }

    pub fn from_state(state: GeometricMeanState) -> Self {
        Self {
            log_mean: state.log_mean,
            count: state.count,
            negative_count: state.negative_count,
            return_radius: state.return_radius,
        }
    }
}

impl Default for GeometricMean {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator for GeometricMean {
    type Input = f64;
    type Output = f64;

    fn append(&mut self, x: f64) {
        let log_abs = x.abs().ln();
        if self.log_mean.is_nan() {
            self.log_mean = log_abs;
        } else {
            self.log_mean += (log_abs - self.log_mean) / (self.count as f64 + 1.0);
        }
        self.count += 1;
        if x < 0.0 {
            self.negative_count += 1;
        }
    }

    fn statistic(&self) -> f64 {
        let (re, im) = self.complex_statistic();
        if self.return_radius {
            re.hypot(im)
        } else {
            re
        }
    }

    fn count(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.log_mean = f64::NAN;
        self.count = 0;
        self.negative_count = 0;
    }
}

impl Snapshot for GeometricMean {
    fn capture(&self) -> Option<CalculatorState> {
        Some(CalculatorState::GeometricMean(self.state()))
    }
}
