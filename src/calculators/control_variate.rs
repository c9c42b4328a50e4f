use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot, StateError};
use crate::calculators::{
    ArithmeticMean, ArithmeticMeanState, Calculator, Covariance, CovarianceState, Variance,
    VarianceState,
};

/// Variance reduction through a correlated control variate.
///
/// Wraps a target calculator and, for each observation `x` with control
/// value `y`, feeds the target the linearly corrected
/// `x - (cov(x, y) / var(y)) * (y - mean(y))` instead of `x`. The running
/// mean and variance of `y` and the covariance of `(x, y)` are owned
/// internal calculators.
///
/// While the adjustment is non-finite (too few observations, or a
/// degenerate variate with zero variance) the raw `x` is fed through
/// unmodified, so the wrapper degrades to the unadjusted estimator instead
/// of corrupting the stream.
///
/// The control value comes either from an owned source calculator fed `x`
/// (see [`with_source`]; enables the plain [`append`] path) or per call via
/// [`append_with`].
///
/// [`with_source`]: ControlVariate::with_source
/// [`append`]: Calculator::append
/// [`append_with`]: ControlVariate::append_with
pub struct ControlVariate {
    target: Box<dyn Snapshot>,
    source: Option<Box<dyn Snapshot>>,
    variate_mean: ArithmeticMean,
    variate_variance: Variance,
    covariance: Covariance,
    count: usize,
}

/// Plain state record for [`ControlVariate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlVariateState {
    pub count: usize,
    pub target: Box<CalculatorState>,
    pub source: Option<Box<CalculatorState>>,
    pub variate_mean: ArithmeticMeanState<f64>,
    pub variate_variance: VarianceState<f64>,
    pub covariance: CovarianceState<f64>,
}

impl ControlVariate {
    /// Control values are supplied per call through [`append_with`].
    ///
    /// [`append_with`]: ControlVariate::append_with
    pub fn new(target: Box<dyn Snapshot>) -> Self {
        Self {
            target,
            source: None,
            variate_mean: ArithmeticMean::new(),
            variate_variance: Variance::new(),
            covariance: Covariance::new(),
            count: 0,
        }
    }

    /// Control values are produced by `source`, which is fed every
    /// observation; its statistic is used as the control value.
    pub fn with_source(target: Box<dyn Snapshot>, source: Box<dyn Snapshot>) -> Self {
        Self {
            source: Some(source),
            ..Self::new(target)
        }
    }

    /// Incorporates `x` with an explicit control value.
    pub fn append_with(&mut self, x: f64, control_value: f64) {
        let y = control_value;
        self.variate_mean.append(y);
        let mean = self.variate_mean.statistic();
        self.variate_variance.append(y);
        let variance = self.variate_variance.statistic();
        self.covariance.append((x, y));
        let covariance = self.covariance.statistic();

        let mut adjusted = x - (covariance / variance) * (y - mean);
        if !adjusted.is_finite() {
            adjusted = x;
        }
        self.target.append(adjusted);
        self.count += 1;
    }

    pub fn state(&self) -> Option<ControlVariateState> {
        let source = match &self.source {
            Some(source) => Some(Box::new(source.capture()?)),
            None => None,
        };
        Some(ControlVariateState {
            count: self.count,
            target: Box::new(self.target.capture()?),
            source,
            variate_mean: self.variate_mean.state(),
            variate_variance: self.variate_variance.state(),
            covariance: self.covariance.state(),
        })
    }

    pub fn from_state(state: ControlVariateState) -> Result<Self, StateError> {
        let source = match state.source {
            Some(source) => Some(source.into_calculator()?),
            None => None,
        };
        Ok(Self {
            target: state.target.into_calculator()?,
            source,
            variate_mean: ArithmeticMean::from_state(state.variate_mean),
            variate_variance: Variance::from_state(state.variate_variance),
            covariance: Covariance::from_state(state.covariance),
            count: state.count,
        })
    }
}

impl Calculator for ControlVariate {
    type Input = f64;
    type Output = f64;

    /// Requires a control variate source; construct via
    /// [`ControlVariate::with_source`] to use this path.
    fn append(&mut self, x: f64) {
        let source = self
            .source
            .as_mut()
            .expect("no control variate source configured; use append_with");
        source.append(x);
        let y = source.statistic();
        self.append_with(x, y);
    }

    fn statistic(&self) -> f64 {
        self.target.statistic()
    }

    fn count(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.count = 0;
        self.target.reset();
        if let Some(source) = &mut self.source {
            source.reset();
        }
        self.variate_mean.reset();
        self.variate_variance.reset();
        self.covariance.reset();
    }
}

impl Snapshot for ControlVariate {
    fn capture(&self) -> Option<CalculatorState> {
        self.state().map(CalculatorState::ControlVariate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const EPS: f64 = 1e-9;

    #[test]
    fn perfectly_correlated_variate_collapses_to_its_mean() {
        let mut cv = ControlVariate::new(Box::new(ArithmeticMean::new()));
        let xs = [0.34, 0.65, 0.21, 0.43, 0.23, 0.23, 0.12, 0.54, 0.98, 0.32];
        for &x in &xs {
            cv.append_with(x, x);
        }
        // with y = x the correction removes all variation; every adjusted
        // value equals the running mean of the variate
        let variate_mean = cv.variate_mean.statistic();
        assert!((cv.statistic() - variate_mean).abs() < 0.05);
    }

    #[test]
    fn degenerate_variate_falls_back_to_raw_values() {
        let mut cv = ControlVariate::new(Box::new(ArithmeticMean::new()));
        let mut unadjusted = ArithmeticMean::new();
        let xs = [1.0, 2.0, 3.0, 4.0];
        for &x in &xs {
            cv.append_with(x, 7.0); // constant variate: zero variance
            unadjusted.append(x);
        }
        assert!((cv.statistic() - unadjusted.statistic()).abs() <= EPS);
    }

    #[test]
    fn correlated_variate_reduces_estimator_variance() {
        let mut rng = rand::rng();
        let mut adjusted_estimates = Vec::new();
        let mut raw_estimates = Vec::new();
        for _ in 0..40 {
            let mut cv = ControlVariate::new(Box::new(ArithmeticMean::new()));
            let mut raw = ArithmeticMean::new();
            for _ in 0..100 {
                let y: f64 = rng.random_range(-1.0..1.0);
                let x = y + rng.random_range(-0.1..0.1);
                cv.append_with(x, y);
                raw.append(x);
            }
            adjusted_estimates.push(cv.statistic());
            raw_estimates.push(raw.statistic());
        }
        let spread = |vs: &[f64]| {
            let m = vs.iter().sum::<f64>() / vs.len() as f64;
            vs.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / vs.len() as f64
        };
        assert!(spread(&adjusted_estimates) < spread(&raw_estimates));
    }

    #[test]
    fn source_driven_append_feeds_the_source_first() {
        let mut cv = ControlVariate::with_source(
            Box::new(Variance::new()),
            Box::new(ArithmeticMean::new()),
        );
        cv.extend(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(cv.count(), 5);
        // the first adjustment falls back to raw input, later ones are
        // corrected; either way the target variance is well defined
        assert!(cv.statistic().is_finite());
    }

    #[test]
    fn reset_clears_all_owned_calculators() {
        let mut cv = ControlVariate::new(Box::new(ArithmeticMean::new()));
        cv.append_with(1.0, 2.0);
        cv.append_with(2.0, 4.0);
        cv.reset();
        assert_eq!(cv.count(), 0);
        assert!(cv.statistic().is_nan());
        assert_eq!(cv.covariance.count(), 0);
    }
}
