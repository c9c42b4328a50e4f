use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculators::{
    ArithmeticMean, ArithmeticMeanState, AverageAbsoluteDeviation, AverageAbsoluteDeviationState,
    Calculator, CentralMoment, CentralMomentState, ControlVariate, ControlVariateState,
    GeometricMean, GeometricMeanState, HarmonicMean, HarmonicMeanState, Moment, MomentState,
    StandardDeviation, StandardDeviationState, StandardizedMoment, StandardizedMomentState,
    Variance, VarianceState, Window, WindowState,
};

/// Scalar calculator whose state can be captured polymorphically.
///
/// Composite and wrapper calculators own their inner calculators behind
/// this trait so that whole estimator trees can be snapshotted and
/// rebuilt. Types that have nothing to capture (custom calculators, or
/// wrappers holding a non-serializable collaborator) use the default
/// implementation and simply return `None`, which propagates outward: a
/// tree is capturable only if all its members are.
pub trait Snapshot: Calculator<Input = f64, Output = f64> {
    fn capture(&self) -> Option<CalculatorState> {
        None
    }
}

/// Errors raised when rebuilding calculators from state records.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(
        "window state has no inner calculator state; \
         re-attach the batch function with `Window::from_state_with`"
    )]
    WindowFunctionMissing,
}

/// Tagged union of the state records of every restorable calculator kind,
/// for serializing heterogeneous estimator trees.
///
/// Covariance has no variant here: it consumes pairs and cannot stand
/// behind the scalar [`Snapshot`] interface, though its state still appears
/// as a typed field of [`ControlVariateState`]. Auto-resetting calculators
/// are likewise absent, since their changepoint detector is an external
/// collaborator that must be re-injected; use
/// [`AutoResetting::from_state`](crate::calculators::AutoResetting::from_state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculatorState {
    ArithmeticMean(ArithmeticMeanState<f64>),
    Moment(MomentState<f64>),
    GeometricMean(GeometricMeanState),
    HarmonicMean(HarmonicMeanState<f64>),
    Variance(VarianceState<f64>),
    StandardDeviation(StandardDeviationState<f64>),
    AverageAbsoluteDeviation(AverageAbsoluteDeviationState<f64>),
    CentralMoment(CentralMomentState<f64>),
    StandardizedMoment(StandardizedMomentState<f64>),
    ControlVariate(ControlVariateState),
    Window(WindowState),
}

impl CalculatorState {
    /// Rebuilds the calculator this state was captured from.
    ///
    /// The restored calculator starts default-constructed and is then
    /// overwritten by the state, so no special constructor is required at
    /// the call site. Fails for function-backed window states, whose batch
    /// function is not serializable.
    pub fn into_calculator(self) -> Result<Box<dyn Snapshot>, StateError> {
        Ok(match self {
            CalculatorState::ArithmeticMean(s) => Box::new(ArithmeticMean::from_state(s)),
            CalculatorState::Moment(s) => Box::new(Moment::from_state(s)),
            CalculatorState::GeometricMean(s) => Box::new(GeometricMean::from_state(s)),
            CalculatorState::HarmonicMean(s) => Box::new(HarmonicMean::from_state(s)),
            CalculatorState::Variance(s) => Box::new(Variance::from_state(s)),
            CalculatorState::StandardDeviation(s) => Box::new(StandardDeviation::from_state(s)),
            CalculatorState::AverageAbsoluteDeviation(s) => {
                Box::new(AverageAbsoluteDeviation::from_state(s))
            }
            CalculatorState::CentralMoment(s) => Box::new(CentralMoment::from_state(s)),
            CalculatorState::StandardizedMoment(s) => Box::new(StandardizedMoment::from_state(s)),
            CalculatorState::ControlVariate(s) => Box::new(ControlVariate::from_state(s)?),
            CalculatorState::Window(s) => Box::new(Window::from_state(s)?),
        })
    }
}
