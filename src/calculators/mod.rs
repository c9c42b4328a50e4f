mod arithmetic_mean;
mod auto_resetting;
mod average_absolute_deviation;
mod calculator;
mod central_moment;
mod control_variate;
mod covariance;
mod geometric_mean;
mod harmonic_mean;
mod moment;
mod standard_deviation;
mod standardized_moment;
mod state;
mod variance;
mod window;

pub mod factories;

pub use arithmetic_mean::{ArithmeticMean, ArithmeticMeanState};
pub use auto_resetting::{AutoResetting, AutoResettingState, ChangepointDetector, DEFAULT_THRESHOLD};
pub use average_absolute_deviation::{AverageAbsoluteDeviation, AverageAbsoluteDeviationState};
pub use calculator::Calculator;
pub use central_moment::{CentralMoment, CentralMomentState};
pub use control_variate::{ControlVariate, ControlVariateState};
pub use covariance::{Covariance, CovarianceState};
pub use geometric_mean::{GeometricMean, GeometricMeanState};
pub use harmonic_mean::{HarmonicMean, HarmonicMeanState};
pub use moment::{Moment, MomentState};
pub use standard_deviation::{StandardDeviation, StandardDeviationState};
pub use standardized_moment::{StandardizedMoment, StandardizedMomentState};
pub use state::{CalculatorState, Snapshot, StateError};
pub use variance::{Variance, VarianceState};
pub use window::{Window, WindowFunction, WindowState};
