use log::debug;
use serde::{Deserialize, Serialize};

use crate::calculators::state::{CalculatorState, Snapshot, StateError};
use crate::calculators::Calculator;

/// Streaming changepoint detector consulted by [`AutoResetting`].
///
/// Fed every observation; exposes a scalar "surprise" statistic that grows
/// when the generating distribution of the stream appears to have shifted.
/// The algorithm itself is injected by the caller, not fixed by this crate.
pub trait ChangepointDetector {
    /// Incorporates a new observation.
    fn update(&mut self, x: f64);

    /// The current surprise statistic.
    fn statistic(&self) -> f64;

    /// Value-based copy, used to keep a pristine template for [`reset`].
    ///
    /// [`reset`]: Calculator::reset
    fn clone_box(&self) -> Box<dyn ChangepointDetector>;
}

impl Clone for Box<dyn ChangepointDetector> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Minimum observations between consecutive automatic resets, guarding
/// against reset-thrashing while the detector statistic stays elevated.
const RESET_COOLDOWN: usize = 10;

/// Default surprise threshold above which the target is restarted.
pub const DEFAULT_THRESHOLD: f64 = 1.5e-5;

/// Restarts a target calculator when a changepoint is detected.
///
/// Every observation goes to the detector first; when its surprise
/// statistic exceeds the threshold, and at least ten
/// observations have elapsed since the previous automatic reset, the target
/// is reset before receiving the observation. The statistic therefore
/// re-converges to the post-shift regime instead of blending it with stale
/// history.
///
/// The detector supplied at construction is cloned into a pristine
/// template, so [`reset`] restores the detector to its initial state
/// without reconstructing it. Detection is best-effort: there is no error
/// path for a misbehaving detector beyond whatever it does itself.
///
/// [`reset`]: Calculator::reset
pub struct AutoResetting {
    target: Box<dyn Snapshot>,
    detector: Box<dyn ChangepointDetector>,
    pristine_detector: Box<dyn ChangepointDetector>,
    threshold: f64,
    last_reset_count: Option<usize>,
    count: usize,
}

/// Plain state record for [`AutoResetting`].
///
/// The detector is not part of the state; it is re-injected on restore via
/// [`AutoResetting::from_state`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoResettingState {
    pub count: usize,
    pub threshold: f64,
    pub last_reset_count: Option<usize>,
    pub target: Box<CalculatorState>,
}

impl AutoResetting {
    pub fn new(target: Box<dyn Snapshot>, detector: Box<dyn ChangepointDetector>) -> Self {
        Self {
            target,
            pristine_detector: detector.clone_box(),
            detector,
            threshold: DEFAULT_THRESHOLD,
            last_reset_count: None,
            count: 0,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Observation index of the most recent automatic reset, if any.
    pub fn last_reset_count(&self) -> Option<usize> {
        self.last_reset_count
    }

    pub fn state(&self) -> Option<AutoResettingState> {
        Some(AutoResettingState {
            count: self.count,
            threshold: self.threshold,
            last_reset_count: self.last_reset_count,
            target: Box::new(self.target.capture()?),
        })
    }

    /// Rebuilds from a state record, re-injecting a detector.
    pub fn from_state(
        state: AutoResettingState,
        detector: Box<dyn ChangepointDetector>,
    ) -> Result<Self, StateError> {
        Ok(Self {
            target: state.target.into_calculator()?,
            pristine_detector: detector.clone_box(),
            detector,
            threshold: state.threshold,
            last_reset_count: state.last_reset_count,
            count: state.count,
        })
    }

    fn cooldown_elapsed(&self) -> bool {
        self.last_reset_count
            .is_none_or(|at| self.count - at >= RESET_COOLDOWN)
    }
}

impl Calculator for AutoResetting {
    type Input = f64;
    type Output = f64;

    fn append(&mut self, x: f64) {
        self.count += 1;
        self.detector.update(x);
        if self.cooldown_elapsed() && self.detector.statistic() > self.threshold {
            debug!(
                "changepoint at observation {} (surprise {:.6} > threshold {:.6}), restarting target",
                self.count,
                self.detector.statistic(),
                self.threshold
            );
            self.target.reset();
            self.last_reset_count = Some(self.count);
        }
        self.target.append(x);
    }

    fn statistic(&self) -> f64 {
        self.target.statistic()
    }

    fn count(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.count = 0;
        self.last_reset_count = None;
        self.target.reset();
        self.detector = self.pristine_detector.clone_box();
    }
}

// not capturable through the tagged enum: the detector must be re-injected
// through `AutoResetting::from_state`
impl Snapshot for AutoResetting {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::ArithmeticMean;
    use crate::testing::stubs::CusumDetector;

    #[test]
    fn stable_stream_never_resets() {
        let mut calc = AutoResetting::new(
            Box::new(ArithmeticMean::new()),
            Box::new(CusumDetector::new(1.0)),
        )
        .with_threshold(50.0);
        for _ in 0..100 {
            calc.append(0.1);
        }
        assert!(calc.last_reset_count().is_none());
        assert!((calc.statistic() - 0.1).abs() <= 1e-12);
        assert_eq!(calc.count(), 100);
    }

    #[test]
    fn converges_to_shifted_regime_after_changepoint() {
        let mut calc = AutoResetting::new(
            Box::new(ArithmeticMean::new()),
            Box::new(CusumDetector::new(1.0)),
        )
        .with_threshold(50.0);

        for _ in 0..20 {
            calc.append(0.0);
        }
        for _ in 0..30 {
            calc.append(100.0);
        }
        // without the reset the blended mean would sit near 60
        assert!(calc.last_reset_count().is_some());
        assert!((calc.statistic() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cooldown_limits_reset_frequency() {
        let mut calc = AutoResetting::new(
            Box::new(ArithmeticMean::new()),
            Box::new(CusumDetector::new(1.0)),
        )
        .with_threshold(50.0);

        for _ in 0..10 {
            calc.append(0.0);
        }
        for _ in 0..5 {
            calc.append(100.0);
        }
        let first_reset = calc.last_reset_count().unwrap();
        // the detector statistic stays elevated, but the next reset must
        // wait out the cooldown
        for _ in 0..5 {
            calc.append(100.0);
        }
        let second_reset = calc.last_reset_count().unwrap();
        assert!(second_reset == first_reset || second_reset - first_reset >= 10);
    }

    #[test]
    fn reset_restores_pristine_detector() {
        let mut calc = AutoResetting::new(
            Box::new(ArithmeticMean::new()),
            Box::new(CusumDetector::new(1.0)),
        )
        .with_threshold(50.0);

        for _ in 0..10 {
            calc.append(0.0);
        }
        for _ in 0..10 {
            calc.append(100.0);
        }
        assert!(calc.last_reset_count().is_some());

        calc.reset();
        assert_eq!(calc.count(), 0);
        assert!(calc.last_reset_count().is_none());
        assert!(calc.statistic().is_nan());

        // a restored detector re-anchors on the next stream
        for _ in 0..20 {
            calc.append(5.0);
        }
        assert!(calc.last_reset_count().is_none());
        assert!((calc.statistic() - 5.0).abs() <= 1e-12);
    }
}
