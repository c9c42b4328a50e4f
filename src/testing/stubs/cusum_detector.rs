use crate::calculators::ChangepointDetector;

/// Two-sided CUSUM changepoint detector for tests.
///
/// Anchors its reference level on the first observation and accumulates
/// deviations beyond the `drift` allowance in both directions; the surprise
/// statistic is the larger of the two accumulators. Crude but sufficient to
/// exercise the auto-resetting calculator against clean mean shifts.
#[derive(Debug, Clone)]
pub struct CusumDetector {
    drift: f64,
    reference: Option<f64>,
    upper: f64,
    lower: f64,
}

impl CusumDetector {
    pub fn new(drift: f64) -> Self {
        Self {
            drift,
            reference: None,
            upper: 0.0,
            lower: 0.0,
        }
    }
}

impl ChangepointDetector for CusumDetector {
    fn update(&mut self, x: f64) {
        let reference = *self.reference.get_or_insert(x);
        let deviation = x - reference;
        self.upper = (self.upper + deviation - self.drift).max(0.0);
        self.lower = (self.lower - deviation - self.drift).max(0.0);
    }

    fn statistic(&self) -> f64 {
        self.upper.max(self.lower)
    }

    fn clone_box(&self) -> Box<dyn ChangepointDetector> {
        Box::new(self.clone())
    }
}
