/// Online statistic over a stream of observations.
///
/// Implementations accept observations incrementally via [`append`] and
/// expose the current estimate via [`statistic`]. Before the first
/// observation (and immediately after [`reset`]) the statistic is undefined:
/// NaN for scalar calculators. Calculators that need a minimum number of
/// observations (e.g. variance needs two) keep returning NaN until they have
/// them; callers check for NaN rather than handling errors.
///
/// `append` is O(1) amortized and must not retain the observation; the one
/// deliberate exception is the window calculator, which keeps a bounded
/// buffer by design. A calculator instance belongs to a single logical
/// stream; concurrent producers must serialize `append` calls externally.
///
/// [`append`]: Calculator::append
/// [`statistic`]: Calculator::statistic
/// [`reset`]: Calculator::reset
pub trait Calculator {
    /// Observation type: a scalar, an elementwise vector, or a pair for
    /// bivariate calculators.
    type Input;

    /// Statistic type; same shape as the observations for elementwise use.
    type Output;

    /// Incorporates a new observation.
    fn append(&mut self, x: Self::Input);

    /// Incorporates a sequence of observations in order.
    fn extend(&mut self, xs: &[Self::Input])
    where
        Self::Input: Clone,
    {
        for x in xs {
            self.append(x.clone());
        }
    }

    /// Returns the current estimate, NaN while undefined.
    fn statistic(&self) -> Self::Output;

    /// Number of observations since construction or the last [`reset`].
    ///
    /// [`reset`]: Calculator::reset
    fn count(&self) -> usize;

    /// Restores the zero state: count 0, statistic undefined. Recursively
    /// resets any owned inner calculators.
    fn reset(&mut self);
}
