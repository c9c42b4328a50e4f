/// Numeric value flowing through a calculator: a scalar or a fixed-width
/// vector treated elementwise.
///
/// The update formulas only need elementwise arithmetic, elementwise
/// predicates and the NaN-lane merge, so the trait captures exactly those.
/// Statistics over vectors have the same shape as the observations; mixing
/// shapes within one stream is a caller error.
pub trait Sample: Clone + PartialEq + std::fmt::Debug + 'static {
    /// The undefined statistic: scalar NaN, or the empty vector (an
    /// elementwise statistic has no shape before the first observation).
    fn nan() -> Self;

    /// Applies `f` to every element.
    fn map(&self, f: impl Fn(f64) -> f64) -> Self;

    /// Combines two same-shaped values elementwise.
    ///
    /// Panics if the shapes differ.
    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self;

    /// True if `pred` holds for every element.
    fn all(&self, pred: impl Fn(f64) -> bool) -> bool;

    /// Overwrites every NaN lane of `self` with the corresponding lane of
    /// `src`. This is the elementwise "self-healing" step of the mean and
    /// moment recurrences: lanes whose running value is undefined restart
    /// from the incoming observation while healthy lanes keep accumulating.
    fn merge_nan(&mut self, src: &Self);
}

impl Sample for f64 {
    #[inline]
    fn nan() -> Self {
        f64::NAN
    }

    #[inline]
    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        f(*self)
    }

    #[inline]
    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        f(*self, *other)
    }

    #[inline]
    fn all(&self, pred: impl Fn(f64) -> bool) -> bool {
        pred(*self)
    }

    #[inline]
    fn merge_nan(&mut self, src: &Self) {
        if self.is_nan() {
            *self = *src;
        }
    }
}

impl Sample for Vec<f64> {
    fn nan() -> Self {
        Vec::new()
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        self.iter().map(|&v| f(v)).collect()
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        assert_eq!(
            self.len(),
            other.len(),
            "elementwise operation on vectors of different lengths"
        );
        self.iter().zip(other).map(|(&a, &b)| f(a, b)).collect()
    }

    fn all(&self, pred: impl Fn(f64) -> bool) -> bool {
        self.iter().all(|&v| pred(v))
    }

    fn merge_nan(&mut self, src: &Self) {
        assert_eq!(
            self.len(),
            src.len(),
            "elementwise operation on vectors of different lengths"
        );
        for (lane, &replacement) in self.iter_mut().zip(src) {
            if lane.is_nan() {
                *lane = replacement;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_merge_nan_repairs_only_nan() {
        let mut a = f64::NAN;
        a.merge_nan(&3.0);
        assert_eq!(a, 3.0);

        let mut b = 1.5;
        b.merge_nan(&3.0);
        assert_eq!(b, 1.5);
    }

    #[test]
    fn vector_merge_nan_is_per_lane() {
        let mut v = vec![1.0, f64::NAN, 2.0, f64::NAN];
        v.merge_nan(&vec![9.0, 8.0, 7.0, 6.0]);
        assert_eq!(v, vec![1.0, 8.0, 2.0, 6.0]);
    }

    #[test]
    fn vector_zip_with_applies_elementwise() {
        let a = vec![1.0, 2.0];
        let b = vec![10.0, 20.0];
        assert_eq!(a.zip_with(&b, |x, y| y - x), vec![9.0, 18.0]);
    }

    #[test]
    #[should_panic]
    fn vector_zip_with_rejects_shape_mismatch() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0];
        let _ = a.zip_with(&b, |x, y| x + y);
    }
}
