/// The algebra a state must support to take part in a Parareal correction.
///
/// A Parareal sweep combines three propagated states per slice by addition and
/// subtraction, so those operations (plus scaling by a real number) are all the
/// integration core ever asks of a state. Every operation returns a new value;
/// the operands remain valid and can be compared or reused afterwards.
///
/// Implementations are provided for `f64`, fixed-size arrays, and `Vec<f64>`.
/// Enable the `ndarray` feature for `ndarray::Array1<f64>`.
///
/// Lengths of `Vec<f64>` operands must match. Mismatched lengths are a
/// contract violation and panic in debug builds.
pub trait Vector: Sized {
    /// Returns `self + other`.
    #[must_use]
    fn add(&self, other: &Self) -> Self;

    /// Returns `self - other`.
    #[must_use]
    fn sub(&self, other: &Self) -> Self;

    /// Returns `self * factor`.
    #[must_use]
    fn scale(&self, factor: f64) -> Self;
}

impl Vector for f64 {
    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn scale(&self, factor: f64) -> Self {
        self * factor
    }
}

impl<const N: usize> Vector for [f64; N] {
    fn add(&self, other: &Self) -> Self {
        std::array::from_fn(|i| self[i] + other[i])
    }

    fn sub(&self, other: &Self) -> Self {
        std::array::from_fn(|i| self[i] - other[i])
    }

    fn scale(&self, factor: f64) -> Self {
        self.map(|x| x * factor)
    }
}

impl Vector for Vec<f64> {
    fn add(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len(), "vector lengths differ");
        self.iter().zip(other).map(|(a, b)| a + b).collect()
    }

    fn sub(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len(), "vector lengths differ");
        self.iter().zip(other).map(|(a, b)| a - b).collect()
    }

    fn scale(&self, factor: f64) -> Self {
        self.iter().map(|x| x * factor).collect()
    }
}

#[cfg(feature = "ndarray")]
impl Vector for ndarray::Array1<f64> {
    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn scale(&self, factor: f64) -> Self {
        self.mapv(|x| x * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn scalar_algebra() {
        let x = 1.5_f64;

        assert_relative_eq!(x.add(&2.0), 3.5);
        assert_relative_eq!(x.sub(&2.0), -0.5);
        assert_relative_eq!(x.scale(4.0), 6.0);
    }

    #[test]
    fn array_algebra() {
        let a: [f64; 3] = [1.0, 2.0, 3.0];
        let b: [f64; 3] = [0.5, 0.5, 0.5];

        assert_eq!(a.add(&b), [1.5, 2.5, 3.5]);
        assert_eq!(a.sub(&b), [0.5, 1.5, 2.5]);
        assert_eq!(a.scale(2.0), [2.0, 4.0, 6.0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "vector lengths differ")]
    fn vec_length_mismatch_panics_in_debug() {
        let a: Vec<f64> = vec![1.0, 2.0];
        let b: Vec<f64> = vec![1.0];

        let _ = a.add(&b);
    }

    #[test]
    fn vec_algebra_leaves_operands_untouched() {
        let a: Vec<f64> = vec![1.0, -1.0];
        let b: Vec<f64> = vec![2.0, 3.0];

        let sum = a.add(&b);
        let diff = sum.sub(&b);

        assert_eq!(sum, vec![3.0, 2.0]);
        assert_eq!(diff, a);
        assert_eq!(a, vec![1.0, -1.0]);
        assert_eq!(b.scale(-1.0), vec![-2.0, -3.0]);
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn ndarray_algebra() {
        use ndarray::array;

        let a: ndarray::Array1<f64> = array![1.0, 2.0];
        let b: ndarray::Array1<f64> = array![3.0, 5.0];

        assert_eq!(a.add(&b), array![4.0, 7.0]);
        assert_eq!(b.sub(&a), array![2.0, 3.0]);
        assert_eq!(a.scale(0.5), array![0.5, 1.0]);
    }
}
