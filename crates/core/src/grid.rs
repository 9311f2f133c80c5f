use std::ops::Index;

use thiserror::Error;

/// A strictly increasing sequence of time points.
///
/// The grid partitions the integration interval into slices. Slice `i`
/// (for `1 <= i < len`) spans `[t[i-1], t[i]]`, so a grid of `m` points has
/// `m - 1` slices. A grid always holds at least one point and every point is
/// finite; both are checked on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    points: Vec<f64>,
}

/// Errors that can occur when constructing a [`TimeGrid`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("time grid must contain at least one point")]
    Empty,

    #[error("time point {index} is not finite")]
    NonFinite { index: usize },

    #[error("time point {index} does not increase on its predecessor")]
    NotIncreasing { index: usize },

    #[error("a linearly spaced grid over a non-empty interval needs at least two points")]
    TooFewPoints,
}

impl TimeGrid {
    /// Creates a grid from explicit time points.
    ///
    /// # Errors
    ///
    /// Returns an error if `points` is empty, contains a non-finite value, or
    /// is not strictly increasing.
    pub fn new(points: Vec<f64>) -> Result<Self, GridError> {
        if points.is_empty() {
            return Err(GridError::Empty);
        }
        if let Some(index) = points.iter().position(|t| !t.is_finite()) {
            return Err(GridError::NonFinite { index });
        }
        if let Some(index) = (1..points.len()).find(|&i| points[i] <= points[i - 1]) {
            return Err(GridError::NotIncreasing { index });
        }

        Ok(Self { points })
    }

    /// Creates a grid of `count` evenly spaced points from `start` to `end`
    /// inclusive.
    ///
    /// A single point is allowed only when `start == end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints are not finite, if `end <= start`
    /// with more than one point, or if `count` is too small for the interval.
    pub fn linspace(start: f64, end: f64, count: usize) -> Result<Self, GridError> {
        match count {
            0 => Err(GridError::Empty),
            1 if start == end => Self::new(vec![start]),
            1 => Err(GridError::TooFewPoints),
            _ => {
                let step = (end - start) / (count - 1) as f64;
                let mut points: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
                // Pin the endpoint exactly.
                points[count - 1] = end;
                Self::new(points)
            }
        }
    }

    /// Returns the number of time points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; a grid holds at least one point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the number of slices, one fewer than the number of points.
    #[must_use]
    pub fn slices(&self) -> usize {
        self.points.len() - 1
    }

    /// Returns the bounds `(t[i-1], t[i])` of slice `i`.
    ///
    /// Returns `None` for `i == 0` or `i >= len`.
    #[must_use]
    pub fn span(&self, slice: usize) -> Option<(f64, f64)> {
        if slice == 0 || slice >= self.points.len() {
            return None;
        }
        Some((self.points[slice - 1], self.points[slice]))
    }

    /// Iterates over `(slice, t0, t1)` for every slice in order.
    pub fn spans(&self) -> impl ExactSizeIterator<Item = (usize, f64, f64)> + '_ {
        self.points
            .windows(2)
            .enumerate()
            .map(|(i, w)| (i + 1, w[0], w[1]))
    }

    /// Returns the time points.
    #[must_use]
    pub fn points(&self) -> &[f64] {
        &self.points
    }
}

impl Index<usize> for TimeGrid {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.points[index]
    }
}

impl TryFrom<Vec<f64>> for TimeGrid {
    type Error = GridError;

    fn try_from(points: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl TryFrom<&[f64]> for TimeGrid {
    type Error = GridError;

    fn try_from(points: &[f64]) -> Result<Self, Self::Error> {
        Self::new(points.to_vec())
    }
}
