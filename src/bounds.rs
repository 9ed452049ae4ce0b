//! Bounds calculator
//!
//! Turns user-supplied relative `start`/`end` arguments into a clamped
//! window over a sequence of `len` elements. Negative positions count from
//! the end. Arithmetic stays in `f64` until the result is clamped to
//! `[0, len]`, so no input can overflow.

use crate::error::ViewResult;
use crate::value::Value;

/// A normalized half-open window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub from: usize,
    pub to: usize,
    /// `max(to - from, 0)`
    pub count: usize,
}

impl Bounds {
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            count: to.saturating_sub(from),
        }
    }

    /// Coerce and clamp `start`/`end`. An undefined `end` means `len`.
    ///
    /// Coercion may run user code, so callers revalidate their view after
    /// this returns.
    pub fn normalize(start: &Value, end: &Value, len: usize, op: &'static str) -> ViewResult<Self> {
        let from = relative_index(start.to_integer_or_infinity(op)?, len);
        let to = if end.is_undefined() {
            len
        } else {
            relative_index(end.to_integer_or_infinity(op)?, len)
        };
        Ok(Self::new(from, to))
    }

    /// Clamp already-coerced integral positions.
    pub fn from_relative(start: f64, end: Option<f64>, len: usize) -> Self {
        let from = relative_index(start, len);
        let to = end.map_or(len, |end| relative_index(end, len));
        Self::new(from, to)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Shrink the window so it ends at or before `len`.
    pub fn clamp_to(&self, len: usize) -> Self {
        Self::new(self.from.min(len), self.to.min(len))
    }
}

/// Clamp one integral relative position into `[0, len]`.
pub fn relative_index(relative: f64, len: usize) -> usize {
    let len_f = len as f64;
    let index = if relative < 0.0 {
        (len_f + relative).max(0.0) as usize
    } else {
        relative.min(len_f) as usize
    };
    // `len as f64` rounds up near usize::MAX.
    index.min(len)
}

/// Coerce a single start argument; the search routines use only this half.
pub fn start_index(value: &Value, len: usize, op: &'static str) -> ViewResult<usize> {
    Ok(relative_index(value.to_integer_or_infinity(op)?, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(start: f64, end: Option<f64>, len: usize) -> Bounds {
        let end = end.map_or(Value::Undefined, Value::from);
        Bounds::normalize(&Value::from(start), &end, len, "test").unwrap()
    }

    #[test]
    fn test_positive_and_negative() {
        assert_eq!(norm(1.0, Some(3.0), 5), Bounds::new(1, 3));
        assert_eq!(norm(-2.0, None, 5), Bounds::new(3, 5));
        assert_eq!(norm(-10.0, Some(-1.0), 5), Bounds::new(0, 4));
        assert_eq!(norm(10.0, None, 5), Bounds::new(5, 5));
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let b = norm(4.0, Some(1.0), 5);
        assert_eq!(b.count, 0);
        assert!(b.is_empty());
    }

    #[test]
    fn test_special_values() {
        assert_eq!(norm(f64::NAN, Some(f64::INFINITY), 5), Bounds::new(0, 5));
        assert_eq!(norm(-0.0, Some(f64::NEG_INFINITY), 5), Bounds::new(0, 0));
        assert_eq!(norm(1.9, Some(-1.9), 5), Bounds::new(1, 4));
        assert_eq!(norm(-1.0, None, 0), Bounds::new(0, 0));
    }

    #[test]
    fn test_clamp_to() {
        assert_eq!(Bounds::new(2, 8).clamp_to(5), Bounds::new(2, 5));
        assert_eq!(Bounds::new(6, 8).clamp_to(5).count, 0);
    }

    #[test]
    fn test_start_index() {
        assert_eq!(start_index(&Value::from(-2), 10, "t").unwrap(), 8);
        assert_eq!(start_index(&Value::Undefined, 10, "t").unwrap(), 0);
    }
}
