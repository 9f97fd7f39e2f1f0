use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Number of incoming road segments at an intersection.
pub const SEGMENTS: usize = 4;

/// One value per incoming segment, in N, E, S, W order.
pub type Segments = [Real; SEGMENTS];

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Copy a slice into a fixed segment array, rejecting any other length.
pub fn to_segments(values: &[Real], what: &'static str) -> Result<Segments, CoreError> {
    <Segments>::try_from(values).map_err(|_| CoreError::Length {
        what,
        expected: SEGMENTS,
        got: values.len(),
    })
}

/// Element-wise `max(x, 0)`.
pub fn clamp_non_negative(values: &Segments) -> Segments {
    values.map(|v| v.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn to_segments_rejects_wrong_length() {
        let err = to_segments(&[1.0, 2.0, 3.0], "state").unwrap_err();
        assert_eq!(
            err,
            CoreError::Length {
                what: "state",
                expected: 4,
                got: 3
            }
        );
        assert_eq!(to_segments(&[1.0, 2.0, 3.0, 4.0], "state").unwrap(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn clamp_zeroes_negatives_only() {
        assert_eq!(
            clamp_non_negative(&[-1.0, 2.0, -0.0, 3.5]),
            [0.0, 2.0, 0.0, 3.5]
        );
    }
}
