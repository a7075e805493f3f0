use crate::WfError;

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair.
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, WfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(WfError::NonFinite { what, value: v })
    }
}

/// Flow magnitude below which two values are considered both zero (m³/h).
pub const FLOW_EPSILON: Real = 1e-9;

/// Relative change between two magnitudes, scaled by the larger one.
///
/// Returns 0 when both are below [`FLOW_EPSILON`], so an all-zero branch
/// never holds up convergence.
pub fn relative_change(new: Real, old: Real) -> Real {
    let scale = new.abs().max(old.abs());
    if scale <= FLOW_EPSILON {
        0.0
    } else {
        (new - old).abs() / scale
    }
}

/// Blend `new` towards `old` with under-relaxation factor `omega` in (0, 1].
#[inline]
pub fn relax(new: Real, old: Real, omega: Real) -> Real {
    old + omega * (new - old)
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
    fn relative_change_handles_zero() {
        assert_eq!(relative_change(0.0, 0.0), 0.0);
        assert_eq!(relative_change(10.0, 0.0), 1.0);
        assert!((relative_change(10.0, 9.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn relax_blends() {
        assert_eq!(relax(10.0, 0.0, 0.5), 5.0);
        assert_eq!(relax(10.0, 4.0, 1.0), 10.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn relative_change_is_bounded(a in 0.0_f64..1e6, b in 0.0_f64..1e6) {
            let r = relative_change(a, b);
            prop_assert!((0.0..=1.0).contains(&r));
        }

        #[test]
        fn relax_stays_between(new in -1e3_f64..1e3, old in -1e3_f64..1e3, w in 0.01_f64..1.0) {
            let v = relax(new, old, w);
            prop_assert!(v >= new.min(old) - 1e-9 && v <= new.max(old) + 1e-9);
        }
    }
}
