use crate::PtError;

/// Floating point type used throughout the system.
pub type Real = f64;

/// Fluid quantity, in abstract volume units.
pub type Volume = Real;

/// Tolerances for test assertions and diagnostics.
///
/// Rule conditions never use these: register comparisons are exact.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PtError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PtError::NonFinite { what, value: v })
    }
}

/// Finite and `>= 0`.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, PtError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(PtError::Negative { what, value: v });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances::default();
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
    fn ensure_non_negative_rejects_negative_and_inf() {
        assert_eq!(ensure_non_negative(0.0, "v"), Ok(0.0));
        assert!(matches!(
            ensure_non_negative(-1.0, "v"),
            Err(PtError::Negative { .. })
        ));
        assert!(matches!(
            ensure_non_negative(Real::INFINITY, "v"),
            Err(PtError::NonFinite { .. })
        ));
    }

    proptest::proptest! {
        #[test]
        fn nearly_equal_is_symmetric(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let tol = Tolerances::default();
            proptest::prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }

        #[test]
        fn non_negative_accepts_exactly_finite_nonnegatives(v in proptest::num::f64::ANY) {
            proptest::prop_assert_eq!(
                ensure_non_negative(v, "v").is_ok(),
                v.is_finite() && v >= 0.0
            );
        }
    }
}
