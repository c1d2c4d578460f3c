//! Closed-form contour integral of Bernstein basis functions against the
//! Cauchy kernel.

use crate::error::{GeometryError, Result};
use crate::math::combinatorics::{binomial, factorial, MAX_DEGREE};
use crate::math::{Complex, TOLERANCE};

/// Computes the coefficient of the `local_index`-th Bernstein basis
/// function of a degree-`degree` Bezier edge against the Cauchy kernel,
/// differentiated `order` times, evaluated at the query point `z`.
///
/// `order = 0` yields the plain Cauchy-coordinate coefficient, normalized
/// by `1/(2*pi*i)`; `order = 2` is the second-derivative operator used for
/// smoothness regularization and carries no kernel normalization.
///
/// The antiderivative is evaluated symbolically: each `(k, l)` term of the
/// expansion is a rational monomial in `b = edge_end - z` and
/// `b_prev = edge_start - z`, except where the denominator
/// `degree - local_index - l + k - order` vanishes, in which case the
/// exact log antiderivative takes its place. Only integer powers,
/// binomial coefficients and one principal-branch logarithm per singular
/// term are needed; there is no quadrature.
///
/// # Errors
///
/// Returns [`GeometryError::DegreeTooLarge`] for degrees outside
/// `[1, MAX_DEGREE]` and [`GeometryError::Degenerate`] for a zero-length
/// edge or a query point lying exactly on one of the edge endpoints.
/// Interior cage points and distinct edge endpoints never trip these;
/// hitting one is a caller validation error, not a runtime condition to
/// retry.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_precision_loss)]
pub fn edge_coefficient(
    z: Complex,
    edge_start: Complex,
    edge_end: Complex,
    local_index: usize,
    degree: usize,
    order: usize,
) -> Result<Complex> {
    if degree == 0 || degree > MAX_DEGREE {
        return Err(GeometryError::DegreeTooLarge {
            degree,
            max: MAX_DEGREE,
        }
        .into());
    }
    debug_assert!(local_index <= degree);
    debug_assert!(order <= MAX_DEGREE);

    let a = edge_end - edge_start;
    if a.norm() < TOLERANCE {
        return Err(GeometryError::Degenerate("zero-length cage edge".into()).into());
    }
    let b = edge_end - z;
    let b_prev = edge_start - z;
    if b.norm() < TOLERANCE || b_prev.norm() < TOLERANCE {
        return Err(GeometryError::Degenerate(
            "query point coincides with a cage edge endpoint".into(),
        )
        .into());
    }

    let m = local_index;
    let mut sum = Complex::new(0.0, 0.0);
    for k in 0..=m {
        for l in 0..=(degree - m) {
            let sign = if (degree + k + l) % 2 == 0 { 1.0 } else { -1.0 };
            let mut coef = binomial(m, k) * binomial(degree - m, l) * sign;
            // Exponent of the would-be rational antiderivative; equal to
            // `order` exactly where its denominator vanishes.
            let pole = degree + k - m - l;
            let term = if pole == order {
                b.powi(l as i32) * b_prev.powi((m - k) as i32) * (b / b_prev).ln()
            } else {
                coef /= pole as f64 - order as f64;
                b.powi((degree + k - m) as i32 - order as i32) * b_prev.powi((m - k) as i32)
                    - b.powi(l as i32) * b_prev.powi((degree - l) as i32 - order as i32)
            };
            sum += term * coef;
        }
    }

    let mut result = sum * (binomial(degree, m) * factorial(order)) / a.powi(degree as i32);
    if order == 0 {
        result /= Complex::new(0.0, std::f64::consts::TAU);
    }
    Ok(result)
}
