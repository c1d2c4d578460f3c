use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::cage::Cage;
use crate::coords::{compute_coefficients, compute_derivative_coefficients};
use crate::error::{Result, SolveError};
use crate::math::Complex;

/// Derivative order of the smoothness operator. Second-order variation
/// penalizes bending of the deformation map; fixed by design.
pub const SMOOTHNESS_ORDER: usize = 2;

/// Default smoothness weight (lambda).
pub const DEFAULT_SMOOTHNESS_WEIGHT: f64 = 1e-3;

/// Default Tikhonov ridge (epsilon).
pub const DEFAULT_TIKHONOV: f64 = 1e-8;

/// Relative pivot threshold below which the normal matrix is treated as
/// numerically singular.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// A point-to-point correspondence: `src` is a point of the enclosed
/// content, `dst` where the user dragged it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointConstraint {
    pub src: Complex,
    pub dst: Complex,
}

impl PointConstraint {
    /// Creates a new correspondence constraint.
    #[must_use]
    pub fn new(src: Complex, dst: Complex) -> Self {
        Self { src, dst }
    }
}

/// Regularization weights for [`solve_p2p`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveParams {
    /// Smoothness weight (lambda) on the second-derivative operator.
    pub lambda: f64,
    /// Tikhonov ridge (epsilon) added to the normal matrix diagonal.
    pub epsilon: f64,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_SMOOTHNESS_WEIGHT,
            epsilon: DEFAULT_TIKHONOV,
        }
    }
}

/// Solves for new cage control points satisfying the given point-to-point
/// constraints, returning a cage with the same topology and updated
/// points.
///
/// Builds the regularized normal equations
/// `(C0^H C0 + lambda C2^H C2 + epsilon I) x = C0^H d`, where `C0` holds
/// the order-0 Cauchy coefficient rows of the constraint sources, `C2`
/// the order-[`SMOOTHNESS_ORDER`] rows, and `d` the destinations, and
/// solves them by LU decomposition over complex scalars.
///
/// Fewer independent constraints than cage unknowns leave `C0^H C0`
/// singular; the lambda and epsilon terms mitigate, but do not eliminate,
/// that. A system that remains non-invertible within numerical tolerance
/// is reported as [`SolveError::SingularSystem`], never silently solved
/// to garbage.
///
/// # Errors
///
/// Returns [`SolveError::NoConstraints`] for an empty constraint list,
/// [`SolveError::SingularSystem`] as above, and coefficient-computation
/// errors if a constraint source lies exactly on a cage edge endpoint.
pub fn solve_p2p(cage: &Cage, constraints: &[PointConstraint], params: SolveParams) -> Result<Cage> {
    if constraints.is_empty() {
        return Err(SolveError::NoConstraints.into());
    }
    let srcs: Vec<Complex> = constraints.iter().map(|c| c.src).collect();
    let c0 = compute_coefficients(&srcs, cage)?.to_dense(cage)?;
    let c2 = compute_derivative_coefficients(&srcs, cage, SMOOTHNESS_ORDER)?.to_dense(cage)?;

    let unknowns = cage.points().len();
    debug!(
        constraints = constraints.len(),
        unknowns,
        lambda = params.lambda,
        epsilon = params.epsilon,
        "assembling regularized p2p system"
    );

    let dst = DVector::from_iterator(constraints.len(), constraints.iter().map(|c| c.dst));
    let c0h = c0.adjoint();
    let rhs = &c0h * &dst;
    let mut normal = &c0h * &c0;
    if params.lambda != 0.0 {
        normal += (c2.adjoint() * &c2) * Complex::new(params.lambda, 0.0);
    }
    if params.epsilon != 0.0 {
        normal += DMatrix::identity(unknowns, unknowns) * Complex::new(params.epsilon, 0.0);
    }

    let lu = normal.lu();
    let pivots = lu.u().diagonal();
    let mut min_pivot = f64::INFINITY;
    let mut max_pivot: f64 = 0.0;
    for pivot in &pivots {
        let modulus = pivot.norm();
        min_pivot = min_pivot.min(modulus);
        max_pivot = max_pivot.max(modulus);
    }
    if !max_pivot.is_finite() || min_pivot <= max_pivot * PIVOT_TOLERANCE {
        return Err(SolveError::SingularSystem.into());
    }

    let solution = lu.solve(&rhs).ok_or(SolveError::SingularSystem)?;
    if solution.iter().any(|p| !p.re.is_finite() || !p.im.is_finite()) {
        return Err(SolveError::SingularSystem.into());
    }

    cage.with_control_points(solution.iter().copied().collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CurvecageError;

    const P2P_TOLERANCE: f64 = 1e-6;

    /// Axis-aligned square cage, corners at (+-200, +-200), one cubic side
    /// per edge with collinear handles at 1/3 and 2/3.
    fn square_cage() -> Cage {
        let corners = [
            (-200.0, -200.0),
            (200.0, -200.0),
            (200.0, 200.0),
            (-200.0, 200.0),
        ];
        let mut points = Vec::new();
        for i in 0..4 {
            let (x0, y0) = corners[i];
            let (x1, y1) = corners[(i + 1) % 4];
            points.push(Complex::new(x0, y0));
            points.push(Complex::new(x0 + (x1 - x0) / 3.0, y0 + (y1 - y0) / 3.0));
            points.push(Complex::new(
                x0 + (x1 - x0) * 2.0 / 3.0,
                y0 + (y1 - y0) * 2.0 / 3.0,
            ));
        }
        let curves = vec![
            vec![0, 1, 2, 3],
            vec![3, 4, 5, 6],
            vec![6, 7, 8, 9],
            vec![9, 10, 11, 0],
        ];
        Cage::new(points, curves).unwrap()
    }

    /// Twelve well-spread interior sources, matching the cage's twelve
    /// complex unknowns.
    fn spread_sources() -> Vec<Complex> {
        vec![
            Complex::new(-100.0, -100.0),
            Complex::new(100.0, -100.0),
            Complex::new(100.0, 100.0),
            Complex::new(-100.0, 100.0),
            Complex::new(0.0, -150.0),
            Complex::new(150.0, 0.0),
            Complex::new(0.0, 150.0),
            Complex::new(-150.0, 0.0),
            Complex::new(-50.0, -50.0),
            Complex::new(50.0, -50.0),
            Complex::new(50.0, 50.0),
            Complex::new(-50.0, 50.0),
        ]
    }

    fn exact_params() -> SolveParams {
        SolveParams {
            lambda: 0.0,
            epsilon: 0.0,
        }
    }

    #[test]
    fn rejects_empty_constraint_list() {
        let err = solve_p2p(&square_cage(), &[], SolveParams::default()).unwrap_err();
        assert!(matches!(
            err,
            CurvecageError::Solve(SolveError::NoConstraints)
        ));
    }

    #[test]
    fn exact_solve_reproduces_destinations() {
        let cage = square_cage();
        let constraints: Vec<PointConstraint> = spread_sources()
            .into_iter()
            .map(|src| {
                let offset = Complex::new(0.1 * src.im + 15.0, -0.05 * src.re - 40.0);
                PointConstraint::new(src, src + offset)
            })
            .collect();
        let solved = solve_p2p(&cage, &constraints, exact_params()).unwrap();

        let srcs: Vec<Complex> = constraints.iter().map(|c| c.src).collect();
        let mapped = compute_coefficients(&srcs, &cage)
            .unwrap()
            .map_points(&solved)
            .unwrap();
        for (c, image) in constraints.iter().zip(&mapped) {
            assert!(
                (image - c.dst).norm() < P2P_TOLERANCE,
                "{} mapped to {image}, wanted {}",
                c.src,
                c.dst
            );
        }
    }

    #[test]
    fn translation_constraints_translate_the_cage() {
        let cage = square_cage();
        let shift = Complex::new(-12.5, 31.0);
        let constraints: Vec<PointConstraint> = spread_sources()
            .into_iter()
            .map(|src| PointConstraint::new(src, src + shift))
            .collect();
        let solved = solve_p2p(&cage, &constraints, exact_params()).unwrap();
        for (old, new) in cage.points().iter().zip(solved.points()) {
            assert!(((old + shift) - new).norm() < P2P_TOLERANCE);
        }
    }

    #[test]
    fn identity_constraints_keep_the_cage() {
        let cage = square_cage();
        let constraints: Vec<PointConstraint> = spread_sources()
            .into_iter()
            .map(|src| PointConstraint::new(src, src))
            .collect();
        let solved = solve_p2p(&cage, &constraints, exact_params()).unwrap();
        for (old, new) in cage.points().iter().zip(solved.points()) {
            assert!((old - new).norm() < P2P_TOLERANCE);
        }
    }

    #[test]
    fn regularized_single_constraint_solves() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let cage = square_cage();
        let constraints = [PointConstraint::new(
            Complex::new(0.0, 0.0),
            Complex::new(25.0, 10.0),
        )];
        let solved = solve_p2p(&cage, &constraints, SolveParams::default()).unwrap();
        assert_eq!(solved.points().len(), cage.points().len());
        assert!(solved
            .points()
            .iter()
            .all(|p| p.re.is_finite() && p.im.is_finite()));
    }

    #[test]
    fn unregularized_underdetermined_system_is_singular() {
        let cage = square_cage();
        let constraints = [PointConstraint::new(
            Complex::new(0.0, 0.0),
            Complex::new(25.0, 10.0),
        )];
        let err = solve_p2p(&cage, &constraints, exact_params()).unwrap_err();
        assert!(matches!(
            err,
            CurvecageError::Solve(SolveError::SingularSystem)
        ));
    }
}
