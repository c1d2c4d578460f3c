use nalgebra::DMatrix;

use crate::cage::Cage;
use crate::error::{CageError, Result};
use crate::math::Complex;

use super::integral::edge_coefficient;

/// Cauchy coefficients of a query point set against a cage, stored
/// unmerged as `[query][curve][local index]`.
///
/// Shared anchor points therefore appear twice per query row — once as a
/// curve's terminal local point and once as the next curve's initial
/// one — and both contributions are summed, never overwritten, when rows
/// are evaluated or merged. For order 0 each row forms a partition of
/// unity: its entries sum to 1+0i for any query point inside the cage.
///
/// The matrix is an immutable snapshot of the cage it was computed
/// against; evaluation against a cage with a different layout is
/// rejected rather than silently misread.
#[derive(Debug, Clone)]
pub struct CoefficientMatrix {
    entries: Vec<Vec<Vec<Complex>>>,
    order: usize,
}

/// Computes the order-0 Cauchy coefficient matrix for `points` against
/// `cage`.
///
/// # Errors
///
/// Returns [`crate::error::GeometryError`] if a query point lies exactly
/// on a cage edge endpoint or an edge is degenerate.
pub fn compute_coefficients(points: &[Complex], cage: &Cage) -> Result<CoefficientMatrix> {
    compute_with_order(points, cage, 0)
}

/// Computes the `order`-th derivative coefficient matrix for `points`
/// against `cage`. The deformation solver uses order 2 as its smoothness
/// operator.
///
/// # Errors
///
/// As [`compute_coefficients`].
pub fn compute_derivative_coefficients(
    points: &[Complex],
    cage: &Cage,
    order: usize,
) -> Result<CoefficientMatrix> {
    compute_with_order(points, cage, order)
}

fn compute_with_order(points: &[Complex], cage: &Cage, order: usize) -> Result<CoefficientMatrix> {
    let mut entries = Vec::with_capacity(points.len());
    for &z in points {
        let mut row = Vec::with_capacity(cage.curves().len());
        for curve in cage.curves() {
            let (start, end) = cage.curve_endpoints(curve);
            let degree = curve.degree();
            let mut locals = Vec::with_capacity(degree + 1);
            for m in 0..=degree {
                locals.push(edge_coefficient(z, start, end, m, degree, order)?);
            }
            row.push(locals);
        }
        entries.push(row);
    }
    Ok(CoefficientMatrix { entries, order })
}

impl CoefficientMatrix {
    /// Returns the number of query points this matrix was computed for.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the derivative order this matrix was computed at.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the per-curve coefficient blocks of one query row.
    #[must_use]
    pub fn row(&self, query: usize) -> Option<&[Vec<Complex>]> {
        self.entries.get(query).map(Vec::as_slice)
    }

    /// Sums every coefficient of one query row over all curves and local
    /// indices. For order 0 this is 1+0i for interior points.
    #[must_use]
    pub fn row_sum(&self, query: usize) -> Option<Complex> {
        self.entries.get(query).map(|row| {
            row.iter()
                .flat_map(|locals| locals.iter())
                .sum()
        })
    }

    /// Evaluates the mapped image of every query point under `cage`:
    /// per row, the sum of `coefficient * control point` over all
    /// (curve, local index) pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CageError::LayoutMismatch`] if `cage` does not have the
    /// curve layout this matrix was computed against.
    pub fn map_points(&self, cage: &Cage) -> Result<Vec<Complex>> {
        self.check_layout(cage)?;
        let mut mapped = Vec::with_capacity(self.entries.len());
        for row in &self.entries {
            let mut sum = Complex::new(0.0, 0.0);
            for (curve, locals) in cage.curves().iter().zip(row) {
                for (&coefficient, &id) in locals.iter().zip(curve.point_ids()) {
                    sum += coefficient * cage.points()[id];
                }
            }
            mapped.push(sum);
        }
        Ok(mapped)
    }

    /// Merges the unmerged storage into a dense query-by-control-point
    /// matrix, summing the two contributions of every shared anchor.
    ///
    /// This is the column layout the deformation solver works in.
    ///
    /// # Errors
    ///
    /// Returns [`CageError::LayoutMismatch`] if `cage` does not have the
    /// curve layout this matrix was computed against.
    pub fn to_dense(&self, cage: &Cage) -> Result<DMatrix<Complex>> {
        self.check_layout(cage)?;
        let mut dense = DMatrix::zeros(self.entries.len(), cage.points().len());
        for (q, row) in self.entries.iter().enumerate() {
            for (curve, locals) in cage.curves().iter().zip(row) {
                for (&coefficient, &id) in locals.iter().zip(curve.point_ids()) {
                    dense[(q, id)] += coefficient;
                }
            }
        }
        Ok(dense)
    }

    fn check_layout(&self, cage: &Cage) -> Result<()> {
        for row in &self.entries {
            if row.len() != cage.curves().len() {
                return Err(CageError::LayoutMismatch(format!(
                    "matrix row has {} curve blocks, cage has {} curves",
                    row.len(),
                    cage.curves().len()
                ))
                .into());
            }
            for (j, (curve, locals)) in cage.curves().iter().zip(row).enumerate() {
                if locals.len() != curve.degree() + 1 {
                    return Err(CageError::LayoutMismatch(format!(
                        "curve {j} expects {} local coefficients, matrix row has {}",
                        curve.degree() + 1,
                        locals.len()
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }
}
