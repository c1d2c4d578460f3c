//! Winding detection for the cage boundary loop.

use super::Curve;
use crate::math::Complex;

/// Returns `true` if the control-point loop is traced clockwise.
///
/// Sums `(next.re - current.re) * (next.im + current.im)` over consecutive
/// pairs of the traversal loop; with y up, a positive sum means clockwise
/// (the indicator is minus twice the shoelace signed area).
///
/// The traversal loop takes each curve's indices without its terminal
/// anchor, which the next curve repeats as its first index.
pub(super) fn loop_is_clockwise(points: &[Complex], curves: &[Curve]) -> bool {
    let loop_ids: Vec<usize> = curves
        .iter()
        .flat_map(|curve| {
            let ids = curve.point_ids();
            ids[..ids.len() - 1].iter().copied()
        })
        .collect();
    if loop_ids.len() < 3 {
        return false;
    }
    let mut sum = 0.0;
    for (i, &id) in loop_ids.iter().enumerate() {
        let current = points[id];
        let next = points[loop_ids[(i + 1) % loop_ids.len()]];
        sum += (next.re - current.re) * (next.im + current.im);
    }
    sum > 0.0
}
