mod orientation;

use crate::error::{CageError, GeometryError, Result};
use crate::math::combinatorics::{binomial, MAX_DEGREE};
use crate::math::{Complex, Point2};

/// Default number of polygonization samples per curve.
pub const DEFAULT_SAMPLES_PER_CURVE: u32 = 100;

/// One Bezier segment of a cage: ordered indices into the cage's control
/// points. Degree = index count - 1.
///
/// The first and last indices are anchors shared with the neighbouring
/// curves; interior indices are handles owned by this curve alone. Curves
/// are constructed and validated by [`Cage::new`], so any `Curve`
/// observable through a cage is well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    point_ids: Vec<usize>,
}

impl Curve {
    pub(crate) fn from_ids(point_ids: Vec<usize>) -> Self {
        Self { point_ids }
    }

    /// Returns the ordered control-point indices of this curve.
    #[must_use]
    pub fn point_ids(&self) -> &[usize] {
        &self.point_ids
    }

    /// Returns the polynomial degree of this curve.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.point_ids.len() - 1
    }

    /// Returns the index of the first anchor point.
    #[must_use]
    pub fn first_id(&self) -> usize {
        self.point_ids[0]
    }

    /// Returns the index of the last anchor point.
    #[must_use]
    pub fn last_id(&self) -> usize {
        self.point_ids[self.point_ids.len() - 1]
    }

    fn reverse(&mut self) {
        self.point_ids.reverse();
    }
}

/// An axis-aligned bounding box in the plane.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

/// A closed loop of Bezier curves enclosing deformable content.
///
/// After construction the loop is traced counter-clockwise: curve `i`'s
/// last anchor equals curve `i + 1`'s first anchor (indices mod curve
/// count). Simplicity of the loop is assumed, not verified.
#[derive(Debug, Clone)]
pub struct Cage {
    points: Vec<Complex>,
    curves: Vec<Curve>,
}

impl Cage {
    /// Creates a cage from control points and per-curve index lists.
    ///
    /// The raw winding is normalized exactly once: if the loop is traced
    /// clockwise (positive winding indicator, y up), the curve list and
    /// each curve's index list are reversed. Stored point coordinates are
    /// never reordered.
    ///
    /// # Errors
    ///
    /// Returns [`CageError`] if there are no curves, a curve has fewer
    /// than 2 indices, an index is out of range, or consecutive curves do
    /// not chain into a closed loop, and [`GeometryError::DegreeTooLarge`]
    /// if a curve's degree exceeds [`MAX_DEGREE`].
    pub fn new(points: Vec<Complex>, curves: Vec<Vec<usize>>) -> Result<Self> {
        if curves.is_empty() {
            return Err(CageError::NoCurves.into());
        }
        for (i, ids) in curves.iter().enumerate() {
            if ids.len() < 2 {
                return Err(CageError::CurveTooShort {
                    curve: i,
                    count: ids.len(),
                }
                .into());
            }
            if ids.len() - 1 > MAX_DEGREE {
                return Err(GeometryError::DegreeTooLarge {
                    degree: ids.len() - 1,
                    max: MAX_DEGREE,
                }
                .into());
            }
            for &id in ids {
                if id >= points.len() {
                    return Err(CageError::PointIdOutOfRange {
                        curve: i,
                        id,
                        point_count: points.len(),
                    }
                    .into());
                }
            }
        }
        let mut curves: Vec<Curve> = curves.into_iter().map(Curve::from_ids).collect();
        for i in 0..curves.len() {
            let next = (i + 1) % curves.len();
            if curves[i].last_id() != curves[next].first_id() {
                return Err(CageError::NotClosed { curve: i, next }.into());
            }
        }

        if orientation::loop_is_clockwise(&points, &curves) {
            curves.reverse();
            for curve in &mut curves {
                curve.reverse();
            }
        }

        Ok(Self { points, curves })
    }

    /// Returns the stored control points.
    #[must_use]
    pub fn points(&self) -> &[Complex] {
        &self.points
    }

    /// Returns the curves of the cage in traversal order.
    #[must_use]
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Returns a cage with the same topology and new control points.
    ///
    /// Used after a deformation solve; the winding is not re-normalized,
    /// since a deformation may legitimately flip it.
    ///
    /// # Errors
    ///
    /// Returns [`CageError::PointCountMismatch`] if the new point count
    /// differs from the stored one.
    pub fn with_control_points(&self, points: Vec<Complex>) -> Result<Self> {
        if points.len() != self.points.len() {
            return Err(CageError::PointCountMismatch {
                expected: self.points.len(),
                actual: points.len(),
            }
            .into());
        }
        Ok(Self {
            points,
            curves: self.curves.clone(),
        })
    }

    /// Evaluates curve `curve` at parameter `t` in the Bernstein basis.
    ///
    /// `t = 0` reproduces the curve's first control point and `t = 1` its
    /// last.
    ///
    /// # Errors
    ///
    /// Returns [`CageError::CurveIndexOutOfRange`] for a bad curve index
    /// and [`GeometryError::ParameterOutOfRange`] for `t` outside [0, 1].
    pub fn sample_curve(&self, curve: usize, t: f64) -> Result<Complex> {
        let Some(curve) = self.curves.get(curve) else {
            return Err(CageError::CurveIndexOutOfRange {
                index: curve,
                curve_count: self.curves.len(),
            }
            .into());
        };
        if !(0.0..=1.0).contains(&t) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "t",
                value: t,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        Ok(self.bernstein_point(curve, t))
    }

    /// Samples every curve at `samples_per_curve` uniform parameters over
    /// `t` in [0, 1), concatenated in curve order.
    ///
    /// The half-open interval leaves each terminal anchor to the next
    /// curve's `t = 0` sample, so shared anchors appear exactly once. The
    /// iterator is lazy and cheap to re-create for another pass.
    pub fn polygonize(&self, samples_per_curve: u32) -> impl Iterator<Item = Complex> + '_ {
        self.curves.iter().flat_map(move |curve| {
            (0..samples_per_curve).map(move |i| {
                let t = f64::from(i) / f64::from(samples_per_curve);
                self.bernstein_point(curve, t)
            })
        })
    }

    /// Computes the axis-aligned bounding box over all control points.
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.points {
            min.x = min.x.min(p.re);
            min.y = min.y.min(p.im);
            max.x = max.x.max(p.re);
            max.y = max.y.max(p.im);
        }
        Aabb { min, max }
    }

    /// Returns the index of the control point nearest to `pos`, if any
    /// lies within `threshold`. Used for interactive handle picking.
    #[must_use]
    pub fn nearest_control_point(&self, pos: Point2, threshold: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            let dist = (p.re - pos.x).hypot(p.im - pos.y);
            if dist < threshold && best.is_none_or(|(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Returns the anchor endpoints `(start, end)` of a curve.
    pub(crate) fn curve_endpoints(&self, curve: &Curve) -> (Complex, Complex) {
        (self.points[curve.first_id()], self.points[curve.last_id()])
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn bernstein_point(&self, curve: &Curve, t: f64) -> Complex {
        let degree = curve.degree();
        let mut sum = Complex::new(0.0, 0.0);
        for (i, &id) in curve.point_ids().iter().enumerate() {
            let basis =
                binomial(degree, i) * t.powi(i as i32) * (1.0 - t).powi((degree - i) as i32);
            sum += self.points[id] * basis;
        }
        sum
    }
}
