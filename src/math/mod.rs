pub mod combinatorics;

/// Complex scalar used for planar coordinates and Cauchy coefficients.
pub type Complex = nalgebra::Complex<f64>;

/// 2D point type (bounding boxes, picking positions).
pub type Point2 = nalgebra::Point2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;
