use thiserror::Error;

/// Top-level error type for the Curvecage deformation kernel.
#[derive(Debug, Error)]
pub enum CurvecageError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Cage(#[from] CageError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("curve degree {degree} exceeds the supported maximum {max}")]
    DegreeTooLarge { degree: usize, max: usize },
}

/// Errors related to cage topology and layout.
#[derive(Debug, Error)]
pub enum CageError {
    #[error("cage must contain at least one curve")]
    NoCurves,

    #[error("curve {curve} has {count} control point indices; at least 2 are required")]
    CurveTooShort { curve: usize, count: usize },

    #[error("curve {curve} references point {id}, but the cage stores {point_count} points")]
    PointIdOutOfRange {
        curve: usize,
        id: usize,
        point_count: usize,
    },

    #[error("cage boundary is not closed between curve {curve} and curve {next}")]
    NotClosed { curve: usize, next: usize },

    #[error("curve index {index} is out of range for a cage with {curve_count} curves")]
    CurveIndexOutOfRange { index: usize, curve_count: usize },

    #[error("expected {expected} control points, got {actual}")]
    PointCountMismatch { expected: usize, actual: usize },

    #[error("coefficient matrix does not match the cage layout: {0}")]
    LayoutMismatch(String),
}

/// Errors related to the point-to-point deformation solve.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("point-to-point solve requires at least one constraint")]
    NoConstraints,

    #[error("regularized system is numerically singular; increase lambda or epsilon")]
    SingularSystem,
}

/// Convenience type alias for results using [`CurvecageError`].
pub type Result<T> = std::result::Result<T, CurvecageError>;
