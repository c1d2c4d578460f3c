mod solver;

pub use solver::{
    solve_p2p, PointConstraint, SolveParams, DEFAULT_SMOOTHNESS_WEIGHT, DEFAULT_TIKHONOV,
    SMOOTHNESS_ORDER,
};
