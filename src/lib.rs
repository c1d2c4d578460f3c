pub mod cage;
pub mod coords;
pub mod deform;
pub mod error;
pub mod math;

pub use error::{CurvecageError, Result};
