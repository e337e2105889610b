//! Causal estimation on the augmented panel: a first-stage strength
//! diagnostic and two-stage least squares with robust standard errors.

pub mod design;
pub mod iv;
pub mod linalg;
pub mod ols;
pub mod summary;

pub use design::{Coefficient, IvSpec, INTERCEPT};
pub use iv::{two_stage_least_squares, IvResult};
pub use linalg::{LeastSquares, LinalgError};
pub use ols::{first_stage, FirstStageResult};
