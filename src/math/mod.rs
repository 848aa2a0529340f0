//! Numerical helpers: the SVD least-squares reference solve.

pub mod ols;

pub use ols::*;
