//! Regression fitting.
//!
//! Responsibilities:
//!
//! - build the regression worksheet sums (`x²`, `y²`, `xy`, totals)
//! - solve the closed-form least-squares line and derived statistics
//! - cross-check the closed form against an SVD solve

pub mod linear;

pub use linear::*;
