//! Data sources that do not come from the input workbooks.

pub mod fallback;

pub use fallback::*;
