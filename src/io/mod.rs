//! Input/output helpers.
//!
//! - workbook access through calamine (`workbook`)
//! - per-sheet column discovery and value extraction (`extract`)
//! - year series assembly from per-year sheets (`series`)
//! - reconciled table read-back (`table`)
//! - Excel/CSV exports (`export`)
//! - result JSON read/write (`result`)

pub mod export;
pub mod extract;
pub mod result;
pub mod series;
pub mod table;
pub mod workbook;

pub use export::*;
pub use extract::*;
pub use result::*;
pub use series::*;
pub use table::*;
pub use workbook::*;
