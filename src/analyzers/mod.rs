//! Grouped aggregation and descriptive statistics.
//!
//! Every function here is pure: it reads a normalized [`crate::table::Table`]
//! and returns a small result ready for charting. Statistics that cannot be
//! computed come back as `None`.

pub mod aggregate;
pub mod correlation;
pub mod summary;
pub mod types;
pub mod utility;
