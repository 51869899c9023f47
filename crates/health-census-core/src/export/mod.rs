//! Export formats for patient records.

mod csv;

pub use csv::*;
