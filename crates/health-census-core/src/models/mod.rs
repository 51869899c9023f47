//! Domain models for the health census.

mod patient;
mod reference;

pub use patient::*;
pub use reference::*;
