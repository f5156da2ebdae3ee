//! Hardware abstraction boundary.
//!
//! The bridge trait lives here so both the driver crate and the com stack
//! can depend on it without depending on each other.

pub mod driver;
