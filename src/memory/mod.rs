//! Memory model for the interpreter
//!
//! - [`value`]: runtime value representation (Int, Float)
//! - [`environment`]: the variable store owned by one run

pub mod environment;
pub mod value;
