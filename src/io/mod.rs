//! Input/output helpers.
//!
//! - series export to CSV (`export`)

pub mod export;

pub use export::*;
