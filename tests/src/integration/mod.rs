//! Engine scenarios across crates.

pub mod fixtures;
mod properties;
mod reconstruction;
