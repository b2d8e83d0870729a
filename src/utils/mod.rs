//! Shared utilities.

pub mod fs;

pub use fs::{atomic_write, read_optional, safe_write};
