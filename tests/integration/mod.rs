//! Integration tests for chartdoc.
//!
//! Compiled as a single test binary:
//! - `cli`: the `chartdoc` binary end to end
//! - `compose`: template resolution and composition against real chart trees
//! - `concurrency`: isolation of concurrent chart renders

mod cli;
mod compose;
mod concurrency;
