//! mdsuite - Generate test suites from markdown examples
//!
//! Each directory of a documentation tree may hold a README with runnable
//! shell blocks. mdsuite links those examples into a forest, resolves what
//! every suite inherits from its ancestors and renders either compiled Go
//! test suites or standalone bash scripts.

pub mod domain;
pub mod render;
pub mod storage;
pub mod cli;

pub use domain::{Example, LinkError, Linker, Suite, Suites};
pub use render::{Format, Selection};
