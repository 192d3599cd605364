//! Domain models for mdsuite
//!
//! Contains the linking and assembly logic without any I/O concerns.
//! Data flows one way: [`Example`] → [`LinkedExamples`] → [`Suites`].

mod example;
mod linker;
mod dependency;
mod suite;
pub mod naming;

pub use example::{Block, Example, Scenario};
pub use linker::{ExampleId, LinkError, LinkedExample, LinkedExamples, Linker};
pub use dependency::{Dependencies, Dependency};
pub use suite::{AssembleError, AssembleOptions, Assembler, Body, Suite, SuiteId, Suites, Test};
