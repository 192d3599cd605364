//! # Command-Line Interface
//!
//! ```bash
//! mdsuite [INPUT] [OUTPUT] --module example.com/e2e
//! mdsuite docs --script --match 'Ping'
//! ```
//!
//! ## Output Formats
//!
//! - `text` (default) - One line per artifact plus a summary
//! - `json` - `{"format": ..., "artifacts": [{suite, path, tests, status}]}`
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for `[verbose:<stage>]` diagnostics on stderr.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and generate.

mod app;
mod generate;
mod output;

pub use app::{run, Cli};
pub use generate::GenerateArgs;
pub use output::{Output, OutputFormat};
