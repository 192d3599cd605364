//! # Storage Layer
//!
//! Everything that touches the filesystem: finding documents, parsing them,
//! loading configuration and writing artifacts.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Examples | Markdown with fenced shell blocks | `<dir>/README.md` |
//! | Project config | TOML | `<input>/mdsuite.toml` |
//! | Global config | TOML | `~/.config/mdsuite/config.toml` |
//! | Artifacts | Go source or bash | `<output>/<rel>/suite.gen.{go,sh}` |
//!
//! ## Write Safety
//!
//! - Artifacts are written atomically (temp file + rename)
//! - Identical content is left alone
//!
//! ## Key Types
//!
//! - [`DocumentParser`] - Turns a document into an [`Example`](crate::domain::Example)
//! - [`Config`] - Project and global configuration, resolved into [`Settings`]

mod config;
mod markdown;
mod walk;
mod writer;

pub use config::{Config, ConfigError, GlobalConfig, Overrides, ProjectConfig, Settings, PROJECT_CONFIG_FILE};
pub use markdown::DocumentParser;
pub use walk::document_dirs;
pub use writer::{write_artifact, WriteError, WriteOutcome};
