//! Snippet-reference tooling for MkDocs `pymdownx.snippets` documents.
//!
//! The pipeline runs `scanner::parse` then `locator::locate`, resolves each
//! path with `resolver::PathResolver`, and reports problems through
//! `diagnostics::build_diagnostics`. Previews, hovers and links are assembled
//! in `preview`.

pub mod coalescer;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod mkdocs;
pub mod preview;
pub mod resolver;
pub mod scanner;
pub mod severity;
pub mod types;
pub mod watch;

pub use error::Error;
