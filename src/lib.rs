//! htmldoc: resolve an HTML/Markdown conversion job from preferences, command-line flags,
//! book files or a CGI request, assemble the input documents and hand them to an exporter.

pub mod assembly;
pub mod book;
pub mod cgi;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod document;
pub mod env;
pub mod export;
pub mod headfoot;
pub mod logging;
pub mod manifest;
pub mod options;
pub mod permissions;
pub mod prefs;
pub mod session;
pub mod units;

// Re-exports for the binary and embedders.
pub use cli::{run_with, Invocation, RunError};
pub use config::Config;
pub use export::{ExportJob, ExportTarget, Exporter, PdfVersion, PsLevel};
pub use session::{ErrorClass, Session};
