//! State of one conversion job, threaded through option parsing, book loading and assembly.

use crate::assembly::FileResolver;
use crate::cleanup::TempRegistry;
use crate::config::Config;
use crate::document::DocumentSequence;
use crate::export::ExportSelector;
use crate::logging::LogHandle;
use std::fmt;

/// Broad category of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A file, URL or book could not be found.
    NotFound,
    /// A file was found but could not be read.
    Read,
    /// A book file is malformed.
    BadFormat,
    /// A required CGI variable is missing or unusable.
    Configuration,
    Internal,
}

/// Errors that are reported and counted rather than propagated.
pub trait Classified: fmt::Display {
    fn class(&self) -> ErrorClass;
}

/// One reported error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub class: ErrorClass,
    pub message: String,
}

/// Configuration, export selection and document sequence for one job.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub export: ExportSelector,
    pub document: DocumentSequence,
    pub resolver: FileResolver,
    /// Running as a CGI program.
    pub cgi: bool,
    /// Input operands seen (files, stdin, batch files, the CGI request).
    pub(crate) inputs: usize,
    pub(crate) book_depth: usize,
    diagnostics: Vec<Diagnostic>,
    log: Option<LogHandle>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, TempRegistry::default())
    }

    /// Session whose downloads are registered for removal on a termination signal.
    pub fn with_registry(config: Config, registry: TempRegistry) -> Self {
        Self {
            config,
            export: ExportSelector::default(),
            document: DocumentSequence::new(),
            resolver: FileResolver::new(registry),
            cgi: false,
            inputs: 0,
            book_depth: 0,
            diagnostics: Vec::new(),
            log: None,
        }
    }

    /// Route verbosity changes to the global log level.
    pub fn set_log_handle(&mut self, log: LogHandle) {
        log.set_verbosity(self.config.verbosity);
        self.log = Some(log);
    }

    pub fn set_verbosity(&mut self, verbosity: i32) {
        self.config.verbosity = verbosity;
        if let Some(log) = &self.log {
            log.set_verbosity(verbosity);
        }
    }

    /// Log an error and count it toward the exit status.
    pub fn report<E: Classified + ?Sized>(&mut self, error: &E) {
        tracing::error!("{}", error);
        self.diagnostics.push(Diagnostic {
            class: error.class(),
            message: error.to_string(),
        });
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn input_count(&self) -> usize {
        self.inputs
    }

    /// Search path for inputs named by a book file: the book's directory, then `--path`.
    pub fn book_search_path(&self, book_dir: Option<&str>) -> String {
        match book_dir {
            Some(dir) => format!("{};{}", dir, self.config.path),
            None => self.config.path.clone(),
        }
    }
}
