//! Command-line usage errors.

use thiserror::Error;

/// A command-line problem. Always fatal; the caller prints the usage text.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Bad option argument \"{0}\"!")]
    UnknownOption(String),

    #[error("Missing value for \"{0}\"!")]
    MissingValue(String),

    #[error("Bad value \"{value}\" for \"{option}\": {reason}.")]
    BadValue {
        option: String,
        value: String,
        reason: &'static str,
    },

    #[error("Unknown output format \"{0}\"!")]
    UnknownFormat(String),

    #[error("No HTML files!")]
    NoInput,

    #[error("Help requested.")]
    Help,
}
