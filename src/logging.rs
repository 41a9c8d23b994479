//! Logging initialization.
//!
//! Diagnostics go to stderr with the level as the severity tag. The level can be changed
//! after start-up, since `--quiet` and `--verbose` are only known once options are parsed.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, reload, Registry};

/// Map a verbosity count to the most detailed level shown.
pub fn level_for(verbosity: i32) -> LevelFilter {
    match verbosity {
        v if v < 0 => LevelFilter::ERROR,
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Adjusts the global log level after initialization.
#[derive(Debug, Clone)]
pub struct LogHandle {
    filter: reload::Handle<LevelFilter, Registry>,
}

impl LogHandle {
    pub fn set_verbosity(&self, verbosity: i32) {
        if let Err(e) = self.filter.reload(level_for(verbosity)) {
            tracing::debug!("Unable to change log level: {}", e);
        }
    }
}

/// Install the global subscriber at the default (INFO) level.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn initialize_logging() -> Result<LogHandle, TryInitError> {
    let (filter, handle) = reload::Layer::new(level_for(0));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init()?;
    Ok(LogHandle { filter: handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(-1), LevelFilter::ERROR);
        assert_eq!(level_for(-5), LevelFilter::ERROR);
        assert_eq!(level_for(0), LevelFilter::INFO);
        assert_eq!(level_for(1), LevelFilter::DEBUG);
        assert_eq!(level_for(2), LevelFilter::TRACE);
        assert_eq!(level_for(9), LevelFilter::TRACE);
    }
}
