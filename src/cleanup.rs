//! Temporary download directories and their removal on a termination signal.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Directories to remove if the process is terminated before normal cleanup runs.
#[derive(Debug, Clone, Default)]
pub struct TempRegistry {
    dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl TempRegistry {
    pub fn register(&self, dir: PathBuf) {
        if let Ok(mut dirs) = self.dirs.lock() {
            dirs.push(dir);
        }
    }

    /// Remove every registered directory. Missing directories are ignored.
    ///
    /// Uses `try_lock` so a signal arriving while the list is being updated cannot deadlock.
    pub fn remove_all(&self) {
        if let Ok(mut dirs) = self.dirs.try_lock() {
            for dir in dirs.drain(..) {
                let _ = std::fs::remove_dir_all(dir);
            }
        }
    }

    /// Install a Ctrl-C / SIGTERM handler that removes the registered directories and
    /// exits with status 1.
    pub fn install_signal_handler(&self) -> Result<(), ctrlc::Error> {
        let registry = self.clone();
        ctrlc::set_handler(move || {
            registry.remove_all();
            std::process::exit(1);
        })
    }
}
