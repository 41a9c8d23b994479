//! Snapshot of the process environment variables the converter consults.

use crate::config::DEFAULT_DATA_DIR;
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variables captured once at start-up.
///
/// Everything downstream reads this snapshot instead of `std::env`, so a run can be driven
/// with an explicit environment.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Capture the current process environment. Non-UTF-8 values are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Installation data directory: `HTMLDOC_DATA`, else the snap package layout when
    /// running under `SNAP`, else the compiled-in default.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = self.get("HTMLDOC_DATA") {
            return PathBuf::from(dir);
        }
        if let Some(snap) = self.get("SNAP") {
            return PathBuf::from(snap).join("share/htmldoc");
        }
        PathBuf::from(DEFAULT_DATA_DIR)
    }

    /// `HTMLDOC_DEBUG` asks for timing statistics.
    pub fn wants_timing(&self) -> bool {
        self.get("HTMLDOC_DEBUG")
            .map(|d| d.contains("all") || d.contains("timing"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_precedence() {
        assert_eq!(Env::default().data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        let snap = Env::from_pairs([("SNAP", "/snap/htmldoc/1")]);
        assert_eq!(snap.data_dir(), PathBuf::from("/snap/htmldoc/1/share/htmldoc"));
        let both = Env::from_pairs([("SNAP", "/snap/x"), ("HTMLDOC_DATA", "/opt/hd")]);
        assert_eq!(both.data_dir(), PathBuf::from("/opt/hd"));
    }

    #[test]
    fn timing_flag() {
        assert!(!Env::default().wants_timing());
        assert!(Env::from_pairs([("HTMLDOC_DEBUG", "timing")]).wants_timing());
        assert!(Env::from_pairs([("HTMLDOC_DEBUG", "links,all")]).wants_timing());
        assert!(!Env::from_pairs([("HTMLDOC_DEBUG", "links")]).wants_timing());
    }
}
