//! Export target selection and dispatch to the rendering engine.

use crate::config::{Config, OutputType};
use crate::document::DocumentSequence;
use serde::Serialize;
use std::fmt;

/// PostScript language level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PsLevel {
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
}

/// PDF version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PdfVersion {
    V1_1 = 11,
    V1_2 = 12,
    V1_3 = 13,
    V1_4 = 14,
}

impl PdfVersion {
    /// Version as stored in [`Config::pdf_version`] (version times ten).
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Flate compression needs PDF 1.2 or later.
    pub fn supports_compression(self) -> bool {
        self >= PdfVersion::V1_2
    }
}

/// The output format handed to the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "format", content = "variant", rename_all = "kebab-case")]
pub enum ExportTarget {
    /// Paged HTML.
    #[default]
    Html,
    /// One HTML file per page/chapter.
    HtmlSep,
    Epub,
    PostScript(PsLevel),
    Pdf(PdfVersion),
}

impl ExportTarget {
    /// Parse a `--format`/`-t` keyword (case-insensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let target = match keyword.to_ascii_lowercase().as_str() {
            "epub" => ExportTarget::Epub,
            "html" => ExportTarget::Html,
            "htmlsep" => ExportTarget::HtmlSep,
            "pdf" | "pdf14" => ExportTarget::Pdf(PdfVersion::V1_4),
            "pdf13" => ExportTarget::Pdf(PdfVersion::V1_3),
            "pdf12" => ExportTarget::Pdf(PdfVersion::V1_2),
            "pdf11" => ExportTarget::Pdf(PdfVersion::V1_1),
            "ps1" => ExportTarget::PostScript(PsLevel::Level1),
            "ps" | "ps2" => ExportTarget::PostScript(PsLevel::Level2),
            "ps3" => ExportTarget::PostScript(PsLevel::Level3),
            _ => return None,
        };
        Some(target)
    }

    /// Call the exporter method for this target.
    pub fn dispatch(self, exporter: &mut dyn Exporter, job: &ExportJob<'_>) -> anyhow::Result<()> {
        match self {
            ExportTarget::Html => exporter.html(job),
            ExportTarget::HtmlSep => exporter.html_sep(job),
            ExportTarget::Epub => exporter.epub(job),
            ExportTarget::PostScript(level) => exporter.postscript(level, job),
            ExportTarget::Pdf(version) => exporter.pdf(version, job),
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportTarget::Html => f.write_str("html"),
            ExportTarget::HtmlSep => f.write_str("htmlsep"),
            ExportTarget::Epub => f.write_str("epub"),
            ExportTarget::PostScript(level) => write!(f, "ps{}", *level as u8),
            ExportTarget::Pdf(version) => write!(f, "pdf{}", version.code()),
        }
    }
}

/// How the current target was chosen. Explicit choices are never replaced by inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Default,
    Inferred,
    Explicit,
}

/// Tracks the active export target in a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSelector {
    target: ExportTarget,
    provenance: Provenance,
}

impl Default for ExportSelector {
    fn default() -> Self {
        Self {
            target: ExportTarget::default(),
            provenance: Provenance::Default,
        }
    }
}

impl ExportSelector {
    pub fn target(&self) -> ExportTarget {
        self.target
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Select a target from `--format`/`-t` (or a forced preset). Always wins.
    pub fn select(&mut self, target: ExportTarget, config: &mut Config) {
        self.assign(target, config);
        self.provenance = Provenance::Explicit;
    }

    /// Infer the target from an output file name, unless a format was chosen explicitly.
    ///
    /// Returns the inferred target when the slot was updated.
    pub fn infer_from_output(&mut self, filename: &str, config: &mut Config) -> Option<ExportTarget> {
        if self.provenance == Provenance::Explicit {
            return None;
        }
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        let target = match extension.as_str() {
            "epub" => ExportTarget::Epub,
            "html" => ExportTarget::Html,
            "pdf" => ExportTarget::Pdf(pdf_version_or_latest(config.pdf_version)),
            "ps" => ExportTarget::PostScript(match config.ps_level {
                1 => PsLevel::Level1,
                3 => PsLevel::Level3,
                _ => PsLevel::Level2,
            }),
            _ => return None,
        };
        self.assign(target, config);
        self.provenance = Provenance::Inferred;
        Some(target)
    }

    fn assign(&mut self, target: ExportTarget, config: &mut Config) {
        match target {
            ExportTarget::Pdf(version) => {
                config.ps_level = 0;
                config.pdf_version = version.code();
                if !version.supports_compression() {
                    config.compression = 0;
                }
            }
            ExportTarget::PostScript(level) => config.ps_level = level as u8,
            ExportTarget::Html | ExportTarget::HtmlSep | ExportTarget::Epub => {}
        }
        self.target = target;
    }

    /// Apply `--compression[=level]`. Ignored unless the PDF version supports compression.
    pub fn set_compression(&self, level: u8, config: &mut Config) {
        if pdf_version_or_latest(config.pdf_version).supports_compression() {
            config.compression = level;
        }
    }
}

fn pdf_version_or_latest(code: u8) -> PdfVersion {
    match code {
        11 => PdfVersion::V1_1,
        12 => PdfVersion::V1_2,
        13 => PdfVersion::V1_3,
        _ => PdfVersion::V1_4,
    }
}

/// Everything the rendering engine receives for one job.
#[derive(Debug)]
pub struct ExportJob<'a> {
    pub document: &'a DocumentSequence,
    pub config: &'a Config,
    /// A table of contents should be built: book output with at least one TOC level.
    pub toc: bool,
}

impl<'a> ExportJob<'a> {
    pub fn new(document: &'a DocumentSequence, config: &'a Config) -> Self {
        Self {
            document,
            config,
            toc: config.output_type == OutputType::Book && config.toc_levels > 0,
        }
    }
}

/// The rendering engine: one entry point per export target.
pub trait Exporter {
    fn html(&mut self, job: &ExportJob<'_>) -> anyhow::Result<()>;
    fn html_sep(&mut self, job: &ExportJob<'_>) -> anyhow::Result<()>;
    fn epub(&mut self, job: &ExportJob<'_>) -> anyhow::Result<()>;
    fn postscript(&mut self, level: PsLevel, job: &ExportJob<'_>) -> anyhow::Result<()>;
    fn pdf(&mut self, version: PdfVersion, job: &ExportJob<'_>) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_all() {
        assert_eq!(ExportTarget::from_keyword("epub"), Some(ExportTarget::Epub));
        assert_eq!(ExportTarget::from_keyword("HTMLSEP"), Some(ExportTarget::HtmlSep));
        assert_eq!(
            ExportTarget::from_keyword("pdf"),
            Some(ExportTarget::Pdf(PdfVersion::V1_4))
        );
        assert_eq!(
            ExportTarget::from_keyword("pdf11"),
            Some(ExportTarget::Pdf(PdfVersion::V1_1))
        );
        assert_eq!(
            ExportTarget::from_keyword("ps"),
            Some(ExportTarget::PostScript(PsLevel::Level2))
        );
        assert_eq!(
            ExportTarget::from_keyword("ps3"),
            Some(ExportTarget::PostScript(PsLevel::Level3))
        );
        assert_eq!(ExportTarget::from_keyword("docx"), None);
    }

    #[test]
    fn display_matches_keywords() {
        for kw in ["epub", "html", "htmlsep", "pdf11", "pdf14", "ps1", "ps3"] {
            let target = ExportTarget::from_keyword(kw).unwrap();
            assert_eq!(target.to_string(), kw);
        }
    }

    #[test]
    fn outfile_pdf_infers_pdf() {
        let mut config = Config::default();
        let mut sel = ExportSelector::default();
        sel.infer_from_output("out.pdf", &mut config);
        assert_eq!(sel.target(), ExportTarget::Pdf(PdfVersion::V1_4));
        assert_eq!(config.ps_level, 0);
        assert_eq!(sel.provenance(), Provenance::Inferred);
    }

    #[test]
    fn explicit_format_beats_later_inference() {
        let mut config = Config::default();
        let mut sel = ExportSelector::default();
        sel.select(ExportTarget::PostScript(PsLevel::Level2), &mut config);
        assert_eq!(sel.infer_from_output("out.pdf", &mut config), None);
        assert_eq!(sel.target(), ExportTarget::PostScript(PsLevel::Level2));
        assert_eq!(config.ps_level, 2);
    }

    #[test]
    fn explicit_format_beats_earlier_inference() {
        let mut config = Config::default();
        let mut sel = ExportSelector::default();
        sel.infer_from_output("out.pdf", &mut config);
        sel.select(ExportTarget::Epub, &mut config);
        assert_eq!(sel.target(), ExportTarget::Epub);
    }

    #[test]
    fn ps_inference_keeps_configured_level() {
        let mut config = Config::default();
        config.ps_level = 3;
        let mut sel = ExportSelector::default();
        sel.infer_from_output("OUT.PS", &mut config);
        assert_eq!(sel.target(), ExportTarget::PostScript(PsLevel::Level3));
    }

    #[test]
    fn unknown_extension_leaves_target() {
        let mut config = Config::default();
        let mut sel = ExportSelector::default();
        assert_eq!(sel.infer_from_output("notes.txt", &mut config), None);
        assert_eq!(sel.infer_from_output("noext", &mut config), None);
        assert_eq!(sel.target(), ExportTarget::Html);
        assert_eq!(sel.provenance(), Provenance::Default);
    }

    #[test]
    fn pdf11_forces_compression_off() {
        let mut config = Config::default();
        let mut sel = ExportSelector::default();
        sel.select(ExportTarget::Pdf(PdfVersion::V1_1), &mut config);
        assert_eq!(config.compression, 0);
        sel.set_compression(5, &mut config);
        assert_eq!(config.compression, 0);
        sel.select(ExportTarget::Pdf(PdfVersion::V1_3), &mut config);
        sel.set_compression(5, &mut config);
        assert_eq!(config.compression, 5);
    }
}
