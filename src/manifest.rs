//! JSON manifest of a resolved job, written in place of a rendered document.

use crate::config::Config;
use crate::export::{ExportJob, ExportTarget, Exporter, PdfVersion, PsLevel};
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name used inside an `--outdir` directory.
const DIRECTORY_MANIFEST: &str = "htmldoc.json";

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    target: String,
    output: Output<'a>,
    toc: bool,
    documents: Vec<DocumentEntry<'a>>,
    config: &'a Config,
}

#[derive(Debug, Serialize)]
struct Output<'a> {
    path: &'a str,
    directory: bool,
}

#[derive(Debug, Serialize)]
struct DocumentEntry<'a> {
    url: Option<&'a str>,
    filename: &'a str,
    base: &'a str,
    title: Option<String>,
}

fn manifest<'a>(target: ExportTarget, job: &ExportJob<'a>) -> Manifest<'a> {
    Manifest {
        target: target.to_string(),
        output: Output {
            path: &job.config.output_path,
            directory: job.config.output_files,
        },
        toc: job.toc,
        documents: job
            .document
            .iter()
            .map(|node| DocumentEntry {
                url: node.url.as_deref(),
                filename: &node.filename,
                base: &node.base,
                title: node.content.title(),
            })
            .collect(),
        config: job.config,
    }
}

/// Pretty-printed manifest text.
pub fn to_json(target: ExportTarget, job: &ExportJob<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&manifest(target, job))
}

/// Describes each job as JSON: to the output file, `htmldoc.json` in the output
/// directory, or standard output.
#[derive(Debug, Default)]
pub struct ManifestExporter {
    /// Where the last manifest went; `None` for standard output.
    pub written: Option<PathBuf>,
}

impl ManifestExporter {
    fn write(&mut self, target: ExportTarget, job: &ExportJob<'_>) -> anyhow::Result<()> {
        let json = to_json(target, job).context("Failed to serialize manifest")?;
        let output = &job.config.output_path;
        if output.is_empty() {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).context("Failed to write manifest to stdout")?;
            self.written = None;
            return Ok(());
        }
        let path = if job.config.output_files {
            std::fs::create_dir_all(output)
                .with_context(|| format!("Cannot create output directory {}", output))?;
            Path::new(output).join(DIRECTORY_MANIFEST)
        } else {
            PathBuf::from(output)
        };
        std::fs::write(&path, json + "\n")
            .with_context(|| format!("Cannot write output: {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
        self.written = Some(path);
        Ok(())
    }
}

impl Exporter for ManifestExporter {
    fn html(&mut self, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.write(ExportTarget::Html, job)
    }

    fn html_sep(&mut self, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.write(ExportTarget::HtmlSep, job)
    }

    fn epub(&mut self, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.write(ExportTarget::Epub, job)
    }

    fn postscript(&mut self, level: PsLevel, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.write(ExportTarget::PostScript(level), job)
    }

    fn pdf(&mut self, version: PdfVersion, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.write(ExportTarget::Pdf(version), job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentTree, DocumentNode, DocumentSequence};

    fn sample() -> DocumentSequence {
        let mut doc = DocumentSequence::new();
        doc.push_back(DocumentNode::new(
            Some("docs/intro.html".into()),
            "intro.html".into(),
            "docs".into(),
            ContentTree::from_html("<title>Intro</title>"),
        ));
        doc.push_back(DocumentNode::new(
            None,
            String::new(),
            ".".into(),
            ContentTree::from_html("<p>untitled</p>"),
        ));
        doc
    }

    #[test]
    fn manifest_lists_documents_in_order() -> Result<(), Box<dyn std::error::Error>> {
        let doc = sample();
        let config = Config::default();
        let job = ExportJob::new(&doc, &config);
        let value: serde_json::Value =
            serde_json::from_str(&to_json(ExportTarget::Pdf(PdfVersion::V1_3), &job)?)?;
        assert_eq!(value["target"], "pdf13");
        assert_eq!(value["toc"], true);
        assert_eq!(value["documents"][0]["url"], "docs/intro.html");
        assert_eq!(value["documents"][0]["title"], "Intro");
        assert!(value["documents"][1]["url"].is_null());
        assert_eq!(value["config"]["header"], ".t.");
        Ok(())
    }

    #[test]
    fn writes_output_file_and_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let doc = sample();
        let mut config = Config::default();
        config.output_path = dir.path().join("out.pdf").to_string_lossy().into_owned();
        let mut exporter = ManifestExporter::default();
        ExportTarget::Pdf(PdfVersion::V1_4).dispatch(&mut exporter, &ExportJob::new(&doc, &config))?;
        assert_eq!(exporter.written.as_deref(), Some(dir.path().join("out.pdf").as_path()));

        config.output_path = dir.path().join("site").to_string_lossy().into_owned();
        config.output_files = true;
        exporter.html_sep(&ExportJob::new(&doc, &config))?;
        let written = dir.path().join("site").join(DIRECTORY_MANIFEST);
        assert!(written.is_file());
        assert!(std::fs::read_to_string(written)?.contains("\"htmlsep\""));
        Ok(())
    }
}
