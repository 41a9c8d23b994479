//! End-to-end runs through `run_with` with an injected environment and a recording exporter.

use htmldoc::cgi::CgiError;
use htmldoc::env::Env;
use htmldoc::options::UsageError;
use htmldoc::permissions::Permission;
use htmldoc::{run_with, Config, ExportJob, ExportTarget, Exporter, Invocation, PdfVersion, PsLevel, RunError};
use std::error::Error;
use std::fs;
use tempfile::TempDir;

struct Recorded {
    target: ExportTarget,
    config: Config,
    urls: Vec<Option<String>>,
    titles: Vec<String>,
    toc: bool,
    links_consistent: bool,
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Recorded>,
}

impl Recorder {
    fn record(&mut self, target: ExportTarget, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.calls.push(Recorded {
            target,
            config: job.config.clone(),
            urls: job.document.iter().map(|n| n.url.clone()).collect(),
            titles: job
                .document
                .iter()
                .map(|n| n.content.title().unwrap_or_default())
                .collect(),
            toc: job.toc,
            links_consistent: job.document.links_consistent(),
        });
        Ok(())
    }

    fn only(&self) -> &Recorded {
        assert_eq!(self.calls.len(), 1, "expected exactly one export");
        &self.calls[0]
    }
}

impl Exporter for Recorder {
    fn html(&mut self, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.record(ExportTarget::Html, job)
    }

    fn html_sep(&mut self, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.record(ExportTarget::HtmlSep, job)
    }

    fn epub(&mut self, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.record(ExportTarget::Epub, job)
    }

    fn postscript(&mut self, level: PsLevel, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.record(ExportTarget::PostScript(level), job)
    }

    fn pdf(&mut self, version: PdfVersion, job: &ExportJob<'_>) -> anyhow::Result<()> {
        self.record(ExportTarget::Pdf(version), job)
    }
}

/// A scratch home directory with a few input files.
struct Fixture {
    home: TempDir,
}

impl Fixture {
    fn new() -> Result<Self, Box<dyn Error>> {
        let home = tempfile::tempdir()?;
        fs::write(home.path().join("one.html"), "<title>One</title><p>1</p>")?;
        fs::write(home.path().join("three.md"), "# Three\n\nthird")?;
        Ok(Self { home })
    }

    fn path(&self, name: &str) -> String {
        self.home.path().join(name).to_string_lossy().into_owned()
    }

    fn env(&self, extra: &[(&str, &str)]) -> Env {
        let home = self.home.path().to_string_lossy().into_owned();
        let mut pairs = vec![
            ("HOME".to_string(), home.clone()),
            ("HTMLDOC_DATA".to_string(), home),
        ];
        pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Env::from_pairs(pairs)
    }

    fn run(&self, args: &[String], recorder: &mut Recorder) -> Result<usize, RunError> {
        let env = self.env(&[]);
        run_with(Invocation::new(args, &env), recorder)
    }
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn missing_value_is_a_usage_error_and_nothing_is_exported() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    let mut recorder = Recorder::default();
    let result = fx.run(&strings(&[&fx.path("one.html"), "--size"]), &mut recorder);
    assert!(matches!(result, Err(RunError::Usage(UsageError::MissingValue(ref o))) if o == "--size"));
    assert!(recorder.calls.is_empty());
    Ok(())
}

#[test]
fn no_inputs_is_a_usage_error() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    let mut recorder = Recorder::default();
    let result = fx.run(&strings(&["--landscape"]), &mut recorder);
    assert!(matches!(result, Err(RunError::Usage(UsageError::NoInput))));
    let result = fx.run(&strings(&[&fx.path("absent.html")]), &mut recorder);
    assert!(matches!(result, Err(RunError::Usage(UsageError::NoInput))));
    assert!(recorder.calls.is_empty());
    Ok(())
}

#[test]
fn missing_middle_file_is_counted_not_fatal() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    let mut recorder = Recorder::default();
    let args = strings(&[&fx.path("one.html"), &fx.path("two.html"), &fx.path("three.md")]);
    let errors = fx.run(&args, &mut recorder)?;
    assert_eq!(errors, 1);
    let run = recorder.only();
    assert_eq!(run.titles, ["One", "Three"]);
    assert_eq!(
        run.urls,
        [Some(fx.path("one.html")), Some(fx.path("three.md"))]
    );
    assert!(run.links_consistent);
    assert!(run.toc);
    Ok(())
}

#[test]
fn outfile_infers_pdf_but_explicit_format_wins() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    let one = fx.path("one.html");

    let mut recorder = Recorder::default();
    fx.run(&strings(&["-f", "out.pdf", &one]), &mut recorder)?;
    assert_eq!(recorder.only().target, ExportTarget::Pdf(PdfVersion::V1_4));
    assert_eq!(recorder.only().config.output_path, "out.pdf");

    let mut recorder = Recorder::default();
    fx.run(&strings(&["-t", "ps", "-f", "out.pdf", &one]), &mut recorder)?;
    assert_eq!(recorder.only().target, ExportTarget::PostScript(PsLevel::Level2));
    assert_eq!(recorder.only().config.ps_level, 2);

    let mut recorder = Recorder::default();
    let result = fx.run(&strings(&["-t", "docx", &one]), &mut recorder);
    assert!(matches!(result, Err(RunError::Usage(UsageError::UnknownFormat(_)))));
    Ok(())
}

#[test]
fn preferences_are_layered_under_flags() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    fs::write(
        fx.home.path().join(".htmldocrc"),
        "#HTMLDOCRC 1.9\nFONTSIZE=14\nLANDSCAPE=1\nBODYFONT=2\n",
    )?;
    let one = fx.path("one.html");

    let mut recorder = Recorder::default();
    fx.run(&strings(&[&one]), &mut recorder)?;
    let config = &recorder.only().config;
    assert_eq!(config.font_size, 14.0);
    assert!(config.landscape);

    let mut recorder = Recorder::default();
    fx.run(&strings(&["--fontsize", "9", "--portrait", &one]), &mut recorder)?;
    let config = &recorder.only().config;
    assert_eq!(config.font_size, 9.0);
    assert!(!config.landscape);
    Ok(())
}

#[test]
fn permissions_flag_updates_mask_and_encryption() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    let mut recorder = Recorder::default();
    fx.run(
        &strings(&["--permissions", "all,no-print", &fx.path("one.html")]),
        &mut recorder,
    )?;
    let config = &recorder.only().config;
    assert!(!config.permissions.allows(Permission::Print));
    assert!(config.permissions.allows(Permission::Copy));
    assert!(config.encryption);
    Ok(())
}

#[test]
fn book_options_line_moves_the_search_path() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    let shared = tempfile::tempdir()?;
    fs::write(shared.path().join("two.html"), "<title>Two</title>")?;
    let book = fx.path("guide.book");
    fs::write(
        &book,
        format!(
            "#HTMLDOC 1.9\none.html\n--path \"{}\" --webpage\ntwo.html\n",
            shared.path().display()
        ),
    )?;

    let mut recorder = Recorder::default();
    let errors = fx.run(&strings(&[&book]), &mut recorder)?;
    assert_eq!(errors, 0);
    let run = recorder.only();
    assert_eq!(run.titles, ["One", "Two"]);
    assert!(!run.toc);
    Ok(())
}

#[test]
fn stdin_operand_is_an_input() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    let env = fx.env(&[("HTMLDOC_DEBUG", "timing")]);
    let args = strings(&["-"]);
    let mut recorder = Recorder::default();
    let invocation = Invocation::new(&args, &env).stdin(&b"<title>Piped</title>"[..]);
    assert_eq!(run_with(invocation, &mut recorder)?, 0);
    assert_eq!(recorder.only().urls, [None]);
    assert_eq!(recorder.only().titles, ["Piped"]);
    Ok(())
}

#[test]
fn cgi_without_path_info_queues_nothing() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    let env = fx.env(&[
        ("GATEWAY_INTERFACE", "CGI/1.1"),
        ("SERVER_NAME", "docs.example.com"),
        ("SERVER_SOFTWARE", "test"),
        ("SERVER_PORT", "80"),
    ]);
    let args = strings(&[&fx.path("one.html")]);
    let mut recorder = Recorder::default();
    let result = run_with(Invocation::new(&args, &env), &mut recorder);
    assert!(matches!(result, Err(RunError::Cgi(CgiError::MissingPathInfo))));
    assert!(recorder.calls.is_empty());
    Ok(())
}

#[test]
fn nocgi_override_keeps_command_line_mode() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new()?;
    let env = fx.env(&[
        ("GATEWAY_INTERFACE", "CGI/1.1"),
        ("SERVER_NAME", "docs.example.com"),
        ("SERVER_SOFTWARE", "test"),
        ("HTMLDOC_NOCGI", "1"),
    ]);
    let args = strings(&[&fx.path("one.html")]);
    let mut recorder = Recorder::default();
    run_with(Invocation::new(&args, &env), &mut recorder)?;
    assert_eq!(recorder.only().target, ExportTarget::Html);
    assert!(!recorder.only().config.no_local_files);
    Ok(())
}
