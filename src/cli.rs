//! Orchestration: build the session from the environment, preferences (or CGI) and
//! arguments, then hand the assembled document to the exporter. Maps errors to exit codes.

use crate::book::BookError;
use crate::cgi::{self, CgiError};
use crate::cleanup::TempRegistry;
use crate::config::Config;
use crate::env::Env;
use crate::export::{ExportJob, Exporter};
use crate::logging::LogHandle;
use crate::options::{self, UsageError};
use crate::prefs::{self, PrefsError};
use crate::session::Session;
use std::io::Read;
use std::time::Instant;
use thiserror::Error;

/// A run that could not produce output.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Usage(#[from] UsageError),

    #[error("{0}")]
    Cgi(#[from] CgiError),

    #[error("{0}")]
    Book(#[from] BookError),

    #[error("{0}")]
    Prefs(#[from] PrefsError),

    #[error("Export failed: {0:#}")]
    Export(anyhow::Error),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Usage(_) | RunError::Cgi(_) | RunError::Book(_) | RunError::Prefs(_) => 1,
            RunError::Export(_) => 2,
        }
    }
}

/// Everything a run takes from the outside world.
pub struct Invocation<'a> {
    args: &'a [String],
    env: &'a Env,
    stdin: Box<dyn Read + 'a>,
    registry: TempRegistry,
    log: Option<LogHandle>,
}

impl<'a> Invocation<'a> {
    /// Arguments exclude the program name. Standard input starts out empty.
    pub fn new(args: &'a [String], env: &'a Env) -> Self {
        Self {
            args,
            env,
            stdin: Box::new(std::io::empty()),
            registry: TempRegistry::default(),
            log: None,
        }
    }

    /// Source for the `-` operand.
    pub fn stdin(mut self, stdin: impl Read + 'a) -> Self {
        self.stdin = Box::new(stdin);
        self
    }

    /// Registry watched by the termination signal handler.
    pub fn registry(mut self, registry: TempRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Handle used to apply `--quiet`/`--verbose` to the global log level.
    pub fn log(mut self, log: LogHandle) -> Self {
        self.log = Some(log);
        self
    }
}

/// Resolve the job and export it. Returns the number of errors reported on the way.
pub fn run_with(invocation: Invocation<'_>, exporter: &mut dyn Exporter) -> Result<usize, RunError> {
    let Invocation {
        args,
        env,
        mut stdin,
        registry,
        log,
    } = invocation;
    let started = Instant::now();

    let mut config = Config::default();
    config.data_dir = env.data_dir();
    let mut session = Session::with_registry(config, registry);
    if let Some(log) = log {
        session.set_log_handle(log);
    }

    if cgi::detect(env) {
        session.start_cgi(env)?;
        if !args.is_empty() {
            tracing::debug!("Ignoring {} command-line argument(s) in CGI mode", args.len());
        }
        let url = cgi::request_url(env)?;
        session.inputs += 1;
        let path = session.config.path.clone();
        session.read_file(&url, &path);
    } else {
        let prefs_path = prefs::default_path(env, &session.config.data_dir);
        prefs::load(&mut session.config, &prefs_path);
        options::parse_command_line(&mut session, args, &mut stdin)?;
    }
    let loaded = started.elapsed();

    if session.input_count() == 0 || session.document.is_empty() {
        return Err(UsageError::NoInput.into());
    }

    let target = session.export.target();
    tracing::debug!(
        "Exporting {} document(s) as {}",
        session.document.len(),
        target
    );
    let job = ExportJob::new(&session.document, &session.config);
    target.dispatch(exporter, &job).map_err(RunError::Export)?;

    if env.wants_timing() {
        let total = started.elapsed();
        tracing::info!(
            "TIMING: {:.3} {:.3} {:.3}",
            loaded.as_secs_f64(),
            (total - loaded).as_secs_f64(),
            total.as_secs_f64()
        );
    }
    Ok(session.error_count())
}

/// True when the arguments raise the verbosity, for printing error causes.
pub fn verbose_requested(args: &[String]) -> bool {
    args.iter().any(|a| {
        a.starts_with('-')
            && options::table::find_prefix(a).is_some_and(|(spec, _)| {
                spec.name == "--verbose" || spec.name == "-v"
            })
    })
}

const OPTIONS_HELP: &str = "\
Usage:
  htmldoc [options] filename1.html [ ... filenameN.html ]
  htmldoc filename.book

Options:
  --batch filename.book
  --bodycolor color
  --bodyfont {courier,helvetica,monospace,sans,serif,times}
  --bodyimage filename.{bmp,gif,jpg,png}
  --book
  --bottom margin{in,cm,mm}
  --browserwidth pixels
  --charset {cp-874...1258,iso-8859-1...8859-15,koi8-r,utf-8}
  --color
  --compression[=level]
  --continuous
  --cookies 'name=\"value with space\"; name=value'
  --datadir directory
  --duplex
  --effectduration {0.1..10.0}
  --embedfonts
  --encryption
  --firstpage {p1,toc,c1}
  --fontsize {4.0..24.0}
  --fontspacing {1.0..3.0}
  --footer fff
  {--format, -t} {epub,html,htmlsep,pdf11,pdf12,pdf13,pdf14,ps1,ps2,ps3}
  --grayscale
  --header fff
  --header1 fff
  --headfootfont {courier{-bold,-oblique,-boldoblique},
                  helvetica{-bold,-oblique,-boldoblique},
                  monospace{-bold,-oblique,-boldoblique},
                  sans{-bold,-oblique,-boldoblique},
                  serif{-bold,-italic,-bolditalic},
                  times{-roman,-bold,-italic,-bolditalic}}
  --headfootsize {6.0..24.0}
  --headingfont {courier,helvetica,monospace,sans,serif,times}
  --help
  --hfimageN filename.{bmp,gif,jpg,png}
  --jpeg[=quality]
  --landscape
  --left margin{in,cm,mm}
  --letterhead filename.{bmp,gif,jpg,png}
  --linkcolor color
  --links
  --linkstyle {plain,underline}
  --logoimage filename.{bmp,gif,jpg,png}
  --no-compression
  --no-duplex
  --no-embedfonts
  --no-encryption
  --no-jpeg
  --no-links
  --no-localfiles
  --no-numbered
  --no-overflow
  --no-pscommands
  --no-strict
  --no-title
  --no-toc
  --no-truetype
  --no-xrxcomments
  --numbered
  --nup {1,2,4,6,9,16}
  {--outdir, -d} dirname
  {--outfile, -f} filename.{epub,html,pdf,ps}
  --overflow
  --owner-password password
  --pageduration {1.0..60.0}
  --pageeffect {none,bi,bo,d,gd,gdr,gr,hb,hsi,hso,vb,vsi,vso,wd,wl,wr,wu}
  --pagelayout {single,one,twoleft,tworight}
  --pagemode {document,outline,fullscreen}
  --path \"dir1;dir2;dir3;...;dirN\"
  --permissions {all,none,annotate,copy,modify,print,no-annotate,no-copy,no-modify,no-print}
  --portrait
  --pre-indent margin{in,cm,mm}
  --proxy http://host:port
  --pscommands
  --quiet
  --referer url
  --right margin{in,cm,mm}
  --size {letter,a4,WxH{in,cm,mm},etc}
  --strict
  --textcolor color
  --textfont {courier,helvetica,monospace,sans,serif,times}
  --title
  --titlefile filename.{htm,html,shtml,md}
  --titleimage filename.{bmp,gif,jpg,png}
  --tocfooter fff
  --tocheader fff
  --toclevels levels
  --toctitle string
  --top margin{in,cm,mm}
  --truetype
  --user-password password
  {--verbose, -v}
  --version
  --webpage
  --xrxcomments

  fff = {blank,a,A,c,C,d,D,h,i,I,l,L,t,T,u,1,/,:,.}
";

/// Text printed after a usage error: the option list, or in CGI mode a plain-text HTTP
/// response with setup advice.
pub fn usage_text(cgi: bool) -> String {
    if cgi {
        format!("Content-Type: text/plain\r\n\r\n{}", cgi::ADVICE)
    } else {
        OPTIONS_HELP.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::table::OPTIONS;

    #[test]
    fn usage_lists_every_option() {
        for spec in OPTIONS {
            let name = spec.name.trim_end_matches(char::is_numeric);
            assert!(OPTIONS_HELP.contains(name), "{} missing from usage", spec.name);
        }
    }

    #[test]
    fn cgi_usage_is_a_plain_text_response() {
        let text = usage_text(true);
        assert!(text.starts_with("Content-Type: text/plain\r\n\r\n"));
        assert!(!text.contains("--outfile"));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(RunError::from(UsageError::NoInput).exit_code(), 1);
        assert_eq!(RunError::from(CgiError::MissingPathInfo).exit_code(), 1);
        assert_eq!(RunError::Export(anyhow::anyhow!("disk full")).exit_code(), 2);
    }

    #[test]
    fn verbose_detection() {
        let args = |a: &[&str]| a.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(verbose_requested(&args(&["-v", "a.html"])));
        assert!(verbose_requested(&args(&["--verb"])));
        assert!(!verbose_requested(&args(&["--version", "verbose.html"])));
    }
}
