//! Running as a CGI program: detection, the forced configuration and the request URL.

use crate::book::BookError;
use crate::config::{OutputType, PdfFirstPage, PdfPageMode};
use crate::env::Env;
use crate::export::{ExportTarget, PdfVersion};
use crate::session::{Classified, ErrorClass, Session};
use crate::units::leading_int;
use reqwest::Url;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Setup advice shown instead of the option list when a CGI request cannot be served.
pub const ADVICE: &str = "\
HTMLDOC is running as a CGI program. Requests must name a document with
PATH_INFO, for example:

    http://www.example.com/htmldoc.cgi/path/to/file.html

Options can be set for a directory with a \".book\" file whose options line
is applied to every request. See the HTMLDOC documentation for details.
";

#[derive(Debug, Error)]
pub enum CgiError {
    #[error("PATH_INFO is not set in the environment.")]
    MissingPathInfo,

    #[error("SERVER_PORT is not set in the environment.")]
    MissingServerPort,

    #[error("Unusable server address \"{0}\".")]
    BadServer(String),

    #[error("Unable to load directory book: {0}")]
    Book(#[source] BookError),
}

impl Classified for CgiError {
    fn class(&self) -> ErrorClass {
        match self {
            CgiError::MissingPathInfo | CgiError::MissingServerPort | CgiError::BadServer(_) => {
                ErrorClass::Configuration
            }
            CgiError::Book(e) => e.class(),
        }
    }
}

/// True when invoked by a web server and `HTMLDOC_NOCGI` is not set.
pub fn detect(env: &Env) -> bool {
    !env.is_set("HTMLDOC_NOCGI")
        && env.is_set("GATEWAY_INTERFACE")
        && env.is_set("SERVER_NAME")
        && env.is_set("SERVER_SOFTWARE")
}

/// Directory book files to try, in order.
fn book_candidates(env: &Env) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(translated) = env.get("PATH_TRANSLATED").filter(|t| !t.is_empty()) {
        candidates.push(PathBuf::from(format!("{}.book", translated)));
        if let Some(dir) = Path::new(translated)
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
        {
            candidates.push(dir.join(".book"));
        }
    }
    candidates.push(PathBuf::from(".book"));
    candidates
}

/// Rebuild the requested document URL from the server variables.
pub fn request_url(env: &Env) -> Result<String, CgiError> {
    let path_info = env
        .get("PATH_INFO")
        .filter(|p| !p.is_empty())
        .ok_or(CgiError::MissingPathInfo)?;
    let port = env.get("SERVER_PORT").ok_or(CgiError::MissingServerPort)?;
    let host = env.get("SERVER_NAME").unwrap_or("localhost");
    let scheme = match env.get("HTTPS") {
        Some(v) if !v.eq_ignore_ascii_case("off") => "https",
        _ => "http",
    };

    let bad_server = || CgiError::BadServer(format!("{}:{}", host, port));
    let mut url = Url::parse(&format!("{}://{}", scheme, host)).map_err(|_| bad_server())?;
    let port = u16::try_from(leading_int(port)).map_err(|_| bad_server())?;
    url.set_port(Some(port)).map_err(|_| bad_server())?;
    url.set_path(path_info);
    match env.get("QUERY_STRING") {
        Some(query) if !query.is_empty() && !query.starts_with('-') => url.set_query(Some(query)),
        _ => {}
    }
    Ok(url.to_string())
}

impl Session {
    /// Apply the CGI configuration and any directory book. Local files are disabled
    /// afterwards either way.
    pub fn start_cgi(&mut self, env: &Env) -> Result<(), CgiError> {
        tracing::info!("starting in CGI mode");
        if let Some(tmp) = env.get("TMPDIR").or_else(|| env.get("TEMP")) {
            tracing::info!("TMPDIR=\"{}\"", tmp);
        }

        self.cgi = true;
        self.config.toc_levels = 0;
        self.config.title_page = false;
        self.config.output_path.clear();
        self.config.output_files = false;
        self.config.output_type = OutputType::WebPages;
        self.export
            .select(ExportTarget::Pdf(PdfVersion::V1_4), &mut self.config);
        self.config.page_mode = PdfPageMode::Document;
        self.config.first_page = PdfFirstPage::Page1;
        if let Some(cookies) = env.get("HTTP_COOKIE") {
            self.config.cookies = cookies.to_string();
        }
        if let Some(referer) = env.get("HTTP_REFERER") {
            self.config.referer = referer.to_string();
        }

        match book_candidates(env).into_iter().find(|c| c.is_file()) {
            Some(book) => {
                tracing::debug!("Using directory book {}", book.display());
                let path = self.config.path.clone();
                self.load_book(&book.to_string_lossy(), &path, true)
                    .map_err(CgiError::Book)
            }
            None => {
                self.config.no_local_files = true;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn server(extra: &[(&str, &str)]) -> Env {
        let mut pairs = vec![
            ("GATEWAY_INTERFACE", "CGI/1.1"),
            ("SERVER_NAME", "docs.example.com"),
            ("SERVER_SOFTWARE", "Apache"),
        ];
        pairs.extend_from_slice(extra);
        Env::from_pairs(pairs)
    }

    #[test]
    fn detection_needs_all_three_and_no_override() {
        assert!(detect(&server(&[])));
        assert!(!detect(&server(&[("HTMLDOC_NOCGI", "1")])));
        assert!(!detect(&Env::from_pairs([("GATEWAY_INTERFACE", "CGI/1.1")])));
    }

    #[test]
    fn url_from_server_variables() -> Result<(), CgiError> {
        let env = server(&[("PATH_INFO", "/doc.html"), ("SERVER_PORT", "80")]);
        assert_eq!(request_url(&env)?, "http://docs.example.com/doc.html");

        let env = server(&[
            ("PATH_INFO", "/a/b.html"),
            ("SERVER_PORT", "8443"),
            ("HTTPS", "on"),
            ("QUERY_STRING", "x=1&y=2"),
        ]);
        assert_eq!(request_url(&env)?, "https://docs.example.com:8443/a/b.html?x=1&y=2");

        let env = server(&[
            ("PATH_INFO", "/doc.html"),
            ("SERVER_PORT", "80"),
            ("HTTPS", "off"),
            ("QUERY_STRING", "--webpage"),
        ]);
        assert_eq!(request_url(&env)?, "http://docs.example.com/doc.html");
        Ok(())
    }

    #[test]
    fn missing_path_info_is_a_configuration_error() {
        let err = request_url(&server(&[("SERVER_PORT", "80")]));
        assert!(matches!(err, Err(CgiError::MissingPathInfo)));
        let err = request_url(&server(&[("SERVER_PORT", "80"), ("PATH_INFO", "")]));
        assert!(matches!(&err, Err(e) if e.class() == ErrorClass::Configuration));
    }

    #[test]
    fn missing_port_is_named() {
        let err = request_url(&server(&[("PATH_INFO", "/doc.html")]));
        assert!(matches!(&err, Err(CgiError::MissingServerPort)));
        assert!(matches!(&err, Err(e) if e.class() == ErrorClass::Configuration));
    }

    #[test]
    fn bad_port_is_rejected() {
        let env = server(&[("PATH_INFO", "/x"), ("SERVER_PORT", "99999")]);
        assert!(matches!(request_url(&env), Err(CgiError::BadServer(_))));
    }

    #[test]
    fn candidates_follow_path_translated() {
        let env = server(&[("PATH_TRANSLATED", "/var/www/docs/doc.html")]);
        assert_eq!(
            book_candidates(&env),
            [
                PathBuf::from("/var/www/docs/doc.html.book"),
                PathBuf::from("/var/www/docs/.book"),
                PathBuf::from(".book"),
            ]
        );
        assert_eq!(book_candidates(&server(&[])), [PathBuf::from(".book")]);
    }

    #[test]
    fn preset_forces_web_pdf() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let page = dir.path().join("page.html");
        std::fs::write(&page, "<p>x</p>")?;
        std::fs::write(
            dir.path().join("page.html.book"),
            "#HTMLDOC\n--landscape -f stolen.ps --fontsize 14\n",
        )?;
        let env = server(&[
            ("PATH_TRANSLATED", &*page.to_string_lossy()),
            ("HTTP_COOKIE", "session=1"),
        ]);

        let mut session = Session::new(Config::default());
        session.start_cgi(&env)?;
        assert!(session.cgi);
        assert_eq!(session.export.target(), ExportTarget::Pdf(PdfVersion::V1_4));
        assert_eq!(session.config.ps_level, 0);
        assert_eq!(session.config.output_type, OutputType::WebPages);
        assert_eq!(session.config.toc_levels, 0);
        assert_eq!(session.config.output_path, "");
        assert_eq!(session.config.cookies, "session=1");
        assert!(session.config.landscape);
        assert_eq!(session.config.font_size, 14.0);
        assert!(session.config.no_local_files);
        Ok(())
    }
}
