//! Resolve input names against a search path and fetch remote inputs.

use super::AssemblyError;
use crate::cleanup::TempRegistry;
use crate::config::Config;
use reqwest::header::{COOKIE, REFERER};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const USER_AGENT: &str = concat!("htmldoc/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// True for `http:` and `https:` URLs.
pub fn is_url(name: &str) -> bool {
    let lower = name.get(..8).unwrap_or(name).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Strip a query string or fragment from a URL.
fn without_query(name: &str) -> &str {
    if is_url(name) {
        name.split(['?', '#']).next().unwrap_or(name)
    } else {
        name
    }
}

/// Directory part of a file name or URL, or `None` when the name has no directory.
pub fn file_directory(name: &str) -> Option<String> {
    let name = without_query(name);
    let authority_end = if is_url(name) {
        name.find("://").map(|i| i + 3)
    } else {
        None
    };
    match name.rfind('/') {
        Some(i) if authority_end.is_some_and(|end| i < end) => Some(name.to_string()),
        None if authority_end.is_some() => Some(name.to_string()),
        Some(0) => Some("/".to_string()),
        Some(i) => Some(name[..i].to_string()),
        None => None,
    }
}

/// Final component of a file name or URL, without any query string.
pub fn file_basename(name: &str) -> String {
    let name = without_query(name);
    name.rsplit('/').next().unwrap_or(name).to_string()
}

/// Reduce a remote file name to something safe to create in the download directory.
fn download_name(url: &str) -> String {
    let base: String = file_basename(url)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if base.is_empty() || base.starts_with('.') {
        format!("index{}", base)
    } else {
        base
    }
}

/// Finds input files on disk or on the network.
///
/// Remote documents are downloaded once per run into a temporary directory, which is
/// removed when the resolver is dropped (or by the signal handler).
#[derive(Debug)]
pub struct FileResolver {
    client: Option<(String, reqwest::blocking::Client)>,
    downloads: Option<TempDir>,
    fetched: HashMap<String, PathBuf>,
    registry: TempRegistry,
}

impl FileResolver {
    pub fn new(registry: TempRegistry) -> Self {
        Self {
            client: None,
            downloads: None,
            fetched: HashMap::new(),
            registry,
        }
    }

    /// Resolve `name` to a readable local path.
    ///
    /// URLs are downloaded. Other names are tried as absolute paths, then under each `;`
    /// separated entry of `search_path` (which may itself be a URL), then relative to the
    /// working directory. When local files are disabled only URLs resolve.
    pub fn find(
        &mut self,
        config: &Config,
        search_path: &str,
        name: &str,
    ) -> Result<PathBuf, AssemblyError> {
        if is_url(name) {
            return self.fetch(config, name);
        }
        let name = name.strip_prefix("file:").unwrap_or(name);
        if config.no_local_files {
            return Err(AssemblyError::LocalFilesDisabled {
                name: name.to_string(),
            });
        }
        let not_found = || AssemblyError::NotFound {
            name: name.to_string(),
        };
        if name.is_empty() {
            return Err(not_found());
        }
        if Path::new(name).is_absolute() {
            return if Path::new(name).is_file() {
                Ok(PathBuf::from(name))
            } else {
                Err(not_found())
            };
        }
        for dir in search_path.split(';').filter(|d| !d.is_empty()) {
            if is_url(dir) {
                let url = format!("{}/{}", dir.trim_end_matches('/'), name);
                match self.fetch(config, &url) {
                    Ok(path) => return Ok(path),
                    Err(e) => tracing::trace!("{}", e),
                }
                continue;
            }
            let candidate = Path::new(dir).join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        if Path::new(name).is_file() {
            return Ok(PathBuf::from(name));
        }
        Err(not_found())
    }

    fn fetch(&mut self, config: &Config, url: &str) -> Result<PathBuf, AssemblyError> {
        if let Some(path) = self.fetched.get(url) {
            return Ok(path.clone());
        }
        let client = self.client_for(&config.proxy)?;
        let mut request = client.get(url);
        if !config.cookies.is_empty() {
            request = request.header(COOKIE, config.cookies.as_str());
        }
        if !config.referer.is_empty() {
            request = request.header(REFERER, config.referer.as_str());
        }
        let network = |source| AssemblyError::Network {
            url: url.to_string(),
            source,
        };
        let response = request.send().map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssemblyError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().map_err(network)?;

        let download = |source| AssemblyError::Download {
            url: url.to_string(),
            source,
        };
        let dir = self.download_dir().map_err(download)?;
        let path = dir.join(format!("{:04}-{}", self.fetched.len(), download_name(url)));
        std::fs::write(&path, &body).map_err(download)?;
        tracing::debug!("Fetched {} ({} bytes)", url, body.len());
        self.fetched.insert(url.to_string(), path.clone());
        Ok(path)
    }

    /// Blocking client for the current proxy setting; rebuilt when the proxy changes.
    fn client_for(&mut self, proxy: &str) -> Result<reqwest::blocking::Client, AssemblyError> {
        if let Some((p, client)) = &self.client {
            if p == proxy {
                return Ok(client.clone());
            }
        }
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        if !proxy.is_empty() {
            let proxy = reqwest::Proxy::all(proxy).map_err(|source| AssemblyError::Client { source })?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|source| AssemblyError::Client { source })?;
        self.client = Some((proxy.to_string(), client.clone()));
        Ok(client)
    }

    fn download_dir(&mut self) -> std::io::Result<PathBuf> {
        if let Some(dir) = &self.downloads {
            return Ok(dir.path().to_path_buf());
        }
        let dir = tempfile::Builder::new().prefix("htmldoc").tempdir()?;
        let path = dir.path().to_path_buf();
        self.registry.register(path.clone());
        self.downloads = Some(dir);
        Ok(path)
    }
}
