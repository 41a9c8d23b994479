//! Book files: a `#HTMLDOC` header followed by options lines and input names.

use crate::assembly::{file_directory, is_url, AssemblyError};
use crate::options::parse_options_line;
use crate::session::{Classified, ErrorClass, Session};
use std::path::PathBuf;
use thiserror::Error;

/// Nesting limit for books that load other books.
pub const MAX_BOOK_DEPTH: usize = 8;

const HEADER: &str = "#HTMLDOC";

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Unable to find book file \"{name}\": {source}")]
    NotFound {
        name: String,
        #[source]
        source: AssemblyError,
    },

    #[error("Unable to open book file \"{path}\": {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bad or missing {HEADER} header in \"{0}\".")]
    BadHeader(String),

    #[error("Book file \"{0}\" nested too deeply.")]
    TooDeep(String),
}

impl Classified for BookError {
    fn class(&self) -> ErrorClass {
        match self {
            BookError::NotFound { .. } => ErrorClass::NotFound,
            BookError::Open { .. } => ErrorClass::Read,
            BookError::BadHeader(_) | BookError::TooDeep(_) => ErrorClass::BadFormat,
        }
    }
}

fn is_book_name(name: &str) -> bool {
    name.len() > 5 && name.ends_with(".book")
}

/// Lines of the book body, after the header and an optional legacy file count.
fn body_lines<'a>(name: &str, text: &'a str) -> Result<impl Iterator<Item = &'a str>, BookError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .skip_while(|l| l.trim().is_empty());
    match lines.next() {
        Some(header) if header.starts_with(HEADER) => {}
        _ => return Err(BookError::BadHeader(name.to_string())),
    }
    let mut lines = lines.filter(|l| !l.trim().is_empty()).peekable();
    if lines
        .peek()
        .is_some_and(|l| l.trim().bytes().all(|b| b.is_ascii_digit()))
    {
        lines.next();
    }
    Ok(lines)
}

impl Session {
    /// Load a book file: apply its options lines and append its inputs in order.
    ///
    /// The book is looked up along `search_path`. Its inputs and nested books are looked
    /// up in the book's directory first, then along `--path`. When `set_nolocal` is true,
    /// local files are disabled once the book itself is found.
    pub fn load_book(
        &mut self,
        name: &str,
        search_path: &str,
        set_nolocal: bool,
    ) -> Result<(), BookError> {
        if self.book_depth >= MAX_BOOK_DEPTH {
            return Err(BookError::TooDeep(name.to_string()));
        }
        let found = self.resolver.find(&self.config, search_path, name);
        if set_nolocal {
            self.config.no_local_files = true;
        }
        let path = found.map_err(|source| BookError::NotFound {
            name: name.to_string(),
            source,
        })?;
        let bytes = std::fs::read(&path).map_err(|source| BookError::Open {
            path: path.clone(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let lines = body_lines(name, &text)?;
        tracing::debug!("Loading book {}...", name);

        let dir = if is_url(name) {
            file_directory(name)
        } else {
            file_directory(&path.to_string_lossy())
        };
        let mut search_path = self.book_search_path(dir.as_deref());
        self.book_depth += 1;
        for line in lines {
            if line.starts_with('-') {
                parse_options_line(self, line);
                search_path = self.book_search_path(dir.as_deref());
            } else if let Some(literal) = line.strip_prefix('\\') {
                self.read_file(literal, &search_path);
            } else if is_book_name(line) {
                if let Err(e) = self.load_book(line, &search_path, false) {
                    self.report(&e);
                }
            } else {
                self.read_file(line, &search_path);
            }
        }
        self.book_depth -= 1;
        Ok(())
    }
}
