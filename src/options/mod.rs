//! Command-line and book-file option parsing.
//!
//! Both surfaces share one table ([`table::OPTIONS`]). The command line accepts
//! abbreviations and treats bad values as fatal; options lines in book files need full
//! names and skip anything they cannot apply.

mod error;
pub mod table;

pub use error::UsageError;

use crate::config::MAX_HF_IMAGES;
use crate::session::Session;
use std::io::Read;
use std::iter::Peekable;
use table::{Action, Rejected};

fn rejection(option: &str, value: &str, rejected: Rejected) -> UsageError {
    match rejected {
        Rejected::Format => UsageError::UnknownFormat(value.to_string()),
        Rejected::Invalid(reason) => UsageError::BadValue {
            option: option.to_string(),
            value: value.to_string(),
            reason,
        },
    }
}

/// True when `--version` appears among the options. Option values are skipped.
pub fn version_requested(args: &[String]) -> bool {
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        if !arg.starts_with('-') || arg == "-" {
            continue;
        }
        match table::find_prefix(arg) {
            Some((spec, _)) if matches!(spec.action, Action::Version) => return true,
            Some((spec, _)) if spec.action.takes_value() => {
                args.next();
            }
            _ => {}
        }
    }
    false
}

/// Apply command-line arguments (program name excluded) in order.
///
/// Files, `.book` files and `-` (read from `stdin`) are loaded as they are met, so
/// options only affect the inputs that follow them. Missing or unreadable inputs are
/// reported on the session and do not stop parsing.
pub fn parse_command_line(
    session: &mut Session,
    args: &[String],
    stdin: &mut dyn Read,
) -> Result<(), UsageError> {
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        if arg == "-" {
            session.inputs += 1;
            if let Err(e) = session.append_reader(stdin) {
                session.report(&e);
            }
            continue;
        }

        if !arg.starts_with('-') {
            session.inputs += 1;
            if arg.len() > 5 && arg.ends_with(".book") {
                let path = session.config.path.clone();
                if let Err(e) = session.load_book(arg, &path, false) {
                    session.report(&e);
                }
            } else {
                let path = session.config.path.clone();
                session.read_file(arg, &path);
            }
            continue;
        }

        let (spec, suffix) =
            table::find_prefix(arg).ok_or_else(|| UsageError::UnknownOption(arg.clone()))?;
        let mut value = || {
            args.next()
                .ok_or_else(|| UsageError::MissingValue(arg.clone()))
        };
        match spec.action {
            Action::Flag(apply) => apply(session),
            Action::Inline(apply) => apply(session, suffix.inline()),
            Action::Value(apply) => {
                let v = value()?;
                apply(session, v).map_err(|r| rejection(arg, v, r))?;
            }
            Action::Indexed(apply) => {
                let index = suffix.index(MAX_HF_IMAGES).ok_or_else(|| UsageError::BadValue {
                    option: spec.name.to_string(),
                    value: arg.clone(),
                    reason: "image index must be 0 to 9",
                })?;
                apply(session, index, value()?);
            }
            Action::Help => return Err(UsageError::Help),
            // Handled before parsing starts.
            Action::Version => {}
        }
    }
    Ok(())
}

/// Whitespace-separated words; a double-quoted word may contain spaces.
struct Words<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest.trim_start();
        if rest.is_empty() {
            self.rest = rest;
            return None;
        }
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            self.rest = quoted.get(end + 1..).unwrap_or("");
            return Some(&quoted[..end]);
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.rest = &rest[end..];
        Some(&rest[..end])
    }
}

fn words(line: &str) -> Peekable<Words<'_>> {
    Words { rest: line }.peekable()
}

/// Apply one options line from a book file.
///
/// Unknown options are skipped along with a following value word. Output selection
/// (`--format`, `--outfile`, `--outdir` and their short forms) is ignored in CGI mode.
pub fn parse_options_line(session: &mut Session, line: &str) {
    let mut words = words(line);
    while let Some(word) = words.next() {
        let Some((spec, suffix)) = table::find_exact(word) else {
            tracing::warn!("Unknown book option \"{}\" ignored.", word);
            if words.peek().is_some_and(|next| !next.starts_with('-')) {
                words.next();
            }
            continue;
        };
        let locked = session.cgi && spec.cgi_locked;
        match spec.action {
            Action::Flag(apply) if !locked => apply(session),
            Action::Inline(apply) if !locked => apply(session, suffix.inline()),
            Action::Value(apply) => {
                let Some(value) = words.next() else { break };
                if locked {
                    continue;
                }
                if let Err(rejected) = apply(session, value) {
                    tracing::warn!("{} ignored.", rejection(spec.name, value, rejected));
                }
            }
            Action::Indexed(apply) => {
                let Some(value) = words.next() else { break };
                match suffix.index(MAX_HF_IMAGES) {
                    Some(index) => apply(session, index, value),
                    None => tracing::warn!("Bad image index in \"{}\" ignored.", word),
                }
            }
            _ => {}
        }
    }
}
