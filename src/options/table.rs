//! The option table shared by the command line and book-file options lines.
//!
//! Entries are searched in order and the first match wins. On the command line a token
//! matches when it is a prefix of the option name at least `min` characters long; in
//! book files names must match exactly.

use crate::config::{
    lookup, LinkStyle, OutputType, HEADFOOT_FONT_NAMES, PDF_EFFECT_NAMES, PDF_FIRST_PAGE_NAMES,
    PDF_PAGE_LAYOUT_NAMES, PDF_PAGE_MODE_NAMES, TYPEFACE_NAMES,
};
use crate::export::ExportTarget;
use crate::headfoot::HeadFootFormat;
use crate::session::Session;
use crate::units::{leading_float, leading_int, parse_measurement, parse_page_size};
use std::path::PathBuf;

/// Why a handler refused its value. Fatal on the command line, ignored in book files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    Format,
    Invalid(&'static str),
}

/// What an option does and which arguments it takes.
#[derive(Clone, Copy)]
pub enum Action {
    /// No argument.
    Flag(fn(&mut Session)),
    /// Takes the next argument.
    Value(fn(&mut Session, &str) -> Result<(), Rejected>),
    /// Optional attached value: `--name` or `--name=value`.
    Inline(fn(&mut Session, Option<&str>)),
    /// `--nameN value`, with N a slot index.
    Indexed(fn(&mut Session, usize, &str)),
    Help,
    Version,
}

impl Action {
    pub fn takes_value(&self) -> bool {
        matches!(self, Action::Value(_) | Action::Indexed(_))
    }
}

#[derive(Clone, Copy)]
pub struct OptionSpec {
    pub name: &'static str,
    /// Minimum characters a command-line token must have to match.
    pub min: usize,
    pub action: Action,
    /// Selects the output; ignored in book files while running as CGI.
    pub cgi_locked: bool,
}

impl std::fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionSpec")
            .field("name", &self.name)
            .field("min", &self.min)
            .finish_non_exhaustive()
    }
}

/// Text attached to a matched token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix<'a> {
    None,
    /// After `=` for [`Action::Inline`].
    Inline(&'a str),
    /// After the name for [`Action::Indexed`].
    Index(&'a str),
}

impl<'a> Suffix<'a> {
    pub fn inline(self) -> Option<&'a str> {
        match self {
            Suffix::Inline(v) if !v.is_empty() => Some(v),
            _ => None,
        }
    }

    /// Slot index for `--hfimageN`; a bare name is slot 0.
    pub fn index(self, slots: usize) -> Option<usize> {
        match self {
            Suffix::Index("") | Suffix::None => Some(0),
            Suffix::Index(digits) if digits.bytes().all(|b| b.is_ascii_digit()) => {
                digits.parse().ok().filter(|i| *i < slots)
            }
            _ => None,
        }
    }
}

impl OptionSpec {
    const fn new(name: &'static str, min: usize, action: Action) -> Self {
        Self {
            name,
            min,
            action,
            cgi_locked: false,
        }
    }

    const fn locked(self) -> Self {
        Self {
            cgi_locked: true,
            ..self
        }
    }

    fn match_suffix<'a>(&self, token: &'a str) -> Option<Suffix<'a>> {
        let rest = token.strip_prefix(self.name)?;
        match self.action {
            Action::Inline(_) => rest.strip_prefix('=').map(Suffix::Inline),
            Action::Indexed(_) => Some(Suffix::Index(rest)),
            _ => None,
        }
    }

    /// Command-line match: unambiguous prefix, or an attached suffix.
    pub fn match_prefix<'a>(&self, token: &'a str) -> Option<Suffix<'a>> {
        if let Some(suffix) = self.match_suffix(token) {
            return Some(suffix);
        }
        (!matches!(self.action, Action::Indexed(_))
            && token.len() >= self.min
            && self.name.starts_with(token))
        .then_some(Suffix::None)
    }

    /// Book-file match: the full name, or an attached suffix.
    pub fn match_exact<'a>(&self, token: &'a str) -> Option<Suffix<'a>> {
        if token == self.name && !matches!(self.action, Action::Indexed(_)) {
            return Some(Suffix::None);
        }
        self.match_suffix(token)
    }
}

/// First command-line table entry matching `token`.
pub fn find_prefix(token: &str) -> Option<(&'static OptionSpec, Suffix<'_>)> {
    OPTIONS
        .iter()
        .find_map(|spec| spec.match_prefix(token).map(|m| (spec, m)))
}

/// Table entry named exactly `token`; `--logo` is accepted for `--logoimage`.
pub fn find_exact(token: &str) -> Option<(&'static OptionSpec, Suffix<'_>)> {
    let token = if token == "--logo" { "--logoimage" } else { token };
    OPTIONS
        .iter()
        .find_map(|spec| spec.match_exact(token).map(|m| (spec, m)))
}

const fn flag(name: &'static str, min: usize, f: fn(&mut Session)) -> OptionSpec {
    OptionSpec::new(name, min, Action::Flag(f))
}

const fn value(
    name: &'static str,
    min: usize,
    f: fn(&mut Session, &str) -> Result<(), Rejected>,
) -> OptionSpec {
    OptionSpec::new(name, min, Action::Value(f))
}

/// Option that must be spelled out in full.
const fn exact(name: &'static str, action: Action) -> OptionSpec {
    OptionSpec::new(name, name.len(), action)
}

fn clamp_u8(v: i64, lo: u8, hi: u8) -> u8 {
    v.clamp(lo as i64, hi as i64) as u8
}

fn clamp_f32(v: f64, lo: f32, hi: f32) -> f32 {
    (v as f32).clamp(lo, hi)
}

/// Set from a keyword table, warning and keeping the current value on no match.
fn keyword<T: Copy>(table: &[(&str, T)], option: &str, value: &str, slot: &mut T) {
    match lookup(table, value) {
        Some(v) => *slot = v,
        None => tracing::warn!("Unknown {} value \"{}\" ignored.", option, value),
    }
}

fn batch(s: &mut Session, v: &str) -> Result<(), Rejected> {
    s.inputs += 1;
    let path = s.config.path.clone();
    if let Err(e) = s.load_book(v, &path, false) {
        s.report(&e);
    }
    Ok(())
}

fn browser_width(s: &mut Session, v: &str) -> Result<(), Rejected> {
    let width = leading_float(v);
    if width < 1.0 {
        return Err(Rejected::Invalid("browser width must be at least 1"));
    }
    s.config.browser_width = width as f32;
    Ok(())
}

fn compression(s: &mut Session, v: Option<&str>) {
    let level = v.map(|v| clamp_u8(leading_int(v), 0, 9)).unwrap_or(1);
    s.export.set_compression(level, &mut s.config);
}

fn effect_duration(s: &mut Session, v: &str) -> Result<(), Rejected> {
    let secs = leading_float(v);
    if secs < 0.0 {
        return Err(Rejected::Invalid("effect duration must not be negative"));
    }
    s.config.effect_duration = secs as f32;
    Ok(())
}

fn format(s: &mut Session, v: &str) -> Result<(), Rejected> {
    let target = ExportTarget::from_keyword(v).ok_or(Rejected::Format)?;
    s.export.select(target, &mut s.config);
    Ok(())
}

fn headfoot_font(s: &mut Session, v: &str) -> Result<(), Rejected> {
    let mut pair = (s.config.head_foot_type, s.config.head_foot_style);
    keyword(HEADFOOT_FONT_NAMES, "--headfootfont", v, &mut pair);
    (s.config.head_foot_type, s.config.head_foot_style) = pair;
    Ok(())
}

fn hf_image(s: &mut Session, index: usize, v: &str) {
    if let Some(slot) = s.config.hf_images.get_mut(index) {
        *slot = v.to_string();
    }
}

fn jpeg(s: &mut Session, v: Option<&str>) {
    s.config.jpeg_quality = v.map(|v| clamp_u8(leading_int(v), 0, 100)).unwrap_or(90);
}

fn link_style(s: &mut Session, v: &str) -> Result<(), Rejected> {
    s.config.link_style = match v {
        "plain" => LinkStyle::Plain,
        "underline" => LinkStyle::Underline,
        _ => return Err(Rejected::Invalid("expected plain or underline")),
    };
    Ok(())
}

fn number_up(s: &mut Session, v: &str) -> Result<(), Rejected> {
    match leading_int(v) {
        n @ (1 | 2 | 4 | 6 | 9 | 16) => {
            s.config.number_up = n as u8;
            Ok(())
        }
        _ => Err(Rejected::Invalid("expected 1, 2, 4, 6, 9 or 16")),
    }
}

fn outfile(s: &mut Session, v: &str) -> Result<(), Rejected> {
    s.config.output_path = v.to_string();
    s.config.output_files = false;
    s.export.infer_from_output(v, &mut s.config);
    Ok(())
}

fn page_duration(s: &mut Session, v: &str) -> Result<(), Rejected> {
    let secs = leading_float(v);
    if secs < 1.0 {
        return Err(Rejected::Invalid("page duration must be at least 1"));
    }
    s.config.page_duration = secs as f32;
    Ok(())
}

fn page_size(s: &mut Session, v: &str) -> Result<(), Rejected> {
    match parse_page_size(v) {
        Some((width, length)) => {
            s.config.page_width = width;
            s.config.page_length = length;
        }
        None => tracing::warn!("Unknown page size \"{}\" ignored.", v),
    }
    Ok(())
}

fn superseded(s: &mut Session, old: &str, new: &str, embed: bool) {
    tracing::warn!("{} option superseded by {}!", old, new);
    s.config.embed_fonts = embed;
}

/// Every option, in match order.
pub static OPTIONS: &[OptionSpec] = &[
    value("--batch", 4, batch),
    value("--bodycolor", 7, |s, v| {
        s.config.body_color = v.to_string();
        Ok(())
    }),
    value("--bodyfont", 7, |s, v| {
        keyword(TYPEFACE_NAMES, "--bodyfont", v, &mut s.config.body_font);
        Ok(())
    }),
    value("--textfont", 7, |s, v| {
        keyword(TYPEFACE_NAMES, "--textfont", v, &mut s.config.body_font);
        Ok(())
    }),
    value("--bodyimage", 7, |s, v| {
        s.config.body_image = v.to_string();
        Ok(())
    }),
    flag("--book", 5, |s| s.config.output_type = OutputType::Book),
    value("--bottom", 5, |s, v| {
        s.config.page_bottom = parse_measurement(v);
        Ok(())
    }),
    value("--browserwidth", 4, browser_width),
    value("--charset", 4, |s, v| {
        s.config.charset = v.to_string();
        Ok(())
    }),
    flag("--color", 5, |s| s.config.output_color = true),
    OptionSpec::new("--compression", 5, Action::Inline(compression)),
    flag("--continuous", 5, |s| {
        s.config.set_unchaptered(OutputType::Continuous)
    }),
    value("--cookies", 5, |s, v| {
        s.config.cookies = v.to_string();
        Ok(())
    }),
    value("--datadir", 4, |s, v| {
        s.config.data_dir = PathBuf::from(v);
        Ok(())
    }),
    flag("--duplex", 4, |s| s.config.page_duplex = true),
    value("--effectduration", 4, effect_duration),
    flag("--embedfonts", 4, |s| s.config.embed_fonts = true),
    flag("--encryption", 4, |s| s.config.encryption = true),
    value("--firstpage", 4, |s, v| {
        keyword(PDF_FIRST_PAGE_NAMES, "--firstpage", v, &mut s.config.first_page);
        Ok(())
    }),
    value("--fontsize", 8, |s, v| {
        s.config.font_size = clamp_f32(leading_float(v), 4.0, 24.0);
        Ok(())
    }),
    value("--fontspacing", 8, |s, v| {
        s.config.font_spacing = clamp_f32(leading_float(v), 1.0, 3.0);
        Ok(())
    }),
    value("--footer", 5, |s, v| {
        s.config.footer = HeadFootFormat::parse(v);
        Ok(())
    }),
    value("--format", 5, format).locked(),
    exact("-t", Action::Value(format)).locked(),
    flag("--grayscale", 3, |s| s.config.output_color = false),
    exact(
        "--header",
        Action::Value(|s, v| {
            s.config.header = HeadFootFormat::parse(v);
            Ok(())
        }),
    ),
    exact(
        "--header1",
        Action::Value(|s, v| {
            s.config.header1 = HeadFootFormat::parse(v);
            Ok(())
        }),
    ),
    value("--headfootfont", 11, headfoot_font),
    value("--headfootsize", 11, |s, v| {
        s.config.head_foot_size = clamp_f32(leading_float(v), 6.0, 24.0);
        Ok(())
    }),
    value("--headingfont", 7, |s, v| {
        keyword(TYPEFACE_NAMES, "--headingfont", v, &mut s.config.heading_font);
        Ok(())
    }),
    OptionSpec::new("--help", 6, Action::Help),
    OptionSpec::new("--hfimage", 9, Action::Indexed(hf_image)),
    OptionSpec::new("--jpeg", 3, Action::Inline(jpeg)),
    flag("--landscape", 4, |s| s.config.landscape = true),
    value("--left", 5, |s, v| {
        s.config.page_left = parse_measurement(v);
        Ok(())
    }),
    value("--letterhead", 5, |s, v| {
        s.config.letterhead = v.to_string();
        Ok(())
    }),
    value("--linkcolor", 7, |s, v| {
        s.config.link_color = v.to_string();
        Ok(())
    }),
    exact("--links", Action::Flag(|s| s.config.links = true)),
    value("--linkstyle", 8, link_style),
    value("--logoimage", 5, |s, v| {
        s.config.logo_image = v.to_string();
        Ok(())
    }),
    flag("--no-compression", 6, |s| s.config.compression = 0),
    flag("--no-duplex", 4, |s| s.config.page_duplex = false),
    flag("--no-embedfonts", 7, |s| s.config.embed_fonts = false),
    flag("--no-encryption", 7, |s| s.config.encryption = false),
    flag("--no-jpeg", 6, |s| s.config.jpeg_quality = 0),
    flag("--no-links", 7, |s| s.config.links = false),
    flag("--no-localfiles", 7, |s| s.config.no_local_files = true),
    flag("--no-numbered", 6, |s| s.config.toc_numbers = false),
    flag("--no-overflow", 6, |s| s.config.overflow_errors = false),
    flag("--no-pscommands", 6, |s| s.config.ps_commands = false),
    flag("--no-strict", 6, |s| s.config.strict_html = false),
    flag("--no-title", 7, |s| s.config.title_page = false),
    flag("--no-toc", 7, |s| s.config.toc_levels = 0),
    flag("--no-truetype", 7, |s| {
        superseded(s, "--no-truetype", "--no-embedfonts", false)
    }),
    flag("--no-xrxcomments", 6, |s| s.config.xrx_comments = false),
    flag("--numbered", 5, |s| s.config.toc_numbers = true),
    value("--nup", 5, number_up),
    value("--outdir", 6, |s, v| {
        s.config.output_path = v.to_string();
        s.config.output_files = true;
        Ok(())
    })
    .locked(),
    exact(
        "-d",
        Action::Value(|s, v| {
            s.config.output_path = v.to_string();
            s.config.output_files = true;
            Ok(())
        }),
    )
    .locked(),
    value("--outfile", 6, outfile).locked(),
    exact("-f", Action::Value(outfile)).locked(),
    flag("--overflow", 4, |s| s.config.overflow_errors = true),
    value("--owner-password", 4, |s, v| {
        s.config.owner_password = v.to_string();
        Ok(())
    }),
    value("--pageduration", 7, page_duration),
    value("--pageeffect", 7, |s, v| {
        keyword(PDF_EFFECT_NAMES, "--pageeffect", v, &mut s.config.page_effect);
        Ok(())
    }),
    value("--pagelayout", 7, |s, v| {
        keyword(PDF_PAGE_LAYOUT_NAMES, "--pagelayout", v, &mut s.config.page_layout);
        Ok(())
    }),
    value("--pagemode", 7, |s, v| {
        keyword(PDF_PAGE_MODE_NAMES, "--pagemode", v, &mut s.config.page_mode);
        Ok(())
    }),
    value("--path", 5, |s, v| {
        s.config.path = v.to_string();
        Ok(())
    }),
    value("--permissions", 4, |s, v| {
        s.config.apply_permissions(v);
        Ok(())
    }),
    flag("--portrait", 4, |s| s.config.landscape = false),
    value("--pre-indent", 5, |s, v| {
        s.config.pre_indent = parse_measurement(v);
        Ok(())
    }),
    value("--proxy", 4, |s, v| {
        s.config.proxy = v.to_string();
        Ok(())
    }),
    flag("--pscommands", 3, |s| s.config.ps_commands = true),
    flag("--quiet", 3, |s| s.set_verbosity(-1)),
    value("--referer", 4, |s, v| {
        s.config.referer = v.to_string();
        Ok(())
    }),
    value("--right", 4, |s, v| {
        s.config.page_right = parse_measurement(v);
        Ok(())
    }),
    value("--size", 4, page_size),
    flag("--strict", 4, |s| s.config.strict_html = true),
    value("--textcolor", 7, |s, v| {
        s.config.text_color = v.to_string();
        Ok(())
    }),
    flag("--title", 7, |s| s.config.title_page = true),
    value("--titlefile", 8, |s, v| {
        s.config.title_image = v.to_string();
        s.config.title_page = true;
        Ok(())
    }),
    value("--titleimage", 8, |s, v| {
        s.config.title_image = v.to_string();
        s.config.title_page = true;
        Ok(())
    }),
    value("--tocfooter", 6, |s, v| {
        s.config.toc_footer = HeadFootFormat::parse(v);
        Ok(())
    }),
    value("--tocheader", 6, |s, v| {
        s.config.toc_header = HeadFootFormat::parse(v);
        Ok(())
    }),
    value("--toclevels", 6, |s, v| {
        s.config.toc_levels = clamp_u8(leading_int(v), 0, 6);
        Ok(())
    }),
    value("--toctitle", 6, |s, v| {
        s.config.toc_title = v.to_string();
        Ok(())
    }),
    value("--top", 5, |s, v| {
        s.config.page_top = parse_measurement(v);
        Ok(())
    }),
    value("--user-password", 4, |s, v| {
        s.config.user_password = v.to_string();
        Ok(())
    }),
    flag("--truetype", 4, |s| {
        superseded(s, "--truetype", "--embedfonts", true)
    }),
    flag("--verbose", 6, |s| s.set_verbosity(s.config.verbosity + 1)),
    exact("-v", Action::Flag(|s| s.set_verbosity(s.config.verbosity + 1))),
    OptionSpec::new("--version", 6, Action::Version),
    flag("--webpage", 3, |s| s.config.set_unchaptered(OutputType::WebPages)),
    flag("--xrxcomments", 3, |s| s.config.xrx_comments = true),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn name_of(token: &str) -> Option<&'static str> {
        find_prefix(token).map(|(spec, _)| spec.name)
    }

    #[test]
    fn minimum_prefixes() {
        assert_eq!(name_of("--b"), None);
        assert_eq!(name_of("--ba"), Some("--batch"));
        assert_eq!(name_of("--no"), Some("--no-duplex"));
        assert_eq!(name_of("--no-"), Some("--no-duplex"));
        assert_eq!(name_of("--no-c"), Some("--no-compression"));
        assert_eq!(name_of("--no-co"), Some("--no-compression"));
        assert_eq!(name_of("--no-e"), None);
        assert_eq!(name_of("--gra"), Some("--grayscale"));
        assert_eq!(name_of("--fontsiz"), Some("--fontsize"));
        assert_eq!(name_of("--fonts"), None);
        assert_eq!(name_of("--web"), Some("--webpage"));
    }

    #[test]
    fn first_matching_entry_wins() {
        assert_eq!(name_of("--title"), Some("--title"));
        assert_eq!(name_of("--titlef"), Some("--titlefile"));
        assert_eq!(name_of("--titlei"), Some("--titleimage"));
        assert_eq!(name_of("--verbose"), Some("--verbose"));
        assert_eq!(name_of("--ver"), None);
        assert_eq!(name_of("--vers"), Some("--version"));
    }

    #[test]
    fn exact_only_names() {
        assert_eq!(name_of("--header"), Some("--header"));
        assert_eq!(name_of("--header1"), Some("--header1"));
        assert_eq!(name_of("--heade"), None);
        assert_eq!(name_of("--links"), Some("--links"));
        assert_eq!(name_of("--link"), None);
        assert_eq!(name_of("-t"), Some("-t"));
        assert_eq!(name_of("-"), None);
        assert_eq!(name_of("-x"), None);
    }

    #[test]
    fn attached_values() {
        let (spec, suffix) = find_prefix("--jpeg=75").unwrap();
        assert_eq!(spec.name, "--jpeg");
        assert_eq!(suffix.inline(), Some("75"));
        let (spec, suffix) = find_prefix("--compression=").unwrap();
        assert_eq!(spec.name, "--compression");
        assert_eq!(suffix.inline(), None);
        let (spec, suffix) = find_prefix("--hfimage7").unwrap();
        assert_eq!(spec.name, "--hfimage");
        assert_eq!(suffix.index(10), Some(7));
        assert_eq!(find_prefix("--hfimage").unwrap().1.index(10), Some(0));
        assert_eq!(find_prefix("--hfimage10").unwrap().1.index(10), None);
        assert_eq!(find_prefix("--hfimage2x").unwrap().1.index(10), None);
    }

    #[test]
    fn book_lookup_is_exact() {
        assert_eq!(find_exact("--landscape").map(|m| m.0.name), Some("--landscape"));
        assert!(find_exact("--land").is_none());
        assert_eq!(find_exact("--logo").map(|m| m.0.name), Some("--logoimage"));
        assert_eq!(find_exact("--jpeg=50").map(|m| m.1.inline()), Some(Some("50")));
        assert_eq!(find_exact("--hfimage3").map(|m| m.1.index(10)), Some(Some(3)));
    }

    #[test]
    fn value_arity() {
        assert!(find_prefix("--size").unwrap().0.action.takes_value());
        assert!(find_prefix("--hfimage1").unwrap().0.action.takes_value());
        assert!(!find_prefix("--jpeg").unwrap().0.action.takes_value());
        assert!(!find_prefix("--book").unwrap().0.action.takes_value());
    }
}
