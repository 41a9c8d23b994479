//! The per-user preferences file (`~/.htmldocrc`): `KEY=value` lines.

use crate::config::{Coded, Config};
use crate::env::Env;
use crate::headfoot::HeadFootFormat;
use crate::permissions::Permissions;
use crate::units::{leading_float, leading_int};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FILE_NAME: &str = ".htmldocrc";

const HEADER: &str = concat!("#HTMLDOCRC ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("Unable to write preferences to \"{path}\": {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Preferences file location: the home directory, else the data directory.
pub fn default_path(env: &Env, data_dir: &Path) -> PathBuf {
    env.get("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| data_dir.to_path_buf())
        .join(FILE_NAME)
}

/// One tracked setting.
struct PrefKey {
    name: &'static str,
    write: fn(&Config) -> String,
    read: fn(&mut Config, &str),
}

fn flag(v: &str) -> bool {
    leading_int(v) != 0
}

fn bit(b: bool) -> String {
    u8::from(b).to_string()
}

fn clamped(v: &str, lo: i64, hi: i64) -> u8 {
    leading_int(v).clamp(lo, hi) as u8
}

fn scaled(v: &str, lo: f32, hi: f32) -> f32 {
    (leading_float(v) as f32).clamp(lo, hi)
}

fn coded<T: Coded>(v: &str, slot: &mut T) {
    if let Some(value) = T::from_code(leading_int(v)) {
        *slot = value;
    }
}

fn pdf_version(v: &str) -> i64 {
    if v.contains('.') {
        (leading_float(v) * 10.0 + 0.5) as i64
    } else {
        leading_int(v)
    }
}

macro_rules! text_key {
    ($name:literal, $field:ident) => {
        PrefKey {
            name: $name,
            write: |c| c.$field.clone(),
            read: |c, v| c.$field = v.to_string(),
        }
    };
}

macro_rules! bool_key {
    ($name:literal, $field:ident) => {
        PrefKey {
            name: $name,
            write: |c| bit(c.$field),
            read: |c, v| c.$field = flag(v),
        }
    };
}

macro_rules! points_key {
    ($name:literal, $field:ident) => {
        PrefKey {
            name: $name,
            write: |c| c.$field.to_string(),
            read: |c, v| c.$field = leading_int(v) as i32,
        }
    };
}

macro_rules! coded_key {
    ($name:literal, $field:ident) => {
        PrefKey {
            name: $name,
            write: |c| c.$field.code().to_string(),
            read: |c, v| coded(v, &mut c.$field),
        }
    };
}

macro_rules! format_key {
    ($name:literal, $field:ident) => {
        PrefKey {
            name: $name,
            write: |c| c.$field.to_string(),
            read: |c, v| c.$field = HeadFootFormat::parse(v),
        }
    };
}

/// Tracked settings in file order.
static KEYS: &[PrefKey] = &[
    text_key!("TEXTCOLOR", text_color),
    text_key!("BODYCOLOR", body_color),
    text_key!("BODYIMAGE", body_image),
    text_key!("LINKCOLOR", link_color),
    coded_key!("LINKSTYLE", link_style),
    PrefKey {
        name: "BROWSERWIDTH",
        write: |c| c.browser_width.to_string(),
        read: |c, v| {
            let width = leading_float(v);
            if width >= 1.0 {
                c.browser_width = width as f32;
            }
        },
    },
    points_key!("PAGEWIDTH", page_width),
    points_key!("PAGELENGTH", page_length),
    points_key!("PAGELEFT", page_left),
    points_key!("PAGERIGHT", page_right),
    points_key!("PAGETOP", page_top),
    points_key!("PAGEBOTTOM", page_bottom),
    bool_key!("PAGEDUPLEX", page_duplex),
    bool_key!("LANDSCAPE", landscape),
    PrefKey {
        name: "COMPRESSION",
        write: |c| c.compression.to_string(),
        read: |c, v| c.compression = clamped(v, 0, 9),
    },
    bool_key!("OUTPUTCOLOR", output_color),
    bool_key!("TOCNUMBERS", toc_numbers),
    PrefKey {
        name: "TOCLEVELS",
        write: |c| c.toc_levels.to_string(),
        read: |c, v| c.toc_levels = clamped(v, 0, 6),
    },
    PrefKey {
        name: "JPEG",
        write: |c| c.jpeg_quality.to_string(),
        read: |c, v| c.jpeg_quality = clamped(v, 0, 100),
    },
    format_key!("PAGEHEADER", header),
    format_key!("PAGEFOOTER", footer),
    PrefKey {
        name: "NUMBERUP",
        write: |c| c.number_up.to_string(),
        read: |c, v| {
            if let n @ (1 | 2 | 4 | 6 | 9 | 16) = leading_int(v) {
                c.number_up = n as u8;
            }
        },
    },
    format_key!("TOCHEADER", toc_header),
    format_key!("TOCFOOTER", toc_footer),
    text_key!("TOCTITLE", toc_title),
    coded_key!("BODYFONT", body_font),
    coded_key!("HEADINGFONT", heading_font),
    PrefKey {
        name: "FONTSIZE",
        write: |c| c.font_size.to_string(),
        read: |c, v| c.font_size = scaled(v, 4.0, 24.0),
    },
    PrefKey {
        name: "FONTSPACING",
        write: |c| c.font_spacing.to_string(),
        read: |c, v| c.font_spacing = scaled(v, 1.0, 3.0),
    },
    coded_key!("HEADFOOTTYPE", head_foot_type),
    coded_key!("HEADFOOTSTYLE", head_foot_style),
    PrefKey {
        name: "HEADFOOTSIZE",
        write: |c| c.head_foot_size.to_string(),
        read: |c, v| c.head_foot_size = scaled(v, 6.0, 24.0),
    },
    PrefKey {
        name: "PDFVERSION",
        write: |c| c.pdf_version.to_string(),
        read: |c, v| {
            if let n @ 11..=14 = pdf_version(v) {
                c.pdf_version = n as u8;
            }
        },
    },
    PrefKey {
        name: "PSLEVEL",
        write: |c| c.ps_level.to_string(),
        read: |c, v| c.ps_level = clamped(v, 0, 3),
    },
    bool_key!("PSCOMMANDS", ps_commands),
    bool_key!("XRXCOMMENTS", xrx_comments),
    text_key!("CHARSET", charset),
    coded_key!("PAGEMODE", page_mode),
    coded_key!("PAGELAYOUT", page_layout),
    coded_key!("FIRSTPAGE", first_page),
    coded_key!("PAGEEFFECT", page_effect),
    PrefKey {
        name: "PAGEDURATION",
        write: |c| c.page_duration.to_string(),
        read: |c, v| {
            let secs = leading_float(v);
            if secs >= 1.0 {
                c.page_duration = secs as f32;
            }
        },
    },
    PrefKey {
        name: "EFFECTDURATION",
        write: |c| c.effect_duration.to_string(),
        read: |c, v| {
            let secs = leading_float(v);
            if secs >= 0.0 {
                c.effect_duration = secs as f32;
            }
        },
    },
    bool_key!("ENCRYPTION", encryption),
    PrefKey {
        name: "PERMISSIONS",
        write: |c| c.permissions.0.to_string(),
        read: |c, v| c.permissions = Permissions(leading_int(v) as i32),
    },
    text_key!("OWNERPASSWORD", owner_password),
    text_key!("USERPASSWORD", user_password),
    bool_key!("LINKS", links),
    bool_key!("EMBEDFONTS", embed_fonts),
    text_key!("PATH", path),
    text_key!("PROXY", proxy),
    bool_key!("STRICTHTML", strict_html),
];

fn key_named(name: &str) -> Option<&'static PrefKey> {
    let name = if name.eq_ignore_ascii_case("TRUETYPE") {
        "EMBEDFONTS"
    } else {
        name
    };
    KEYS.iter().find(|k| k.name.eq_ignore_ascii_case(name))
}

/// Apply preferences text to `config`. Unknown keys and lines without `=` are skipped.
pub fn load_from_str(config: &mut Config, text: &str) {
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key_named(key.trim()) {
            Some(k) => (k.read)(config, value),
            None => tracing::trace!("Ignoring preference {}", key),
        }
    }
    for (slot, fallback) in [
        (&mut config.header, ".t."),
        (&mut config.footer, "h.1"),
        (&mut config.toc_header, ".t."),
        (&mut config.toc_footer, "..i"),
    ] {
        if slot.is_empty() {
            *slot = HeadFootFormat::parse(fallback);
        }
    }
}

/// Load the preferences file at `path`. A missing file is not an error.
///
/// Returns true when a file was read.
pub fn load(config: &mut Config, path: &Path) -> bool {
    match std::fs::read(path) {
        Ok(bytes) => {
            tracing::debug!("Loading preferences from {}", path.display());
            load_from_str(config, &String::from_utf8_lossy(&bytes));
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!("Unable to read preferences {}: {}", path.display(), e);
            false
        }
    }
}

/// Preferences text for every tracked setting, in file order.
pub fn to_string(config: &Config) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(HEADER);
    out.push('\n');
    for key in KEYS {
        let _ = writeln!(out, "{}={}", key.name, (key.write)(config));
    }
    out
}

pub fn save(config: &Config, path: &Path) -> Result<(), PrefsError> {
    std::fs::write(path, to_string(config)).map_err(|source| PrefsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
