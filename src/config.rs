//! The resolved configuration of one conversion job.
//!
//! Starts from compiled-in defaults, then is layered on by the preferences file (or the
//! CGI preset), then by command-line flags and book-file options in order of appearance.

use crate::headfoot::HeadFootFormat;
use crate::permissions::Permissions;
use serde::Serialize;
use std::path::PathBuf;

/// Default installation data directory when neither `--datadir` nor `HTMLDOC_DATA` is set.
pub const DEFAULT_DATA_DIR: &str = "/usr/share/htmldoc";

/// Number of `--hfimageN` header/footer image slots.
pub const MAX_HF_IMAGES: usize = 10;

/// Case-insensitive lookup in a keyword table.
pub fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, value)| *value)
}

/// Enumerations persisted as integer codes in the preferences file.
pub trait Coded: Copy + PartialEq + 'static {
    /// Every variant, indexed by its code.
    const VALUES: &'static [Self];

    fn code(self) -> i64 {
        Self::VALUES
            .iter()
            .position(|v| *v == self)
            .map(|p| p as i64)
            .unwrap_or(0)
    }

    fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::VALUES.get(i))
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Typeface {
    Courier,
    Times,
    Helvetica,
    Monospace,
    Serif,
    SansSerif,
    Symbol,
    Dingbats,
}

impl Coded for Typeface {
    const VALUES: &'static [Self] = &[
        Typeface::Courier,
        Typeface::Times,
        Typeface::Helvetica,
        Typeface::Monospace,
        Typeface::Serif,
        Typeface::SansSerif,
        Typeface::Symbol,
        Typeface::Dingbats,
    ];
}

/// Keywords accepted by `--bodyfont`, `--textfont` and `--headingfont`.
pub const TYPEFACE_NAMES: &[(&str, Typeface)] = &[
    ("courier", Typeface::Courier),
    ("times", Typeface::Times),
    ("helvetica", Typeface::Helvetica),
    ("arial", Typeface::Helvetica),
    ("monospace", Typeface::Monospace),
    ("serif", Typeface::Serif),
    ("sans-serif", Typeface::SansSerif),
    ("sans", Typeface::SansSerif),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl Coded for FontStyle {
    const VALUES: &'static [Self] = &[
        FontStyle::Normal,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
    ];
}

/// Keywords accepted by `--headfootfont`.
pub const HEADFOOT_FONT_NAMES: &[(&str, (Typeface, FontStyle))] = &[
    ("courier", (Typeface::Courier, FontStyle::Normal)),
    ("courier-bold", (Typeface::Courier, FontStyle::Bold)),
    ("courier-oblique", (Typeface::Courier, FontStyle::Italic)),
    ("courier-boldoblique", (Typeface::Courier, FontStyle::BoldItalic)),
    ("times", (Typeface::Times, FontStyle::Normal)),
    ("times-roman", (Typeface::Times, FontStyle::Normal)),
    ("times-bold", (Typeface::Times, FontStyle::Bold)),
    ("times-italic", (Typeface::Times, FontStyle::Italic)),
    ("times-bolditalic", (Typeface::Times, FontStyle::BoldItalic)),
    ("helvetica", (Typeface::Helvetica, FontStyle::Normal)),
    ("helvetica-bold", (Typeface::Helvetica, FontStyle::Bold)),
    ("helvetica-oblique", (Typeface::Helvetica, FontStyle::Italic)),
    ("helvetica-boldoblique", (Typeface::Helvetica, FontStyle::BoldItalic)),
    ("monospace", (Typeface::Monospace, FontStyle::Normal)),
    ("monospace-bold", (Typeface::Monospace, FontStyle::Bold)),
    ("monospace-oblique", (Typeface::Monospace, FontStyle::Italic)),
    ("monospace-boldoblique", (Typeface::Monospace, FontStyle::BoldItalic)),
    ("serif", (Typeface::Serif, FontStyle::Normal)),
    ("serif-roman", (Typeface::Serif, FontStyle::Normal)),
    ("serif-bold", (Typeface::Serif, FontStyle::Bold)),
    ("serif-italic", (Typeface::Serif, FontStyle::Italic)),
    ("serif-bolditalic", (Typeface::Serif, FontStyle::BoldItalic)),
    ("sans-serif", (Typeface::SansSerif, FontStyle::Normal)),
    ("sans", (Typeface::SansSerif, FontStyle::Normal)),
    ("sans-serif-bold", (Typeface::SansSerif, FontStyle::Bold)),
    ("sans-bold", (Typeface::SansSerif, FontStyle::Bold)),
    ("sans-serif-oblique", (Typeface::SansSerif, FontStyle::Italic)),
    ("sans-oblique", (Typeface::SansSerif, FontStyle::Italic)),
    ("sans-serif-boldoblique", (Typeface::SansSerif, FontStyle::BoldItalic)),
    ("sans-boldoblique", (Typeface::SansSerif, FontStyle::BoldItalic)),
];

/// Document structure produced by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputType {
    /// Chapters, title page and table of contents.
    Book,
    /// Files flowed one after another without chapter breaks.
    Continuous,
    /// Each file starts on a new page.
    WebPages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStyle {
    Plain,
    Underline,
}

impl Coded for LinkStyle {
    const VALUES: &'static [Self] = &[LinkStyle::Plain, LinkStyle::Underline];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PdfPageMode {
    Document,
    Outline,
    FullScreen,
}

impl Coded for PdfPageMode {
    const VALUES: &'static [Self] = &[
        PdfPageMode::Document,
        PdfPageMode::Outline,
        PdfPageMode::FullScreen,
    ];
}

pub const PDF_PAGE_MODE_NAMES: &[(&str, PdfPageMode)] = &[
    ("document", PdfPageMode::Document),
    ("outline", PdfPageMode::Outline),
    ("fullscreen", PdfPageMode::FullScreen),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PdfPageLayout {
    Single,
    One,
    TwoLeft,
    TwoRight,
}

impl Coded for PdfPageLayout {
    const VALUES: &'static [Self] = &[
        PdfPageLayout::Single,
        PdfPageLayout::One,
        PdfPageLayout::TwoLeft,
        PdfPageLayout::TwoRight,
    ];
}

pub const PDF_PAGE_LAYOUT_NAMES: &[(&str, PdfPageLayout)] = &[
    ("single", PdfPageLayout::Single),
    ("one", PdfPageLayout::One),
    ("twoleft", PdfPageLayout::TwoLeft),
    ("tworight", PdfPageLayout::TwoRight),
];

/// Page shown first when the PDF is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PdfFirstPage {
    Page1,
    Toc,
    Chapter1,
}

impl Coded for PdfFirstPage {
    const VALUES: &'static [Self] = &[
        PdfFirstPage::Page1,
        PdfFirstPage::Toc,
        PdfFirstPage::Chapter1,
    ];
}

pub const PDF_FIRST_PAGE_NAMES: &[(&str, PdfFirstPage)] = &[
    ("p1", PdfFirstPage::Page1),
    ("toc", PdfFirstPage::Toc),
    ("c1", PdfFirstPage::Chapter1),
];

/// Page transition effect for presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PdfEffect {
    None,
    BoxInward,
    BoxOutward,
    Dissolve,
    GlitterDown,
    GlitterDownRight,
    GlitterRight,
    HorizontalBlinds,
    HorizontalSweepInward,
    HorizontalSweepOutward,
    VerticalBlinds,
    VerticalSweepInward,
    VerticalSweepOutward,
    WipeDown,
    WipeLeft,
    WipeRight,
    WipeUp,
}

impl Coded for PdfEffect {
    const VALUES: &'static [Self] = &[
        PdfEffect::None,
        PdfEffect::BoxInward,
        PdfEffect::BoxOutward,
        PdfEffect::Dissolve,
        PdfEffect::GlitterDown,
        PdfEffect::GlitterDownRight,
        PdfEffect::GlitterRight,
        PdfEffect::HorizontalBlinds,
        PdfEffect::HorizontalSweepInward,
        PdfEffect::HorizontalSweepOutward,
        PdfEffect::VerticalBlinds,
        PdfEffect::VerticalSweepInward,
        PdfEffect::VerticalSweepOutward,
        PdfEffect::WipeDown,
        PdfEffect::WipeLeft,
        PdfEffect::WipeRight,
        PdfEffect::WipeUp,
    ];
}

pub const PDF_EFFECT_NAMES: &[(&str, PdfEffect)] = &[
    ("none", PdfEffect::None),
    ("bi", PdfEffect::BoxInward),
    ("bo", PdfEffect::BoxOutward),
    ("d", PdfEffect::Dissolve),
    ("gd", PdfEffect::GlitterDown),
    ("gdr", PdfEffect::GlitterDownRight),
    ("gr", PdfEffect::GlitterRight),
    ("hb", PdfEffect::HorizontalBlinds),
    ("hsi", PdfEffect::HorizontalSweepInward),
    ("hso", PdfEffect::HorizontalSweepOutward),
    ("vb", PdfEffect::VerticalBlinds),
    ("vsi", PdfEffect::VerticalSweepInward),
    ("vso", PdfEffect::VerticalSweepOutward),
    ("wd", PdfEffect::WipeDown),
    ("wl", PdfEffect::WipeLeft),
    ("wr", PdfEffect::WipeRight),
    ("wu", PdfEffect::WipeUp),
];

/// Every setting of a conversion job. Page geometry is in points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    // Output
    /// Output file or directory; empty means standard output.
    pub output_path: String,
    /// `output_path` names a directory (`--outdir`) rather than a file.
    pub output_files: bool,
    pub output_type: OutputType,
    pub output_color: bool,
    /// JPEG quality for images; 0 disables JPEG compression.
    pub jpeg_quality: u8,
    /// Flate compression level; 0 disables compression.
    pub compression: u8,
    /// PostScript language level; 0 when producing PDF.
    pub ps_level: u8,
    /// PDF version times ten (11..=14).
    pub pdf_version: u8,
    pub ps_commands: bool,
    pub xrx_comments: bool,
    pub embed_fonts: bool,
    pub overflow_errors: bool,
    pub strict_html: bool,
    /// Only URLs may be read as inputs.
    pub no_local_files: bool,
    pub verbosity: i32,

    // Page geometry
    pub page_width: i32,
    pub page_length: i32,
    pub page_left: i32,
    pub page_right: i32,
    pub page_top: i32,
    pub page_bottom: i32,
    pub page_duplex: bool,
    pub landscape: bool,
    pub number_up: u8,
    pub pre_indent: i32,

    // Fonts
    pub body_font: Typeface,
    pub heading_font: Typeface,
    pub font_size: f32,
    pub font_spacing: f32,
    pub head_foot_type: Typeface,
    pub head_foot_style: FontStyle,
    pub head_foot_size: f32,
    pub charset: String,

    // Colors, links and images
    pub text_color: String,
    pub body_color: String,
    pub body_image: String,
    pub link_color: String,
    pub link_style: LinkStyle,
    pub links: bool,
    pub logo_image: String,
    pub title_image: String,
    pub letterhead: String,
    pub hf_images: [String; MAX_HF_IMAGES],
    /// Pixel width HTML content is laid out against.
    pub browser_width: f32,

    // Title page and table of contents
    pub title_page: bool,
    pub toc_levels: u8,
    pub toc_numbers: bool,
    pub toc_title: String,
    pub header: HeadFootFormat,
    /// Header for the first page of each chapter.
    pub header1: HeadFootFormat,
    pub footer: HeadFootFormat,
    pub toc_header: HeadFootFormat,
    pub toc_footer: HeadFootFormat,

    // PDF viewer and security
    pub page_mode: PdfPageMode,
    pub page_layout: PdfPageLayout,
    pub first_page: PdfFirstPage,
    pub page_effect: PdfEffect,
    pub page_duration: f32,
    pub effect_duration: f32,
    pub encryption: bool,
    pub permissions: Permissions,
    pub owner_password: String,
    pub user_password: String,

    // Inputs
    /// Search path: directories or URLs separated by `;`.
    pub path: String,
    pub proxy: String,
    pub cookies: String,
    pub referer: String,
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: String::new(),
            output_files: false,
            output_type: OutputType::Book,
            output_color: true,
            jpeg_quality: 0,
            compression: 1,
            ps_level: 2,
            pdf_version: 14,
            ps_commands: false,
            xrx_comments: false,
            embed_fonts: false,
            overflow_errors: false,
            strict_html: false,
            no_local_files: false,
            verbosity: 0,

            page_width: 595,
            page_length: 792,
            page_left: 72,
            page_right: 36,
            page_top: 36,
            page_bottom: 36,
            page_duplex: false,
            landscape: false,
            number_up: 1,
            pre_indent: 0,

            body_font: Typeface::Times,
            heading_font: Typeface::Helvetica,
            font_size: 11.0,
            font_spacing: 1.2,
            head_foot_type: Typeface::Helvetica,
            head_foot_style: FontStyle::Normal,
            head_foot_size: 11.0,
            charset: "iso-8859-1".to_string(),

            text_color: String::new(),
            body_color: String::new(),
            body_image: String::new(),
            link_color: String::new(),
            link_style: LinkStyle::Underline,
            links: true,
            logo_image: String::new(),
            title_image: String::new(),
            letterhead: String::new(),
            hf_images: Default::default(),
            browser_width: 680.0,

            title_page: true,
            toc_levels: 3,
            toc_numbers: false,
            toc_title: "Table of Contents".to_string(),
            header: HeadFootFormat::parse(".t."),
            header1: HeadFootFormat::default(),
            footer: HeadFootFormat::parse("h.1"),
            toc_header: HeadFootFormat::parse(".t."),
            toc_footer: HeadFootFormat::parse("..i"),

            page_mode: PdfPageMode::Outline,
            page_layout: PdfPageLayout::Single,
            first_page: PdfFirstPage::Page1,
            page_effect: PdfEffect::None,
            page_duration: 10.0,
            effect_duration: 1.0,
            encryption: false,
            permissions: Permissions::default(),
            owner_password: String::new(),
            user_password: String::new(),

            path: String::new(),
            proxy: String::new(),
            cookies: String::new(),
            referer: String::new(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Config {
    /// Apply a `--permissions` list; any result other than "all" turns encryption on.
    pub fn apply_permissions(&mut self, list: &str) {
        if list.is_empty() {
            return;
        }
        self.permissions.apply(list);
        if !self.permissions.is_all() {
            self.encryption = true;
        }
    }

    /// Switch to continuous or web-page output, which have no TOC or title page.
    pub fn set_unchaptered(&mut self, output_type: OutputType) {
        self.toc_levels = 0;
        self.title_page = false;
        self.output_type = output_type;
        self.page_mode = PdfPageMode::Document;
        self.first_page = PdfFirstPage::Page1;
    }
}
