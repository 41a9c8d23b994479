//! Three-slot header/footer format strings (`fff`), e.g. `.t.` or `h.1`.

use serde::Serialize;
use std::fmt;

/// Content of one header/footer slot (left, center, right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slot {
    #[default]
    Blank,
    /// `/`: n/N page numbers.
    PageOfPages,
    /// `:`: c/C chapter page numbers.
    ChapterPageOfPages,
    /// `1`
    Arabic,
    /// `a`
    LowerLetters,
    /// `A`
    UpperLetters,
    /// `c`
    ChapterTitle,
    /// `C`
    ChapterPage,
    /// `d`
    Date,
    /// `D`
    DateTime,
    /// `h`
    Heading,
    /// `i`
    LowerRoman,
    /// `I`
    UpperRoman,
    /// `l`
    Logo,
    /// `L`
    Letterhead,
    /// `t`
    Title,
    /// `T`
    Time,
    /// `u`
    Url,
}

const SLOT_CODES: &[(char, Slot)] = &[
    ('.', Slot::Blank),
    ('/', Slot::PageOfPages),
    (':', Slot::ChapterPageOfPages),
    ('1', Slot::Arabic),
    ('a', Slot::LowerLetters),
    ('A', Slot::UpperLetters),
    ('c', Slot::ChapterTitle),
    ('C', Slot::ChapterPage),
    ('d', Slot::Date),
    ('D', Slot::DateTime),
    ('h', Slot::Heading),
    ('i', Slot::LowerRoman),
    ('I', Slot::UpperRoman),
    ('l', Slot::Logo),
    ('L', Slot::Letterhead),
    ('t', Slot::Title),
    ('T', Slot::Time),
    ('u', Slot::Url),
];

impl Slot {
    /// Map a format character; unknown characters are blank.
    pub fn from_code(c: char) -> Slot {
        SLOT_CODES
            .iter()
            .find(|(code, _)| *code == c)
            .map(|(_, slot)| *slot)
            .unwrap_or(Slot::Blank)
    }

    pub fn code(self) -> char {
        SLOT_CODES
            .iter()
            .find(|(_, slot)| *slot == self)
            .map(|(code, _)| *code)
            .unwrap_or('.')
    }
}

/// A parsed `fff` format: left, center and right slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadFootFormat(pub [Slot; 3]);

impl HeadFootFormat {
    /// Parse the first three characters of `s`. Missing characters are blank.
    pub fn parse(s: &str) -> Self {
        let mut slots = [Slot::Blank; 3];
        for (slot, c) in slots.iter_mut().zip(s.chars()) {
            *slot = Slot::from_code(c);
        }
        HeadFootFormat(slots)
    }

    /// True when none of the three slots is set.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|s| *s == Slot::Blank)
    }
}

impl fmt::Display for HeadFootFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.0 {
            write!(f, "{}", slot.code())?;
        }
        Ok(())
    }
}

impl Serialize for HeadFootFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
