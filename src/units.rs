//! Small textual encodings: lenient numbers, lengths with unit suffixes, and page sizes.

/// Points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Parse the longest leading decimal number in `s`, the way C `strtod` does.
///
/// Leading whitespace is skipped. Returns 0.0 when no number is present.
pub fn leading_float(s: &str) -> f64 {
    let (value, _) = split_leading_float(s);
    value
}

/// Parse the longest leading integer in `s`, the way C `atoi` does. Returns 0 when absent.
pub fn leading_int(s: &str) -> i64 {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }
    t[..end].parse().unwrap_or(0)
}

/// Split `s` into its leading number and the remaining text.
fn split_leading_float(s: &str) -> (f64, &str) {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mantissa_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    let mantissa = &t[mantissa_start..end];
    if mantissa.is_empty() || mantissa == "." {
        return (0.0, s);
    }
    // Exponent only counts when it is followed by at least one digit.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    let value = t[..end].parse().unwrap_or(0.0);
    (value, &t[end..])
}

/// Scale factor from a unit suffix to points. Unknown or empty suffixes are points.
fn unit_scale(unit: &str) -> f64 {
    match unit.trim().to_ascii_lowercase().as_str() {
        "in" => POINTS_PER_INCH,
        "cm" => POINTS_PER_INCH / 2.54,
        "mm" => POINTS_PER_INCH / 25.4,
        _ => 1.0,
    }
}

/// Convert a length such as `1in`, `2.5cm`, `10mm` or `36` into whole points.
pub fn parse_measurement(s: &str) -> i32 {
    let (value, rest) = split_leading_float(s);
    (value * unit_scale(rest)) as i32
}

/// Named page sizes in points (width, length).
const PAGE_SIZES: &[(&str, i32, i32)] = &[
    ("letter", 612, 792),
    ("legal", 612, 1008),
    ("tabloid", 792, 1224),
    ("a4", 595, 842),
    ("a3", 842, 1191),
    ("universal", 595, 792),
];

/// Resolve a page size name or a `WxH[unit]` specification to points.
///
/// Returns `None` when the text matches neither form.
pub fn parse_page_size(s: &str) -> Option<(i32, i32)> {
    let name = s.trim();
    if let Some(&(_, width, length)) = PAGE_SIZES
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
    {
        return Some((width, length));
    }
    let (width_text, length_text) = name.split_once(['x', 'X'])?;
    let (width, width_rest) = split_leading_float(width_text);
    if !width_rest.trim().is_empty() || width <= 0.0 {
        return None;
    }
    let (length, unit) = split_leading_float(length_text);
    if length <= 0.0 {
        return None;
    }
    let scale = unit_scale(unit);
    Some(((width * scale) as i32, (length * scale) as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_float_reads_prefix() {
        assert_eq!(leading_float("12.5pt"), 12.5);
        assert_eq!(leading_float("  -3"), -3.0);
        assert_eq!(leading_float("1e2x"), 100.0);
        assert_eq!(leading_float("1ex"), 1.0);
    }

    #[test]
    fn leading_float_garbage_is_zero() {
        assert_eq!(leading_float("abc"), 0.0);
        assert_eq!(leading_float(""), 0.0);
        assert_eq!(leading_float("."), 0.0);
    }

    #[test]
    fn leading_int_reads_prefix() {
        assert_eq!(leading_int("42abc"), 42);
        assert_eq!(leading_int(" -7"), -7);
        assert_eq!(leading_int("x1"), 0);
    }

    #[test]
    fn measurement_units() {
        assert_eq!(parse_measurement("1in"), 72);
        assert_eq!(parse_measurement("2.54cm"), 72);
        assert_eq!(parse_measurement("25.4mm"), 72);
        assert_eq!(parse_measurement("36"), 36);
        assert_eq!(parse_measurement("36pt"), 36);
        assert_eq!(parse_measurement("0.5 IN"), 36);
    }

    #[test]
    fn page_size_names_are_case_insensitive() {
        assert_eq!(parse_page_size("Letter"), Some((612, 792)));
        assert_eq!(parse_page_size("A4"), Some((595, 842)));
        assert_eq!(parse_page_size("universal"), Some((595, 792)));
    }

    #[test]
    fn page_size_dimensions_with_units() {
        assert_eq!(parse_page_size("8.5x11in"), Some((612, 792)));
        assert_eq!(parse_page_size("100x200"), Some((100, 200)));
        assert_eq!(parse_page_size("210x297mm"), Some((595, 841)));
    }

    #[test]
    fn page_size_unknown() {
        assert_eq!(parse_page_size("folio"), None);
        assert_eq!(parse_page_size("x11"), None);
    }
}
