//! Kilometer positions along a highway.
//!
//! Segments in the programming sheets are written as `"<start> - <end>"`,
//! each side either in kilometer+meter notation (`12+345`) or as a decimal
//! kilometer with `.` or `,` as separator (`12,5`).

use regex::Regex;
use std::sync::LazyLock;

/// `<km>+<meters>`, whitespace tolerated around both parts.
static PLUS_NOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*\+\s*(\d+)\s*$").unwrap());

/// Display and numeric forms of both ends of a segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    /// Zero-padded `KKK+MMM` start, or the raw token when it can't be read.
    pub start_display: Option<String>,
    pub end_display: Option<String>,
    /// Start position in kilometers, absent when unparseable.
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
}

fn plus_parts(token: &str) -> Option<(u64, u64)> {
    let caps = PLUS_NOTATION.captures(token)?;
    let km = caps[1].parse().ok()?;
    let meters = caps[2].parse().ok()?;
    Some((km, meters))
}

fn parse_decimal(token: &str) -> Option<f64> {
    token
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a single position token into kilometers.
///
/// `"12+345"` is `12.345`; `"12,5"` and `"12.5"` are `12.5`. Empty or
/// unreadable tokens yield `None`.
pub fn parse_km_token(token: Option<&str>) -> Option<f64> {
    let token = token?;
    if let Some((km, meters)) = plus_parts(token) {
        return Some(km as f64 + meters as f64 / 1000.0);
    }
    parse_decimal(token)
}

/// Canonical `KKK+MMM` rendering of a token, or the token itself when it is
/// neither plus-notation nor a decimal.
pub fn format_km_display(token: &str) -> String {
    if let Some((km, meters)) = plus_parts(token) {
        return format!("{:03}+{:03}", km, meters);
    }
    match parse_decimal(token) {
        Some(value) => {
            let km = value.trunc();
            let meters = ((value - km) * 1000.0).round_ties_even();
            format!("{:03}+{:03}", km as i64, meters as i64)
        }
        None => token.to_string(),
    }
}

/// Split a `"<start> - <end>"` range into display and numeric forms.
///
/// Exactly one hyphen separates start from end. With no hyphen, or more than
/// one, the whole string is treated as a single point used for both ends.
pub fn split_segment(trecho: Option<&str>) -> Segment {
    let Some(raw) = trecho else {
        return Segment::default();
    };

    let parts: Vec<&str> = raw.split('-').collect();
    let (left, right) = match parts.as_slice() {
        [left, right] => (left.trim(), right.trim()),
        _ => (raw.trim(), raw.trim()),
    };

    Segment {
        start_display: Some(format_km_display(left)),
        end_display: Some(format_km_display(right)),
        start_km: parse_km_token(Some(left)),
        end_km: parse_km_token(Some(right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: Option<f64>, expected: f64) {
        let value = actual.expect("expected a numeric position");
        assert!(
            (value - expected).abs() < 1e-9,
            "expected {expected}, got {value}"
        );
    }

    #[test]
    fn test_parse_plus_notation() {
        approx(parse_km_token(Some("12+345")), 12.345);
        approx(parse_km_token(Some(" 12 + 5 ")), 12.005);
    }

    #[test]
    fn test_parse_decimal_separators() {
        approx(parse_km_token(Some("12,5")), 12.5);
        approx(parse_km_token(Some("12.5")), 12.5);
        approx(parse_km_token(Some("7")), 7.0);
    }

    #[test]
    fn test_parse_absent() {
        assert_eq!(parse_km_token(None), None);
        assert_eq!(parse_km_token(Some("")), None);
        assert_eq!(parse_km_token(Some("abc")), None);
        assert_eq!(parse_km_token(Some("nan")), None);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format_km_display("12+345"), "012+345");
        assert_eq!(format_km_display("1+5"), "001+005");
        assert_eq!(format_km_display("12,5"), "012+500");
        assert_eq!(format_km_display("140"), "140+000");
        assert_eq!(format_km_display("Acesso Norte"), "Acesso Norte");
    }

    #[test]
    fn test_display_is_idempotent() {
        for raw in ["12+345", "0+7", "250+999", "12,5", "3.25"] {
            let display = format_km_display(raw);
            assert_eq!(format_km_display(&display), display);
            let numeric = parse_km_token(Some(&display)).unwrap();
            approx(parse_km_token(Some(&format_km_display(&display))), numeric);
        }
    }

    #[test]
    fn test_split_range() {
        let seg = split_segment(Some("12+345 - 13+000"));
        assert_eq!(seg.start_display.as_deref(), Some("012+345"));
        assert_eq!(seg.end_display.as_deref(), Some("013+000"));
        approx(seg.start_km, 12.345);
        approx(seg.end_km, 13.0);
    }

    #[test]
    fn test_split_single_point() {
        let seg = split_segment(Some("12,5"));
        assert_eq!(seg.start_display, seg.end_display);
        assert_eq!(seg.start_display.as_deref(), Some("012+500"));
        assert_eq!(seg.start_km, seg.end_km);
        approx(seg.start_km, 12.5);
    }

    #[test]
    fn test_split_multiple_hyphens_is_single_point() {
        let seg = split_segment(Some("10+000 - 11+000 - 12+000"));
        assert_eq!(
            seg.start_display.as_deref(),
            Some("10+000 - 11+000 - 12+000")
        );
        assert_eq!(seg.start_display, seg.end_display);
        assert_eq!(seg.start_km, None);
        assert_eq!(seg.end_km, None);
    }

    #[test]
    fn test_split_unreadable_side_passes_through() {
        let seg = split_segment(Some("Praça - 13+000"));
        assert_eq!(seg.start_display.as_deref(), Some("Praça"));
        assert_eq!(seg.start_km, None);
        approx(seg.end_km, 13.0);
    }

    #[test]
    fn test_split_absent() {
        assert_eq!(split_segment(None), Segment::default());
    }
}
