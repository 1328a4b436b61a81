//! String helpers.

/// Turn a manifest key like `semana_atual` into a display label (`Semana Atual`).
///
/// Underscores become spaces; the first letter of every alphabetic run is
/// upper-cased and the rest lower-cased.
pub fn titleize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Render a spreadsheet number the way operators type it: integral values
/// without a fractional part, everything else in shortest form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
