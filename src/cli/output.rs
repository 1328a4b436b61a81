//! Shared terminal output helpers.

use chrono::NaiveDateTime;
use console::style;

use roadworks::session::Session;
use roadworks::utils::format_timestamp;

/// Print the terminal message for a session with nothing to query.
pub fn print_halt(session: &Session, reason: &str) {
    if session.banner.is_some() {
        eprintln!("{} {}", style("✗").red(), reason);
    } else {
        eprintln!("{} {}", style("!").yellow(), reason);
    }
}

pub fn format_optional_timestamp(ts: Option<NaiveDateTime>) -> String {
    ts.as_ref().map(format_timestamp).unwrap_or_else(|| "-".to_string())
}

/// Render rows as left-aligned columns.
pub fn render_table(header: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(header.to_vec())];
    lines.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_pads_columns() {
        let lines = render_table(
            &["Num", "Rodovia"],
            &[
                vec!["4512".to_string(), "SP-150".to_string()],
                vec!["7".to_string(), "SP-1".to_string()],
            ],
        );
        assert_eq!(lines, vec!["Num   Rodovia", "4512  SP-150", "7     SP-1"]);
    }
}
