//! Output formatting helpers for the `farm` CLI.

use std::io::{self, Write};

use serde::Serialize;

/// Print a value as pretty-printed JSON to stdout.
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // Ignore broken pipe errors (e.g., piped to `head`)
    let _ = writeln!(handle, "{json}");
    Ok(())
}

/// Print a simple table with headers and rows.
///
/// Column widths are computed from the data for alignment. Nothing is
/// printed for an empty table.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = write!(handle, "{}", render_table(headers, rows));
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = String::new();
    for cells in std::iter::once(&header).chain([&separator]).chain(rows) {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Money and quantities, two decimals.
pub fn amount(v: f64) -> String {
    format!("{v:.2}")
}

/// A ratio in `0..=1` as a percentage.
pub fn percent(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_columns_align() {
        let table = render_table(
            &["USERNAME", "ROLE"],
            &[
                vec!["admin".into(), "admin".into()],
                vec!["wanjiru".into(), "worker".into()],
            ],
        );
        assert_eq!(
            table,
            "USERNAME  ROLE\n\
             --------  ------\n\
             admin     admin\n\
             wanjiru   worker\n"
        );
    }

    #[test]
    fn number_formats() {
        assert_eq!(amount(13.5), "13.50");
        assert_eq!(percent(0.125), "12.5%");
    }
}
