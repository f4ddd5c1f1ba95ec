//! Human-readable sequence numbers (`BATCH-0001`, `ORD-0042`, `FIN-0007`).

use serde::{Deserialize, Serialize};

/// Prefix and zero-padding width for one kind of sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceFormat {
    pub prefix: String,
    pub width: usize,
}

impl SequenceFormat {
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width,
        }
    }

    /// Next number after everything in `existing`.
    pub fn next<'a>(&self, existing: impl IntoIterator<Item = &'a str>) -> String {
        next_sequence(&self.prefix, self.width, existing)
    }
}

pub const DEFAULT_WIDTH: usize = 4;

/// Formats for the three numbered record kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Numbering {
    pub batch: SequenceFormat,
    pub order: SequenceFormat,
    pub reference: SequenceFormat,
}

impl Default for Numbering {
    fn default() -> Self {
        Self {
            batch: SequenceFormat::new("BATCH", DEFAULT_WIDTH),
            order: SequenceFormat::new("ORD", DEFAULT_WIDTH),
            reference: SequenceFormat::new("FIN", DEFAULT_WIDTH),
        }
    }
}

/// Trailing run of ASCII digits in `s`, parsed. `None` when `s` does not
/// end in a digit or the number overflows.
pub fn trailing_number(s: &str) -> Option<u64> {
    let s = s.trim();
    let digits_start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    s[digits_start..].parse().ok()
}

/// `PREFIX-NNNN`, zero-padded to `width`. Wider numbers are not truncated.
pub fn format_sequence(prefix: &str, width: usize, n: u64) -> String {
    format!("{prefix}-{n:0width$}")
}

/// Scans `existing`, takes the highest trailing number (0 when there is
/// none) and formats the one after it.
pub fn next_sequence<'a>(
    prefix: &str,
    width: usize,
    existing: impl IntoIterator<Item = &'a str>,
) -> String {
    let max = existing
        .into_iter()
        .filter_map(trailing_number)
        .max()
        .unwrap_or(0);
    format_sequence(prefix, width, max.saturating_add(1))
}
