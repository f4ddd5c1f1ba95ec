//! JSONL (JSON Lines) read/write support.
//!
//! Each line is one complete JSON document. Used for export, import and
//! backups of any record type.

use std::io::{self, BufRead, Write};
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error at line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, JsonlError>;

/// Writes each record as a single JSON line.
pub fn write_jsonl<W: Write, T: Serialize>(writer: &mut W, records: &[T]) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        serde_json::to_writer(&mut *writer, record).map_err(|e| JsonlError::Json {
            line: i + 1,
            source: e,
        })?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Lazily parses records from `reader`, skipping blank lines.
pub fn read_jsonl<T: DeserializeOwned, R: BufRead>(reader: R) -> JsonlIter<T, R> {
    JsonlIter {
        reader,
        line_number: 0,
        _marker: PhantomData,
    }
}

pub struct JsonlIter<T, R> {
    reader: R,
    line_number: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T, R> JsonlIter<T, R> {
    /// Line of the record most recently returned, counting from 1.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<T: DeserializeOwned, R: BufRead> Iterator for JsonlIter<T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(trimmed).map_err(|e| JsonlError::Json {
                        line: self.line_number,
                        source: e,
                    }));
                }
                Err(e) => return Some(Err(JsonlError::Io(e))),
            }
        }
    }
}
