//! JSON-lines reader for the labeled historical corpus.
//!
//! One object per line; blank lines are ignored. Rows are parsed leniently
//! (see [`RawAppointment`](noshow_core::RawAppointment)) so that field-level
//! problems surface later as per-row validation failures.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use noshow_core::LabeledAppointment;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus: {0}")]
    Io(#[from] io::Error),

    #[error("corpus line {line} is not a JSON object: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub fn read_corpus(path: &Path) -> Result<Vec<LabeledAppointment>, CorpusError> {
    parse_corpus(BufReader::new(File::open(path)?))
}

pub fn parse_corpus<R: BufRead>(reader: R) -> Result<Vec<LabeledAppointment>, CorpusError> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|source| CorpusError::Malformed {
            line: idx + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}
