use std::io::prelude::*;
use std::path::Path;

use bstr::BString;
use thiserror::Error;

use crate::reader::{self, OpenError};

/// FASTA reading and writing. Reading is used for query sequences,
/// writing both for final output and for the distance engine's
/// scratch files.

/// A named sequence, as read from FASTA or produced by the pipeline.
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash)]
pub struct FastaRecord {
    pub name: BString,
    pub sequence: BString,
}

impl FastaRecord {
    pub fn new(name: &[u8], sequence: &[u8]) -> Self {
        FastaRecord {
            name: BString::from(name),
            sequence: BString::from(sequence),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum FastaError {
    /// A sequence line appeared before any header.
    #[error("sequence data before the first FASTA header")]
    MissingHeader,
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read all records from a FASTA file, which may be gzipped. Record
/// names are truncated at the first whitespace, sequence lines are
/// uppercased and concatenated, and blank lines are skipped.
pub fn read_fasta(path: &Path) -> Result<Vec<FastaRecord>, FastaError> {
    let reader = reader::open_file(path)?;
    read_fasta_from(reader)
}

pub fn read_fasta_from(reader: impl BufRead) -> Result<Vec<FastaRecord>, FastaError> {
    let mut records = Vec::new();
    let mut current: Option<(String, Vec<u8>)> = None;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            if let Some((name, seq)) = current.take() {
                records.push(FastaRecord::new(name.as_bytes(), &seq));
            }
            let name = header.split_whitespace().next().unwrap_or("");
            current = Some((name.to_string(), Vec::new()));
        } else {
            match current.as_mut() {
                Some((_, seq)) => seq.extend(line.to_uppercase().bytes()),
                None => return Err(FastaError::MissingHeader),
            }
        }
    }
    if let Some((name, seq)) = current.take() {
        records.push(FastaRecord::new(name.as_bytes(), &seq));
    }
    Ok(records)
}

/// Write records as FASTA, one sequence line per record.
pub fn write_fasta(
    records: &[FastaRecord],
    mut out: impl Write,
) -> std::io::Result<()> {
    for record in records {
        out.write_all(b">")?;
        out.write_all(&record.name)?;
        out.write_all(b"\n")?;
        out.write_all(&record.sequence)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
