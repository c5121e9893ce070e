use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;

/// Opening of possibly-compressed input files. Compression is sniffed
/// from the leading magic bytes rather than the file extension.

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("cannot read {0} format - use gzip instead")]
    UnsupportedCompression(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
    Bzip2,
    Zip,
}

/// Guess the compression (if any) on a file from its first few bytes.
pub fn compression_type(path: &Path) -> Result<Compression, OpenError> {
    let mut start = Vec::with_capacity(4);
    File::open(path)?.take(4).read_to_end(&mut start)?;
    let compression = match start.as_slice() {
        [0x1f, 0x8b, ..] => Compression::Gzip,
        [0x42, 0x5a, 0x68, ..] => Compression::Bzip2,
        [0x50, 0x4b, 0x03, 0x04] => Compression::Zip,
        _ => Compression::Plain,
    };
    Ok(compression)
}

/// Open a text input file, transparently decompressing gzip. bzip2
/// and zip inputs are recognized and rejected.
pub fn open_file(path: &Path) -> Result<Box<dyn BufRead>, OpenError> {
    let reader: Box<dyn BufRead> = match compression_type(path)? {
        Compression::Plain => Box::new(BufReader::new(File::open(path)?)),
        Compression::Gzip => {
            Box::new(BufReader::new(GzDecoder::new(File::open(path)?)))
        }
        Compression::Bzip2 => {
            return Err(OpenError::UnsupportedCompression("bzip2"))
        }
        Compression::Zip => return Err(OpenError::UnsupportedCompression("zip")),
    };
    Ok(reader)
}
