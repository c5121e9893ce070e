use thiserror::Error;

use crate::reader::OpenError;

pub type GraphResult<T> = Result<T, ParseError>;

/// Structural errors found while parsing a GFA file. All of these are
/// fatal: a partial graph is never handed to the pipeline.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A segment name appeared on more than one S record.
    #[error("duplicate segment name `{0}`")]
    DuplicateSegment(String),
    /// A link endpoint names a segment with no S record.
    #[error("link references unknown segment `{0}`")]
    UnknownSegment(String),
    /// A link overlap was something other than a single match
    /// operation.
    #[error("malformed overlap `{0}` (expected a gapless overlap such as 0M or 55M)")]
    MalformedOverlap(String),
    /// An orientation field was something other than + or -.
    #[error("invalid orientation `{0}` (expected + or -)")]
    InvalidOrientation(String),
    /// A segment name contained characters outside the GFA name
    /// alphabet.
    #[error("invalid segment name `{0}`")]
    InvalidName(String),
    /// A required field was absent. Includes the record tag.
    #[error("{0} record is missing required fields")]
    MissingFields(&'static str),
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
