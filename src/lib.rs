//! circontig extracts the circular contigs from an assembly graph in
//! the GFA format: segments whose only link is a same-strand loop
//! back to themselves. Candidates can then be filtered by size and by
//! Mash distance to a set of query sequences.

pub mod circular;
pub mod fasta;
pub mod filter;
pub mod graph;
pub mod mash;
pub mod overlap;
pub mod parser;
pub mod pipeline;
pub mod reader;

pub use crate::circular::{find_circular, CircularContig};
pub use crate::fasta::{read_fasta, write_fasta, FastaRecord};
pub use crate::graph::{Graph, Link, Orientation, Segment};
pub use crate::mash::{DistanceEngine, DistanceRecord, Mash};
pub use crate::overlap::Overlap;
pub use crate::parser::{load_gfa, ParseError};
pub use crate::pipeline::{Options, PipelineError};
