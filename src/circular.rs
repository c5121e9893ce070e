use bstr::BString;
use fnv::{FnvHashMap, FnvHashSet};
use thiserror::Error;
use tracing::info;

use crate::fasta::FastaRecord;
use crate::graph::{Graph, Link};
use crate::overlap::{trim_overlap, Overlap, OverlapTooLarge};

/// Detection of circular contigs: segments whose only connection is a
/// same-strand link back to themselves.

/// A segment that passed the circularity test, still carrying its
/// self-loop overlap. The original sequence is kept untouched;
/// trimming yields a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct CircularContig {
    pub name: BString,
    pub sequence: BString,
    pub overlap: Overlap,
}

impl CircularContig {
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The contig's sequence with the duplicated overlap bases
    /// removed from the end.
    pub fn trimmed(&self) -> Result<FastaRecord, TrimError> {
        let sequence = trim_overlap(self.sequence.as_ref(), self.overlap)
            .map_err(|source| TrimError {
                name: self.name.to_string(),
                source,
            })?;
        Ok(FastaRecord {
            name: self.name.clone(),
            sequence,
        })
    }
}

/// A self-loop whose overlap is at least the whole contig. Indicates
/// an inconsistent assembly, so the run stops.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot trim contig `{name}`: {source}")]
pub struct TrimError {
    pub name: String,
    #[source]
    pub source: OverlapTooLarge,
}

/// Find every circular contig in the graph. A segment qualifies iff,
/// after identifying each link record with its reversal, exactly one
/// link touches it and that link is a same-strand self-loop.
///
/// The reversal rule is what makes a pair of records like
/// `L c + c + 0M` / `L c - c - 0M` count as one physical edge rather
/// than two. Any genuine second link, to itself or to another
/// segment, disqualifies the segment, as does a lone opposite-strand
/// self-loop. A segment with no links at all is a floating node, not
/// a loop.
///
/// Results are in segment parse order. When duplicate encodings of a
/// self-loop disagree on the overlap, the first-parsed record wins.
pub fn find_circular(graph: &Graph) -> Vec<CircularContig> {
    let mut seen: FnvHashSet<Link> = FnvHashSet::default();
    let mut touching: FnvHashMap<&[u8], usize> = FnvHashMap::default();
    let mut self_loops: FnvHashMap<&[u8], Overlap> = FnvHashMap::default();

    for link in graph.links.iter() {
        let mut canon = link.canonical();
        let overlap = canon.overlap;
        // Overlap is excluded from the dedup key so that equivalent
        // encodings with differing overlaps still collapse.
        canon.overlap = Overlap(0);
        if !seen.insert(canon) {
            continue;
        }
        *touching.entry(&link.from_segment).or_insert(0) += 1;
        if !link.is_self_loop() {
            *touching.entry(&link.to_segment).or_insert(0) += 1;
        } else if link.is_same_strand() {
            self_loops.entry(&link.from_segment).or_insert(overlap);
        }
    }

    info!("finding circular contigs");
    let circular: Vec<_> = graph
        .segments
        .iter()
        .filter_map(|segment| {
            let name: &[u8] = segment.name.as_ref();
            if touching.get(name) != Some(&1) {
                return None;
            }
            let overlap = *self_loops.get(name)?;
            Some(CircularContig {
                name: segment.name.clone(),
                sequence: segment.sequence.clone(),
                overlap,
            })
        })
        .collect();

    for contig in circular.iter() {
        info!("  {}: {} bp", contig.name, contig.len());
    }
    if circular.is_empty() {
        info!("  no circular contigs found");
    }
    circular
}
