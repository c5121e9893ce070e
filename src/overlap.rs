use nom::bytes::complete::tag;
use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map_res};
use nom::sequence::terminated;
use nom::IResult;

use bstr::{BStr, BString};
use thiserror::Error;

/// The overlap annotation on a link: the number of bases aligned with
/// no insertions or deletions. Assembly self-overlaps are gapless, so
/// a single match operation is the whole grammar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Overlap(pub usize);

impl Overlap {
    fn parser(i: &[u8]) -> IResult<&[u8], Overlap> {
        map_res(terminated(digit1, tag("M")), |bs: &[u8]| {
            let s = unsafe { std::str::from_utf8_unchecked(bs) };
            s.parse::<usize>().map(Overlap)
        })(i)
    }

    /// Parse an overlap descriptor from an ASCII byte slice, e.g.
    /// `0M` or `55M`. Descriptors with any other operation (`2M1D4M`)
    /// or an unknown overlap (`*`) produce None.
    pub fn from_bytestring(i: &[u8]) -> Option<Self> {
        all_consuming(Self::parser)(i).ok().map(|(_, ov)| ov)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Overlap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}M", self.0)
    }
}

/// The overlap on a self-loop covered the whole contig, which no
/// consistent assembly produces.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("overlap of {overlap} covers all {length} bp of the contig")]
pub struct OverlapTooLarge {
    pub overlap: Overlap,
    pub length: usize,
}

/// Remove the duplicated bases from the end of a circular contig's
/// sequence. The stored sequence is already oriented, so the trim is
/// always taken from the end, whatever the self-loop's strand.
pub fn trim_overlap(seq: &BStr, overlap: Overlap) -> Result<BString, OverlapTooLarge> {
    let bytes: &[u8] = seq.as_ref();
    if overlap.is_empty() {
        return Ok(bytes.into());
    }
    if overlap.len() >= bytes.len() {
        return Err(OverlapTooLarge {
            overlap,
            length: bytes.len(),
        });
    }
    Ok(bytes[..bytes.len() - overlap.len()].into())
}
