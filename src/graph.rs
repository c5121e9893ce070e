pub mod orientation;

pub use self::orientation::*;

use bstr::{BStr, BString, ByteSlice};
use fnv::FnvHashMap;

use crate::overlap::Overlap;
use crate::parser::ParseError;

/// This module defines the segment and link types and the assembly
/// graph built from them.

/// A segment in an assembly graph: a named contig sequence. The
/// sequence is stored verbatim as parsed, already oriented.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Hash)]
pub struct Segment {
    pub name: BString,
    pub sequence: BString,
}

impl Segment {
    pub fn new(name: &[u8], sequence: &[u8]) -> Self {
        Segment {
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

/// A link between two segment ends, annotated with the strand on each
/// side and a gapless overlap length.
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
    pub from_segment: BString,
    pub from_orient: Orientation,
    pub to_segment: BString,
    pub to_orient: Orientation,
    pub overlap: Overlap,
}

impl Link {
    pub fn new(
        from_segment: &[u8],
        from_orient: Orientation,
        to_segment: &[u8],
        to_orient: Orientation,
        overlap: Overlap,
    ) -> Link {
        Link {
            from_segment: from_segment.into(),
            from_orient,
            to_segment: to_segment.into(),
            to_orient,
            overlap,
        }
    }

    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.from_segment == self.to_segment
    }

    #[inline]
    pub fn is_same_strand(&self) -> bool {
        self.from_orient == self.to_orient
    }

    /// The same physical link read from its other end: endpoints
    /// swapped and both strands flipped.
    pub fn reversed(&self) -> Link {
        Link {
            from_segment: self.to_segment.clone(),
            from_orient: self.to_orient.flip(),
            to_segment: self.from_segment.clone(),
            to_orient: self.from_orient.flip(),
            overlap: self.overlap,
        }
    }

    /// A canonical representative for the link, identifying each link
    /// record with its reversal. The overlap is not part of the
    /// identity, so equivalent encodings with differing overlaps
    /// collapse to the first one seen by the caller.
    pub fn canonical(&self) -> Link {
        let rev = self.reversed();
        if self.key() <= rev.key() {
            self.clone()
        } else {
            rev
        }
    }

    #[inline]
    fn key(&self) -> (&BStr, Orientation, &BStr, Orientation) {
        (
            self.from_segment.as_ref(),
            self.from_orient,
            self.to_segment.as_ref(),
            self.to_orient,
        )
    }
}

/// An assembly graph: segments in parse order, indexed by name, plus
/// the links in parse order.
#[derive(Default, Debug, Clone)]
pub struct Graph {
    pub segments: Vec<Segment>,
    pub links: Vec<Link>,
    names: FnvHashMap<BString, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a segment to the graph. Segment names are unique; a repeat
    /// is a structural error.
    pub fn add_segment(&mut self, segment: Segment) -> Result<(), ParseError> {
        if self.names.contains_key(&segment.name) {
            return Err(ParseError::DuplicateSegment(segment.name.to_string()));
        }
        self.names.insert(segment.name.clone(), self.segments.len());
        self.segments.push(segment);
        Ok(())
    }

    /// Add a link to the graph. Endpoints are checked against the
    /// segment set in `validate`, once all records have been parsed.
    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn segment(&self, name: &[u8]) -> Option<&Segment> {
        self.names.get(name.as_bstr()).map(|&ix| &self.segments[ix])
    }

    /// Check that every link endpoint names a known segment. Called
    /// after parsing, so links may precede their segments in the file.
    pub fn validate(&self) -> Result<(), ParseError> {
        for link in self.links.iter() {
            for name in [&link.from_segment, &link.to_segment].iter() {
                if !self.names.contains_key(*name) {
                    return Err(ParseError::UnknownSegment(name.to_string()));
                }
            }
        }
        Ok(())
    }
}
