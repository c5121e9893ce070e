pub mod error;

pub use self::error::*;

use std::io::prelude::*;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::graph::{Graph, Link, Orientation, Segment};
use crate::overlap::Overlap;
use crate::reader;

/// Parsing of GFA records into a [`Graph`]. Only S and L records
/// carry information the graph model needs; every other tag (H, C, P,
/// and any extension) is skipped, so files in extended GFA dialects
/// still load.

/// A single parsed GFA line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Segment(Segment),
    Link(Link),
    /// A record kind the graph model does not track.
    Skipped,
}

/// Parse one GFA line. Unknown record tags and blank lines are
/// `Line::Skipped`; malformed S or L records are errors.
pub fn parse_line(line: &str) -> GraphResult<Line> {
    let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
    let fields: Vec<_> = line.split('\t').collect();
    match fields[0] {
        "S" => parse_segment(&fields[1..]).map(Line::Segment),
        "L" => parse_link(&fields[1..]).map(Line::Link),
        _ => Ok(Line::Skipped),
    }
}

fn parse_segment(fields: &[&str]) -> GraphResult<Segment> {
    if fields.len() < 2 {
        return Err(ParseError::MissingFields("S"));
    }
    let name = parse_name(fields[0])?;
    // Sequences are accepted verbatim; IUPAC ambiguity codes and
    // mixed case are all legal contig content.
    Ok(Segment::new(name.as_bytes(), fields[1].as_bytes()))
}

fn parse_link(fields: &[&str]) -> GraphResult<Link> {
    if fields.len() < 5 {
        return Err(ParseError::MissingFields("L"));
    }
    let from_segment = parse_name(fields[0])?;
    let from_orient = parse_orient(fields[1])?;
    let to_segment = parse_name(fields[2])?;
    let to_orient = parse_orient(fields[3])?;
    let overlap = parse_overlap(fields[4])?;
    Ok(Link::new(
        from_segment.as_bytes(),
        from_orient,
        to_segment.as_bytes(),
        to_orient,
        overlap,
    ))
}

fn parse_name<'a>(input: &'a str) -> GraphResult<&'a str> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[!-)+-<>-~][!-~]*$").unwrap();
    }
    if RE.is_match(input) {
        Ok(input)
    } else {
        Err(ParseError::InvalidName(input.to_string()))
    }
}

fn parse_orient(input: &str) -> GraphResult<Orientation> {
    Orientation::parse_error(Orientation::from_bytes_plus_minus(input), input)
}

fn parse_overlap(input: &str) -> GraphResult<Overlap> {
    Overlap::from_bytestring(input.as_bytes())
        .ok_or_else(|| ParseError::MalformedOverlap(input.to_string()))
}

/// Build a graph from an iterator of GFA lines. Fails on the first
/// structural error; the returned graph is always complete and
/// validated.
pub fn parse_gfa_lines<I, S>(lines: I) -> GraphResult<Graph>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut graph = Graph::new();
    for line in lines {
        match parse_line(line.as_ref())? {
            Line::Segment(s) => graph.add_segment(s)?,
            Line::Link(l) => graph.add_link(l),
            Line::Skipped => (),
        }
    }
    graph.validate()?;
    Ok(graph)
}

/// Load a graph from a GFA file, which may be gzipped.
pub fn load_gfa(path: &Path) -> GraphResult<Graph> {
    info!("loading {}", path.display());
    let reader = reader::open_file(path)?;
    let mut graph = Graph::new();
    for line in reader.lines() {
        match parse_line(&line?)? {
            Line::Segment(s) => graph.add_segment(s)?,
            Line::Link(l) => graph.add_link(l),
            Line::Skipped => (),
        }
    }
    graph.validate()?;
    info!(
        "  {} segment{}, {} link{}",
        graph.segments.len(),
        if graph.segments.len() == 1 { "" } else { "s" },
        graph.links.len(),
        if graph.links.len() == 1 { "" } else { "s" },
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_segment() {
        let line = "S\t11\tACCTT";
        let parsed = parse_line(line).unwrap();
        assert_eq!(parsed, Line::Segment(Segment::new(b"11", b"ACCTT")));
    }

    #[test]
    fn segment_optional_fields_are_ignored() {
        let line = "S\t11\tACCTT\tLN:i:5\tRC:i:123";
        let parsed = parse_line(line).unwrap();
        assert_eq!(parsed, Line::Segment(Segment::new(b"11", b"ACCTT")));
    }

    #[test]
    fn can_parse_link() {
        let line = "11\t+\t12\t-\t4M";
        let fields: Vec<_> = line.split('\t').collect();
        let parsed = parse_link(&fields).unwrap();
        let link = Link::new(
            b"11",
            Orientation::Forward,
            b"12",
            Orientation::Backward,
            Overlap(4),
        );
        assert_eq!(parsed, link);
    }

    #[test]
    fn unknown_tags_are_skipped() {
        assert_eq!(parse_line("H\tVN:Z:1.0").unwrap(), Line::Skipped);
        assert_eq!(parse_line("P\tx\t1+,2-\t4M").unwrap(), Line::Skipped);
        assert_eq!(parse_line("C\t1\t+\t2\t+\t110\t100M").unwrap(), Line::Skipped);
        assert_eq!(parse_line("# comment").unwrap(), Line::Skipped);
        assert_eq!(parse_line("").unwrap(), Line::Skipped);
    }

    #[test]
    fn bad_overlap_is_fatal() {
        let err = parse_line("L\t1\t+\t1\t+\t2M1D4M").unwrap_err();
        assert!(matches!(err, ParseError::MalformedOverlap(ov) if ov == "2M1D4M"));
        let err = parse_line("L\t1\t+\t1\t+\t*").unwrap_err();
        assert!(matches!(err, ParseError::MalformedOverlap(ov) if ov == "*"));
    }

    #[test]
    fn bad_orientation_is_fatal() {
        let err = parse_line("L\t1\t+\t1\t?\t0M").unwrap_err();
        assert!(matches!(err, ParseError::InvalidOrientation(o) if o == "?"));
    }

    #[test]
    fn truncated_records_are_fatal() {
        assert!(matches!(
            parse_line("S\t11").unwrap_err(),
            ParseError::MissingFields("S")
        ));
        assert!(matches!(
            parse_line("L\t1\t+\t2\t+").unwrap_err(),
            ParseError::MissingFields("L")
        ));
    }

    #[test]
    fn can_parse_lines() {
        let input = "\
H\tVN:Z:1.0
S\t1\tCAAATAAG
S\t2\tACGT
L\t1\t+\t2\t+\t0M
L\t2\t+\t2\t+\t0M
P\tx\t1+,2+\t0M";
        let graph = parse_gfa_lines(input.lines()).unwrap();
        assert_eq!(graph.segments.len(), 2);
        assert_eq!(graph.links.len(), 2);
        assert_eq!(
            graph.segment(b"1"),
            Some(&Segment::new(b"1", b"CAAATAAG"))
        );
    }

    #[test]
    fn duplicate_segment_is_fatal() {
        let input = vec!["S\t1\tACGT", "S\t1\tTTTT"];
        let err = parse_gfa_lines(input).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateSegment(_)));
    }

    #[test]
    fn dangling_link_is_fatal() {
        let input = vec!["S\t1\tACGT", "L\t1\t+\t9\t+\t0M"];
        let err = parse_gfa_lines(input).unwrap_err();
        assert!(matches!(err, ParseError::UnknownSegment(name) if name == "9"));
    }

    #[test]
    fn can_load_gfa_file() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.gfa");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "S\t1\tACGTACGT").unwrap();
        writeln!(file, "L\t1\t+\t1\t+\t0M").unwrap();
        drop(file);

        let graph = load_gfa(&path).unwrap();
        assert_eq!(graph.segments.len(), 1);
        assert_eq!(graph.links.len(), 1);
    }
}
