use bstr::BString;
use fnv::FnvHashMap;
use tracing::{info, warn};

use crate::fasta::FastaRecord;
use crate::mash::{DistanceEngine, EngineError};

/// The size and similarity filter stages. Both only ever remove
/// records; order is preserved.

/// Keep contigs whose length is within the inclusive bounds. Either
/// bound may be absent, leaving that side unbounded.
pub fn filter_by_size(
    contigs: Vec<FastaRecord>,
    min_size: Option<usize>,
    max_size: Option<usize>,
) -> Vec<FastaRecord> {
    info!("filtering by size");
    let contigs: Vec<_> = contigs
        .into_iter()
        .filter(|c| min_size.map_or(true, |min| c.len() >= min))
        .filter(|c| max_size.map_or(true, |max| c.len() <= max))
        .collect();
    for contig in contigs.iter() {
        info!("  {}: {} bp", contig.name, contig.len());
    }
    if contigs.is_empty() {
        info!("  no contigs satisfy size parameters");
    }
    contigs
}

/// Keep contigs within `max_distance` of at least one query sequence.
/// The engine is invoked once for the whole batch; a contig the
/// engine returned no row for fails the filter.
pub fn filter_by_query(
    contigs: Vec<FastaRecord>,
    queries: &[FastaRecord],
    engine: &dyn DistanceEngine,
    max_distance: f64,
) -> Result<Vec<FastaRecord>, EngineError> {
    info!("filtering by query sequence(s)");
    let records = engine.pairwise_distances(queries, &contigs)?;

    // Reduce to the closest query per contig.
    let mut closest: FnvHashMap<&[u8], (f64, &BString)> = FnvHashMap::default();
    for record in records.iter() {
        let entry = closest
            .entry(record.target.as_ref())
            .or_insert((record.distance, &record.query));
        if record.distance < entry.0 {
            *entry = (record.distance, &record.query);
        }
    }

    let mut matching = Vec::new();
    for contig in contigs.into_iter() {
        let name: &[u8] = contig.name.as_ref();
        match closest.get(name) {
            Some(&(distance, query)) if distance <= max_distance => {
                info!("  {}: {:.5} distance to {}", contig.name, distance, query);
                matching.push(contig);
            }
            Some(_) => (),
            // No comparison row at all: dropped, not passed through.
            None => warn!("  {}: no distance to any query", contig.name),
        }
    }
    if matching.is_empty() {
        info!("  no contigs match query sequence(s)");
    }
    Ok(matching)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mash::DistanceRecord;

    fn contigs(lengths: &[usize]) -> Vec<FastaRecord> {
        lengths
            .iter()
            .enumerate()
            .map(|(ix, &len)| {
                FastaRecord::new(format!("c{}", ix + 1).as_bytes(), &vec![b'A'; len])
            })
            .collect()
    }

    fn lengths(contigs: &[FastaRecord]) -> Vec<usize> {
        contigs.iter().map(|c| c.len()).collect()
    }

    #[test]
    fn no_bounds_keeps_everything() {
        let filtered = filter_by_size(contigs(&[6, 9, 12]), None, None);
        assert_eq!(lengths(&filtered), vec![6, 9, 12]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let filtered = filter_by_size(contigs(&[7, 8, 9, 10, 11]), Some(8), Some(10));
        assert_eq!(lengths(&filtered), vec![8, 9, 10]);

        let filtered = filter_by_size(contigs(&[8, 9, 10]), Some(9), Some(9));
        assert_eq!(lengths(&filtered), vec![9]);
    }

    #[test]
    fn bounds_are_independent() {
        let filtered = filter_by_size(contigs(&[6, 9, 12]), None, Some(9));
        assert_eq!(lengths(&filtered), vec![6, 9]);

        let filtered = filter_by_size(contigs(&[6, 9, 12]), Some(9), None);
        assert_eq!(lengths(&filtered), vec![9, 12]);
    }

    #[test]
    fn size_scenario() {
        let filtered = filter_by_size(
            contigs(&[35, 9, 5, 1500, 8000, 50000]),
            Some(1000),
            Some(10000),
        );
        assert_eq!(lengths(&filtered), vec![1500, 8000]);
    }

    /// A canned engine for tests: returns a fixed set of rows.
    struct StubEngine(Vec<DistanceRecord>);

    impl DistanceEngine for StubEngine {
        fn pairwise_distances(
            &self,
            _queries: &[FastaRecord],
            _targets: &[FastaRecord],
        ) -> Result<Vec<DistanceRecord>, EngineError> {
            Ok(self.0.clone())
        }
    }

    fn dist(query: &str, target: &str, distance: f64) -> DistanceRecord {
        DistanceRecord {
            query: query.into(),
            target: target.into(),
            distance,
        }
    }

    #[test]
    fn minimum_distance_over_all_queries_decides() {
        let engine = StubEngine(vec![
            dist("q1", "c1", 0.5),
            dist("q2", "c1", 0.05),
            dist("q1", "c2", 0.5),
            dist("q2", "c2", 0.4),
        ]);
        let queries =
            vec![FastaRecord::new(b"q1", b"ACGT"), FastaRecord::new(b"q2", b"TTTT")];
        let kept =
            filter_by_query(contigs(&[10, 10]), &queries, &engine, 0.1).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, BString::from("c1"));
    }

    #[test]
    fn distance_equal_to_threshold_is_kept() {
        let engine = StubEngine(vec![dist("q1", "c1", 0.1), dist("q1", "c2", 0.100001)]);
        let queries = vec![FastaRecord::new(b"q1", b"ACGT")];
        let kept =
            filter_by_query(contigs(&[10, 10]), &queries, &engine, 0.1).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, BString::from("c1"));
    }

    #[test]
    fn contig_without_any_row_is_dropped() {
        let engine = StubEngine(vec![dist("q1", "c1", 0.0)]);
        let queries = vec![FastaRecord::new(b"q1", b"ACGT")];
        let kept =
            filter_by_query(contigs(&[10, 10]), &queries, &engine, 0.5).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, BString::from("c1"));
    }

    #[test]
    fn engine_failure_propagates() {
        struct FailingEngine;
        impl DistanceEngine for FailingEngine {
            fn pairwise_distances(
                &self,
                _: &[FastaRecord],
                _: &[FastaRecord],
            ) -> Result<Vec<DistanceRecord>, EngineError> {
                Err(EngineError::EmptyOutput)
            }
        }
        let queries = vec![FastaRecord::new(b"q1", b"ACGT")];
        assert!(
            filter_by_query(contigs(&[10]), &queries, &FailingEngine, 0.5).is_err()
        );
    }
}
