use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::Command;

use bstr::BString;
use thiserror::Error;
use tracing::debug;

use crate::fasta::{write_fasta, FastaRecord};

/// The external sequence-distance engine, behind a trait so tests can
/// stub it out. The concrete implementation shells out to `mash`.

/// One pairwise comparison from the engine: 0.0 means identical,
/// larger means less similar.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRecord {
    pub query: BString,
    pub target: BString,
    pub distance: f64,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to run `{command}` - is it installed and on PATH?")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` did not run successfully:\n{stderr}")]
    Failed { command: String, stderr: String },
    #[error("could not parse distance output line `{0}`")]
    BadRecord(String),
    #[error("distance engine produced no comparisons")]
    EmptyOutput,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Computes all pairwise distances between a query set and a
/// candidate set in a single invocation.
pub trait DistanceEngine {
    fn pairwise_distances(
        &self,
        queries: &[FastaRecord],
        targets: &[FastaRecord],
    ) -> Result<Vec<DistanceRecord>, EngineError>;
}

/// `mash dist -i`: every sequence in the first file sketched and
/// compared against every sequence in the second.
#[derive(Debug, Clone)]
pub struct Mash {
    pub binary: PathBuf,
}

impl Default for Mash {
    fn default() -> Self {
        Mash {
            binary: PathBuf::from("mash"),
        }
    }
}

impl DistanceEngine for Mash {
    fn pairwise_distances(
        &self,
        queries: &[FastaRecord],
        targets: &[FastaRecord],
    ) -> Result<Vec<DistanceRecord>, EngineError> {
        let dir = tempfile::tempdir()?;
        let query_fasta = dir.path().join("query.fasta");
        let target_fasta = dir.path().join("contig.fasta");
        write_fasta(queries, BufWriter::new(File::create(&query_fasta)?))?;
        write_fasta(targets, BufWriter::new(File::create(&target_fasta)?))?;

        let command = format!("{} dist -i", self.binary.display());
        debug!("running {}", command);
        let output = Command::new(&self.binary)
            .arg("dist")
            .arg("-i")
            .arg(&query_fasta)
            .arg(&target_fasta)
            .output()
            .map_err(|source| EngineError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(EngineError::Failed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let records = parse_dist_output(&String::from_utf8_lossy(&output.stdout))?;
        if records.is_empty() && !queries.is_empty() && !targets.is_empty() {
            return Err(EngineError::EmptyOutput);
        }
        Ok(records)
    }
}

/// Parse `mash dist` tabular output. Each row is reference ID, query
/// ID, distance, then auxiliary fields (p-value, shared hashes) that
/// are ignored. The reference file holds our queries, so the first
/// column is the query name and the second the candidate name.
pub fn parse_dist_output(output: &str) -> Result<Vec<DistanceRecord>, EngineError> {
    let mut records = Vec::new();
    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<_> = line.split('\t').collect();
        let record = match fields.as_slice() {
            [query, target, distance, ..] => {
                let distance: f64 = distance
                    .parse()
                    .map_err(|_| EngineError::BadRecord(line.to_string()))?;
                if !(0.0..=1.0).contains(&distance) {
                    return Err(EngineError::BadRecord(line.to_string()));
                }
                DistanceRecord {
                    query: BString::from(*query),
                    target: BString::from(*target),
                    distance,
                }
            }
            _ => return Err(EngineError::BadRecord(line.to_string())),
        };
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dist_rows() {
        let output = "q1\tc1\t0\t0\t1000/1000\nq1\tc2\t0.25\t1e-10\t12/1000\n";
        let records = parse_dist_output(output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].query, BString::from("q1"));
        assert_eq!(records[0].target, BString::from("c1"));
        assert_eq!(records[0].distance, 0.0);
        assert_eq!(records[1].distance, 0.25);
    }

    #[test]
    fn empty_output_parses_to_no_records() {
        assert!(parse_dist_output("").unwrap().is_empty());
    }

    #[test]
    fn unparseable_distance_is_fatal() {
        let output = "q1\tc1\tnot-a-number\t0\t1/1000\n";
        assert!(matches!(
            parse_dist_output(output),
            Err(EngineError::BadRecord(_))
        ));
    }

    #[test]
    fn out_of_range_distance_is_fatal() {
        let output = "q1\tc1\t1.5\t0\t1/1000\n";
        assert!(matches!(
            parse_dist_output(output),
            Err(EngineError::BadRecord(_))
        ));
    }

    #[test]
    fn truncated_row_is_fatal() {
        let output = "q1\tc1\n";
        assert!(matches!(
            parse_dist_output(output),
            Err(EngineError::BadRecord(_))
        ));
    }

    #[test]
    fn missing_engine_binary_reports_spawn_error() {
        let mash = Mash {
            binary: PathBuf::from("definitely-not-a-real-binary"),
        };
        let queries = vec![FastaRecord::new(b"q", b"ACGT")];
        let targets = vec![FastaRecord::new(b"c", b"ACGT")];
        assert!(matches!(
            mash.pairwise_distances(&queries, &targets),
            Err(EngineError::Spawn { .. })
        ));
    }
}
