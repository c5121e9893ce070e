use thiserror::Error;
use tracing::info;

use crate::circular::{find_circular, TrimError};
use crate::fasta::FastaRecord;
use crate::filter::{filter_by_query, filter_by_size};
use crate::graph::Graph;
use crate::mash::{DistanceEngine, EngineError};

/// The whole extraction pipeline: circularity, overlap trimming, then
/// the optional size and similarity stages, in that fixed order.

/// Threshold used when a query set is given without an explicit
/// distance cutoff.
pub const DEFAULT_MAX_DISTANCE: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct Options {
    /// Minimum acceptable contig size in bp, after trimming.
    pub min_size: Option<usize>,
    /// Maximum acceptable contig size in bp, after trimming.
    pub max_size: Option<usize>,
    /// Query sequences; the similarity stage runs only when present.
    pub queries: Option<Vec<FastaRecord>>,
    /// Maximum acceptable distance to the closest query.
    pub max_distance: f64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            min_size: None,
            max_size: None,
            queries: None,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("--max must be greater than or equal to --min")]
    MaxBelowMin,
    #[error("--mash must be between 0.0 and 1.0 inclusive")]
    DistanceOutOfRange,
    #[error("query file contains no sequences")]
    EmptyQuerySet,
}

impl Options {
    /// Check the option set before anything runs; a bad configuration
    /// never reaches the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if max < min {
                return Err(ConfigError::MaxBelowMin);
            }
        }
        if !(0.0..=1.0).contains(&self.max_distance) {
            return Err(ConfigError::DistanceOutOfRange);
        }
        if let Some(queries) = &self.queries {
            if queries.is_empty() {
                return Err(ConfigError::EmptyQuerySet);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trim(#[from] TrimError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Run the pipeline over a parsed graph, returning the accepted
/// contigs in the order their segments were discovered. Stages only
/// remove entries; once the working set is empty the remaining stages
/// are skipped.
pub fn run(
    graph: &Graph,
    options: &Options,
    engine: &dyn DistanceEngine,
) -> Result<Vec<FastaRecord>, PipelineError> {
    options.validate()?;

    let circular = find_circular(graph);
    if circular.is_empty() {
        return Ok(Vec::new());
    }

    info!("trimming overlaps");
    let mut contigs = Vec::with_capacity(circular.len());
    for contig in circular.iter() {
        if contig.overlap.is_empty() {
            info!("  {}: no overlap", contig.name);
        } else {
            info!("  {}: trimming {} bp", contig.name, contig.overlap.len());
        }
        contigs.push(contig.trimmed()?);
    }

    if options.min_size.is_some() || options.max_size.is_some() {
        contigs = filter_by_size(contigs, options.min_size, options.max_size);
        if contigs.is_empty() {
            return Ok(contigs);
        }
    }

    if let Some(queries) = &options.queries {
        contigs = filter_by_query(contigs, queries, engine, options.max_distance)?;
    }

    Ok(contigs)
}
