//! Per-run result records and chunk statistics
//!
//! `collect` is a pure function from one run's raw outputs (chunk sequence,
//! elapsed timings, per-query scores) to an immutable [`StrategyResult`].

use std::time::Duration;

/// Best similarity score observed for one query.
///
/// Scores are kept in query-workload order, not arrival order, and duplicate
/// query strings are preserved positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryScore {
    /// Query text
    pub query: String,
    /// Top-1 similarity score, never negative
    pub score: f32,
}

impl QueryScore {
    pub fn new(query: impl Into<String>, score: f32) -> Self {
        Self {
            query: query.into(),
            score: score.max(0.0),
        }
    }
}

/// Immutable record of one strategy's benchmark run.
///
/// A failed run is encoded as the all-zero sentinel (see [`StrategyResult::failure`])
/// rather than a missing report entry, so the reporter never needs to handle
/// absent strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult {
    /// Number of chunks the strategy produced
    pub chunk_count: usize,
    /// Arithmetic mean chunk length in characters (0 when no chunks)
    pub avg_chunk_size: f64,
    /// Shortest chunk length in characters (0 when no chunks)
    pub min_chunk_size: usize,
    /// Longest chunk length in characters (0 when no chunks)
    pub max_chunk_size: usize,
    /// Wall-clock time spent in `chunk()`
    pub chunking_time: Duration,
    /// Wall-clock time spent bulk-inserting chunks into the index
    pub indexing_time: Duration,
    /// Top-1 score per query, in workload order
    pub query_scores: Vec<QueryScore>,
}

impl StrategyResult {
    /// Sentinel for a run that failed or timed out: all-zero fields and an
    /// empty score list.
    pub fn failure() -> Self {
        Self {
            chunk_count: 0,
            avg_chunk_size: 0.0,
            min_chunk_size: 0,
            max_chunk_size: 0,
            chunking_time: Duration::ZERO,
            indexing_time: Duration::ZERO,
            query_scores: Vec::new(),
        }
    }

    /// Whether this result is the failure sentinel.
    ///
    /// A successful run on a degenerate (empty) document still carries one
    /// score entry per query, so an empty score list distinguishes failure
    /// whenever the workload is non-empty.
    pub fn is_failure(&self) -> bool {
        self.chunk_count == 0
            && self.query_scores.is_empty()
            && self.chunking_time.is_zero()
            && self.indexing_time.is_zero()
    }

    /// Mean of this run's query scores; 0 when no scores were recorded.
    pub fn mean_query_score(&self) -> f32 {
        if self.query_scores.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.query_scores.iter().map(|qs| qs.score).sum();
        sum / self.query_scores.len() as f32
    }
}

/// Derive chunk-size statistics from one run's raw outputs.
///
/// Lengths are character-based (`chars().count()`), matching how the
/// document statistics are reported.
pub fn collect(
    chunks: &[String],
    chunking_time: Duration,
    indexing_time: Duration,
    query_scores: Vec<QueryScore>,
) -> StrategyResult {
    if chunks.is_empty() {
        return StrategyResult {
            chunk_count: 0,
            avg_chunk_size: 0.0,
            min_chunk_size: 0,
            max_chunk_size: 0,
            chunking_time,
            indexing_time,
            query_scores,
        };
    }

    let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
    let total: usize = lengths.iter().sum();

    StrategyResult {
        chunk_count: chunks.len(),
        avg_chunk_size: total as f64 / chunks.len() as f64,
        min_chunk_size: lengths.iter().copied().min().unwrap_or(0),
        max_chunk_size: lengths.iter().copied().max().unwrap_or(0),
        chunking_time,
        indexing_time,
        query_scores,
    }
}
