//! Benchmark runner
//!
//! Executes the chunk → index → query pipeline for one strategy, then tears
//! the index down. The contract is `run(...) -> StrategyResult`, never an
//! error: any failure or timeout inside the pipeline is logged as a warning
//! and encoded as the sentinel result, so one broken strategy can never
//! abort the comparison.
//!
//! `run_comparison` drives the whole registry — sequentially by default, or
//! with bounded parallelism when `workers > 1`. Each run executes inside its
//! own task, so even a panicking strategy is contained.

use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::backend::{IndexBackend, IndexHandle};
use crate::metrics::{self, QueryScore, StrategyResult};
use crate::report::{ComparisonReport, ReportEntry};
use crate::strategy::{ChunkingStrategy, StrategyRegistry};

/// Runs one strategy's benchmark pipeline against a shared backend.
pub struct BenchmarkRunner {
    backend: Arc<dyn IndexBackend>,
    operation_timeout: Duration,
    run_seq: AtomicU64,
}

impl BenchmarkRunner {
    pub fn new(backend: Arc<dyn IndexBackend>, operation_timeout: Duration) -> Self {
        Self {
            backend,
            operation_timeout,
            run_seq: AtomicU64::new(0),
        }
    }

    /// Benchmark one strategy. Never returns an error: failures yield the
    /// sentinel result and a warning naming the strategy.
    pub async fn run(
        &self,
        name: &str,
        strategy: &dyn ChunkingStrategy,
        document: &str,
        queries: &[String],
    ) -> StrategyResult {
        match self.try_run(name, strategy, document, queries).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(strategy = %name, "strategy failed, recording empty result: {:#}", err);
                StrategyResult::failure()
            }
        }
    }

    async fn try_run(
        &self,
        name: &str,
        strategy: &dyn ChunkingStrategy,
        document: &str,
        queries: &[String],
    ) -> Result<StrategyResult> {
        // Step 1: chunk, timed. Must complete before any index state exists.
        let chunk_start = Instant::now();
        let chunks = timeout(self.operation_timeout, strategy.chunk(document))
            .await
            .map_err(|_| anyhow!("chunking timed out after {:?}", self.operation_timeout))?
            .context("chunking failed")?;
        let chunking_time = chunk_start.elapsed();

        // Step 2: fresh index, identity derived from strategy name + run
        // sequence so retries never collide with an earlier attempt.
        let index_name = self.index_name(name);
        let mut index = self
            .backend
            .create(&index_name)
            .await
            .with_context(|| format!("failed to create index {}", index_name))?;

        // Steps 3-4 run against the handle; teardown happens on both the
        // success and the failure path before the outcome is surfaced.
        let outcome = self
            .populate_and_query(index.as_mut(), &chunks, queries)
            .await;
        if let Err(err) = index.destroy().await {
            tracing::warn!(index = %index_name, "index teardown failed: {:#}", err);
        }
        let (indexing_time, query_scores) = outcome?;

        Ok(metrics::collect(
            &chunks,
            chunking_time,
            indexing_time,
            query_scores,
        ))
    }

    /// Steps 3-4: bulk insert (timed), then the query workload in input
    /// order. Querying never starts before every insert has completed.
    async fn populate_and_query(
        &self,
        index: &mut dyn IndexHandle,
        chunks: &[String],
        queries: &[String],
    ) -> Result<(Duration, Vec<QueryScore>)> {
        let index_start = Instant::now();
        for (i, chunk) in chunks.iter().enumerate() {
            let id = format!("chunk-{}", i);
            timeout(self.operation_timeout, index.insert(&id, chunk))
                .await
                .map_err(|_| anyhow!("insert of {} timed out", id))?
                .with_context(|| format!("insert of {} failed", id))?;
        }
        let indexing_time = index_start.elapsed();

        let mut query_scores = Vec::with_capacity(queries.len());
        for query in queries {
            let hits = timeout(self.operation_timeout, index.search(query, 1))
                .await
                .map_err(|_| anyhow!("search timed out for query {:?}", query))?
                .with_context(|| format!("search failed for query {:?}", query))?;
            let best = hits.first().map(|hit| hit.score).unwrap_or(0.0);
            query_scores.push(QueryScore::new(query.clone(), best));
        }

        Ok((indexing_time, query_scores))
    }

    fn index_name(&self, strategy_name: &str) -> String {
        let seq = self.run_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", sanitize(strategy_name), seq)
    }
}

/// Index names keep only alphanumerics; everything else becomes '-'.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Run one strategy inside its own task so that even a panic is contained
/// and mapped to the sentinel result.
async fn run_isolated(
    runner: Arc<BenchmarkRunner>,
    name: String,
    strategy: Arc<dyn ChunkingStrategy>,
    document: Arc<str>,
    queries: Arc<[String]>,
) -> StrategyResult {
    let task_name = name.clone();
    let task = tokio::spawn(async move {
        runner
            .run(&name, strategy.as_ref(), &document, &queries)
            .await
    });
    match task.await {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(strategy = %task_name, "strategy run aborted: {}", err);
            StrategyResult::failure()
        }
    }
}

/// Execute the full comparison: every registered strategy, one entry per
/// strategy in the final report, registration order preserved.
///
/// `workers <= 1` runs strategies sequentially — one strategy fully
/// completes (chunk, index, query, teardown) before the next begins. Larger
/// values run up to `workers` strategies concurrently; results land in the
/// shared accumulator through a single synchronized write per run, slotted
/// by registration index so ordering semantics are unaffected.
pub async fn run_comparison(
    registry: &StrategyRegistry,
    runner: Arc<BenchmarkRunner>,
    document: &str,
    queries: &[String],
    workers: usize,
) -> ComparisonReport {
    let document: Arc<str> = Arc::from(document);
    let queries: Arc<[String]> = Arc::from(queries.to_vec());

    if workers <= 1 {
        let mut entries = Vec::with_capacity(registry.len());
        for registered in registry.entries() {
            tracing::info!(strategy = %registered.name, "benchmarking");
            let result = run_isolated(
                Arc::clone(&runner),
                registered.name.clone(),
                Arc::clone(&registered.strategy),
                Arc::clone(&document),
                Arc::clone(&queries),
            )
            .await;
            entries.push(ReportEntry {
                name: registered.name.clone(),
                result,
            });
        }
        return ComparisonReport::new(entries);
    }

    // Bounded parallelism: one slot per strategy, written under a single
    // lock per completed run.
    let slots: Arc<tokio::sync::Mutex<Vec<Option<StrategyResult>>>> =
        Arc::new(tokio::sync::Mutex::new(vec![None; registry.len()]));

    futures::stream::iter(registry.entries().iter().enumerate().map(|(idx, registered)| {
        let runner = Arc::clone(&runner);
        let document = Arc::clone(&document);
        let queries = Arc::clone(&queries);
        let slots = Arc::clone(&slots);
        let name = registered.name.clone();
        let strategy = Arc::clone(&registered.strategy);
        async move {
            tracing::info!(strategy = %name, "benchmarking");
            let result = run_isolated(runner, name, strategy, document, queries).await;
            slots.lock().await[idx] = Some(result);
        }
    }))
    .buffer_unordered(workers)
    .collect::<Vec<()>>()
    .await;

    let mut slots = slots.lock().await;
    let entries = registry
        .entries()
        .iter()
        .zip(slots.iter_mut())
        .map(|(registered, slot)| ReportEntry {
            name: registered.name.clone(),
            result: slot.take().unwrap_or_else(StrategyResult::failure),
        })
        .collect();
    ComparisonReport::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{CountingBackend, ScriptedStrategy};

    fn queries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn runner_with(backend: &CountingBackend) -> Arc<BenchmarkRunner> {
        Arc::new(BenchmarkRunner::new(
            backend.shared(),
            Duration::from_secs(5),
        ))
    }

    #[tokio::test]
    async fn successful_run_reports_chunk_stats_and_scores() {
        let backend = CountingBackend::new();
        let runner = runner_with(&backend);
        let strategy = ScriptedStrategy::fixed(&["alpha beta", "gamma"]);

        let result = runner
            .run("s", &strategy, "doc", &queries(&["alpha beta"]))
            .await;

        assert_eq!(result.chunk_count, 2);
        assert_eq!(result.min_chunk_size, 5);
        assert_eq!(result.max_chunk_size, 10);
        assert_eq!(result.query_scores.len(), 1);
        // Exact match against the indexed chunk under the lexical backend.
        assert!(result.query_scores[0].score >= 0.99);
    }

    #[tokio::test]
    async fn failing_strategy_yields_sentinel() {
        let backend = CountingBackend::new();
        let runner = runner_with(&backend);
        let strategy = ScriptedStrategy::failing("boom");

        let result = runner.run("s", &strategy, "doc", &queries(&["q"])).await;

        assert!(result.is_failure());
        // Chunking failed before index creation; nothing to release.
        assert_eq!(backend.created(), 0);
        assert_eq!(backend.destroyed(), 0);
    }

    #[tokio::test]
    async fn slow_strategy_times_out_to_sentinel() {
        let backend = CountingBackend::new();
        let runner = Arc::new(BenchmarkRunner::new(
            backend.shared(),
            Duration::from_millis(20),
        ));
        let strategy = ScriptedStrategy::slow(Duration::from_secs(10), &["chunk"]);

        let result = runner.run("s", &strategy, "doc", &queries(&["q"])).await;

        assert!(result.is_failure());
    }

    #[tokio::test]
    async fn index_is_destroyed_on_success() {
        let backend = CountingBackend::new();
        let runner = runner_with(&backend);
        let strategy = ScriptedStrategy::fixed(&["one"]);

        runner.run("s", &strategy, "doc", &queries(&["q"])).await;

        assert_eq!(backend.created(), 1);
        assert_eq!(backend.destroyed(), 1);
    }

    #[tokio::test]
    async fn index_is_destroyed_when_insert_fails() {
        let backend = CountingBackend::new().failing_inserts();
        let runner = runner_with(&backend);
        let strategy = ScriptedStrategy::fixed(&["one"]);

        let result = runner.run("s", &strategy, "doc", &queries(&["q"])).await;

        assert!(result.is_failure());
        assert_eq!(backend.created(), 1);
        assert_eq!(backend.destroyed(), 1);
    }

    #[tokio::test]
    async fn index_is_destroyed_when_search_fails() {
        let backend = CountingBackend::new().failing_searches();
        let runner = runner_with(&backend);
        let strategy = ScriptedStrategy::fixed(&["one"]);

        let result = runner.run("s", &strategy, "doc", &queries(&["q"])).await;

        assert!(result.is_failure());
        assert_eq!(backend.destroyed(), 1);
    }

    #[tokio::test]
    async fn empty_chunk_sequence_scores_zero() {
        let backend = CountingBackend::new();
        let runner = runner_with(&backend);
        let strategy = ScriptedStrategy::fixed(&[]);

        let result = runner.run("s", &strategy, "", &queries(&["q1", "q2"])).await;

        assert!(!result.is_failure());
        assert_eq!(result.chunk_count, 0);
        assert_eq!(result.avg_chunk_size, 0.0);
        assert_eq!(result.query_scores.len(), 2);
        assert!(result.query_scores.iter().all(|qs| qs.score == 0.0));
    }

    #[tokio::test]
    async fn index_names_are_unique_and_sanitized() {
        let backend = CountingBackend::new();
        let runner = runner_with(&backend);
        let strategy = ScriptedStrategy::fixed(&["a"]);

        runner.run("My Strategy!", &strategy, "doc", &[]).await;
        runner.run("My Strategy!", &strategy, "doc", &[]).await;

        let names = backend.index_names();
        assert_eq!(names.len(), 2);
        assert_ne!(names[0], names[1]);
        assert!(names[0].starts_with("My-Strategy--"));
    }

    #[tokio::test]
    async fn panicking_strategy_is_contained() {
        let backend = CountingBackend::new();
        let runner = runner_with(&backend);

        let mut registry = StrategyRegistry::new();
        registry.register("panics", Arc::new(ScriptedStrategy::panicking()));
        registry.register("works", Arc::new(ScriptedStrategy::fixed(&["fine"])));

        let report = run_comparison(&registry, runner, "doc", &queries(&["fine"]), 1).await;

        assert_eq!(report.len(), 2);
        assert!(report.entries()[0].result.is_failure());
        assert!(!report.entries()[1].result.is_failure());
    }

    #[tokio::test]
    async fn comparison_preserves_registration_order() {
        let backend = CountingBackend::new();
        let runner = runner_with(&backend);

        let mut registry = StrategyRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(name, Arc::new(ScriptedStrategy::fixed(&[name])));
        }

        let report = run_comparison(&registry, runner, "doc", &queries(&["q"]), 1).await;

        let names: Vec<_> = report.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn parallel_mode_preserves_registration_order() {
        let backend = CountingBackend::new();
        let runner = runner_with(&backend);

        let mut registry = StrategyRegistry::new();
        // Earlier strategies are slower, so completion order inverts
        // registration order.
        registry.register(
            "slowest",
            Arc::new(ScriptedStrategy::slow(Duration::from_millis(80), &["a"])),
        );
        registry.register(
            "slower",
            Arc::new(ScriptedStrategy::slow(Duration::from_millis(40), &["b"])),
        );
        registry.register("instant", Arc::new(ScriptedStrategy::fixed(&["c"])));

        let report = run_comparison(&registry, runner, "doc", &queries(&["q"]), 3).await;

        let names: Vec<_> = report.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["slowest", "slower", "instant"]);
        assert!(report.entries().iter().all(|e| !e.result.is_failure()));
    }

    #[tokio::test]
    async fn failure_does_not_stop_later_strategies() {
        let backend = CountingBackend::new();
        let runner = runner_with(&backend);

        let mut registry = StrategyRegistry::new();
        registry.register("bad", Arc::new(ScriptedStrategy::failing("broken")));
        registry.register("good", Arc::new(ScriptedStrategy::fixed(&["text"])));

        let report = run_comparison(&registry, runner, "doc", &queries(&["text"]), 1).await;

        assert_eq!(report.len(), 2);
        assert!(report.entries()[0].result.is_failure());
        assert_eq!(report.entries()[1].result.chunk_count, 1);
    }

    #[test]
    fn sanitize_replaces_non_alphanumerics() {
        assert_eq!(sanitize("1. Sliding Window"), "1--Sliding-Window");
        assert_eq!(sanitize("plain"), "plain");
    }
}
