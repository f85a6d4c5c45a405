//! Comparison report: aggregation, ranking, and rendering
//!
//! Consumes the per-strategy results in registration order and derives the
//! overall table, per-query rankings, and best-in-category picks. All
//! tie-breaking is deterministic: stable sorts keep registration order, and
//! min/max folds only replace the current pick on a strictly better value.

use std::cmp::Ordering;
use std::time::Duration;

use crate::metrics::StrategyResult;

/// How many strategies a per-query ranking block surfaces.
pub const RANKING_LIMIT: usize = 5;

/// Marker printed when a best-in-category pick is unavailable.
pub const NOT_AVAILABLE: &str = "N/A";

/// One report row: a registered strategy and its (possibly sentinel) result.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub name: String,
    pub result: StrategyResult,
}

/// One strategy's position in a per-query ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedScore {
    pub name: String,
    pub score: f32,
}

/// Ranking block for one query of the workload.
#[derive(Debug, Clone)]
pub struct QueryRanking {
    pub query: String,
    pub ranked: Vec<RankedScore>,
}

/// Best-in-category picks; `None` renders as the explicit
/// [`NOT_AVAILABLE`] marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryWinners {
    pub fewest_chunks: Option<String>,
    pub fastest_chunking: Option<String>,
    pub best_avg_retrieval: Option<String>,
}

/// Ordered mapping strategy name → result, immutable once built.
///
/// Every registered strategy has exactly one entry, in registration order —
/// failed strategies appear with the sentinel result, never go missing.
#[derive(Debug, Clone, Default)]
pub struct ComparisonReport {
    entries: Vec<ReportEntry>,
}

impl ComparisonReport {
    pub fn new(entries: Vec<ReportEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the report has no usable data: no entries at all, or every
    /// entry is the failure sentinel.
    pub fn all_failed(&self) -> bool {
        self.entries.iter().all(|e| e.result.is_failure())
    }

    /// Ranking for one query: every entry that recorded a score for it,
    /// stable-sorted descending by score. Equal scores keep registration
    /// order. Sentinel entries carry no scores and drop out naturally.
    pub fn query_ranking(&self, query: &str) -> Vec<RankedScore> {
        let mut ranked: Vec<RankedScore> = self
            .entries
            .iter()
            .filter_map(|entry| {
                entry
                    .result
                    .query_scores
                    .iter()
                    .find(|qs| qs.query == query)
                    .map(|qs| RankedScore {
                        name: entry.name.clone(),
                        score: qs.score,
                    })
            })
            .collect();

        // Stable sort: ties keep earlier-registered strategies first.
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
    }

    /// Top-[`RANKING_LIMIT`] ranking blocks for each query, in workload order.
    pub fn per_query_rankings(&self, queries: &[String]) -> Vec<QueryRanking> {
        queries
            .iter()
            .map(|query| {
                let mut ranked = self.query_ranking(query);
                ranked.truncate(RANKING_LIMIT);
                QueryRanking {
                    query: query.clone(),
                    ranked,
                }
            })
            .collect()
    }

    /// Best-in-category picks across the whole report.
    pub fn best_in_category(&self) -> CategoryWinners {
        if self.all_failed() {
            return CategoryWinners::default();
        }

        let fewest_chunks = self
            .entries
            .iter()
            .fold(None::<&ReportEntry>, |best, entry| match best {
                Some(b) if entry.result.chunk_count >= b.result.chunk_count => best,
                _ => Some(entry),
            })
            .map(|e| e.name.clone());

        // Zero-measured (failed) runs are excluded rather than winning.
        let fastest_chunking = self
            .entries
            .iter()
            .filter(|e| e.result.chunking_time > Duration::ZERO)
            .fold(None::<&ReportEntry>, |best, entry| match best {
                Some(b) if entry.result.chunking_time >= b.result.chunking_time => best,
                _ => Some(entry),
            })
            .map(|e| e.name.clone());

        let best_avg_retrieval = self
            .entries
            .iter()
            .fold(None::<(&ReportEntry, f32)>, |best, entry| {
                let mean = entry.result.mean_query_score();
                match best {
                    Some((_, best_mean)) if mean <= best_mean => best,
                    _ => Some((entry, mean)),
                }
            })
            .map(|(e, _)| e.name.clone());

        CategoryWinners {
            fewest_chunks,
            fastest_chunking,
            best_avg_retrieval,
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", head)
}

/// Print the full comparison summary to stdout.
pub fn print_report(report: &ComparisonReport, queries: &[String]) {
    println!("\n╔════════════════════════════════════════════════════════════════════════╗");
    println!("║                          COMPARISON SUMMARY                            ║");
    println!("╚════════════════════════════════════════════════════════════════════════╝\n");

    // Overall metrics table, one row per strategy in registration order.
    println!("═══ Overall Metrics ═══════════════════════════════════════════════════");
    println!(
        "{:<25} {:>7} {:>9} {:>10} {:>10}",
        "Strategy", "Chunks", "Avg Size", "Chunk(ms)", "Index(ms)"
    );
    println!("{}", "─".repeat(71));
    for entry in report.entries() {
        let r = &entry.result;
        println!(
            "{:<25} {:>7} {:>9.0} {:>10} {:>10}",
            truncate(&entry.name, 25),
            r.chunk_count,
            r.avg_chunk_size,
            r.chunking_time.as_millis(),
            r.indexing_time.as_millis(),
        );
    }

    // Per-query top results.
    println!("\n═══ Query Performance (Top Result Scores) ═════════════════════════════");
    for ranking in report.per_query_rankings(queries) {
        println!("\nQuery: \"{}\"", ranking.query);
        println!("{}", "─".repeat(71));
        if ranking.ranked.is_empty() {
            println!("  (no scores recorded)");
        }
        for (i, scored) in ranking.ranked.iter().enumerate() {
            println!(
                "  {}. {:<40} → {:.4}",
                i + 1,
                truncate(&scored.name, 40),
                scored.score
            );
        }
    }

    // Best strategy per metric.
    let winners = report.best_in_category();
    let pick = |winner: &Option<String>| -> String {
        winner.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };
    println!("\n═══ Best Strategies ═══════════════════════════════════════════════════");
    println!("  🏆 Fewest chunks:      {}", pick(&winners.fewest_chunks));
    println!("  ⚡ Fastest chunking:   {}", pick(&winners.fastest_chunking));
    println!("  🎯 Best avg retrieval: {}", pick(&winners.best_avg_retrieval));

    println!("\n═══ Key Insights ══════════════════════════════════════════════════════");
    println!("  • Different strategies excel at different tasks");
    println!("  • Context-aware strategies often score higher at retrieval");
    println!("  • There is a trade-off between chunk count and retrieval quality");
}
