//! Chunking strategy capability and registry
//!
//! Strategies are black boxes with a single capability: map a document to an
//! ordered sequence of chunks. The registry is a closed, explicitly built
//! list of (name, strategy) pairs — no runtime discovery — so a run's
//! strategy set is statically enumerable and testable in isolation.

use anyhow::Result;
use std::sync::Arc;

/// Capability interface for a pluggable chunking strategy.
///
/// Implementations are expected to be deterministic for a given input;
/// strategies with inherent nondeterminism (e.g. ones that call an LLM for
/// context synthesis) are a documented caveat, not handled specially by the
/// harness.
#[async_trait::async_trait]
pub trait ChunkingStrategy: Send + Sync {
    /// Split a document into an ordered sequence of chunks.
    ///
    /// An empty sequence is a legal result for degenerate input. Chunks are
    /// not assumed to be overlap-free, and not assumed to be character-exact
    /// substrings of the document (see [`content_preserving`]).
    ///
    /// [`content_preserving`]: ChunkingStrategy::content_preserving
    async fn chunk(&self, document: &str) -> Result<Vec<String>>;

    /// Whether every produced chunk is a character-exact substring of the
    /// source document.
    ///
    /// Strategies that synthesize or prepend text (e.g. attaching generated
    /// context) must return `false`; literal self-retrieval checks only make
    /// sense for preserving strategies.
    fn content_preserving(&self) -> bool {
        true
    }

    /// Short human-readable description for the strategy listing.
    fn description(&self) -> &str {
        ""
    }
}

/// One registered strategy with its stable, unique display name.
#[derive(Clone)]
pub struct RegisteredStrategy {
    pub name: String,
    pub strategy: Arc<dyn ChunkingStrategy>,
}

/// Ordered list of strategies to benchmark; static for a run.
///
/// Registration order is load-bearing: report rows, ranking tie-breaks, and
/// best-in-category tie-breaks all follow it.
#[derive(Default)]
pub struct StrategyRegistry {
    entries: Vec<RegisteredStrategy>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy. Names must be unique; a duplicate name would make
    /// report rows ambiguous, so it is rejected.
    pub fn register(&mut self, name: impl Into<String>, strategy: Arc<dyn ChunkingStrategy>) {
        let name = name.into();
        if self.entries.iter().any(|e| e.name == name) {
            tracing::warn!(strategy = %name, "duplicate strategy name ignored");
            return;
        }
        self.entries.push(RegisteredStrategy { name, strategy });
    }

    pub fn entries(&self) -> &[RegisteredStrategy] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait::async_trait]
    impl ChunkingStrategy for Noop {
        async fn chunk(&self, _document: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = StrategyRegistry::new();
        registry.register("b", Arc::new(Noop));
        registry.register("a", Arc::new(Noop));
        registry.register("c", Arc::new(Noop));

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = StrategyRegistry::new();
        registry.register("dup", Arc::new(Noop));
        registry.register("dup", Arc::new(Noop));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn content_preserving_defaults_to_true() {
        assert!(Noop.content_preserving());
    }
}
