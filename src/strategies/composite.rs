//! Composite strategies that wrap other strategies

use anyhow::Result;
use std::sync::Arc;

use crate::strategy::ChunkingStrategy;

/// Wraps an inner strategy and prepends a synthesized context line to every
/// chunk, so a chunk keeps enough surrounding information to be retrievable
/// on anaphoric queries.
///
/// Because the prefix is synthesized, chunks are no longer exact substrings
/// of the document — this strategy reports `content_preserving() == false`.
pub struct ContextualStrategy {
    inner: Arc<dyn ChunkingStrategy>,
}

impl ContextualStrategy {
    pub fn new(inner: Arc<dyn ChunkingStrategy>) -> Self {
        Self { inner }
    }

    /// Context line: the document's leading words plus chunk position.
    fn context_line(document: &str, position: usize, total: usize) -> String {
        let lead: Vec<&str> = document.split_whitespace().take(8).collect();
        format!("[doc: {}] chunk {} of {}", lead.join(" "), position, total)
    }
}

#[async_trait::async_trait]
impl ChunkingStrategy for ContextualStrategy {
    async fn chunk(&self, document: &str) -> Result<Vec<String>> {
        let chunks = self.inner.chunk(document).await?;
        let total = chunks.len();
        Ok(chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                format!(
                    "{}\n\n{}",
                    Self::context_line(document, i + 1, total),
                    chunk
                )
            })
            .collect())
    }

    fn content_preserving(&self) -> bool {
        false
    }

    fn description(&self) -> &str {
        "Inner strategy's chunks with a synthesized context prefix"
    }
}

/// Concatenates the output of two strategies: every chunk of the primary,
/// then every chunk of the secondary. Trades index size for recall.
pub struct HybridStrategy {
    primary: Arc<dyn ChunkingStrategy>,
    secondary: Arc<dyn ChunkingStrategy>,
}

impl HybridStrategy {
    pub fn new(primary: Arc<dyn ChunkingStrategy>, secondary: Arc<dyn ChunkingStrategy>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait::async_trait]
impl ChunkingStrategy for HybridStrategy {
    async fn chunk(&self, document: &str) -> Result<Vec<String>> {
        let mut chunks = self.primary.chunk(document).await?;
        chunks.extend(self.secondary.chunk(document).await?);
        Ok(chunks)
    }

    fn content_preserving(&self) -> bool {
        self.primary.content_preserving() && self.secondary.content_preserving()
    }

    fn description(&self) -> &str {
        "Union of two strategies' chunks"
    }
}
