//! Embedding/index backend interface
//!
//! The harness consumes similarity search through four operations: create an
//! ephemeral index, insert chunks, search top-k, destroy. It never inspects
//! embedding vectors — only scores and content come back across this
//! boundary.

pub mod remote;

use anyhow::Result;

pub use remote::{EmbeddingClient, RemoteBackend};

/// One search result, descending-score position `rank` not included — the
/// returned sequence is already ordered best-first.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Document id assigned at insert time
    pub id: String,
    /// Similarity score, higher is more similar
    pub score: f32,
    /// The indexed text
    pub content: String,
}

/// Factory for ephemeral per-run indices.
#[async_trait::async_trait]
pub trait IndexBackend: Send + Sync {
    /// Create a fresh index under the given internal name.
    ///
    /// The returned handle is exclusively owned by one benchmark run and
    /// must be destroyed before (or regardless of) the next run starting.
    async fn create(&self, name: &str) -> Result<Box<dyn IndexHandle>>;
}

/// Exclusive handle to one ephemeral index.
///
/// Implementations must also release their resources on `Drop` as a last
/// resort, so a cancelled benchmark cannot leak an in-flight index.
#[async_trait::async_trait]
pub trait IndexHandle: Send + Sync {
    /// Insert one document under a caller-assigned id.
    async fn insert(&mut self, id: &str, text: &str) -> Result<()>;

    /// Top-k similarity search, results ordered descending by score.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>>;

    /// Tear the index down. Idempotent.
    async fn destroy(&mut self) -> Result<()>;
}
