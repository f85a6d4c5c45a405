//! Remote embedding service backend
//!
//! Talks to an OpenAI-compatible `/embeddings` endpoint and keeps each run's
//! index as an in-process list of (id, text, vector) entries. Search is a
//! linear cosine scan — the index lives for one benchmark run and holds at
//! most a few hundred chunks, so nothing fancier is warranted.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use super::{IndexBackend, IndexHandle, SearchHit};
use crate::config::EmbeddingConfig;

/// Client for an OpenAI-compatible embeddings API.
pub struct EmbeddingClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(config: &EmbeddingConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut list = self.embed_batch(&input).await?;
        list.pop().ok_or_else(|| anyhow!("empty embedding response"))
    }

    /// Embed a batch of texts, one vector per input, in input order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let resp = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": texts,
                "dimensions": self.dimensions,
            }))
            .send()
            .await
            .context("embedding request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("embedding service error ({}): {}", status, body));
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .await
            .context("malformed embedding response")?;
        if parsed.data.len() != texts.len() {
            return Err(anyhow!(
                "embedding count mismatch: got {}, expected {}",
                parsed.data.len(),
                texts.len()
            ));
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Backend producing ephemeral in-process indices over remote embeddings.
pub struct RemoteBackend {
    client: Arc<EmbeddingClient>,
}

impl RemoteBackend {
    pub fn new(client: EmbeddingClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait::async_trait]
impl IndexBackend for RemoteBackend {
    async fn create(&self, name: &str) -> Result<Box<dyn IndexHandle>> {
        tracing::debug!(index = name, "creating ephemeral index");
        Ok(Box::new(EphemeralIndex {
            name: name.to_string(),
            client: Arc::clone(&self.client),
            entries: Vec::new(),
        }))
    }
}

struct IndexEntry {
    id: String,
    content: String,
    vector: Vec<f32>,
}

/// One run's index. Entries are cleared on destroy and, as a last resort,
/// when the handle is dropped (a cancelled run never leaks the index).
struct EphemeralIndex {
    name: String,
    client: Arc<EmbeddingClient>,
    entries: Vec<IndexEntry>,
}

#[async_trait::async_trait]
impl IndexHandle for EphemeralIndex {
    async fn insert(&mut self, id: &str, text: &str) -> Result<()> {
        let vector = self
            .client
            .embed(text)
            .await
            .with_context(|| format!("insert into {} failed for id {}", self.name, id))?;
        self.entries.push(IndexEntry {
            id: id.to_string(),
            content: text.to_string(),
            vector,
        });
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if self.entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self
            .client
            .embed(query)
            .await
            .with_context(|| format!("query embedding failed for index {}", self.name))?;

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                id: entry.id.clone(),
                score: cosine_similarity(&query_vector, &entry.vector),
                content: entry.content.clone(),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn destroy(&mut self) -> Result<()> {
        tracing::debug!(index = %self.name, entries = self.entries.len(), "destroying index");
        self.entries.clear();
        Ok(())
    }
}

impl Drop for EphemeralIndex {
    fn drop(&mut self) {
        self.entries.clear();
    }
}

/// Cosine similarity between two vectors; 0 for mismatched or zero-norm input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![0.5, 0.5, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_handles_degenerate_input() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
