//! Shared test doubles
//!
//! A deterministic, exact-match-capable lexical backend (no network, no
//! vectors) and scripted strategies for exercising the runner's failure
//! boundaries. Only compiled for tests.

use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::backend::{IndexBackend, IndexHandle, SearchHit};
use crate::strategy::ChunkingStrategy;

enum Script {
    Fixed(Vec<String>),
    Failing(String),
    Slow(Duration, Vec<String>),
    Panicking,
}

/// Strategy with scripted behavior: fixed output, failure, slowness, or a
/// panic.
pub struct ScriptedStrategy {
    script: Script,
}

impl ScriptedStrategy {
    pub fn fixed(chunks: &[&str]) -> Self {
        Self {
            script: Script::Fixed(chunks.iter().map(|c| c.to_string()).collect()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            script: Script::Failing(message.to_string()),
        }
    }

    pub fn slow(delay: Duration, chunks: &[&str]) -> Self {
        Self {
            script: Script::Slow(delay, chunks.iter().map(|c| c.to_string()).collect()),
        }
    }

    pub fn panicking() -> Self {
        Self {
            script: Script::Panicking,
        }
    }
}

#[async_trait::async_trait]
impl ChunkingStrategy for ScriptedStrategy {
    async fn chunk(&self, _document: &str) -> Result<Vec<String>> {
        match &self.script {
            Script::Fixed(chunks) => Ok(chunks.clone()),
            Script::Failing(message) => Err(anyhow!("{}", message)),
            Script::Slow(delay, chunks) => {
                tokio::time::sleep(*delay).await;
                Ok(chunks.clone())
            }
            Script::Panicking => panic!("scripted panic"),
        }
    }
}

#[derive(Default)]
struct BackendState {
    created: AtomicUsize,
    destroyed: AtomicUsize,
    index_names: Mutex<Vec<String>>,
    fail_inserts: AtomicBool,
    fail_searches: AtomicBool,
}

/// Lexical in-memory backend that counts index lifecycle events.
///
/// Scoring is deterministic: an exact text match scores 1.0, anything else
/// scores token overlap scaled below 1.0 — so self-retrieval assertions can
/// use a 0.99 threshold.
pub struct CountingBackend {
    state: Arc<BackendState>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(BackendState::default()),
        }
    }

    pub fn failing_inserts(self) -> Self {
        self.state.fail_inserts.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_searches(self) -> Self {
        self.state.fail_searches.store(true, Ordering::SeqCst);
        self
    }

    /// The backend handle to hand to a runner.
    pub fn shared(&self) -> Arc<dyn IndexBackend> {
        Arc::new(LexicalBackend {
            state: Arc::clone(&self.state),
        })
    }

    pub fn created(&self) -> usize {
        self.state.created.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> usize {
        self.state.destroyed.load(Ordering::SeqCst)
    }

    pub fn index_names(&self) -> Vec<String> {
        self.state.index_names.lock().unwrap().clone()
    }
}

struct LexicalBackend {
    state: Arc<BackendState>,
}

#[async_trait::async_trait]
impl IndexBackend for LexicalBackend {
    async fn create(&self, name: &str) -> Result<Box<dyn IndexHandle>> {
        self.state.created.fetch_add(1, Ordering::SeqCst);
        self.state
            .index_names
            .lock()
            .unwrap()
            .push(name.to_string());
        Ok(Box::new(LexicalIndex {
            state: Arc::clone(&self.state),
            entries: Vec::new(),
            destroyed: false,
        }))
    }
}

pub struct LexicalIndex {
    state: Arc<BackendState>,
    entries: Vec<(String, String)>,
    destroyed: bool,
}

/// Exact match → 1.0; otherwise Jaccard token overlap scaled to stay
/// strictly below the exact-match score.
pub fn lexical_score(query: &str, text: &str) -> f32 {
    if query == text {
        return 1.0;
    }
    let q: std::collections::HashSet<String> =
        query.split_whitespace().map(|w| w.to_lowercase()).collect();
    let t: std::collections::HashSet<String> =
        text.split_whitespace().map(|w| w.to_lowercase()).collect();
    let intersection = q.intersection(&t).count();
    let union = q.len() + t.len() - intersection;
    if union == 0 {
        0.0
    } else {
        0.9 * intersection as f32 / union as f32
    }
}

#[async_trait::async_trait]
impl IndexHandle for LexicalIndex {
    async fn insert(&mut self, id: &str, text: &str) -> Result<()> {
        if self.state.fail_inserts.load(Ordering::SeqCst) {
            return Err(anyhow!("scripted insert failure"));
        }
        self.entries.push((id.to_string(), text.to_string()));
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if self.state.fail_searches.load(Ordering::SeqCst) {
            return Err(anyhow!("scripted search failure"));
        }
        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|(id, text)| SearchHit {
                id: id.clone(),
                score: lexical_score(query, text),
                content: text.clone(),
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
        if !self.destroyed {
            self.destroyed = true;
            self.entries.clear();
            self.state.destroyed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_scores_one() {
        assert_eq!(lexical_score("same text", "same text"), 1.0);
    }

    #[test]
    fn partial_overlap_scores_below_exact() {
        let score = lexical_score("alpha beta", "alpha gamma");
        assert!(score > 0.0);
        assert!(score < 0.99);
    }

    #[test]
    fn disjoint_texts_score_zero() {
        assert_eq!(lexical_score("alpha", "beta"), 0.0);
    }
}
