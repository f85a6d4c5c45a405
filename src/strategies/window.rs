//! Word-window strategies

use anyhow::Result;

use super::window_chunks;
use crate::strategy::ChunkingStrategy;

/// Fixed-size word windows with overlap — the traditional baseline.
pub struct SlidingWindowStrategy {
    window_words: usize,
    overlap_words: usize,
}

impl SlidingWindowStrategy {
    /// `window_words` per chunk, consecutive chunks sharing `overlap_words`.
    pub fn new(window_words: usize, overlap_words: usize) -> Self {
        Self {
            window_words,
            overlap_words,
        }
    }
}

#[async_trait::async_trait]
impl ChunkingStrategy for SlidingWindowStrategy {
    async fn chunk(&self, document: &str) -> Result<Vec<String>> {
        Ok(window_chunks(document, self.window_words, self.overlap_words))
    }

    fn description(&self) -> &str {
        "Fixed-size word windows with overlap (baseline)"
    }
}

/// Retrieval task the chunk layout should be tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Short, overlapping chunks: favors pinpoint retrieval
    Search,
    /// Long, non-overlapping chunks: favors broad context
    Summarization,
    /// Mid-size chunks with light overlap
    QuestionAnswering,
}

impl TaskKind {
    /// (window, overlap) in words for this task profile.
    fn window_params(self) -> (usize, usize) {
        match self {
            Self::Search => (60, 15),
            Self::Summarization => (200, 0),
            Self::QuestionAnswering => (90, 10),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Summarization => "summarization",
            Self::QuestionAnswering => "question-answering",
        }
    }
}

/// Window chunking with task-tuned parameters instead of caller-chosen ones.
pub struct TaskAwareStrategy {
    task: TaskKind,
}

impl TaskAwareStrategy {
    pub fn new(task: TaskKind) -> Self {
        Self { task }
    }
}

#[async_trait::async_trait]
impl ChunkingStrategy for TaskAwareStrategy {
    async fn chunk(&self, document: &str) -> Result<Vec<String>> {
        let (window, overlap) = self.task.window_params();
        Ok(window_chunks(document, window, overlap))
    }

    fn description(&self) -> &str {
        "Word windows sized for a specific retrieval task"
    }
}
