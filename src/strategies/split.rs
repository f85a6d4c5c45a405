//! Boundary-driven strategies
//!
//! These split on a caller-supplied regex boundary or on sentence
//! boundaries. Patterns are compiled inside `chunk`, so an invalid pattern
//! surfaces as an isolated per-strategy failure instead of tearing down the
//! registry at startup.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;

use super::sentence_spans;
use crate::strategy::ChunkingStrategy;

/// Return the in-document span of `document[start..end]` with surrounding
/// whitespace trimmed, or `None` if nothing but whitespace remains.
fn trimmed_span(document: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let piece = &document[start..end];
    let lead = piece.len() - piece.trim_start().len();
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some((start + lead, start + lead + trimmed.len()))
}

/// Spans of the text between boundary matches, whitespace-trimmed.
fn piece_spans(re: &Regex, document: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut prev = 0;
    for m in re.find_iter(document) {
        if let Some(span) = trimmed_span(document, prev, m.start()) {
            spans.push(span);
        }
        prev = m.end();
    }
    if let Some(span) = trimmed_span(document, prev, document.len()) {
        spans.push(span);
    }
    spans
}

/// Plain split on a custom regex boundary.
pub struct RegexStrategy {
    pattern: String,
}

impl RegexStrategy {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

#[async_trait::async_trait]
impl ChunkingStrategy for RegexStrategy {
    async fn chunk(&self, document: &str) -> Result<Vec<String>> {
        let re = Regex::new(&self.pattern)
            .with_context(|| format!("invalid boundary pattern {:?}", self.pattern))?;
        Ok(piece_spans(&re, document)
            .into_iter()
            .map(|(s, e)| document[s..e].to_string())
            .collect())
    }

    fn description(&self) -> &str {
        "Split on a custom regex boundary"
    }
}

/// Boundary split with size adaptation: consecutive segments merge until a
/// chunk reaches `min_chars`, and a merge never grows a chunk past
/// `max_chars`. An oversized single segment becomes its own chunk; the
/// final remainder may come in under `min_chars`.
pub struct AdaptiveStrategy {
    boundary: String,
    min_chars: usize,
    max_chars: usize,
}

impl AdaptiveStrategy {
    pub fn new(boundary: impl Into<String>, min_chars: usize, max_chars: usize) -> Self {
        Self {
            boundary: boundary.into(),
            min_chars,
            max_chars,
        }
    }
}

#[async_trait::async_trait]
impl ChunkingStrategy for AdaptiveStrategy {
    async fn chunk(&self, document: &str) -> Result<Vec<String>> {
        let re = Regex::new(&self.boundary)
            .with_context(|| format!("invalid boundary pattern {:?}", self.boundary))?;

        // Merged chunks stay exact document slices: a chunk spans from its
        // first segment's start to its last segment's end, boundary text
        // included.
        let mut spans: Vec<(usize, usize)> = Vec::new();
        let mut current: Option<(usize, usize)> = None;

        for (s, e) in piece_spans(&re, document) {
            match current {
                None => current = Some((s, e)),
                Some((cs, ce)) => {
                    let merged_len = document[cs..e].chars().count();
                    if merged_len > self.max_chars {
                        spans.push((cs, ce));
                        current = Some((s, e));
                    } else {
                        current = Some((cs, e));
                    }
                }
            }

            if let Some((cs, ce)) = current {
                if document[cs..ce].chars().count() >= self.min_chars {
                    spans.push((cs, ce));
                    current = None;
                }
            }
        }
        if let Some(span) = current {
            spans.push(span);
        }

        Ok(spans
            .into_iter()
            .map(|(s, e)| document[s..e].to_string())
            .collect())
    }

    fn description(&self) -> &str {
        "Boundary split with min/max size adaptation"
    }
}

/// Groups consecutive sentences into topics by vocabulary overlap: a new
/// chunk starts when a sentence shares too little content vocabulary with
/// the one before it.
pub struct TopicStrategy {
    /// Jaccard threshold below which a topic shift is assumed
    shift_threshold: f64,
}

impl TopicStrategy {
    pub fn new(shift_threshold: f64) -> Self {
        Self { shift_threshold }
    }
}

/// Lowercased content words (4+ chars) of a sentence.
fn content_words(sentence: &str) -> HashSet<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 4)
        .map(|w| w.to_lowercase())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[async_trait::async_trait]
impl ChunkingStrategy for TopicStrategy {
    async fn chunk(&self, document: &str) -> Result<Vec<String>> {
        let sentences = sentence_spans(document);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let mut chunks = Vec::new();
        let (mut group_start, mut group_end) = sentences[0];
        let mut prev_words = content_words(&document[sentences[0].0..sentences[0].1]);

        for &(s, e) in &sentences[1..] {
            let words = content_words(&document[s..e]);
            if jaccard(&prev_words, &words) < self.shift_threshold {
                chunks.push(document[group_start..group_end].to_string());
                group_start = s;
            }
            group_end = e;
            prev_words = words;
        }
        chunks.push(document[group_start..group_end].to_string());

        Ok(chunks)
    }

    fn description(&self) -> &str {
        "Sentence groups split at topic shifts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn regex_splits_on_pattern() {
        let strategy = RegexStrategy::new(r"\. ");
        let chunks = strategy.chunk("One fish. Two fish. Red fish").await.unwrap();
        assert_eq!(chunks, vec!["One fish", "Two fish", "Red fish"]);
    }

    #[tokio::test]
    async fn regex_empty_document_yields_no_chunks() {
        let strategy = RegexStrategy::new(r"\. ");
        assert!(strategy.chunk("").await.unwrap().is_empty());
        assert!(strategy.chunk("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn regex_invalid_pattern_errors() {
        let strategy = RegexStrategy::new("([unclosed");
        assert!(strategy.chunk("text").await.is_err());
    }

    #[tokio::test]
    async fn regex_chunks_are_document_substrings() {
        let doc = "Alpha beta. Gamma delta. Epsilon";
        let strategy = RegexStrategy::new(r"\. ");
        for chunk in strategy.chunk(doc).await.unwrap() {
            assert!(doc.contains(&chunk));
        }
    }

    #[tokio::test]
    async fn adaptive_merges_until_min_size() {
        // Segments of ~12 chars each; min 20 forces pairwise merges.
        let doc = "aaaaaaaaaaaa. bbbbbbbbbbbb. cccccccccccc. dddddddddddd";
        let strategy = AdaptiveStrategy::new(r"\. ", 20, 60);
        let chunks = strategy.chunk(doc).await.unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("aaaa"));
        assert!(chunks[0].ends_with("bbbb"));
        // Merged chunks keep the boundary text, staying exact substrings.
        assert!(doc.contains(&chunks[0]));
        assert!(doc.contains(&chunks[1]));
    }

    #[tokio::test]
    async fn adaptive_does_not_merge_past_max() {
        let doc = "aaaaaaaaaaaaaaaaaaaa. bbbbbbbbbbbbbbbbbbbb";
        // Each segment is 20 chars; merging would make 42 > max 30, but each
        // segment alone already satisfies min 10.
        let strategy = AdaptiveStrategy::new(r"\. ", 10, 30);
        let chunks = strategy.chunk(doc).await.unwrap();
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn adaptive_oversized_segment_is_its_own_chunk() {
        let long = "x".repeat(100);
        let doc = format!("{}. tail", long);
        let strategy = AdaptiveStrategy::new(r"\. ", 10, 50);
        let chunks = strategy.chunk(&doc).await.unwrap();
        assert_eq!(chunks[0], long);
    }

    #[tokio::test]
    async fn topic_groups_related_sentences() {
        let doc = "Rivers carry fresh water downstream. The water of rivers feeds lakes. \
                   Compilers translate source code. Source code becomes machine code.";
        let strategy = TopicStrategy::new(0.1);
        let chunks = strategy.chunk(doc).await.unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("Rivers"));
        assert!(chunks[1].starts_with("Compilers"));
    }

    #[tokio::test]
    async fn topic_single_sentence_is_one_chunk() {
        let strategy = TopicStrategy::new(0.1);
        let chunks = strategy.chunk("Only one sentence here.").await.unwrap();
        assert_eq!(chunks, vec!["Only one sentence here."]);
    }

    #[tokio::test]
    async fn topic_empty_document() {
        let strategy = TopicStrategy::new(0.1);
        assert!(strategy.chunk("").await.unwrap().is_empty());
    }
}
