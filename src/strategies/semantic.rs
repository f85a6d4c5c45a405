//! Semantic grouping strategies

use anyhow::Result;

use super::sentence_spans;
use crate::strategy::ChunkingStrategy;

/// Groups sentences around a fixed list of tracked entities: a new chunk
/// starts whenever a sentence mentions a different tracked entity than the
/// group before it. Sentences mentioning no tracked entity stay with the
/// current group.
pub struct EntityStrategy {
    entities: Vec<String>,
}

impl EntityStrategy {
    pub fn new<S: AsRef<str>>(entities: &[S]) -> Self {
        Self {
            entities: entities.iter().map(|e| e.as_ref().to_string()).collect(),
        }
    }

    fn first_entity(&self, sentence: &str) -> Option<usize> {
        self.entities
            .iter()
            .position(|entity| sentence.contains(entity.as_str()))
    }
}

#[async_trait::async_trait]
impl ChunkingStrategy for EntityStrategy {
    async fn chunk(&self, document: &str) -> Result<Vec<String>> {
        let sentences = sentence_spans(document);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let mut chunks = Vec::new();
        let (mut group_start, mut group_end) = sentences[0];
        let mut group_entity = self.first_entity(&document[sentences[0].0..sentences[0].1]);

        for &(s, e) in &sentences[1..] {
            let entity = self.first_entity(&document[s..e]);
            let shifts = matches!((entity, group_entity), (Some(a), Some(b)) if a != b)
                || (entity.is_some() && group_entity.is_none());
            if shifts {
                chunks.push(document[group_start..group_end].to_string());
                group_start = s;
                group_entity = entity;
            }
            group_end = e;
        }
        chunks.push(document[group_start..group_end].to_string());

        Ok(chunks)
    }

    fn description(&self) -> &str {
        "Sentence groups keyed by tracked entities"
    }
}

/// One atomic note per sentence, in the spirit of zettelkasten
/// note-taking: each chunk carries exactly one idea.
#[derive(Default)]
pub struct ZettelkastenStrategy;

#[async_trait::async_trait]
impl ChunkingStrategy for ZettelkastenStrategy {
    async fn chunk(&self, document: &str) -> Result<Vec<String>> {
        Ok(sentence_spans(document)
            .into_iter()
            .map(|(s, e)| document[s..e].to_string())
            .collect())
    }

    fn description(&self) -> &str {
        "One atomic note per sentence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entity_shift_starts_new_chunk() {
        let doc = "Berlin has museums. Berlin also has parks. Potsdam is nearby. It is smaller.";
        let strategy = EntityStrategy::new(&["Berlin", "Potsdam"]);
        let chunks = strategy.chunk(doc).await.unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "Berlin has museums. Berlin also has parks.");
        // The entity-free trailing sentence stays with its group.
        assert_eq!(chunks[1], "Potsdam is nearby. It is smaller.");
    }

    #[tokio::test]
    async fn entity_free_document_is_one_chunk() {
        let doc = "Nothing notable here. Still nothing.";
        let strategy = EntityStrategy::new(&["Berlin"]);
        let chunks = strategy.chunk(doc).await.unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[tokio::test]
    async fn entity_empty_document() {
        let strategy = EntityStrategy::new(&["Berlin"]);
        assert!(strategy.chunk("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn zettelkasten_one_note_per_sentence() {
        let doc = "First idea. Second idea! Third idea?";
        let chunks = ZettelkastenStrategy.chunk(doc).await.unwrap();
        assert_eq!(chunks, vec!["First idea.", "Second idea!", "Third idea?"]);
    }

    #[tokio::test]
    async fn zettelkasten_notes_are_document_substrings() {
        let doc = "One thing. Another thing.";
        for chunk in ZettelkastenStrategy.chunk(doc).await.unwrap() {
            assert!(doc.contains(&chunk));
        }
        assert!(ZettelkastenStrategy.content_preserving());
    }
}
