//! Query workload
//!
//! The benchmark runs a fixed, ordered list of queries against every
//! strategy's index. Workloads can be loaded from a JSON file:
//!
//! ```json
//! {
//!   "metadata": {
//!     "name": "berlin",
//!     "description": "Factual queries over the sample document"
//!   },
//!   "queries": [
//!     "What is the population of Berlin?",
//!     "What is Berlin's economy based on?"
//!   ]
//! }
//! ```
//!
//! Query order is part of the workload: rankings are reported per query in
//! this order, and score lists follow it too.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata about a query workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySetMetadata {
    /// Name of the workload
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: String,
    /// Optional version
    #[serde(default)]
    pub version: String,
}

/// A complete query workload that can be loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySet {
    /// Metadata about the workload
    pub metadata: QuerySetMetadata,
    /// The queries, in benchmark order
    pub queries: Vec<String>,
}

impl QuerySet {
    /// Load a workload from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file: {}", path.display()))?;

        let query_set: QuerySet = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse query file: {}", path.display()))?;

        if query_set.queries.is_empty() {
            anyhow::bail!("Query file '{}' has no queries", path.display());
        }
        for (i, q) in query_set.queries.iter().enumerate() {
            if q.trim().is_empty() {
                anyhow::bail!("Query {} is empty", i);
            }
        }

        Ok(query_set)
    }

    /// Save a workload to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize query file")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write query file: {}", path.display()))?;

        Ok(())
    }

    /// Built-in workload covering different aspects of the sample document.
    pub fn default_workload() -> Self {
        Self {
            metadata: QuerySetMetadata {
                name: "berlin".to_string(),
                description: "Factual queries over the embedded sample document".to_string(),
                version: "1.0".to_string(),
            },
            queries: vec![
                "What is the population of Berlin?".to_string(),
                "What is Berlin's economy based on?".to_string(),
                "What universities are in Berlin?".to_string(),
                "What is the climate like in Berlin?".to_string(),
                "How diverse is Berlin's population?".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_workload_has_five_queries() {
        let workload = QuerySet::default_workload();
        assert_eq!(workload.queries.len(), 5);
        assert_eq!(workload.metadata.name, "berlin");
    }

    #[test]
    fn load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.json");

        let workload = QuerySet::default_workload();
        workload.save(&path).unwrap();

        let loaded = QuerySet::load(&path).unwrap();
        assert_eq!(loaded.queries, workload.queries);
    }

    #[test]
    fn load_rejects_empty_query_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.json");
        std::fs::write(&path, r#"{"metadata": {"name": "x"}, "queries": []}"#).unwrap();

        assert!(QuerySet::load(&path).is_err());
    }

    #[test]
    fn load_rejects_blank_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.json");
        std::fs::write(
            &path,
            r#"{"metadata": {"name": "x"}, "queries": ["ok", "  "]}"#,
        )
        .unwrap();

        assert!(QuerySet::load(&path).is_err());
    }

    #[test]
    fn metadata_description_is_optional() {
        let parsed: QuerySet =
            serde_json::from_str(r#"{"metadata": {"name": "x"}, "queries": ["q"]}"#).unwrap();
        assert_eq!(parsed.metadata.description, "");
    }
}
