use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nearest-neighbor lookup scoped to one customer's partition.
pub trait VectorIndex: Send + Sync {
    /// Texts of the `top_k` closest documents in `partition`, nearest first.
    fn query(&self, vector: &[f32], partition: &str, top_k: usize)
        -> Result<Vec<String>, IndexError>;
}

/// Complaint document stored alongside its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub customer_id: String,
    pub kind: String,
    pub text_content: String,
    pub embedding: Vec<f32>,
    pub ingested_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("embedding has {found} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("failed to access index snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("index snapshot is not valid JSON: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Cosine-distance index held in memory and persisted as a JSON snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InMemoryVectorIndex {
    dimensions: usize,
    partitions: BTreeMap<String, Vec<StoredDocument>>,
}

impl InMemoryVectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            partitions: BTreeMap::new(),
        }
    }

    /// Load a snapshot, treating a missing file as an empty index.
    pub fn load<P: AsRef<Path>>(path: P, dimensions: usize) -> Result<Self, IndexError> {
        let raw = match fs::read_to_string(path.as_ref()) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::new(dimensions)),
            Err(err) => return Err(err.into()),
        };

        let index: Self = serde_json::from_str(&raw)?;
        if index.dimensions != dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: dimensions,
                found: index.dimensions,
            });
        }
        Ok(index)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), IndexError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body)?;
        Ok(())
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a document, replacing any document with the same id in its partition.
    pub fn upsert(&mut self, document: StoredDocument) -> Result<(), IndexError> {
        self.check_dimensions(&document.embedding)?;

        let partition = self
            .partitions
            .entry(document.customer_id.clone())
            .or_default();
        match partition.iter_mut().find(|stored| stored.id == document.id) {
            Some(existing) => *existing = document,
            None => partition.push(document),
        }
        Ok(())
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                found: vector.len(),
            });
        }
        Ok(())
    }
}

impl VectorIndex for InMemoryVectorIndex {
    fn query(
        &self,
        vector: &[f32],
        partition: &str,
        top_k: usize,
    ) -> Result<Vec<String>, IndexError> {
        self.check_dimensions(vector)?;

        let Some(documents) = self.partitions.get(partition) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(f32, &StoredDocument)> = documents
            .iter()
            .map(|document| (cosine_distance(vector, &document.embedding), document))
            .collect();
        ranked.sort_by(|left, right| left.0.total_cmp(&right.0));

        Ok(ranked
            .into_iter()
            .take(top_k)
            .map(|(_, document)| document.text_content.clone())
            .collect())
    }
}

/// `1 - cosine similarity`; a zero-length vector is treated as maximally distant.
fn cosine_distance(left: &[f32], right: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut left_norm = 0.0_f32;
    let mut right_norm = 0.0_f32;
    for (a, b) in left.iter().zip(right) {
        dot += a * b;
        left_norm += a * a;
        right_norm += b * b;
    }

    if left_norm == 0.0 || right_norm == 0.0 {
        return 1.0;
    }
    1.0 - dot / (left_norm.sqrt() * right_norm.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: &str, customer_id: &str, text: &str, embedding: Vec<f32>) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            kind: "complaint_log".to_string(),
            text_content: text.to_string(),
            embedding,
            ingested_at: Utc::now(),
        }
    }

    fn seeded_index() -> InMemoryVectorIndex {
        let mut index = InMemoryVectorIndex::new(3);
        index
            .upsert(document("a", "3668-QPYBK", "billing", vec![1.0, 0.0, 0.0]))
            .expect("insert a");
        index
            .upsert(document("b", "3668-QPYBK", "outage", vec![0.0, 1.0, 0.0]))
            .expect("insert b");
        index
            .upsert(document("c", "9237-HQITU", "router", vec![0.0, 1.0, 0.1]))
            .expect("insert c");
        index
    }

    #[test]
    fn query_returns_nearest_document_within_partition() {
        let index = seeded_index();
        let hits = index
            .query(&[0.1, 0.9, 0.0], "3668-QPYBK", 1)
            .expect("query succeeds");
        assert_eq!(hits, vec!["outage".to_string()]);
    }

    #[test]
    fn query_orders_hits_by_distance() {
        let index = seeded_index();
        let hits = index
            .query(&[0.9, 0.1, 0.0], "3668-QPYBK", 5)
            .expect("query succeeds");
        assert_eq!(hits, vec!["billing".to_string(), "outage".to_string()]);
    }

    #[test]
    fn unknown_partition_yields_no_hits() {
        let index = seeded_index();
        let hits = index
            .query(&[1.0, 0.0, 0.0], "0000-NONE", 1)
            .expect("query succeeds");
        assert!(hits.is_empty());
    }

    #[test]
    fn upsert_replaces_documents_with_same_id() {
        let mut index = seeded_index();
        index
            .upsert(document("a", "3668-QPYBK", "refund", vec![1.0, 0.0, 0.0]))
            .expect("replace a");
        assert_eq!(index.len(), 3);
        let hits = index
            .query(&[1.0, 0.0, 0.0], "3668-QPYBK", 1)
            .expect("query succeeds");
        assert_eq!(hits, vec!["refund".to_string()]);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let mut index = InMemoryVectorIndex::new(3);
        let err = index
            .upsert(document("a", "x", "text", vec![1.0, 0.0]))
            .expect_err("wrong width");
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        ));
        assert!(index.query(&[1.0], "x", 1).is_err());
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("index.json");
        let index = seeded_index();
        index.save(&path).expect("save snapshot");

        let loaded = InMemoryVectorIndex::load(&path, 3).expect("load snapshot");
        assert_eq!(loaded, index);
    }

    #[test]
    fn missing_snapshot_loads_empty_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded =
            InMemoryVectorIndex::load(dir.path().join("absent.json"), 768).expect("empty index");
        assert!(loaded.is_empty());
        assert_eq!(loaded.dimensions(), 768);
    }
}
