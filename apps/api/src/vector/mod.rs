//! Vector index contract and its swappable implementations.
//!
//! Collections partition the index by entity kind. Distances are cosine
//! distances on [0, 2]: 0 is identical direction, 2 is opposite.

pub mod chroma;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub const COLLECTION_RESUMES: &str = "resumes";
pub const COLLECTION_JOBS: &str = "jobs";

/// One nearest-neighbor search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub distance: f32,
    pub metadata: Value,
    pub document: String,
}

/// A stored entry fetched back by id.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: Value,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Stores or replaces the entry with this id. Idempotent.
    async fn upsert(
        &self,
        collection: &str,
        doc_id: &str,
        text: &str,
        embedding: &[f32],
        metadata: Value,
    ) -> Result<()>;

    /// Returns up to `n_results` entries ordered by ascending distance.
    /// An empty or unknown collection yields an empty list, never an error.
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<SearchHit>>;

    /// Removes an entry if present; deleting an absent id is a no-op.
    async fn delete(&self, collection: &str, doc_id: &str) -> Result<()>;

    /// Fetches an entry by id, or `None` when absent.
    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<StoredEntry>>;
}

/// Cosine distance between two vectors. A zero-magnitude vector against
/// anything is defined as maximum distance (2.0) to avoid division by zero.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 2.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_direction_is_zero_distance() {
        let d = cosine_distance(&[1.0, 0.0], &[2.0, 0.0]);
        assert!(d.abs() < 1e-6, "expected ~0, got {d}");
    }

    #[test]
    fn test_opposite_direction_is_max_distance() {
        let d = cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((d - 2.0).abs() < 1e-6, "expected ~2, got {d}");
    }

    #[test]
    fn test_orthogonal_vectors_are_mid_distance() {
        let d = cosine_distance(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((d - 1.0).abs() < 1e-6, "expected ~1, got {d}");
    }

    #[test]
    fn test_zero_magnitude_vector_is_max_distance() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 2.0);
        assert_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 0.0]), 2.0);
    }
}
