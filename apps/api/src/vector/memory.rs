//! In-memory vector index: per-collection maps behind an async RwLock.
//! Exact (brute-force) cosine search, used as the default backend for
//! development and as the test double for the `VectorStore` contract.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::vector::{cosine_distance, SearchHit, StoredEntry, VectorStore};

struct Entry {
    text: String,
    embedding: Vec<f32>,
    metadata: Value,
}

#[derive(Default)]
pub struct InMemoryVectorStore {
    data: RwLock<HashMap<String, HashMap<String, Entry>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        collection: &str,
        doc_id: &str,
        text: &str,
        embedding: &[f32],
        metadata: Value,
    ) -> Result<()> {
        let mut data = self.data.write().await;
        data.entry(collection.to_string()).or_default().insert(
            doc_id.to_string(),
            Entry {
                text: text.to_string(),
                embedding: embedding.to_vec(),
                metadata,
            },
        );
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<SearchHit>> {
        let data = self.data.read().await;
        let Some(coll) = data.get(collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<SearchHit> = coll
            .iter()
            .map(|(doc_id, entry)| SearchHit {
                id: doc_id.clone(),
                distance: cosine_distance(query_embedding, &entry.embedding),
                metadata: entry.metadata.clone(),
                document: entry.text.clone(),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(n_results);
        Ok(hits)
    }

    async fn delete(&self, collection: &str, doc_id: &str) -> Result<()> {
        let mut data = self.data.write().await;
        if let Some(coll) = data.get_mut(collection) {
            coll.remove(doc_id);
        }
        Ok(())
    }

    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<StoredEntry>> {
        let data = self.data.read().await;
        Ok(data.get(collection).and_then(|coll| {
            coll.get(doc_id).map(|entry| StoredEntry {
                id: doc_id.to_string(),
                text: entry.text.clone(),
                embedding: entry.embedding.clone(),
                metadata: entry.metadata.clone(),
            })
        }))
    }
}
