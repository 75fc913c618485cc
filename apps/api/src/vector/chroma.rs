//! ChromaDB-backed vector index over its REST API.
//!
//! Collections are created lazily with cosine distance and their server-side
//! ids cached for the lifetime of the client.

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::vector::{SearchHit, StoredEntry, VectorStore};

pub struct ChromaVectorStore {
    client: Client,
    base_url: String,
    collection_ids: RwLock<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    distances: Option<Vec<Vec<f32>>>,
    metadatas: Option<Vec<Vec<Option<Value>>>>,
    documents: Option<Vec<Vec<Option<String>>>>,
}

#[derive(Debug, Default, Deserialize)]
struct GetResponse {
    ids: Vec<String>,
    embeddings: Option<Vec<Option<Vec<f32>>>>,
    metadatas: Option<Vec<Option<Value>>>,
    documents: Option<Vec<Option<String>>>,
}

impl ChromaVectorStore {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            collection_ids: RwLock::new(HashMap::new()),
        }
    }

    /// Resolves a collection name to its Chroma id, creating the collection
    /// with cosine distance on first use.
    async fn collection_id(&self, name: &str) -> Result<String> {
        if let Some(id) = self.collection_ids.read().await.get(name) {
            return Ok(id.clone());
        }

        let response = self
            .client
            .post(format!("{}/api/v1/collections", self.base_url))
            .json(&json!({
                "name": name,
                "metadata": {"hnsw:space": "cosine"},
                "get_or_create": true,
            }))
            .send()
            .await?;
        let response = expect_success(response).await?;
        let collection: CollectionResponse = response.json().await?;

        self.collection_ids
            .write()
            .await
            .insert(name.to_string(), collection.id.clone());
        Ok(collection.id)
    }
}

#[async_trait]
impl VectorStore for ChromaVectorStore {
    async fn upsert(
        &self,
        collection: &str,
        doc_id: &str,
        text: &str,
        embedding: &[f32],
        metadata: Value,
    ) -> Result<()> {
        let coll_id = self.collection_id(collection).await?;
        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{coll_id}/upsert",
                self.base_url
            ))
            .json(&json!({
                "ids": [doc_id],
                "embeddings": [embedding],
                "metadatas": [metadata],
                "documents": [text],
            }))
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<SearchHit>> {
        let coll_id = self.collection_id(collection).await?;
        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{coll_id}/query",
                self.base_url
            ))
            .json(&json!({
                "query_embeddings": [query_embedding],
                "n_results": n_results,
                "include": ["distances", "metadatas", "documents"],
            }))
            .send()
            .await?;
        let response = expect_success(response).await?;
        let results: QueryResponse = response.json().await?;

        Ok(flatten_query_response(results))
    }

    async fn delete(&self, collection: &str, doc_id: &str) -> Result<()> {
        let coll_id = self.collection_id(collection).await?;
        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{coll_id}/delete",
                self.base_url
            ))
            .json(&json!({"ids": [doc_id]}))
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<StoredEntry>> {
        let coll_id = self.collection_id(collection).await?;
        let response = self
            .client
            .post(format!("{}/api/v1/collections/{coll_id}/get", self.base_url))
            .json(&json!({
                "ids": [doc_id],
                "include": ["embeddings", "metadatas", "documents"],
            }))
            .send()
            .await?;
        let response = expect_success(response).await?;
        let result: GetResponse = response.json().await?;

        if result.ids.is_empty() {
            return Ok(None);
        }

        Ok(Some(StoredEntry {
            id: result.ids[0].clone(),
            text: first_or_default(result.documents),
            embedding: first_or_default(result.embeddings),
            metadata: result
                .metadatas
                .and_then(|m| m.into_iter().next().flatten())
                .unwrap_or_else(|| json!({})),
        }))
    }
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("Chroma request failed (status {status}): {body}")
}

fn first_or_default<T: Default>(values: Option<Vec<Option<T>>>) -> T {
    values
        .and_then(|v| v.into_iter().next().flatten())
        .unwrap_or_default()
}

/// Chroma returns one result row per query embedding; we always send one.
fn flatten_query_response(results: QueryResponse) -> Vec<SearchHit> {
    let Some(ids) = results.ids.into_iter().next() else {
        return Vec::new();
    };
    let distances = results.distances.and_then(|d| d.into_iter().next());
    let metadatas = results.metadatas.and_then(|m| m.into_iter().next());
    let documents = results.documents.and_then(|d| d.into_iter().next());

    ids.into_iter()
        .enumerate()
        .map(|(i, id)| SearchHit {
            id,
            distance: distances
                .as_ref()
                .and_then(|d| d.get(i).copied())
                .unwrap_or(0.0),
            metadata: metadatas
                .as_ref()
                .and_then(|m| m.get(i).cloned().flatten())
                .unwrap_or_else(|| json!({})),
            document: documents
                .as_ref()
                .and_then(|d| d.get(i).cloned().flatten())
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_query_response_zips_parallel_arrays() {
        let raw = r#"{
            "ids": [["a", "b"]],
            "distances": [[0.1, 0.4]],
            "metadatas": [[{"candidate_id": "x"}, null]],
            "documents": [["doc a", null]]
        }"#;
        let response: QueryResponse = serde_json::from_str(raw).unwrap();
        let hits = flatten_query_response(response);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[0].distance, 0.1);
        assert_eq!(hits[0].metadata["candidate_id"], "x");
        assert_eq!(hits[0].document, "doc a");
        assert_eq!(hits[1].metadata, json!({}));
        assert_eq!(hits[1].document, "");
    }

    #[test]
    fn test_flatten_query_response_empty() {
        let response: QueryResponse = serde_json::from_str(r#"{"ids": []}"#).unwrap();
        assert!(flatten_query_response(response).is_empty());
    }
}
